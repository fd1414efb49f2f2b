//! Example counter renderer CLI.
//!
//! Renders two counters for a number of frames, clicking the first counter on
//! every frame and the second one on every third frame.
//!
//! # Usage
//!
//! ```bash
//! counter [frames]
//! ```
//!
//! Set `RUST_LOG=debug` to see scope entry and exit.

use example::{Counter, Renderer};
use hookscope_tracing::{TracingConfig, TracingFormat};

fn main() {
    TracingConfig::new()
        .with_format(TracingFormat::Compact)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .init();

    let frames = match std::env::args().nth(1).map(|arg| arg.parse::<u32>()) {
        None => 5,
        Some(Ok(frames)) => frames,
        Some(Err(e)) => {
            eprintln!("Error: invalid frame count: {e}");
            std::process::exit(1);
        }
    };

    let renderer = match Renderer::new() {
        Ok(renderer) => renderer,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = renderer.hooks().peek_count() {
        println!("outside a render: {e}");
    }

    let counters = [Counter::new("left"), Counter::new("right")];

    for frame in 0..frames {
        for (position, counter) in counters.iter().enumerate() {
            let output = match renderer.render(counter) {
                Ok(output) => output,
                Err(e) => {
                    eprintln!("Error rendering {}: {e}", counter.label());
                    std::process::exit(1);
                }
            };

            println!(
                "frame {frame}: {:>5} count={} ({}) renders={}",
                output.label, output.count, output.parity, output.renders
            );

            if position == 0 || frame % 3 == 2 {
                output.increment();
            }
        }
    }
}
