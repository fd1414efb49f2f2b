//! Subscriber setup for binaries and tests built on hookscope.
//!
//! The library crates only emit events; installing a subscriber is left to
//! the application. These are the events worth filtering on:
//!
//! | Target | Level | Events |
//! |--------|-------|--------|
//! | `hookscope_system::context` | `TRACE` | instance activated / deactivated |
//! | `hookscope_system::context` | `DEBUG` | hook called with no active instance |
//! | `hookscope_system::system` | `DEBUG` | hooks system built |
//! | `hookscope_system::system` | `WARN` | release error replaced a callback panic |
//!
//! Scope entry and exit are only visible at `TRACE`, so a filter such as
//! `hookscope_system=trace,warn` shows them without the rest of the noise.
//!
//! ```
//! use hookscope_tracing::{TracingConfig, TracingFormat};
//!
//! TracingConfig::new()
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("hookscope_system=trace,warn")
//!     .init();
//!
//! // Only the first call in a process installs anything.
//! assert!(!TracingConfig::new().init());
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// How events are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line, colored.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per line.
    Json,
}

/// What [`init`](Self::init) installs.
///
/// A rendering loop that wants to see every scope while debugging, and
/// nothing but release failures otherwise:
///
/// ```
/// use hookscope_tracing::{TracingConfig, TracingFormat};
/// use tracing::Level;
///
/// let debugging = TracingConfig::new().with_level(Level::TRACE);
/// let quiet = TracingConfig::new()
///     .with_format(TracingFormat::Json)
///     .with_env_filter("hookscope_system=warn,error");
///
/// assert_eq!(debugging.format, TracingFormat::Pretty);
/// assert!(quiet.env_filter.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Applies to every target when `env_filter` is unset or invalid.
    pub level: Level,
    /// See [`TracingFormat`].
    pub format: TracingFormat,
    /// `EnvFilter` directives, such as `hookscope_system=trace,info`.
    pub env_filter: Option<String>,
    /// Also report span enter and exit.
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::default(),
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Same as [`TracingConfig::default`]: `INFO`, pretty, no directives.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `level`.
    #[must_use]
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    /// Sets `format`.
    #[must_use]
    pub fn with_format(self, format: TracingFormat) -> Self {
        Self { format, ..self }
    }

    /// Replaces `level` with per-target directives. Directives that fail to
    /// parse are ignored in favour of `level`.
    #[must_use]
    pub fn with_env_filter(self, directives: impl Into<String>) -> Self {
        Self {
            env_filter: Some(directives.into()),
            ..self
        }
    }

    /// Sets `span_events`.
    #[must_use]
    pub fn with_span_events(self, span_events: bool) -> Self {
        Self {
            span_events,
            ..self
        }
    }

    /// The filter [`init`](Self::init) installs.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    /// Installs a registry with [`env_filter`](Self::env_filter) and a fmt
    /// layer as the global default. Returns `false`, changing nothing, when
    /// a global subscriber already exists.
    pub fn init(&self) -> bool {
        let env_filter = self.env_filter();

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let installed = match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
        };

        if installed {
            tracing::info!(
                level = %self.level,
                format = ?self.format,
                "tracing initialized"
            );
        }
        installed
    }
}
