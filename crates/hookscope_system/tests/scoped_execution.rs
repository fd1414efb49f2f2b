//! Tests for `with_instance`: activation, lifecycle callbacks, cleanup on every
//! exit path, and the reentrancy policies.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hookscope_system::prelude::*;
use parking_lot::Mutex;

// ─────────────────────────────────────────────────────────────────────────
// Test Instances
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Component {
    name: &'static str,
}

impl Component {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self { name })
    }
}

/// Shared log of lifecycle events, in order.
type EventLog = Arc<Mutex<Vec<String>>>;

fn use_name(builder: &mut HooksBuilder<Component>) -> Hook<Component, (), &'static str> {
    builder
        .hook("use_name", |component: &Arc<Component>| {
            let name = component.name;
            move || name
        })
        .expect("registration should succeed")
}

/// Builds a system whose lifecycle callbacks record into `log`.
///
/// The release callback also records whether the slot was still occupied.
fn logged_system(
    log: &EventLog,
    config: HooksConfig<Component>,
) -> (Arc<HooksSystem<Component>>, Hook<Component, (), &'static str>) {
    let prepare_log = Arc::clone(log);
    let release_log = Arc::clone(log);
    let system_cell: Arc<Mutex<Option<std::sync::Weak<HooksSystem<Component>>>>> =
        Arc::new(Mutex::new(None));
    let release_cell = Arc::clone(&system_cell);

    let config = config
        .with_prepare_instance(move |component| {
            prepare_log.lock().push(format!("prepare:{}", component.name));
            Ok(())
        })
        .with_release_instance(move |component| {
            let active = release_cell
                .lock()
                .as_ref()
                .and_then(std::sync::Weak::upgrade)
                .is_some_and(|system| system.is_active());
            release_log
                .lock()
                .push(format!("release:{}:active={active}", component.name));
            Ok(())
        });

    let mut builder = HooksSystem::with_config(config);
    let hook = use_name(&mut builder);
    let system = Arc::new(builder.build().expect("build should succeed"));
    *system_cell.lock() = Some(Arc::downgrade(&system));
    (system, hook)
}

// ─────────────────────────────────────────────────────────────────────────
// Activation
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn hooks_resolve_against_active_instance() {
    let mut builder = HooksSystem::builder();
    let use_name = use_name(&mut builder);
    let system = builder.build().unwrap();

    let first = Component::new("first");
    let second = Component::new("second");

    let name = system.with_instance(&first, || use_name.call(())).unwrap();
    assert_eq!(name.unwrap(), "first");

    let name = system.with_instance(&second, || use_name.call(())).unwrap();
    assert_eq!(name.unwrap(), "second");
}

#[test]
fn current_instance_is_visible_only_inside_scope() {
    let mut builder = HooksSystem::builder();
    let _ = use_name(&mut builder);
    let system = builder.build().unwrap();
    let component = Component::new("scoped");

    assert!(system.current().is_none());
    let inside = system
        .with_instance(&component, || {
            (system.is_active(), system.depth(), system.current())
        })
        .unwrap();

    assert!(inside.0);
    assert_eq!(inside.1, 1);
    assert!(Arc::ptr_eq(&inside.2.unwrap(), &component));
    assert!(!system.is_active());
    assert!(system.current().is_none());
}

#[test]
fn hook_outside_scope_uses_default_message() {
    let mut builder = HooksSystem::builder();
    let use_name = use_name(&mut builder);
    let _system = builder.build().unwrap();

    let error = use_name.call(()).unwrap_err();
    assert!(error.is_no_active_instance());
    assert_eq!(error.to_string(), DEFAULT_OUTSIDE_SCOPE_MESSAGE);
}

#[test]
fn hook_outside_scope_uses_custom_message() {
    let mut builder = HooksSystem::<Component>::with_config(
        HooksConfig::new().with_outside_scope_message("custom"),
    );
    let use_something = builder
        .hook("use_something", |_: &Arc<Component>| || 45)
        .unwrap();
    let _system = builder.build().unwrap();

    let error = use_something.call(()).unwrap_err();
    assert_eq!(error.to_string(), "custom");
}

#[test]
fn hook_outside_scope_with_empty_message_uses_default() {
    let mut builder =
        HooksSystem::<Component>::with_config(HooksConfig::new().with_outside_scope_message(""));
    let use_name = use_name(&mut builder);
    let _system = builder.build().unwrap();

    let error = use_name.call(()).unwrap_err();
    assert_eq!(error.to_string(), DEFAULT_OUTSIDE_SCOPE_MESSAGE);
}

#[test]
fn slot_is_cleared_after_scope_returns() {
    let mut builder = HooksSystem::builder();
    let use_name = use_name(&mut builder);
    let system = builder.build().unwrap();

    system
        .with_instance(&Component::new("a"), || use_name.call(()))
        .unwrap()
        .unwrap();

    assert!(use_name.call(()).unwrap_err().is_no_active_instance());
}

#[test]
fn callback_result_is_returned_verbatim() {
    let mut builder = HooksSystem::builder();
    let _ = use_name(&mut builder);
    let system = builder.build().unwrap();

    let value: Result<Result<u8, String>, HookError> =
        system.with_instance(&Component::new("a"), || Err("callback error".to_string()));
    assert_eq!(value.unwrap(), Err("callback error".to_string()));
}

#[test]
fn hooks_can_call_other_hooks() {
    let mut builder = HooksSystem::<Component>::builder();
    let use_name = use_name(&mut builder);
    let inner = use_name.clone();
    let use_greeting = builder
        .hook("use_greeting", move |_: &Arc<Component>| {
            let inner = inner.clone();
            move |greeting: &'static str| {
                let name = inner.call(()).expect("instance is active");
                format!("{greeting}, {name}")
            }
        })
        .unwrap();
    let system = builder.build().unwrap();

    let greeting = system
        .with_instance(&Component::new("world"), || use_greeting.call(("hello",)))
        .unwrap();
    assert_eq!(greeting.unwrap(), "hello, world");
}

// ─────────────────────────────────────────────────────────────────────────
// Lifecycle Callbacks
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn prepare_runs_before_callback_and_release_before_clear() {
    let log: EventLog = Arc::default();
    let (system, use_name) = logged_system(&log, HooksConfig::new());

    let callback_log = Arc::clone(&log);
    system
        .with_instance(&Component::new("a"), || {
            let name = use_name.call(()).unwrap();
            callback_log.lock().push(format!("callback:{name}"));
        })
        .unwrap();

    assert_eq!(
        *log.lock(),
        vec!["prepare:a", "callback:a", "release:a:active=true"]
    );
}

#[test]
fn lifecycle_runs_once_per_scope() {
    let log: EventLog = Arc::default();
    let (system, _) = logged_system(&log, HooksConfig::new());
    let component = Component::new("a");

    system.with_instance(&component, || ()).unwrap();
    system.with_instance(&component, || ()).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "prepare:a",
            "release:a:active=true",
            "prepare:a",
            "release:a:active=true",
        ]
    );
}

#[test]
fn prepare_failure_aborts_without_activation() {
    let released = Arc::new(Mutex::new(0));
    let released_clone = Arc::clone(&released);
    let mut builder = HooksSystem::<Component>::with_config(
        HooksConfig::new()
            .with_prepare_instance(|_| Err("not ready".into()))
            .with_release_instance(move |_| {
                *released_clone.lock() += 1;
                Ok(())
            }),
    );
    let _ = use_name(&mut builder);
    let system = builder.build().unwrap();

    let mut ran = false;
    let error = system
        .with_instance(&Component::new("a"), || ran = true)
        .unwrap_err();

    assert!(matches!(error, HookError::Prepare { .. }));
    assert_eq!(error.to_string(), "prepare_instance failed: not ready");
    assert!(!ran);
    assert_eq!(*released.lock(), 0);
    assert!(!system.is_active());
}

#[test]
fn release_failure_still_clears_slot() {
    let mut builder = HooksSystem::<Component>::with_config(
        HooksConfig::new().with_release_instance(|_| Err("flush failed".into())),
    );
    let use_name = use_name(&mut builder);
    let system = builder.build().unwrap();

    let error = system
        .with_instance(&Component::new("a"), || use_name.call(()))
        .unwrap_err();

    assert!(matches!(error, HookError::Release { .. }));
    assert!(!system.is_active());
    assert!(use_name.call(()).unwrap_err().is_no_active_instance());
}

#[test]
fn panicking_callback_runs_release_and_clears_slot() {
    let log: EventLog = Arc::default();
    let (system, use_name) = logged_system(&log, HooksConfig::new());

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        system.with_instance::<()>(&Component::new("a"), || panic!("render failed"))
    }));

    let payload = result.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"render failed"));
    assert_eq!(*log.lock(), vec!["prepare:a", "release:a:active=true"]);
    assert!(!system.is_active());
    assert!(use_name.call(()).unwrap_err().is_no_active_instance());
}

#[test]
fn panicking_release_still_clears_slot() {
    let mut builder = HooksSystem::<Component>::with_config(
        HooksConfig::new().with_release_instance(|_| panic!("release exploded")),
    );
    let use_name = use_name(&mut builder);
    let system = builder.build().unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        system.with_instance(&Component::new("a"), || ())
    }));

    assert!(result.is_err());
    assert!(!system.is_active());
    assert!(use_name.call(()).unwrap_err().is_no_active_instance());
}

#[test]
fn release_error_replaces_callback_panic() {
    let mut builder = HooksSystem::<Component>::with_config(
        HooksConfig::new().with_release_instance(|_| Err("also broken".into())),
    );
    let use_name = use_name(&mut builder);
    let system = builder.build().unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        system.with_instance::<()>(&Component::new("a"), || panic!("first"))
    }));

    let error = result
        .expect("release error should replace the panic")
        .unwrap_err();
    assert!(matches!(&error, HookError::Release { .. }));
    assert_eq!(error.to_string(), "release_instance failed: also broken");
    assert!(!system.is_active());
    assert!(use_name.call(()).unwrap_err().is_no_active_instance());
}

// ─────────────────────────────────────────────────────────────────────────
// Reentrancy
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn overwrite_nested_scope_leaves_outer_without_instance() {
    let mut builder = HooksSystem::builder();
    let use_name = use_name(&mut builder);
    let system = builder.build().unwrap();

    let outer = Component::new("outer");
    let inner = Component::new("inner");

    let (before, during, after) = system
        .with_instance(&outer, || {
            let before = use_name.call(()).unwrap();
            let during = system
                .with_instance(&inner, || use_name.call(()))
                .unwrap()
                .unwrap();
            let after = use_name.call(());
            (before, during, after)
        })
        .unwrap();

    assert_eq!(before, "outer");
    assert_eq!(during, "inner");
    assert!(after.unwrap_err().is_no_active_instance());
    assert!(!system.is_active());
}

#[test]
fn stack_nested_scope_restores_outer_instance() {
    let mut builder =
        HooksSystem::with_config(HooksConfig::new().with_reentrancy(ReentrancyPolicy::Stack));
    let use_name = use_name(&mut builder);
    let system = builder.build().unwrap();

    let outer = Component::new("outer");
    let inner = Component::new("inner");

    let (during, depth, after) = system
        .with_instance(&outer, || {
            let (during, depth) = system
                .with_instance(&inner, || (use_name.call(()).unwrap(), system.depth()))
                .unwrap();
            (during, depth, use_name.call(()).unwrap())
        })
        .unwrap();

    assert_eq!(during, "inner");
    assert_eq!(depth, 2);
    assert_eq!(after, "outer");
    assert_eq!(system.depth(), 0);
}

#[test]
fn stack_policy_unwinds_all_levels_on_panic() {
    let mut builder =
        HooksSystem::with_config(HooksConfig::new().with_reentrancy(ReentrancyPolicy::Stack));
    let use_name = use_name(&mut builder);
    let system = builder.build().unwrap();

    let outer = Component::new("outer");
    let inner = Component::new("inner");

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        system.with_instance(&outer, || {
            system.with_instance::<()>(&inner, || panic!("deep failure"))
        })
    }));

    assert!(result.is_err());
    assert_eq!(system.depth(), 0);
    assert!(use_name.call(()).is_err());
}

#[test]
fn reject_policy_fails_fast_on_nesting() {
    let log: EventLog = Arc::default();
    let (system, use_name) = logged_system(
        &log,
        HooksConfig::new().with_reentrancy(ReentrancyPolicy::Reject),
    );

    let outer = Component::new("outer");
    let inner = Component::new("inner");

    let (nested, after) = system
        .with_instance(&outer, || {
            let nested = system.with_instance(&inner, || ());
            (nested, use_name.call(()).unwrap())
        })
        .unwrap();

    assert!(matches!(nested, Err(HookError::AlreadyActive)));
    assert_eq!(after, "outer");
    assert_eq!(
        *log.lock(),
        vec!["prepare:outer", "release:outer:active=true"]
    );
}
