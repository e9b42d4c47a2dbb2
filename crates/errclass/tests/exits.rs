use std::sync::Arc;
use std::thread;

use errclass::{
    new_class, no_capture_stack, record, record_before, record_boxed, BoxError, ClassResult, Error, ErrorClass,
    Message, HIERARCHICAL_ERROR,
};
use once_cell::sync::Lazy;

static QUIET: Lazy<&'static ErrorClass> = Lazy::new(|| new_class("Exit Test Error", &[no_capture_stack()]));

#[inline(never)]
fn fail() -> ClassResult<()> {
    Err(QUIET.error("deep"))
}

#[inline(never)]
fn middle() -> ClassResult<()> {
    fail().map_err(record)
}

#[inline(never)]
fn outer() -> ClassResult<()> {
    middle().map_err(record)
}

#[inline(never)]
fn annotate(err: Error) -> Error {
    record_before(err, 1)
}

#[inline(never)]
fn annotated_by_caller() -> Error {
    annotate(QUIET.error("attributed"))
}

#[inline(never)]
fn create_here() -> Error {
    HIERARCHICAL_ERROR.error("located")
}

fn resolved(err: &Error) -> bool {
    err.exits().iter().all(|f| f.function().is_some())
}

#[test]
fn each_record_appends_one_exit() {
    let err = outer().unwrap_err();
    let exits = err.exits();
    assert_eq!(exits.len(), 2);
    if resolved(&err) {
        assert!(exits[0].function().unwrap_or_default().ends_with("middle"), "{:?}", exits);
        assert!(exits[1].function().unwrap_or_default().ends_with("outer"), "{:?}", exits);
    }
}

#[test]
fn exits_rendered_after_message() {
    let err = outer().unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("Exit Test Error: deep\n\"Exit Test Error\" exits:\n"), "{}", text);
    assert_eq!(text.lines().count(), 4);
    assert_eq!(format!("{:#}", err), "Exit Test Error: deep");
}

#[test]
fn record_before_attributes_to_outer_frame() {
    let err = annotated_by_caller();
    let exits = err.exits();
    assert_eq!(exits.len(), 1);
    if resolved(&err) {
        assert!(exits[0].function().unwrap_or_default().ends_with("annotated_by_caller"), "{:?}", exits);
    }
}

#[test]
fn record_boxed_ignores_foreign() {
    let boxed: BoxError = Box::new(Message("plain".into()));
    let back = record_boxed(boxed);
    assert_eq!(back.to_string(), "plain");
}

#[test]
fn record_boxed_appends_to_classified() {
    let err = QUIET.error("boxed");
    let back = record_boxed(Box::new(err.clone()));
    assert_eq!(err.exits().len(), 1);
    assert!(back.downcast_ref::<Error>().map_or(false, |e| Error::ptr_eq(e, &err)));
}

#[test]
fn concurrent_records_are_all_kept() {
    let err = Arc::new(QUIET.error("shared"));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let err = Arc::clone(&err);
            thread::spawn(move || {
                for _ in 0..4 {
                    record((*err).clone());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(err.exits().len(), 32);
}

#[test]
fn stack_captured_for_hierarchical_errors() {
    let err = HIERARCHICAL_ERROR.error("testing");
    let text = err.to_string();
    assert!(text.starts_with("Error: testing"));
    if !err.stack().is_empty() {
        assert!(text.contains("\n\"Error\" backtrace:\n"));
        assert!(err.stack().len() <= 256);
    }
}

#[test]
fn stack_starts_at_creating_function() {
    let err = create_here();
    let Some(top) = err.stack().first() else {
        return;
    };
    if top.function().is_some() {
        assert!(top.function().unwrap_or_default().ends_with("create_here"), "{:?}", err.stack());
        assert_eq!(top.file(), Some("exits.rs"));
        assert!(top.line() > 0);
    }
}

#[test]
fn exit_frames_name_user_code() {
    let err = outer().unwrap_err();
    for f in err.exits() {
        let name = f.function().unwrap_or_default();
        assert!(!name.contains("backtrace"), "{}", name);
        assert!(!name.starts_with("0x"), "{}", name);
    }
}
