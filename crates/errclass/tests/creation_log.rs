use std::sync::{Arc, Mutex, Once};

use errclass::{
    config, log_on_creation, log_with_stack, new_class, no_capture_stack, no_log_on_creation, set_config,
    set_log_sink, Config, LogSink, NOT_IMPLEMENTED_ERROR, PANIC_ERROR, PROGRAMMER_ERROR,
};
use once_cell::sync::Lazy;

#[derive(Default)]
struct Recorder {
    entries: Mutex<Vec<(String, String)>>,
}

impl LogSink for Recorder {
    fn log_with_stack(&self, message: &str, stack: &str) {
        self.entries.lock().unwrap().push((message.to_string(), stack.to_string()));
    }
}

static RECORDER: Lazy<Arc<Recorder>> = Lazy::new(|| Arc::new(Recorder::default()));
static INSTALL: Once = Once::new();

fn recorder() -> &'static Recorder {
    INSTALL.call_once(|| {
        set_log_sink(RECORDER.clone());
    });
    &RECORDER
}

/// Entries whose message contains `marker`; tests run in parallel.
fn logged(marker: &str) -> Vec<(String, String)> {
    recorder()
        .entries
        .lock()
        .unwrap()
        .iter()
        .filter(|(m, _)| m.contains(marker))
        .cloned()
        .collect()
}

#[test]
fn defect_classes_log_exactly_once() {
    recorder();
    let _ = PROGRAMMER_ERROR.error("marker-programmer");
    let _ = PANIC_ERROR.error("marker-panic");
    let _ = NOT_IMPLEMENTED_ERROR.error("marker-todo");
    assert_eq!(logged("marker-programmer").len(), 1);
    assert_eq!(logged("marker-panic").len(), 1);
    assert_eq!(logged("marker-todo").len(), 1);
}

#[test]
fn logged_message_is_full_rendering() {
    recorder();
    let err = PROGRAMMER_ERROR.error("marker-render");
    let entries = logged("marker-render");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, err.to_string());
}

#[test]
fn plain_classes_do_not_log() {
    recorder();
    let quiet = new_class("Creation Log Quiet", &[no_capture_stack()]);
    let _ = quiet.error("marker-quiet");
    let _ = quiet.wrap(std::io::Error::new(std::io::ErrorKind::Other, "marker-quiet-io"));
    assert!(logged("marker-quiet").is_empty());
}

#[test]
fn instance_options_override_class() {
    recorder();
    let _ = PROGRAMMER_ERROR.error_with("marker-silenced", &[no_log_on_creation()]);
    assert!(logged("marker-silenced").is_empty());

    let quiet = new_class("Creation Log Opt-In", &[no_capture_stack()]);
    let _ = quiet.error_with("marker-opt-in", &[log_on_creation()]);
    assert_eq!(logged("marker-opt-in").len(), 1);
}

#[test]
fn idempotent_wrap_does_not_log_again() {
    recorder();
    let err = PROGRAMMER_ERROR.error("marker-idempotent");
    let again = PROGRAMMER_ERROR.wrap(err);
    assert_eq!(logged("marker-idempotent").len(), 1);
    assert_eq!(again.class(), *PROGRAMMER_ERROR);
}

#[test]
fn stack_dump_respects_configured_length() {
    recorder();
    let before = config();
    set_config(Config::new().stack_log_length(64)).unwrap();
    log_with_stack("marker-truncated");
    set_config(before).unwrap();

    let entries = logged("marker-truncated");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].1.len() <= 64);
}

#[test]
fn invalid_config_is_rejected() {
    assert!(set_config(Config::new().max_stack_frames(0)).is_err());
    assert!(config().max_stack_frames >= 1);
}
