use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use errclass::{reset_log_sink, set_log_sink, LogSink, PROGRAMMER_ERROR};

struct Exploding {
    calls: AtomicUsize,
}

impl LogSink for Exploding {
    fn log_with_stack(&self, _message: &str, _stack: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("sink exploded");
    }
}

#[test]
fn sink_panic_does_not_escape() {
    let sink = Arc::new(Exploding {
        calls: AtomicUsize::new(0),
    });
    set_log_sink(sink.clone());

    let err = PROGRAMMER_ERROR.error("still created");
    assert_eq!(err.message(), "Programmer Error: still created");
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);

    reset_log_sink();
    let _ = PROGRAMMER_ERROR.error("back to the facade");
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
}
