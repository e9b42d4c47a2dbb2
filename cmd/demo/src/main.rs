//! errclass walkthrough
//!
//! Builds a small class tree, fails through a few layers, and prints what a
//! handler sees at the top.
//!
//! # Environment Variables
//!
//! - `ERRCLASS_MAX_STACK_FRAMES=8` - Cap captured frames per error
//! - `ERRCLASS_STACK_LOG_LENGTH=512` - Cap the stack dump in creation logs

use std::fs;
use std::sync::Arc;

use errclass::{
    catch_panic, finalize_all, gen_sym, record, set_data, set_log_sink, ClassResult, DataKey, ErrorClass,
    ErrorGroup, LogSink, LoggingErrorGroup, ResultExt, IO_ERROR, PROGRAMMER_ERROR,
};
use errclass_http::{error_body, override_error_body, set_status_code, status_code};
use once_cell::sync::Lazy;

static RETRYABLE: Lazy<DataKey> = Lazy::new(gen_sym);

static STORE_ERROR: Lazy<&'static ErrorClass> = Lazy::new(|| {
    ErrorClass::new(
        None,
        "Store Error",
        &[set_status_code(503), set_data(*RETRYABLE, true), override_error_body("storage unavailable")],
    )
});
static CORRUPT_RECORD: Lazy<&'static ErrorClass> =
    Lazy::new(|| STORE_ERROR.child("Corrupt Record", &[set_data(*RETRYABLE, false)]));

/// Prints creation logs to stderr instead of going through `log`.
struct Stderr;

impl LogSink for Stderr {
    fn log_with_stack(&self, message: &str, stack: &str) {
        eprintln!("[creation log] {}\n{}", message, stack.lines().take(6).collect::<Vec<_>>().join("\n"));
    }
}

fn read_record(path: &str) -> ClassResult<Vec<u8>> {
    let bytes = fs::read(path).wrap_err(*IO_ERROR)?;
    if bytes.is_empty() {
        return Err(errclass::err!(*CORRUPT_RECORD, "record {} is empty", path));
    }
    Ok(bytes)
}

fn load(path: &str) -> ClassResult<Vec<u8>> {
    read_record(path).map_err(|e| STORE_ERROR.wrap(e)).map_err(record)
}

fn main() {
    println!("=== errclass Demo ===\n");
    set_log_sink(Arc::new(Stderr));

    // 1. A foreign failure classified at the boundary
    match load("/definitely/not/a/record") {
        Ok(_) => println!("unexpected success"),
        Err(err) => {
            println!("full rendering:\n{}\n", err);
            println!("message only: {:#}", err);
            println!("is Store Error: {}", err.is(*STORE_ERROR));
            println!("retryable: {:?}", err.data::<bool>(*RETRYABLE));
            println!("http: {} {}\n", status_code(&err, 500), error_body(&err));
        }
    }

    // 2. A subclass overriding inherited metadata
    let corrupt = CORRUPT_RECORD.error("checksum mismatch");
    println!("corrupt retryable: {:?}", corrupt.data::<bool>(*RETRYABLE));
    println!("corrupt http: {} {}\n", status_code(&corrupt, 500), error_body(&corrupt));

    // 3. Defects log once on creation
    let _ = PROGRAMMER_ERROR.error("negative buffer length");

    // 4. Panics become errors at an explicit boundary
    let recovered = catch_panic(|| -> ClassResult<()> { panic!("plugin crashed") });
    if let Err(err) = recovered {
        println!("\nrecovered: {:#}", err);
    }

    // 5. Cleanup with groups
    let mut closes = ErrorGroup::bounded(2);
    let mut workers = LoggingErrorGroup::new("workers");
    for i in 0..4 {
        closes.add(IO_ERROR.error(format!("close fd {} failed", i)));
        workers.add_opt((i % 2 == 1).then(|| format!("worker {} timed out", i)));
    }
    if let Err(err) = finalize_all(&mut [&mut closes, &mut workers]) {
        println!("\ncleanup:\n{}", errclass::message_of(&*err));
    }

    println!("\n=== Demo Complete ===");
}
