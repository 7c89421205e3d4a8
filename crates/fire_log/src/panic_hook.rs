//! Crash reports
//!
//! A panic writes `crash-<timestamp>.txt` next to the log files. Callers
//! register what the gateway was doing with [`set_crash_context`].

use backtrace::Backtrace;
use chrono::Local;
use parking_lot::{const_mutex, Mutex};
use std::panic::PanicHookInfo;
use std::path::PathBuf;

static CONTEXT: Mutex<Vec<(&'static str, String)>> = const_mutex(Vec::new());

pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook installed");
}

/// Record a `key: value` line for crash reports, replacing an earlier value
pub fn set_crash_context(key: &'static str, value: impl Into<String>) {
    let value = value.into();
    let mut context = CONTEXT.lock();
    match context.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => context.push((key, value)),
    }
}

fn panic_handler(info: &PanicHookInfo) {
    // The panicking thread may hold the lock
    let context = CONTEXT.try_lock().map(|c| c.clone()).unwrap_or_default();

    let thread = std::thread::current();
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    let report = render_report(
        thread.name().unwrap_or("<unnamed>"),
        &location,
        &payload_message(info),
        &context,
        &format!("{:?}", Backtrace::new()),
    );

    eprintln!("{}", report);
    tracing::error!(location = %location, "Gateway panicked");

    let path = crash_file();
    match std::fs::write(&path, &report) {
        Ok(()) => eprintln!("Crash report written to {}", path.display()),
        Err(e) => eprintln!("Failed to write crash report: {}", e),
    }
}

fn crash_file() -> PathBuf {
    let name = format!("crash-{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
    let dir = super::log_dir();
    if std::fs::create_dir_all(&dir).is_ok() {
        dir.join(name)
    } else {
        std::env::temp_dir().join(name)
    }
}

fn render_report(
    thread: &str,
    location: &str,
    message: &str,
    context: &[(&'static str, String)],
    backtrace: &str,
) -> String {
    let mut report = String::from("fire_gateway crash report\n\n");
    report.push_str(&format!("time: {}\n", Local::now().to_rfc3339()));
    report.push_str(&format!("thread: {}\n", thread));
    report.push_str(&format!("at: {}\n", location));
    report.push_str(&format!("message: {}\n", message));
    for (key, value) in context {
        report.push_str(&format!("{}: {}\n", key, value));
    }
    report.push_str("\nbacktrace:\n");
    report.push_str(backtrace);
    report
}

fn payload_message(info: &PanicHookInfo) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string payload>".to_string()
    }
}
