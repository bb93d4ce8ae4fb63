use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};

/// Log record captured by [`CapturingLogger`].
struct Captured {
    thread: ThreadId,
    level: Level,
    message: String,
}

/// Process-wide logger that remembers which thread emitted each record.
///
/// Tests run in parallel on separate threads, so lookups filter by the
/// calling thread.
struct CapturingLogger {
    records: Mutex<Vec<Captured>>,
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push(Captured {
                thread: thread::current().id(),
                level: record.level(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

/// Route `log` output into the capturing logger.
pub fn install_capturing_logger() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Debug);
        }
    });
}

/// Messages logged at `level` by the current thread.
pub fn captured_messages(level: Level) -> Vec<String> {
    let current = thread::current().id();
    let records = LOGGER
        .records
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    records
        .iter()
        .filter(|captured| captured.thread == current && captured.level == level)
        .map(|captured| captured.message.clone())
        .collect()
}
