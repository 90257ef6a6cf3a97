use log::Log;
use log::{Level, LevelFilter};
use log::{Metadata, Record};
use spin::Once;

struct Logger;

impl Log for Logger {
    fn enabled(&self, _: &Metadata) -> bool {
        true // 允许全部级别的日志
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        use Level::*;
        let color = match record.level() {
            Error => 31,
            Warn => 93,
            Info => 34,
            Debug => 32,
            Trace => 90,
        };

        println!(
            "\u{1B}[{}m[{:<5}] [kernel] {}\u{1B}[0m",
            color,
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// 可以重复调用，只有第一次生效。
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        static LOGGER: Logger = Logger;
        let _ = log::set_logger(&LOGGER);

        let level = std::env::var("LOG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LevelFilter::Off);
        log::set_max_level(level);
    });
}
