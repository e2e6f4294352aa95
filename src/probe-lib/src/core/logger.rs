use std::sync::OnceLock;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Process-wide debug logger. Until `init` is called every message is dropped,
/// so the engine can be embedded without any logging setup.
pub struct Logger {
    debug: bool,
}

impl Logger {
    pub fn init(debug: bool) {
        let _ = LOGGER.get_or_init(|| Logger { debug });
    }

    fn enabled() -> bool {
        LOGGER.get().is_some_and(|logger| logger.debug)
    }

    pub fn debug(message: &str) {
        if Self::enabled() {
            eprintln!("{message}");
        }
    }

    pub fn debug_fmt(args: std::fmt::Arguments) {
        if Self::enabled() {
            eprintln!("{args}");
        }
    }
}

#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::core::logger::Logger::debug_fmt(format_args!($($arg)*))
    };
}
