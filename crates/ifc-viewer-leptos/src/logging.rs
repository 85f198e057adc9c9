//! `log` backend writing to the browser console

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Routes `log` records to the matching `console` method
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = wasm_bindgen::JsValue::from_str(&record.args().to_string());
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            Level::Info => web_sys::console::info_1(&msg),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

/// Level for a debug flag: everything with `?debug=1`, info and up otherwise
pub fn level_for(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the console logger; later calls only adjust the level
pub fn init(debug: bool) {
    if log::set_logger(&LOGGER).is_ok() && debug {
        web_sys::console::log_1(&"[IFC Viewer] Debug mode enabled via URL".into());
    }
    log::set_max_level(level_for(debug));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_debug_flag() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}
