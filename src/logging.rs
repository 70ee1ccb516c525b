use log::{Level, LevelFilter, Log, Metadata, Record};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

static JSON_LOGGER: JsonLogger = JsonLogger;

/// Writes `log` records as the same JSON lines `log_event` emits.
struct JsonLogger;

impl Log for JsonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        log_event(
            record.level(),
            "log",
            serde_json::json!({
                "target": record.target(),
                "message": record.args().to_string(),
            }),
        );
    }

    fn flush(&self) {}
}

pub fn parse_log_level(value: Option<&str>) -> LevelFilter {
    match value
        .map(str::trim)
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => DEFAULT_LOG_LEVEL,
    }
}

/// Installs the JSON logger once; later calls only adjust the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&JSON_LOGGER);
    log::set_max_level(level);
}

pub fn log_event(level: Level, event: &str, fields: serde_json::Value) {
    if level > log::max_level() {
        return;
    }

    println!("{}", render_event(now_unix_seconds(), level, event, fields));
}

fn render_event(ts: u64, level: Level, event: &str, fields: serde_json::Value) -> serde_json::Value {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(ts)),
    );
    payload.insert(
        "level".to_string(),
        serde_json::Value::String(level.as_str().to_ascii_lowercase()),
    );
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    serde_json::Value::Object(payload)
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parsing_falls_back_to_info() {
        assert_eq!(parse_log_level(Some(" DEBUG ")), LevelFilter::Debug);
        assert_eq!(parse_log_level(Some("warn")), LevelFilter::Warn);
        assert_eq!(parse_log_level(Some("verbose")), LevelFilter::Info);
        assert_eq!(parse_log_level(None), LevelFilter::Info);
    }

    #[test]
    fn rendered_event_puts_envelope_first() {
        let rendered = render_event(
            1_700_000_000,
            Level::Warn,
            "sync_skipped_file",
            serde_json::json!({ "file": "notes.txt" }),
        );

        assert_eq!(
            rendered.to_string(),
            r#"{"ts":1700000000,"level":"warn","event":"sync_skipped_file","file":"notes.txt"}"#
        );
    }
}
