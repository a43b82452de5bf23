use chrono::{DateTime, SecondsFormat};
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::OutputMode;

pub fn print_json(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

pub fn print_table<T: Tabled>(data: &[T]) {
    if data.is_empty() {
        println!("No results.");
        return;
    }
    let table = Table::new(data).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// JSON as-is, or one FIELD/VALUE row per top-level key in table mode.
pub fn print_output(value: &Value, mode: OutputMode) {
    match (mode, value.as_object()) {
        (OutputMode::Table, Some(obj)) => {
            let rows: Vec<KvRow> = obj.iter().map(|(k, v)| KvRow::new(k, v)).collect();
            print_table(&rows);
        }
        _ => print_json(value),
    }
}

pub fn print_error(err: &crate::error::AppError) {
    eprintln!(
        "{}",
        serde_json::to_string_pretty(&err.to_json()).unwrap_or_default()
    );
}

#[derive(Tabled)]
pub struct KvRow {
    #[tabled(rename = "FIELD")]
    pub field: String,
    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl KvRow {
    pub fn new(field: &str, value: &Value) -> Self {
        Self {
            field: field.to_string(),
            value: format_field(field, value),
        }
    }
}

/// Render one JSON value for a table cell. Integer `*_at` fields are epoch
/// seconds and are shown as RFC 3339.
pub fn format_field(key: &str, value: &Value) -> String {
    match value {
        Value::Null => "-".into(),
        Value::String(s) => s.clone(),
        Value::Number(n) if key.ends_with("_at") => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_timestamp_field() {
        assert_eq!(
            format_field("last_report_at", &json!(1700000000)),
            "2023-11-14T22:13:20Z"
        );
    }

    #[test]
    fn test_format_plain_number_untouched() {
        assert_eq!(format_field("energy_today", &json!(4500)), "4500");
    }

    #[test]
    fn test_format_scalars() {
        assert_eq!(format_field("status", &json!("normal")), "normal");
        assert_eq!(format_field("battery_charge_w", &Value::Null), "-");
        assert_eq!(format_field("active", &json!(true)), "true");
    }

    #[test]
    fn test_format_nested_is_compact_json() {
        assert_eq!(format_field("address", &json!({"state": "CA"})), r#"{"state":"CA"}"#);
    }
}
