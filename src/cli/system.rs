use clap::Subcommand;
use serde_json::{Map, Value};
use tabled::Tabled;

use crate::cli::output::{format_field, print_json, print_output, print_table};
use crate::config::{OutputMode, RuntimeConfig};
use crate::error::AppError;

#[derive(Subcommand)]
pub enum SystemCommand {
    /// System information (name, size, status, address)
    Info,

    /// Today's production summary
    Summary,

    /// Micro-inverters, meters, gateways and batteries
    Devices,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "MODEL")]
    model: String,
    #[tabled(rename = "SERIAL")]
    serial: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "LAST REPORT")]
    last_report: String,
}

pub async fn handle(cmd: &SystemCommand, config: &RuntimeConfig) -> Result<(), AppError> {
    let api = config.api()?;
    match cmd {
        SystemCommand::Info => {
            let info = api.system_information().await?;
            print_output(&Value::Object(info), config.output_mode);
        }
        SystemCommand::Summary => {
            let summary = api.system_summary().await?;
            print_output(&Value::Object(summary), config.output_mode);
        }
        SystemCommand::Devices => {
            let devices = api.system_devices().await?;
            if config.output_mode == OutputMode::Table {
                print_table(&device_rows(&devices));
            } else {
                print_json(&Value::Object(devices));
            }
        }
    }
    Ok(())
}

/// Flatten `{"devices": {"micros": [..], "meters": [..], ..}}` into one row per device.
fn device_rows(response: &Map<String, Value>) -> Vec<DeviceRow> {
    let Some(groups) = response.get("devices").and_then(Value::as_object) else {
        return vec![];
    };

    let text = |item: &Value, keys: &[&str]| -> String {
        keys.iter()
            .find_map(|k| item.get(*k).filter(|v| !v.is_null()))
            .map(|v| format_field(keys[0], v))
            .unwrap_or_else(|| "-".into())
    };

    let mut rows = Vec::new();
    for (kind, items) in groups {
        for item in items.as_array().into_iter().flatten() {
            rows.push(DeviceRow {
                kind: kind.clone(),
                name: text(item, &["name", "product_name"]),
                model: text(item, &["model", "sku"]),
                serial: text(item, &["serial_number"]),
                status: text(item, &["status"]),
                last_report: text(item, &["last_report_at"]),
            });
        }
    }
    rows
}
