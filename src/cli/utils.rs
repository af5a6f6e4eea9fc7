use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(map)) = data {
                response.as_object_mut().unwrap().extend(map);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a window collection in the appropriate format
pub fn output_windows(
    output_format: &OutputFormat,
    collection_name: &str,
    windows: &Value,
    empty_message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: windows
            }))?);
        }
        OutputFormat::Text => {
            let items = windows.as_array().cloned().unwrap_or_default();
            if items.is_empty() {
                println!("{}", empty_message);
                return Ok(());
            }
            for item in items {
                let id = item.get("id").and_then(|v| v.as_str()).unwrap_or("-");
                let start = item.get("start_time").and_then(|v| v.as_str()).unwrap_or("-");
                let end = item.get("end_time").and_then(|v| v.as_str()).unwrap_or("-");
                let active = item.get("is_active").and_then(|v| v.as_bool()).unwrap_or(false);
                let message = item.get("message_en").and_then(|v| v.as_str()).unwrap_or("");
                println!("{}  {} -> {}  active={}  {}", id, start, end, active, message);
            }
        }
    }
    Ok(())
}
