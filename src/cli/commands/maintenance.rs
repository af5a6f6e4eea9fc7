use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success, output_windows};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum MaintenanceCommands {
    #[command(about = "Schedule a new maintenance window")]
    Schedule {
        #[arg(long, help = "Window start (RFC 3339, e.g. 2026-08-07T22:00:00Z)")]
        start: String,

        #[arg(long, help = "Window end (RFC 3339)")]
        end: String,

        #[arg(long = "message-tr", help = "Notice text (Turkish)")]
        message_tr: String,

        #[arg(long = "message-en", help = "Notice text (English)")]
        message_en: String,

        #[arg(long = "service", help = "Affected service name; repeat for several, omit for all")]
        services: Vec<String>,
    },

    #[command(about = "Cancel a scheduled window (keeps the record)")]
    Cancel {
        id: String,
    },

    #[command(about = "Delete a window permanently")]
    Delete {
        id: String,
    },

    #[command(about = "Show the currently effective window, if any")]
    Active,

    #[command(about = "List upcoming windows")]
    Upcoming,

    #[command(about = "Show recent windows, newest first")]
    History {
        #[arg(long, help = "Maximum number of rows")]
        limit: Option<i64>,
    },

    #[command(about = "Show server health and gate state")]
    Status,
}

fn api_url() -> String {
    std::env::var("ATLAS_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn api_token() -> anyhow::Result<String> {
    std::env::var("ATLAS_API_TOKEN")
        .map_err(|_| anyhow!("ATLAS_API_TOKEN is not set; log in first and export the token"))
}

fn parse_time(label: &str, value: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid {} timestamp: {}", label, value))
}

async fn api_request(
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> anyhow::Result<(reqwest::StatusCode, Value)> {
    let client = reqwest::Client::new();
    let mut request = client
        .request(method, format!("{}{}", api_url(), path))
        .bearer_auth(api_token()?);

    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.context("request failed")?;
    let status = response.status();
    let body = if status == reqwest::StatusCode::NO_CONTENT {
        Value::Null
    } else {
        response.json().await.unwrap_or(Value::Null)
    };

    Ok((status, body))
}

fn error_message(body: &Value) -> String {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(|v| v.as_str())
        .unwrap_or("request rejected")
        .to_string()
}

pub async fn handle(cmd: MaintenanceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        MaintenanceCommands::Schedule { start, end, message_tr, message_en, services } => {
            let start = parse_time("start", &start)?;
            let end = parse_time("end", &end)?;

            let payload = json!({
                "start_time": start,
                "end_time": end,
                "message_tr": message_tr,
                "message_en": message_en,
                "affected_services": if services.is_empty() { Value::Null } else { json!(services) },
            });

            let (status, body) =
                api_request(reqwest::Method::POST, "/api/admin/maintenance", Some(payload)).await?;

            if status.is_success() {
                let window = body.get("data").cloned().unwrap_or(Value::Null);
                output_success(&output_format, "Maintenance window scheduled", Some(json!({ "window": window })))
            } else {
                output_error(&output_format, &error_message(&body), None)
            }
        }

        MaintenanceCommands::Cancel { id } => {
            let (status, body) = api_request(
                reqwest::Method::POST,
                &format!("/api/admin/maintenance/{}/cancel", id),
                None,
            )
            .await?;

            if status.is_success() {
                output_success(&output_format, "Maintenance window canceled", None)
            } else {
                output_error(&output_format, &error_message(&body), None)
            }
        }

        MaintenanceCommands::Delete { id } => {
            let (status, body) = api_request(
                reqwest::Method::DELETE,
                &format!("/api/admin/maintenance/{}", id),
                None,
            )
            .await?;

            if status.is_success() {
                output_success(&output_format, "Maintenance window deleted", None)
            } else {
                output_error(&output_format, &error_message(&body), None)
            }
        }

        MaintenanceCommands::Active => {
            let (status, body) =
                api_request(reqwest::Method::GET, "/api/admin/maintenance/active", None).await?;

            if !status.is_success() {
                return output_error(&output_format, &error_message(&body), None);
            }

            match body.get("data") {
                Some(Value::Null) | None => {
                    output_success(&output_format, "No maintenance window is currently in effect", None)
                }
                Some(window) => output_success(
                    &output_format,
                    "Maintenance window in effect",
                    Some(json!({ "window": window })),
                ),
            }
        }

        MaintenanceCommands::Upcoming => {
            let (status, body) =
                api_request(reqwest::Method::GET, "/api/admin/maintenance/upcoming", None).await?;

            if !status.is_success() {
                return output_error(&output_format, &error_message(&body), None);
            }

            let windows = body.get("data").cloned().unwrap_or(json!([]));
            output_windows(&output_format, "upcoming", &windows, "No upcoming maintenance windows")
        }

        MaintenanceCommands::History { limit } => {
            let path = match limit {
                Some(limit) => format!("/api/admin/maintenance/history?limit={}", limit),
                None => "/api/admin/maintenance/history".to_string(),
            };

            let (status, body) = api_request(reqwest::Method::GET, &path, None).await?;

            if !status.is_success() {
                return output_error(&output_format, &error_message(&body), None);
            }

            let windows = body.get("data").cloned().unwrap_or(json!([]));
            output_windows(&output_format, "history", &windows, "No maintenance history")
        }

        MaintenanceCommands::Status => {
            // Health is public; no token required
            let client = reqwest::Client::new();
            let response = client
                .get(format!("{}/health", api_url()))
                .send()
                .await
                .context("request failed")?;

            let body: Value = response.json().await.unwrap_or(Value::Null);
            let data = body.get("data").cloned().unwrap_or(Value::Null);
            let gate = data.get("gate").and_then(|v| v.as_str()).unwrap_or("unknown");
            let db = data.get("database").and_then(|v| v.as_str()).unwrap_or("degraded");

            output_success(
                &output_format,
                &format!("gate={} database={}", gate, db),
                Some(json!({ "health": data })),
            )
        }
    }
}
