//! Flagwire operator CLI.
//!
//! Small tooling around the notification pipeline:
//! - `render` - render a persisted event record to its Slack message
//! - `test-webhook` - post the connectivity test message to a webhook URL
//! - `dispatch` - fan a record out to integrations from a JSON config

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use flagwire_events::{EventRecord, InMemoryEventStore, TagFilterEngine};
use flagwire_slack::{
    DeliveryReport, MessageBuilder, SlackConfig, SlackIntegration, SlackMessage, WebhookClient,
    builder::webhook_test_message, deliver_to_integrations, slack_data_for_event,
};

#[derive(Parser)]
#[command(name = "flagwire", about = "Flagwire Slack notification tooling", version)]
struct Cli {
    /// Log filter, e.g. "debug" or "flagwire_slack=trace".
    #[arg(long, global = true, default_value = "info", env = "FLAGWIRE_LOG")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an event record to its Slack message without delivering it.
    Render {
        /// Path to the event record JSON, or "-" for stdin.
        record: PathBuf,
    },

    /// Post the connectivity test message to a webhook URL.
    TestWebhook {
        /// The incoming-webhook URL to post to.
        url: String,

        /// Webhook id echoed in the test message.
        #[arg(long, default_value = "cli-test")]
        webhook_id: String,
    },

    /// Fan an event record out to the integrations in a JSON config file.
    Dispatch {
        /// Path to the event record JSON, or "-" for stdin.
        record: PathBuf,

        /// Path to a JSON array of integrations.
        #[arg(long)]
        integrations: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&cli.log)
                .context("invalid log filter")?,
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SlackConfig::from_env();

    match cli.command {
        Commands::Render { record } => render(&record, &config).await,
        Commands::TestWebhook { url, webhook_id } => test_webhook(&url, &webhook_id, &config).await,
        Commands::Dispatch {
            record,
            integrations,
        } => dispatch(&record, &integrations, &config).await,
    }
}

async fn render(record_path: &Path, config: &SlackConfig) -> Result<()> {
    let record = read_record(record_path)?;

    match render_record(&record, config).await? {
        Some(message) => println!("{}", serde_json::to_string_pretty(&message)?),
        None => info!(event_id = %record.id, "event produces no notification"),
    }
    Ok(())
}

async fn test_webhook(url: &str, webhook_id: &str, config: &SlackConfig) -> Result<()> {
    let client = WebhookClient::new(config);
    let message = webhook_test_message(webhook_id);

    if client.send_message(&message, url).await {
        info!(%url, "webhook acknowledged the test message");
        Ok(())
    } else {
        bail!("webhook did not acknowledge the test message");
    }
}

async fn dispatch(record_path: &Path, integrations_path: &Path, config: &SlackConfig) -> Result<()> {
    let record = read_record(record_path)?;
    let integrations = load_integrations(integrations_path)?;
    let report = dispatch_record(&record, &integrations, config).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_fully_delivered() {
        bail!("delivery failed for: {}", report.failed.join(", "));
    }
    Ok(())
}

/// Render a record to its message, if its event notifies at all.
async fn render_record(record: &EventRecord, config: &SlackConfig) -> Result<Option<SlackMessage>> {
    let builder = builder_for(record, config);
    let data = slack_data_for_event(record, &builder, &TagFilterEngine).await?;
    Ok(data.map(|data| data.message))
}

/// Fan a record out to `integrations` and report per-target outcomes.
async fn dispatch_record(
    record: &EventRecord,
    integrations: &[SlackIntegration],
    config: &SlackConfig,
) -> Result<DeliveryReport> {
    let builder = builder_for(record, config);
    let client = WebhookClient::new(config);
    let report =
        deliver_to_integrations(record, &builder, &TagFilterEngine, &client, integrations).await?;
    Ok(report)
}

/// Builder backed by a store that holds only the record itself, so actor
/// attribution works without a database.
fn builder_for(record: &EventRecord, config: &SlackConfig) -> MessageBuilder {
    let store = InMemoryEventStore::new();
    store.insert(record.clone());
    MessageBuilder::new(config.app_origin.clone(), Arc::new(store))
}

fn load_integrations(path: &Path) -> Result<Vec<SlackIntegration>> {
    serde_json::from_str(
        &std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
    )
    .context("parsing integrations config")
}

fn read_record(path: &Path) -> Result<EventRecord> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading record from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&raw).context("parsing event record")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(data: Value) -> EventRecord {
        EventRecord {
            id: "ev_cli".to_string(),
            version: Some(1),
            date_created: Utc::now(),
            data,
        }
    }

    fn integration(name: &str, url: String) -> SlackIntegration {
        SlackIntegration {
            id: None,
            name: name.to_string(),
            webhook_url: url,
            tags: vec![],
            projects: vec![],
        }
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("flagwire-cli-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_render_record_produces_message() {
        let record = record(json!({
            "event": "feature.updated",
            "data": { "object": { "id": "checkout-flag" } },
            "user": { "type": "dashboard", "name": "Ada", "email": "ada@example.com" }
        }));

        let message = render_record(&record, &SlackConfig::default())
            .await
            .unwrap()
            .expect("feature events render a message");
        assert_eq!(
            message.text,
            "The feature checkout-flag has been updated by Ada (ada@example.com)"
        );
        assert!(!message.blocks.is_empty());
    }

    #[tokio::test]
    async fn test_render_record_none_for_unnotified_kind() {
        let record = record(json!({
            "event": "user.login",
            "data": { "object": { "name": "Ada", "email": "ada@example.com" } }
        }));

        let message = render_record(&record, &SlackConfig::default())
            .await
            .unwrap();
        assert_eq!(message, None);
    }

    #[tokio::test]
    async fn test_dispatch_record_delivers_to_mock_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let record = record(json!({
            "event": "webhook.test",
            "data": { "object": { "webhookId": "wh_1" } }
        }));
        let integrations = vec![integration("Ops", format!("{}/hook", server.uri()))];

        let report = dispatch_record(&record, &integrations, &SlackConfig::default())
            .await
            .unwrap();
        assert_eq!(report.delivered, vec!["Ops".to_string()]);
        assert!(report.is_fully_delivered());
    }

    #[tokio::test]
    async fn test_dispatch_command_fails_on_undelivered_integration() {
        let record_path = temp_file(
            "record.json",
            &serde_json::to_string(&record(json!({
                "event": "webhook.test",
                "data": { "object": { "webhookId": "wh_1" } }
            })))
            .unwrap(),
        );
        // Reserved port with nothing listening.
        let integrations_path = temp_file(
            "integrations.json",
            r#"[{ "name": "Dead", "webhookUrl": "http://127.0.0.1:9/hook" }]"#,
        );

        let result = dispatch(&record_path, &integrations_path, &SlackConfig::default()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Dead"));
    }

    #[tokio::test]
    async fn test_read_record_round_trip() {
        let path = temp_file(
            "roundtrip.json",
            r#"{
                "id": "ev_1",
                "version": 1,
                "dateCreated": "2026-01-15T10:00:00Z",
                "data": { "event": "feature.created", "data": { "object": { "id": "f" } } }
            }"#,
        );

        let record = read_record(&path).unwrap();
        assert_eq!(record.id, "ev_1");
        assert!(record.is_current());
    }

    #[test]
    fn test_load_integrations_rejects_malformed_config() {
        let path = temp_file("bad-integrations.json", r#"{ "not": "an array" }"#);
        assert!(load_integrations(&path).is_err());
    }
}
