//! SQS Guard - SQS queue compliance checker
//!
//! Audits one SQS queue per trigger event: VPC endpoint presence, KMS
//! customer-managed key encryption and required tags. Runs as a custom
//! Lambda runtime, or once locally with `--event`.

mod config;

use anyhow::Context;
use aws_config::SdkConfig;
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sqs_guard_aws::{load_sdk_config, Ec2EndpointDirectory, SqsQueueService};
use sqs_guard_core::{AuditSettings, Auditor, QueueTarget};
use sqs_guard_lambda::{AuditHandler, LambdaErrorResponse, Runtime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "sqs-guard")]
#[command(about = "SQS queue compliance checker", long_about = None)]
struct Args {
    /// Queue URL or name to audit instead of the one in the event
    #[arg(long, env = "SQS_QUEUE_URL_OR_NAME")]
    queue: Option<String>,

    /// Audit once with the JSON event in this file ("-" for stdin)
    #[arg(long)]
    event: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "SQS_GUARD_LOG_LEVEL")]
    log_level: String,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "SQS_GUARD_LOG_FORMAT")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    match &args.event {
        Some(path) => run_local(&args, path).await,
        None => run_lambda(&args).await,
    }
}

fn init_tracing(args: &Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("sqs_guard={}", args.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);

    match args.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
            .init(),
    }
}

fn build_auditor(args: &Args, sdk_config: &SdkConfig) -> anyhow::Result<Auditor> {
    let policy = config::load_policy().context("invalid configuration")?;
    let settings = AuditSettings {
        queue_override: args.queue.as_deref().and_then(QueueTarget::parse),
        policy,
    };

    Ok(Auditor::new(
        Arc::new(SqsQueueService::new(sdk_config)),
        Arc::new(Ec2EndpointDirectory::new(sdk_config)),
        settings,
    ))
}

async fn run_lambda(args: &Args) -> anyhow::Result<()> {
    let runtime = Runtime::from_env()?;
    let sdk_config = load_sdk_config().await;

    let auditor = match build_auditor(args, &sdk_config) {
        Ok(auditor) => auditor,
        Err(e) => {
            error!("Initialization failed: {:#}", e);
            runtime
                .send_init_error(&LambdaErrorResponse::new(
                    "Runtime.InitError",
                    format!("{:#}", e),
                ))
                .await?;
            return Err(e);
        }
    };

    let settings = auditor.settings();
    info!("Starting SQS Guard...");
    info!("  Region: {}", settings.policy.region);
    info!("  Required tags: {}", settings.policy.required_tags.join(", "));
    info!(
        "  Queue override: {}",
        settings
            .queue_override
            .as_ref()
            .map(QueueTarget::as_str)
            .unwrap_or("none")
    );

    runtime.run(&AuditHandler::new(auditor)).await?;
    Ok(())
}

async fn run_local(args: &Args, path: &Path) -> anyhow::Result<()> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    let event: Value = serde_json::from_str(&raw).context("event is not valid JSON")?;

    let sdk_config = load_sdk_config().await;
    let auditor = build_auditor(args, &sdk_config)?;
    let report = auditor.audit(&event).await?;

    info!(
        queue = %report.queue.short_name(),
        findings = report.findings.len(),
        "Local audit finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "sqs-guard",
            "--queue",
            "orders",
            "--event",
            "event.json",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.queue.as_deref(), Some("orders"));
        assert_eq!(args.event, Some(PathBuf::from("event.json")));
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_blank_queue_means_no_override() {
        let args = Args::try_parse_from(["sqs-guard", "--queue", ""]).unwrap();
        assert_eq!(args.queue.as_deref().and_then(QueueTarget::parse), None);
    }
}
