//! Configuration management

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use sqs_guard_core::AuditPolicy;

/// Load the audit policy from `sqs-guard.toml` (optional) and `SQS_GUARD_*`
/// environment variables. Anything unset keeps its default.
pub fn load_policy() -> anyhow::Result<AuditPolicy> {
    build_policy(
        Config::builder()
            .add_source(File::with_name("sqs-guard").required(false))
            .add_source(environment()),
    )
}

/// `SQS_GUARD_REQUIRED_TAGS` stays a string here; `AuditPolicy` splits it.
fn environment() -> Environment {
    Environment::with_prefix("SQS_GUARD")
}

fn build_policy(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AuditPolicy> {
    let policy = builder.build()?.try_deserialize::<AuditPolicy>()?;

    if policy.required_tags.iter().any(|t| t.trim().is_empty()) {
        anyhow::bail!("required_tags must not contain empty tag names");
    }

    Ok(policy)
}
