//! Audit policy constants

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Prefix of a customer-managed KMS key reference
pub const CMK_ARN_PREFIX: &str = "arn:aws:kms";

pub const REQUIRED_TAGS: [&str; 3] = ["Name", "Created By", "Environment"];

/// What a compliant queue looks like
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuditPolicy {
    #[serde(default = "default_region")]
    pub region: String,

    /// A list, or a single comma-separated string as environment variables
    /// provide it
    #[serde(
        default = "default_required_tags",
        deserialize_with = "deserialize_tag_list"
    )]
    pub required_tags: Vec<String>,

    #[serde(default = "default_cmk_prefix")]
    pub cmk_prefix: String,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            region: default_region(),
            required_tags: default_required_tags(),
            cmk_prefix: default_cmk_prefix(),
        }
    }
}

impl AuditPolicy {
    /// VPC endpoint service name for SQS in the policy region
    pub fn service_name(&self) -> String {
        format!("com.amazonaws.{}.sqs", self.region)
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_required_tags() -> Vec<String> {
    REQUIRED_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_cmk_prefix() -> String {
    CMK_ARN_PREFIX.to_string()
}

fn deserialize_tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TagListVisitor;

    impl<'de> Visitor<'de> for TagListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of tag names or a comma-separated string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value.split(',').map(|t| t.trim().to_string()).collect())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut tags = Vec::new();
            while let Some(tag) = seq.next_element::<String>()? {
                tags.push(tag);
            }
            Ok(tags)
        }
    }

    deserializer.deserialize_any(TagListVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = AuditPolicy::default();
        assert_eq!(policy.service_name(), "com.amazonaws.us-east-1.sqs");
        assert_eq!(policy.required_tags, vec!["Name", "Created By", "Environment"]);
        assert_eq!(policy.cmk_prefix, "arn:aws:kms");
    }

    #[test]
    fn test_partial_deserialize() {
        let policy: AuditPolicy = serde_json::from_str(r#"{"region": "eu-west-1"}"#).unwrap();
        assert_eq!(policy.service_name(), "com.amazonaws.eu-west-1.sqs");
        assert_eq!(policy.required_tags.len(), 3);
    }

    #[test]
    fn test_tags_from_comma_string() {
        let policy: AuditPolicy =
            serde_json::from_str(r#"{"required_tags": "Owner, Created By,Team"}"#).unwrap();
        assert_eq!(policy.required_tags, vec!["Owner", "Created By", "Team"]);
    }

    #[test]
    fn test_tags_from_list() {
        let policy: AuditPolicy =
            serde_json::from_str(r#"{"required_tags": ["Owner", "Cost Center"]}"#).unwrap();
        assert_eq!(policy.required_tags, vec!["Owner", "Cost Center"]);
    }

    #[test]
    fn test_tags_reject_other_types() {
        assert!(serde_json::from_str::<AuditPolicy>(r#"{"required_tags": 3}"#).is_err());
    }
}
