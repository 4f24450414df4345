//! Compliance predicates
//!
//! Each check is a pure function of data already fetched from AWS and
//! yields the findings it detects. Ordering of the returned findings
//! follows the order in which the policy lists its requirements.

use std::collections::HashMap;

use crate::collaborator::VpcEndpoint;
use crate::finding::Finding;
use crate::policy::AuditPolicy;

/// Attribute holding the KMS key used for server-side encryption
pub const KMS_MASTER_KEY_ID: &str = "KmsMasterKeyId";

pub fn vpc_endpoint(queue: &str, endpoints: &[VpcEndpoint], policy: &AuditPolicy) -> Option<Finding> {
    if endpoints.is_empty() {
        Some(Finding::NoVpcEndpoint {
            queue: queue.to_string(),
            region: policy.region.clone(),
        })
    } else {
        None
    }
}

/// At most one finding: a queue is either unencrypted or on the wrong key.
pub fn encryption(
    queue: &str,
    attributes: &HashMap<String, String>,
    policy: &AuditPolicy,
) -> Option<Finding> {
    match attributes.get(KMS_MASTER_KEY_ID) {
        None => Some(Finding::NotEncrypted {
            queue: queue.to_string(),
        }),
        Some(key_id) if !key_id.starts_with(&policy.cmk_prefix) => {
            Some(Finding::NotCustomerManagedKey {
                queue: queue.to_string(),
            })
        }
        Some(_) => None,
    }
}

pub fn required_tags(
    queue: &str,
    tags: &HashMap<String, String>,
    policy: &AuditPolicy,
) -> Vec<Finding> {
    policy
        .required_tags
        .iter()
        .filter(|tag| !tags.contains_key(tag.as_str()))
        .map(|tag| Finding::MissingTag {
            queue: queue.to_string(),
            tag: tag.clone(),
        })
        .collect()
}
