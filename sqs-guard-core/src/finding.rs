//! Compliance findings

use std::fmt;

/// A compliance violation found on a queue.
///
/// The `Display` text is the alert message written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    NoVpcEndpoint { queue: String, region: String },
    NotEncrypted { queue: String },
    NotCustomerManagedKey { queue: String },
    MissingTag { queue: String, tag: String },
}

impl Finding {
    pub fn queue(&self) -> &str {
        match self {
            Self::NoVpcEndpoint { queue, .. }
            | Self::NotEncrypted { queue }
            | Self::NotCustomerManagedKey { queue }
            | Self::MissingTag { queue, .. } => queue,
        }
    }

    /// Stable identifier used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoVpcEndpoint { .. } => "no_vpc_endpoint",
            Self::NotEncrypted { .. } => "not_encrypted",
            Self::NotCustomerManagedKey { .. } => "not_customer_managed_key",
            Self::MissingTag { .. } => "missing_tag",
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVpcEndpoint { queue, region } => write!(
                f,
                "No VPC endpoint found for SQS in {} for queue {}",
                region, queue
            ),
            Self::NotEncrypted { queue } => {
                write!(f, "Queue {} does not have encryption enabled.", queue)
            }
            Self::NotCustomerManagedKey { queue } => {
                write!(f, "Queue {} is not using a customer-managed key (CMK).", queue)
            }
            Self::MissingTag { queue, tag } => {
                write!(f, "Queue {} is missing required tag: {}", queue, tag)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_messages() {
        let q = "orders".to_string();
        assert_eq!(
            Finding::NoVpcEndpoint { queue: q.clone(), region: "us-east-1".into() }.to_string(),
            "No VPC endpoint found for SQS in us-east-1 for queue orders"
        );
        assert_eq!(
            Finding::NotEncrypted { queue: q.clone() }.to_string(),
            "Queue orders does not have encryption enabled."
        );
        assert_eq!(
            Finding::NotCustomerManagedKey { queue: q.clone() }.to_string(),
            "Queue orders is not using a customer-managed key (CMK)."
        );
        assert_eq!(
            Finding::MissingTag { queue: q, tag: "Created By".into() }.to_string(),
            "Queue orders is missing required tag: Created By"
        );
    }
}
