// Sink abstraction for CIDR assignment records
//
// Implementations:
// - DynamoDbStore (the real tables)
// - MemoryStore (tests and dry runs)

use crate::error::{Result, WriterError};
use accel_upgrade_core::{SubnetCidrRecord, VpcCidrRecord};
use async_trait::async_trait;

/// Names of the two assignment tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub vpc: String,
    pub subnet: String,
}

impl TableNames {
    /// `<prefix>cidr-vpc-assign` and `<prefix>cidr-subnet-assign`
    pub fn for_prefix(prefix: &str) -> Result<Self> {
        if prefix.chars().any(char::is_whitespace) {
            return Err(WriterError::invalid_config(format!(
                "accelerator prefix '{}' must not contain whitespace",
                prefix
            )));
        }
        Ok(Self {
            vpc: format!("{}cidr-vpc-assign", prefix),
            subnet: format!("{}cidr-subnet-assign", prefix),
        })
    }
}

/// Append-only writer for assignment rows
///
/// One call per record; implementations must not batch or reorder.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn put_vpc(&self, table: &str, record: &VpcCidrRecord) -> Result<()>;

    async fn put_subnet(&self, table: &str, record: &SubnetCidrRecord) -> Result<()>;
}
