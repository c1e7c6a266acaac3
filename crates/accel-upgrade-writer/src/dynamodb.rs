//! DynamoDB-backed assignment store

use crate::error::{Result, WriterError};
use crate::store::AssignmentStore;
use accel_upgrade_core::{SubnetCidrRecord, VpcCidrRecord};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::debug;

/// Writes one `PutItem` per record.
///
/// Credentials come from the SDK's default provider chain; retries are the
/// SDK's own.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    /// Build a client for `region` from the ambient AWS configuration.
    pub async fn connect(region: &str) -> Result<Self> {
        if region.trim().is_empty() {
            return Err(WriterError::client_init(region, "region must not be empty"));
        }
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        debug!(region, "Configured DynamoDB client");
        Ok(Self::from_client(Client::new(&sdk_config)))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn put(&self, table: &str, id: u64, item: HashMap<String, AttributeValue>) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| WriterError::write_failure(table, id, DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for DynamoDbStore {
    async fn put_vpc(&self, table: &str, record: &VpcCidrRecord) -> Result<()> {
        self.put(table, record.id, vpc_item(record)).await
    }

    async fn put_subnet(&self, table: &str, record: &SubnetCidrRecord) -> Result<()> {
        self.put(table, record.id, subnet_item(record)).await
    }
}

fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

/// Item for the VPC table. `id` is stored as a string, `vpc-assigned-id` as
/// a number.
pub fn vpc_item(record: &VpcCidrRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("account-ou-key".to_string(), s(record.account_ou_key.as_str())),
        ("cidr".to_string(), s(record.cidr.as_str())),
        ("id".to_string(), s(record.id.to_string())),
        ("pool".to_string(), s(record.pool.as_str())),
        ("region".to_string(), s(record.region.as_str())),
        ("requester".to_string(), s(record.requester)),
        ("status".to_string(), s(record.status)),
        ("vpc-name".to_string(), s(record.vpc_name.as_str())),
        (
            "vpc-assigned-id".to_string(),
            AttributeValue::N(record.vpc_assigned_id.to_string()),
        ),
    ])
}

/// Item for the subnet table
pub fn subnet_item(record: &SubnetCidrRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("account-ou-key".to_string(), s(record.account_ou_key.as_str())),
        ("az".to_string(), s(record.az.as_str())),
        ("cidr".to_string(), s(record.cidr.as_str())),
        ("id".to_string(), s(record.id.to_string())),
        ("region".to_string(), s(record.region.as_str())),
        ("requester".to_string(), s(record.requester)),
        ("status".to_string(), s(record.status)),
        ("sub-pool".to_string(), s(record.sub_pool.as_str())),
        ("subnet-name".to_string(), s(record.subnet_name.as_str())),
        ("vpc-name".to_string(), s(record.vpc_name.as_str())),
    ])
}
