//! CIDR assignment table writer
//!
//! Replays a load plan from `accel-upgrade-core` into the
//! `<prefix>cidr-vpc-assign` and `<prefix>cidr-subnet-assign` tables.

mod dynamodb;
mod error;
mod load;
mod memory;
mod store;

pub use dynamodb::{subnet_item, vpc_item, DynamoDbStore};
pub use error::{ErrorCode, Result, WriterError};
pub use load::{load_plan, LoadSummary};
pub use memory::{MemoryStore, StoredRow};
pub use store::{AssignmentStore, TableNames};

// Re-export for convenience
pub use accel_upgrade_core;
