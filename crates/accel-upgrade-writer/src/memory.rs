//! In-memory assignment store for tests and dry runs

use crate::error::{Result, WriterError};
use crate::store::AssignmentStore;
use accel_upgrade_core::{SubnetCidrRecord, VpcCidrRecord};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

/// A row as it was handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredRow {
    Vpc { table: String, record: VpcCidrRecord },
    Subnet { table: String, record: SubnetCidrRecord },
}

impl StoredRow {
    pub fn table(&self) -> &str {
        match self {
            StoredRow::Vpc { table, .. } | StoredRow::Subnet { table, .. } => table,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredRow>>,
    /// `(table, id)` pairs whose put is rejected
    rejected: Mutex<HashSet<(String, u64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the put of record `id` into `table` fail.
    pub fn reject(&self, table: &str, id: u64) {
        self.rejected.lock().insert((table.to_string(), id));
    }

    /// Rows written so far, in write order
    pub fn rows(&self) -> Vec<StoredRow> {
        self.rows.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    fn check(&self, table: &str, id: u64) -> Result<()> {
        if self.rejected.lock().contains(&(table.to_string(), id)) {
            return Err(WriterError::write_failure(table, id, "rejected by memory store"));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn put_vpc(&self, table: &str, record: &VpcCidrRecord) -> Result<()> {
        self.check(table, record.id)?;
        self.rows.lock().push(StoredRow::Vpc {
            table: table.to_string(),
            record: record.clone(),
        });
        Ok(())
    }

    async fn put_subnet(&self, table: &str, record: &SubnetCidrRecord) -> Result<()> {
        self.check(table, record.id)?;
        self.rows.lock().push(StoredRow::Subnet {
            table: table.to_string(),
            record: record.clone(),
        });
        Ok(())
    }
}
