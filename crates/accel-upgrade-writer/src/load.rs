// Sequential, best-effort replay of a load plan
//
// Records are written one at a time in plan order: every VPC row, then
// every subnet row. A rejected write is logged and counted; the remaining
// records are still attempted. Nothing already written is rolled back.

use crate::store::{AssignmentStore, TableNames};
use accel_upgrade_core::CidrLoadPlan;
use tracing::{error, info};

/// Outcome of replaying a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub vpcs_written: usize,
    pub subnets_written: usize,
    pub vpcs_failed: usize,
    pub subnets_failed: usize,
}

impl LoadSummary {
    pub fn written(&self) -> usize {
        self.vpcs_written + self.subnets_written
    }

    pub fn failed(&self) -> usize {
        self.vpcs_failed + self.subnets_failed
    }

    /// True when every record of the plan was accepted
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }
}

pub async fn load_plan(
    store: &dyn AssignmentStore,
    tables: &TableNames,
    plan: &CidrLoadPlan,
) -> LoadSummary {
    let mut summary = LoadSummary::default();

    for record in &plan.vpcs {
        info!(
            "Adding CIDR {} for VPC {} in table {}",
            record.cidr, record.vpc_name, tables.vpc
        );
        match store.put_vpc(&tables.vpc, record).await {
            Ok(()) => summary.vpcs_written += 1,
            Err(e) => {
                error!(id = record.id, account_ou_key = %record.account_ou_key, "{}", e);
                summary.vpcs_failed += 1;
            }
        }
    }

    for record in &plan.subnets {
        info!(
            "Adding CIDR for Subnet {}-{} in table {}",
            record.subnet_name, record.az, tables.subnet
        );
        match store.put_subnet(&tables.subnet, record).await {
            Ok(()) => summary.subnets_written += 1,
            Err(e) => {
                error!(id = record.id, account_ou_key = %record.account_ou_key, "{}", e);
                summary.subnets_failed += 1;
            }
        }
    }

    info!(
        written = summary.written(),
        failed = summary.failed(),
        "CIDR load finished"
    );
    summary
}
