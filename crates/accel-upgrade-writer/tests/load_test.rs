// Integration tests for the best-effort loader

use accel_upgrade_core::{plan_cidr_load, ConfigAccountDirectory, ConfigDocument};
use accel_upgrade_writer::{load_plan, MemoryStore, StoredRow, TableNames};
use serde_json::json;

fn sample_plan() -> accel_upgrade_core::CidrLoadPlan {
    let document = ConfigDocument::from_value(json!({
        "organizational-units": {
            "Dev": {"vpc": [{
                "name": "Dev", "deploy": "local", "region": "${HOME_REGION}",
                "cidr": "10.2.0.0/16",
                "subnets": [{"name": "Web", "definitions": [
                    {"az": "a", "cidr": "10.2.0.0/24"},
                    {"az": "b", "cidr": "10.2.1.0/24"}
                ]}]
            }]}
        },
        "workload-account-configs": {
            "dev-1": {"ou": "Dev"}
        }
    }))
    .unwrap();
    let directory = ConfigAccountDirectory::from_document(&document).unwrap();
    plan_cidr_load(&document, "ca-central-1", &directory).unwrap()
}

#[tokio::test]
async fn test_plan_written_in_order() {
    let plan = sample_plan();
    let tables = TableNames::for_prefix("ASEA-").unwrap();
    let store = MemoryStore::new();

    let summary = load_plan(&store, &tables, &plan).await;
    assert!(summary.is_complete());
    assert_eq!(summary.vpcs_written, 2);
    assert_eq!(summary.subnets_written, 4);

    let rows = store.rows();
    assert_eq!(rows[0].table(), "ASEA-cidr-vpc-assign");
    assert_eq!(rows[2].table(), "ASEA-cidr-subnet-assign");
    let subnet_ids: Vec<u64> = rows
        .iter()
        .filter_map(|row| match row {
            StoredRow::Subnet { record, .. } => Some(record.id),
            StoredRow::Vpc { .. } => None,
        })
        .collect();
    assert_eq!(subnet_ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_failed_write_does_not_stop_the_load() {
    let plan = sample_plan();
    let tables = TableNames::for_prefix("ASEA-").unwrap();
    let store = MemoryStore::new();
    store.reject("ASEA-cidr-vpc-assign", 1);
    store.reject("ASEA-cidr-subnet-assign", 3);

    let summary = load_plan(&store, &tables, &plan).await;
    assert!(!summary.is_complete());
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.written(), 4);
    assert_eq!(store.len(), 4);

    let written_vpc_ids: Vec<u64> = store
        .rows()
        .iter()
        .filter_map(|row| match row {
            StoredRow::Vpc { record, .. } => Some(record.id),
            StoredRow::Subnet { .. } => None,
        })
        .collect();
    assert_eq!(written_vpc_ids, vec![2]);
}

#[tokio::test]
async fn test_empty_plan_writes_nothing() {
    let tables = TableNames::for_prefix("ASEA-").unwrap();
    let store = MemoryStore::new();
    let summary = load_plan(&store, &tables, &Default::default()).await;

    assert!(summary.is_complete());
    assert_eq!(summary.written(), 0);
    assert!(store.is_empty());
}
