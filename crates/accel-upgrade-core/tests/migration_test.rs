// Integration tests for accel-upgrade-core
//
// Drives a full legacy document through conversion and load planning.

use accel_upgrade_core::{
    convert_schema, migrate_config, plan_cidr_load, CidrPool, ConfigAccountDirectory,
    ConfigDocument, MigrateOptions, MigrationError, MigrationOutcome,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const LEGACY_CONFIG: &str = include_str!("fixtures/legacy-config.json");

fn legacy() -> ConfigDocument {
    ConfigDocument::from_json_str(LEGACY_CONFIG).unwrap()
}

fn converted() -> ConfigDocument {
    let mut document = legacy();
    convert_schema(&mut document, "core").unwrap();
    document
}

fn options(load_to_table: bool, convert: bool) -> MigrateOptions {
    MigrateOptions {
        load_to_table,
        convert_schema: convert,
        prefix: "ASEA-".to_string(),
        region: "ca-central-1".to_string(),
        core_ou_name: "core".to_string(),
    }
}

fn vpc<'a>(document: &'a ConfigDocument, section: &str, key: &str) -> &'a Value {
    &document.as_map()[section][key]["vpc"][0]
}

#[test]
fn test_central_vpc_converted() {
    let document = converted();
    let central = vpc(&document, "organizational-units", "Central");

    assert_eq!(
        central["cidr"],
        json!([
            {"value": "10.0.0.0/16", "size": 16, "pool": "main"},
            {"value": "100.96.252.0/23", "size": 23, "pool": "RFC6598a"}
        ])
    );
    assert_eq!(
        central["subnets"][0]["definitions"][0]["cidr"],
        json!({"value": "100.96.252.0/25", "pool": "RFC6598a", "size": 25})
    );
    assert_eq!(
        central["subnets"][1]["definitions"][0]["cidr"],
        json!({"value": "10.0.1.0/24", "pool": "main", "size": 24})
    );
    for key in ["igw", "vgw", "pcx", "natgw", "cidr2"] {
        assert!(central.get(key).is_none(), "{} should be gone", key);
    }
}

#[test]
fn test_special_vpcs_classify_their_subnets() {
    let document = converted();

    let perimeter = vpc(&document, "mandatory-account-configs", "perimeter");
    assert_eq!(perimeter["cidr"][1]["pool"], json!("RFC6598b"));
    assert_eq!(
        perimeter["subnets"][0]["definitions"][0]["cidr"],
        json!({"value": "100.96.250.0/26", "pool": "RFC6598b", "size": 26})
    );
    assert_eq!(
        perimeter["subnets"][0]["definitions"][1]["cidr"]["pool"],
        json!("main")
    );

    let for_sso = vpc(&document, "mandatory-account-configs", "management");
    assert_eq!(for_sso["cidr"][0]["pool"], json!("ForSSO"));
    assert_eq!(
        for_sso["subnets"][0]["definitions"][0]["cidr"]["pool"],
        json!("ForSSO")
    );
}

#[test]
fn test_conversion_is_idempotent() {
    let once = converted();
    let mut twice = once.clone();
    let report = convert_schema(&mut twice, "core").unwrap();

    assert_eq!(report.vpcs_converted, 0);
    assert_eq!(report.vpcs_already_current, 5);
    assert_eq!(twice.to_pretty_json(), once.to_pretty_json());
}

#[test]
fn test_migrated_vpc_subtree_is_byte_identical() {
    let once = converted();
    let before = serde_json::to_string(vpc(&once, "organizational-units", "Central")).unwrap();

    let mut again = once.clone();
    convert_schema(&mut again, "core").unwrap();
    let after = serde_json::to_string(vpc(&again, "organizational-units", "Central")).unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_pre_migrated_vpcs_in_legacy_document_are_untouched() {
    let mut document = ConfigDocument::from_value(json!({
        "organizational-units": {
            "Central": {"vpc": [{
                "name": "Central", "deploy": "shared-network", "region": "ca-central-1",
                "description": "custom central",
                "cidr": [{"value": "10.0.0.0/16", "size": 16, "pool": "main"}],
                "cidr-src": "provided"
            }]},
            "Dev": {"vpc": [{
                "name": "Dev", "deploy": "local", "region": "ca-central-1",
                "cidr": "10.2.0.0/16"
            }]}
        },
        "mandatory-account-configs": {
            "perimeter": {"ou": "core", "vpc": [{
                "name": "Perimeter", "deploy": "local", "region": "ca-central-1",
                "description": "custom perimeter",
                "alb-forwarding": false,
                "cidr": [
                    {"value": "10.7.4.0/22", "size": 22, "pool": "main"},
                    {"value": "100.96.250.0/23", "size": 23, "pool": "RFC6598b"}
                ],
                "cidr-src": "provided"
            }]},
            "shared-network": {"ou": "core", "vpc": [{
                "name": "Endpoint", "deploy": "local", "region": "ca-central-1",
                "cidr": [{"value": "10.7.0.0/22", "size": 22, "pool": "main"}]
            }]}
        }
    }))
    .unwrap();
    let central = vpc(&document, "organizational-units", "Central").clone();
    let perimeter = vpc(&document, "mandatory-account-configs", "perimeter").clone();
    let endpoint = vpc(&document, "mandatory-account-configs", "shared-network").clone();

    let report = convert_schema(&mut document, "core").unwrap();

    assert_eq!(report.vpcs_converted, 1);
    assert_eq!(report.vpcs_already_current, 3);
    assert_eq!(vpc(&document, "organizational-units", "Central"), &central);
    assert_eq!(vpc(&document, "mandatory-account-configs", "perimeter"), &perimeter);
    assert_eq!(vpc(&document, "mandatory-account-configs", "shared-network"), &endpoint);

    let dev = vpc(&document, "organizational-units", "Dev");
    assert_eq!(dev["description"], json!("The Dev vpc in the Dev OU."));
    assert_eq!(dev["cidr"][0]["value"], json!("10.2.0.0/16"));
}

#[test]
fn test_vpc_block_with_host_bits_converts_and_loads() {
    let mut document = ConfigDocument::from_value(json!({
        "mandatory-account-configs": {
            "shared-network": {"ou": "core", "vpc": [{
                "name": "Endpoint", "deploy": "local", "region": "ca-central-1",
                "cidr": "10.7.0.1/22"
            }]}
        }
    }))
    .unwrap();

    let directory = ConfigAccountDirectory::from_document(&document).unwrap();
    let plan = plan_cidr_load(&document, "ca-central-1", &directory).unwrap();
    assert_eq!(plan.vpcs[0].cidr, "10.7.0.1/22");

    convert_schema(&mut document, "core").unwrap();
    let block = &vpc(&document, "mandatory-account-configs", "shared-network")["cidr"][0];
    assert_eq!(block["value"], json!("10.7.0.1/22"));
    assert_eq!(block["size"], json!(22));
}

#[test]
fn test_vpc_values_survive_conversion() {
    let document = converted();
    let values: Vec<&str> = vpc(&document, "mandatory-account-configs", "perimeter")["cidr"]
        .as_array()
        .unwrap()
        .iter()
        .map(|block| block["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["10.7.4.0/22", "100.96.250.0/23"]);
}

#[test]
fn test_perimeter_classification_ignores_traversal_order() {
    // The Dev OU is visited before the perimeter account
    let mut document = ConfigDocument::from_value(json!({
        "organizational-units": {
            "Dev": {"vpc": [{
                "name": "Dev", "deploy": "local", "cidr": "10.2.0.0/16",
                "subnets": [{"name": "Edge", "definitions": [{"az": "a", "cidr": "100.96.251.0/26"}]}]
            }]}
        },
        "mandatory-account-configs": {
            "perimeter": {"ou": "core", "vpc": [{
                "name": "Perimeter", "deploy": "local",
                "cidr": "10.7.4.0/22", "cidr2": "100.96.250.0/23"
            }]}
        }
    }))
    .unwrap();
    convert_schema(&mut document, "core").unwrap();

    let edge = &vpc(&document, "organizational-units", "Dev")["subnets"][0]["definitions"][0];
    assert_eq!(edge["cidr"]["pool"], json!("RFC6598b"));
}

#[test]
fn test_core_ou_becomes_security_and_infrastructure() {
    let document = converted();
    let root = document.as_map();

    let ou_keys: Vec<&str> = root["organizational-units"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(ou_keys, vec!["Security", "Central", "Dev", "Infrastructure"]);

    let accounts = &root["mandatory-account-configs"];
    assert_eq!(accounts["shared-network"]["ou"], json!("Infrastructure"));
    assert_eq!(accounts["perimeter"]["ou"], json!("Infrastructure"));
    assert_eq!(accounts["operations"]["ou"], json!("Infrastructure"));
    assert_eq!(accounts["management"]["ou"], json!("Security"));
    assert_eq!(accounts["security"]["ou"], json!("Security"));

    let dev_vpc = vpc(&document, "organizational-units", "Dev");
    assert_eq!(dev_vpc["description"], json!("The Dev vpc in the Dev OU."));
    assert_eq!(dev_vpc["name"], json!("${CONFIG::OU_NAME}"));
}

#[test]
fn test_renames_are_structural() {
    let mut document = ConfigDocument::from_value(json!({
        "global-options": {
            "aws-org-master": {"account": "management"},
            "notes": "aws-org-master was renamed; \"core\": { stays in strings"
        },
        "organizational-units": {"core": {"scps": []}},
        "workload-account-configs": {
            "app": {"ou": "Dev", "description": "moved out of core"}
        }
    }))
    .unwrap();
    convert_schema(&mut document, "core").unwrap();
    let root = document.as_map();

    assert!(root["global-options"].get("aws-org-management").is_some());
    assert_eq!(
        root["global-options"]["notes"],
        json!("aws-org-master was renamed; \"core\": { stays in strings")
    );
    assert_eq!(
        root["workload-account-configs"]["app"]["description"],
        json!("moved out of core")
    );
}

#[test]
fn test_load_plan_fans_out_local_ou_vpcs() {
    let document = legacy();
    let directory = ConfigAccountDirectory::from_document(&document).unwrap();
    let plan = plan_cidr_load(&document, "ca-central-1", &directory).unwrap();

    let dev_rows: Vec<(&str, &str)> = plan
        .vpcs
        .iter()
        .filter(|row| row.vpc_name == "Dev")
        .map(|row| (row.account_ou_key.as_str(), row.cidr.as_str()))
        .collect();
    assert_eq!(
        dev_rows,
        vec![
            ("organizational-unit/Dev", "10.2.0.0/16"),
            ("account/dev-1", "10.2.0.0/16"),
            ("account/dev-2", "10.2.0.0/16"),
        ]
    );

    let central = &plan.vpcs[0];
    assert_eq!(central.account_ou_key, "account/shared-network");
    assert_eq!(central.region, "ca-central-1");
    assert!(plan.vpcs.iter().all(|row| row.region == "ca-central-1"));
    assert_eq!(plan.vpcs[1].pool, CidrPool::Rfc6598b);
}

#[test]
fn test_load_plan_ids_are_gapless_per_table() {
    let document = legacy();
    let directory = ConfigAccountDirectory::from_document(&document).unwrap();
    let plan = plan_cidr_load(&document, "ca-central-1", &directory).unwrap();

    assert_eq!(plan.vpcs.len(), 9);
    assert_eq!(plan.subnets.len(), 10);
    let vpc_ids: Vec<u64> = plan.vpcs.iter().map(|row| row.id).collect();
    let subnet_ids: Vec<u64> = plan.subnets.iter().map(|row| row.id).collect();
    assert_eq!(vpc_ids, (1..=9).collect::<Vec<u64>>());
    assert_eq!(subnet_ids, (1..=10).collect::<Vec<u64>>());
}

#[test]
fn test_load_plan_of_converted_document_keeps_pools() {
    let document = converted();
    let directory = ConfigAccountDirectory::from_document(&document).unwrap();
    let plan = plan_cidr_load(&document, "ca-central-1", &directory).unwrap();

    assert_eq!(plan.vpcs[1].cidr, "100.96.252.0/23");
    assert_eq!(plan.vpcs[1].pool, CidrPool::Rfc6598a);
    assert_eq!(plan.subnets[0].sub_pool, CidrPool::Rfc6598a);
}

#[test]
fn test_migrate_config_dispatches_on_flags() {
    let mut document = legacy();
    let untouched = document.clone();

    match migrate_config(&mut document, &options(true, false)).unwrap() {
        MigrationOutcome::LoadPlanned(plan) => assert_eq!(plan.len(), 19),
        other => panic!("expected a load plan, got {:?}", other),
    }
    assert_eq!(document, untouched);

    match migrate_config(&mut document, &options(false, true)).unwrap() {
        MigrationOutcome::Converted(report) => {
            assert_eq!(report.vpcs_converted, 5);
            assert!(report.core_ou_renamed);
        }
        other => panic!("expected a conversion, got {:?}", other),
    }

    for (load, convert) in [(true, true), (false, false)] {
        let mut document = legacy();
        let err = migrate_config(&mut document, &options(load, convert)).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidArguments { .. }));
        assert_eq!(document, legacy());
    }
}

#[test]
fn test_local_ou_vpc_with_orphan_account_fails() {
    let document = ConfigDocument::from_value(json!({
        "organizational-units": {
            "Dev": {"vpc": [{
                "name": "Dev", "deploy": "local", "region": "ca-central-1", "cidr": "10.2.0.0/16"
            }]}
        },
        "workload-account-configs": {"orphan": {"account-name": "Orphan"}}
    }))
    .unwrap();
    let directory = ConfigAccountDirectory::from_document(&document).unwrap();

    let err = plan_cidr_load(&document, "ca-central-1", &directory).unwrap_err();
    assert!(matches!(
        err,
        MigrationError::UnresolvedAccountMembership { .. }
    ));
}
