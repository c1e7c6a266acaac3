// global-options rewrites
//
// Every patch checks for its own output first, so a second conversion of
// the same document leaves this section unchanged.

use super::json_helpers::{ensure_array, ensure_object, has_entry_named};
use crate::document::rename_key;
use crate::error::Result;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

pub(crate) const LEGACY_ORG_MANAGEMENT_KEY: &str = "aws-org-master";
pub(crate) const ORG_MANAGEMENT_KEY: &str = "aws-org-management";

const CORE_SCP: &str = "Guardrails-Part-0-Core";
const WORKLOAD_SCP: &str = "Guardrails-Part-0";
pub(crate) const RETIRED_SCP: &str = "Guardrails-Part-2";

const NODE_RUNTIME: &str = "nodejs18.x";
const NODE_RULES: [&str; 2] = ["EC2-INSTANCE-PROFILE", "EC2-INSTANCE-PROFILE-PERMISSIONS"];

pub(crate) fn apply(global: &mut Map<String, Value>) -> Result<()> {
    info!("Updating global options");

    if matches!(global.get("alz-baseline"), Some(Value::Bool(_))) {
        global.shift_remove("alz-baseline");
    }

    for key in [LEGACY_ORG_MANAGEMENT_KEY, ORG_MANAGEMENT_KEY] {
        if let Some(Value::Object(org)) = global.get_mut(key) {
            org.insert("add-sns-topics".to_string(), Value::Bool(true));
        }
    }

    if let Some(Value::Object(security)) = global.get_mut("central-security-services") {
        security.insert("macie-sensitive-sh".to_string(), Value::Bool(true));
        security.insert("fw-mgr-alert-level".to_string(), json!("Low"));
        security.insert("security-hub-findings-sns".to_string(), json!("Low"));
        security.insert("add-sns-topics".to_string(), Value::Bool(true));
    }

    if let Some(Value::Object(cloudwatch)) = global.get_mut("cloudwatch") {
        patch_cloudwatch(cloudwatch)?;
    }

    if let Some(Value::Object(aws_config)) = global.get_mut("aws-config") {
        if let Some(Value::Array(rules)) = aws_config.get_mut("rules") {
            for rule in rules.iter_mut().filter_map(Value::as_object_mut) {
                let is_node_rule = rule
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| NODE_RULES.contains(&name));
                if is_node_rule {
                    rule.insert("runtime".to_string(), json!(NODE_RUNTIME));
                }
            }
        }
    }

    if let Some(Value::Array(scps)) = global.get_mut("scps") {
        patch_scps(scps);
    }

    if let Some(Value::Object(frameworks)) = global.get_mut("security-hub-frameworks") {
        if let Some(Value::Array(standards)) = frameworks.get_mut("standards") {
            for standard in standards.iter_mut().filter_map(Value::as_object_mut) {
                let controls = match standard.get("name").and_then(Value::as_str) {
                    Some("AWS Foundational Security Best Practices v1.0.0") => {
                        json!(["IAM.1", "EC2.10", "Lambda.4"])
                    }
                    Some("CIS AWS Foundations Benchmark v1.2.0") => {
                        json!(["CIS.1.20", "CIS.1.22", "CIS.2.6"])
                    }
                    _ => continue,
                };
                standard.insert("controls-to-disable".to_string(), controls);
            }
        }
    }

    Ok(())
}

fn patch_cloudwatch(cloudwatch: &mut Map<String, Value>) -> Result<()> {
    let metrics = ensure_array(cloudwatch, "metrics", "global-options/cloudwatch")?;
    for metric in ignore_metric_filters() {
        let name = metric["filter-name"].as_str().unwrap_or_default();
        if !has_entry_named(metrics, "filter-name", name) {
            metrics.push(metric);
        }
    }

    let alarms = ensure_object(cloudwatch, "alarms", "global-options/cloudwatch")?;
    alarms.insert(
        "default-in-org-mgmt-use-lcl-sns".to_string(),
        Value::Bool(true),
    );
    let definitions = ensure_array(alarms, "definitions", "global-options/cloudwatch/alarms")?;
    for alarm in ignore_alarms() {
        let name = alarm["alarm-name"].as_str().unwrap_or_default();
        if !has_entry_named(definitions, "alarm-name", name) {
            definitions.push(alarm);
        }
    }
    Ok(())
}

fn patch_scps(scps: &mut Vec<Value>) {
    if !has_entry_named(scps, "name", CORE_SCP) {
        scps.push(json!({
            "name": CORE_SCP,
            "description": "ASEA Guardrails Part 0 Core Accounts",
            "policy": "ASEA-Guardrails-Part0-CoreOUs.json",
        }));
    }

    for scp in scps.iter_mut().filter_map(Value::as_object_mut) {
        if scp.get("name").and_then(Value::as_str) == Some(WORKLOAD_SCP) {
            scp.insert(
                "description".to_string(),
                json!("ASEA Guardrails Part 0 Workload Accounts"),
            );
            scp.insert(
                "policy".to_string(),
                json!("ASEA-Guardrails-Part0-WkldOUs.json"),
            );
        }
    }

    scps.retain(|scp| scp.get("name").and_then(Value::as_str) != Some(RETIRED_SCP));
}

fn ignore_metric_filters() -> [Value; 2] {
    [
        json!({
            "filter-name": "IgnoreAuthorizationFailureMetric",
            "accounts": ["management"],
            "regions": ["${HOME_REGION}"],
            "loggroup-name": "/${ACCELERATOR_PREFIX_ND}/CloudTrail",
            "filter-pattern": "{($.errorCode=\"*UnauthorizedOperation\") || ($.errorCode=\"AccessDenied*\")}",
            "metric-namespace": "CloudTrailMetrics",
            "metric-name": "IgnoreAuthorizationFailureCount",
            "metric-value": "1"
        }),
        json!({
            "filter-name": "IgnoreConsoleSignInWithoutMfaMetric",
            "accounts": ["management"],
            "regions": ["${HOME_REGION}"],
            "loggroup-name": "/${ACCELERATOR_PREFIX_ND}/CloudTrail",
            "filter-pattern": "{($.eventName=\"ConsoleLogin\") && ($.additionalEventData.MFAUsed !=\"Yes\")}",
            "metric-namespace": "CloudTrailMetrics",
            "metric-name": "IgnoreConsoleSignInWithoutMfaCount",
            "metric-value": "1"
        }),
    ]
}

fn ignore_alarms() -> [Value; 2] {
    [
        json!({
            "alarm-name": "IGNORE-AWS-Authorization-Failure",
            "metric-name": "IgnoreAuthorizationFailureCount",
            "sns-alert-level": "Ignore",
            "alarm-description": "Alarms when one or more unauthorized API calls are made (in any account, any region of your AWS Organization)."
        }),
        json!({
            "alarm-name": "IGNORE-AWS-Console-SignIn-Without-MFA",
            "metric-name": "IgnoreConsoleSignInWithoutMfaCount",
            "sns-alert-level": "Ignore",
            "alarm-description": "Alarms when MFA is NOT used to sign into the console with IAM (in any account, any region of your AWS Organization)."
        }),
    ]
}

/// Rename `aws-org-master` to `aws-org-management` in place.
pub(crate) fn rename_legacy_keys(global: &mut Map<String, Value>) {
    if !global.contains_key(LEGACY_ORG_MANAGEMENT_KEY) {
        return;
    }
    if rename_key(global, LEGACY_ORG_MANAGEMENT_KEY, ORG_MANAGEMENT_KEY) {
        info!(
            from = LEGACY_ORG_MANAGEMENT_KEY,
            to = ORG_MANAGEMENT_KEY,
            "Renamed global-options key"
        );
    } else {
        warn!(
            "Both '{}' and '{}' exist in global-options; leaving both in place",
            LEGACY_ORG_MANAGEMENT_KEY, ORG_MANAGEMENT_KEY
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global() -> Map<String, Value> {
        json!({
            "alz-baseline": false,
            "aws-org-master": {"account": "management", "region": "ca-central-1"},
            "central-security-services": {"account": "security"},
            "cloudwatch": {
                "metrics": [],
                "alarms": {"definitions": []}
            },
            "aws-config": {"rules": [
                {"name": "EC2-INSTANCE-PROFILE", "runtime": "nodejs14.x"},
                {"name": "OTHER", "runtime": "python3.9"}
            ]},
            "scps": [
                {"name": "Guardrails-Part-0", "description": "old", "policy": "old.json"},
                {"name": "Guardrails-Part-1", "policy": "p1.json"},
                {"name": "Guardrails-Part-2", "policy": "p2.json"}
            ],
            "security-hub-frameworks": {"standards": [
                {"name": "CIS AWS Foundations Benchmark v1.2.0", "controls-to-disable": []}
            ]}
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_apply_patches_known_keys() {
        let mut g = global();
        apply(&mut g).unwrap();

        assert!(!g.contains_key("alz-baseline"));
        assert_eq!(g["aws-org-master"]["add-sns-topics"], json!(true));
        assert_eq!(g["central-security-services"]["fw-mgr-alert-level"], json!("Low"));
        assert_eq!(g["cloudwatch"]["metrics"].as_array().unwrap().len(), 2);
        assert_eq!(
            g["cloudwatch"]["alarms"]["default-in-org-mgmt-use-lcl-sns"],
            json!(true)
        );
        assert_eq!(g["aws-config"]["rules"][0]["runtime"], json!("nodejs18.x"));
        assert_eq!(g["aws-config"]["rules"][1]["runtime"], json!("python3.9"));

        let scp_names: Vec<&str> = g["scps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            scp_names,
            vec!["Guardrails-Part-0", "Guardrails-Part-1", "Guardrails-Part-0-Core"]
        );
        assert_eq!(
            g["scps"][0]["policy"],
            json!("ASEA-Guardrails-Part0-WkldOUs.json")
        );
        assert_eq!(
            g["security-hub-frameworks"]["standards"][0]["controls-to-disable"],
            json!(["CIS.1.20", "CIS.1.22", "CIS.2.6"])
        );
    }

    #[test]
    fn test_apply_twice_is_stable() {
        let mut once = global();
        apply(&mut once).unwrap();
        let mut twice = once.clone();
        apply(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rename_legacy_keys_in_place() {
        let mut g = global();
        rename_legacy_keys(&mut g);
        let keys: Vec<&str> = g.keys().map(String::as_str).collect();
        assert_eq!(keys[1], "aws-org-management");
        assert!(!g.contains_key("aws-org-master"));
    }
}
