// mandatory-account-configs and workload-account-configs rewrites

use super::json_helpers::{remove_if_empty_string, set_str};
use super::vpc::is_migrated;
use crate::document::{object_list_mut, type_name};
use crate::error::{MigrationError, Result};
use serde_json::{json, Map, Value};
use tracing::info;

pub(crate) const INFRASTRUCTURE_OU: &str = "Infrastructure";
pub(crate) const SECURITY_OU: &str = "Security";

const FIREWALL_BLOCK_DEVICES: [&str; 2] = ["/dev/sda1", "/dev/sdb"];
const MAD_IMAGE_PATH: &str = "/aws/service/ami-windows-latest/Windows_Server-2016-English-Full-Base";

const SHARED_NETWORK_DESCRIPTION: &str =
    "This Account is used for centralized or shared networking resources.";
const ENDPOINT_VPC_DESCRIPTION: &str = "This VPC is used to host AWS Service Endpoints, making AWS services available using private address space.";
const OPERATIONS_DESCRIPTION: &str = "This Account is used for centralized IT Operational resources (MAD, rsyslog, ITSM, etc.).";
const MAD_DESCRIPTION: &str = "This directory is a) shared to most accounts in the organization to provide centralized Windows and Linux authentication for cloud workloads, b) used as an identity source for AWS SSO, c) used to inter-connect with on-premises directory services, and d) provides a single identities source for instance and AWS console access.";
const PERIMETER_DESCRIPTION: &str =
    "This Account is used for internet facing ingress/egress security services.";
const PERIMETER_VPC_DESCRIPTION: &str =
    "This VPC is used to hold centralized ingress/egress (perimeter) security services.";
const MANAGEMENT_DESCRIPTION: &str = "This is the Organization Management or root account.  Access must be highly restricted.  This account should not contain customer resources.";
const FOR_SSO_VPC_DESCRIPTION: &str = "This VPC is deployed in the Organization Management/root account to enable the deployment of the Active Directory Connector, enabling the use of Active Directory as the Identity source for AWS SSO.";
const LOG_ARCHIVE_DESCRIPTION: &str =
    "This Account is used to centralized and store immutable logs for the Organization.";
const SECURITY_DESCRIPTION: &str =
    "This Account is used to centralized access to AWS security tooling and consoles.";

/// Empty-string leftovers the newer schema rejects: ALB stickiness, target
/// lambda file names and `share-mad-from`.
pub(crate) fn remove_empty_leftovers(entry: &mut Map<String, Value>, location: &str) -> Result<()> {
    for alb in object_list_mut(entry, "alb", location)? {
        remove_if_empty_string(alb, "tg-stickiness");
        for target in object_list_mut(alb, "targets", location)? {
            remove_if_empty_string(target, "lambda-filename");
        }
    }
    remove_if_empty_string(entry, "share-mad-from");
    Ok(())
}

pub(crate) fn as_entry<'a>(
    value: &'a mut Value,
    location: &str,
) -> Result<&'a mut Map<String, Value>> {
    let kind = type_name(value);
    value.as_object_mut().ok_or_else(|| {
        MigrationError::invalid_document(format!(
            "{}: entry must be an object, found {}",
            location, kind
        ))
    })
}

pub(crate) fn apply_mandatory(section: &mut Map<String, Value>) -> Result<()> {
    info!("Updating mandatory account configs");
    for (key, value) in section.iter_mut() {
        let location = format!("mandatory-account-configs/{}", key);
        let account = as_entry(value, &location)?;
        remove_empty_leftovers(account, &location)?;

        match key.as_str() {
            "shared-network" => {
                set_str(account, "description", SHARED_NETWORK_DESCRIPTION);
                set_str(account, "ou", INFRASTRUCTURE_OU);
                describe_vpc(account, "Endpoint", ENDPOINT_VPC_DESCRIPTION, &location)?;
            }
            "operations" => {
                set_str(account, "description", OPERATIONS_DESCRIPTION);
                let mut has_mad = false;
                if let Some(Value::Object(mad)) = account
                    .get_mut("deployments")
                    .and_then(|deployments| deployments.get_mut("mad"))
                {
                    set_str(mad, "description", MAD_DESCRIPTION);
                    set_str(mad, "image-path", MAD_IMAGE_PATH);
                    remove_if_empty_string(mad, "share-to-account");
                    has_mad = true;
                }
                // only the MAD-hosting operations account moves OU
                if has_mad {
                    set_str(account, "ou", INFRASTRUCTURE_OU);
                }
            }
            "perimeter" => {
                set_str(account, "description", PERIMETER_DESCRIPTION);
                set_str(account, "ou", INFRASTRUCTURE_OU);
                if let Some(Value::Object(deployments)) = account.get_mut("deployments") {
                    for firewall in object_list_mut(deployments, "firewalls", &location)? {
                        firewall.insert("block-device-mappings".to_string(), block_devices());
                    }
                    if let Some(Value::Object(manager)) = deployments.get_mut("firewall-manager") {
                        manager.insert("block-device-mappings".to_string(), block_devices());
                    }
                }
                for vpc in object_list_mut(account, "vpc", &location)? {
                    if is_migrated(vpc) {
                        continue;
                    }
                    if vpc.get("name").and_then(Value::as_str) == Some("Perimeter") {
                        set_str(vpc, "description", PERIMETER_VPC_DESCRIPTION);
                        vpc.insert("alb-forwarding".to_string(), Value::Bool(true));
                    }
                }
            }
            "management" => {
                set_str(account, "description", MANAGEMENT_DESCRIPTION);
                set_str(account, "ou", SECURITY_OU);
                describe_vpc(account, "ForSSO", FOR_SSO_VPC_DESCRIPTION, &location)?;
            }
            "log-archive" => {
                set_str(account, "ou", SECURITY_OU);
                set_str(account, "description", LOG_ARCHIVE_DESCRIPTION);
            }
            "security" => {
                set_str(account, "ou", SECURITY_OU);
                set_str(account, "description", SECURITY_DESCRIPTION);
            }
            _ => {}
        }
    }
    Ok(())
}

pub(crate) fn apply_workload(section: &mut Map<String, Value>) -> Result<()> {
    info!("Updating workload account configs");
    for (key, value) in section.iter_mut() {
        let location = format!("workload-account-configs/{}", key);
        remove_empty_leftovers(as_entry(value, &location)?, &location)?;
    }
    Ok(())
}

/// Point accounts of the renamed core OU at its new name.
pub(crate) fn retarget_ou(section: &mut Map<String, Value>, from: &str, to: &str) -> usize {
    let mut moved = 0;
    for account in section.values_mut().filter_map(Value::as_object_mut) {
        if account.get("ou").and_then(Value::as_str) == Some(from) {
            set_str(account, "ou", to);
            moved += 1;
        }
    }
    moved
}

fn describe_vpc(
    account: &mut Map<String, Value>,
    vpc_name: &str,
    description: &str,
    location: &str,
) -> Result<()> {
    for vpc in object_list_mut(account, "vpc", location)? {
        if !is_migrated(vpc) && vpc.get("name").and_then(Value::as_str) == Some(vpc_name) {
            set_str(vpc, "description", description);
        }
    }
    Ok(())
}

fn block_devices() -> Value {
    json!(FIREWALL_BLOCK_DEVICES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_mandatory_accounts_move_to_new_ous() {
        let mut accounts = section(json!({
            "shared-network": {"ou": "core", "vpc": [{"name": "Endpoint"}]},
            "perimeter": {
                "ou": "core",
                "deployments": {"firewalls": [{"name": "Firewall"}], "firewall-manager": {"name": "FMG"}},
                "vpc": [{"name": "Perimeter"}]
            },
            "management": {"ou": "core"},
            "log-archive": {"ou": "core"},
            "operations": {"ou": "core", "deployments": {"mad": {"share-to-account": ""}}},
            "sandbox-1": {"ou": "Sandbox"}
        }));
        apply_mandatory(&mut accounts).unwrap();

        assert_eq!(accounts["shared-network"]["ou"], json!("Infrastructure"));
        assert_eq!(
            accounts["shared-network"]["vpc"][0]["description"],
            json!(ENDPOINT_VPC_DESCRIPTION)
        );
        assert_eq!(accounts["perimeter"]["ou"], json!("Infrastructure"));
        assert_eq!(
            accounts["perimeter"]["deployments"]["firewalls"][0]["block-device-mappings"],
            json!(["/dev/sda1", "/dev/sdb"])
        );
        assert_eq!(
            accounts["perimeter"]["deployments"]["firewall-manager"]["block-device-mappings"],
            json!(["/dev/sda1", "/dev/sdb"])
        );
        assert_eq!(accounts["perimeter"]["vpc"][0]["alb-forwarding"], json!(true));
        assert_eq!(accounts["management"]["ou"], json!("Security"));
        assert_eq!(accounts["log-archive"]["ou"], json!("Security"));
        assert_eq!(accounts["operations"]["ou"], json!("Infrastructure"));
        assert!(accounts["operations"]["deployments"]["mad"]
            .get("share-to-account")
            .is_none());
        assert_eq!(accounts["sandbox-1"], json!({"ou": "Sandbox"}));
    }

    #[test]
    fn test_empty_leftovers_removed() {
        let mut accounts = section(json!({
            "app-1": {
                "share-mad-from": "",
                "alb": [{"tg-stickiness": "", "targets": [{"lambda-filename": "", "port": 443}]}]
            }
        }));
        apply_workload(&mut accounts).unwrap();
        assert_eq!(
            accounts["app-1"],
            json!({"alb": [{"targets": [{"port": 443}]}]})
        );
    }

    #[test]
    fn test_retarget_ou() {
        let mut accounts = section(json!({
            "a": {"ou": "core"}, "b": {"ou": "Dev"}, "c": {"ou": "core"}
        }));
        assert_eq!(retarget_ou(&mut accounts, "core", "Security"), 2);
        assert_eq!(accounts["c"]["ou"], json!("Security"));
        assert_eq!(accounts["b"]["ou"], json!("Dev"));
    }
}
