// organizational-units rewrites
//
// The core OU becomes "Security" and a copy of it becomes "Infrastructure".
// The copy is taken after the core OU is patched, and the key rename happens
// last (see `rename_core_ou`) so the CIDR passes still see the old key.

use super::accounts::{as_entry, remove_empty_leftovers, INFRASTRUCTURE_OU, SECURITY_OU};
use super::global_options::RETIRED_SCP;
use super::json_helpers::{backfill_str, ensure_array, set_str};
use super::vpc::is_migrated;
use crate::document::{object_list_mut, rename_key, OU_NAME_PLACEHOLDER};
use crate::error::Result;
use serde_json::{Map, Value};
use tracing::{info, warn};

const CORE_WORKLOAD_SCP: &str = "Guardrails-Part-0";
const CORE_SCP: &str = "Guardrails-Part-0-Core";
const INFRASTRUCTURE_BUDGET: &str = "Default Infrastructure Budget";

const SECURITY_OU_DESCRIPTION: &str = "The Security OU is used to hold AWS accounts containing AWS security resources shared or utilized by the rest of the Organization.";
const INFRASTRUCTURE_OU_DESCRIPTION: &str = "The infrastructure OU is used to hold AWS accounts containing AWS infrastructure resources shared or utilized by the rest of the Organization.";
const CENTRAL_OU_DESCRIPTION: &str = "The Central OU is used to hold AWS accounts which contain group or team resources used across OU boundaries like code promotion tools.";
const CENTRAL_VPC_DESCRIPTION: &str = "This VPC is deployed in the shared network account and it's subnets are shared out to the Operations account and every account in the Central OU.";

pub(crate) fn apply(section: &mut Map<String, Value>, core_ou: &str) -> Result<()> {
    info!("Updating organizational units");

    for (key, value) in section.iter_mut() {
        let location = format!("organizational-units/{}", key);
        let ou = as_entry(value, &location)?;
        remove_empty_leftovers(ou, &location)?;
        if let Some(Value::Array(scps)) = ou.get_mut("scps") {
            scps.retain(|scp| scp.as_str() != Some(RETIRED_SCP));
        }

        if key == core_ou {
            info!(ou = %key, "Updating core OU");
            set_str(ou, "description", SECURITY_OU_DESCRIPTION);
            let scps = ensure_array(ou, "scps", &location)?;
            scps.retain(|scp| scp.as_str() != Some(CORE_WORKLOAD_SCP));
            if !scps.iter().any(|scp| scp.as_str() == Some(CORE_SCP)) {
                scps.push(Value::String(CORE_SCP.to_string()));
            }
        } else if key == "Central" {
            set_str(ou, "description", CENTRAL_OU_DESCRIPTION);
            for vpc in object_list_mut(ou, "vpc", &location)? {
                let is_central = vpc.get("name").and_then(Value::as_str) == Some("Central");
                if is_central && !is_migrated(vpc) {
                    set_str(vpc, "description", CENTRAL_VPC_DESCRIPTION);
                }
            }
        } else {
            backfill_str(ou, "description", &format!("The {} OU.", key));
        }
    }

    clone_infrastructure_ou(section, core_ou)?;

    // VPC descriptions name the OU by its final key
    for (key, value) in section.iter_mut() {
        if key == "Central" {
            continue;
        }
        let display_name = if key == core_ou { SECURITY_OU } else { key.as_str() };
        let location = format!("organizational-units/{}", key);
        let ou = as_entry(value, &location)?;
        for vpc in object_list_mut(ou, "vpc", &location)? {
            // already-converted VPCs are left as they are
            if is_migrated(vpc) {
                continue;
            }
            let description = match vpc.get("name").and_then(Value::as_str) {
                Some(OU_NAME_PLACEHOLDER) => format!("The {} vpc in the {} OU.", key, display_name),
                Some(name) => format!("The {} vpc in the {} OU.", name, display_name),
                None => continue,
            };
            backfill_str(vpc, "description", &description);
        }
    }

    Ok(())
}

fn clone_infrastructure_ou(section: &mut Map<String, Value>, core_ou: &str) -> Result<()> {
    let Some(core) = section.get(core_ou) else {
        if core_ou != SECURITY_OU && !section.contains_key(SECURITY_OU) {
            warn!(core_ou, "Core OU not found; no Infrastructure OU created");
        }
        return Ok(());
    };
    if section.contains_key(INFRASTRUCTURE_OU) {
        info!("Infrastructure OU already present");
        return Ok(());
    }

    let mut infrastructure = core.clone();
    let location = format!("organizational-units/{}", INFRASTRUCTURE_OU);
    let ou = as_entry(&mut infrastructure, &location)?;
    if let Some(Value::Object(budgets)) = ou.get_mut("default-budgets") {
        set_str(budgets, "name", INFRASTRUCTURE_BUDGET);
    }
    set_str(ou, "description", INFRASTRUCTURE_OU_DESCRIPTION);
    // VPC descriptions are backfilled with the Infrastructure name
    for vpc in object_list_mut(ou, "vpc", &location)? {
        if !is_migrated(vpc) {
            vpc.shift_remove("description");
        }
    }

    info!("Creating Infrastructure OU from core OU '{}'", core_ou);
    section.insert(INFRASTRUCTURE_OU.to_string(), infrastructure);
    Ok(())
}

/// Rename the core OU key to `Security` in place.
pub(crate) fn rename_core_ou(section: &mut Map<String, Value>, core_ou: &str) -> bool {
    if core_ou == SECURITY_OU || !section.contains_key(core_ou) {
        return false;
    }
    if rename_key(section, core_ou, SECURITY_OU) {
        info!(from = core_ou, to = SECURITY_OU, "Renamed core OU");
        true
    } else {
        warn!(
            "OU '{}' already exists; core OU '{}' keeps its name",
            SECURITY_OU, core_ou
        );
        false
    }
}
