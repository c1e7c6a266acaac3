// Collection of the reference blocks used to classify subnets.
//
// Gathered over the whole document before any subnet is converted, so a
// subnet's pool does not depend on which VPC happened to be visited first.

use super::vpc::{cidr2_values, is_migrated};
use crate::cidr::{parse_cidr, CidrPool, ReferenceBlocks};
use crate::document::{object_list, ConfigDocument, Section};
use crate::error::Result;
use serde_json::{Map, Value};
use tracing::debug;

pub(crate) fn collect(document: &ConfigDocument) -> Result<ReferenceBlocks> {
    let mut references = ReferenceBlocks::default();

    for section in Section::VPC_SECTIONS {
        let Some(entries) = document.section(section)? else {
            continue;
        };
        for (key, entry) in entries {
            let Some(entry) = entry.as_object() else {
                continue;
            };
            let location = format!("{}/{}", section, key);
            for vpc in object_list(entry, "vpc", &location)? {
                collect_vpc(vpc, &location, &mut references)?;
            }
        }
    }

    debug!(
        perimeter = references.perimeter.len(),
        central = references.central.len(),
        for_sso = references.for_sso.len(),
        "Collected subnet reference blocks"
    );
    Ok(references)
}

fn collect_vpc(
    vpc: &Map<String, Value>,
    location: &str,
    references: &mut ReferenceBlocks,
) -> Result<()> {
    // Entries without name/deploy are reported by the conversion itself
    let (Some(name), Some(deploy)) = (
        vpc.get("name").and_then(Value::as_str),
        vpc.get("deploy").and_then(Value::as_str),
    ) else {
        return Ok(());
    };
    let location = format!("{} vpc {}", location, name);

    let (target, primary) = match (deploy, name) {
        ("local", "Perimeter") => (&mut references.perimeter, false),
        ("shared-network", "Central") => (&mut references.central, false),
        ("local", "ForSSO") => (&mut references.for_sso, true),
        _ => return Ok(()),
    };

    if is_migrated(vpc) {
        let wanted = if primary {
            CidrPool::ForSso
        } else if name == "Perimeter" {
            CidrPool::Rfc6598b
        } else {
            CidrPool::Rfc6598a
        };
        for block in object_list(vpc, "cidr", &location)? {
            let pool = block.get("pool").and_then(Value::as_str).map(CidrPool::from);
            if let (Some(value), Some(pool)) = (block.get("value").and_then(Value::as_str), pool)
            {
                if pool == wanted {
                    target.push(parse_cidr(value, &location)?);
                }
            }
        }
        return Ok(());
    }

    if primary {
        if let Some(cidr) = vpc.get("cidr").and_then(Value::as_str) {
            target.push(parse_cidr(cidr, &location)?);
        }
    } else {
        for cidr in cidr2_values(vpc, &location)? {
            target.push(parse_cidr(&cidr, &location)?);
        }
    }
    Ok(())
}
