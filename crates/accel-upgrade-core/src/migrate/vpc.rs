// VPC and subnet CIDR conversion
//
// Legacy:   "cidr": "10.0.0.0/16", "cidr2": "100.96.252.0/23"
// Migrated: "cidr": [{"value": ..., "size": 16, "pool": "main"}, ...]

use crate::cidr::{parse_cidr, CidrPool, ReferenceBlocks, SubnetCidr, VpcCidr};
use crate::document::{is_falsy, object_list_mut, required_str, type_name};
use crate::error::{MigrationError, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// Keys dropped from a migrated VPC when their value is falsy
const OPTIONAL_VPC_KEYS: [&str; 6] = [
    "igw",
    "vgw",
    "pcx",
    "natgw",
    "tgw-attach",
    "interface-endpoints",
];

/// A VPC is migrated once its `cidr` is a sequence.
pub fn is_migrated(vpc: &Map<String, Value>) -> bool {
    matches!(vpc.get("cidr"), Some(Value::Array(_)))
}

/// Pool of the primary block of a legacy VPC
pub(crate) fn primary_pool(name: &str, deploy: &str) -> CidrPool {
    if deploy == "local" && name == "ForSSO" {
        CidrPool::ForSso
    } else {
        CidrPool::Main
    }
}

/// Pool of a `cidr2` block of a legacy VPC
pub(crate) fn secondary_pool(name: &str, deploy: &str) -> CidrPool {
    match (deploy, name) {
        ("local", "Perimeter") => CidrPool::Rfc6598b,
        ("shared-network", "Central") => CidrPool::Rfc6598a,
        _ => CidrPool::SECONDARY,
    }
}

/// Values of a legacy `cidr2` field, which may be a string or a list.
pub(crate) fn cidr2_values(vpc: &Map<String, Value>, location: &str) -> Result<Vec<String>> {
    match vpc.get("cidr2") {
        None => Ok(Vec::new()),
        Some(value) if is_falsy(value) => Ok(Vec::new()),
        Some(Value::String(cidr)) => Ok(vec![cidr.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    MigrationError::malformed_cidr(
                        item.to_string(),
                        location,
                        "cidr2 entries must be strings",
                    )
                })
            })
            .collect(),
        Some(other) => Err(MigrationError::malformed_cidr(
            other.to_string(),
            location,
            format!("cidr2 must be a string or list, found {}", type_name(other)),
        )),
    }
}

/// Legacy primary `cidr` string of a VPC
pub(crate) fn legacy_cidr<'a>(vpc: &'a Map<String, Value>, location: &str) -> Result<&'a str> {
    match vpc.get("cidr") {
        Some(Value::String(cidr)) => Ok(cidr),
        None | Some(Value::Null) => Err(MigrationError::missing_field("cidr", location)),
        Some(other) => Err(MigrationError::malformed_cidr(
            other.to_string(),
            location,
            format!("expected a CIDR string, found {}", type_name(other)),
        )),
    }
}

/// Convert one legacy VPC entry in place. Returns the number of subnet
/// definitions converted.
pub(crate) fn migrate_vpc(
    vpc: &mut Map<String, Value>,
    references: &ReferenceBlocks,
    location: &str,
) -> Result<usize> {
    let name = required_str(vpc, "name", location)?.to_string();
    let deploy = required_str(vpc, "deploy", location)?.to_string();

    let mut blocks = vec![VpcCidr::new(
        legacy_cidr(vpc, location)?,
        primary_pool(&name, &deploy),
        location,
    )?];
    for cidr in cidr2_values(vpc, location)? {
        blocks.push(VpcCidr::new(&cidr, secondary_pool(&name, &deploy), location)?);
    }

    let blocks = serde_json::to_value(&blocks)
        .map_err(|e| MigrationError::invalid_document(format!("{}: {}", location, e)))?;
    vpc.insert("cidr".to_string(), blocks);
    vpc.shift_remove("cidr2");
    vpc.insert("cidr-src".to_string(), Value::String("provided".to_string()));

    for key in OPTIONAL_VPC_KEYS {
        if vpc.get(key).is_some_and(is_falsy) {
            vpc.shift_remove(key);
        }
    }

    migrate_subnets(vpc, references, location)
}

fn migrate_subnets(
    vpc: &mut Map<String, Value>,
    references: &ReferenceBlocks,
    location: &str,
) -> Result<usize> {
    let mut converted = 0;
    for subnet in object_list_mut(vpc, "subnets", location)? {
        let subnet_location = match subnet.get("name").and_then(Value::as_str) {
            Some(name) => format!("{} subnet {}", location, name),
            None => format!("{} subnet", location),
        };
        for definition in object_list_mut(subnet, "definitions", &subnet_location)? {
            if migrate_subnet_definition(definition, references, &subnet_location)? {
                converted += 1;
            }
        }
    }
    Ok(converted)
}

/// Returns false when the definition already carries a migrated block.
fn migrate_subnet_definition(
    definition: &mut Map<String, Value>,
    references: &ReferenceBlocks,
    location: &str,
) -> Result<bool> {
    let location = match definition.get("az") {
        Some(Value::String(az)) => format!("{} az {}", location, az),
        _ => location.to_string(),
    };

    let current = match (definition.get("cidr"), definition.get("cidr2")) {
        (Some(Value::Object(_)), _) => return Ok(false),
        (Some(Value::String(cidr)), _) if !cidr.is_empty() => cidr.clone(),
        (_, Some(Value::String(cidr2))) if !cidr2.is_empty() => cidr2.clone(),
        _ => return Err(MigrationError::missing_field("cidr", location)),
    };

    let net = parse_cidr(&current, &location)?;
    let pool = references.classify(&net);
    debug!(cidr = %current, pool = %pool, "Classified subnet definition");

    let block = serde_json::to_value(SubnetCidr::from_net(&current, &net, pool))
        .map_err(|e| MigrationError::invalid_document(format!("{}: {}", location, e)))?;
    definition.insert("cidr".to_string(), block);
    definition.shift_remove("cidr2");
    Ok(true)
}
