//! CIDR load planning
//!
//! Flattens every VPC and subnet block of a document into the records the two
//! assignment tables expect. Ids are assigned here, in traversal order, so
//! the writer only has to replay the plan.

use crate::cidr::{parse_prefixed, CidrPool};
use crate::directory::AccountDirectory;
use crate::document::{
    object_list, required_str, type_name, AccountOuKey, ConfigDocument, Section,
    HOME_REGION_PLACEHOLDER, OU_NAME_PLACEHOLDER,
};
use crate::error::{MigrationError, Result};
use crate::migrate::vpc::{cidr2_values, legacy_cidr};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const REQUESTER: &str = "Manual";
pub const STATUS: &str = "assigned";

/// Gapless id sequence for one table, starting at 1
#[derive(Debug, Clone)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Row of the `<prefix>cidr-vpc-assign` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct VpcCidrRecord {
    pub account_ou_key: String,
    pub cidr: String,
    pub id: u64,
    pub pool: CidrPool,
    pub region: String,
    pub requester: &'static str,
    pub status: &'static str,
    pub vpc_name: String,
    /// Position of the block within its VPC's CIDR sequence
    pub vpc_assigned_id: u32,
}

/// Row of the `<prefix>cidr-subnet-assign` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubnetCidrRecord {
    pub account_ou_key: String,
    pub az: String,
    pub cidr: String,
    pub id: u64,
    pub region: String,
    pub requester: &'static str,
    pub status: &'static str,
    pub sub_pool: CidrPool,
    pub subnet_name: String,
    pub vpc_name: String,
}

/// Ordered records for both tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CidrLoadPlan {
    pub vpcs: Vec<VpcCidrRecord>,
    pub subnets: Vec<SubnetCidrRecord>,
}

impl CidrLoadPlan {
    pub fn is_empty(&self) -> bool {
        self.vpcs.is_empty() && self.subnets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vpcs.len() + self.subnets.len()
    }
}

struct Planner<'a> {
    home_region: &'a str,
    directory: &'a dyn AccountDirectory,
    vpc_ids: IdCounter,
    subnet_ids: IdCounter,
    plan: CidrLoadPlan,
}

/// Build the load plan for `document`.
///
/// Reads the document only. Every CIDR is parsed here, so a malformed block
/// fails the whole plan before a single row is written.
pub fn plan_cidr_load(
    document: &ConfigDocument,
    home_region: &str,
    directory: &dyn AccountDirectory,
) -> Result<CidrLoadPlan> {
    let mut planner = Planner {
        home_region,
        directory,
        vpc_ids: IdCounter::new(),
        subnet_ids: IdCounter::new(),
        plan: CidrLoadPlan::default(),
    };

    for section in Section::VPC_SECTIONS {
        let Some(entries) = document.section(section)? else {
            continue;
        };
        for (key, entry) in entries {
            let location = format!("{}/{}", section, key);
            let entry = entry.as_object().ok_or_else(|| {
                MigrationError::invalid_document(format!(
                    "{}: entry must be an object, found {}",
                    location,
                    type_name(entry)
                ))
            })?;
            for vpc in object_list(entry, "vpc", &location)? {
                planner.plan_vpc(section, key, vpc, &location)?;
            }
        }
    }

    info!(
        vpc_records = planner.plan.vpcs.len(),
        subnet_records = planner.plan.subnets.len(),
        "Planned CIDR load"
    );
    Ok(planner.plan)
}

impl Planner<'_> {
    fn plan_vpc(
        &mut self,
        section: Section,
        key: &str,
        vpc: &Map<String, Value>,
        location: &str,
    ) -> Result<()> {
        let name = required_str(vpc, "name", location)?;
        let location = format!("{} vpc {}", location, name);
        if vpc.get("cidr-src").and_then(Value::as_str) == Some("dynamic") {
            debug!(vpc = name, "Skipping dynamically allocated VPC");
            return Ok(());
        }

        let deploy = required_str(vpc, "deploy", &location)?;
        let region = match required_str(vpc, "region", &location)? {
            HOME_REGION_PLACEHOLDER => self.home_region,
            region => region,
        };
        let vpc_name = if name == OU_NAME_PLACEHOLDER { key } else { name };

        let keys = self.owner_keys(section, key, deploy)?;
        let blocks = vpc_blocks(vpc, &location)?;
        debug!(
            vpc = vpc_name,
            owners = keys.len(),
            blocks = blocks.len(),
            "Planning VPC"
        );

        for owner in &keys {
            for (index, (cidr, pool)) in blocks.iter().enumerate() {
                self.plan.vpcs.push(VpcCidrRecord {
                    account_ou_key: owner.to_string(),
                    cidr: cidr.clone(),
                    id: self.vpc_ids.next_id(),
                    pool: pool.clone(),
                    region: region.to_string(),
                    requester: REQUESTER,
                    status: STATUS,
                    vpc_name: vpc_name.to_string(),
                    vpc_assigned_id: index as u32,
                });
            }
        }

        for subnet in object_list(vpc, "subnets", &location)? {
            let subnet_name = required_str(subnet, "name", &location)?;
            let subnet_location = format!("{} subnet {}", location, subnet_name);
            for definition in object_list(subnet, "definitions", &subnet_location)? {
                let az = required_str(definition, "az", &subnet_location)?;
                let (cidr, pool) = subnet_block(definition, &subnet_location)?;
                for owner in &keys {
                    self.plan.subnets.push(SubnetCidrRecord {
                        account_ou_key: owner.to_string(),
                        az: az.to_string(),
                        cidr: cidr.clone(),
                        id: self.subnet_ids.next_id(),
                        region: region.to_string(),
                        requester: REQUESTER,
                        status: STATUS,
                        sub_pool: pool.clone(),
                        subnet_name: subnet_name.to_string(),
                        vpc_name: vpc_name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Partition keys a VPC's rows are written under
    fn owner_keys(&self, section: Section, key: &str, deploy: &str) -> Result<Vec<AccountOuKey>> {
        match section {
            Section::OrganizationalUnits if deploy == "local" => {
                let mut keys = vec![AccountOuKey::OrganizationalUnit(key.to_string())];
                keys.extend(
                    self.directory
                        .member_accounts(key)?
                        .into_iter()
                        .map(AccountOuKey::Account),
                );
                Ok(keys)
            }
            Section::OrganizationalUnits => Ok(vec![AccountOuKey::Account(deploy.to_string())]),
            _ => Ok(vec![AccountOuKey::Account(key.to_string())]),
        }
    }
}

/// `(value, pool)` of every VPC-level block, primary first
fn vpc_blocks(vpc: &Map<String, Value>, location: &str) -> Result<Vec<(String, CidrPool)>> {
    let mut blocks = Vec::new();
    if matches!(vpc.get("cidr"), Some(Value::Array(_))) {
        for block in object_list(vpc, "cidr", location)? {
            let value = required_str(block, "value", location)?;
            let pool = required_str(block, "pool", location)?;
            parse_prefixed(value, location)?;
            blocks.push((value.to_string(), CidrPool::from(pool)));
        }
    } else {
        let value = legacy_cidr(vpc, location)?;
        parse_prefixed(value, location)?;
        blocks.push((value.to_string(), CidrPool::Main));
    }

    for value in cidr2_values(vpc, location)? {
        parse_prefixed(&value, location)?;
        blocks.push((value, CidrPool::SECONDARY));
    }
    Ok(blocks)
}

/// `(value, pool)` of one subnet definition
fn subnet_block(definition: &Map<String, Value>, location: &str) -> Result<(String, CidrPool)> {
    let (value, pool) = match (definition.get("cidr"), definition.get("cidr2")) {
        (Some(Value::Object(block)), _) => (
            required_str(block, "value", location)?,
            CidrPool::from(required_str(block, "pool", location)?),
        ),
        (Some(Value::String(cidr)), _) if !cidr.is_empty() => (cidr.as_str(), CidrPool::Main),
        (_, Some(Value::String(cidr2))) if !cidr2.is_empty() => {
            (cidr2.as_str(), CidrPool::SECONDARY)
        }
        _ => return Err(MigrationError::missing_field("cidr", location)),
    };
    parse_prefixed(value, location)?;
    Ok((value.to_string(), pool))
}
