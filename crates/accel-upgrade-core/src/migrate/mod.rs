//! Schema conversion of the accelerator configuration document
//!
//! Converts a legacy document (single-string CIDRs) to the newer schema in
//! place: CIDR sequences tagged with pools, the Security/Infrastructure OU
//! split, and the version-specific global-options additions. Conversion is
//! idempotent; running it on its own output changes nothing.

mod accounts;
mod global_options;
mod json_helpers;
mod organizational_units;
mod references;
pub(crate) mod vpc;

pub use vpc::is_migrated;

use crate::cidr::ReferenceBlocks;
use crate::directory::ConfigAccountDirectory;
use crate::document::{object_list_mut, ConfigDocument, Section};
use crate::error::{MigrationError, Result};
use crate::plan::{plan_cidr_load, CidrLoadPlan};
use accounts::{as_entry, SECURITY_OU};
use tracing::info;

/// The single operation a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Replicate the document's CIDRs into the assignment tables
    LoadToTable,
    /// Rewrite the document to the newer schema
    ConvertSchema,
}

impl Operation {
    /// Exactly one of the two flags must be set.
    pub fn from_flags(load_to_table: bool, convert_schema: bool) -> Result<Self> {
        match (load_to_table, convert_schema) {
            (true, false) => Ok(Operation::LoadToTable),
            (false, true) => Ok(Operation::ConvertSchema),
            (true, true) => Err(MigrationError::invalid_arguments(
                "loading the tables and converting the config cannot run together; pick one",
            )),
            (false, false) => Err(MigrationError::invalid_arguments(
                "nothing to do; enable either table loading or config conversion",
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub load_to_table: bool,
    pub convert_schema: bool,
    /// Accelerator prefix, e.g. `ASEA-`
    pub prefix: String,
    /// Home region; substituted for `${HOME_REGION}`
    pub region: String,
    /// Key of the OU that becomes `Security`
    pub core_ou_name: String,
}

impl MigrateOptions {
    pub fn operation(&self) -> Result<Operation> {
        Operation::from_flags(self.load_to_table, self.convert_schema)
    }
}

/// Counters reported after a conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub vpcs_converted: usize,
    pub vpcs_already_current: usize,
    pub subnet_definitions_converted: usize,
    pub core_ou_renamed: bool,
    pub accounts_retargeted: usize,
}

#[derive(Debug)]
pub enum MigrationOutcome {
    /// The document was converted in place
    Converted(ConversionReport),
    /// The document is unchanged; these records should be written
    LoadPlanned(CidrLoadPlan),
}

/// Run the operation selected by `options` against `document`.
///
/// Flags are validated before anything is touched. Conversion mutates the
/// document; table loading only reads it and returns the ordered records.
pub fn migrate_config(
    document: &mut ConfigDocument,
    options: &MigrateOptions,
) -> Result<MigrationOutcome> {
    match options.operation()? {
        Operation::ConvertSchema => {
            convert_schema(document, &options.core_ou_name).map(MigrationOutcome::Converted)
        }
        Operation::LoadToTable => {
            let directory = ConfigAccountDirectory::from_document(document)?;
            plan_cidr_load(document, &options.region, &directory).map(MigrationOutcome::LoadPlanned)
        }
    }
}

/// Convert `document` to the newer schema in place.
pub fn convert_schema(document: &mut ConfigDocument, core_ou: &str) -> Result<ConversionReport> {
    info!("Converting configuration document");
    let mut report = ConversionReport::default();

    if let Some(global) = document.section_mut(Section::GlobalOptions)? {
        global_options::apply(global)?;
    }
    if let Some(ous) = document.section_mut(Section::OrganizationalUnits)? {
        organizational_units::apply(ous, core_ou)?;
    }
    if let Some(accounts) = document.section_mut(Section::MandatoryAccounts)? {
        accounts::apply_mandatory(accounts)?;
    }
    if let Some(accounts) = document.section_mut(Section::WorkloadAccounts)? {
        accounts::apply_workload(accounts)?;
    }

    let references = references::collect(document)?;
    for section in Section::VPC_SECTIONS {
        convert_vpcs(document, section, &references, &mut report)?;
    }

    if let Some(ous) = document.section_mut(Section::OrganizationalUnits)? {
        report.core_ou_renamed = organizational_units::rename_core_ou(ous, core_ou);
    }
    if report.core_ou_renamed {
        for section in Section::ACCOUNT_SECTIONS {
            if let Some(accounts) = document.section_mut(section)? {
                report.accounts_retargeted += accounts::retarget_ou(accounts, core_ou, SECURITY_OU);
            }
        }
    }
    if let Some(global) = document.section_mut(Section::GlobalOptions)? {
        global_options::rename_legacy_keys(global);
    }

    info!(
        vpcs_converted = report.vpcs_converted,
        vpcs_already_current = report.vpcs_already_current,
        subnet_definitions = report.subnet_definitions_converted,
        "Conversion complete"
    );
    Ok(report)
}

fn convert_vpcs(
    document: &mut ConfigDocument,
    section: Section,
    references: &ReferenceBlocks,
    report: &mut ConversionReport,
) -> Result<()> {
    let Some(entries) = document.section_mut(section)? else {
        return Ok(());
    };
    for (key, value) in entries.iter_mut() {
        let location = format!("{}/{}", section, key);
        let entry = as_entry(value, &location)?;
        for vpc in object_list_mut(entry, "vpc", &location)? {
            let name = vpc
                .get("name")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<unnamed>")
                .to_string();
            if is_migrated(vpc) {
                info!(
                    "Configuration for VPC {} is already in sync with updated accelerator",
                    name
                );
                report.vpcs_already_current += 1;
                continue;
            }
            info!("Updating vpc {}", name);
            let vpc_location = format!("{} vpc {}", location, name);
            report.subnet_definitions_converted +=
                vpc::migrate_vpc(vpc, references, &vpc_location)?;
            report.vpcs_converted += 1;
        }
    }
    Ok(())
}
