// accel-upgrade-core - Config conversion and CIDR load planning
//
// PURE logic for upgrading an accelerator configuration document.
// No I/O, no async, no AWS clients.
//
// - Conversion: legacy document -> newer schema, in place, idempotent
// - Planning: document -> ordered assignment-table records with ids
//
// Writing the records and reading/writing files belong to the callers.

pub mod cidr;
pub mod directory;
pub mod document;
pub mod error;
pub mod migrate;
pub mod plan;

// Re-export commonly used types
pub use cidr::{CidrPool, ReferenceBlocks, SubnetCidr, VpcCidr};
pub use directory::{AccountDirectory, ConfigAccountDirectory};
pub use document::{AccountOuKey, ConfigDocument, Section};
pub use error::{ErrorCode, MigrationError, Result};
pub use migrate::{
    convert_schema, migrate_config, ConversionReport, MigrateOptions, MigrationOutcome, Operation,
};
pub use plan::{plan_cidr_load, CidrLoadPlan, IdCounter, SubnetCidrRecord, VpcCidrRecord};
