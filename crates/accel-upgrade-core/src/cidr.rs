//! CIDR blocks and the pools they are allocated from

use crate::error::{MigrationError, Result};
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named bucket of address space a block was allocated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CidrPool {
    Main,
    Rfc6598a,
    Rfc6598b,
    ForSso,
    /// Any other reserved pool name, kept verbatim
    Other(String),
}

impl CidrPool {
    /// Pool given to secondary (`cidr2`) blocks that are not special-cased
    pub const SECONDARY: CidrPool = CidrPool::Rfc6598b;

    pub fn as_str(&self) -> &str {
        match self {
            CidrPool::Main => "main",
            CidrPool::Rfc6598a => "RFC6598a",
            CidrPool::Rfc6598b => "RFC6598b",
            CidrPool::ForSso => "ForSSO",
            CidrPool::Other(name) => name,
        }
    }
}

impl fmt::Display for CidrPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CidrPool {
    fn from(name: &str) -> Self {
        match name {
            "main" => CidrPool::Main,
            "RFC6598a" => CidrPool::Rfc6598a,
            "RFC6598b" => CidrPool::Rfc6598b,
            "ForSSO" => CidrPool::ForSso,
            other => CidrPool::Other(other.to_string()),
        }
    }
}

impl From<String> for CidrPool {
    fn from(name: String) -> Self {
        CidrPool::from(name.as_str())
    }
}

impl From<CidrPool> for String {
    fn from(pool: CidrPool) -> Self {
        pool.as_str().to_string()
    }
}

/// Parse an IPv4 CIDR string that carries a prefix length.
///
/// Host bits are accepted (`10.7.0.1/22` reads as a /22). `location` only
/// feeds the error message.
pub fn parse_prefixed(value: &str, location: &str) -> Result<Ipv4Net> {
    if !value.contains('/') {
        return Err(MigrationError::malformed_cidr(
            value,
            location,
            "missing prefix length",
        ));
    }
    value
        .trim()
        .parse()
        .map_err(|e| MigrationError::malformed_cidr(value, location, format!("{}", e)))
}

/// Parse a network address for overlap checks, rejecting host bits.
pub fn parse_cidr(value: &str, location: &str) -> Result<Ipv4Net> {
    let net = parse_prefixed(value, location)?;
    if net.trunc() != net {
        return Err(MigrationError::malformed_cidr(
            value,
            location,
            format!("host bits set, expected {}", net.trunc()),
        ));
    }
    Ok(net)
}

/// True when the two networks share at least one address.
pub fn overlaps(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.contains(&b.network()) || b.contains(&a.network())
}

/// VPC-level block in the migrated schema: `{value, size, pool}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcCidr {
    pub value: String,
    pub size: u8,
    pub pool: CidrPool,
}

impl VpcCidr {
    pub fn new(value: &str, pool: CidrPool, location: &str) -> Result<Self> {
        let net = parse_prefixed(value, location)?;
        Ok(Self {
            value: value.to_string(),
            size: net.prefix_len(),
            pool,
        })
    }
}

/// Subnet-level block in the migrated schema: `{value, pool, size}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetCidr {
    pub value: String,
    pub pool: CidrPool,
    pub size: u8,
}

impl SubnetCidr {
    pub fn from_net(value: &str, net: &Ipv4Net, pool: CidrPool) -> Self {
        Self {
            value: value.to_string(),
            pool,
            size: net.prefix_len(),
        }
    }
}

/// Special VPC-level blocks used to decide which pool a subnet belongs to.
///
/// Checked in order perimeter, central, ForSSO; the first overlap wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceBlocks {
    pub perimeter: Vec<Ipv4Net>,
    pub central: Vec<Ipv4Net>,
    pub for_sso: Vec<Ipv4Net>,
}

impl ReferenceBlocks {
    pub fn is_empty(&self) -> bool {
        self.perimeter.is_empty() && self.central.is_empty() && self.for_sso.is_empty()
    }

    pub fn classify(&self, subnet: &Ipv4Net) -> CidrPool {
        let hit = |blocks: &[Ipv4Net]| blocks.iter().any(|block| overlaps(subnet, block));
        if hit(&self.perimeter) {
            CidrPool::Rfc6598b
        } else if hit(&self.central) {
            CidrPool::Rfc6598a
        } else if hit(&self.for_sso) {
            CidrPool::ForSso
        } else {
            CidrPool::Main
        }
    }
}
