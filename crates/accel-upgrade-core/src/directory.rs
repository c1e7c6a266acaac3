//! Account membership lookup for `deploy: local` OU VPCs

use crate::document::{ConfigDocument, Section};
use crate::error::{MigrationError, Result};
use serde_json::Value;

/// Resolves which accounts belong to an organizational unit.
///
/// A `deploy: local` VPC declared on an OU is instantiated once per member
/// account, so the load plan needs one extra row per member.
pub trait AccountDirectory {
    /// Keys of the accounts in `ou`, in a stable order.
    fn member_accounts(&self, ou: &str) -> Result<Vec<String>>;
}

/// Directory built from the document's own account sections.
///
/// Mandatory accounts come first, then workload accounts. A workload entry
/// that reuses a mandatory key replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigAccountDirectory {
    accounts: Vec<(String, Option<String>)>,
}

impl ConfigAccountDirectory {
    pub fn from_document(document: &ConfigDocument) -> Result<Self> {
        let mut accounts: Vec<(String, Option<String>)> = Vec::new();
        for section in Section::ACCOUNT_SECTIONS {
            let Some(entries) = document.section(section)? else {
                continue;
            };
            for (key, entry) in entries {
                let ou = entry.get("ou").and_then(Value::as_str).map(str::to_string);
                match accounts.iter_mut().find(|(existing, _)| existing == key) {
                    Some(slot) => slot.1 = ou,
                    None => accounts.push((key.clone(), ou)),
                }
            }
        }
        Ok(Self { accounts })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountDirectory for ConfigAccountDirectory {
    fn member_accounts(&self, ou: &str) -> Result<Vec<String>> {
        let mut members = Vec::new();
        for (account, account_ou) in &self.accounts {
            match account_ou {
                Some(name) if name == ou => members.push(account.clone()),
                Some(_) => {}
                None => return Err(MigrationError::unresolved_membership(ou, account)),
            }
        }
        Ok(members)
    }
}
