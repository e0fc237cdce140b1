//! Account directory lookup.
//!
//! The directory maps an account id to its cost center and holder name. It is loaded
//! by the caller before a batch runs; lookups are exact string matches.

use std::collections::HashMap;

use crate::models::record::AccountInfo;

/// Read-only lookup of account reference data.
pub trait AccountDirectory: Send + Sync {
    /// Look up an account id.
    fn lookup(&self, account_id: &str) -> Option<&AccountInfo>;

    /// Number of known accounts.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountDirectory for HashMap<String, AccountInfo> {
    fn lookup(&self, account_id: &str) -> Option<&AccountInfo> {
        self.get(account_id)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}
