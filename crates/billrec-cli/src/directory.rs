//! Account directory loading from CSV.
//!
//! Expected headers: `UC`, `Cod de Reg`, `Nome`. Ids are trimmed; rows with an
//! empty id are skipped.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, warn};

use billrec_core::AccountInfo;

#[derive(Debug, Deserialize)]
struct DirectoryRow {
    #[serde(rename = "UC")]
    account_id: Option<String>,
    #[serde(rename = "Cod de Reg")]
    cost_center: Option<String>,
    #[serde(rename = "Nome")]
    account_name: Option<String>,
}

const REQUIRED_COLUMNS: [&str; 3] = ["UC", "Cod de Reg", "Nome"];

/// Load the directory from a CSV file.
pub fn load(path: &Path) -> anyhow::Result<HashMap<String, AccountInfo>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open account directory {}", path.display()))?;
    from_reader(file).with_context(|| format!("invalid account directory {}", path.display()))
}

/// Load the directory from any CSV reader.
pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<HashMap<String, AccountInfo>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing columns: {}", missing.join(", "));
    }

    let mut directory = HashMap::new();
    for row in rdr.deserialize::<DirectoryRow>() {
        let row = row?;
        let Some(account_id) = row.account_id.map(|id| id.trim().to_string()) else {
            continue;
        };
        if account_id.is_empty() {
            continue;
        }

        let info = AccountInfo {
            cost_center: row.cost_center.unwrap_or_default().trim().to_string(),
            account_name: row.account_name.unwrap_or_default().trim().to_string(),
        };
        match directory.entry(account_id) {
            Entry::Vacant(slot) => {
                slot.insert(info);
            }
            Entry::Occupied(slot) => {
                warn!("UC {} listed more than once in the account directory, keeping the first row", slot.key());
            }
        }
    }

    debug!("Loaded {} accounts", directory.len());
    Ok(directory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_trims_and_skips_blank_ids() {
        let data = "UC,Cod de Reg,Nome\n 12345 ,0101,Escola\n,0202,Sem UC\n678,0303, Posto \n";
        let directory = from_reader(data.as_bytes()).unwrap();

        assert_eq!(directory.len(), 2);
        assert_eq!(directory["12345"].cost_center, "0101");
        assert_eq!(directory["678"].account_name, "Posto");
    }

    #[test]
    fn test_duplicate_ids_keep_first_row() {
        let data = "UC,Cod de Reg,Nome\n123,FIRST,A\n123,SECOND,B\n";
        let directory = from_reader(data.as_bytes()).unwrap();

        assert_eq!(directory.len(), 1);
        assert_eq!(directory["123"].cost_center, "FIRST");
        assert_eq!(directory["123"].account_name, "A");
    }

    #[test]
    fn test_missing_columns() {
        let err = from_reader("UC,Nome\n1,a\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Cod de Reg"));
    }
}
