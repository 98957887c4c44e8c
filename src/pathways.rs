use crate::error::AnnotatorError;
use crate::kegg::PathwayClient;
use crate::table::{Cell, Table};
use crate::targets::{EC_COLUMN, TARGET_KEY};

pub const PATHWAY_COLUMNS: &[&str] = &[TARGET_KEY, EC_COLUMN, "KEGG_ID", "Pathway"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathwayRecord {
    pub target_chembl_id: String,
    /// EC list exactly as it appeared on the target.
    pub ec_numbers: String,
    pub kegg_ids: Vec<String>,
    pub pathways: Vec<String>,
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|known| known == value) {
        values.push(value.to_string());
    }
}

/// Pathways of every EC number in a `;`-separated list. Ids and names are
/// deduplicated independently, keeping first-seen order.
pub fn pathways_for_target<K: PathwayClient + ?Sized>(
    target_chembl_id: &str,
    ec_list: &str,
    client: &K,
) -> PathwayRecord {
    let mut kegg_ids = Vec::new();
    let mut pathways = Vec::new();
    for ec in ec_list.split(';').map(str::trim).filter(|ec| !ec.is_empty()) {
        match client.pathways_for_ec(ec) {
            Ok(entries) => {
                for entry in entries {
                    push_unique(&mut kegg_ids, &entry.kegg_id);
                    push_unique(&mut pathways, &entry.name);
                }
            }
            Err(err) => tracing::warn!("while fetching pathways for EC {ec}: {err}"),
        }
    }
    PathwayRecord {
        target_chembl_id: target_chembl_id.to_string(),
        ec_numbers: ec_list.to_string(),
        kegg_ids,
        pathways,
    }
}

/// One record per unique target that carries EC numbers.
pub fn resolve_pathways<K: PathwayClient + ?Sized>(
    targets: &Table,
    client: &K,
) -> Result<Vec<PathwayRecord>, AnnotatorError> {
    let keys = targets.column_values(TARGET_KEY)?;
    let ec_lists = targets.column_values(EC_COLUMN)?;

    let mut seen: Vec<String> = Vec::new();
    let mut records = Vec::new();
    for (key, ec_list) in keys.into_iter().zip(ec_lists) {
        let Some(target_id) = key.key() else {
            continue;
        };
        if seen.contains(&target_id) {
            continue;
        }
        seen.push(target_id.clone());
        let Some(ec_list) = ec_list.key() else {
            continue;
        };
        records.push(pathways_for_target(&target_id, &ec_list, client));
    }
    Ok(records)
}

pub fn pathway_table(records: &[PathwayRecord]) -> Table {
    let mut table = Table::new(PATHWAY_COLUMNS.iter().copied());
    for record in records {
        table.push_row(vec![
            Cell::text(&record.target_chembl_id),
            Cell::text(&record.ec_numbers),
            Cell::text(record.kegg_ids.join(";")),
            Cell::text(record.pathways.join(";")),
        ]);
    }
    table
}
