use serde_json::Value;

use crate::chembl::ChemblClient;
use crate::error::AnnotatorError;
use crate::table::{Cell, Table};
use crate::uniprot::UniprotClient;

pub const TARGET_KEY: &str = "target_chembl_id";
pub const EC_COLUMN: &str = "EC Numbers";

pub const TARGET_COLUMNS: &[&str] = &[
    TARGET_KEY,
    "pref_name",
    "target_type",
    "organism",
    "tax_id",
    "accession",
    EC_COLUMN,
];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetRecord {
    pub target_chembl_id: String,
    pub pref_name: Option<String>,
    pub target_type: Option<String>,
    pub organism: Option<String>,
    pub tax_id: Option<u64>,
    pub accessions: Vec<String>,
    pub component_ids: Vec<u64>,
    pub ec_numbers: Vec<String>,
}

impl TargetRecord {
    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.target_chembl_id),
            Cell::optional(self.pref_name.clone()),
            Cell::optional(self.target_type.clone()),
            Cell::optional(self.organism.clone()),
            self.tax_id
                .map(|tax| Cell::Number(tax as f64))
                .unwrap_or_default(),
            Cell::optional(Some(self.accessions.join(";"))),
            Cell::optional(Some(self.ec_numbers.join(";"))),
        ]
    }
}

/// Target metadata aligned with the assay table: `table` has one row per
/// assay row, `records` one entry per unique target in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TargetData {
    pub table: Table,
    pub records: Vec<TargetRecord>,
}

/// Parses a ChEMBL target resource.
pub fn parse_target(raw: &Value) -> Option<TargetRecord> {
    let target_chembl_id = raw.get("target_chembl_id")?.as_str()?.to_string();
    let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
    let mut record = TargetRecord {
        target_chembl_id,
        pref_name: text("pref_name"),
        target_type: text("target_type"),
        organism: text("organism"),
        tax_id: raw.get("tax_id").and_then(Value::as_u64),
        ..TargetRecord::default()
    };
    for component in raw
        .get("target_components")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if let Some(accession) = component.get("accession").and_then(Value::as_str) {
            if !record.accessions.iter().any(|known| known == accession) {
                record.accessions.push(accession.to_string());
            }
        }
        if let Some(id) = component.get("component_id").and_then(Value::as_u64) {
            if !record.component_ids.contains(&id) {
                record.component_ids.push(id);
            }
        }
    }
    Some(record)
}

fn fetch_target<C, U>(
    target_id: &str,
    chembl: &C,
    uniprot: &U,
) -> Result<Option<TargetRecord>, AnnotatorError>
where
    C: ChemblClient + ?Sized,
    U: UniprotClient + ?Sized,
{
    let Some(raw) = chembl.target(target_id)? else {
        return Ok(None);
    };
    let Some(mut record) = parse_target(&raw) else {
        return Ok(None);
    };
    for accession in &record.accessions {
        for number in uniprot.ec_numbers(accession)? {
            if !record.ec_numbers.contains(&number) {
                record.ec_numbers.push(number);
            }
        }
    }
    Ok(Some(record))
}

/// Fetches metadata for every unique target of the assay table. A failed
/// lookup is logged and leaves that target's fields empty.
pub fn process_targets<C, U>(
    assay: &Table,
    chembl: &C,
    uniprot: &U,
) -> Result<TargetData, AnnotatorError>
where
    C: ChemblClient + ?Sized,
    U: UniprotClient + ?Sized,
{
    let mut table = Table::new(TARGET_COLUMNS.iter().copied());
    if assay.column_index(TARGET_KEY).is_none() {
        return Ok(TargetData {
            table,
            records: Vec::new(),
        });
    }

    let mut records = Vec::new();
    for target_id in assay.unique_keys(TARGET_KEY)? {
        match fetch_target(&target_id, chembl, uniprot) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => tracing::warn!("target {target_id} not found in ChEMBL"),
            Err(err) => tracing::warn!("while fetching target {target_id}: {err}"),
        }
    }

    for cell in assay.column_values(TARGET_KEY)? {
        let record = cell
            .key()
            .and_then(|key| records.iter().find(|record| record.target_chembl_id == key));
        match record {
            Some(record) => table.push_row(record.cells()),
            None => table.push_row(vec![cell.clone()]),
        }
    }

    Ok(TargetData { table, records })
}
