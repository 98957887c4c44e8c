use std::fs;

use chem_annotator::chembl::ChemblStatus;
use chem_annotator::uniprot::extract_ec_numbers;

#[test]
fn extract_uniprot_ec_numbers() {
    let raw = fs::read_to_string("tests/fixtures/uniprot_P23219.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(extract_ec_numbers(&value), vec!["1.14.99.1", "1.11.1.7"]);
}

#[test]
fn entry_without_description_has_no_ec_numbers() {
    let value = serde_json::json!({"primaryAccession": "P00734"});
    assert!(extract_ec_numbers(&value).is_empty());
}

#[test]
fn chembl_status_reads_release_fields() {
    let raw = fs::read_to_string("tests/fixtures/chembl_status.json").unwrap();
    let status: ChemblStatus = serde_json::from_str(&raw).unwrap();

    assert_eq!(status.chembl_db_version.as_deref(), Some("ChEMBL_35"));
    assert_eq!(status.status.as_deref(), Some("UP"));
    assert_eq!(status.disinct_compounds, Some(2_496_335));
    assert_eq!(status.targets, Some(16_003));
}
