mod common;

use assert_matches::assert_matches;

use chem_annotator::compounds::{CompoundList, SkippedCompound, process_compounds};
use chem_annotator::domain::{AssayFilter, NotationFormat};
use chem_annotator::table::Cell;

use common::{
    MockChembl, MockIndex, MockPubchem, NoopSink, activity, assay, with_captured_logs,
};

const INPUT: &str = "name,smiles\naspirin,CC(=O)Oc1ccccc1C(=O)O\nunknown,C1CC1N\n";

fn list() -> CompoundList {
    CompoundList::from_reader(INPUT.as_bytes(), NotationFormat::Smiles).unwrap()
}

fn aspirin_chembl() -> MockChembl {
    let mut chembl =
        MockChembl::default().with_molecule("CC(=O)Oc1ccccc1C(=O)O", "CHEMBL25", "CC(=O)Oc1ccccc1C(=O)O");
    chembl.activities.insert(
        "CHEMBL25".to_string(),
        vec![
            activity("CHEMBL25", "CHEMBL_A1", "CHEMBL204", "7.5"),
            activity("CHEMBL25", "CHEMBL_A2", "CHEMBL205", "6.2"),
            activity("CHEMBL25", "CHEMBL_A3", "CHEMBL206", "8.0"),
        ],
    );
    chembl.assays = vec![
        assay("CHEMBL_A1", 9),
        assay("CHEMBL_A2", 8),
        assay("CHEMBL_A3", 4),
    ];
    chembl
}

#[test]
fn matched_compound_rows_start_with_the_input_row() {
    let chembl = aspirin_chembl();
    let mut pubchem = MockPubchem::default();
    pubchem.cids.insert("CC(=O)Oc1ccccc1C(=O)O".to_string(), 2244);
    let mut index = MockIndex::default();
    index
        .ids
        .insert("CC(=O)Oc1ccccc1C(=O)O".to_string(), "SCHEMBL1353".to_string());

    let tables = process_compounds(
        &list(),
        &AssayFilter::default(),
        &chembl,
        &pubchem,
        &index,
        &NoopSink,
    );

    assert_eq!(tables.processed, 2);
    assert!(tables.skipped.is_empty());

    assert_eq!(&tables.info.columns()[..2], ["name", "smiles"]);
    assert_eq!(tables.info.len(), 1);
    assert_eq!(tables.info.cell(0, "name"), Some(&Cell::text("aspirin")));
    assert_eq!(
        tables.info.cell(0, "molecule_chembl_id"),
        Some(&Cell::text("CHEMBL25"))
    );
    assert_eq!(tables.info.cell(0, "drug_cid"), Some(&Cell::Number(2244.0)));
    assert_eq!(
        tables.info.cell(0, "drug_schembl"),
        Some(&Cell::text("SCHEMBL1353"))
    );

    // The assay with confidence 4 falls below the default threshold of 8.
    assert_eq!(tables.assay.len(), 2);
    for row in 0..tables.assay.len() {
        assert_eq!(tables.assay.cell(row, "name"), Some(&Cell::text("aspirin")));
        assert_eq!(
            tables.assay.cell(row, "molecule_chembl_id"),
            Some(&Cell::text("CHEMBL25"))
        );
    }
    assert_eq!(
        tables.assay.cell(0, "target_chembl_id"),
        Some(&Cell::text("CHEMBL204"))
    );
    assert_eq!(tables.assay.cell(0, "confidence_score"), Some(&Cell::Number(9.0)));
    assert_eq!(tables.assay.cell(0, "pchembl_value"), Some(&Cell::Number(7.5)));
    assert_eq!(
        tables.assay.cell(1, "assay_description"),
        Some(&Cell::text("assay CHEMBL_A2"))
    );
}

#[test]
fn unmatched_compound_contributes_no_rows() {
    let chembl = aspirin_chembl();
    let tables = process_compounds(
        &list(),
        &AssayFilter::default(),
        &chembl,
        &MockPubchem::default(),
        &MockIndex::default(),
        &NoopSink,
    );

    let names: Vec<_> = tables
        .info
        .column_values("name")
        .unwrap()
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(names, vec![Cell::text("aspirin")]);
    assert!(
        tables
            .moa
            .column_values("name")
            .unwrap()
            .iter()
            .all(|cell| **cell == Cell::text("aspirin"))
    );
}

#[test]
fn compound_without_activities_keeps_one_assay_row() {
    let chembl =
        MockChembl::default().with_molecule("CC(=O)Oc1ccccc1C(=O)O", "CHEMBL25", "CC(=O)Oc1ccccc1C(=O)O");
    let tables = process_compounds(
        &list(),
        &AssayFilter::default(),
        &chembl,
        &MockPubchem::default(),
        &MockIndex::default(),
        &NoopSink,
    );

    assert_eq!(tables.assay.len(), 1);
    assert_eq!(tables.assay.cell(0, "assay_chembl_id"), Some(&Cell::Empty));
    assert_eq!(tables.moa.len(), 1);
    assert_eq!(tables.info.cell(0, "drug_cid"), Some(&Cell::Empty));
}

#[test]
fn failing_lookup_skips_the_compound_and_logs_its_sequence() {
    let mut chembl = aspirin_chembl();
    chembl.failing_queries.push("C1CC1N".to_string());

    let (tables, logs) = with_captured_logs(|| {
        process_compounds(
            &list(),
            &AssayFilter::default(),
            &chembl,
            &MockPubchem::default(),
            &MockIndex::default(),
            &NoopSink,
        )
    });

    assert_eq!(tables.processed, 1);
    assert_matches!(
        tables.skipped.as_slice(),
        [SkippedCompound { sequence: 2, .. }]
    );
    assert!(logs.contains("WARN"));
    assert!(logs.contains("while processing compound 2"));
    assert!(
        tables
            .assay
            .column_values("name")
            .unwrap()
            .iter()
            .all(|cell| **cell != Cell::text("unknown"))
    );
}

#[test]
fn blank_query_cell_is_skipped() {
    let input = "name,smiles\nblank,\n";
    let list = CompoundList::from_reader(input.as_bytes(), NotationFormat::Smiles).unwrap();
    let tables = process_compounds(
        &list,
        &AssayFilter::default(),
        &MockChembl::default(),
        &MockPubchem::default(),
        &MockIndex::default(),
        &NoopSink,
    );
    assert_eq!(tables.processed, 0);
    assert_eq!(tables.skipped.len(), 1);
    assert_eq!(tables.skipped[0].sequence, 1);
}

#[test]
fn extra_fields_are_dropped_with_a_warning() {
    let (list, logs) = with_captured_logs(|| {
        CompoundList::from_reader("name,smiles\na,C\nb,CC,extra\n".as_bytes(), NotationFormat::Smiles)
            .unwrap()
    });

    assert_eq!(list.rows[1], vec![Cell::text("b"), Cell::text("CC")]);
    assert!(logs.contains("input row 2 has 3 fields, header has 2"), "{logs}");
    assert!(!logs.contains("input row 1 "), "{logs}");
}
