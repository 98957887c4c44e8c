use assert_matches::assert_matches;

use chem_annotator::error::AnnotatorError;
use chem_annotator::report::{assemble_assay_targets, merge_hierarchy, merge_pathways};
use chem_annotator::table::{Cell, Table};

fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
    let mut table = Table::new(columns.iter().copied());
    for row in rows {
        table.push_row(row.iter().map(|value| Cell::from(*value)).collect());
    }
    table
}

fn assay() -> Table {
    table(
        &["name", "assay_chembl_id", "target_chembl_id", "pchembl_value"],
        &[
            &["aspirin", "A1", "CHEMBL204", "7.5"],
            &["aspirin", "A2", "", "6.1"],
            &["ibuprofen", "A3", "CHEMBL205", "6.8"],
        ],
    )
}

#[test]
fn target_columns_follow_the_target_key() {
    let targets = table(
        &["target_chembl_id", "pref_name", "organism"],
        &[
            &["CHEMBL204", "Thrombin", "Homo sapiens"],
            &["", "", ""],
            &["CHEMBL205", "Carbonic anhydrase", "Homo sapiens"],
        ],
    );

    let combined = assemble_assay_targets(&assay(), &targets).unwrap();

    assert_eq!(
        combined.columns(),
        [
            "name",
            "assay_chembl_id",
            "target_chembl_id",
            "pref_name",
            "organism",
            "pchembl_value"
        ]
    );
    assert_eq!(combined.len(), 3);
    assert_eq!(combined.cell(2, "pref_name"), Some(&Cell::text("Carbonic anhydrase")));
    assert_eq!(combined.cell(2, "pchembl_value"), Some(&Cell::text("6.8")));
    assert_eq!(combined.cell(1, "pref_name"), Some(&Cell::Empty));
}

#[test]
fn misaligned_rows_are_rejected() {
    let targets = table(
        &["target_chembl_id", "pref_name"],
        &[&["CHEMBL204", "Thrombin"], &["", ""], &["CHEMBL999", "Other"]],
    );

    let err = assemble_assay_targets(&assay(), &targets).unwrap_err();
    assert_matches!(
        err,
        AnnotatorError::MisalignedReport { row: 3, assay: Some(ref a), target: Some(ref t) }
            if a == "CHEMBL205" && t == "CHEMBL999"
    );
}

#[test]
fn row_count_mismatch_is_rejected() {
    let targets = table(&["target_chembl_id"], &[&["CHEMBL204"]]);
    let err = assemble_assay_targets(&assay(), &targets).unwrap_err();
    assert_matches!(err, AnnotatorError::ReportLength { assay: 3, targets: 1 });
}

#[test]
fn assay_without_target_key_is_returned_unchanged() {
    let assay = table(&["name", "smiles"], &[]);
    let targets = table(&["target_chembl_id", "pref_name"], &[]);
    let combined = assemble_assay_targets(&assay, &targets).unwrap();
    assert_eq!(combined, assay);
}

#[test]
fn pathway_and_hierarchy_columns_join_by_target() {
    let targets = table(
        &["target_chembl_id", "pref_name", "EC Numbers"],
        &[&["CHEMBL1", "ADH", "1.1.1.1"], &["CHEMBL2", "GPCR", ""], &["CHEMBL1", "ADH", "1.1.1.1"]],
    );
    let pathways = table(
        &["target_chembl_id", "EC Numbers", "KEGG_ID", "Pathway"],
        &[&["CHEMBL1", "1.1.1.1", "map00010", "Glycolysis / Gluconeogenesis"]],
    );
    let hierarchy = table(
        &["target_chembl_id", "protein_classifications", "protein_hierarchy"],
        &[&["CHEMBL1", "3", "Enzyme > Oxidoreductase"], &["CHEMBL2", "", ""]],
    );

    let merged = merge_hierarchy(&merge_pathways(&targets, &pathways).unwrap(), &hierarchy).unwrap();

    assert_eq!(merged.len(), targets.len());
    assert_eq!(merged.cell(1, "KEGG_ID"), Some(&Cell::Empty));
    assert_eq!(merged.cell(2, "KEGG_ID"), Some(&Cell::text("map00010")));
    assert_eq!(
        merged.cell(2, "protein_hierarchy"),
        Some(&Cell::text("Enzyme > Oxidoreductase"))
    );
}

#[test]
fn input_column_sharing_a_target_name_stays_in_front() {
    let assay = table(
        &["organism", "smiles", "target_chembl_id", "pchembl_value"],
        &[&["user-note", "CCO", "CHEMBL204", "7.0"]],
    );
    let targets = table(
        &["target_chembl_id", "pref_name", "organism"],
        &[&["CHEMBL204", "Thrombin", "Homo sapiens"]],
    );

    let combined = assemble_assay_targets(&assay, &targets).unwrap();

    assert_eq!(
        combined.columns(),
        [
            "organism",
            "smiles",
            "target_chembl_id",
            "pref_name",
            "organism",
            "pchembl_value"
        ]
    );
    assert_eq!(
        combined.rows()[0],
        vec![
            Cell::text("user-note"),
            Cell::text("CCO"),
            Cell::text("CHEMBL204"),
            Cell::text("Thrombin"),
            Cell::text("Homo sapiens"),
            Cell::text("7.0"),
        ]
    );
}
