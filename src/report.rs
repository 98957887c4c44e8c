use camino::Utf8Path;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::AnnotatorError;
use crate::table::{Cell, Table};
use crate::targets::{EC_COLUMN, TARGET_KEY};

/// Longest string a worksheet cell accepts.
const MAX_CELL_CHARS: usize = 32_767;

/// Drops the target table's own EC column and joins the pathway records.
pub fn merge_pathways(targets: &Table, pathways: &Table) -> Result<Table, AnnotatorError> {
    targets
        .drop_column(EC_COLUMN)
        .left_join(pathways, TARGET_KEY)
}

pub fn merge_hierarchy(targets: &Table, hierarchy: &Table) -> Result<Table, AnnotatorError> {
    targets.left_join(hierarchy, TARGET_KEY)
}

/// Places target columns beside the assay rows they belong to.
///
/// Both tables carry `target_chembl_id` per row; rows are paired by position
/// and every pair must agree on that key.
pub fn assemble_assay_targets(assay: &Table, targets: &Table) -> Result<Table, AnnotatorError> {
    if assay.len() != targets.len() {
        return Err(AnnotatorError::ReportLength {
            assay: assay.len(),
            targets: targets.len(),
        });
    }
    let Some(anchor) = assay.column_index(TARGET_KEY) else {
        return Ok(assay.clone());
    };

    let assay_keys = assay.column_values(TARGET_KEY)?;
    let target_keys = targets.column_values(TARGET_KEY)?;
    for (row, (left, right)) in assay_keys.iter().zip(&target_keys).enumerate() {
        if left.key() != right.key() {
            return Err(AnnotatorError::MisalignedReport {
                row: row + 1,
                assay: left.key(),
                target: right.key(),
            });
        }
    }

    let target_columns = targets.drop_column(TARGET_KEY);
    let width = assay.columns().len();
    let moved: Vec<usize> = (width..width + target_columns.columns().len()).collect();
    assay.hstack(&target_columns)?.move_after(anchor, &moved)
}

/// Prepends a blank-headed index column numbered from 1.
pub fn numbered(table: &Table) -> Table {
    let mut columns = vec![String::new()];
    columns.extend(table.columns().iter().cloned());
    let mut out = Table::new(columns);
    for (idx, row) in table.rows().iter().enumerate() {
        let mut cells = Vec::with_capacity(row.len() + 1);
        cells.push(Cell::Number((idx + 1) as f64));
        cells.extend(row.iter().cloned());
        out.push_row(cells);
    }
    out
}

/// Writes `table` as the single worksheet of an xlsx workbook.
pub fn write_xlsx(table: &Table, path: &Utf8Path) -> Result<(), AnnotatorError> {
    let spreadsheet = |err: rust_xlsxwriter::XlsxError| AnnotatorError::Spreadsheet(err.to_string());

    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        std::fs::create_dir_all(parent.as_std_path())
            .map_err(|err| AnnotatorError::Filesystem(err.to_string()))?;
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header)
            .map_err(spreadsheet)?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    let text: String = text.chars().take(MAX_CELL_CHARS).collect();
                    worksheet
                        .write_string(row_num, col, &text)
                        .map_err(spreadsheet)?;
                }
                Cell::Number(number) => {
                    worksheet
                        .write_number(row_num, col, *number)
                        .map_err(spreadsheet)?;
                }
                Cell::Bool(flag) => {
                    worksheet
                        .write_boolean(row_num, col, *flag)
                        .map_err(spreadsheet)?;
                }
            }
        }
    }
    workbook.save(path.as_std_path()).map_err(spreadsheet)?;
    tracing::info!(rows = table.len(), path = %path, "wrote report");
    Ok(())
}
