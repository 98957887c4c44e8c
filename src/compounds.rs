use std::fs::File;
use std::path::Path;

use crate::app::{ProgressEvent, ProgressSink};
use crate::chembl::{
    ASSAY_COLUMNS, ChemblClient, INDICATION_COLUMNS, MECHANISM_COLUMNS, STRUCTURE_COLUMNS,
    annotation_table, filtered_assay_table, indication_table, mechanism_table,
};
use crate::domain::{AssayFilter, NotationFormat, StructureQuery};
use crate::error::AnnotatorError;
use crate::pubchem::PubchemClient;
use crate::table::{Cell, Table};
use crate::unichem::StructureIndexClient;

/// Rows of the input CSV together with the column holding the query.
#[derive(Debug, Clone)]
pub struct CompoundList {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub query_column: usize,
    pub format: NotationFormat,
}

impl CompoundList {
    /// Reads a comma-delimited file with a header row. The query column is
    /// the one whose name equals the format name, ignoring case.
    pub fn read(path: &Path, format: NotationFormat) -> Result<Self, AnnotatorError> {
        let file = File::open(path).map_err(|_| AnnotatorError::InputRead(path.to_path_buf()))?;
        Self::from_reader(file, format)
    }

    pub fn from_reader<R: std::io::Read>(
        reader: R,
        format: NotationFormat,
    ) -> Result<Self, AnnotatorError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .flexible(true)
            .from_reader(reader);
        let columns: Vec<String> = reader
            .headers()
            .map_err(|err| AnnotatorError::InputParse(err.to_string()))?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        let query_column = columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(format.column_name()))
            .ok_or_else(|| AnnotatorError::MissingColumn(format.column_name().to_string()))?;

        let mut rows = Vec::new();
        for (offset, record) in reader.records().enumerate() {
            let record = record.map_err(|err| AnnotatorError::InputParse(err.to_string()))?;
            if record.len() > columns.len() {
                tracing::warn!(
                    "input row {} has {} fields, header has {}; extra fields dropped",
                    offset + 1,
                    record.len(),
                    columns.len()
                );
            }
            let mut row: Vec<Cell> = record.iter().map(Cell::from).collect();
            row.resize(columns.len(), Cell::Empty);
            rows.push(row);
        }

        Ok(Self {
            columns,
            rows,
            query_column,
            format,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCompound {
    /// 1-based position in the input file.
    pub sequence: usize,
    pub reason: String,
}

/// Accumulated per-compound results, in input order.
#[derive(Debug, Clone, Default)]
pub struct CompoundTables {
    pub info: Table,
    pub assay: Table,
    pub moa: Table,
    pub skipped: Vec<SkippedCompound>,
    pub processed: usize,
}

impl CompoundTables {
    fn extend(&mut self, rows: CompoundRows) {
        self.info.append(rows.info);
        self.assay.append(rows.assay);
        self.moa.append(rows.moa);
        self.processed += 1;
    }
}

struct CompoundRows {
    info: Table,
    assay: Table,
    moa: Table,
}

/// Annotates every compound of `list`. A compound that fails at any step is
/// logged and contributes no rows; the batch continues.
pub fn process_compounds<C, P, S>(
    list: &CompoundList,
    filter: &AssayFilter,
    chembl: &C,
    pubchem: &P,
    index: &S,
    sink: &dyn ProgressSink,
) -> CompoundTables
where
    C: ChemblClient + ?Sized,
    P: PubchemClient + ?Sized,
    S: StructureIndexClient + ?Sized,
{
    let total = list.len();
    let mut tables = CompoundTables::default();
    for (offset, row) in list.rows.iter().enumerate() {
        let sequence = offset + 1;
        match annotate_compound(list, row, filter, chembl, pubchem, index) {
            Ok(rows) => {
                tracing::debug!(
                    sequence,
                    info = rows.info.len(),
                    assay = rows.assay.len(),
                    moa = rows.moa.len(),
                    "compound annotated"
                );
                tables.extend(rows);
            }
            Err(err) => {
                tracing::warn!("while processing compound {sequence}: {err}");
                sink.event(ProgressEvent {
                    message: format!("Warning: while processing compound {sequence}: {err}"),
                    step: None,
                });
                tables.skipped.push(SkippedCompound {
                    sequence,
                    reason: err.to_string(),
                });
            }
        }
        sink.event(ProgressEvent {
            message: format!("Processing compound n.: {sequence}"),
            step: Some((sequence, total)),
        });
    }
    tables
}

fn annotate_compound<C, P, S>(
    list: &CompoundList,
    row: &[Cell],
    filter: &AssayFilter,
    chembl: &C,
    pubchem: &P,
    index: &S,
) -> Result<CompoundRows, AnnotatorError>
where
    C: ChemblClient + ?Sized,
    P: PubchemClient + ?Sized,
    S: StructureIndexClient + ?Sized,
{
    let query = StructureQuery::new(&row[list.query_column].to_string(), list.format)?;
    let chembl_id = chembl.molecule_id(&query)?;
    let cid = pubchem.cid(&query)?;
    let schembl = index.surechembl_id(&query)?;

    let (annotation, indication, activities, mechanisms) = match &chembl_id {
        Some(id) => (
            annotation_table(&chembl.molecules(id)?),
            indication_table(&chembl.drug_indications(id)?),
            filtered_assay_table(chembl, id, filter)?,
            mechanism_table(&chembl.mechanisms(id)?),
        ),
        None => (
            annotation_table(&[]),
            Table::new(INDICATION_COLUMNS.iter().copied()),
            Table::new(ASSAY_COLUMNS.iter().copied()),
            Table::new(MECHANISM_COLUMNS.iter().copied()),
        ),
    };

    let mut info = annotation.left_join(&indication, "molecule_chembl_id")?;
    let selected = annotation.select(STRUCTURE_COLUMNS)?;
    let mut assay = selected.left_join(&activities, "molecule_chembl_id")?;
    let moa = selected.left_join(&mechanisms, "molecule_chembl_id")?;

    let cid = cid.map(|cid| Cell::Number(cid as f64)).unwrap_or_default();
    let schembl = Cell::optional(schembl);
    for table in [&mut info, &mut assay] {
        table.add_constant_column("drug_cid", cid.clone());
        table.add_constant_column("drug_schembl", schembl.clone());
    }

    Ok(CompoundRows {
        info: with_input_row(list, row, &info)?,
        assay: with_input_row(list, row, &assay)?,
        moa: with_input_row(list, row, &moa)?,
    })
}

/// Prepends the input row, repeated once per row of `table`.
fn with_input_row(
    list: &CompoundList,
    row: &[Cell],
    table: &Table,
) -> Result<Table, AnnotatorError> {
    Table::replicate_row(&list.columns, row, table.len()).hstack(table)
}
