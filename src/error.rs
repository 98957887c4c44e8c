use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AnnotatorError {
    #[error("invalid chemical notation format: {0} (expected SMILES, InChI or InChIKey)")]
    InvalidFormat(String),

    #[error("invalid ChEMBL id: {0}")]
    InvalidChemblId(String),

    #[error("invalid assay type: {0}")]
    InvalidAssayType(String),

    #[error("confidence threshold must be between 0 and 9, got {0}")]
    InvalidConfidence(i64),

    #[error("invalid pChEMBL threshold: {0}")]
    InvalidPchembl(f64),

    #[error("empty compound query")]
    EmptyQuery,

    #[error("failed to read input file at {0}")]
    InputRead(PathBuf),

    #[error("failed to parse input CSV: {0}")]
    InputParse(String),

    #[error("input file has no column named {0} (case-insensitive)")]
    MissingColumn(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("ChEMBL request failed: {0}")]
    ChemblHttp(String),

    #[error("ChEMBL returned status {status}: {message}")]
    ChemblStatus { status: u16, message: String },

    #[error("PubChem request failed: {0}")]
    PubchemHttp(String),

    #[error("PubChem returned status {status}: {message}")]
    PubchemStatus { status: u16, message: String },

    #[error("UniChem request failed: {0}")]
    UnichemHttp(String),

    #[error("UniChem returned status {status}: {message}")]
    UnichemStatus { status: u16, message: String },

    #[error("KEGG request failed: {0}")]
    KeggHttp(String),

    #[error("KEGG returned status {status}: {message}")]
    KeggStatus { status: u16, message: String },

    #[error("uniprot request failed: {0}")]
    UniprotHttp(String),

    #[error("uniprot returned status {status}: {message}")]
    UniprotStatus { status: u16, message: String },

    #[error("unexpected response payload: {0}")]
    Payload(String),

    #[error("report rows are misaligned at row {row}: assay target {assay:?}, target table {target:?}")]
    MisalignedReport {
        row: usize,
        assay: Option<String>,
        target: Option<String>,
    },

    #[error("report row counts differ: {assay} assay rows, {targets} target rows")]
    ReportLength { assay: usize, targets: usize },

    #[error("table has no column named {0}")]
    UnknownColumn(String),

    #[error("failed to write spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl AnnotatorError {
    /// True for errors raised while talking to one of the remote services.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AnnotatorError::ChemblHttp(_)
                | AnnotatorError::ChemblStatus { .. }
                | AnnotatorError::PubchemHttp(_)
                | AnnotatorError::PubchemStatus { .. }
                | AnnotatorError::UnichemHttp(_)
                | AnnotatorError::UnichemStatus { .. }
                | AnnotatorError::KeggHttp(_)
                | AnnotatorError::KeggStatus { .. }
                | AnnotatorError::UniprotHttp(_)
                | AnnotatorError::UniprotStatus { .. }
                | AnnotatorError::Payload(_)
        )
    }
}
