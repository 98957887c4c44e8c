use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;

/// Chemical notation used for the query column of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NotationFormat {
    #[value(name = "smiles")]
    Smiles,
    #[value(name = "inchi")]
    Inchi,
    #[value(name = "inchikey")]
    Inchikey,
}

impl NotationFormat {
    /// Input column holding the query, compared case-insensitively.
    pub fn column_name(&self) -> &'static str {
        match self {
            NotationFormat::Smiles => "smiles",
            NotationFormat::Inchi => "inchi",
            NotationFormat::Inchikey => "inchikey",
        }
    }
}

impl fmt::Display for NotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotationFormat::Smiles => write!(f, "SMILES"),
            NotationFormat::Inchi => write!(f, "InChI"),
            NotationFormat::Inchikey => write!(f, "InChIKey"),
        }
    }
}

impl FromStr for NotationFormat {
    type Err = AnnotatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "smiles" => Ok(NotationFormat::Smiles),
            "inchi" => Ok(NotationFormat::Inchi),
            "inchikey" => Ok(NotationFormat::Inchikey),
            _ => Err(AnnotatorError::InvalidFormat(value.to_string())),
        }
    }
}

/// One compound query: the notation string plus the format it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureQuery {
    value: String,
    format: NotationFormat,
}

impl StructureQuery {
    pub fn new(value: &str, format: NotationFormat) -> Result<Self, AnnotatorError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AnnotatorError::EmptyQuery);
        }
        Ok(Self {
            value: value.to_string(),
            format,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn format(&self) -> NotationFormat {
        self.format
    }
}

impl fmt::Display for StructureQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.format, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChemblId(String);

impl ChemblId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChemblId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChemblId {
    type Err = AnnotatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let is_valid = normalized
            .strip_prefix("CHEMBL")
            .map(|rest| !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit()))
            .unwrap_or(false);
        if !is_valid {
            return Err(AnnotatorError::InvalidChemblId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// ChEMBL assay classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssayType {
    /// Binding
    B,
    /// Functional
    F,
    /// ADME
    A,
    /// Toxicity
    T,
    /// Physicochemical
    P,
    /// Unassigned
    U,
}

impl AssayType {
    pub fn code(&self) -> &'static str {
        match self {
            AssayType::B => "B",
            AssayType::F => "F",
            AssayType::A => "A",
            AssayType::T => "T",
            AssayType::P => "P",
            AssayType::U => "U",
        }
    }
}

impl fmt::Display for AssayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for AssayType {
    type Err = AnnotatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "B" => Ok(AssayType::B),
            "F" => Ok(AssayType::F),
            "A" => Ok(AssayType::A),
            "T" => Ok(AssayType::T),
            "P" => Ok(AssayType::P),
            "U" => Ok(AssayType::U),
            _ => Err(AnnotatorError::InvalidAssayType(value.to_string())),
        }
    }
}

/// Parses a comma-separated assay type list such as `B,F`.
pub fn parse_assay_types(value: &str) -> Result<Vec<AssayType>, AnnotatorError> {
    let mut types = Vec::new();
    for part in value.split(',').filter(|part| !part.trim().is_empty()) {
        let parsed: AssayType = part.parse()?;
        if !types.contains(&parsed) {
            types.push(parsed);
        }
    }
    if types.is_empty() {
        return Err(AnnotatorError::InvalidAssayType(value.to_string()));
    }
    Ok(types)
}

/// Activity filters applied to the ChEMBL assay lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct AssayFilter {
    pub confidence_threshold: u8,
    pub assay_types: Vec<AssayType>,
    pub pchembl_value_gte: f64,
}

impl Default for AssayFilter {
    fn default() -> Self {
        Self {
            confidence_threshold: 8,
            assay_types: vec![AssayType::B, AssayType::F],
            pchembl_value_gte: 6.0,
        }
    }
}
