use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{AssayFilter, AssayType, NotationFormat, parse_assay_types};
use crate::error::AnnotatorError;

pub const DEFAULT_CHEMBL_BASE: &str = "https://www.ebi.ac.uk/chembl/api";
pub const DEFAULT_PUBCHEM_BASE: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";
pub const DEFAULT_UNICHEM_BASE: &str = "https://www.ebi.ac.uk/unichem/api/v1";
pub const DEFAULT_KEGG_BASE: &str = "https://rest.kegg.jp";
pub const DEFAULT_UNIPROT_BASE: &str = "https://rest.uniprot.org/uniprotkb";

/// Optional JSON settings file. Every field may be omitted.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub confidence_threshold: Option<i64>,
    #[serde(default)]
    pub assay_types: Option<String>,
    #[serde(default)]
    pub pchembl_value_gte: Option<f64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub chembl_base: Option<String>,
    #[serde(default)]
    pub pubchem_base: Option<String>,
    #[serde(default)]
    pub unichem_base: Option<String>,
    #[serde(default)]
    pub kegg_base: Option<String>,
    #[serde(default)]
    pub uniprot_base: Option<String>,
}

/// Values supplied on the command line; `None` falls back to the file, then
/// to the built-in default.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub confidence_threshold: Option<i64>,
    pub assay_types: Option<String>,
    pub pchembl_value_gte: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub chembl: String,
    pub pubchem: String,
    pub unichem: String,
    pub kegg: String,
    pub uniprot: String,
    /// No timeout unless configured: a stalled service stalls the batch.
    pub timeout: Option<Duration>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            chembl: DEFAULT_CHEMBL_BASE.to_string(),
            pubchem: DEFAULT_PUBCHEM_BASE.to_string(),
            unichem: DEFAULT_UNICHEM_BASE.to_string(),
            kegg: DEFAULT_KEGG_BASE.to_string(),
            uniprot: DEFAULT_UNIPROT_BASE.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: PathBuf,
    pub output_prefix: Utf8PathBuf,
    pub format: NotationFormat,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub filter: AssayFilter,
    pub endpoints: Endpoints,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&Path>, cli: CliOverrides) -> Result<Settings, AnnotatorError> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|_| AnnotatorError::ConfigRead(path.to_path_buf()))?;
                serde_json::from_str(&content)
                    .map_err(|err| AnnotatorError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };
        Self::resolve_config(config, cli)
    }

    pub fn resolve_config(config: Config, cli: CliOverrides) -> Result<Settings, AnnotatorError> {
        let confidence = cli
            .confidence_threshold
            .or(config.confidence_threshold)
            .unwrap_or(8);
        if !(0..=9).contains(&confidence) {
            return Err(AnnotatorError::InvalidConfidence(confidence));
        }

        let assay_types: Vec<AssayType> = match cli.assay_types.or(config.assay_types) {
            Some(value) => parse_assay_types(&value)?,
            None => AssayFilter::default().assay_types,
        };

        let pchembl = cli
            .pchembl_value_gte
            .or(config.pchembl_value_gte)
            .unwrap_or(6.0);
        if !pchembl.is_finite() {
            return Err(AnnotatorError::InvalidPchembl(pchembl));
        }

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            chembl: trim_base(config.chembl_base).unwrap_or(defaults.chembl),
            pubchem: trim_base(config.pubchem_base).unwrap_or(defaults.pubchem),
            unichem: trim_base(config.unichem_base).unwrap_or(defaults.unichem),
            kegg: trim_base(config.kegg_base).unwrap_or(defaults.kegg),
            uniprot: trim_base(config.uniprot_base).unwrap_or(defaults.uniprot),
            timeout: config.request_timeout_secs.map(Duration::from_secs),
        };

        Ok(Settings {
            filter: AssayFilter {
                confidence_threshold: confidence as u8,
                assay_types,
                pchembl_value_gte: pchembl,
            },
            endpoints,
        })
    }
}

fn trim_base(value: Option<String>) -> Option<String> {
    value
        .map(|base| base.trim().trim_end_matches('/').to_string())
        .filter(|base| !base.is_empty())
}

/// Report files written for one run, in the order they are produced.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub drugs_info: Utf8PathBuf,
    pub drugs_assay: Utf8PathBuf,
    pub drugs_moa: Utf8PathBuf,
    pub pathway_info: Utf8PathBuf,
    pub targets_info: Utf8PathBuf,
    pub drugs_assay_targets_info: Utf8PathBuf,
}

impl OutputPaths {
    pub fn from_prefix(prefix: &Utf8PathBuf) -> Self {
        let path = |suffix: &str| Utf8PathBuf::from(format!("{prefix}_{suffix}.xlsx"));
        Self {
            drugs_info: path("drugs_info"),
            drugs_assay: path("drugs_assay"),
            drugs_moa: path("drugs_moa"),
            pathway_info: path("pathway_info"),
            targets_info: path("targets_info"),
            drugs_assay_targets_info: path("drugs_assay_targets_info"),
        }
    }

    pub fn all(&self) -> [&Utf8PathBuf; 6] {
        [
            &self.drugs_info,
            &self.drugs_assay,
            &self.drugs_moa,
            &self.pathway_info,
            &self.targets_info,
            &self.drugs_assay_targets_info,
        ]
    }
}
