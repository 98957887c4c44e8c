//! SureChEMBL identifiers resolved through UniChem.

use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::chembl::ChemblHttpClient;
use crate::config::Endpoints;
use crate::domain::{NotationFormat, StructureQuery};
use crate::error::AnnotatorError;
use crate::http::build_client;

/// UniChem source id of SureChEMBL.
pub const SURECHEMBL_SOURCE: u64 = 15;

pub trait StructureIndexClient: Send + Sync {
    fn surechembl_id(&self, query: &StructureQuery) -> Result<Option<String>, AnnotatorError>;
}

#[derive(Clone)]
pub struct UnichemHttpClient {
    client: Client,
    base: String,
    chembl: ChemblHttpClient,
}

impl UnichemHttpClient {
    /// UniChem has no SMILES search, so SMILES queries are first converted to
    /// an InChIKey through `chembl`.
    pub fn new(endpoints: &Endpoints, chembl: ChemblHttpClient) -> Result<Self, AnnotatorError> {
        let client = build_client(endpoints.timeout)
            .map_err(|err| AnnotatorError::UnichemHttp(err.to_string()))?;
        Ok(Self {
            client,
            base: endpoints.unichem.clone(),
            chembl,
        })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, AnnotatorError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "UniChem request failed".to_string());
        Err(AnnotatorError::UnichemStatus { status, message })
    }
}

impl StructureIndexClient for UnichemHttpClient {
    fn surechembl_id(&self, query: &StructureQuery) -> Result<Option<String>, AnnotatorError> {
        let (kind, compound) = match query.format() {
            NotationFormat::Smiles => ("inchikey", self.chembl.smiles_to_inchikey(query.as_str())?),
            NotationFormat::Inchi => ("inchi", query.as_str().to_string()),
            NotationFormat::Inchikey => ("inchikey", query.as_str().to_string()),
        };
        if compound.is_empty() {
            return Ok(None);
        }
        let response = self
            .client
            .post(format!("{}/compounds", self.base))
            .json(&json!({ "type": kind, "compound": compound }))
            .send()
            .map_err(|err| AnnotatorError::UnichemHttp(err.to_string()))?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let response = Self::handle_status(response)?;
        let payload: Value = response
            .json()
            .map_err(|err| AnnotatorError::UnichemHttp(err.to_string()))?;
        Ok(extract_source_id(&payload, SURECHEMBL_SOURCE))
    }
}

/// First compound id that `source` reports in a UniChem compounds response.
pub fn extract_source_id(payload: &Value, source: u64) -> Option<String> {
    payload["compounds"]
        .as_array()?
        .iter()
        .filter_map(|compound| compound["sources"].as_array())
        .flatten()
        .find(|entry| entry["id"].as_u64() == Some(source))
        .and_then(|entry| entry["compoundId"].as_str())
        .map(str::to_string)
}
