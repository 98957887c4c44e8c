//! PubChem PUG-REST compound lookups.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::config::Endpoints;
use crate::domain::{NotationFormat, StructureQuery};
use crate::error::AnnotatorError;
use crate::http::{build_client, encode_url_component};

pub trait PubchemClient: Send + Sync {
    /// First PubChem CID matching the query, if any.
    fn cid(&self, query: &StructureQuery) -> Result<Option<u64>, AnnotatorError>;
}

#[derive(Clone)]
pub struct PubchemHttpClient {
    client: Client,
    base: String,
}

impl PubchemHttpClient {
    pub fn new(endpoints: &Endpoints) -> Result<Self, AnnotatorError> {
        let client = build_client(endpoints.timeout)
            .map_err(|err| AnnotatorError::PubchemHttp(err.to_string()))?;
        Ok(Self {
            client,
            base: endpoints.pubchem.clone(),
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
            .unwrap_or_else(|_| "PubChem request failed".to_string());
        Err(AnnotatorError::PubchemStatus { status, message })
    }
}

impl PubchemClient for PubchemHttpClient {
    fn cid(&self, query: &StructureQuery) -> Result<Option<u64>, AnnotatorError> {
        // SMILES and InChI may contain '/', so they travel in a form body.
        let request = match query.format() {
            NotationFormat::Inchikey => self.client.get(format!(
                "{}/compound/inchikey/{}/cids/JSON",
                self.base,
                encode_url_component(query.as_str())
            )),
            NotationFormat::Smiles | NotationFormat::Inchi => {
                let namespace = query.format().column_name();
                self.client
                    .post(format!("{}/compound/{namespace}/cids/JSON", self.base))
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(format!(
                        "{namespace}={}",
                        encode_url_component(query.as_str())
                    ))
            }
        };
        let response = request
            .send()
            .map_err(|err| AnnotatorError::PubchemHttp(err.to_string()))?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let response = Self::handle_status(response)?;
        let payload: Value = response
            .json()
            .map_err(|err| AnnotatorError::PubchemHttp(err.to_string()))?;
        Ok(extract_cid(&payload))
    }
}

/// CID 0 is PubChem's "no match" marker.
pub fn extract_cid(payload: &Value) -> Option<u64> {
    payload["IdentifierList"]["CID"]
        .as_array()
        .and_then(|cids| cids.first())
        .and_then(Value::as_u64)
        .filter(|cid| *cid != 0)
}
