use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::Endpoints;
use crate::error::AnnotatorError;
use crate::http::build_client;

pub trait UniprotClient: Send + Sync {
    /// EC numbers annotated on a UniProtKB accession.
    fn ec_numbers(&self, accession: &str) -> Result<Vec<String>, AnnotatorError>;
}

#[derive(Clone)]
pub struct UniprotHttpClient {
    client: Client,
    base: String,
}

impl UniprotHttpClient {
    pub fn new(endpoints: &Endpoints) -> Result<Self, AnnotatorError> {
        let client = build_client(endpoints.timeout)
            .map_err(|err| AnnotatorError::UniprotHttp(err.to_string()))?;
        Ok(Self {
            client,
            base: endpoints.uniprot.clone(),
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
            .unwrap_or_else(|_| "uniprot request failed".to_string());
        Err(AnnotatorError::UniprotStatus { status, message })
    }
}

impl UniprotClient for UniprotHttpClient {
    fn ec_numbers(&self, accession: &str) -> Result<Vec<String>, AnnotatorError> {
        let url = format!("{}/{}.json?fields=ec", self.base, accession.trim());
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| AnnotatorError::UniprotHttp(err.to_string()))?;
        if response.status().as_u16() == 404 {
            return Ok(Vec::new());
        }
        let response = Self::handle_status(response)?;
        let raw: Value = response
            .json()
            .map_err(|err| AnnotatorError::UniprotHttp(err.to_string()))?;
        Ok(extract_ec_numbers(&raw))
    }
}

/// Collects every `ecNumbers` entry under `proteinDescription`, covering
/// recommended, alternative, submission, `includes` and `contains` names.
pub fn extract_ec_numbers(raw: &Value) -> Vec<String> {
    let mut numbers = Vec::new();
    if let Some(description) = raw.get("proteinDescription") {
        collect_ec(description, &mut numbers);
    }
    numbers
}

fn collect_ec(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "ecNumbers" {
                    for number in child
                        .as_array()
                        .into_iter()
                        .flatten()
                        .filter_map(|item| item.get("value").and_then(Value::as_str))
                    {
                        if !out.iter().any(|known| known == number) {
                            out.push(number.to_string());
                        }
                    }
                } else {
                    collect_ec(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_ec(item, out);
            }
        }
        _ => {}
    }
}
