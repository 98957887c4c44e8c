use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use crate::config::Endpoints;
use crate::error::AnnotatorError;
use crate::http::build_client;

/// KEGG accepts at most ten entries per `list` request.
const LIST_BATCH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathwayEntry {
    pub kegg_id: String,
    pub name: String,
}

pub trait PathwayClient: Send + Sync {
    /// Reference pathways linked to one EC number, in KEGG's order.
    fn pathways_for_ec(&self, ec_number: &str) -> Result<Vec<PathwayEntry>, AnnotatorError>;
}

pub struct KeggHttpClient {
    client: Client,
    base: String,
    names: Mutex<HashMap<String, String>>,
}

impl KeggHttpClient {
    pub fn new(endpoints: &Endpoints) -> Result<Self, AnnotatorError> {
        let client = build_client(endpoints.timeout)
            .map_err(|err| AnnotatorError::KeggHttp(err.to_string()))?;
        Ok(Self {
            client,
            base: endpoints.kegg.clone(),
            names: Mutex::new(HashMap::new()),
        })
    }

    fn get_text(&self, url: &str) -> Result<String, AnnotatorError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/plain")
            .send()
            .map_err(|err| AnnotatorError::KeggHttp(err.to_string()))?;
        // KEGG answers 404 for entries without links.
        if response.status().as_u16() == 404 {
            return Ok(String::new());
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "KEGG request failed".to_string());
            return Err(AnnotatorError::KeggStatus { status, message });
        }
        response
            .text()
            .map_err(|err| AnnotatorError::KeggHttp(err.to_string()))
    }

    fn pathway_names(&self, ids: &[String]) -> Result<HashMap<String, String>, AnnotatorError> {
        let mut names = self
            .names
            .lock()
            .map_err(|_| AnnotatorError::KeggHttp("pathway name table poisoned".to_string()))?;
        let missing: Vec<&String> = ids.iter().filter(|id| !names.contains_key(*id)).collect();
        for batch in missing.chunks(LIST_BATCH) {
            let query = batch
                .iter()
                .map(|id| format!("path:{id}"))
                .collect::<Vec<_>>()
                .join("+");
            let body = self.get_text(&format!("{}/list/{query}", self.base))?;
            names.extend(parse_list(&body));
        }
        Ok(ids
            .iter()
            .filter_map(|id| names.get(id).map(|name| (id.clone(), name.clone())))
            .collect())
    }
}

impl PathwayClient for KeggHttpClient {
    fn pathways_for_ec(&self, ec_number: &str) -> Result<Vec<PathwayEntry>, AnnotatorError> {
        let body = self.get_text(&format!("{}/link/pathway/ec:{ec_number}", self.base))?;
        let ids = parse_links(&body);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let names = self.pathway_names(&ids)?;
        Ok(ids
            .into_iter()
            .map(|kegg_id| {
                let name = names.get(&kegg_id).cloned().unwrap_or_default();
                PathwayEntry { kegg_id, name }
            })
            .collect())
    }
}

/// `path:map00010` or the EC-specific `path:ec00010`.
static PATHWAY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"path:(?:map|ec)(\d{5})").expect("pathway link pattern"));

/// Parses `link/pathway` output into reference pathway ids (`map00010`),
/// folding the EC-specific `ec00010` copies onto their reference map.
pub fn parse_links(body: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for captures in PATHWAY_LINK.captures_iter(body) {
        let id = format!("map{}", &captures[1]);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Parses `list` output (`path:map00010\tGlycolysis / Gluconeogenesis`).
pub fn parse_list(body: &str) -> HashMap<String, String> {
    body.lines()
        .filter_map(|line| line.split_once('\t'))
        .map(|(id, name)| {
            (
                id.trim().trim_start_matches("path:").to_string(),
                name.trim().to_string(),
            )
        })
        .collect()
}
