use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Endpoints;
use crate::domain::{AssayFilter, ChemblId, NotationFormat, StructureQuery};
use crate::error::AnnotatorError;
use crate::http::{build_client, build_query_url};
use crate::table::Table;

pub const ANNOTATION_COLUMNS: &[&str] = &[
    "molecule_chembl_id",
    "pref_name",
    "molecule_type",
    "max_phase",
    "first_approval",
    "therapeutic_flag",
    "oral",
    "parenteral",
    "topical",
    "black_box_warning",
    "natural_product",
    "availability_type",
    "canonical_smiles",
    "standard_inchi",
    "standard_inchi_key",
    "full_mwt",
    "alogp",
    "molecule_synonyms",
    "atc_classifications",
];

/// Annotation projection joined with assays and mechanisms.
pub const STRUCTURE_COLUMNS: &[&str] = &[
    "molecule_chembl_id",
    "canonical_smiles",
    "standard_inchi",
    "standard_inchi_key",
];

pub const INDICATION_COLUMNS: &[&str] = &[
    "molecule_chembl_id",
    "drugind_id",
    "max_phase_for_ind",
    "mesh_id",
    "mesh_heading",
    "efo_id",
    "efo_term",
];

pub const ASSAY_COLUMNS: &[&str] = &[
    "molecule_chembl_id",
    "activity_id",
    "assay_chembl_id",
    "assay_type",
    "assay_description",
    "confidence_score",
    "target_chembl_id",
    "target_pref_name",
    "target_organism",
    "standard_type",
    "standard_relation",
    "standard_value",
    "standard_units",
    "pchembl_value",
    "document_chembl_id",
];

pub const MECHANISM_COLUMNS: &[&str] = &[
    "molecule_chembl_id",
    "mec_id",
    "mechanism_of_action",
    "action_type",
    "target_chembl_id",
    "direct_interaction",
    "disease_efficacy",
    "mechanism_comment",
];

const PAGE_LIMIT: &str = "1000";
const ASSAY_BATCH: usize = 50;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChemblStatus {
    #[serde(default)]
    pub chembl_db_version: Option<String>,
    #[serde(default)]
    pub chembl_release_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub activities: Option<u64>,
    /// Field name as served by the ChEMBL status endpoint.
    #[serde(default)]
    pub disinct_compounds: Option<u64>,
    #[serde(default)]
    pub targets: Option<u64>,
}

pub trait ChemblClient: Send + Sync {
    fn status(&self) -> Result<ChemblStatus, AnnotatorError>;
    fn molecule_id(&self, query: &StructureQuery) -> Result<Option<ChemblId>, AnnotatorError>;
    fn molecules(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError>;
    fn drug_indications(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError>;
    fn activities(&self, id: &ChemblId, filter: &AssayFilter)
    -> Result<Vec<Value>, AnnotatorError>;
    fn assays(
        &self,
        assay_ids: &[String],
        min_confidence: u8,
    ) -> Result<Vec<Value>, AnnotatorError>;
    fn mechanisms(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError>;
    fn target(&self, target_id: &str) -> Result<Option<Value>, AnnotatorError>;
    fn target_component(&self, component_id: u64) -> Result<Option<Value>, AnnotatorError>;
    fn protein_class(&self, class_id: u64) -> Result<Option<Value>, AnnotatorError>;
}

#[derive(Clone)]
pub struct ChemblHttpClient {
    client: Client,
    base: String,
}

impl ChemblHttpClient {
    pub fn new(endpoints: &Endpoints) -> Result<Self, AnnotatorError> {
        let client = build_client(endpoints.timeout)
            .map_err(|err| AnnotatorError::ChemblHttp(err.to_string()))?;
        Ok(Self {
            client,
            base: endpoints.chembl.clone(),
        })
    }

    fn data_url(&self, resource: &str) -> String {
        format!("{}/data/{resource}", self.base)
    }

    /// Converts a SMILES string to its standard InChIKey with ChEMBL's
    /// structure utilities.
    pub fn smiles_to_inchikey(&self, smiles: &str) -> Result<String, AnnotatorError> {
        let response = self
            .client
            .post(format!("{}/utils/smiles2inchiKey", self.base))
            .header(CONTENT_TYPE, "text/plain")
            .body(smiles.to_string())
            .send()
            .map_err(|err| AnnotatorError::ChemblHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let key = response
            .text()
            .map_err(|err| AnnotatorError::ChemblHttp(err.to_string()))?;
        Ok(key.trim().to_string())
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
            .unwrap_or_else(|_| "ChEMBL request failed".to_string());
        Err(AnnotatorError::ChemblStatus { status, message })
    }

    fn get_json(&self, url: &str) -> Result<Option<Value>, AnnotatorError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| AnnotatorError::ChemblHttp(err.to_string()))?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let response = Self::handle_status(response)?;
        let value = response
            .json()
            .map_err(|err| AnnotatorError::ChemblHttp(err.to_string()))?;
        Ok(Some(value))
    }

    /// Follows `page_meta.next` until the collection is exhausted.
    fn list(
        &self,
        resource: &str,
        collection: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<Value>, AnnotatorError> {
        let mut params = params.to_vec();
        params.push(("limit", PAGE_LIMIT));
        let mut url = build_query_url(&self.data_url(&format!("{resource}.json")), &params);
        let mut records = Vec::new();
        loop {
            let Some(page) = self.get_json(&url)? else {
                break;
            };
            if let Some(items) = page.get(collection).and_then(Value::as_array) {
                records.extend(items.iter().cloned());
            }
            match page
                .get("page_meta")
                .and_then(|meta| meta.get("next"))
                .and_then(Value::as_str)
            {
                Some(next) => url = self.resolve_next(next)?,
                None => break,
            }
        }
        Ok(records)
    }

    fn resolve_next(&self, next: &str) -> Result<String, AnnotatorError> {
        let base = Url::parse(&self.base).map_err(|err| AnnotatorError::Payload(err.to_string()))?;
        base.join(next)
            .map(|url| url.to_string())
            .map_err(|err| AnnotatorError::Payload(err.to_string()))
    }

    fn single(&self, resource: &str, id: &str) -> Result<Option<Value>, AnnotatorError> {
        self.get_json(&self.data_url(&format!("{resource}/{id}.json")))
    }
}

impl ChemblClient for ChemblHttpClient {
    fn status(&self) -> Result<ChemblStatus, AnnotatorError> {
        let value = self
            .get_json(&self.data_url("status.json"))?
            .ok_or_else(|| AnnotatorError::Payload("ChEMBL status not available".to_string()))?;
        serde_json::from_value(value).map_err(|err| AnnotatorError::Payload(err.to_string()))
    }

    fn molecule_id(&self, query: &StructureQuery) -> Result<Option<ChemblId>, AnnotatorError> {
        let field = match query.format() {
            NotationFormat::Smiles => "molecule_structures__canonical_smiles__flexmatch",
            NotationFormat::Inchi => "molecule_structures__standard_inchi",
            NotationFormat::Inchikey => "molecule_structures__standard_inchi_key",
        };
        let molecules = self.list("molecule", "molecules", &[(field, query.as_str())])?;
        molecules
            .first()
            .and_then(|molecule| molecule.get("molecule_chembl_id"))
            .and_then(Value::as_str)
            .map(|id| id.parse::<ChemblId>())
            .transpose()
    }

    fn molecules(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError> {
        self.list("molecule", "molecules", &[("molecule_chembl_id", id.as_str())])
    }

    fn drug_indications(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError> {
        self.list(
            "drug_indication",
            "drug_indications",
            &[("molecule_chembl_id", id.as_str())],
        )
    }

    fn activities(
        &self,
        id: &ChemblId,
        filter: &AssayFilter,
    ) -> Result<Vec<Value>, AnnotatorError> {
        let assay_types = filter
            .assay_types
            .iter()
            .map(|assay_type| assay_type.code())
            .collect::<Vec<_>>()
            .join(",");
        let pchembl = filter.pchembl_value_gte.to_string();
        self.list(
            "activity",
            "activities",
            &[
                ("molecule_chembl_id", id.as_str()),
                ("pchembl_value__gte", pchembl.as_str()),
                ("assay_type__in", assay_types.as_str()),
            ],
        )
    }

    fn assays(
        &self,
        assay_ids: &[String],
        min_confidence: u8,
    ) -> Result<Vec<Value>, AnnotatorError> {
        let confidence = min_confidence.to_string();
        let mut assays = Vec::new();
        for batch in assay_ids.chunks(ASSAY_BATCH) {
            let ids = batch.join(",");
            assays.extend(self.list(
                "assay",
                "assays",
                &[
                    ("assay_chembl_id__in", ids.as_str()),
                    ("confidence_score__gte", confidence.as_str()),
                ],
            )?);
        }
        Ok(assays)
    }

    fn mechanisms(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError> {
        self.list(
            "mechanism",
            "mechanisms",
            &[("molecule_chembl_id", id.as_str())],
        )
    }

    fn target(&self, target_id: &str) -> Result<Option<Value>, AnnotatorError> {
        self.single("target", target_id)
    }

    fn target_component(&self, component_id: u64) -> Result<Option<Value>, AnnotatorError> {
        self.single("target_component", &component_id.to_string())
    }

    fn protein_class(&self, class_id: u64) -> Result<Option<Value>, AnnotatorError> {
        self.single("protein_classification", &class_id.to_string())
    }
}

/// Lifts `molecule_structures` and selected `molecule_properties` fields to
/// the top level and flattens synonym and ATC lists.
pub fn flatten_molecule(raw: &Value) -> Value {
    let mut flat = match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    if let Some(Value::Object(structures)) = raw.get("molecule_structures") {
        for key in ["canonical_smiles", "standard_inchi", "standard_inchi_key"] {
            if let Some(value) = structures.get(key) {
                flat.insert(key.to_string(), value.clone());
            }
        }
    }
    if let Some(Value::Object(properties)) = raw.get("molecule_properties") {
        for key in ["full_mwt", "alogp"] {
            if let Some(value) = properties.get(key) {
                flat.insert(key.to_string(), numeric(value));
            }
        }
    }
    let synonyms = raw
        .get("molecule_synonyms")
        .and_then(Value::as_array)
        .map(|items| {
            let mut names: Vec<&str> = Vec::new();
            for name in items
                .iter()
                .filter_map(|item| item.get("molecule_synonym").and_then(Value::as_str))
            {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            names.join("; ")
        });
    flat.insert(
        "molecule_synonyms".to_string(),
        synonyms.map(Value::String).unwrap_or(Value::Null),
    );
    let atc = raw
        .get("atc_classifications")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(";")
        });
    flat.insert(
        "atc_classifications".to_string(),
        atc.map(Value::String).unwrap_or(Value::Null),
    );
    Value::Object(flat)
}

/// ChEMBL serves many numeric properties as strings.
fn numeric(value: &Value) -> Value {
    match value.as_str().and_then(|text| text.parse::<f64>().ok()) {
        Some(number) => serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        None => value.clone(),
    }
}

pub fn annotation_table(records: &[Value]) -> Table {
    let flat: Vec<Value> = records.iter().map(flatten_molecule).collect();
    Table::from_records(ANNOTATION_COLUMNS, &flat)
}

pub fn indication_table(records: &[Value]) -> Table {
    Table::from_records(INDICATION_COLUMNS, records)
}

pub fn mechanism_table(records: &[Value]) -> Table {
    Table::from_records(MECHANISM_COLUMNS, records)
}

/// Activities passing the potency/type filters whose assay also meets the
/// confidence threshold, with `assay_description` and `confidence_score`
/// taken from the assay record.
pub fn filtered_assay_table<C: ChemblClient + ?Sized>(
    client: &C,
    id: &ChemblId,
    filter: &AssayFilter,
) -> Result<Table, AnnotatorError> {
    let activities = client.activities(id, filter)?;
    let mut assay_ids: Vec<String> = Vec::new();
    for activity in &activities {
        if let Some(assay_id) = activity.get("assay_chembl_id").and_then(Value::as_str) {
            if !assay_ids.iter().any(|known| known == assay_id) {
                assay_ids.push(assay_id.to_string());
            }
        }
    }
    if assay_ids.is_empty() {
        return Ok(Table::new(ASSAY_COLUMNS.iter().copied()));
    }

    let assays = client.assays(&assay_ids, filter.confidence_threshold)?;
    let mut kept = Vec::new();
    for activity in activities {
        let assay_id = activity.get("assay_chembl_id").and_then(Value::as_str);
        let assay = assays.iter().find(|assay| {
            assay.get("assay_chembl_id").and_then(Value::as_str) == assay_id
                && assay
                    .get("confidence_score")
                    .and_then(Value::as_u64)
                    .is_some_and(|score| score >= u64::from(filter.confidence_threshold))
        });
        let Some(assay) = assay else {
            continue;
        };
        let mut record = match activity {
            Value::Object(map) => map,
            _ => continue,
        };
        record.insert(
            "confidence_score".to_string(),
            assay.get("confidence_score").cloned().unwrap_or(Value::Null),
        );
        if record.get("assay_description").is_none_or(Value::is_null) {
            if let Some(description) = assay.get("description") {
                record.insert("assay_description".to_string(), description.clone());
            }
        }
        if let Some(value) = record.get("pchembl_value").map(numeric) {
            record.insert("pchembl_value".to_string(), value);
        }
        if let Some(value) = record.get("standard_value").map(numeric) {
            record.insert("standard_value".to_string(), value);
        }
        kept.push(Value::Object(record));
    }
    Ok(Table::from_records(ASSAY_COLUMNS, &kept))
}
