#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use chem_annotator::app::{ProgressEvent, ProgressSink};
use chem_annotator::chembl::{ChemblClient, ChemblStatus};
use chem_annotator::domain::{AssayFilter, ChemblId, StructureQuery};
use chem_annotator::error::AnnotatorError;
use chem_annotator::kegg::{PathwayClient, PathwayEntry};
use chem_annotator::pubchem::PubchemClient;
use chem_annotator::unichem::StructureIndexClient;
use chem_annotator::uniprot::UniprotClient;

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Default)]
pub struct MockChembl {
    pub ids: HashMap<String, String>,
    pub failing_queries: Vec<String>,
    pub molecules: HashMap<String, Vec<Value>>,
    pub indications: HashMap<String, Vec<Value>>,
    pub activities: HashMap<String, Vec<Value>>,
    pub assays: Vec<Value>,
    pub mechanisms: HashMap<String, Vec<Value>>,
    pub targets: HashMap<String, Value>,
    pub components: HashMap<u64, Value>,
    pub classes: HashMap<u64, Value>,
    pub class_calls: Mutex<usize>,
}

impl MockChembl {
    /// Registers one molecule reachable from `query`.
    pub fn with_molecule(mut self, query: &str, id: &str, smiles: &str) -> Self {
        self.ids.insert(query.to_string(), id.to_string());
        self.molecules
            .insert(id.to_string(), vec![molecule(id, smiles)]);
        self
    }
}

pub fn molecule(id: &str, smiles: &str) -> Value {
    json!({
        "molecule_chembl_id": id,
        "pref_name": format!("DRUG {id}"),
        "max_phase": 4,
        "molecule_structures": {
            "canonical_smiles": smiles,
            "standard_inchi": format!("InChI=1S/{id}"),
            "standard_inchi_key": format!("{id}-KEY")
        }
    })
}

pub fn activity(molecule: &str, assay: &str, target: &str, pchembl: &str) -> Value {
    json!({
        "molecule_chembl_id": molecule,
        "activity_id": 1,
        "assay_chembl_id": assay,
        "assay_type": "B",
        "target_chembl_id": target,
        "standard_type": "IC50",
        "pchembl_value": pchembl
    })
}

pub fn assay(id: &str, confidence: u64) -> Value {
    json!({"assay_chembl_id": id, "confidence_score": confidence, "description": format!("assay {id}")})
}

fn lookup(map: &HashMap<String, Vec<Value>>, id: &ChemblId) -> Vec<Value> {
    map.get(id.as_str()).cloned().unwrap_or_default()
}

impl ChemblClient for MockChembl {
    fn status(&self) -> Result<ChemblStatus, AnnotatorError> {
        Err(AnnotatorError::ChemblHttp("offline".to_string()))
    }

    fn molecule_id(&self, query: &StructureQuery) -> Result<Option<ChemblId>, AnnotatorError> {
        if self.failing_queries.iter().any(|q| q == query.as_str()) {
            return Err(AnnotatorError::ChemblStatus {
                status: 500,
                message: "lookup failed".to_string(),
            });
        }
        self.ids
            .get(query.as_str())
            .map(|id| id.parse::<ChemblId>())
            .transpose()
    }

    fn molecules(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError> {
        Ok(lookup(&self.molecules, id))
    }

    fn drug_indications(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError> {
        Ok(lookup(&self.indications, id))
    }

    fn activities(
        &self,
        id: &ChemblId,
        _filter: &AssayFilter,
    ) -> Result<Vec<Value>, AnnotatorError> {
        Ok(lookup(&self.activities, id))
    }

    fn assays(
        &self,
        assay_ids: &[String],
        min_confidence: u8,
    ) -> Result<Vec<Value>, AnnotatorError> {
        Ok(self
            .assays
            .iter()
            .filter(|assay| {
                let id = assay["assay_chembl_id"].as_str().unwrap_or_default();
                assay_ids.iter().any(|wanted| wanted == id)
                    && assay["confidence_score"].as_u64().unwrap_or(0) >= u64::from(min_confidence)
            })
            .cloned()
            .collect())
    }

    fn mechanisms(&self, id: &ChemblId) -> Result<Vec<Value>, AnnotatorError> {
        Ok(lookup(&self.mechanisms, id))
    }

    fn target(&self, target_id: &str) -> Result<Option<Value>, AnnotatorError> {
        if target_id == "CHEMBL_BROKEN" {
            return Err(AnnotatorError::ChemblHttp("connection reset".to_string()));
        }
        Ok(self.targets.get(target_id).cloned())
    }

    fn target_component(&self, component_id: u64) -> Result<Option<Value>, AnnotatorError> {
        Ok(self.components.get(&component_id).cloned())
    }

    fn protein_class(&self, class_id: u64) -> Result<Option<Value>, AnnotatorError> {
        *self.class_calls.lock().unwrap() += 1;
        Ok(self.classes.get(&class_id).cloned())
    }
}

#[derive(Default)]
pub struct MockPubchem {
    pub cids: HashMap<String, u64>,
}

impl PubchemClient for MockPubchem {
    fn cid(&self, query: &StructureQuery) -> Result<Option<u64>, AnnotatorError> {
        Ok(self.cids.get(query.as_str()).copied())
    }
}

#[derive(Default)]
pub struct MockIndex {
    pub ids: HashMap<String, String>,
}

impl StructureIndexClient for MockIndex {
    fn surechembl_id(&self, query: &StructureQuery) -> Result<Option<String>, AnnotatorError> {
        Ok(self.ids.get(query.as_str()).cloned())
    }
}

#[derive(Default)]
pub struct MockKegg {
    pub pathways: HashMap<String, Vec<PathwayEntry>>,
    pub failing: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockKegg {
    pub fn with(mut self, ec: &str, entries: &[(&str, &str)]) -> Self {
        self.pathways.insert(
            ec.to_string(),
            entries
                .iter()
                .map(|(id, name)| PathwayEntry {
                    kegg_id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        );
        self
    }
}

impl PathwayClient for MockKegg {
    fn pathways_for_ec(&self, ec_number: &str) -> Result<Vec<PathwayEntry>, AnnotatorError> {
        self.calls.lock().unwrap().push(ec_number.to_string());
        if self.failing.iter().any(|ec| ec == ec_number) {
            return Err(AnnotatorError::KeggStatus {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.pathways.get(ec_number).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockUniprot {
    pub ec: HashMap<String, Vec<String>>,
}

impl UniprotClient for MockUniprot {
    fn ec_numbers(&self, accession: &str) -> Result<Vec<String>, AnnotatorError> {
        Ok(self.ec.get(accession).cloned().unwrap_or_default())
    }
}

#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber that records formatted log lines.
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&capture.0.lock().unwrap()).to_string();
    (result, logs)
}
