//! ChEMBL protein classification lineages.
//!
//! Each target component carries one or more protein classification ids.
//! Every id is walked up its `parent_id` chain and rendered root first, for
//! example `Enzyme > Protease > Serine protease > Serine protease S1A family`.

use std::collections::HashMap;

use serde_json::Value;

use crate::chembl::ChemblClient;
use crate::error::AnnotatorError;
use crate::table::{Cell, Table};
use crate::targets::{TARGET_KEY, TargetRecord};

pub const HIERARCHY_COLUMNS: &[&str] = &[TARGET_KEY, "protein_classifications", "protein_hierarchy"];

const LEVEL_SEPARATOR: &str = " > ";
const LINEAGE_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub pref_name: String,
}

pub fn parse_class_node(raw: &Value) -> Option<ClassNode> {
    let id = raw.get("protein_class_id").and_then(Value::as_u64)?;
    let pref_name = raw
        .get("pref_name")
        .and_then(Value::as_str)
        .or_else(|| raw.get("short_name").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();
    Some(ClassNode {
        id,
        parent_id: raw.get("parent_id").and_then(Value::as_u64),
        pref_name,
    })
}

/// Protein classification ids of all components of `target`, deduplicated.
pub fn protein_classifications<C: ChemblClient + ?Sized>(
    client: &C,
    target: &TargetRecord,
) -> Result<Vec<u64>, AnnotatorError> {
    let mut ids = Vec::new();
    for component_id in &target.component_ids {
        let Some(component) = client.target_component(*component_id)? else {
            continue;
        };
        for id in component
            .get("protein_classifications")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.get("protein_classification_id").and_then(Value::as_u64))
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

/// Walks classification trees, remembering nodes already fetched in this run.
pub struct HierarchyResolver<'a, C: ChemblClient + ?Sized> {
    client: &'a C,
    nodes: HashMap<u64, Option<ClassNode>>,
}

impl<'a, C: ChemblClient + ?Sized> HierarchyResolver<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            nodes: HashMap::new(),
        }
    }

    fn node(&mut self, id: u64) -> Result<Option<ClassNode>, AnnotatorError> {
        if let Some(node) = self.nodes.get(&id) {
            return Ok(node.clone());
        }
        let node = self
            .client
            .protein_class(id)?
            .as_ref()
            .and_then(parse_class_node);
        self.nodes.insert(id, node.clone());
        Ok(node)
    }

    /// Labels from the root down to `id`.
    pub fn lineage(&mut self, id: u64) -> Result<Vec<String>, AnnotatorError> {
        let mut labels = Vec::new();
        let mut visited = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if visited.contains(&node_id) {
                tracing::warn!("protein classification cycle at {node_id}");
                break;
            }
            visited.push(node_id);
            let Some(node) = self.node(node_id)? else {
                break;
            };
            if !node.pref_name.is_empty() {
                labels.push(node.pref_name);
            }
            current = node.parent_id;
        }
        labels.reverse();
        Ok(labels)
    }

    pub fn trace(&mut self, ids: &[u64]) -> Result<String, AnnotatorError> {
        let mut lineages = Vec::new();
        for id in ids {
            let lineage = self.lineage(*id)?.join(LEVEL_SEPARATOR);
            if !lineage.is_empty() && !lineages.contains(&lineage) {
                lineages.push(lineage);
            }
        }
        Ok(lineages.join(LINEAGE_SEPARATOR))
    }
}

/// One row per target with its classification ids and lineage. Lookup
/// failures are logged and leave both fields empty.
pub fn resolve_hierarchies<C: ChemblClient + ?Sized>(
    client: &C,
    targets: &[TargetRecord],
) -> Table {
    let mut resolver = HierarchyResolver::new(client);
    let mut table = Table::new(HIERARCHY_COLUMNS.iter().copied());
    for target in targets {
        let resolved = protein_classifications(client, target)
            .and_then(|ids| resolver.trace(&ids).map(|lineage| (ids, lineage)));
        let (ids, lineage) = match resolved {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(
                    "while tracing protein hierarchy of {}: {err}",
                    target.target_chembl_id
                );
                (Vec::new(), String::new())
            }
        };
        let ids = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(";");
        table.push_row(vec![
            Cell::text(&target.target_chembl_id),
            Cell::optional(Some(ids)),
            Cell::optional(Some(lineage)),
        ]);
    }
    table
}
