use serde::Serialize;

use crate::chembl::{ChemblClient, ChemblStatus};
use crate::compounds::{CompoundList, CompoundTables, process_compounds};
use crate::config::{OutputPaths, RunRequest};
use crate::domain::AssayFilter;
use crate::error::AnnotatorError;
use crate::hierarchy::resolve_hierarchies;
use crate::kegg::PathwayClient;
use crate::pathways::{pathway_table, resolve_pathways};
use crate::pubchem::PubchemClient;
use crate::report::{
    assemble_assay_targets, merge_hierarchy, merge_pathways, numbered, write_xlsx,
};
use crate::table::Table;
use crate::targets::{EC_COLUMN, process_targets};
use crate::unichem::StructureIndexClient;
use crate::uniprot::UniprotClient;

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    /// `(position, total)` while iterating over compounds.
    pub step: Option<(usize, usize)>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub compounds: usize,
    pub processed: usize,
    pub skipped: Vec<usize>,
    pub info_rows: usize,
    pub assay_rows: usize,
    pub moa_rows: usize,
    pub target_rows: usize,
    pub pathway_targets: usize,
    pub outputs: Vec<String>,
}

/// Every table produced by one run, before numbering.
#[derive(Debug, Clone)]
pub struct RunTables {
    pub compounds: CompoundTables,
    pub targets: Table,
    pub pathways: Table,
    pub assay_targets: Table,
}

pub struct App<C, P, S, K, U>
where
    C: ChemblClient,
    P: PubchemClient,
    S: StructureIndexClient,
    K: PathwayClient,
    U: UniprotClient,
{
    chembl: C,
    pubchem: P,
    index: S,
    kegg: K,
    uniprot: U,
}

impl<C, P, S, K, U> App<C, P, S, K, U>
where
    C: ChemblClient,
    P: PubchemClient,
    S: StructureIndexClient,
    K: PathwayClient,
    U: UniprotClient,
{
    pub fn new(chembl: C, pubchem: P, index: S, kegg: K, uniprot: U) -> Self {
        Self {
            chembl,
            pubchem,
            index,
            kegg,
            uniprot,
        }
    }

    /// ChEMBL release banner, or `None` when the status endpoint fails.
    pub fn chembl_status(&self) -> Option<ChemblStatus> {
        match self.chembl.status() {
            Ok(status) => Some(status),
            Err(err) => {
                tracing::debug!("ChEMBL status unavailable: {err}");
                None
            }
        }
    }

    /// Builds every report table without touching the filesystem. `run`
    /// goes through the same two stages with a write between them.
    pub fn annotate(
        &self,
        list: &CompoundList,
        filter: &AssayFilter,
        sink: &dyn ProgressSink,
    ) -> Result<RunTables, AnnotatorError> {
        let compounds = self.annotate_compounds(list, filter, sink);
        self.annotate_targets(compounds, sink)
    }

    fn annotate_compounds(
        &self,
        list: &CompoundList,
        filter: &AssayFilter,
        sink: &dyn ProgressSink,
    ) -> CompoundTables {
        process_compounds(
            list,
            filter,
            &self.chembl,
            &self.pubchem,
            &self.index,
            sink,
        )
    }

    fn annotate_targets(
        &self,
        compounds: CompoundTables,
        sink: &dyn ProgressSink,
    ) -> Result<RunTables, AnnotatorError> {
        let targets = process_targets(&compounds.assay, &self.chembl, &self.uniprot)?;

        phase(sink, "Processing EC numbers and retrieving pathway information...");
        let pathway_records = resolve_pathways(&targets.table, &self.kegg)?;
        let pathways = pathway_table(&pathway_records);
        let with_pathways = merge_pathways(&targets.table, &pathways)?;

        phase(sink, "Retrieving protein hierarchy information...");
        let hierarchy = resolve_hierarchies(&self.chembl, &targets.records);
        let combined = merge_hierarchy(&with_pathways, &hierarchy)?;
        let assay_targets = assemble_assay_targets(&compounds.assay, &combined)?;

        Ok(RunTables {
            targets: targets.table.drop_column(EC_COLUMN),
            pathways,
            assay_targets,
            compounds,
        })
    }

    /// Reads the input, annotates it and writes the six reports.
    pub fn run(
        &self,
        request: &RunRequest,
        filter: &AssayFilter,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, AnnotatorError> {
        let list = CompoundList::read(&request.input, request.format)?;
        tracing::info!(
            compounds = list.len(),
            format = %request.format,
            input = %request.input.display(),
            "read compound list"
        );
        let paths = OutputPaths::from_prefix(&request.output_prefix);

        let compounds = self.annotate_compounds(&list, filter, sink);
        write_xlsx(&numbered(&compounds.info), &paths.drugs_info)?;
        write_xlsx(&numbered(&compounds.assay), &paths.drugs_assay)?;
        write_xlsx(&numbered(&compounds.moa), &paths.drugs_moa)?;
        phase(
            sink,
            "All compounds have been processed and their data has been saved. Now processing targets data...",
        );

        let tables = self.annotate_targets(compounds, sink)?;
        write_xlsx(&tables.pathways, &paths.pathway_info)?;
        write_xlsx(&numbered(&tables.targets), &paths.targets_info)?;
        write_xlsx(
            &numbered(&tables.assay_targets),
            &paths.drugs_assay_targets_info,
        )?;
        phase(sink, "Script execution completed successfully.");

        let compounds = &tables.compounds;
        Ok(RunSummary {
            compounds: list.len(),
            processed: compounds.processed,
            skipped: compounds.skipped.iter().map(|skip| skip.sequence).collect(),
            info_rows: compounds.info.len(),
            assay_rows: compounds.assay.len(),
            moa_rows: compounds.moa.len(),
            target_rows: tables.targets.len(),
            pathway_targets: tables.pathways.len(),
            outputs: paths.all().iter().map(|path| path.to_string()).collect(),
        })
    }
}

fn phase(sink: &dyn ProgressSink, message: &str) {
    tracing::info!("{message}");
    sink.event(ProgressEvent {
        message: message.to_string(),
        step: None,
    });
}
