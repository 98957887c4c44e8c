use std::path::{Path, PathBuf};
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;

use chem_annotator::app::App;
use chem_annotator::chembl::ChemblHttpClient;
use chem_annotator::config::{CliOverrides, ConfigLoader, RunRequest};
use chem_annotator::domain::NotationFormat;
use chem_annotator::error::AnnotatorError;
use chem_annotator::kegg::KeggHttpClient;
use chem_annotator::logging::{LOG_FILE, init_log_file, log_run_header};
use chem_annotator::output::{ConsoleProgress, JsonOutput};
use chem_annotator::pubchem::PubchemHttpClient;
use chem_annotator::unichem::UnichemHttpClient;
use chem_annotator::uniprot::UniprotHttpClient;
use chem_annotator::{AUTHOR, CONTACT, INSTITUTION};

#[derive(Parser)]
#[command(name = "chem-annotator")]
#[command(about = "Chemical Annotator: fetches drug annotations from public repositories by exact match with the query structure")]
#[command(disable_version_flag = true)]
struct Cli {
    #[arg(short = 'v', long, help = "Show version information and exit")]
    version: bool,

    #[arg(short = 'a', long, help = "Show author information and exit")]
    author: bool,

    #[arg(short = 'i', long, help = "Input .csv file")]
    input: Option<PathBuf>,

    #[arg(short = 'o', long, help = "Output prefix for the .xlsx reports")]
    output: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        ignore_case = true,
        help = "Type of chemical notation to use as query (SMILES, InChI, or InChIKey)"
    )]
    format: Option<NotationFormat>,

    #[arg(
        long = "confidence-threshold",
        visible_alias = "ct",
        help = "Minimum confidence score value (default: 8)"
    )]
    confidence_threshold: Option<i64>,

    #[arg(
        long = "assay-type-in",
        visible_alias = "at",
        help = "Comma-separated list of assay types (default: B,F)"
    )]
    assay_type_in: Option<String>,

    #[arg(
        long = "pchembl-value-gte",
        visible_alias = "pcm",
        help = "Minimum pChEMBL value (default: 6)"
    )]
    pchembl_value_gte: Option<f64>,

    #[arg(short = 'c', long, help = "Optional JSON settings file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Print a JSON run summary on stdout")]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("Chemical Annotator: {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    if cli.author {
        println!("Author: {AUTHOR}");
        println!("Contact: {CONTACT}");
        println!("Institution: {INSTITUTION}");
        return ExitCode::SUCCESS;
    }

    let (Some(input), Some(output), Some(format)) = (cli.input.clone(), cli.output.clone(), cli.format)
    else {
        eprintln!("Error: Input, output, and format arguments are required. Use -h for help.");
        return ExitCode::from(2);
    };

    if let Err(err) = init_log_file(Path::new(LOG_FILE)) {
        eprintln!("Error: unable to set up {LOG_FILE}: {err}");
        return ExitCode::from(1);
    }

    let request = RunRequest {
        input,
        output_prefix: Utf8PathBuf::from(output),
        format,
    };
    if let Err(report) = run(&cli, &request) {
        tracing::error!("An error occurred: {report:?}");
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<AnnotatorError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &AnnotatorError) -> u8 {
    match error {
        AnnotatorError::InputRead(_)
        | AnnotatorError::InputParse(_)
        | AnnotatorError::MissingColumn(_)
        | AnnotatorError::ConfigRead(_)
        | AnnotatorError::ConfigParse(_)
        | AnnotatorError::InvalidAssayType(_)
        | AnnotatorError::InvalidConfidence(_)
        | AnnotatorError::InvalidPchembl(_) => 2,
        err if err.is_remote() => 3,
        _ => 1,
    }
}

fn run(cli: &Cli, request: &RunRequest) -> miette::Result<()> {
    let settings = ConfigLoader::resolve(
        cli.config.as_deref(),
        CliOverrides {
            confidence_threshold: cli.confidence_threshold,
            assay_types: cli.assay_type_in.clone(),
            pchembl_value_gte: cli.pchembl_value_gte,
        },
    )?;

    let endpoints = &settings.endpoints;
    let chembl = ChemblHttpClient::new(endpoints)?;
    let pubchem = PubchemHttpClient::new(endpoints)?;
    let unichem = UnichemHttpClient::new(endpoints, chembl.clone())?;
    let kegg = KeggHttpClient::new(endpoints)?;
    let uniprot = UniprotHttpClient::new(endpoints)?;
    let app = App::new(chembl, pubchem, unichem, kegg, uniprot);

    log_run_header(app.chembl_status().as_ref());
    tracing::info!(
        confidence_threshold = settings.filter.confidence_threshold,
        assay_types = ?settings.filter.assay_types,
        pchembl_value_gte = settings.filter.pchembl_value_gte,
        "assay filters"
    );

    if cli.json {
        let summary = app.run(request, &settings.filter, &JsonOutput)?;
        JsonOutput::print_summary(&summary).into_diagnostic()?;
        return Ok(());
    }

    let summary = app.run(request, &settings.filter, &ConsoleProgress::new())?;
    if !summary.skipped.is_empty() {
        println!(
            "{} of {} compounds skipped; see {LOG_FILE}",
            summary.skipped.len(),
            summary.compounds
        );
    }
    Ok(())
}
