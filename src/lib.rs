//! Annotates compound lists with ChEMBL drug, assay, mechanism and target
//! data, PubChem and SureChEMBL cross-references, KEGG pathways and protein
//! classification lineages, and writes the results as xlsx reports.

pub mod app;
pub mod chembl;
pub mod compounds;
pub mod config;
pub mod domain;
pub mod error;
pub mod hierarchy;
mod http;
pub mod kegg;
pub mod logging;
pub mod output;
pub mod pathways;
pub mod pubchem;
pub mod report;
pub mod table;
pub mod targets;
pub mod unichem;
pub mod uniprot;

pub const AUTHOR: &str = "Flavio Ballante";
pub const CONTACT: &str = "flavio.ballante@ki.se, flavioballante@gmail.com";
pub const INSTITUTION: &str = "2025, CBCS-SciLifeLab-Karolinska Institutet";
