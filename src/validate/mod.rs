//! Implementation of the `validate` subcommand: structural check of a VCF
//! file before classification.

use noodles_vcf as vcf;
use thousands::Separable;

use crate::common::{build_chrom_map, io::open_read_maybe_gz};

/// Command line arguments for the `validate` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "validate a VCF file", long_about = None)]
pub struct Args {
    /// Path to input VCF file (plain or gzipped).
    #[clap(long)]
    pub path_in: String,
}

/// Outcome of validating one VCF file.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    /// Number of well-formed variant records.
    pub variant_count: usize,
    /// Number of samples in the file.
    pub sample_count: usize,
    /// Descriptions of malformed records.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Whether the file passed validation.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate the given VCF file.
pub fn validate_file(path_in: &str) -> Result<ValidationResult, anyhow::Error> {
    let reader = open_read_maybe_gz(path_in)
        .map_err(|e| anyhow::anyhow!("could not open input file: {}", e))?;
    let mut reader = vcf::io::Reader::new(reader);
    let header = reader
        .read_header()
        .map_err(|e| anyhow::anyhow!("problem reading header: {}", e))?;

    let chrom_map = build_chrom_map();
    let mut result = ValidationResult {
        sample_count: header.sample_names().len(),
        ..Default::default()
    };
    for (i, record) in reader.record_bufs(&header).enumerate() {
        match record {
            Ok(record) => {
                let chrom = record.reference_sequence_name();
                if !chrom_map.contains_key(chrom) {
                    tracing::debug!("non-canonical contig {:?} in record {}", chrom, i + 1);
                }
                result.variant_count += 1;
            }
            Err(e) => {
                result.errors.push(format!("record {}: {}", i + 1, e));
            }
        }
    }

    Ok(result)
}

/// Main entry point for the `validate` subcommand.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    let result = validate_file(&args.path_in)?;

    tracing::info!(
        "found {} variants across {} samples",
        result.variant_count.separate_with_commas(),
        result.sample_count
    );
    for error in &result.errors {
        tracing::warn!("{}", error);
    }

    tracing::info!(
        "All of `validate` completed in {:?}",
        before_anything.elapsed()
    );

    if result.is_valid() {
        Ok(())
    } else {
        anyhow::bail!("VCF file has {} malformed records", result.errors.len())
    }
}
