//! Implementation of the `classify` subcommand: ACMG classification of the
//! variants of an annotated VCF file.

pub mod combine;
pub mod criteria;
pub mod output;
pub mod schema;

use std::time::Instant;

use itertools::Itertools;
use rayon::prelude::*;
use thousands::Separable;

use crate::annotate::vcf::EvidenceExtractor;
use crate::annotate::GeneMechanismMap;
use crate::common::io::{open_read_maybe_gz, open_write_maybe_gz};
use crate::common::trace_rss_now;

use noodles_vcf as vcf;

use combine::{combine, Classification};
use criteria::EvidenceAggregator;
use output::{ClassificationResult, ErrorRecord, ReportedCriterion};
use schema::{Evidence, Thresholds};

/// The classification engine: aggregates criteria and applies the combining
/// table.
///
/// `classify` is deterministic, side-effect-free, and never performs I/O,
/// so instances can be shared across worker threads.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    /// The evaluator registry with its thresholds.
    aggregator: EvidenceAggregator,
}

impl Classifier {
    /// Construct a new classifier with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            aggregator: EvidenceAggregator::new(thresholds),
        }
    }

    /// Classify one variant given its `Evidence`.
    ///
    /// # Errors
    ///
    /// Returns an error if the evidence fails domain validation; the error
    /// is fatal to this variant only.
    pub fn classify(
        &self,
        evidence: &Evidence,
    ) -> Result<ClassificationResult, schema::data::evidence::Error> {
        evidence.validate()?;

        let aggregated = self.aggregator.evaluate(evidence);
        let verdict = combine(&aggregated);

        let criteria = aggregated
            .triggered
            .values()
            .map(|triggered| {
                ReportedCriterion::new(
                    triggered.criterion,
                    triggered.strength,
                    triggered.criterion.direction(),
                    triggered.rationale.clone(),
                    verdict.decisive.contains(&triggered.criterion),
                )
            })
            .collect::<Vec<_>>();

        let mut warnings = aggregated.warnings;
        if verdict.conflicting {
            warnings.push(
                "conflicting evidence: pathogenic and benign criteria of comparable strength"
                    .into(),
            );
        }

        Ok(ClassificationResult::new(
            evidence.variant.clone(),
            verdict.classification,
            criteria,
            warnings,
        ))
    }
}

/// Command line arguments for the `classify` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "classify variants of an annotated VCF", long_about = None)]
pub struct Args {
    /// Path to input VCF file (plain or gzipped).
    #[clap(long)]
    pub path_in: String,
    /// Path to the JSON report output file.
    #[clap(long)]
    pub path_out: String,
    /// Threshold parameters as inline JSON or @ with path to a JSON file.
    #[clap(long)]
    pub params: Option<String>,
    /// Path to a gene-to-mechanism TSV file; built-in defaults otherwise.
    #[clap(long)]
    pub path_gene_mechanisms: Option<String>,
    /// Optional maximal number of variants to process.
    #[clap(long)]
    pub max_var_count: Option<usize>,
    /// Optional number of worker threads for classification.
    #[clap(long)]
    pub num_threads: Option<usize>,
}

/// Load thresholds from inline JSON or a `@file` argument.
fn load_thresholds(params: Option<&str>) -> Result<Thresholds, anyhow::Error> {
    match params {
        None => Ok(Thresholds::default()),
        Some(param) if param.starts_with('@') => {
            let path = param.trim_start_matches('@');
            let file = std::fs::File::open(path)
                .map_err(|e| anyhow::anyhow!("failed to open params file {}: {}", path, e))?;
            serde_json::from_reader(std::io::BufReader::new(file))
                .map_err(|e| anyhow::anyhow!("failed to parse params file {}: {}", path, e))
        }
        Some(param) => serde_json::from_str(param)
            .map_err(|e| anyhow::anyhow!("failed to parse params: {}", e)),
    }
}

/// The full report written to the output file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Report {
    /// Report metadata.
    pub metadata: ReportMetadata,
    /// Number of variants per classification label.
    pub summary: indexmap::IndexMap<String, usize>,
    /// Per-variant classification records.
    pub results: Vec<ClassificationResult>,
    /// Per-variant error records.
    pub errors: Vec<ErrorRecord>,
}

/// Metadata block of the report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportMetadata {
    /// Timestamp of report creation.
    pub created_at: String,
    /// Version of this tool.
    pub version: String,
    /// Total number of variants read.
    pub total_variants: usize,
    /// The thresholds used for classification.
    pub thresholds: Thresholds,
}

/// Read all `Evidence` instances from the input VCF.
///
/// This is the producer side of the pipeline; classification itself never
/// touches the reader.
fn read_evidence(
    extractor: &EvidenceExtractor,
    args: &Args,
) -> Result<Vec<Evidence>, anyhow::Error> {
    let reader = open_read_maybe_gz(&args.path_in)
        .map_err(|e| anyhow::anyhow!("could not open input file: {}", e))?;
    let mut reader = vcf::io::Reader::new(reader);
    let header = reader
        .read_header()
        .map_err(|e| anyhow::anyhow!("problem reading header: {}", e))?;

    let mut result = Vec::new();
    let mut prev = Instant::now();
    for record in reader.record_bufs(&header) {
        let record = record?;
        match extractor.extract(&record, &header) {
            Ok(evidence) => {
                if prev.elapsed().as_secs() >= 60 {
                    tracing::info!("at {}", &evidence.variant);
                    prev = Instant::now();
                }
                result.push(evidence);
            }
            Err(e) => {
                tracing::warn!("skipping malformed record: {}", e);
            }
        }
        if let Some(max_var_count) = args.max_var_count {
            if result.len() >= max_var_count {
                tracing::info!("stopping after {} variants", max_var_count);
                break;
            }
        }
    }

    Ok(result)
}

/// Build the per-label summary in canonical label order.
fn build_summary(results: &[ClassificationResult]) -> indexmap::IndexMap<String, usize> {
    let counts = results
        .iter()
        .map(|result| result.classification)
        .fold(std::collections::HashMap::new(), |mut acc, label| {
            *acc.entry(label).or_insert(0usize) += 1;
            acc
        });
    [
        Classification::Pathogenic,
        Classification::LikelyPathogenic,
        Classification::UncertainSignificance,
        Classification::LikelyBenign,
        Classification::Benign,
    ]
    .into_iter()
    .map(|label| (label.to_string(), counts.get(&label).copied().unwrap_or(0)))
    .collect()
}

/// Print the classification summary to the terminal.
fn print_summary(summary: &indexmap::IndexMap<String, usize>) -> Result<(), anyhow::Error> {
    let term = console::Term::stderr();
    term.write_line("Classification summary:")?;
    for (label, count) in summary {
        term.write_line(&format!(
            "  {:<24} {:>8}",
            console::style(label).cyan().to_string(),
            console::style(count.separate_with_commas()).green().to_string()
        ))?;
    }
    Ok(())
}

/// Main entry point for the `classify` subcommand.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    if let Some(num_threads) = args.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| anyhow::anyhow!("building global Rayon thread pool failed: {}", e))?;
    }

    tracing::info!("loading thresholds...");
    let thresholds = load_thresholds(args.params.as_deref())?;
    let mechanisms = if let Some(path) = &args.path_gene_mechanisms {
        GeneMechanismMap::from_tsv(path)?
    } else {
        GeneMechanismMap::default()
    };

    tracing::info!("reading evidence from input file...");
    let before_reading = Instant::now();
    let extractor = EvidenceExtractor::new(thresholds.clone(), mechanisms);
    let evidence = read_evidence(&extractor, args)?;
    tracing::info!(
        "... read {} variants in {:?}",
        evidence.len().separate_with_commas(),
        before_reading.elapsed()
    );

    trace_rss_now();

    tracing::info!("classifying variants...");
    let before_classify = Instant::now();
    let classifier = Classifier::new(thresholds.clone());
    let (results, errors): (Vec<_>, Vec<_>) = evidence
        .par_iter()
        .map(|evidence| {
            classifier
                .classify(evidence)
                .map_err(|e| ErrorRecord::new(evidence.variant.clone(), e.to_string()))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .partition_result();
    tracing::info!(
        "... classified {} variants ({} errors) in {:?}",
        results.len().separate_with_commas(),
        errors.len().separate_with_commas(),
        before_classify.elapsed()
    );

    let summary = build_summary(&results);
    let report = Report {
        metadata: ReportMetadata {
            created_at: chrono::Utc::now().to_rfc3339(),
            version: crate::common::version().to_string(),
            total_variants: results.len() + errors.len(),
            thresholds,
        },
        summary,
        results,
        errors,
    };

    tracing::info!("writing report to {}...", &args.path_out);
    let writer = open_write_maybe_gz(&args.path_out)
        .map_err(|e| anyhow::anyhow!("could not open output file {}: {}", &args.path_out, e))?;
    serde_json::to_writer_pretty(writer, &report)
        .map_err(|e| anyhow::anyhow!("could not write report: {}", e))?;

    print_summary(&report.summary)?;

    trace_rss_now();

    tracing::info!(
        "All of `classify` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::classify::combine::Classification;
    use crate::classify::schema::{
        ClinicalSignificance, ClinvarAssertion, Evidence, GeneDiseaseMechanism, InSilicoScore,
        MolecularConsequence, PredictorCall, VcfVariant,
    };

    use super::Classifier;

    fn tp53_nonsense_evidence() -> Evidence {
        let mut evidence = Evidence {
            variant: VcfVariant::new("17".into(), 7_578_406, "C".into(), "T".into(), None),
            gene_name: Some("TP53".into()),
            molecular_consequence: Some(MolecularConsequence::Nonsense),
            gene_disease_mechanism: Some(GeneDiseaseMechanism::LossOfFunction),
            population_allele_frequency: Some(1e-5),
            ..Default::default()
        };
        evidence.in_silico_scores.insert(
            "CADD".into(),
            InSilicoScore::new(35.0, PredictorCall::Damaging),
        );
        evidence.in_silico_scores.insert(
            "SIFT".into(),
            InSilicoScore::new(0.0, PredictorCall::Damaging),
        );
        evidence
    }

    #[test]
    fn tp53_nonsense_with_predictors_is_pathogenic() -> Result<(), anyhow::Error> {
        let classifier = Classifier::default();

        let result = classifier.classify(&tp53_nonsense_evidence())?;

        // PVS1 + PM2 + PP3 satisfy the very-strong row of the table.
        assert_eq!(result.classification, Classification::Pathogenic);
        let fired = result
            .criteria
            .iter()
            .map(|c| c.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(fired, vec!["PVS1", "PM2", "PP3"]);
        assert!(result.criteria.iter().all(|c| c.decisive));

        Ok(())
    }

    #[test]
    fn tp53_nonsense_without_predictors_is_likely_pathogenic() -> Result<(), anyhow::Error> {
        let classifier = Classifier::default();
        let mut evidence = tp53_nonsense_evidence();
        evidence.in_silico_scores.clear();

        let result = classifier.classify(&evidence)?;

        // PVS1 + PM2 alone only reach the likely-pathogenic tier.
        assert_eq!(result.classification, Classification::LikelyPathogenic);

        Ok(())
    }

    #[test]
    fn common_missense_is_benign_with_gap_warnings() -> Result<(), anyhow::Error> {
        let classifier = Classifier::default();
        let evidence = Evidence {
            variant: VcfVariant::new("1".into(), 100, "A".into(), "G".into(), None),
            molecular_consequence: Some(MolecularConsequence::Missense),
            population_allele_frequency: Some(0.2),
            ..Default::default()
        };

        let result = classifier.classify(&evidence)?;

        assert_eq!(result.classification, Classification::Benign);
        assert!(result.criteria.iter().any(|c| c.name.to_string() == "BA1"));
        // The abstaining evaluators each left an evidence-gap warning.
        assert!(!result.warnings.is_empty());

        Ok(())
    }

    #[test]
    fn rare_missense_with_predictors_stays_uncertain() -> Result<(), anyhow::Error> {
        let classifier = Classifier::default();
        let mut evidence = Evidence {
            variant: VcfVariant::new("2".into(), 200, "C".into(), "A".into(), None),
            molecular_consequence: Some(MolecularConsequence::Missense),
            population_allele_frequency: Some(0.00005),
            ..Default::default()
        };
        evidence.in_silico_scores.insert(
            "CADD".into(),
            InSilicoScore::new(28.0, PredictorCall::Damaging),
        );
        evidence.in_silico_scores.insert(
            "PolyPhen".into(),
            InSilicoScore::new(0.99, PredictorCall::Damaging),
        );

        let result = classifier.classify(&evidence)?;

        // PM2 + PP3 is one moderate plus one supporting, below the
        // likely-pathogenic rows of the table.
        assert_eq!(
            result.classification,
            Classification::UncertainSignificance
        );
        let fired = result
            .criteria
            .iter()
            .map(|c| c.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(fired, vec!["PM2", "PP3"]);

        Ok(())
    }

    #[test]
    fn all_absent_evidence_is_uncertain_with_all_gaps() -> Result<(), anyhow::Error> {
        let classifier = Classifier::default();

        let result = classifier.classify(&Evidence::default())?;

        assert_eq!(
            result.classification,
            Classification::UncertainSignificance
        );
        assert!(result.criteria.is_empty());
        assert_eq!(result.warnings.len(), 10);

        Ok(())
    }

    #[test]
    fn classification_is_deterministic() -> Result<(), anyhow::Error> {
        let classifier = Classifier::default();
        let evidence = tp53_nonsense_evidence();

        let first = classifier.classify(&evidence)?;
        let second = classifier.classify(&evidence)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn invalid_frequency_fails_the_single_variant() {
        let classifier = Classifier::default();
        let evidence = Evidence {
            population_allele_frequency: Some(1.5),
            ..Default::default()
        };

        assert!(classifier.classify(&evidence).is_err());
    }

    #[test]
    fn benign_criterion_below_a_row_does_not_block_the_pathogenic_side() -> Result<(), anyhow::Error>
    {
        let classifier = Classifier::default();
        // PS1 and PM2 fire on the pathogenic side; three benign predictor
        // calls fire BP4, which alone does not reach a benign row.
        let mut evidence = Evidence {
            variant: VcfVariant::new("3".into(), 300, "G".into(), "T".into(), None),
            hgvs_p: Some("p.Arg175His".into()),
            clinvar: Some(ClinvarAssertion::new(ClinicalSignificance::Pathogenic, 3)),
            known_pathogenic_same_residue: Some(true),
            population_allele_frequency: Some(0.00001),
            molecular_consequence: Some(MolecularConsequence::Missense),
            ..Default::default()
        };
        evidence.in_silico_scores.insert(
            "PolyPhen".into(),
            InSilicoScore::new(0.01, PredictorCall::Benign),
        );
        evidence.in_silico_scores.insert(
            "SIFT".into(),
            InSilicoScore::new(0.9, PredictorCall::Benign),
        );
        evidence.in_silico_scores.insert(
            "CADD".into(),
            InSilicoScore::new(3.0, PredictorCall::Benign),
        );

        let result = classifier.classify(&evidence)?;

        // PS1 + PM2 reach likely pathogenic, BP4 alone does not reach a
        // benign row, so the pathogenic side wins here.
        assert_eq!(result.classification, Classification::LikelyPathogenic);
        assert!(result
            .criteria
            .iter()
            .any(|c| c.name.to_string() == "BP4" && !c.decisive));

        Ok(())
    }

    #[test]
    fn load_thresholds_inline_and_default() -> Result<(), anyhow::Error> {
        let thresholds = super::load_thresholds(None)?;
        assert_eq!(thresholds, crate::classify::schema::Thresholds::default());

        let thresholds = super::load_thresholds(Some(r#"{"ba1_min_frequency": 0.1}"#))?;
        assert_eq!(thresholds.ba1_min_frequency, 0.1);

        Ok(())
    }

    #[test]
    fn load_thresholds_from_file() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("params.json");
        std::fs::write(&path, r#"{"pm2_max_frequency": 1e-6}"#)?;

        let thresholds =
            super::load_thresholds(Some(&format!("@{}", path.to_str().unwrap())))?;

        assert_eq!(thresholds.pm2_max_frequency, 1e-6);

        Ok(())
    }

    /// Header of the annotated VCF used by the subcommand tests.
    const TEST_VCF_HEADER: &str = "\
##fileformat=VCFv4.3
##contig=<ID=1>
##contig=<ID=17>
##INFO=<ID=Gene_Name,Number=1,Type=String,Description=\"Gene symbol\">
##INFO=<ID=Feature,Number=1,Type=String,Description=\"Transcript identifier\">
##INFO=<ID=HGVSc,Number=1,Type=String,Description=\"cDNA-level HGVS\">
##INFO=<ID=HGVSp,Number=1,Type=String,Description=\"Protein-level HGVS\">
##INFO=<ID=Consequence,Number=1,Type=String,Description=\"Molecular consequence\">
##INFO=<ID=gnomad_af,Number=1,Type=Float,Description=\"gnomAD allele frequency\">
##INFO=<ID=CLNSIG,Number=1,Type=String,Description=\"ClinVar significance\">
##INFO=<ID=CLNSUB,Number=1,Type=Integer,Description=\"ClinVar submission count\">
##INFO=<ID=CADD_PHRED,Number=1,Type=Float,Description=\"CADD PHRED score\">
##INFO=<ID=PolyPhen,Number=1,Type=String,Description=\"PolyPhen call and score\">
##INFO=<ID=SIFT,Number=1,Type=String,Description=\"SIFT call and score\">
##INFO=<ID=functional_domain_hit,Number=1,Type=Integer,Description=\"Variant in critical functional domain (0/1)\">
##INFO=<ID=same_residue_pathogenic,Number=1,Type=Integer,Description=\"Known pathogenic variant at same residue (0/1)\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
";

    #[test]
    fn run_classify_smoke() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_in = tmp_dir.join("in.vcf");
        let path_out = tmp_dir.join("report.json");
        {
            use std::io::Write;
            let mut f = std::fs::File::create(&path_in)?;
            f.write_all(TEST_VCF_HEADER.as_bytes())?;
            // TP53 nonsense, rare, predictors damaging.
            writeln!(
                f,
                "17\t7578406\trs28934578\tC\tT\t.\t.\t{}",
                "Gene_Name=TP53;Consequence=stop_gained;gnomad_af=0.00001;\
                 CADD_PHRED=35;SIFT=deleterious(0.01)"
            )?;
            // Common missense without further annotation.
            writeln!(
                f,
                "1\t100\t.\tA\tG\t.\t.\t{}",
                "Consequence=missense_variant;gnomad_af=0.2"
            )?;
            // Nothing known at all.
            writeln!(f, "1\t200\t.\tG\tC\t.\t.\t.")?;
        }

        let args = super::Args {
            path_in: path_in.to_str().unwrap().to_string(),
            path_out: path_out.to_str().unwrap().to_string(),
            params: None,
            path_gene_mechanisms: None,
            max_var_count: None,
            num_threads: None,
        };
        super::run(&crate::common::Args::default(), &args)?;

        let report: super::Report =
            serde_json::from_reader(std::fs::File::open(&path_out)?)?;
        assert_eq!(report.metadata.total_variants, 3);
        assert_eq!(report.metadata.version, "x.y.z");
        assert!(report.errors.is_empty());

        let classifications = report
            .results
            .iter()
            .map(|r| (format!("{}", r.variant), r.classification.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(
            classifications,
            vec![
                ("17:7578406:C>T".to_string(), "Pathogenic".to_string()),
                ("1:100:A>G".to_string(), "Benign".to_string()),
                (
                    "1:200:G>C".to_string(),
                    "Uncertain Significance".to_string()
                ),
            ]
        );
        assert_eq!(report.summary.get("Pathogenic"), Some(&1));
        assert_eq!(report.summary.get("Benign"), Some(&1));
        assert_eq!(report.summary.get("Uncertain Significance"), Some(&1));
        assert_eq!(report.summary.get("Likely Pathogenic"), Some(&0));

        // The variant without any annotation carries one gap warning per
        // evaluator.
        assert_eq!(report.results[2].warnings.len(), 10);

        Ok(())
    }

    #[test]
    fn run_classify_respects_max_var_count() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_in = tmp_dir.join("in.vcf");
        let path_out = tmp_dir.join("report.json");
        {
            use std::io::Write;
            let mut f = std::fs::File::create(&path_in)?;
            f.write_all(TEST_VCF_HEADER.as_bytes())?;
            writeln!(f, "1\t100\t.\tA\tG\t.\t.\tgnomad_af=0.2")?;
            writeln!(f, "1\t200\t.\tG\tC\t.\t.\tgnomad_af=0.2")?;
        }

        let args = super::Args {
            path_in: path_in.to_str().unwrap().to_string(),
            path_out: path_out.to_str().unwrap().to_string(),
            params: None,
            path_gene_mechanisms: None,
            max_var_count: Some(1),
            num_threads: None,
        };
        super::run(&crate::common::Args::default(), &args)?;

        let report: super::Report =
            serde_json::from_reader(std::fs::File::open(&path_out)?)?;
        assert_eq!(report.metadata.total_variants, 1);
        assert_eq!(report.summary.get("Benign"), Some(&1));

        Ok(())
    }
}
