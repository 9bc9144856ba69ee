//! Extraction of `Evidence` from the INFO fields of an annotated VCF.
//!
//! The input is expected to carry VEP/ANN-style annotations:
//!
//! - `Gene_Name`/`Gene`, `Transcript_ID`/`Feature`, `HGVSc`, `HGVSp`
//! - `Consequence` (falling back to `IMPACT`)
//! - `gnomad_af` population allele frequency
//! - `CLNSIG` clinical significance and `CLNSUB` submission count
//! - `CADD_PHRED` (falling back to `CADD_RAW`), `PolyPhen`, `SIFT`
//! - `functional_domain_hit` and `same_residue_pathogenic` as 0/1 values
//!
//! Absent keys stay absent in the `Evidence`; no key is ever defaulted to a
//! sentinel value.

use noodles_vcf as vcf;

use vcf::variant::record_buf::info::field::Value;

use crate::classify::schema::{
    ClinicalSignificance, ClinvarAssertion, Evidence, InSilicoScore, PredictorCall, Thresholds,
    TryFromVcf, VcfVariant,
};

use super::GeneMechanismMap;

/// Supporting code for `EvidenceExtractor`.
pub mod evidence_extractor {
    /// Error type for `EvidenceExtractor::extract()`.
    #[derive(thiserror::Error, Debug, Clone)]
    pub enum Error {
        #[error("problem with variant columns: {0}")]
        Variant(#[from] crate::classify::schema::data::vcf_variant::Error),
    }
}

/// Builds `Evidence` instances from annotated VCF records.
#[derive(Debug, Clone, Default)]
pub struct EvidenceExtractor {
    /// Score cutoffs used to derive qualitative predictor calls.
    thresholds: Thresholds,
    /// Gene to disease mechanism resolution.
    mechanisms: GeneMechanismMap,
}

impl EvidenceExtractor {
    /// Construct a new extractor.
    pub fn new(thresholds: Thresholds, mechanisms: GeneMechanismMap) -> Self {
        Self {
            thresholds,
            mechanisms,
        }
    }

    /// Extract the `Evidence` of one VCF record.
    pub fn extract(
        &self,
        record: &vcf::variant::RecordBuf,
        header: &vcf::Header,
    ) -> Result<Evidence, evidence_extractor::Error> {
        let variant = VcfVariant::try_from_vcf(record, header)?;

        let gene_name = info_string(record, &["Gene_Name", "Gene"]);
        let transcript_id = info_string(record, &["Transcript_ID", "Feature"]);
        let hgvs_c = info_string(record, &["HGVSc"]);
        let hgvs_p = info_string(record, &["HGVSp"]);

        let molecular_consequence = info_string(record, &["Consequence", "IMPACT"])
            .map(|term| crate::classify::schema::MolecularConsequence::from_csq_term(&term));

        let population_allele_frequency = info_f64(record, &["gnomad_af"]);

        let clinvar = info_string(record, &["CLNSIG"])
            .and_then(|raw| parse_clinical_significance(&raw))
            .map(|significance| ClinvarAssertion {
                significance,
                submissions: info_f64(record, &["CLNSUB"]).map(|n| n as u32).unwrap_or(1),
            });

        let mut in_silico_scores = indexmap::IndexMap::new();
        if let Some(score) = info_f64(record, &["CADD_PHRED", "CADD_RAW"]) {
            in_silico_scores.insert(
                "CADD".to_string(),
                InSilicoScore::new(score, self.cadd_call(score)),
            );
        }
        if let Some((score, label)) = info_predictor(record, "PolyPhen") {
            in_silico_scores.insert(
                "PolyPhen".to_string(),
                InSilicoScore::new(score, self.polyphen_call(score, label.as_deref())),
            );
        }
        if let Some((score, label)) = info_predictor(record, "SIFT") {
            in_silico_scores.insert(
                "SIFT".to_string(),
                InSilicoScore::new(score, self.sift_call(score, label.as_deref())),
            );
        }

        let gene_disease_mechanism = gene_name
            .as_deref()
            .map(|gene| self.mechanisms.lookup(gene));
        let functional_domain_hit = info_bool(record, "functional_domain_hit");
        let known_pathogenic_same_residue = info_bool(record, "same_residue_pathogenic");

        Ok(Evidence {
            variant,
            gene_name,
            transcript_id,
            hgvs_c,
            hgvs_p,
            molecular_consequence,
            population_allele_frequency,
            clinvar,
            in_silico_scores,
            gene_disease_mechanism,
            functional_domain_hit,
            known_pathogenic_same_residue,
        })
    }

    /// Qualitative call for a CADD PHRED score.
    fn cadd_call(&self, score: f64) -> PredictorCall {
        if score >= self.thresholds.cadd_damaging {
            PredictorCall::Damaging
        } else if score < self.thresholds.cadd_benign {
            PredictorCall::Benign
        } else {
            PredictorCall::Uncertain
        }
    }

    /// Qualitative call for PolyPhen, preferring the annotated label.
    fn polyphen_call(&self, score: f64, label: Option<&str>) -> PredictorCall {
        match label {
            Some(label) if label.starts_with("probably_damaging") => PredictorCall::Damaging,
            Some(label) if label.starts_with("benign") => PredictorCall::Benign,
            Some(_) => PredictorCall::Uncertain,
            None => {
                if score > self.thresholds.polyphen_damaging {
                    PredictorCall::Damaging
                } else if score < self.thresholds.polyphen_benign {
                    PredictorCall::Benign
                } else {
                    PredictorCall::Uncertain
                }
            }
        }
    }

    /// Qualitative call for SIFT, preferring the annotated label.
    fn sift_call(&self, score: f64, label: Option<&str>) -> PredictorCall {
        match label {
            Some("deleterious") => PredictorCall::Damaging,
            Some("tolerated") => PredictorCall::Benign,
            // low-confidence labels are uninformative
            Some(_) => PredictorCall::Uncertain,
            None => {
                if score <= self.thresholds.sift_damaging {
                    PredictorCall::Damaging
                } else {
                    PredictorCall::Benign
                }
            }
        }
    }
}

/// First present INFO value of the given keys, as a string.
fn info_string(record: &vcf::variant::RecordBuf, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        if let Some(Some(Value::String(value))) = record.info().get(*key) {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// First present INFO value of the given keys, as a float.
fn info_f64(record: &vcf::variant::RecordBuf, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match record.info().get(*key) {
        Some(Some(Value::Float(value))) => Some(*value as f64),
        Some(Some(Value::Integer(value))) => Some(*value as f64),
        Some(Some(Value::String(value))) => value.parse::<f64>().ok(),
        _ => None,
    })
}

/// Tri-state INFO value: absent key means unknown, `0` means false.
fn info_bool(record: &vcf::variant::RecordBuf, key: &str) -> Option<bool> {
    match record.info().get(key) {
        Some(Some(Value::Integer(value))) => Some(*value != 0),
        Some(Some(Value::String(value))) => Some(value != "0"),
        Some(Some(Value::Flag)) | Some(None) => Some(true),
        _ => None,
    }
}

/// Predictor INFO value as `(score, label)`.
///
/// Accepts a bare number, `label(score)` (VEP), or `label:score`.
fn info_predictor(record: &vcf::variant::RecordBuf, key: &str) -> Option<(f64, Option<String>)> {
    match record.info().get(key) {
        Some(Some(Value::Float(value))) => Some((*value as f64, None)),
        Some(Some(Value::String(value))) => parse_predictor_string(value),
        _ => None,
    }
}

/// Parse a predictor string of the form `label(score)`, `label:score`, or a
/// bare number.
fn parse_predictor_string(raw: &str) -> Option<(f64, Option<String>)> {
    if let Ok(score) = raw.parse::<f64>() {
        return Some((score, None));
    }
    if let Some((label, rest)) = raw.split_once('(') {
        let score = rest.trim_end_matches(')').parse::<f64>().ok()?;
        return Some((score, Some(label.to_string())));
    }
    if let Some((label, rest)) = raw.split_once(':') {
        let score = rest.parse::<f64>().ok()?;
        return Some((score, Some(label.to_string())));
    }
    None
}

/// Map a ClinVar `CLNSIG` value to the internal enum.
fn parse_clinical_significance(raw: &str) -> Option<ClinicalSignificance> {
    let raw = raw.to_ascii_lowercase();
    if raw.starts_with("conflicting") {
        Some(ClinicalSignificance::Conflicting)
    } else if raw.starts_with("likely_pathogenic") {
        Some(ClinicalSignificance::LikelyPathogenic)
    } else if raw.starts_with("pathogenic") {
        Some(ClinicalSignificance::Pathogenic)
    } else if raw.starts_with("likely_benign") {
        Some(ClinicalSignificance::LikelyBenign)
    } else if raw.starts_with("benign") {
        Some(ClinicalSignificance::Benign)
    } else if raw.starts_with("uncertain_significance") {
        Some(ClinicalSignificance::Vus)
    } else {
        tracing::trace!("unrecognized CLNSIG value {:?}", raw);
        None
    }
}
