//! Data structures for the classification engine: the per-variant evidence
//! model, the criterion vocabulary, and the tunable thresholds.

pub mod criteria;
pub mod data;

pub use criteria::{CriterionId, Direction, Strength, TriggeredCriterion};
pub use data::{
    ClinicalSignificance, ClinvarAssertion, Evidence, GeneDiseaseMechanism, InSilicoScore,
    MolecularConsequence, PredictorCall, TryFromVcf, VcfVariant,
};

/// Tunable thresholds and quorums for the criterion evaluators.
///
/// Loaded from inline JSON or an `@file` on the command line; the defaults
/// are the commonly published cutoffs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Maximal population allele frequency for PM2 (rarity).
    pub pm2_max_frequency: f64,
    /// Minimal population allele frequency for BA1 (stand-alone benign).
    pub ba1_min_frequency: f64,
    /// Minimal population allele frequency for BS1.
    pub bs1_min_frequency: f64,
    /// Minimal number of benign submissions for BS2.
    pub bs2_min_submissions: u32,
    /// Minimal number of agreeing predictors for PP3/BP4.
    pub predictor_quorum: usize,
    /// CADD PHRED score at or above which the call is damaging.
    pub cadd_damaging: f64,
    /// CADD PHRED score below which the call is benign.
    pub cadd_benign: f64,
    /// PolyPhen score above which the call is damaging.
    pub polyphen_damaging: f64,
    /// PolyPhen score below which the call is benign.
    pub polyphen_benign: f64,
    /// SIFT score at or below which the call is damaging.
    pub sift_damaging: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pm2_max_frequency: 1e-4,
            ba1_min_frequency: 0.05,
            bs1_min_frequency: 0.01,
            bs2_min_submissions: 2,
            predictor_quorum: 2,
            cadd_damaging: 20.0,
            cadd_benign: 10.0,
            polyphen_damaging: 0.908,
            polyphen_benign: 0.446,
            sift_damaging: 0.05,
        }
    }
}
