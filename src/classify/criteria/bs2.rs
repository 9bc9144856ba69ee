//! BS2: benign assertion in the clinical database with multiple supporting
//! submissions.

use crate::classify::schema::{
    ClinicalSignificance, CriterionId, Evidence, Thresholds, TriggeredCriterion,
};

use super::Outcome;

/// Evaluate BS2 against the given `Evidence`.
pub fn evaluate(thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let Some(clinvar) = evidence.clinvar else {
        return Outcome::MissingEvidence("no clinical database entry available".into());
    };
    if clinvar.significance == ClinicalSignificance::Benign
        && clinvar.submissions >= thresholds.bs2_min_submissions
    {
        Outcome::Triggered(TriggeredCriterion::with_default_strength(
            CriterionId::Bs2,
            format!(
                "benign assertion supported by {} submissions",
                clinvar.submissions
            ),
        ))
    } else {
        Outcome::NotTriggered
    }
}
