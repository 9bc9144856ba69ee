//! BS1: allele frequency greater than expected for the disorder.

use crate::classify::schema::{CriterionId, Evidence, Thresholds, TriggeredCriterion};

use super::Outcome;

/// Evaluate BS1 against the given `Evidence`.
pub fn evaluate(thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let Some(af) = evidence.population_allele_frequency else {
        return Outcome::MissingEvidence("no population allele frequency available".into());
    };
    if af > thresholds.bs1_min_frequency {
        Outcome::Triggered(TriggeredCriterion::with_default_strength(
            CriterionId::Bs1,
            format!(
                "population allele frequency {} above disorder maximum {}",
                af, thresholds.bs1_min_frequency
            ),
        ))
    } else {
        Outcome::NotTriggered
    }
}
