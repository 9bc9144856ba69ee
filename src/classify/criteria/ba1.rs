//! BA1: allele frequency above the stand-alone benign cutoff.

use crate::classify::schema::{CriterionId, Evidence, Thresholds, TriggeredCriterion};

use super::Outcome;

/// Evaluate BA1 against the given `Evidence`.
///
/// Fires iff a population allele frequency is present and above the
/// common-variant threshold.  The combiner treats BA1 as an absolute
/// override, not a point contributor.
pub fn evaluate(thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let Some(af) = evidence.population_allele_frequency else {
        return Outcome::MissingEvidence("no population allele frequency available".into());
    };
    if af > thresholds.ba1_min_frequency {
        Outcome::Triggered(TriggeredCriterion::with_default_strength(
            CriterionId::Ba1,
            format!(
                "population allele frequency {} above stand-alone benign threshold {}",
                af, thresholds.ba1_min_frequency
            ),
        ))
    } else {
        Outcome::NotTriggered
    }
}
