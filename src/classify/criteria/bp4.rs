//! BP4: multiple lines of computational evidence suggest no impact.

use crate::classify::schema::{CriterionId, Evidence, Thresholds, TriggeredCriterion};

use super::{predictor_calls, Outcome};

/// Evaluate BP4 against the given `Evidence`.
///
/// Mirror image of PP3: fires iff at least `predictor_quorum` predictors
/// call benign and no predictor calls damaging; directional disagreement
/// suppresses the criterion.
pub fn evaluate(thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let calls = predictor_calls(evidence);
    if calls.total < thresholds.predictor_quorum {
        return Outcome::MissingEvidence(format!(
            "only {} of {} required in-silico predictors available",
            calls.total, thresholds.predictor_quorum
        ));
    }
    if calls.benign >= thresholds.predictor_quorum && calls.damaging == 0 {
        Outcome::Triggered(TriggeredCriterion::with_default_strength(
            CriterionId::Bp4,
            format!(
                "{}/{} in-silico predictors call benign ({})",
                calls.benign,
                calls.total,
                calls.benign_names.join(", ")
            ),
        ))
    } else {
        Outcome::NotTriggered
    }
}
