//! PP3: multiple lines of computational evidence support a deleterious
//! effect.

use crate::classify::schema::{CriterionId, Evidence, Thresholds, TriggeredCriterion};

use super::{predictor_calls, Outcome};

/// Evaluate PP3 against the given `Evidence`.
///
/// Fires iff at least `predictor_quorum` predictors call damaging and no
/// predictor calls benign.  Directional disagreement suppresses the
/// criterion entirely; conflicting predictors must not average into a weak
/// positive.
pub fn evaluate(thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let calls = predictor_calls(evidence);
    if calls.total < thresholds.predictor_quorum {
        return Outcome::MissingEvidence(format!(
            "only {} of {} required in-silico predictors available",
            calls.total, thresholds.predictor_quorum
        ));
    }
    if calls.damaging >= thresholds.predictor_quorum && calls.benign == 0 {
        Outcome::Triggered(TriggeredCriterion::with_default_strength(
            CriterionId::Pp3,
            format!(
                "{}/{} in-silico predictors call damaging ({})",
                calls.damaging,
                calls.total,
                calls.damaging_names.join(", ")
            ),
        ))
    } else {
        // Either the quorum is not met or the predictors disagree
        // directionally; both suppress PP3 to no-fire.
        Outcome::NotTriggered
    }
}
