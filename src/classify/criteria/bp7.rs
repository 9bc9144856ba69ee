//! BP7: synonymous variant with no predicted splice impact.

use crate::classify::schema::{
    CriterionId, Evidence, MolecularConsequence, Thresholds, TriggeredCriterion,
};

use super::{predictor_calls, Outcome};

/// Evaluate BP7 against the given `Evidence`.
///
/// Fires iff the consequence is synonymous and no available predictor calls
/// damaging (the predictor set stands in for a dedicated splice-impact
/// score).  Without any predictor a splice effect cannot be ruled out, so
/// the evaluator abstains.
pub fn evaluate(_thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let Some(csq) = evidence.molecular_consequence else {
        return Outcome::MissingEvidence("no molecular consequence available".into());
    };
    if csq != MolecularConsequence::Synonymous {
        return Outcome::NotTriggered;
    }

    let calls = predictor_calls(evidence);
    if calls.total == 0 {
        return Outcome::MissingEvidence(
            "synonymous variant but no in-silico predictor to assess splice impact".into(),
        );
    }
    if calls.damaging == 0 {
        Outcome::Triggered(TriggeredCriterion::with_default_strength(
            CriterionId::Bp7,
            format!(
                "synonymous consequence and none of {} predictors call damaging",
                calls.total
            ),
        ))
    } else {
        Outcome::NotTriggered
    }
}
