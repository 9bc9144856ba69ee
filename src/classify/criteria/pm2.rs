//! PM2: absent from or extremely rare in population databases.

use crate::classify::schema::{CriterionId, Evidence, Thresholds, TriggeredCriterion};

use super::Outcome;

/// Evaluate PM2 against the given `Evidence`.
///
/// Fires iff a population allele frequency is present and below the rarity
/// threshold.  An absent frequency abstains: unknown is not rare.
pub fn evaluate(thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let Some(af) = evidence.population_allele_frequency else {
        return Outcome::MissingEvidence(
            "no population allele frequency available (unknown is not rare)".into(),
        );
    };
    if af < thresholds.pm2_max_frequency {
        Outcome::Triggered(TriggeredCriterion::with_default_strength(
            CriterionId::Pm2,
            format!(
                "population allele frequency {:e} below rarity threshold {:e}",
                af, thresholds.pm2_max_frequency
            ),
        ))
    } else {
        Outcome::NotTriggered
    }
}
