//! PM1: located in a critical, well-established functional domain.

use crate::classify::schema::{CriterionId, Evidence, Thresholds, TriggeredCriterion};

use super::Outcome;

/// Evaluate PM1 against the given `Evidence`.
pub fn evaluate(_thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    match evidence.functional_domain_hit {
        Some(true) => {
            let gene = evidence.gene_name.as_deref().unwrap_or("gene");
            Outcome::Triggered(TriggeredCriterion::with_default_strength(
                CriterionId::Pm1,
                format!("variant falls into a critical functional domain of {}", gene),
            ))
        }
        Some(false) => Outcome::NotTriggered,
        None => Outcome::MissingEvidence("no functional domain annotation available".into()),
    }
}
