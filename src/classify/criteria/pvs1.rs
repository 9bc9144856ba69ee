//! PVS1: null variant in a gene where loss of function is a known disease
//! mechanism.

use crate::classify::schema::{
    CriterionId, Evidence, GeneDiseaseMechanism, Thresholds, TriggeredCriterion,
};

use super::Outcome;

/// Evaluate PVS1 against the given `Evidence`.
///
/// Fires iff the molecular consequence is a null consequence (nonsense,
/// frameshift, splice) and loss of function is the established mechanism of
/// the gene.  An unknown or absent mechanism abstains; absence of mechanism
/// data must never be read as a negative signal.
pub fn evaluate(_thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let Some(csq) = evidence.molecular_consequence else {
        return Outcome::MissingEvidence("no molecular consequence available".into());
    };
    if !csq.is_null_variant() {
        return Outcome::NotTriggered;
    }

    match evidence.gene_disease_mechanism {
        Some(GeneDiseaseMechanism::LossOfFunction) => {
            let gene = evidence.gene_name.as_deref().unwrap_or("gene");
            Outcome::Triggered(TriggeredCriterion::with_default_strength(
                CriterionId::Pvs1,
                format!(
                    "{} consequence in {} with established loss-of-function mechanism",
                    csq, gene
                ),
            ))
        }
        Some(GeneDiseaseMechanism::GainOfFunction) => Outcome::NotTriggered,
        Some(GeneDiseaseMechanism::Unknown) | None => Outcome::MissingEvidence(
            "null consequence but no established gene disease mechanism".into(),
        ),
    }
}
