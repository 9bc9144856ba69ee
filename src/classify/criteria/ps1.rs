//! PS1: same amino acid change as a previously established pathogenic
//! variant at the same residue.

use crate::classify::schema::{
    ClinicalSignificance, CriterionId, Evidence, Thresholds, TriggeredCriterion,
};

use super::Outcome;

/// Evaluate PS1 against the given `Evidence`.
///
/// Fires iff the clinical database asserts the variant pathogenic and the
/// annotation layer flagged an established pathogenic variant with the
/// identical amino-acid consequence (matched via `hgvs_p`).
pub fn evaluate(_thresholds: &Thresholds, evidence: &Evidence) -> Outcome {
    let Some(clinvar) = evidence.clinvar else {
        return Outcome::MissingEvidence("no clinical database entry available".into());
    };
    if clinvar.significance != ClinicalSignificance::Pathogenic {
        return Outcome::NotTriggered;
    }

    let Some(hgvs_p) = evidence.hgvs_p.as_deref() else {
        return Outcome::MissingEvidence("no protein-level consequence to match residues".into());
    };
    match evidence.known_pathogenic_same_residue {
        Some(true) => Outcome::Triggered(TriggeredCriterion::with_default_strength(
            CriterionId::Ps1,
            format!(
                "pathogenic assertion with identical amino acid change {} as established variant",
                hgvs_p
            ),
        )),
        Some(false) => Outcome::NotTriggered,
        None => Outcome::MissingEvidence("no same-residue comparison available".into()),
    }
}
