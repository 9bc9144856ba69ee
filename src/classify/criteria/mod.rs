//! Criterion evaluators and the evidence aggregator running them.
//!
//! Each criterion lives in its own module as a pure function from
//! `Evidence` to an `Outcome`; evaluators never consult each other's
//! output, so evaluation is deterministic and order-independent.

mod ba1;
mod bp4;
mod bp7;
mod bs1;
mod bs2;
mod pm1;
mod pm2;
mod pp3;
mod ps1;
mod pvs1;

use strum::IntoEnumIterator;

use super::schema::{
    CriterionId, Direction, Evidence, PredictorCall, Strength, Thresholds, TriggeredCriterion,
};

/// Outcome of evaluating one criterion against one `Evidence`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The criterion fired.
    Triggered(TriggeredCriterion),
    /// Evidence was present but the rule is not met.
    NotTriggered,
    /// The evaluator abstained because required evidence is missing; the
    /// string describes the gap.
    MissingEvidence(String),
}

/// Counts of qualitative predictor calls over the evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictorCallCounts {
    /// Number of predictors calling damaging.
    pub damaging: usize,
    /// Number of predictors calling benign.
    pub benign: usize,
    /// Number of predictors present at all.
    pub total: usize,
    /// Names of the predictors calling damaging.
    pub damaging_names: Vec<String>,
    /// Names of the predictors calling benign.
    pub benign_names: Vec<String>,
}

/// Tally the qualitative in-silico calls of the given `Evidence`.
pub(crate) fn predictor_calls(evidence: &Evidence) -> PredictorCallCounts {
    let mut counts = PredictorCallCounts::default();
    for (name, in_silico) in &evidence.in_silico_scores {
        counts.total += 1;
        match in_silico.call {
            PredictorCall::Damaging => {
                counts.damaging += 1;
                counts.damaging_names.push(name.clone());
            }
            PredictorCall::Benign => {
                counts.benign += 1;
                counts.benign_names.push(name.clone());
            }
            PredictorCall::Uncertain => (),
        }
    }
    counts
}

/// Result of running the full evaluator registry against one `Evidence`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregated {
    /// The criteria that fired, keyed by criterion identifier.
    pub triggered: indexmap::IndexMap<CriterionId, TriggeredCriterion>,
    /// One warning per evaluator that abstained for missing evidence, plus
    /// mutual-exclusivity conflicts.
    pub warnings: Vec<String>,
}

/// Runs the fixed evaluator registry against `Evidence` instances.
///
/// The registry is a closed set: the `match` in `evaluate_one` is
/// exhaustive over `CriterionId`, so every criterion has exactly one
/// evaluator by construction.
#[derive(Debug, Clone, Default)]
pub struct EvidenceAggregator {
    /// Evaluator thresholds and quorums.
    thresholds: Thresholds,
}

impl EvidenceAggregator {
    /// Construct a new aggregator with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Run the evaluator of a single criterion.
    pub fn evaluate_one(&self, criterion: CriterionId, evidence: &Evidence) -> Outcome {
        match criterion {
            CriterionId::Pvs1 => pvs1::evaluate(&self.thresholds, evidence),
            CriterionId::Ps1 => ps1::evaluate(&self.thresholds, evidence),
            CriterionId::Pm1 => pm1::evaluate(&self.thresholds, evidence),
            CriterionId::Pm2 => pm2::evaluate(&self.thresholds, evidence),
            CriterionId::Pp3 => pp3::evaluate(&self.thresholds, evidence),
            CriterionId::Ba1 => ba1::evaluate(&self.thresholds, evidence),
            CriterionId::Bs1 => bs1::evaluate(&self.thresholds, evidence),
            CriterionId::Bs2 => bs2::evaluate(&self.thresholds, evidence),
            CriterionId::Bp4 => bp4::evaluate(&self.thresholds, evidence),
            CriterionId::Bp7 => bp7::evaluate(&self.thresholds, evidence),
        }
    }

    /// Run all evaluators against one `Evidence` and collect the fired
    /// criteria and evidence-gap warnings.
    pub fn evaluate(&self, evidence: &Evidence) -> Aggregated {
        let mut result = Aggregated::default();
        for criterion in CriterionId::iter() {
            match self.evaluate_one(criterion, evidence) {
                Outcome::Triggered(triggered) => {
                    // Each criterion is evaluated exactly once per variant,
                    // so the key cannot be occupied.
                    result.triggered.insert(criterion, triggered);
                }
                Outcome::NotTriggered => (),
                Outcome::MissingEvidence(gap) => {
                    result.warnings.push(format!("{}: {}", criterion, gap));
                }
            }
        }

        // Surface mutual exclusivity between the stand-alone benign
        // criterion and any very strong pathogenic criterion; both stay
        // reported, the combiner's override rule decides.
        if result.triggered.contains_key(&CriterionId::Ba1) {
            let conflicting = result
                .triggered
                .values()
                .filter(|t| {
                    t.criterion.direction() == Direction::Pathogenic
                        && t.strength == Strength::VeryStrong
                })
                .map(|t| t.criterion.to_string())
                .collect::<Vec<_>>();
            if !conflicting.is_empty() {
                result.warnings.push(format!(
                    "conflicting evidence: BA1 co-occurs with {}",
                    conflicting.join(", ")
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use crate::classify::schema::{
        ClinicalSignificance, ClinvarAssertion, CriterionId, Evidence, GeneDiseaseMechanism,
        InSilicoScore, MolecularConsequence, PredictorCall, Thresholds,
    };

    use super::{EvidenceAggregator, Outcome};

    #[test]
    fn empty_evidence_triggers_nothing_and_gaps_every_evaluator() {
        let aggregator = EvidenceAggregator::default();

        let aggregated = aggregator.evaluate(&Evidence::default());

        assert!(aggregated.triggered.is_empty());
        // Every evaluator abstains for missing data on fully absent
        // evidence.
        assert_eq!(aggregated.warnings.len(), CriterionId::iter().count());
    }

    #[test]
    fn evaluation_is_order_independent() {
        let aggregator = EvidenceAggregator::default();
        let mut evidence = Evidence {
            gene_name: Some("TP53".into()),
            molecular_consequence: Some(MolecularConsequence::Nonsense),
            gene_disease_mechanism: Some(GeneDiseaseMechanism::LossOfFunction),
            population_allele_frequency: Some(1e-5),
            ..Default::default()
        };
        evidence.in_silico_scores.insert(
            "CADD".into(),
            InSilicoScore::new(30.0, PredictorCall::Damaging),
        );
        evidence.in_silico_scores.insert(
            "SIFT".into(),
            InSilicoScore::new(0.01, PredictorCall::Damaging),
        );

        let forward = CriterionId::iter()
            .map(|c| (c, aggregator.evaluate_one(c, &evidence)))
            .collect::<Vec<_>>();
        let mut backward = CriterionId::iter()
            .rev()
            .map(|c| (c, aggregator.evaluate_one(c, &evidence)))
            .collect::<Vec<_>>();
        backward.reverse();

        assert_eq!(forward, backward);
    }

    #[test]
    fn repeated_evaluation_is_deterministic() {
        let aggregator = EvidenceAggregator::default();
        let evidence = Evidence {
            population_allele_frequency: Some(0.2),
            molecular_consequence: Some(MolecularConsequence::Missense),
            ..Default::default()
        };

        let first = aggregator.evaluate(&evidence);
        let second = aggregator.evaluate(&evidence);

        assert_eq!(first, second);
    }

    #[test]
    fn ba1_and_pvs1_conflict_is_surfaced() {
        let aggregator = EvidenceAggregator::default();
        let evidence = Evidence {
            gene_name: Some("TP53".into()),
            molecular_consequence: Some(MolecularConsequence::Nonsense),
            gene_disease_mechanism: Some(GeneDiseaseMechanism::LossOfFunction),
            population_allele_frequency: Some(0.2),
            ..Default::default()
        };

        let aggregated = aggregator.evaluate(&evidence);

        assert!(aggregated.triggered.contains_key(&CriterionId::Ba1));
        assert!(aggregated.triggered.contains_key(&CriterionId::Pvs1));
        assert!(aggregated
            .warnings
            .iter()
            .any(|w| w.contains("BA1 co-occurs with PVS1")));
    }

    #[test]
    fn benign_clinvar_and_high_frequency_fire_the_benign_side() {
        let aggregator = EvidenceAggregator::default();
        let evidence = Evidence {
            molecular_consequence: Some(MolecularConsequence::Missense),
            population_allele_frequency: Some(0.02),
            clinvar: Some(ClinvarAssertion::new(ClinicalSignificance::Benign, 4)),
            ..Default::default()
        };

        let aggregated = aggregator.evaluate(&evidence);

        let fired = aggregated.triggered.keys().copied().collect::<Vec<_>>();
        assert_eq!(fired, vec![CriterionId::Bs1, CriterionId::Bs2]);
    }

    #[test]
    fn thresholds_reach_the_evaluators() {
        let aggregator = EvidenceAggregator::new(Thresholds {
            ba1_min_frequency: 0.5,
            ..Default::default()
        });
        let evidence = Evidence {
            population_allele_frequency: Some(0.2),
            ..Default::default()
        };

        let aggregated = aggregator.evaluate(&evidence);

        assert!(!aggregated.triggered.contains_key(&CriterionId::Ba1));
    }
}
