//! Classification report records written out for the report generator.

use super::combine::Classification;
use super::schema::{CriterionId, Direction, Strength, VcfVariant};

/// One triggered criterion as reported, with its decisiveness for the
/// matched combining rule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct ReportedCriterion {
    /// Criterion name, e.g. `PVS1`.
    pub name: CriterionId,
    /// The strength actually applied.
    pub strength: Strength,
    /// The direction of the criterion.
    pub direction: Direction,
    /// One-line rationale referencing the causative evidence fields.
    pub rationale: String,
    /// Whether the criterion was load-bearing for the matched combining
    /// rule.
    pub decisive: bool,
}

/// Immutable classification record for one variant.
///
/// Created once by the combiner and never mutated; the serialized form is
/// the contract with the report generator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct ClassificationResult {
    /// The classified variant.
    pub variant: VcfVariant,
    /// The final classification label.
    pub classification: Classification,
    /// All triggered criteria, decisive and non-decisive, in registry
    /// order.
    pub criteria: Vec<ReportedCriterion>,
    /// Evidence-gap and conflict warnings.
    pub warnings: Vec<String>,
}

/// Error record for a variant whose evidence failed validation; the batch
/// continues for other variants.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct ErrorRecord {
    /// The variant that failed.
    pub variant: VcfVariant,
    /// Description of the failure.
    pub error: String,
}
