//! Code for representing ACMG criteria, their strengths and directions.

/// Direction of evidence a criterion contributes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Evidence for pathogenicity.
    #[strum(serialize = "pathogenic")]
    Pathogenic,
    /// Evidence for benign impact.
    #[strum(serialize = "benign")]
    Benign,
}

/// Strength category of a triggered criterion.
///
/// Evaluator logic may down-grade a criterion within its category ceiling
/// (modelled as not firing at all for the suppression cases we implement)
/// but never upgrade it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    /// Stand-alone evidence (BA1 only); overrides the combining table.
    #[strum(serialize = "stand_alone")]
    StandAlone,
    /// Very strong evidence.
    #[strum(serialize = "very_strong")]
    VeryStrong,
    /// Strong evidence.
    #[strum(serialize = "strong")]
    Strong,
    /// Moderate evidence.
    #[strum(serialize = "moderate")]
    Moderate,
    /// Supporting evidence.
    #[strum(serialize = "supporting")]
    Supporting,
}

impl Strength {
    /// Point-equivalent of the strength category (unsigned; the direction
    /// provides the sign).
    pub fn points(&self) -> u32 {
        match self {
            Strength::StandAlone => 8,
            Strength::VeryStrong => 8,
            Strength::Strong => 4,
            Strength::Moderate => 2,
            Strength::Supporting => 1,
        }
    }
}

/// The closed set of implemented ACMG criteria.
///
/// Every identifier has exactly one evaluator (see `classify::criteria`);
/// the registry check in the aggregator tests verifies the set stays
/// closed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum CriterionId {
    /// Null variant in a gene where loss of function is a known disease
    /// mechanism.
    #[serde(rename = "PVS1")]
    #[strum(serialize = "PVS1")]
    Pvs1,
    /// Same amino acid change as an established pathogenic variant.
    #[serde(rename = "PS1")]
    #[strum(serialize = "PS1")]
    Ps1,
    /// Located in a critical, well-established functional domain.
    #[serde(rename = "PM1")]
    #[strum(serialize = "PM1")]
    Pm1,
    /// Absent or extremely rare in population databases.
    #[serde(rename = "PM2")]
    #[strum(serialize = "PM2")]
    Pm2,
    /// Multiple lines of computational evidence support a deleterious
    /// effect.
    #[serde(rename = "PP3")]
    #[strum(serialize = "PP3")]
    Pp3,
    /// Allele frequency above the stand-alone benign cutoff.
    #[serde(rename = "BA1")]
    #[strum(serialize = "BA1")]
    Ba1,
    /// Allele frequency greater than expected for the disorder.
    #[serde(rename = "BS1")]
    #[strum(serialize = "BS1")]
    Bs1,
    /// Benign assertion with multiple supporting submissions.
    #[serde(rename = "BS2")]
    #[strum(serialize = "BS2")]
    Bs2,
    /// Multiple lines of computational evidence suggest no impact.
    #[serde(rename = "BP4")]
    #[strum(serialize = "BP4")]
    Bp4,
    /// Synonymous variant with no predicted splice impact.
    #[serde(rename = "BP7")]
    #[strum(serialize = "BP7")]
    Bp7,
}

impl CriterionId {
    /// The fixed direction of the criterion.
    pub fn direction(&self) -> Direction {
        match self {
            CriterionId::Pvs1
            | CriterionId::Ps1
            | CriterionId::Pm1
            | CriterionId::Pm2
            | CriterionId::Pp3 => Direction::Pathogenic,
            CriterionId::Ba1
            | CriterionId::Bs1
            | CriterionId::Bs2
            | CriterionId::Bp4
            | CriterionId::Bp7 => Direction::Benign,
        }
    }

    /// The fixed default strength of the criterion (the category ceiling).
    pub fn default_strength(&self) -> Strength {
        match self {
            CriterionId::Pvs1 => Strength::VeryStrong,
            CriterionId::Ps1 => Strength::Strong,
            CriterionId::Pm1 | CriterionId::Pm2 => Strength::Moderate,
            CriterionId::Pp3 => Strength::Supporting,
            CriterionId::Ba1 => Strength::StandAlone,
            CriterionId::Bs1 | CriterionId::Bs2 => Strength::Strong,
            CriterionId::Bp4 | CriterionId::Bp7 => Strength::Supporting,
        }
    }
}

/// A criterion that fired for one variant.
///
/// Created at most once per criterion per variant by the evaluator and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct TriggeredCriterion {
    /// The criterion that fired.
    pub criterion: CriterionId,
    /// The strength actually applied.
    pub strength: Strength,
    /// One-line rationale referencing the evidence fields that caused the
    /// trigger.
    pub rationale: String,
}

impl TriggeredCriterion {
    /// Construct with the criterion's default strength.
    pub fn with_default_strength(criterion: CriterionId, rationale: String) -> Self {
        Self {
            criterion,
            strength: criterion.default_strength(),
            rationale,
        }
    }
}
