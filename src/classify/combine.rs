//! The ACMG combining table mapping the aggregated criteria of one variant
//! to a final classification.
//!
//! The table follows Richards et al. 2015 (Table 5) and is represented as
//! data: ordered rows of minimal tier counts, first matching row per
//! direction wins.

use super::criteria::Aggregated;
use super::schema::{CriterionId, Direction, Strength};

/// The five terminal classification labels.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
pub enum Classification {
    /// Pathogenic.
    #[serde(rename = "Pathogenic")]
    #[strum(serialize = "Pathogenic")]
    Pathogenic,
    /// Likely pathogenic.
    #[serde(rename = "Likely Pathogenic")]
    #[strum(serialize = "Likely Pathogenic")]
    LikelyPathogenic,
    /// Uncertain significance; the default terminal state.
    #[default]
    #[serde(rename = "Uncertain Significance")]
    #[strum(serialize = "Uncertain Significance")]
    UncertainSignificance,
    /// Likely benign.
    #[serde(rename = "Likely Benign")]
    #[strum(serialize = "Likely Benign")]
    LikelyBenign,
    /// Benign.
    #[serde(rename = "Benign")]
    #[strum(serialize = "Benign")]
    Benign,
}

/// Counts of triggered criteria by strength tier and direction.
///
/// The stand-alone BA1 criterion is handled as an override before the table
/// is consulted and therefore has no tier here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    /// Very strong pathogenic criteria.
    pub very_strong: usize,
    /// Strong pathogenic criteria.
    pub strong: usize,
    /// Moderate pathogenic criteria.
    pub moderate: usize,
    /// Supporting pathogenic criteria.
    pub supporting: usize,
    /// Strong benign criteria.
    pub strong_benign: usize,
    /// Supporting benign criteria.
    pub supporting_benign: usize,
}

impl TierCounts {
    /// Tally the tier counts of an aggregated criteria set.
    pub fn from_aggregated(aggregated: &Aggregated) -> Self {
        let mut counts = TierCounts::default();
        for triggered in aggregated.triggered.values() {
            match (triggered.criterion.direction(), triggered.strength) {
                (Direction::Benign, Strength::StandAlone) => (),
                (Direction::Pathogenic, Strength::VeryStrong) => counts.very_strong += 1,
                (Direction::Pathogenic, Strength::Strong) => counts.strong += 1,
                (Direction::Pathogenic, Strength::Moderate) => counts.moderate += 1,
                (Direction::Pathogenic, Strength::Supporting) => counts.supporting += 1,
                (Direction::Benign, Strength::Strong) => counts.strong_benign += 1,
                (Direction::Benign, Strength::Supporting) => counts.supporting_benign += 1,
                // No criterion carries these combinations; counting them
                // anyway keeps the tally total.
                (Direction::Pathogenic, Strength::StandAlone) => counts.very_strong += 1,
                (Direction::Benign, Strength::VeryStrong | Strength::Moderate) => {
                    counts.strong_benign += 1
                }
            }
        }
        counts
    }
}

/// One row of the combining table: minimal tier counts implying a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CombiningRule {
    /// Label the row implies.
    classification: Classification,
    /// Minimal number of very strong pathogenic criteria.
    very_strong: usize,
    /// Minimal number of strong pathogenic criteria.
    strong: usize,
    /// Minimal number of moderate pathogenic criteria.
    moderate: usize,
    /// Minimal number of supporting pathogenic criteria.
    supporting: usize,
    /// Minimal number of strong benign criteria.
    strong_benign: usize,
    /// Minimal number of supporting benign criteria.
    supporting_benign: usize,
}

impl CombiningRule {
    /// Whether the tier counts satisfy this row.
    fn matches(&self, counts: &TierCounts) -> bool {
        counts.very_strong >= self.very_strong
            && counts.strong >= self.strong
            && counts.moderate >= self.moderate
            && counts.supporting >= self.supporting
            && counts.strong_benign >= self.strong_benign
            && counts.supporting_benign >= self.supporting_benign
    }

    /// Whether this row belongs to the pathogenic direction.
    fn is_pathogenic(&self) -> bool {
        matches!(
            self.classification,
            Classification::Pathogenic | Classification::LikelyPathogenic
        )
    }
}

/// Shorthand for the pathogenic-direction rows.
const fn pathogenic_rule(
    classification: Classification,
    very_strong: usize,
    strong: usize,
    moderate: usize,
    supporting: usize,
) -> CombiningRule {
    CombiningRule {
        classification,
        very_strong,
        strong,
        moderate,
        supporting,
        strong_benign: 0,
        supporting_benign: 0,
    }
}

/// Shorthand for the benign-direction rows.
const fn benign_rule(
    classification: Classification,
    strong_benign: usize,
    supporting_benign: usize,
) -> CombiningRule {
    CombiningRule {
        classification,
        very_strong: 0,
        strong: 0,
        moderate: 0,
        supporting: 0,
        strong_benign,
        supporting_benign,
    }
}

/// The combining table, ordered strongest label first so the first matching
/// row per direction wins.  BA1 is handled as an override before the table
/// is consulted.
const COMBINING_TABLE: &[CombiningRule] = &[
    // Pathogenic: 1 very strong + corroboration.
    pathogenic_rule(Classification::Pathogenic, 1, 1, 0, 0),
    pathogenic_rule(Classification::Pathogenic, 1, 0, 2, 0),
    pathogenic_rule(Classification::Pathogenic, 1, 0, 1, 1),
    pathogenic_rule(Classification::Pathogenic, 1, 0, 0, 2),
    // Pathogenic: >= 2 strong.
    pathogenic_rule(Classification::Pathogenic, 0, 2, 0, 0),
    // Pathogenic: 1 strong + moderates/supportings.
    pathogenic_rule(Classification::Pathogenic, 0, 1, 3, 0),
    pathogenic_rule(Classification::Pathogenic, 0, 1, 2, 2),
    pathogenic_rule(Classification::Pathogenic, 0, 1, 1, 4),
    // Likely pathogenic.
    pathogenic_rule(Classification::LikelyPathogenic, 1, 0, 1, 0),
    pathogenic_rule(Classification::LikelyPathogenic, 0, 1, 1, 0),
    pathogenic_rule(Classification::LikelyPathogenic, 0, 1, 0, 2),
    pathogenic_rule(Classification::LikelyPathogenic, 0, 0, 3, 0),
    pathogenic_rule(Classification::LikelyPathogenic, 0, 0, 2, 2),
    pathogenic_rule(Classification::LikelyPathogenic, 0, 0, 1, 4),
    // Benign: >= 2 strong benign.
    benign_rule(Classification::Benign, 2, 0),
    // Likely benign.
    benign_rule(Classification::LikelyBenign, 1, 1),
    benign_rule(Classification::LikelyBenign, 0, 2),
];

/// First matching row of the requested direction, if any.
fn match_row(counts: &TierCounts, pathogenic: bool) -> Option<&'static CombiningRule> {
    COMBINING_TABLE
        .iter()
        .filter(|rule| rule.is_pathogenic() == pathogenic)
        .find(|rule| rule.matches(counts))
}

/// Terminal verdict of the combiner for one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// The final classification label.
    pub classification: Classification,
    /// The minimal criteria subset justifying the matched rule, in registry
    /// order; empty for the uncertain default.
    pub decisive: Vec<CriterionId>,
    /// Whether pathogenic and benign rules matched simultaneously.
    pub conflicting: bool,
}

/// Apply the combining table to an aggregated criteria set.
///
/// Total over all inputs: exactly one terminal label is reached for every
/// reachable criterion-count combination, and identical aggregated sets
/// always yield identical verdicts.
pub fn combine(aggregated: &Aggregated) -> Verdict {
    // BA1 is an absolute override, terminal before any counting.
    if aggregated.triggered.contains_key(&CriterionId::Ba1) {
        return Verdict {
            classification: Classification::Benign,
            decisive: vec![CriterionId::Ba1],
            conflicting: false,
        };
    }

    let counts = TierCounts::from_aggregated(aggregated);
    let pathogenic_row = match_row(&counts, true);
    let benign_row = match_row(&counts, false);

    match (pathogenic_row, benign_row) {
        // Conflicting strength on both sides is never silently resolved
        // toward either pole.
        (Some(_), Some(_)) => Verdict {
            classification: Classification::UncertainSignificance,
            decisive: vec![],
            conflicting: true,
        },
        (Some(rule), None) | (None, Some(rule)) => Verdict {
            classification: rule.classification,
            decisive: decisive_subset(rule, aggregated),
            conflicting: false,
        },
        (None, None) => Verdict::default(),
    }
}

/// Select the minimal criteria subset justifying the matched rule, taking
/// criteria in registry order per tier.
fn decisive_subset(rule: &CombiningRule, aggregated: &Aggregated) -> Vec<CriterionId> {
    let mut needed = *rule;
    let mut result = Vec::new();
    for triggered in aggregated.triggered.values() {
        let slot = match (triggered.criterion.direction(), triggered.strength) {
            (Direction::Pathogenic, Strength::VeryStrong | Strength::StandAlone) => {
                &mut needed.very_strong
            }
            (Direction::Pathogenic, Strength::Strong) => &mut needed.strong,
            (Direction::Pathogenic, Strength::Moderate) => &mut needed.moderate,
            (Direction::Pathogenic, Strength::Supporting) => &mut needed.supporting,
            (Direction::Benign, Strength::Strong) => &mut needed.strong_benign,
            (Direction::Benign, Strength::Supporting) => &mut needed.supporting_benign,
            (Direction::Benign, _) => &mut needed.strong_benign,
        };
        if *slot > 0 {
            *slot -= 1;
            result.push(triggered.criterion);
        }
    }
    result
}
