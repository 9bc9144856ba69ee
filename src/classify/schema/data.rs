//! Code for representing the per-variant evidence that criterion evaluation
//! runs on, corresponds to what the annotation layer extracts from an
//! annotated VCF.

use noodles_vcf as vcf;

use vcf::variant::record::Ids as _;

/// Trait for attempting conversion from VCF record.
pub trait TryFromVcf: Sized {
    /// Error type to use.
    type Error;

    /// Convert from VCF record.
    ///
    /// # Arguments
    ///
    /// * `record` - VCF record.
    /// * `header` - VCF header.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be converted.
    fn try_from_vcf(
        record: &vcf::variant::RecordBuf,
        header: &vcf::Header,
    ) -> Result<Self, Self::Error>;
}

/// A sequence variant as read from the VCF file.
///
/// Identity key is `(chrom, pos, ref_allele, alt_allele)`.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct VcfVariant {
    /// Chromosome name.
    pub chrom: String,
    /// 1-based position.
    pub pos: i32,
    /// Reference allele.
    #[serde(rename = "ref")]
    pub ref_allele: String,
    /// Alternate allele.
    #[serde(rename = "alt")]
    pub alt_allele: String,
    /// Optional dbSNP identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbsnp_id: Option<String>,
}

impl std::fmt::Display for VcfVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}>{}",
            self.chrom, self.pos, self.ref_allele, self.alt_allele
        )
    }
}

/// Supporting code for `VcfVariant`.
pub mod vcf_variant {
    /// Error type for `TryFromVcf` implementation.
    #[derive(thiserror::Error, Debug, Clone)]
    pub enum Error {
        #[error("Missing POS value")]
        MissingVariantStart,
        #[error("Missing ALT values")]
        MissingAlternateBases,
    }
}

impl TryFromVcf for VcfVariant {
    type Error = vcf_variant::Error;

    fn try_from_vcf(
        record: &vcf::variant::RecordBuf,
        _header: &vcf::Header,
    ) -> Result<Self, Self::Error> {
        let chrom = record.reference_sequence_name().to_string();
        let pos = usize::from(
            record
                .variant_start()
                .ok_or(Self::Error::MissingVariantStart)?,
        ) as i32;

        let ref_allele = record.reference_bases().to_string();
        let alt_allele = record
            .alternate_bases()
            .as_ref()
            .iter()
            .next()
            .ok_or(Self::Error::MissingAlternateBases)?
            .to_string();
        let dbsnp_id = record.ids().iter().next().map(|s| s.to_string());

        Ok(Self {
            chrom,
            pos,
            ref_allele,
            alt_allele,
            dbsnp_id,
        })
    }
}

/// Molecular consequence of a variant on its transcript.
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
#[serde(rename_all = "snake_case")]
pub enum MolecularConsequence {
    /// Stop gained.
    #[strum(serialize = "nonsense")]
    Nonsense,
    /// Frameshift indel.
    #[strum(serialize = "frameshift")]
    Frameshift,
    /// Splice acceptor/donor disruption.
    #[strum(serialize = "splice")]
    Splice,
    /// Amino acid exchange.
    #[strum(serialize = "missense")]
    Missense,
    /// Silent coding change.
    #[strum(serialize = "synonymous")]
    Synonymous,
    /// Everything else (UTR, intronic, intergenic, ...).
    #[strum(serialize = "other")]
    Other,
}

impl MolecularConsequence {
    /// Map a VEP/SnpEff consequence or impact term to the internal enum.
    ///
    /// Unknown terms map to `Other`; callers decide whether the term was
    /// present at all.
    pub fn from_csq_term(term: &str) -> Self {
        let term = term.to_ascii_lowercase();
        if term.contains("stop_gained") || term.contains("nonsense") {
            MolecularConsequence::Nonsense
        } else if term.contains("frameshift") {
            MolecularConsequence::Frameshift
        } else if term.contains("splice_acceptor") || term.contains("splice_donor") {
            MolecularConsequence::Splice
        } else if term.contains("missense") {
            MolecularConsequence::Missense
        } else if term.contains("synonymous") {
            MolecularConsequence::Synonymous
        } else {
            MolecularConsequence::Other
        }
    }

    /// Whether the consequence is a null (loss-of-function) consequence.
    pub fn is_null_variant(&self) -> bool {
        matches!(
            self,
            MolecularConsequence::Nonsense
                | MolecularConsequence::Frameshift
                | MolecularConsequence::Splice
        )
    }
}

/// Clinical significance as asserted by a clinical variant database.
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
#[serde(rename_all = "snake_case")]
pub enum ClinicalSignificance {
    /// Asserted pathogenic.
    #[strum(serialize = "pathogenic")]
    Pathogenic,
    /// Asserted likely pathogenic.
    #[strum(serialize = "likely_pathogenic")]
    LikelyPathogenic,
    /// Asserted benign.
    #[strum(serialize = "benign")]
    Benign,
    /// Asserted likely benign.
    #[strum(serialize = "likely_benign")]
    LikelyBenign,
    /// Uncertain significance.
    #[strum(serialize = "vus")]
    Vus,
    /// Conflicting interpretations between submitters.
    #[strum(serialize = "conflicting")]
    Conflicting,
    /// No entry in the database.
    #[default]
    #[strum(serialize = "not_found")]
    NotFound,
}

/// A clinical database assertion together with its submission support.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct ClinvarAssertion {
    /// The aggregate clinical significance.
    pub significance: ClinicalSignificance,
    /// Number of supporting submissions.
    pub submissions: u32,
}

/// Established disease mechanism of the gene, drives PVS1 applicability.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum GeneDiseaseMechanism {
    /// Loss of function is an established disease mechanism.
    #[strum(serialize = "loss_of_function")]
    LossOfFunction,
    /// Gain of function is the established disease mechanism.
    #[strum(serialize = "gain_of_function")]
    GainOfFunction,
    /// No established mechanism.
    #[default]
    #[strum(serialize = "unknown")]
    Unknown,
}

/// Qualitative call of an in-silico predictor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PredictorCall {
    /// Predicted damaging/deleterious.
    #[strum(serialize = "damaging")]
    Damaging,
    /// Predicted benign/tolerated.
    #[strum(serialize = "benign")]
    Benign,
    /// Score in the uninformative middle range.
    #[strum(serialize = "uncertain")]
    Uncertain,
}

/// Score and qualitative call of one in-silico predictor.
#[derive(
    Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct InSilicoScore {
    /// The numeric score on the predictor's own scale.
    pub score: f64,
    /// The qualitative call at the predictor's published cutoff.
    pub call: PredictorCall,
}

/// Supporting code for `Evidence`.
pub mod evidence {
    /// Error type for `Evidence::validate()`; fatal to the one variant only.
    #[derive(thiserror::Error, Debug, Clone)]
    pub enum Error {
        #[error("population allele frequency {0} outside [0.0, 1.0]")]
        FrequencyOutOfRange(f64),
        #[error("non-finite score for in-silico predictor {0:?}")]
        NonFiniteScore(String),
    }
}

/// All annotation facts known for one variant.
///
/// Every annotation field is optional; absence is a first-class value and
/// must never be encoded as a sentinel such as a `0.0` frequency.  One
/// instance exists per variant and is immutable after construction, so
/// criterion evaluation can run concurrently over shared references.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Evidence {
    /// The variant the evidence belongs to.
    pub variant: VcfVariant,
    /// Gene symbol.
    pub gene_name: Option<String>,
    /// Transcript the consequence refers to.
    pub transcript_id: Option<String>,
    /// cDNA-level HGVS description.
    pub hgvs_c: Option<String>,
    /// Protein-level HGVS description.
    pub hgvs_p: Option<String>,
    /// Molecular consequence on the transcript.
    pub molecular_consequence: Option<MolecularConsequence>,
    /// Population allele frequency from a gnomAD-like source, in [0, 1].
    pub population_allele_frequency: Option<f64>,
    /// Clinical database assertion, if the variant has an entry.
    pub clinvar: Option<ClinvarAssertion>,
    /// In-silico predictor scores keyed by predictor name.
    pub in_silico_scores: indexmap::IndexMap<String, InSilicoScore>,
    /// Established disease mechanism of the gene.
    pub gene_disease_mechanism: Option<GeneDiseaseMechanism>,
    /// Whether the variant falls into a known critical functional domain.
    pub functional_domain_hit: Option<bool>,
    /// Whether an established pathogenic variant with the same amino acid
    /// change at the same residue is known.
    pub known_pathogenic_same_residue: Option<bool>,
}

impl Evidence {
    /// Check all present fields against their documented domains.
    ///
    /// # Errors
    ///
    /// Returns an error if a field value is outside its documented domain;
    /// the variant then fails classification but the batch continues.
    pub fn validate(&self) -> Result<(), evidence::Error> {
        if let Some(af) = self.population_allele_frequency {
            if !(0.0..=1.0).contains(&af) {
                return Err(evidence::Error::FrequencyOutOfRange(af));
            }
        }
        for (name, in_silico) in &self.in_silico_scores {
            if !in_silico.score.is_finite() {
                return Err(evidence::Error::NonFiniteScore(name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("stop_gained", MolecularConsequence::Nonsense)]
    #[case("stop_gained&splice_region_variant", MolecularConsequence::Nonsense)]
    #[case("frameshift_variant", MolecularConsequence::Frameshift)]
    #[case("splice_acceptor_variant", MolecularConsequence::Splice)]
    #[case("splice_donor_variant", MolecularConsequence::Splice)]
    #[case("missense_variant", MolecularConsequence::Missense)]
    #[case("synonymous_variant", MolecularConsequence::Synonymous)]
    #[case("intron_variant", MolecularConsequence::Other)]
    #[case("5_prime_UTR_variant", MolecularConsequence::Other)]
    fn molecular_consequence_from_csq_term(
        #[case] term: &str,
        #[case] expected: MolecularConsequence,
    ) {
        assert_eq!(MolecularConsequence::from_csq_term(term), expected);
    }

    #[rstest]
    #[case(MolecularConsequence::Nonsense, true)]
    #[case(MolecularConsequence::Frameshift, true)]
    #[case(MolecularConsequence::Splice, true)]
    #[case(MolecularConsequence::Missense, false)]
    #[case(MolecularConsequence::Synonymous, false)]
    #[case(MolecularConsequence::Other, false)]
    fn molecular_consequence_is_null_variant(
        #[case] csq: MolecularConsequence,
        #[case] expected: bool,
    ) {
        assert_eq!(csq.is_null_variant(), expected);
    }

    #[rstest]
    #[case(Some(0.0), true)]
    #[case(Some(1.0), true)]
    #[case(Some(0.5), true)]
    #[case(Some(-0.1), false)]
    #[case(Some(1.1), false)]
    #[case(None, true)]
    fn evidence_validate_frequency(#[case] af: Option<f64>, #[case] expected_ok: bool) {
        let evidence = Evidence {
            population_allele_frequency: af,
            ..Default::default()
        };

        assert_eq!(evidence.validate().is_ok(), expected_ok);
    }

    #[test]
    fn evidence_validate_non_finite_score() {
        let mut evidence = Evidence::default();
        evidence.in_silico_scores.insert(
            "CADD".into(),
            InSilicoScore::new(f64::NAN, PredictorCall::Damaging),
        );

        assert!(evidence.validate().is_err());
    }

    #[test]
    fn vcf_variant_display() {
        let variant = VcfVariant::new("17".into(), 7_578_406, "C".into(), "T".into(), None);

        assert_eq!(format!("{}", &variant), "17:7578406:C>T");
    }

    #[test]
    fn vcf_variant_serialized_field_names() -> Result<(), anyhow::Error> {
        let variant = VcfVariant::new(
            "17".into(),
            7_578_406,
            "C".into(),
            "T".into(),
            Some("rs28934578".into()),
        );

        assert_eq!(
            serde_json::to_value(&variant)?,
            serde_json::json!({
                "chrom": "17",
                "pos": 7578406,
                "ref": "C",
                "alt": "T",
                "dbsnp_id": "rs28934578",
            })
        );

        Ok(())
    }

    #[test]
    fn evidence_serde_roundtrip_smoke() -> Result<(), anyhow::Error> {
        let evidence = Evidence {
            variant: VcfVariant::new(
                "17".into(),
                7_578_406,
                "C".into(),
                "T".into(),
                Some("rs28934578".into()),
            ),
            gene_name: Some("TP53".into()),
            molecular_consequence: Some(MolecularConsequence::Nonsense),
            population_allele_frequency: Some(1e-5),
            gene_disease_mechanism: Some(GeneDiseaseMechanism::LossOfFunction),
            ..Default::default()
        };

        let json = serde_json::to_string(&evidence)?;
        let back: Evidence = serde_json::from_str(&json)?;
        assert_eq!(back, evidence);

        Ok(())
    }
}
