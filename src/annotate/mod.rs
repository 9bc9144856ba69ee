//! Boundary to the annotation layer.
//!
//! The classifier only ever sees fully populated `Evidence` instances; this
//! module builds them from the INFO fields of an already annotated VCF and
//! resolves gene names to their established disease mechanism.

pub mod vcf;

use crate::classify::schema::GeneDiseaseMechanism;

/// Genes with loss of function as an established disease mechanism, used
/// when no mechanism file is given.
const DEFAULT_LOF_GENES: &[&str] = &["APC", "BRCA1", "BRCA2", "PTEN", "RB1", "TP53", "VHL"];

/// Mapping from gene symbol to established disease mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneMechanismMap {
    /// Mechanism by upper-cased gene symbol.
    mechanisms: indexmap::IndexMap<String, GeneDiseaseMechanism>,
}

impl Default for GeneMechanismMap {
    fn default() -> Self {
        let mechanisms = DEFAULT_LOF_GENES
            .iter()
            .map(|gene| (gene.to_string(), GeneDiseaseMechanism::LossOfFunction))
            .collect();
        Self { mechanisms }
    }
}

impl GeneMechanismMap {
    /// Load a two-column TSV file `gene<TAB>mechanism` where mechanism is
    /// one of `loss_of_function`, `gain_of_function`, `unknown`.
    pub fn from_tsv<P: AsRef<std::path::Path>>(path: P) -> Result<Self, anyhow::Error> {
        let mut mechanisms = indexmap::IndexMap::new();
        for (lineno, line) in crate::common::io::read_lines(&path)?.enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (gene, mechanism) = line.split_once('\t').ok_or_else(|| {
                anyhow::anyhow!(
                    "expected two tab-separated columns in {:?} line {}",
                    path.as_ref(),
                    lineno + 1
                )
            })?;
            let mechanism = mechanism.trim().parse::<GeneDiseaseMechanism>().map_err(|e| {
                anyhow::anyhow!(
                    "invalid mechanism {:?} in {:?} line {}: {}",
                    mechanism,
                    path.as_ref(),
                    lineno + 1,
                    e
                )
            })?;
            mechanisms.insert(gene.trim().to_uppercase(), mechanism);
        }
        tracing::debug!("loaded {} gene mechanisms", mechanisms.len());
        Ok(Self { mechanisms })
    }

    /// Look up the mechanism of a gene; unmapped genes have no established
    /// mechanism.
    pub fn lookup(&self, gene: &str) -> GeneDiseaseMechanism {
        self.mechanisms
            .get(&gene.to_uppercase())
            .copied()
            .unwrap_or(GeneDiseaseMechanism::Unknown)
    }
}
