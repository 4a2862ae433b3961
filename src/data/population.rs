//! # Population Model
//!
//! `Population` is the root of the in-memory model: an ordered sequence of
//! subpopulations, an ordered sequence of chromosomes (hence a global locus
//! index space), a declared maximum-allele bound, and a generation-history
//! stack of at most one ancestral snapshot.
//!
//! The ancestral snapshot is how pedigree formats recover parent/offspring
//! linkage without foreign keys: an individual's parents live at fixed
//! positions inside the same subpopulation of the ancestral generation.

use crate::data::individual::Individual;
use crate::data::locus::{Chromosome, Locus};
use crate::data::{ChromIdx, LocusIdx};
use crate::error::{PopconvError, Result};

/// An ordered sequence of individuals. Acts as the pedigree unit in the
/// by-subpopulation family mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subpopulation {
    individuals: Vec<Individual>,
}

impl Subpopulation {
    /// Create `size` all-missing individuals over `n_loci` loci
    pub fn new(size: usize, n_loci: usize) -> Self {
        Self {
            individuals: vec![Individual::new(n_loci); size],
        }
    }

    /// Wrap an existing individual list
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individual(&self, idx: usize) -> &Individual {
        &self.individuals[idx]
    }

    pub fn individual_mut(&mut self, idx: usize) -> &mut Individual {
        &mut self.individuals[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Individual> {
        self.individuals.iter_mut()
    }
}

/// A diploid population: subpopulations, chromosome layout and at most one
/// ancestral generation snapshot.
#[derive(Clone, Debug)]
pub struct Population {
    chromosomes: Vec<Chromosome>,
    subpops: Vec<Subpopulation>,
    ancestral: Option<Vec<Subpopulation>>,
    max_allele: u32,
}

impl Population {
    /// Create a population with the given chromosome layout and
    /// per-subpopulation sizes, all genotypes missing
    pub fn with_layout(chromosomes: Vec<Chromosome>, subpop_sizes: &[usize]) -> Self {
        let n_loci: usize = chromosomes.iter().map(|c| c.len()).sum();
        let subpops = subpop_sizes
            .iter()
            .map(|&n| Subpopulation::new(n, n_loci))
            .collect();
        Self {
            chromosomes,
            subpops,
            ancestral: None,
            max_allele: 0,
        }
    }

    /// Create a population from already-filled subpopulations
    ///
    /// Every genotype vector must cover the chromosome layout's locus count.
    pub fn from_subpopulations(
        chromosomes: Vec<Chromosome>,
        subpops: Vec<Subpopulation>,
    ) -> Result<Self> {
        let n_loci: usize = chromosomes.iter().map(|c| c.len()).sum();
        for (sp, subpop) in subpops.iter().enumerate() {
            for ind in subpop.iter() {
                if ind.n_loci() != n_loci {
                    return Err(PopconvError::structural(format!(
                        "subpopulation {} genotype covers {} loci, layout has {}",
                        sp,
                        ind.n_loci(),
                        n_loci
                    )));
                }
            }
        }
        Ok(Self {
            chromosomes,
            subpops,
            ancestral: None,
            max_allele: 0,
        })
    }

    // ----- chromosome / locus layout -----

    pub fn num_chroms(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn chromosome(&self, ch: ChromIdx) -> &Chromosome {
        &self.chromosomes[ch.as_usize()]
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    /// Number of loci on one chromosome
    pub fn num_loci(&self, ch: ChromIdx) -> usize {
        self.chromosomes[ch.as_usize()].len()
    }

    /// Total locus count across all chromosomes
    pub fn total_loci(&self) -> usize {
        self.chromosomes.iter().map(|c| c.len()).sum()
    }

    /// Global index of the first locus on a chromosome
    pub fn chrom_begin(&self, ch: ChromIdx) -> LocusIdx {
        let offset: usize = self.chromosomes[..ch.as_usize()]
            .iter()
            .map(|c| c.len())
            .sum();
        LocusIdx::new(offset as u32)
    }

    /// Global index one past the last locus on a chromosome
    pub fn chrom_end(&self, ch: ChromIdx) -> LocusIdx {
        let begin = self.chrom_begin(ch).as_usize();
        LocusIdx::new((begin + self.num_loci(ch)) as u32)
    }

    /// Locus metadata by global index
    pub fn locus(&self, idx: LocusIdx) -> &Locus {
        let mut offset = idx.as_usize();
        for ch in &self.chromosomes {
            if offset < ch.len() {
                return ch.locus(offset);
            }
            offset -= ch.len();
        }
        panic!("locus index {} out of range", idx.as_usize());
    }

    /// Iterate over all locus metadata in global order
    pub fn loci(&self) -> impl Iterator<Item = &Locus> {
        self.chromosomes.iter().flat_map(|c| c.loci())
    }

    // ----- current generation -----

    pub fn num_subpops(&self) -> usize {
        self.subpops.len()
    }

    pub fn subpop(&self, sp: usize) -> &Subpopulation {
        &self.subpops[sp]
    }

    pub fn subpop_mut(&mut self, sp: usize) -> &mut Subpopulation {
        &mut self.subpops[sp]
    }

    pub fn subpop_size(&self, sp: usize) -> usize {
        self.subpops[sp].len()
    }

    /// Total current-generation size
    pub fn total_size(&self) -> usize {
        self.subpops.iter().map(|s| s.len()).sum()
    }

    pub fn individual(&self, sp: usize, idx: usize) -> &Individual {
        self.subpops[sp].individual(idx)
    }

    pub fn individual_mut(&mut self, sp: usize, idx: usize) -> &mut Individual {
        self.subpops[sp].individual_mut(idx)
    }

    /// Individual by flat index across subpopulations, in subpopulation order
    pub fn individual_at(&self, mut idx: usize) -> &Individual {
        for sp in &self.subpops {
            if idx < sp.len() {
                return sp.individual(idx);
            }
            idx -= sp.len();
        }
        panic!("flat individual index out of range");
    }

    /// Iterate over all current-generation individuals in subpopulation order
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.subpops.iter().flat_map(|s| s.iter())
    }

    // ----- ancestral generation -----

    /// Ancestral snapshot, if one generation of history is kept
    pub fn ancestral(&self) -> Option<&[Subpopulation]> {
        self.ancestral.as_deref()
    }

    /// Install an ancestral snapshot. The snapshot must cover the same
    /// locus layout as the current generation.
    pub fn set_ancestral(&mut self, subpops: Vec<Subpopulation>) -> Result<()> {
        let n_loci = self.total_loci();
        for (sp, subpop) in subpops.iter().enumerate() {
            for ind in subpop.iter() {
                if ind.n_loci() != n_loci {
                    return Err(PopconvError::structural(format!(
                        "ancestral subpopulation {} genotype covers {} loci, population has {}",
                        sp,
                        ind.n_loci(),
                        n_loci
                    )));
                }
            }
        }
        self.ancestral = Some(subpops);
        Ok(())
    }

    pub fn ancestral_subpop(&self, sp: usize) -> Option<&Subpopulation> {
        self.ancestral.as_ref().and_then(|a| a.get(sp))
    }

    /// Size of one ancestral subpopulation; 0 when no snapshot covers `sp`
    pub fn ancestral_subpop_size(&self, sp: usize) -> usize {
        self.ancestral_subpop(sp).map_or(0, Subpopulation::len)
    }

    /// Total ancestral-generation size
    pub fn ancestral_total_size(&self) -> usize {
        self.ancestral
            .as_ref()
            .map_or(0, |a| a.iter().map(|s| s.len()).sum())
    }

    /// Ancestral individual by flat index across subpopulations
    pub fn ancestral_individual_at(&self, mut idx: usize) -> &Individual {
        let anc = self.ancestral.as_ref().expect("no ancestral generation");
        for sp in anc {
            if idx < sp.len() {
                return sp.individual(idx);
            }
            idx -= sp.len();
        }
        panic!("flat ancestral index out of range");
    }

    // ----- allele bound -----

    /// Declared maximum-allele bound
    pub fn max_allele(&self) -> u32 {
        self.max_allele
    }

    pub fn set_max_allele(&mut self, max_allele: u32) {
        self.max_allele = max_allele;
    }

    /// Largest allele value actually present in either generation
    pub fn observed_max_allele(&self) -> u32 {
        let current = self.individuals().map(|i| i.max_allele()).max().unwrap_or(0);
        let ancestral = self
            .ancestral
            .iter()
            .flat_map(|a| a.iter())
            .flat_map(|s| s.iter())
            .map(|i| i.max_allele())
            .max()
            .unwrap_or(0);
        current.max(ancestral)
    }

    // ----- invariants -----

    /// Check structural well-formedness: genotype vector lengths, the
    /// declared allele bound, and locus naming within each chromosome.
    pub fn validate(&self) -> Result<()> {
        let n_loci = self.total_loci();
        let all = self
            .individuals()
            .chain(self.ancestral.iter().flat_map(|a| a.iter()).flat_map(|s| s.iter()));
        for ind in all {
            if ind.n_loci() != n_loci {
                return Err(PopconvError::structural(format!(
                    "genotype covers {} loci, population has {}",
                    ind.n_loci(),
                    n_loci
                )));
            }
            if ind.max_allele() > self.max_allele {
                return Err(PopconvError::structural(format!(
                    "allele value {} exceeds declared maximum {}",
                    ind.max_allele(),
                    self.max_allele
                )));
            }
        }
        for (ch_idx, ch) in self.chromosomes.iter().enumerate() {
            let mut seen = std::collections::HashSet::new();
            for locus in ch.loci() {
                if locus.name.is_empty() {
                    return Err(PopconvError::structural(format!(
                        "chromosome {} has a locus with an empty name",
                        ch_idx
                    )));
                }
                if !seen.insert(locus.name.as_str()) {
                    return Err(PopconvError::structural(format!(
                        "duplicate locus name '{}' on chromosome {}",
                        locus.name, ch_idx
                    )));
                }
            }
        }
        Ok(())
    }
}
