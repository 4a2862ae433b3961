//! # Individual Definitions
//!
//! A diploid individual: sex, affection status and a flat genotype vector of
//! two alleles per locus. Allele value 0 is the missing-data sentinel.
//!
//! The genotype vector is laid out as interleaved pairs
//! `[l0a0, l0a1, l1a0, l1a1, ...]`, indexed by global locus index; the index
//! arithmetic lives in `allele`/`set_allele` so codecs never touch the raw
//! layout.

use crate::data::LocusIdx;

/// Biological sex. Binary throughout the supported formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// The complementary sex, used when resolving same-sex parent collisions
    pub fn opposite(self) -> Sex {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

/// A diploid individual
#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    /// Biological sex
    pub sex: Sex,
    /// Affection status (format-specific integer codes are applied at the
    /// codec boundary, never stored here)
    pub affected: bool,
    /// Interleaved allele pairs, length 2 * total locus count
    alleles: Vec<u32>,
}

impl Individual {
    /// Create an unaffected male with an all-missing genotype over `n_loci`
    pub fn new(n_loci: usize) -> Self {
        Self {
            sex: Sex::Male,
            affected: false,
            alleles: vec![0; 2 * n_loci],
        }
    }

    /// Number of loci covered by the genotype vector
    pub fn n_loci(&self) -> usize {
        self.alleles.len() / 2
    }

    /// Allele at a global locus index; `copy` is 0 or 1
    pub fn allele(&self, locus: LocusIdx, copy: usize) -> u32 {
        debug_assert!(copy < 2);
        self.alleles[2 * locus.as_usize() + copy]
    }

    /// Both alleles at a global locus index
    pub fn allele_pair(&self, locus: LocusIdx) -> (u32, u32) {
        let base = 2 * locus.as_usize();
        (self.alleles[base], self.alleles[base + 1])
    }

    /// Set one allele at a global locus index; `copy` is 0 or 1
    pub fn set_allele(&mut self, locus: LocusIdx, copy: usize, value: u32) {
        debug_assert!(copy < 2);
        self.alleles[2 * locus.as_usize() + copy] = value;
    }

    /// Set both alleles at a global locus index
    pub fn set_allele_pair(&mut self, locus: LocusIdx, a1: u32, a2: u32) {
        let base = 2 * locus.as_usize();
        self.alleles[base] = a1;
        self.alleles[base + 1] = a2;
    }

    /// Largest allele value carried by this individual
    pub fn max_allele(&self) -> u32 {
        self.alleles.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genotype_layout_is_interleaved() {
        let mut ind = Individual::new(3);
        ind.set_allele_pair(LocusIdx::new(1), 5, 7);
        assert_eq!(ind.allele(LocusIdx::new(1), 0), 5);
        assert_eq!(ind.allele(LocusIdx::new(1), 1), 7);
        assert_eq!(ind.allele_pair(LocusIdx::new(0)), (0, 0));
        assert_eq!(ind.max_allele(), 7);
    }

    #[test]
    fn sex_opposite() {
        assert_eq!(Sex::Male.opposite(), Sex::Female);
        assert_eq!(Sex::Female.opposite(), Sex::Male);
    }
}
