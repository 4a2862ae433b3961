//! # Population Statistics
//!
//! Per-locus allele-frequency tables and heterozygosity, computed over the
//! current generation. The LINKAGE writer falls back to these sample
//! frequencies when the caller supplies none; everything heavier (Fst and
//! friends) is out of scope and expected from an external provider.

use crate::data::{LocusIdx, Population};

/// Sample allele frequencies for every locus
///
/// Entry `l` is indexed by allele value: `freq[l][a]` is the frequency of
/// allele `a` at global locus `l` over all current-generation allele copies
/// (missing alleles count toward slot 0). Each table has
/// `max observed allele + 1` entries, at least 2.
pub fn allele_frequencies(pop: &Population) -> Vec<Vec<f64>> {
    let n_loci = pop.total_loci();
    let mut tables = Vec::with_capacity(n_loci);
    let n_copies = (2 * pop.total_size()) as f64;
    for l in 0..n_loci {
        let locus = LocusIdx::from(l);
        let mut counts: Vec<u64> = vec![0; 2];
        for ind in pop.individuals() {
            for copy in 0..2 {
                let a = ind.allele(locus, copy) as usize;
                if a >= counts.len() {
                    counts.resize(a + 1, 0);
                }
                counts[a] += 1;
            }
        }
        let table = if n_copies == 0.0 {
            vec![0.0; counts.len()]
        } else {
            counts.iter().map(|&c| c as f64 / n_copies).collect()
        };
        tables.push(table);
    }
    tables
}

/// Observed heterozygosity: fraction of current-generation individuals
/// carrying two different non-missing alleles at the locus
pub fn observed_heterozygosity(pop: &Population, locus: LocusIdx) -> f64 {
    let n = pop.total_size();
    if n == 0 {
        return 0.0;
    }
    let het = pop
        .individuals()
        .filter(|ind| {
            let (a1, a2) = ind.allele_pair(locus);
            a1 != 0 && a2 != 0 && a1 != a2
        })
        .count();
    het as f64 / n as f64
}

/// Expected heterozygosity under Hardy-Weinberg: `1 - sum(p_a^2)` over
/// non-missing alleles, with frequencies renormalized to exclude slot 0
pub fn expected_heterozygosity(pop: &Population, locus: LocusIdx) -> f64 {
    let mut counts: Vec<u64> = Vec::new();
    let mut total = 0u64;
    for ind in pop.individuals() {
        for copy in 0..2 {
            let a = ind.allele(locus, copy) as usize;
            if a == 0 {
                continue;
            }
            if a >= counts.len() {
                counts.resize(a + 1, 0);
            }
            counts[a] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p
        })
        .sum();
    1.0 - sum_sq
}
