//! # Pedigree Derivation
//!
//! Derives family structure (family numbers, parent/offspring links, member
//! numbers) from a population that carries one ancestral generation. Two
//! layouts are supported:
//!
//! - **sibpair**: individuals 2k and 2k+1 of the ancestral generation are
//!   the parents of current-generation individuals 2k and 2k+1. Flat
//!   indexing across subpopulations; the first child of each pair is the
//!   proband.
//! - **by-subpopulation**: each subpopulation is one family. Its ancestral
//!   copy holds the (at most two) parents, its current copy holds all
//!   offspring.
//!
//! Pedigrees are derived values; they are never stored on the population.

use std::str::FromStr;

use tracing::warn;

use crate::data::{Population, Sex};
use crate::error::{PopconvError, Result};

/// Family layout used to derive pedigrees
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopType {
    /// Fixed parent/offspring pairs across the two generations
    Sibpair,
    /// One subpopulation per pedigree
    BySubPop,
}

impl FromStr for PopType {
    type Err = PopconvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sibpair" => Ok(PopType::Sibpair),
            "bySubPop" => Ok(PopType::BySubPop),
            other => Err(PopconvError::value(format!(
                "only popType 'sibpair' and 'bySubPop' are supported, got '{}'",
                other
            ))),
        }
    }
}

/// Which generation and slot a pedigree member's genotype lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberSource {
    /// Parent: subpopulation + index within the ancestral generation
    Ancestral { subpop: usize, index: usize },
    /// Offspring: subpopulation + index within the current generation
    Current { subpop: usize, index: usize },
}

/// One individual within a derived pedigree
#[derive(Clone, Debug)]
pub struct PedMember {
    /// 1-based member number within the family
    pub member: usize,
    /// Member number of the father (0 = absent)
    pub dad: usize,
    /// Member number of the mother (0 = absent)
    pub mom: usize,
    /// Resolved sex (may differ from the stored individual after a
    /// same-sex-parent collision)
    pub sex: Sex,
    /// Affection status (codec-specific integer codes applied at write time)
    pub affected: bool,
    /// True for parents (members with no in-family dad/mom)
    pub is_parent: bool,
    /// True for the proband child
    pub proband: bool,
    /// Where the member's genotype is read from
    pub source: MemberSource,
}

/// A derived family: number plus ordered members (parents first)
#[derive(Clone, Debug)]
pub struct Pedigree {
    /// Family number as emitted in output files; never 0
    pub family: usize,
    pub members: Vec<PedMember>,
}

/// Derive pedigrees from a population with one ancestral generation
pub fn build_pedigrees(pop: &Population, pop_type: PopType) -> Result<Vec<Pedigree>> {
    if pop.ancestral().is_none() {
        return Err(PopconvError::structural(
            "population carries no ancestral generation; cannot derive pedigrees",
        ));
    }
    match pop_type {
        PopType::Sibpair => build_sibpair(pop),
        PopType::BySubPop => build_by_subpop(pop),
    }
}

fn build_sibpair(pop: &Population) -> Result<Vec<Pedigree>> {
    let size = pop.total_size();
    if size % 2 != 0 {
        return Err(PopconvError::structural(format!(
            "sibpair layout requires an even population size, got {}",
            size
        )));
    }
    if pop.ancestral_total_size() != size {
        return Err(PopconvError::structural(format!(
            "sibpair layout requires matching generation sizes, got {} parents for {} offspring",
            pop.ancestral_total_size(),
            size
        )));
    }

    let mut pedigrees = Vec::with_capacity(size / 2);
    for k in 0..size / 2 {
        let par1 = pop.ancestral_individual_at(2 * k);
        let par2 = pop.ancestral_individual_at(2 * k + 1);
        // Dad/mom roles follow parent 1's sex
        let (dad, mom) = if par1.sex == Sex::Male { (1, 2) } else { (2, 1) };
        let off1 = pop.individual_at(2 * k);
        let off2 = pop.individual_at(2 * k + 1);

        let members = vec![
            PedMember {
                member: 1,
                dad: 0,
                mom: 0,
                sex: par1.sex,
                affected: par1.affected,
                is_parent: true,
                proband: false,
                source: flat_ancestral_source(pop, 2 * k),
            },
            PedMember {
                member: 2,
                dad: 0,
                mom: 0,
                sex: par2.sex,
                affected: par2.affected,
                is_parent: true,
                proband: false,
                source: flat_ancestral_source(pop, 2 * k + 1),
            },
            // The first child is always the proband
            PedMember {
                member: 3,
                dad,
                mom,
                sex: off1.sex,
                affected: off1.affected,
                is_parent: false,
                proband: true,
                source: flat_current_source(pop, 2 * k),
            },
            PedMember {
                member: 4,
                dad,
                mom,
                sex: off2.sex,
                affected: off2.affected,
                is_parent: false,
                proband: false,
                source: flat_current_source(pop, 2 * k + 1),
            },
        ];
        pedigrees.push(Pedigree {
            family: k + 1,
            members,
        });
    }
    Ok(pedigrees)
}

fn build_by_subpop(pop: &Population) -> Result<Vec<Pedigree>> {
    let mut pedigrees = Vec::new();
    // Family numbers shift by one as soon as subpopulation 0 contributes a
    // family, so 0 (the no-parent sentinel) never appears as a family number.
    let mut offset = 0;
    for sp in 0..pop.num_subpops() {
        if pop.subpop_size(sp) == 0 {
            continue;
        }
        if sp == 0 {
            offset = 1;
        }
        let n_parents = pop.ancestral_subpop_size(sp);
        if n_parents > 2 {
            return Err(PopconvError::structural(format!(
                "pedigree {} has more than two parents ({})",
                sp, n_parents
            )));
        }

        let mut members = Vec::with_capacity(n_parents + pop.subpop_size(sp));
        let mut par1_sex = None;
        for p in 0..n_parents {
            let parent = pop
                .ancestral_subpop(sp)
                .expect("ancestral presence checked by caller")
                .individual(p);
            let mut sex = parent.sex;
            if p == 1 {
                let first = par1_sex.expect("parent 1 precedes parent 2");
                if sex == first {
                    warn!(pedigree = sp, "same sex parents; flipping second parent's sex");
                    sex = sex.opposite();
                }
            } else {
                par1_sex = Some(sex);
            }
            members.push(PedMember {
                member: p + 1,
                dad: 0,
                mom: 0,
                sex,
                affected: parent.affected,
                is_parent: true,
                proband: false,
                source: MemberSource::Ancestral { subpop: sp, index: p },
            });
        }

        let (dad, mom) = match (n_parents, par1_sex) {
            (0, _) => (0, 0),
            (1, Some(Sex::Male)) => (1, 0),
            (1, _) => (0, 1),
            (_, Some(Sex::Male)) => (1, 2),
            (_, _) => (2, 1),
        };

        for o in 0..pop.subpop_size(sp) {
            let off = pop.individual(sp, o);
            members.push(PedMember {
                member: n_parents + 1 + o,
                dad,
                mom,
                sex: off.sex,
                affected: off.affected,
                is_parent: false,
                proband: o == 0,
                source: MemberSource::Current { subpop: sp, index: o },
            });
        }

        pedigrees.push(Pedigree {
            family: sp + offset,
            members,
        });
    }
    Ok(pedigrees)
}

/// Map a flat ancestral index back to (subpop, index)
fn flat_ancestral_source(pop: &Population, mut idx: usize) -> MemberSource {
    let anc = pop.ancestral().expect("ancestral presence checked by caller");
    for (sp, subpop) in anc.iter().enumerate() {
        if idx < subpop.len() {
            return MemberSource::Ancestral { subpop: sp, index: idx };
        }
        idx -= subpop.len();
    }
    unreachable!("flat ancestral index validated against generation size")
}

/// Map a flat current-generation index back to (subpop, index)
fn flat_current_source(pop: &Population, mut idx: usize) -> MemberSource {
    for sp in 0..pop.num_subpops() {
        if idx < pop.subpop_size(sp) {
            return MemberSource::Current { subpop: sp, index: idx };
        }
        idx -= pop.subpop_size(sp);
    }
    unreachable!("flat index validated against population size")
}

/// Fetch the individual a member's genotype is read from
pub fn resolve_member<'a>(pop: &'a Population, source: MemberSource) -> &'a crate::data::Individual {
    match source {
        MemberSource::Ancestral { subpop, index } => pop
            .ancestral_subpop(subpop)
            .expect("pedigrees are only built over populations with ancestry")
            .individual(index),
        MemberSource::Current { subpop, index } => pop.individual(subpop, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Chromosome, Population, Subpopulation};

    fn pop_with_parents(sizes: &[usize], parent_sizes: &[usize]) -> Population {
        let chroms = vec![Chromosome::synthetic(0, 2)];
        let mut pop = Population::with_layout(chroms, sizes);
        let parents = parent_sizes
            .iter()
            .map(|&n| Subpopulation::new(n, 2))
            .collect();
        pop.set_ancestral(parents).unwrap();
        pop
    }

    #[test]
    fn sibpair_emits_half_as_many_families() {
        let pop = pop_with_parents(&[4], &[4]);
        let peds = build_pedigrees(&pop, PopType::Sibpair).unwrap();
        assert_eq!(peds.len(), 2);
        assert_eq!(peds[0].family, 1);
        assert_eq!(peds[1].family, 2);
        // default sex is male, so parent 1 is dad
        assert_eq!(peds[0].members[2].dad, 1);
        assert_eq!(peds[0].members[2].mom, 2);
        assert!(peds[0].members[2].proband);
        assert!(!peds[0].members[3].proband);
    }

    #[test]
    fn sibpair_rejects_odd_population() {
        let pop = pop_with_parents(&[3], &[3]);
        assert!(matches!(
            build_pedigrees(&pop, PopType::Sibpair),
            Err(PopconvError::Structural { .. })
        ));
    }

    #[test]
    fn by_subpop_never_emits_family_zero() {
        let pop = pop_with_parents(&[2, 3], &[2, 2]);
        let peds = build_pedigrees(&pop, PopType::BySubPop).unwrap();
        assert_eq!(peds.len(), 2);
        assert_eq!(peds[0].family, 1);
        assert_eq!(peds[1].family, 2);
        assert!(peds.iter().all(|p| p.family != 0));
    }

    #[test]
    fn by_subpop_skips_empty_subpops_without_offset() {
        // subpop 0 empty: families keep their subpopulation numbers
        let pop = pop_with_parents(&[0, 2, 2], &[0, 2, 2]);
        let peds = build_pedigrees(&pop, PopType::BySubPop).unwrap();
        assert_eq!(peds.len(), 2);
        assert_eq!(peds[0].family, 1);
        assert_eq!(peds[1].family, 2);
    }

    #[test]
    fn by_subpop_rejects_three_parents() {
        let pop = pop_with_parents(&[2], &[3]);
        assert!(matches!(
            build_pedigrees(&pop, PopType::BySubPop),
            Err(PopconvError::Structural { .. })
        ));
    }

    #[test]
    fn same_sex_parents_are_resolved_by_flipping() {
        // both parents default to male
        let pop = pop_with_parents(&[2], &[2]);
        let peds = build_pedigrees(&pop, PopType::BySubPop).unwrap();
        let parents: Vec<_> = peds[0].members.iter().filter(|m| m.is_parent).collect();
        assert_eq!(parents[0].sex, Sex::Male);
        assert_eq!(parents[1].sex, Sex::Female);
        // offspring link to parent 1 as dad
        let off = peds[0].members.iter().find(|m| !m.is_parent).unwrap();
        assert_eq!((off.dad, off.mom), (1, 2));
    }

    #[test]
    fn lone_female_parent_registers_as_mom() {
        let mut pop = pop_with_parents(&[2], &[1]);
        let mut parents = vec![Subpopulation::new(1, 2)];
        parents[0].individual_mut(0).sex = Sex::Female;
        pop.set_ancestral(parents).unwrap();
        let peds = build_pedigrees(&pop, PopType::BySubPop).unwrap();
        let off = peds[0].members.iter().find(|m| !m.is_parent).unwrap();
        assert_eq!((off.dad, off.mom), (0, 1));
    }

    #[test]
    fn missing_ancestry_is_structural() {
        let chroms = vec![Chromosome::synthetic(0, 1)];
        let pop = Population::with_layout(chroms, &[2]);
        assert!(matches!(
            build_pedigrees(&pop, PopType::Sibpair),
            Err(PopconvError::Structural { .. })
        ));
    }

    #[test]
    fn pop_type_parses() {
        assert_eq!("sibpair".parse::<PopType>().unwrap(), PopType::Sibpair);
        assert_eq!("bySubPop".parse::<PopType>().unwrap(), PopType::BySubPop);
        assert!("trio".parse::<PopType>().is_err());
    }
}
