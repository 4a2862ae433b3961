//! # CSV Pedigree Format
//!
//! One text block per chromosome. A block starts with a header line
//! `Chromosome N,,,` followed by `,name,distance` for each locus, then one
//! comma-separated row per pedigree member:
//! `family,member,sex,affection,a1,a2,...` with the alleles of that
//! chromosome only.
//!
//! Affection code convention here: 1 = affected, 2 = unaffected. This is
//! the opposite of the LINKAGE codec's convention; both match their
//! respective external tools and must not be unified.
//!
//! Decoding takes three passes because locus records are declared in
//! arbitrary order, not genetic-map order:
//! 1. metadata: parse each block header, sort loci by distance and retain
//!    the declared-to-sorted column permutation;
//! 2. sizing: scan the first block's rows to size families (member 1/2 are
//!    parents, anything else offspring; family-number gaps become
//!    zero-sized placeholder families);
//! 3. fill: re-scan every block, writing alleles through the permutation
//!    and tracking the maximum observed allele, then merge parents and
//!    offspring into one population with ancestral depth 1.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::data::{Chromosome, Individual, Locus, Population, Sex, Subpopulation};
use crate::data::{ChromIdx, LocusIdx};
use crate::error::{PopconvError, Result};
use crate::io::pedigree::{build_pedigrees, resolve_member, PopType};

/// Options for the CSV writer
#[derive(Clone, Debug, Default)]
pub struct CsvOptions {
    /// Global locus indices to exclude
    pub exclude: Vec<LocusIdx>,
}

/// Write a population as CSV pedigree blocks, one per chromosome
///
/// Rows follow the sibpair family layout (parents as members 1-2, the two
/// offspring as members 3-4).
pub fn write_csv(pop: &Population, path: &Path, opts: &CsvOptions) -> Result<()> {
    let pedigrees = build_pedigrees(pop, PopType::Sibpair)?;

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    for ch_idx in 0..pop.num_chroms() {
        let ch = ChromIdx::from(ch_idx);
        let begin = pop.chrom_begin(ch).as_usize();
        let included: Vec<usize> = (0..pop.num_loci(ch))
            .filter(|&m| !opts.exclude.contains(&LocusIdx::from(begin + m)))
            .collect();

        write!(out, "Chromosome {},,,", ch_idx + 1)?;
        for &m in &included {
            let locus = pop.chromosome(ch).locus(m);
            // the 1-based locus position stands in when no map distance is set
            let dist = locus.distance.unwrap_or((m + 1) as f64);
            write!(out, ",{},{}", locus.name, dist)?;
        }
        writeln!(out)?;

        for ped in &pedigrees {
            for member in &ped.members {
                let sex_code = match member.sex {
                    Sex::Male => 1,
                    Sex::Female => 2,
                };
                // CSV: 1 = affected, 2 = unaffected
                let aff_code = if member.affected { 1 } else { 2 };
                write!(
                    out,
                    "{:3},{},{},{}",
                    ped.family, member.member, sex_code, aff_code
                )?;
                let ind = resolve_member(pop, member.source);
                for &m in &included {
                    let (a1, a2) = ind.allele_pair(LocusIdx::from(begin + m));
                    write!(out, ",{},{}", a1, a2)?;
                }
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    debug!(path = %path.display(), chroms = pop.num_chroms(), "wrote CSV pedigree file");
    Ok(())
}

/// Per-chromosome metadata recovered in the first decode pass
struct ChromMeta {
    chromosome: Chromosome,
    /// `perm[j]` = declared column position of the locus at sorted
    /// (genetic-order) position `j`
    perm: Vec<usize>,
}

/// Read a population from a CSV pedigree file
pub fn read_csv(path: &Path) -> Result<Population> {
    let text = fs::read_to_string(path)?;
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();

    let metas = metadata_pass(&lines)?;
    if metas.is_empty() {
        return Err(PopconvError::format("no chromosome blocks found"));
    }
    let (par_sizes, off_sizes) = sizing_pass(&lines)?;
    fill_pass(&lines, metas, &par_sizes, &off_sizes)
}

fn is_header(line: &str) -> bool {
    line.starts_with("Chromosome")
}

/// Pass 1: locus counts, names and distances per block header, with loci
/// re-sorted into genetic-map order
fn metadata_pass(lines: &[(usize, &str)]) -> Result<Vec<ChromMeta>> {
    let mut metas = Vec::new();
    for &(line_no, line) in lines {
        if !is_header(line) {
            continue;
        }
        let cols: Vec<&str> = line.split(',').collect();
        if cols.len() < 4 || (cols.len() - 4) % 2 != 0 {
            return Err(PopconvError::parse(
                line_no,
                "chromosome header does not pair locus names with distances",
            ));
        }
        let n = (cols.len() - 4) / 2;
        let mut names = Vec::with_capacity(n);
        let mut dists = Vec::with_capacity(n);
        for j in 0..n {
            let name = cols[4 + 2 * j].trim();
            if name.is_empty() {
                return Err(PopconvError::parse(line_no, "empty locus name"));
            }
            let dist: f64 = cols[5 + 2 * j].trim().parse().map_err(|_| {
                PopconvError::parse(
                    line_no,
                    format!("locus distance '{}' is not a number", cols[5 + 2 * j].trim()),
                )
            })?;
            names.push(name.to_string());
            dists.push(dist);
        }

        // Stable argsort by distance: declared position of each
        // genetic-order slot
        let mut perm: Vec<usize> = (0..n).collect();
        perm.sort_by(|&a, &b| dists[a].partial_cmp(&dists[b]).unwrap_or(std::cmp::Ordering::Equal));

        let loci: Vec<Locus> = perm
            .iter()
            .map(|&src| Locus::with_distance(names[src].clone(), dists[src]))
            .collect();
        metas.push(ChromMeta {
            chromosome: Chromosome::new(loci),
            perm,
        });
    }
    Ok(metas)
}

/// Pass 2: family sizes from the first chromosome block only
///
/// Index 0 is a permanent zero-sized placeholder, so family numbers map
/// directly onto subpopulation indices.
fn sizing_pass(lines: &[(usize, &str)]) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut par_sizes = vec![0usize];
    let mut off_sizes = vec![0usize];
    let mut in_first_block = false;
    for &(line_no, line) in lines {
        if is_header(line) {
            if in_first_block {
                break;
            }
            in_first_block = true;
            continue;
        }
        if !in_first_block {
            return Err(PopconvError::parse(line_no, "data row before any chromosome header"));
        }
        let (fam, mem) = family_and_member(line_no, line)?;
        if fam >= par_sizes.len() {
            par_sizes.resize(fam + 1, 0);
            off_sizes.resize(fam + 1, 0);
        }
        if mem == 1 || mem == 2 {
            par_sizes[fam] += 1;
        } else {
            off_sizes[fam] += 1;
        }
    }
    Ok((par_sizes, off_sizes))
}

fn family_and_member(line_no: usize, line: &str) -> Result<(usize, usize)> {
    let mut cols = line.split(',');
    let fam = cols
        .next()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .ok_or_else(|| PopconvError::parse(line_no, "family column is not a number"))?;
    let mem = cols
        .next()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .ok_or_else(|| PopconvError::parse(line_no, "member column is not a number"))?;
    Ok((fam, mem))
}

/// Pass 3: fill genotypes, sex and affection through each chromosome's
/// column permutation, then merge parents and offspring
fn fill_pass(
    lines: &[(usize, &str)],
    metas: Vec<ChromMeta>,
    par_sizes: &[usize],
    off_sizes: &[usize],
) -> Result<Population> {
    let chromosomes: Vec<Chromosome> = metas.iter().map(|m| m.chromosome.clone()).collect();
    let n_loci_total: usize = chromosomes.iter().map(|c| c.len()).sum();
    let chrom_offsets: Vec<usize> = chromosomes
        .iter()
        .scan(0usize, |acc, c| {
            let begin = *acc;
            *acc += c.len();
            Some(begin)
        })
        .collect();

    let mut parents: Vec<Subpopulation> = par_sizes
        .iter()
        .map(|&n| Subpopulation::new(n, n_loci_total))
        .collect();
    let mut offspring: Vec<Subpopulation> = off_sizes
        .iter()
        .map(|&n| Subpopulation::new(n, n_loci_total))
        .collect();

    let mut max_allele = 0u32;
    let mut ch: Option<usize> = None;
    let (mut cur_fam, mut cur_par, mut cur_off) = (0usize, 0usize, 0usize);

    for &(line_no, line) in lines {
        if is_header(line) {
            ch = Some(ch.map_or(0, |c| c + 1));
            cur_fam = 0;
            cur_par = 0;
            cur_off = 0;
            continue;
        }
        let ch = ch
            .ok_or_else(|| PopconvError::parse(line_no, "data row before any chromosome header"))?;
        let meta = &metas[ch];
        let n_loci = meta.chromosome.len();

        let cols: Vec<&str> = line.split(',').collect();
        if cols.len() < 4 + 2 * n_loci {
            return Err(PopconvError::parse(
                line_no,
                format!(
                    "expected {} allele columns for chromosome {}, got {}",
                    2 * n_loci,
                    ch + 1,
                    cols.len().saturating_sub(4)
                ),
            ));
        }
        let (fam, mem) = family_and_member(line_no, line)?;
        if fam >= parents.len() {
            return Err(PopconvError::format(format!(
                "line {}: family {} was not present in the first chromosome block",
                line_no, fam
            )));
        }
        let sex_code: u32 = parse_col(line_no, cols[2], "sex")?;
        let aff_code: u32 = parse_col(line_no, cols[3], "affection")?;
        let alleles: Vec<u32> = cols[4..4 + 2 * n_loci]
            .iter()
            .map(|c| parse_col(line_no, c, "allele"))
            .collect::<Result<_>>()?;

        if fam != cur_fam {
            cur_fam = fam;
            cur_par = 0;
            cur_off = 0;
        }
        let ind: &mut Individual = if mem == 1 || mem == 2 {
            if cur_par >= parents[fam].len() {
                return Err(PopconvError::format(format!(
                    "line {}: family {} has more parent rows than the first block declared",
                    line_no, fam
                )));
            }
            let ind = parents[fam].individual_mut(cur_par);
            cur_par += 1;
            ind
        } else {
            if cur_off >= offspring[fam].len() {
                return Err(PopconvError::format(format!(
                    "line {}: family {} has more offspring rows than the first block declared",
                    line_no, fam
                )));
            }
            let ind = offspring[fam].individual_mut(cur_off);
            cur_off += 1;
            ind
        };

        // File columns are in declared order; the genotype vector is in
        // genetic order, so route each sorted slot through the permutation.
        for loc in 0..n_loci {
            let src = meta.perm[loc];
            let a1 = alleles[2 * src];
            let a2 = alleles[2 * src + 1];
            ind.set_allele_pair(LocusIdx::from(chrom_offsets[ch] + loc), a1, a2);
        }
        ind.sex = if sex_code == 1 { Sex::Male } else { Sex::Female };
        ind.affected = aff_code == 1;
        max_allele = max_allele.max(alleles.iter().copied().max().unwrap_or(0));
    }

    let mut pop = Population::from_subpopulations(chromosomes, offspring)?;
    pop.set_ancestral(parents)?;
    pop.set_max_allele(max_allele);
    debug!(
        subpops = pop.num_subpops(),
        loci = pop.total_loci(),
        "read CSV pedigree file"
    );
    Ok(pop)
}

fn parse_col(line_no: usize, col: &str, what: &str) -> Result<u32> {
    col.trim()
        .parse()
        .map_err(|_| PopconvError::parse(line_no, format!("{} column '{}' is not a number", what, col.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_for(header: &str) -> ChromMeta {
        let lines = vec![(1usize, header)];
        metadata_pass(&lines).unwrap().remove(0)
    }

    #[test]
    fn metadata_sorts_loci_by_distance() {
        let meta = meta_for("Chromosome 1,,,,locus1_2,5.0,locus1_1,1.0");
        assert_eq!(meta.chromosome.len(), 2);
        assert_eq!(meta.chromosome.locus(0).name, "locus1_1");
        assert_eq!(meta.chromosome.locus(0).distance, Some(1.0));
        assert_eq!(meta.chromosome.locus(1).name, "locus1_2");
        // sorted slot 0 reads from declared column 1
        assert_eq!(meta.perm, vec![1, 0]);
    }

    #[test]
    fn metadata_rejects_unpaired_header() {
        let lines = vec![(1usize, "Chromosome 1,,,,locus1_1")];
        assert!(matches!(
            metadata_pass(&lines),
            Err(PopconvError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn sizing_counts_only_first_block_and_fills_gaps() {
        let lines: Vec<(usize, &str)> = vec![
            (1, "Chromosome 1,,,,l1,1"),
            (2, "  1,1,1,2,3,3"),
            (3, "  1,2,2,2,3,3"),
            (4, "  1,3,1,1,3,3"),
            (5, "  3,3,2,1,3,3"),
            (6, "Chromosome 2,,,,l2,1"),
            (7, "  1,1,1,2,3,3"),
        ];
        let (par, off) = sizing_pass(&lines).unwrap();
        assert_eq!(par, vec![0, 2, 0, 0]);
        assert_eq!(off, vec![0, 1, 0, 1]);
    }
}
