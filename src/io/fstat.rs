//! # FSTAT Format
//!
//! Read/write the FSTAT text format: a header line
//! `numSubPops numLoci maxAllele digitWidth`, one locus-name line per locus,
//! then one line per individual holding the 1-based subpopulation number and
//! one fixed-width genotype code per locus.
//!
//! FSTAT carries no chromosome structure. On read, either the caller
//! supplies per-chromosome locus counts, or the reader pattern-matches each
//! locus name against `<nonDigits><chrom><nonDigits><locus>`; if the matched
//! counts do not add up, all loci collapse into a single chromosome.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::data::{Chromosome, Locus, Population};
use crate::error::{PopconvError, Result};
use crate::io::allele_code::{digit_width, pack, unpack};

/// Write a population to an FSTAT file
///
/// Capacity advisories (FSTAT 2.93 limits: 200 samples, 100 loci, 999
/// alleles) are warnings, not errors.
pub fn write_fstat(pop: &Population, path: &Path) -> Result<()> {
    let np = pop.num_subpops();
    let nl = pop.total_loci();
    let nu = if pop.max_allele() > 0 {
        pop.max_allele()
    } else {
        pop.observed_max_allele()
    };
    if np > 200 {
        warn!(subpops = np, "FSTAT cannot handle more than 200 samples");
    }
    if nl > 100 {
        warn!(loci = nl, "FSTAT cannot handle more than 100 loci");
    }
    if nu > 999 {
        warn!(
            max_allele = nu,
            "FSTAT cannot handle more than 999 alleles at each locus"
        );
    }
    let nd = digit_width(nu);

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{} {} {} {}", np, nl, nu, nd)?;
    for locus in pop.loci() {
        writeln!(out, "{}", locus.name)?;
    }
    for sp in 0..np {
        for ind in pop.subpop(sp).iter() {
            write!(out, "{}", sp + 1)?;
            for loc in 0..nl {
                let (a1, a2) = ind.allele_pair(loc.into());
                write!(out, " {}", pack(a1, a2, nd))?;
            }
            writeln!(out)?;
        }
    }
    out.flush()?;
    debug!(path = %path.display(), subpops = np, loci = nl, "wrote FSTAT file");
    Ok(())
}

/// Read a population from an FSTAT file
///
/// `loci_per_chrom`, when given, imposes a chromosome structure; its sum
/// must equal the header's locus count. Otherwise the structure is inferred
/// from the locus names (see module docs).
pub fn read_fstat(path: &Path, loci_per_chrom: Option<&[usize]>) -> Result<Population> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .ok_or_else(|| PopconvError::parse(1, "empty file"))??;
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(PopconvError::parse(
            1,
            "the first line does not have 4 numbers; is this an FSTAT file?",
        ));
    }
    let nums: Vec<usize> = fields
        .iter()
        .map(|f| f.parse())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| {
            PopconvError::parse(1, "the first line does not have 4 numbers; is this an FSTAT file?")
        })?;
    let (np, nl, nd) = (nums[0], nums[1], nums[3]);
    let nu = u32::try_from(nums[2]).map_err(|_| {
        PopconvError::parse(1, format!("maximum allele value {} does not fit 32 bits", nums[2]))
    })?;

    let mut names = Vec::with_capacity(nl);
    for i in 0..nl {
        let line = lines
            .next()
            .ok_or_else(|| PopconvError::parse(2 + i, "missing locus name line"))??;
        names.push(line.trim().to_string());
    }

    let counts = match loci_per_chrom {
        Some(counts) => {
            if counts.iter().sum::<usize>() != nl {
                return Err(PopconvError::value(format!(
                    "given loci counts sum to {}, file declares {} loci",
                    counts.iter().sum::<usize>(),
                    nl
                )));
            }
            counts.to_vec()
        }
        None => infer_locus_layout(&names, nl),
    };

    // Genotype rows: 1-based subpopulation column must be contiguous and
    // ascending; sizes are recovered by counting.
    let mut sizes: Vec<usize> = Vec::new();
    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    let mut line_no = 1 + nl;
    for line in lines {
        let line = line?;
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace().map(str::to_string);
        let sp: usize = tokens
            .next()
            .ok_or_else(|| PopconvError::parse(line_no, "missing subpopulation column"))?
            .parse()
            .map_err(|_| PopconvError::parse(line_no, "subpopulation column is not a number"))?;
        if sp == 0 || sp < sizes.len() || sp > sizes.len() + 1 {
            return Err(PopconvError::parse(
                line_no,
                format!("subpopulation numbers must ascend contiguously from 1, got {}", sp),
            ));
        }
        if sp == sizes.len() + 1 {
            sizes.push(0);
        }
        sizes[sp - 1] += 1;
        let codes: Vec<String> = tokens.collect();
        if codes.len() != nl {
            return Err(PopconvError::parse(
                line_no,
                format!("expected {} genotype codes, got {}", nl, codes.len()),
            ));
        }
        rows.push((line_no, codes));
    }

    if sizes.len() != np {
        return Err(PopconvError::format(format!(
            "computed {} subpopulations, header declares {}",
            sizes.len(),
            np
        )));
    }
    debug_assert_eq!(sizes.iter().sum::<usize>(), rows.len());

    let chromosomes = build_chromosomes(&names, &counts);
    let mut pop = Population::with_layout(chromosomes, &sizes);

    let mut max_observed = 0u32;
    let mut row_iter = rows.into_iter();
    for sp in 0..np {
        for idx in 0..pop.subpop_size(sp) {
            let (row_line, codes) = row_iter.next().expect("row count was validated");
            for (loc, code) in codes.iter().enumerate() {
                // Tolerate codes written without leading zeros
                let padded = if code.len() < 2 * nd {
                    format!("{:0>w$}", code, w = 2 * nd)
                } else {
                    code.clone()
                };
                let (a1, a2) = unpack(&padded, nd).map_err(|e| match e {
                    PopconvError::Format { message } => PopconvError::parse(row_line, message),
                    other => other,
                })?;
                max_observed = max_observed.max(a1).max(a2);
                pop.individual_mut(sp, idx).set_allele_pair(loc.into(), a1, a2);
            }
        }
    }

    pop.set_max_allele(max_observed.max(nu));
    debug!(
        path = %path.display(),
        subpops = np,
        loci = nl,
        "read FSTAT file"
    );
    Ok(pop)
}

/// Infer per-chromosome locus counts from locus names
///
/// Each name is matched against `<nonDigits><chrom><nonDigits><locus>`; the
/// locus number of the last matching name of a chromosome becomes that
/// chromosome's count. If the counts do not add up to `nl`, all loci
/// collapse into one chromosome.
fn infer_locus_layout(names: &[String], nl: usize) -> Vec<usize> {
    let mut counts: Vec<usize> = Vec::new();
    for name in names {
        if let Some((ch, loc)) = scan_chrom_locus(name) {
            if ch == counts.len() + 1 {
                counts.push(loc);
            } else if ch >= 1 && ch <= counts.len() {
                counts[ch - 1] = loc;
            }
            // out-of-order chromosome numbers are ignored; the sum check
            // below catches anything inconsistent
        }
    }
    if counts.iter().sum::<usize>() == nl {
        counts
    } else {
        vec![nl]
    }
}

/// Match a locus name against `\D*(\d+)\D*(\d+)`, returning the two numbers
fn scan_chrom_locus(name: &str) -> Option<(usize, usize)> {
    let mut rest = name.trim_start_matches(|c: char| !c.is_ascii_digit());
    let first_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let first: usize = rest[..first_end].parse().ok()?;
    rest = rest[first_end..].trim_start_matches(|c: char| !c.is_ascii_digit());
    let second_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let second: usize = rest[..second_end].parse().ok()?;
    Some((first, second))
}

fn build_chromosomes(names: &[String], counts: &[usize]) -> Vec<Chromosome> {
    let mut chromosomes = Vec::with_capacity(counts.len());
    let mut offset = 0;
    for &n in counts {
        let loci = names[offset..offset + n]
            .iter()
            .map(|name| Locus::new(name.clone()))
            .collect();
        chromosomes.push(Chromosome::new(loci));
        offset += n;
    }
    chromosomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_matches_name_patterns() {
        assert_eq!(scan_chrom_locus("locus2_3"), Some((2, 3)));
        assert_eq!(scan_chrom_locus("ch10loc4"), Some((10, 4)));
        assert_eq!(scan_chrom_locus("12-7suffix"), Some((12, 7)));
        assert_eq!(scan_chrom_locus("marker"), None);
        assert_eq!(scan_chrom_locus("locus5"), None);
    }

    #[test]
    fn layout_inference_uses_last_locus_number() {
        let names: Vec<String> = ["locus1_1", "locus1_2", "locus2_1", "locus2_1b3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // chromosome 2's last matching name gives locus number 1, then 1
        // again from the fourth name; 2 + 1 != 4, so fall back
        assert_eq!(infer_locus_layout(&names, 4), vec![4]);

        let names: Vec<String> = ["locus1_1", "locus1_2", "locus2_1", "locus2_2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(infer_locus_layout(&names, 4), vec![2, 2]);
    }

    #[test]
    fn unparseable_names_collapse_to_one_chromosome() {
        let names: Vec<String> = ["alpha", "beta", "gamma"].iter().map(|s| s.to_string()).collect();
        assert_eq!(infer_locus_layout(&names, 3), vec![3]);
    }
}
