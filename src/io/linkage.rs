//! # LINKAGE Format
//!
//! Writes the LINKAGE `.dat`/`.ped` file pair. The `.dat` file carries locus
//! metadata: locus count (including one synthetic affection-status locus),
//! per-locus allele frequencies and recombination fractions, with 0.5
//! inserted between chromosomes. The `.ped` file carries one line per
//! pedigree member.
//!
//! With `pre: true` the pedigree lines use the short pre-`makeped` layout
//! (no offspring/sibling link fields); otherwise the full linked-list layout
//! is emitted, with the link fields hardcoded to the two-offspring sibpair
//! shape LINKAGE's `makeped` expects.
//!
//! Affection code convention here: 1 = unaffected, 2 = affected. This is
//! the opposite of the CSV codec's convention; both match their respective
//! external tools and must not be unified.
//!
//! No decoder exists for this pair; only encoding was ever supported.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::data::{ChromIdx, LocusIdx, Population, Sex};
use crate::error::{PopconvError, Result};
use crate::io::pedigree::{build_pedigrees, resolve_member, PopType};
use crate::stats;

/// Options for the LINKAGE writer
#[derive(Clone, Debug)]
pub struct LinkageOptions {
    /// Family layout used to derive the pedigree file
    pub pop_type: PopType,
    /// Per-locus allele-frequency tables, indexed by allele value. When
    /// `None`, sample frequencies are computed from the population (with a
    /// warning).
    pub allele_freq: Option<Vec<Vec<f64>>>,
    /// Recombination fraction between consecutive loci
    pub recombination: f64,
    /// Chromosomes to save (`None` = all)
    pub chroms: Option<Vec<ChromIdx>>,
    /// Global locus indices to exclude
    pub exclude: Vec<LocusIdx>,
    /// Emit the short pre-`makeped` pedigree layout
    pub pre: bool,
    /// Disease-allele frequency for the synthetic affection-status locus
    pub daf: f64,
}

impl Default for LinkageOptions {
    fn default() -> Self {
        Self {
            pop_type: PopType::Sibpair,
            allele_freq: None,
            recombination: 0.001,
            chroms: None,
            exclude: Vec::new(),
            pre: true,
            daf: 0.001,
        }
    }
}

/// Write a population as a LINKAGE `.dat`/`.ped` pair under `base`
///
/// `base` is extended with the `.dat` and `.ped` suffixes; the two files are
/// always produced together.
pub fn write_linkage(pop: &Population, base: &Path, opts: &LinkageOptions) -> Result<()> {
    let chs: Vec<ChromIdx> = match &opts.chroms {
        Some(chs) => chs.clone(),
        None => (0..pop.num_chroms()).map(ChromIdx::from).collect(),
    };

    // Included markers per selected chromosome, in genetic order
    let mut markers: Vec<Vec<LocusIdx>> = Vec::with_capacity(chs.len());
    for &ch in &chs {
        let begin = pop.chrom_begin(ch).as_usize();
        let end = pop.chrom_end(ch).as_usize();
        let included = (begin..end)
            .map(LocusIdx::from)
            .filter(|m| !opts.exclude.contains(m))
            .collect();
        markers.push(included);
    }
    let n_included: usize = markers.iter().map(|m| m.len()).sum();

    let freqs = match &opts.allele_freq {
        Some(tables) => {
            if tables.len() != pop.total_loci() {
                return Err(PopconvError::value(format!(
                    "allele frequency table covers {} loci, population has {}",
                    tables.len(),
                    pop.total_loci()
                )));
            }
            if tables.iter().any(|t| t.len() < 2) {
                return Err(PopconvError::value(
                    "each allele frequency table needs at least two entries",
                ));
            }
            tables.clone()
        }
        None => {
            warn!("no allele frequencies given; using sample allele frequency");
            stats::allele_frequencies(pop)
        }
    };

    // Derive pedigrees before opening any file, so structural failures
    // leave nothing on disk.
    let pedigrees = build_pedigrees(pop, opts.pop_type)?;

    write_dat(pop, &suffixed(base, ".dat"), opts, &chs, &markers, n_included, &freqs)?;
    write_ped(pop, &suffixed(base, ".ped"), opts, &markers, &pedigrees)?;
    debug!(
        base = %base.display(),
        pedigrees = pedigrees.len(),
        loci = n_included,
        "wrote LINKAGE pair"
    );
    Ok(())
}

fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[allow(clippy::too_many_arguments)]
fn write_dat(
    pop: &Population,
    path: &Path,
    opts: &LinkageOptions,
    chs: &[ChromIdx],
    markers: &[Vec<LocusIdx>],
    n_included: usize,
    freqs: &[Vec<f64>],
) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    // Locus count includes the synthetic affection-status locus
    writeln!(out, "{} 0 0 5 << nlocus, risklocus, sexlink, nprogram", n_included + 1)?;
    writeln!(out, "0 0 0 0 << mutsys, mutmale, mutfemale, disequil")?;
    let order: Vec<String> = (1..=n_included).map(|m| m.to_string()).collect();
    writeln!(out, "{} << order of loci", order.join(" "))?;

    // The affection-status locus
    writeln!(out, "1 2 << affection status code, number of alleles")?;
    writeln!(out, "{:.6} {:.6} << gene frequency", 1.0 - opts.daf, opts.daf)?;
    writeln!(out, "1 << number of factors")?;
    writeln!(out, "0 0.4 .8 << penetrance")?;

    // Numbered-allele loci with their frequencies
    for included in markers {
        for &marker in included {
            let table = &freqs[marker.as_usize()];
            let n_alleles = table.len() - 1;
            writeln!(
                out,
                "3 {} << numbered alleles code, total number of alleles",
                n_alleles
            )?;
            let freq_fields: Vec<String> =
                table[1..].iter().map(|f| format!("{:.6}", f)).collect();
            writeln!(out, "{} << gene frequencies", freq_fields.join(" "))?;
        }
    }

    writeln!(out, "0 0 << sex difference, interference")?;

    // Recombination fractions: one leading entry for the affection-status
    // locus, then between consecutive included loci, 0.5 across chromosomes
    let mut rec_fields = vec![format!("{}", opts.recombination)];
    for (i, &ch) in chs.iter().enumerate() {
        let begin = pop.chrom_begin(ch).as_usize();
        for m in 1..pop.num_loci(ch) {
            if !opts.exclude.contains(&LocusIdx::from(begin + m)) {
                rec_fields.push(format!("{:.6}", opts.recombination));
            }
        }
        if i + 1 != chs.len() {
            rec_fields.push("0.5".to_string());
        }
    }
    writeln!(out, "{} << recombination rates", rec_fields.join(" "))?;
    writeln!(out, "1 0.1 0.1")?;
    out.flush()?;
    Ok(())
}

fn write_ped(
    pop: &Population,
    path: &Path,
    opts: &LinkageOptions,
    markers: &[Vec<LocusIdx>],
    pedigrees: &[crate::io::pedigree::Pedigree],
) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    for ped in pedigrees {
        for member in &ped.members {
            let sex_code = match member.sex {
                Sex::Male => 1,
                Sex::Female => 2,
            };
            // LINKAGE: 1 = unaffected, 2 = affected
            let aff_code = if member.affected { 2 } else { 1 };

            if opts.pre {
                write!(
                    out,
                    "{:3} {} {} {} {} {}",
                    ped.family, member.member, member.dad, member.mom, sex_code, aff_code
                )?;
            } else {
                // makeped-style link fields, hardcoded to the two-offspring
                // sibpair shape
                let (first_off, next_pat, next_mat) = if member.is_parent {
                    (3, 0, 0)
                } else {
                    match opts.pop_type {
                        PopType::Sibpair if !member.proband => (0, 0, 0),
                        _ => (0, 4, 4),
                    }
                };
                let proband_field = if member.is_parent {
                    0
                } else {
                    match opts.pop_type {
                        PopType::Sibpair => usize::from(member.proband),
                        PopType::BySubPop => 1,
                    }
                };
                write!(
                    out,
                    "{:3} {} {} {} {} {} {} {} {} {}",
                    ped.family,
                    member.member,
                    member.dad,
                    member.mom,
                    first_off,
                    next_pat,
                    next_mat,
                    sex_code,
                    proband_field,
                    aff_code
                )?;
            }

            let ind = resolve_member(pop, member.source);
            for included in markers {
                for &marker in included {
                    let (a1, a2) = ind.allele_pair(marker);
                    write!(out, " {} {}", a1, a2)?;
                }
            }
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
