//! # Configuration Logic
//!
//! CLI argument parsing and validation for the converter binary.
//!
//! ## Example CLI
//! ```bash
//! # FSTAT -> LINKAGE pair (out.dat / out.ped)
//! popconv --input pop.dat --from fstat --to linkage --out out --pop-type sibpair
//!
//! # CSV -> FSTAT
//! popconv --input fam.csv --from csv --to fstat --out pop.fstat
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::{PopconvError, Result};
use crate::io::pedigree::PopType;

/// Interchange formats the converter understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// FSTAT genotype table
    Fstat,
    /// LINKAGE .dat/.ped pair (write only)
    Linkage,
    /// CSV pedigree blocks
    Csv,
}

/// Convert population-genetics data between FSTAT, LINKAGE and CSV pedigree
/// formats
#[derive(Debug, Parser)]
#[command(name = "popconv", version)]
pub struct Config {
    /// Input file
    #[arg(long)]
    pub input: PathBuf,

    /// Input format
    #[arg(long, value_enum)]
    pub from: Format,

    /// Output path (base path without suffix for LINKAGE output)
    #[arg(long)]
    pub out: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    pub to: Format,

    /// Family layout for pedigree output: "sibpair" or "bySubPop"
    #[arg(long, default_value = "sibpair")]
    pub pop_type: String,

    /// Per-chromosome locus counts for FSTAT input (sum must match the file)
    #[arg(long, value_delimiter = ',')]
    pub loci: Option<Vec<usize>>,

    /// Global locus indices to exclude from pedigree output
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<u32>,

    /// Recombination fraction between consecutive loci (LINKAGE output)
    #[arg(long, default_value_t = 0.001)]
    pub recombination: f64,

    /// Disease-allele frequency for the affection-status locus (LINKAGE)
    #[arg(long, default_value_t = 0.001)]
    pub daf: f64,

    /// Emit the full makeped-style pedigree layout instead of the short
    /// pre-makeped one (LINKAGE output)
    #[arg(long)]
    pub makeped: bool,
}

impl Config {
    /// Parse arguments from the process command line and validate them
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation beyond what clap can express
    pub fn validate(&self) -> Result<()> {
        if self.from == Format::Linkage {
            return Err(PopconvError::value(
                "LINKAGE input is not supported; only encoding exists for the .dat/.ped pair",
            ));
        }
        if self.out.as_os_str().is_empty() {
            return Err(PopconvError::value("please specify an output path"));
        }
        self.pop_type()?;
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(PopconvError::value(
                "recombination fraction must be between 0 and 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.daf) {
            return Err(PopconvError::value(
                "disease allele frequency must be between 0 and 1",
            ));
        }
        Ok(())
    }

    /// Parsed family layout
    pub fn pop_type(&self) -> Result<PopType> {
        self.pop_type.parse()
    }
}
