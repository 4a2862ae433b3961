//! # Popconv: Population-Genetics Format Codecs
//!
//! A bidirectional codec between an in-memory population model (diploid
//! individuals in subpopulations, loci on chromosomes, one optional
//! ancestral generation) and three line-oriented interchange formats:
//! FSTAT, the LINKAGE `.dat`/`.ped` pair, and a CSV pedigree variant.
//!
//! ## Module Structure
//! ```text
//! popconv
//! ├── data        # In-memory model (loci, individuals, population)
//! ├── io          # Format codecs (FSTAT, LINKAGE, CSV, allele packing,
//! │               #   pedigree derivation)
//! ├── stats       # Allele frequencies, heterozygosity
//! ├── demography  # Size schedules, migration matrices
//! └── utils       # Series aggregation for plotting consumers
//! ```

pub mod config;
pub mod data;
pub mod demography;
pub mod error;
pub mod io;
pub mod stats;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, Format};
pub use data::{Chromosome, ChromIdx, Individual, Locus, LocusIdx, Population, Sex, Subpopulation};
pub use error::{PopconvError, Result};
pub use io::csv::{read_csv, write_csv, CsvOptions};
pub use io::fstat::{read_fstat, write_fstat};
pub use io::linkage::{write_linkage, LinkageOptions};
pub use io::pedigree::{build_pedigrees, Pedigree, PopType};
