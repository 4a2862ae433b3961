//! # Data Module
//!
//! In-memory representation of a diploid population: loci grouped into
//! chromosomes, individuals grouped into subpopulations, and at most one
//! ancestral generation snapshot.
//!
//! ## Design Philosophy
//! - **Zero-cost newtypes:** `ChromIdx` and `LocusIdx` prevent chromosome /
//!   global-locus index mixups at compile time with no runtime overhead.
//! - **Dumb data, smart codecs:** this layer carries accessors and invariant
//!   checks only; all format knowledge lives in `crate::io`.

pub mod individual;
pub mod locus;
pub mod population;

// Re-export commonly used types
pub use individual::{Individual, Sex};
pub use locus::{Chromosome, Locus};
pub use population::{Population, Subpopulation};

/// Chromosome identifier (0-based index into a population's chromosome list)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChromIdx(pub u16);

impl ChromIdx {
    pub fn new(idx: u16) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for ChromIdx {
    fn from(idx: u16) -> Self {
        Self(idx)
    }
}

impl From<usize> for ChromIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u16)
    }
}

impl From<ChromIdx> for usize {
    fn from(idx: ChromIdx) -> usize {
        idx.0 as usize
    }
}

/// Global locus index (0-based, spanning all chromosomes in order)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LocusIdx(pub u32);

impl LocusIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for LocusIdx {
    fn from(idx: u32) -> Self {
        Self(idx)
    }
}

impl From<usize> for LocusIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}

impl From<LocusIdx> for usize {
    fn from(idx: LocusIdx) -> usize {
        idx.0 as usize
    }
}
