//! # Locus and Chromosome Definitions
//!
//! A `Locus` is a named genomic position with an optional genetic map
//! distance (cM). A `Chromosome` is an ordered sequence of loci; ordering is
//! by genetic position for LINKAGE output, while the CSV reader accepts
//! out-of-order declarations and sorts them itself.

/// A single locus: name plus optional genetic map distance.
#[derive(Clone, Debug, PartialEq)]
pub struct Locus {
    /// Locus name. Must be non-empty and unique within its chromosome.
    pub name: String,
    /// Genetic map distance (cM), if known.
    pub distance: Option<f64>,
}

impl Locus {
    /// Create a named locus with no map distance
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            distance: None,
        }
    }

    /// Create a named locus at a genetic map distance
    pub fn with_distance(name: impl Into<String>, distance: f64) -> Self {
        Self {
            name: name.into(),
            distance: Some(distance),
        }
    }
}

/// An ordered sequence of loci. Chromosome indices are 0-based and stable
/// for the lifetime of a `Population`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chromosome {
    loci: Vec<Locus>,
}

impl Chromosome {
    /// Create a chromosome from an ordered locus list
    pub fn new(loci: Vec<Locus>) -> Self {
        Self { loci }
    }

    /// Create a chromosome of `n` synthetic loci named `locus{ch+1}_{m+1}`
    ///
    /// Used when a format (FSTAT without parseable names) gives counts but
    /// no usable naming.
    pub fn synthetic(chrom_idx: usize, n: usize) -> Self {
        let loci = (0..n)
            .map(|m| Locus::new(format!("locus{}_{}", chrom_idx + 1, m + 1)))
            .collect();
        Self { loci }
    }

    /// Number of loci on this chromosome
    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    /// Locus at a 0-based position within this chromosome
    pub fn locus(&self, m: usize) -> &Locus {
        &self.loci[m]
    }

    /// Iterate over loci in order
    pub fn loci(&self) -> impl Iterator<Item = &Locus> {
        self.loci.iter()
    }
}
