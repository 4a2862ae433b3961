//! # I/O Module
//!
//! Format codecs: conversions between the in-memory `Population` model and
//! the line-oriented interchange formats (FSTAT, LINKAGE, CSV pedigree).
//!
//! Codecs never call each other; `allele_code` and `pedigree` are shared
//! pure helpers. All operations are synchronous and single-threaded: each
//! call reads or writes its files completely and allocates fresh output
//! structures. Callers must serialize concurrent writes to the same path.

pub mod allele_code;
pub mod csv;
pub mod fstat;
pub mod linkage;
pub mod pedigree;
