//! # Fixed-Width Allele Packing
//!
//! FSTAT stores a diploid genotype as one decimal code: each allele is
//! zero-padded to a fixed digit width and the two halves are concatenated.
//! The width is derived from the population's maximum-allele bound so that
//! every in-range allele round-trips without truncation.
//!
//! A missing genotype (either allele 0) collapses to the all-zero code; the
//! sentinel absorbs the pair, so `(0, x)` decodes as `(0, 0)`.

use crate::error::{PopconvError, Result};

/// Number of decimal digits needed to encode one allele in `[0, max_allele]`
pub fn digit_width(max_allele: u32) -> usize {
    if max_allele < 10 {
        1
    } else if max_allele < 100 {
        2
    } else if max_allele < 1000 {
        3
    } else {
        // FSTAT itself caps at 999; wider alleles still get a lossless width
        max_allele.to_string().len()
    }
}

/// Pack an allele pair into a fixed-width decimal code of `2 * width` digits
///
/// If either allele is 0 (missing), the whole code is zero.
pub fn pack(a1: u32, a2: u32, width: usize) -> String {
    if a1 == 0 || a2 == 0 {
        "0".repeat(2 * width)
    } else {
        format!("{:0w$}{:0w$}", a1, a2, w = width)
    }
}

/// Split a fixed-width decimal code back into its allele pair
///
/// Fails if the code is not exactly `2 * width` ASCII digits.
pub fn unpack(code: &str, width: usize) -> Result<(u32, u32)> {
    if code.len() != 2 * width {
        return Err(PopconvError::format(format!(
            "genotype code '{}' is {} characters, expected {}",
            code,
            code.len(),
            2 * width
        )));
    }
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PopconvError::format(format!(
            "genotype code '{}' contains non-digit characters",
            code
        )));
    }
    let (first, second) = code.split_at(width);
    let a1: u32 = first.parse().map_err(|_| {
        PopconvError::format(format!("genotype code '{}' does not fit an allele", code))
    })?;
    let a2: u32 = second.parse().map_err(|_| {
        PopconvError::format(format!("genotype code '{}' does not fit an allele", code))
    })?;
    Ok((a1, a2))
}
