//! # Demographic Helpers
//!
//! Size schedules and migration-rate matrices. Schedules are tagged values
//! evaluated by a pure function of the generation number, so they stay
//! serializable and testable; no captured mutable state.

use crate::error::{PopconvError, Result};

/// How the total population size moves from `init_size` to `end_size`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// Size stays at `init_size`
    Constant,
    /// Linear growth between `burnin` and `end`
    Linear,
    /// Exponential growth between `burnin` and `end`
    Exponential,
    /// Jump to `end_size` right after `burnin`
    Instant,
}

/// A population size schedule
///
/// Before `split` the population is one deme; from `split` on, the total is
/// divided evenly over `num_subpops` demes. An optional bottleneck
/// overrides the size at exactly one generation.
#[derive(Clone, Copy, Debug)]
pub struct SizeSchedule {
    pub expansion: Expansion,
    pub init_size: u64,
    pub end_size: u64,
    /// Generation at which growth stops
    pub end: u32,
    /// Generations of constant `init_size` before growth starts
    pub burnin: u32,
    /// Generation at which the population splits into subpopulations
    pub split: u32,
    pub num_subpops: usize,
    /// Bottleneck as (generation, total size)
    pub bottleneck: Option<(u32, u64)>,
}

impl SizeSchedule {
    /// Constant size, never splitting
    pub fn constant(size: u64) -> Self {
        Self {
            expansion: Expansion::Constant,
            init_size: size,
            end_size: size,
            end: 0,
            burnin: 0,
            split: 0,
            num_subpops: 1,
            bottleneck: None,
        }
    }

    /// Growth from `init_size` to `end_size`, finishing at generation `end`
    pub fn expanding(expansion: Expansion, init_size: u64, end_size: u64, end: u32) -> Self {
        Self {
            expansion,
            init_size,
            end_size,
            end,
            burnin: 0,
            split: 0,
            num_subpops: 1,
            bottleneck: None,
        }
    }

    pub fn with_burnin(mut self, burnin: u32) -> Self {
        self.burnin = burnin;
        self
    }

    pub fn with_split(mut self, split: u32, num_subpops: usize) -> Self {
        self.split = split;
        self.num_subpops = num_subpops;
        self
    }

    pub fn with_bottleneck(mut self, gen: u32, size: u64) -> Self {
        self.bottleneck = Some((gen, size));
        self
    }

    /// Per-subpopulation sizes at a generation
    pub fn sizes_at(&self, gen: u32) -> Vec<u64> {
        if let Some((bn_gen, bn_size)) = self.bottleneck {
            if gen == bn_gen {
                return self.divide(bn_size, gen);
            }
        }
        let total = match self.expansion {
            Expansion::Constant => self.init_size,
            Expansion::Linear => {
                if gen <= self.burnin {
                    self.init_size
                } else if gen > self.end {
                    self.end_size
                } else {
                    let inc = (self.end_size as f64 - self.init_size as f64)
                        / (self.end - self.burnin) as f64;
                    (self.init_size as f64 + inc * (gen - self.burnin) as f64).round() as u64
                }
            }
            Expansion::Exponential => {
                if gen <= self.burnin {
                    self.init_size
                } else if gen > self.end {
                    self.end_size
                } else {
                    // Round, don't truncate: the curve lands slightly under
                    // exact powers (399.999...) and must not lose a head.
                    let rate = ((self.end_size as f64).ln() - (self.init_size as f64).ln())
                        / (self.end - self.burnin) as f64;
                    (self.init_size as f64 * (rate * (gen - self.burnin) as f64).exp()).round()
                        as u64
                }
            }
            Expansion::Instant => {
                if gen <= self.burnin {
                    self.init_size
                } else {
                    self.end_size
                }
            }
        };
        self.divide(total, gen)
    }

    fn divide(&self, total: u64, gen: u32) -> Vec<u64> {
        if gen < self.split || self.num_subpops <= 1 {
            vec![total]
        } else {
            vec![total / self.num_subpops as u64; self.num_subpops]
        }
    }
}

/// Island-model migration matrix: off-diagonal `r/(n-1)`, diagonal `1-r`
pub fn island_rates(r: f64, n: usize) -> Vec<Vec<f64>> {
    if n == 1 {
        return vec![vec![1.0]];
    }
    let mut m = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = vec![r / (n - 1) as f64; n];
        row[i] = 1.0 - r;
        m.push(row);
    }
    m
}

/// Stepping-stone migration matrix: `r/2` to each neighbor, `1-r` on the
/// diagonal. In the non-circular variant the two end demes send their full
/// `r` to their only neighbor.
pub fn stepping_stone_rates(r: f64, n: usize, circular: bool) -> Result<Vec<Vec<f64>>> {
    if n < 2 {
        return Err(PopconvError::value(
            "cannot define a stepping stone model for fewer than 2 demes",
        ));
    }
    if n == 2 {
        return Ok(vec![vec![1.0 - r, r], vec![r, 1.0 - r]]);
    }
    let mut m = vec![vec![0.0; n]; n];
    for i in 0..n {
        m[i][i] = 1.0 - r;
        m[i][(i + 1) % n] = r / 2.0;
        m[i][(i + n - 1) % n] = r / 2.0;
    }
    if !circular {
        m[0][1] = r;
        m[0][n - 1] = 0.0;
        m[n - 1][0] = 0.0;
        m[n - 1][n - 2] = r;
    }
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_schedule_splits() {
        let s = SizeSchedule::constant(1000).with_split(5, 4);
        assert_eq!(s.sizes_at(0), vec![1000]);
        assert_eq!(s.sizes_at(5), vec![250, 250, 250, 250]);
    }

    #[test]
    fn linear_schedule_interpolates() {
        let s = SizeSchedule::expanding(Expansion::Linear, 100, 200, 10);
        assert_eq!(s.sizes_at(0), vec![100]);
        assert_eq!(s.sizes_at(5), vec![150]);
        assert_eq!(s.sizes_at(10), vec![200]);
        assert_eq!(s.sizes_at(99), vec![200]);
    }

    #[test]
    fn exponential_schedule_hits_endpoints() {
        let s = SizeSchedule::expanding(Expansion::Exponential, 100, 1600, 4);
        assert_eq!(s.sizes_at(0), vec![100]);
        // intermediate points sit fractionally below the exact doubling and
        // must round up, not truncate down
        assert_eq!(s.sizes_at(1), vec![200]);
        assert_eq!(s.sizes_at(2), vec![400]);
        assert_eq!(s.sizes_at(3), vec![800]);
        assert_eq!(s.sizes_at(4), vec![1600]);
    }

    #[test]
    fn instant_schedule_jumps_after_burnin() {
        let s = SizeSchedule::expanding(Expansion::Instant, 100, 500, 10).with_burnin(3);
        assert_eq!(s.sizes_at(3), vec![100]);
        assert_eq!(s.sizes_at(4), vec![500]);
    }

    #[test]
    fn bottleneck_overrides_one_generation() {
        let s = SizeSchedule::constant(1000).with_bottleneck(7, 50);
        assert_eq!(s.sizes_at(6), vec![1000]);
        assert_eq!(s.sizes_at(7), vec![50]);
        assert_eq!(s.sizes_at(8), vec![1000]);
    }

    #[test]
    fn island_rows_sum_to_one() {
        let m = island_rates(0.1, 4);
        for row in &m {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert!((m[0][0] - 0.9).abs() < 1e-12);
        assert_eq!(island_rates(0.3, 1), vec![vec![1.0]]);
    }

    #[test]
    fn stepping_stone_edges() {
        assert!(stepping_stone_rates(0.1, 1, false).is_err());
        let open = stepping_stone_rates(0.2, 4, false).unwrap();
        assert!((open[0][1] - 0.2).abs() < 1e-12);
        assert_eq!(open[0][3], 0.0);
        let ring = stepping_stone_rates(0.2, 4, true).unwrap();
        assert!((ring[0][3] - 0.1).abs() < 1e-12);
    }
}
