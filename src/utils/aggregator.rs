//! # Series Aggregator
//!
//! Collects per-generation values for a fixed number of series so that
//! downstream plotting consumers can read them all at once. An owned,
//! explicitly sized value; when a generation window is set, rows older than
//! the window are dropped from the front as new rows arrive.

use std::collections::VecDeque;

use crate::error::{PopconvError, Result};

/// A windowed collection of per-generation series
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    /// Maximum generation span to keep; 0 = unbounded
    window: u32,
    /// Number of series; 0 until the first full-row push fixes it
    width: usize,
    gens: VecDeque<u32>,
    data: Vec<VecDeque<f64>>,
}

impl Aggregator {
    /// Create an aggregator keeping at most `window` generations of data
    /// (0 = keep everything); `width` series, or 0 to adopt the width of
    /// the first pushed row
    pub fn new(window: u32, width: usize) -> Self {
        Self {
            window,
            width,
            gens: VecDeque::new(),
            data: (0..width).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Number of series
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of retained generations
    pub fn len(&self) -> usize {
        self.gens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gens.is_empty()
    }

    /// Retained generation numbers, oldest first
    pub fn gens(&self) -> impl Iterator<Item = u32> + '_ {
        self.gens.iter().copied()
    }

    /// One series' retained values, oldest first
    pub fn series(&self, idx: usize) -> impl Iterator<Item = f64> + '_ {
        self.data[idx].iter().copied()
    }

    /// Drop all retained data, keeping window and width
    pub fn clear(&mut self) {
        self.gens.clear();
        for series in &mut self.data {
            series.clear();
        }
    }

    /// Push one value per series for a generation
    pub fn push_row(&mut self, gen: u32, row: &[f64]) -> Result<()> {
        if self.width == 0 {
            self.width = row.len();
            self.data = (0..self.width).map(|_| VecDeque::new()).collect();
        } else if row.len() != self.width {
            return Err(PopconvError::value(format!(
                "row has {} values, aggregator tracks {} series",
                row.len(),
                self.width
            )));
        }
        self.gens.push_back(gen);
        for (series, &value) in self.data.iter_mut().zip(row) {
            series.push_back(value);
        }
        self.trim();
        Ok(())
    }

    /// Push a single series' value for a generation
    ///
    /// Values for the other series default to 0 until pushed; pushing the
    /// same generation again overwrites that series' latest value.
    pub fn push_cell(&mut self, gen: u32, idx: usize, value: f64) -> Result<()> {
        if self.width == 0 {
            return Err(PopconvError::value(
                "cannot push single values before the width is known",
            ));
        }
        if idx >= self.width {
            return Err(PopconvError::value(format!(
                "series index {} out of range for width {}",
                idx, self.width
            )));
        }
        if self.gens.back() == Some(&gen) {
            *self.data[idx].back_mut().expect("series track gens") = value;
            return Ok(());
        }
        self.gens.push_back(gen);
        for series in &mut self.data {
            series.push_back(0.0);
        }
        *self.data[idx].back_mut().expect("just pushed") = value;
        self.trim();
        Ok(())
    }

    /// Smallest and largest retained value over all series
    pub fn y_range(&self) -> (f64, f64) {
        let mut values = self.data.iter().flatten().copied();
        match values.next() {
            None => (0.0, 0.0),
            Some(first) => values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
        }
    }

    fn trim(&mut self) {
        if self.window == 0 {
            return;
        }
        while let (Some(&first), Some(&last)) = (self.gens.front(), self.gens.back()) {
            // generations may arrive out of order; only a forward span trims
            if last.saturating_sub(first) <= self.window {
                break;
            }
            self.gens.pop_front();
            for series in &mut self.data {
                series.pop_front();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_adopted_from_first_row() {
        let mut agg = Aggregator::new(0, 0);
        agg.push_row(1, &[0.5, 1.5]).unwrap();
        assert_eq!(agg.width(), 2);
        assert!(agg.push_row(2, &[1.0]).is_err());
    }

    #[test]
    fn window_trims_old_generations() {
        let mut agg = Aggregator::new(3, 1);
        for gen in 0..10 {
            agg.push_row(gen, &[gen as f64]).unwrap();
        }
        let gens: Vec<u32> = agg.gens().collect();
        assert_eq!(gens, vec![6, 7, 8, 9]);
        assert_eq!(agg.series(0).next(), Some(6.0));
    }

    #[test]
    fn cell_push_overwrites_same_generation() {
        let mut agg = Aggregator::new(0, 2);
        agg.push_cell(5, 0, 1.0).unwrap();
        agg.push_cell(5, 1, 2.0).unwrap();
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.y_range(), (1.0, 2.0));
        assert!(agg.push_cell(5, 2, 3.0).is_err());
    }

    #[test]
    fn out_of_order_generations_do_not_trim() {
        let mut agg = Aggregator::new(3, 1);
        agg.push_row(10, &[1.0]).unwrap();
        agg.push_row(2, &[2.0]).unwrap();
        let gens: Vec<u32> = agg.gens().collect();
        assert_eq!(gens, vec![10, 2]);
    }

    #[test]
    fn y_range_of_empty_is_zero() {
        let agg = Aggregator::new(0, 2);
        assert_eq!(agg.y_range(), (0.0, 0.0));
    }
}
