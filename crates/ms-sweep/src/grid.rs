//! Sweep dimensions: habitat scale segments, seeds and coverage levels.

use ms_types::{MsResult, SweepError};
use serde::{Deserialize, Serialize};

/// Grid values are rounded to this many decimal places so that
/// `start + i * step` reproduces the literal decimal grid.
const GRID_DECIMALS: i32 = 9;

/// Upper bound on the points a single segment may expand to.
const MAX_SEGMENT_POINTS: f64 = 1_000_000.0;

fn round_grid(value: f64) -> f64 {
    let scale = 10f64.powi(GRID_DECIMALS);
    (value * scale).round() / scale
}

/// Half-open range `[start, stop)` sampled every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArangeSegment {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl ArangeSegment {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Number of points in the segment.
    pub fn len(&self) -> MsResult<usize> {
        let valid = self.start.is_finite()
            && self.stop.is_finite()
            && self.step.is_finite()
            && self.step > 0.0
            && self.stop >= self.start;
        let invalid = || SweepError::InvalidSegment {
            start: self.start,
            stop: self.stop,
            step: self.step,
        };
        if !valid {
            return Err(invalid().into());
        }
        // Tolerance absorbs quotients like 2.25 / 0.05 = 45.000000000000004.
        let count = ((self.stop - self.start) / self.step - 1e-9).ceil().max(0.0);
        if !count.is_finite() || count > MAX_SEGMENT_POINTS {
            return Err(invalid().into());
        }
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> MsResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn values(&self) -> MsResult<Vec<f64>> {
        let count = self.len()?;
        Ok((0..count)
            .map(|i| round_grid(self.start + i as f64 * self.step))
            .collect())
    }
}

/// Log10 larval habitat scales, concatenated from consecutive segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitatGrid {
    pub segments: Vec<ArangeSegment>,
}

impl Default for HabitatGrid {
    /// Fine steps below 2.25, coarse steps from 2.25 up to 4.
    fn default() -> Self {
        Self {
            segments: vec![
                ArangeSegment::new(0.0, 2.25, 0.05),
                ArangeSegment::new(2.25, 4.25, 0.25),
            ],
        }
    }
}

impl HabitatGrid {
    pub fn values(&self) -> MsResult<Vec<f64>> {
        let mut values = Vec::new();
        for segment in &self.segments {
            values.extend(segment.values()?);
        }
        if values.is_empty() {
            return Err(SweepError::EmptyGrid {
                grid: "habitat_grid".to_string(),
            }
            .into());
        }
        Ok(values)
    }
}

/// Random seeds `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRange {
    pub start: u32,
    pub end: u32,
}

impl Default for SeedRange {
    fn default() -> Self {
        Self { start: 0, end: 5 }
    }
}

impl SeedRange {
    pub fn values(&self) -> MsResult<Vec<u32>> {
        if self.end <= self.start {
            return Err(SweepError::EmptyGrid {
                grid: "seeds".to_string(),
            }
            .into());
        }
        Ok((self.start..self.end).collect())
    }
}

/// Coverage levels in whole percent, inclusive of both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGrid {
    pub start_percent: u32,
    pub stop_percent: u32,
    pub step_percent: u32,
}

impl Default for CoverageGrid {
    fn default() -> Self {
        Self {
            start_percent: 0,
            stop_percent: 100,
            step_percent: 5,
        }
    }
}

impl CoverageGrid {
    /// Coverage fractions in `[0, 1]`.
    pub fn values(&self) -> MsResult<Vec<f64>> {
        if self.step_percent == 0 || self.stop_percent > 100 {
            return Err(SweepError::InvalidSegment {
                start: f64::from(self.start_percent),
                stop: f64::from(self.stop_percent),
                step: f64::from(self.step_percent),
            }
            .into());
        }
        if self.start_percent > self.stop_percent {
            return Err(SweepError::EmptyGrid {
                grid: "coverage_grid".to_string(),
            }
            .into());
        }
        Ok((self.start_percent..=self.stop_percent)
            .step_by(self.step_percent as usize)
            .map(|p| f64::from(p) / 100.0)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_types::MsError;

    #[test]
    fn fine_segment_has_45_points() {
        let values = ArangeSegment::new(0.0, 2.25, 0.05).values().unwrap();
        assert_eq!(values.len(), 45);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 0.05);
        assert_eq!(values[44], 2.2);
    }

    #[test]
    fn default_habitat_grid() {
        let values = HabitatGrid::default().values().unwrap();
        assert_eq!(values.len(), 53);
        assert_eq!(values.iter().filter(|v| **v == 2.25).count(), 1);
        assert_eq!(&values[45..], &[2.25, 2.5, 2.75, 3.0, 3.25, 3.5, 3.75, 4.0]);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn invalid_segment_is_rejected() {
        let result = ArangeSegment::new(1.0, 2.0, 0.0).values();
        assert!(matches!(
            result,
            Err(MsError::Sweep(SweepError::InvalidSegment { .. }))
        ));
        assert!(ArangeSegment::new(2.0, 1.0, 0.5).len().is_err());
        assert!(ArangeSegment::new(1.0, 1.0, 0.5).is_empty().unwrap());
    }

    #[test]
    fn degenerate_step_is_rejected() {
        let tiny = ArangeSegment::new(0.0, 1.0, 1e-300);
        assert!(matches!(
            tiny.len(),
            Err(MsError::Sweep(SweepError::InvalidSegment { .. }))
        ));
        assert!(tiny.values().is_err());

        let grid = HabitatGrid {
            segments: vec![ArangeSegment::new(0.0, 2.25, 0.05), tiny],
        };
        assert!(grid.values().is_err());
        assert_eq!(ArangeSegment::new(0.0, 1.0, 1e-6).len().unwrap(), 1_000_000);
    }

    #[test]
    fn empty_habitat_grid_is_rejected() {
        let grid = HabitatGrid { segments: vec![] };
        assert!(matches!(
            grid.values(),
            Err(MsError::Sweep(SweepError::EmptyGrid { .. }))
        ));
    }

    #[test]
    fn default_seeds_and_coverages() {
        assert_eq!(SeedRange::default().values().unwrap(), vec![0, 1, 2, 3, 4]);

        let coverages = CoverageGrid::default().values().unwrap();
        assert_eq!(coverages.len(), 21);
        assert_eq!(coverages[0], 0.0);
        assert_eq!(coverages[1], 0.05);
        assert_eq!(coverages[7], 0.35);
        assert_eq!(coverages[20], 1.0);
    }

    #[test]
    fn coverage_grid_rejects_zero_step() {
        let grid = CoverageGrid {
            step_percent: 0,
            ..CoverageGrid::default()
        };
        assert!(grid.values().is_err());
    }
}
