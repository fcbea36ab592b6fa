// Dry-frame modulus calibration against a zone of known pore fluid

use std::ops::RangeInclusive;

use anyhow::Result;
use peroxide::fuga::{BisectionMethod, RootFinder, RootFindingProblem};
use tracing::{debug, warn};

use crate::error::CalibrationError;
use crate::gassmann::gassmann_ksat;
use crate::params::{CalibrationMethod, CalibrationSettings};

/// Kdry candidates `i / steps_per_gpa` for `i` in `1..trunc(km * steps_per_gpa)`.
#[derive(Clone, Copy, Debug)]
struct CandidateGrid {
    km: f64,
    steps_per_gpa: f64,
    last: u64,
}

impl CandidateGrid {
    fn new(km: f64, steps_per_gpa: f64) -> Result<Self, CalibrationError> {
        if !(km > 0.0) || !km.is_finite() {
            return Err(CalibrationError::InvalidMineralModulus { km });
        }
        if !(steps_per_gpa > 0.0) || !steps_per_gpa.is_finite() {
            return Err(CalibrationError::InvalidResolution { steps_per_gpa });
        }
        let upper = (km * steps_per_gpa).trunc();
        if upper < 2.0 {
            return Err(CalibrationError::EmptyCandidateSet { km, steps_per_gpa });
        }
        Ok(CandidateGrid {
            km,
            steps_per_gpa,
            last: upper as u64 - 1,
        })
    }

    fn value(&self, i: u64) -> f64 {
        i as f64 / self.steps_per_gpa
    }

    fn index_near(&self, kdry: f64) -> u64 {
        (kdry * self.steps_per_gpa).round().clamp(1.0, self.last as f64) as u64
    }

    /// Candidate with the smallest error in `range`, walking upward and only
    /// replacing the incumbent on a strictly smaller error.
    fn best<F>(&self, range: RangeInclusive<u64>, error: F) -> Option<(f64, f64)>
    where
        F: Fn(f64) -> f64,
    {
        let mut best: Option<(f64, f64)> = None;
        let mut best_err = f64::INFINITY;
        for i in range {
            let kdry = self.value(i);
            // stay below matrix modulus
            if kdry >= self.km {
                continue;
            }
            let err = error(kdry);
            if err < best_err {
                best = Some((kdry, err));
                best_err = err;
            }
        }
        best
    }
}

/// Gassmann misfit `Ksat(Kdry) - Ksat_observed` for the root finder.
struct FrameResidual {
    km: f64,
    phi: f64,
    kf: f64,
    ksat_observed: f64,
    bracket: (f64, f64),
}

impl FrameResidual {
    fn eval(&self, x: [f64; 1]) -> Result<[f64; 1]> {
        Ok([gassmann_ksat(x[0], self.km, self.phi, self.kf) - self.ksat_observed])
    }
}

impl RootFindingProblem<1, 1, (f64, f64)> for FrameResidual {
    fn function(&self, x: [f64; 1]) -> Result<[f64; 1]> {
        self.eval(x)
    }
    fn initial_guess(&self) -> (f64, f64) {
        self.bracket
    }
}

/// Finds the dry-frame modulus that reproduces an observed saturated modulus.
///
/// Both methods pick from the same candidate grid and agree exactly; the
/// scan is kept as the reference and as the fallback whenever the forward
/// model cannot be treated as monotonic.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameCalibrator {
    settings: CalibrationSettings,
}

impl FrameCalibrator {
    pub fn new(settings: CalibrationSettings) -> Self {
        FrameCalibrator { settings }
    }

    /// Dry-frame modulus in GPa
    ///
    /// # Arguments
    /// * ksat_observed: saturated bulk modulus of the calibration zone in GPa
    /// * km: mineral bulk modulus in GPa
    /// * phi: porosity of the calibration zone
    /// * kf: bulk modulus of the fluid known to fill the zone in GPa
    pub fn calibrate(
        &self,
        ksat_observed: f64,
        km: f64,
        phi: f64,
        kf: f64,
    ) -> Result<f64, CalibrationError> {
        let grid = CandidateGrid::new(km, self.settings.steps_per_gpa)?;
        let kdry = match self.settings.method {
            CalibrationMethod::Scan => None,
            CalibrationMethod::Bisection => self.bisect(&grid, ksat_observed, phi, kf),
        };
        let kdry = match kdry {
            Some(kdry) => kdry,
            None => scan_grid(&grid, ksat_observed, phi, kf)?,
        };
        debug!(kdry, km, phi, kf, method = %self.settings.method, "calibrated dry-frame modulus");
        Ok(kdry)
    }

    /// Exhaustive scan of every candidate, regardless of the configured method.
    pub fn scan(
        &self,
        ksat_observed: f64,
        km: f64,
        phi: f64,
        kf: f64,
    ) -> Result<f64, CalibrationError> {
        let grid = CandidateGrid::new(km, self.settings.steps_per_gpa)?;
        scan_grid(&grid, ksat_observed, phi, kf)
    }

    fn bisect(&self, grid: &CandidateGrid, ksat_observed: f64, phi: f64, kf: f64) -> Option<f64> {
        // the Gassmann denominator stays positive on (0, Km) only for Kf < Km
        if !(kf < grid.km) {
            warn!(kf, km = grid.km, "fluid stiffer than mineral, scanning");
            return None;
        }
        let problem = FrameResidual {
            km: grid.km,
            phi,
            kf,
            ksat_observed,
            bracket: (grid.value(1), grid.value(grid.last)),
        };
        let finder = BisectionMethod {
            max_iter: self.settings.max_iter,
            tol: self.settings.tol,
        };
        let root = match finder.find(&problem) {
            Ok(root) => root[0],
            Err(error) => {
                warn!(%error, "bisection failed, scanning");
                return None;
            }
        };
        let i = grid.index_near(root);
        let range = i.saturating_sub(1).max(1)..=(i + 1).min(grid.last);
        grid.best(range, |kdry| misfit(kdry, grid.km, phi, kf, ksat_observed))
            .map(|(kdry, _)| kdry)
    }
}

fn misfit(kdry: f64, km: f64, phi: f64, kf: f64, ksat_observed: f64) -> f64 {
    (gassmann_ksat(kdry, km, phi, kf) - ksat_observed).abs()
}

fn scan_grid(
    grid: &CandidateGrid,
    ksat_observed: f64,
    phi: f64,
    kf: f64,
) -> Result<f64, CalibrationError> {
    grid.best(1..=grid.last, |kdry| misfit(kdry, grid.km, phi, kf, ksat_observed))
        .map(|(kdry, _)| kdry)
        .ok_or(CalibrationError::NoFiniteCandidate)
}

/// Dry-frame modulus from a brine-filled zone with the default settings.
pub fn calibrate_kdry_from_water_zone(
    ksat_water: f64,
    km: f64,
    phi: f64,
    kw: f64,
) -> Result<f64, CalibrationError> {
    FrameCalibrator::default().calibrate(ksat_water, km, phi, kw)
}
