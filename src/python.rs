// Python bindings

use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::{
    exceptions::PyValueError,
    pymodule,
    types::{PyModule},
    PyErr, PyResult, Python,
};

use crate::calibration::FrameCalibrator;
use crate::error::SwError;
use crate::params::{CalibrationMethod, CalibrationSettings, RockFluidModuli};
use crate::pipeline::{estimate_saturation, CalibratedFrame};
use crate::sonic::ZoneInput;

impl From<SwError> for PyErr {
    fn from(err: SwError) -> PyErr {
        PyValueError::new_err(format!("{:#}", anyhow::Error::from(err)))
    }
}

fn settings(method: &str, steps_per_gpa: f64) -> PyResult<CalibrationSettings> {
    let method: CalibrationMethod = method.parse().map_err(PyValueError::new_err)?;
    Ok(CalibrationSettings {
        steps_per_gpa,
        method,
        ..CalibrationSettings::default()
    })
}

#[pymodule]
fn sonic_sw(_py: Python, m: &PyModule) -> PyResult<()> {

    #[pyfn(m)]
    #[pyo3(name = "velocities_from_sonic")]
    fn velocities_from_sonic_py(dtc_us_per_ft: f64, dts_us_per_ft: f64) -> PyResult<(f64, f64)> {
        Ok(crate::sonic::velocities_from_sonic(dtc_us_per_ft, dts_us_per_ft).map_err(SwError::from)?)
    }

    #[pyfn(m)]
    #[pyo3(name = "ksat_gpa")]
    fn ksat_gpa_py(dtc_us_per_ft: f64, dts_us_per_ft: f64, rho_gcc: f64) -> PyResult<f64> {
        Ok(crate::sonic::ksat_gpa(dtc_us_per_ft, dts_us_per_ft, rho_gcc).map_err(SwError::from)?)
    }

    #[pyfn(m)]
    #[pyo3(name = "gassmann_ksat")]
    fn gassmann_ksat_py(kdry: f64, km: f64, phi: f64, kf: f64) -> f64 {
        crate::gassmann::gassmann_ksat(kdry, km, phi, kf)
    }

    #[pyfn(m)]
    #[pyo3(name = "calibrate_kdry")]
    #[pyo3(signature = (ksat_water, km, phi, kw, method = "bisection", steps_per_gpa = 1000.0))]
    fn calibrate_kdry_py(
        ksat_water: f64,
        km: f64,
        phi: f64,
        kw: f64,
        method: &str,
        steps_per_gpa: f64,
    ) -> PyResult<f64> {
        let calibrator = FrameCalibrator::new(settings(method, steps_per_gpa)?);
        Ok(calibrator.calibrate(ksat_water, km, phi, kw).map_err(SwError::from)?)
    }

    #[pyfn(m)]
    #[pyo3(name = "invert_kf_from_ksat")]
    fn invert_kf_from_ksat_py(ksat: f64, kdry: f64, km: f64, phi: f64) -> PyResult<f64> {
        Ok(crate::gassmann::invert_kf_from_ksat(ksat, kdry, km, phi).map_err(SwError::from)?)
    }

    #[pyfn(m)]
    #[pyo3(name = "sw_from_wood")]
    fn sw_from_wood_py(kf: f64, kw: f64, khc: f64) -> PyResult<f64> {
        Ok(crate::wood::sw_from_wood(kf, kw, khc).map_err(SwError::from)?)
    }

    //wrapper
    #[pyfn(m)]
    #[pyo3(name = "estimate_saturation")]
    #[pyo3(signature = (water_zone, target_zone, km, kw, khc, method = "bisection"))]
    fn estimate_saturation_py(
        water_zone: (f64, f64, f64, f64),
        target_zone: (f64, f64, f64, f64),
        km: f64,
        kw: f64,
        khc: f64,
        method: &str,
    ) -> PyResult<(f64, f64, f64, f64, f64)> {
        let (dtc, dts, rho, phi) = water_zone;
        let reference = ZoneInput::new(dtc, dts, rho, phi);
        let (dtc, dts, rho, phi) = target_zone;
        let target = ZoneInput::new(dtc, dts, rho, phi);
        let moduli = RockFluidModuli::new(km, kw, khc);
        let report = estimate_saturation(
            &reference,
            &target,
            &moduli,
            &settings(method, crate::params::DEFAULT_STEPS_PER_GPA)?,
        )?;
        Ok((
            report.ksat_reference,
            report.kdry,
            report.ksat_target,
            report.kf_target,
            report.sw,
        ))
    }

    //wrapper
    #[pyfn(m)]
    #[pyo3(name = "saturation_profile")]
    fn saturation_profile_py<'py>(
        py: Python<'py>,
        water_zone: (f64, f64, f64, f64),
        dtc: PyReadonlyArray1<f64>,
        dts: PyReadonlyArray1<f64>,
        rho: PyReadonlyArray1<f64>,
        phi: PyReadonlyArray1<f64>,
        km: f64,
        kw: f64,
        khc: f64,
    ) -> PyResult<&'py PyArray1<f64>> {
        let (w_dtc, w_dts, w_rho, w_phi) = water_zone;
        let moduli = RockFluidModuli::new(km, kw, khc);
        let frame = CalibratedFrame::calibrate(
            &ZoneInput::new(w_dtc, w_dts, w_rho, w_phi),
            &moduli,
            &CalibrationSettings::default(),
        )?;
        let sw = frame.saturation_profile(
            dtc.as_array(),
            dts.as_array(),
            rho.as_array(),
            phi.as_array(),
            &moduli,
        )?;
        Ok(sw.into_pyarray(py))
    }

    Ok(())
}
