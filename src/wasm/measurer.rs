//! Measurer backed by host JavaScript callbacks

use crate::measure::{Measurer, StyleProfile};
use crate::paginate::PageBudget;
use crate::{Error, Result};
use js_sys::Function;
use wasm_bindgen::JsValue;

/// Measures text through a host function
/// `(text, width, profileJson) => number | undefined`, usually rendering into
/// an off-screen element styled like a page.
///
/// Without a function, or when it returns anything but a finite non-negative
/// number, the surface counts as unavailable.
#[derive(Debug, Default)]
pub struct JsMeasurer {
    measure_fn: Option<Function>,
    /// Optional `(budgetJson) => void`, called before each pass
    calibrate_fn: Option<Function>,
    /// Last profile and its JSON
    profile: Option<(StyleProfile, String)>,
}

impl JsMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_functions(&mut self, measure: Function, calibrate: Option<Function>) {
        self.measure_fn = Some(measure);
        self.calibrate_fn = calibrate;
    }

    pub fn is_mounted(&self) -> bool {
        self.measure_fn.is_some()
    }

    fn profile_json(&mut self, style: &StyleProfile) -> Result<String> {
        match &self.profile {
            Some((cached, json)) if cached == style => Ok(json.clone()),
            _ => {
                let json = serde_json::to_string(style)?;
                self.profile = Some((style.clone(), json.clone()));
                Ok(json)
            }
        }
    }
}

fn height_from(value: &JsValue) -> Option<f32> {
    value
        .as_f64()
        .filter(|h| h.is_finite() && *h >= 0.0)
        .map(|h| h as f32)
}

impl Measurer for JsMeasurer {
    fn measure(&mut self, text: &str, max_width: f32, style: &StyleProfile) -> Result<f32> {
        let profile = self.profile_json(style)?;
        let Some(measure) = &self.measure_fn else {
            return Err(Error::MeasurementUnavailable);
        };

        let value = measure
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(text),
                &JsValue::from_f64(max_width as f64),
                &JsValue::from_str(&profile),
            )
            .map_err(|err| {
                log::warn!("measure callback threw: {:?}", err);
                Error::MeasurementUnavailable
            })?;

        height_from(&value).ok_or(Error::MeasurementUnavailable)
    }

    fn calibrate(&mut self, budget: &PageBudget) -> Result<()> {
        if self.measure_fn.is_none() {
            return Err(Error::MeasurementUnavailable);
        }

        if let Some(calibrate) = &self.calibrate_fn {
            let json = serde_json::to_string(budget)?;
            calibrate
                .call1(&JsValue::NULL, &JsValue::from_str(&json))
                .map_err(|err| {
                    log::warn!("calibrate callback threw: {:?}", err);
                    Error::MeasurementUnavailable
                })?;
        }
        Ok(())
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn function(body: &str) -> Function {
        Function::new_with_args("text, width, profile", body)
    }

    #[wasm_bindgen_test]
    fn test_unmounted_without_function() {
        let mut m = JsMeasurer::new();
        let err = m
            .measure("x", 100.0, &StyleProfile::default())
            .unwrap_err();
        assert!(matches!(err, Error::MeasurementUnavailable));
    }

    #[wasm_bindgen_test]
    fn test_height_from_callback() {
        let mut m = JsMeasurer::new();
        m.set_functions(function("return text.length * 2;"), None);
        assert_eq!(m.measure("abc", 100.0, &StyleProfile::default()).unwrap(), 6.0);
    }

    #[wasm_bindgen_test]
    fn test_undefined_is_unavailable() {
        let mut m = JsMeasurer::new();
        m.set_functions(function("return undefined;"), None);
        assert!(m.measure("abc", 100.0, &StyleProfile::default()).is_err());
    }
}
