//! Reporting: the JSON report and terminal text.
//!
//! Formatting lives in `format` so the models stay free of presentation concerns.

use serde::Serialize;

use crate::domain::FitRequest;
use crate::fit::ModelFit;

pub mod format;

pub use format::*;

/// JSON form of a fit run over one file.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub filename: String,
    pub comments: Vec<String>,
    pub settings: FitRequest,
    pub volume_km3: f64,
    pub mrse: f64,
    pub fit: ModelFit,
}

impl FitReport {
    pub fn new(filename: impl Into<String>, comments: &[String], settings: FitRequest, fit: ModelFit) -> Self {
        Self {
            filename: filename.into(),
            comments: comments.to_vec(),
            settings,
            volume_km3: fit.volume_km3(),
            mrse: fit.mrse(),
            fit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Isopach;
    use crate::fit::fit_isopachs;

    #[test]
    fn json_report_carries_settings_and_fit() {
        let isopachs = vec![
            Isopach::new(0.4, 16.25),
            Isopach::new(0.2, 30.63),
            Isopach::new(0.1, 58.87),
            Isopach::new(0.05, 95.75),
        ];
        let request = FitRequest::Exponential { segments: 1 };
        let fit = fit_isopachs(&isopachs, &request).unwrap();
        let r = FitReport::new("deposit.csv", &["Hekla".to_string()], request, fit);

        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["filename"], "deposit.csv");
        assert_eq!(value["comments"][0], "Hekla");
        assert_eq!(value["settings"]["model"], "exponential");
        assert_eq!(value["settings"]["segments"], 1);
        assert_eq!(value["fit"]["model"], "exponential");
        assert!(value["fit"]["limits"][1].is_null());
        assert!(value["volume_km3"].as_f64().unwrap() > 0.0);
    }
}
