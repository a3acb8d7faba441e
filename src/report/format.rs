//! Terminal text for fit reports.
//!
//! One `String` per file: filename, comments and settings first, then the
//! fitted parameters, then MRSE and volume.

use crate::fit::ModelFit;
use crate::report::FitReport;

/// Format a fit for the terminal.
pub fn format_fit_summary(report: &FitReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Filename: {}\n", report.filename));
    for (i, comment) in report.comments.iter().enumerate() {
        out.push_str(&format!("Comment {}: {}\n", i + 1, comment));
    }
    out.push_str(&report.settings.settings_text());
    out.push('\n');
    out.push_str(&format_parameters(&report.fit));

    out.push_str(&format!("MRSE of fit: {:.3}\n", report.mrse));
    out.push_str(&format!("Total Volume: {:.2}\n", report.volume_km3));
    out
}

fn format_parameters(fit: &ModelFit) -> String {
    let mut out = String::new();
    match fit {
        ModelFit::Exponential(exp) => {
            for (i, seg) in exp.segments.iter().enumerate() {
                out.push_str(&format!("Segment {i} Bt: {:.3}\n", seg.half_thickness_km));
                out.push_str(&format!("Segment {i} Coefficient: {:.3}\n", seg.coefficient));
                out.push_str(&format!("Segment {i} Exponent: {:.3}\n", seg.exponent));
                out.push_str(&format!("Segment {i} Limit: {:.3}\n", seg.end_km));
                out.push_str(&format!("Segment {i} Volume: {:.1}\n", seg.volume_km3));
            }
        }
        ModelFit::PowerLaw(pow) => {
            out.push_str(&format!("Coefficient: {:.3}\n", pow.coefficient));
            out.push_str(&format!("Exponent: {:.3}\n", pow.exponent));
            match pow.suggested_proximal_limit_km {
                Some(limit) => out.push_str(&format!("Suggested Proximal Limit: {limit:.1}\n")),
                None => out.push_str("Suggested Proximal Limit: N/A\n"),
            }
        }
        ModelFit::Weibull(wei) => {
            out.push_str(&format!("k: {:.3}\n", wei.k));
            out.push_str(&format!("lambda: {:.0}\n", wei.lambda));
            out.push_str(&format!("theta: {:.5}\n", wei.theta));
            out.push_str(&format!("Best score: {:.3}\n", wei.best_score));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitRequest, Isopach};
    use crate::fit::fit_isopachs;

    fn sample_isopachs() -> Vec<Isopach> {
        vec![
            Isopach::new(0.4, 16.25),
            Isopach::new(0.2, 30.63),
            Isopach::new(0.1, 58.87),
            Isopach::new(0.05, 95.75),
            Isopach::new(0.02, 181.56),
            Isopach::new(0.01, 275.1),
        ]
    }

    fn report(request: FitRequest) -> FitReport {
        let fit = fit_isopachs(&sample_isopachs(), &request).unwrap();
        FitReport::new("deposit.csv", &["Hekla".to_string()], request, fit)
    }

    #[test]
    fn exponential_summary_lists_segments() {
        let text = format_fit_summary(&report(FitRequest::Exponential { segments: 2 }));
        assert!(text.starts_with("Filename: deposit.csv\nComment 1: Hekla\n"));
        assert!(text.contains("Number of segments: 2"));
        assert!(text.contains("Segment 0 Bt: "));
        assert!(text.contains("Segment 1 Limit: inf"));
        assert!(text.contains("Total Volume: 3.22"));
    }

    #[test]
    fn power_law_summary_has_suggested_limit() {
        let text = format_fit_summary(&report(FitRequest::PowerLaw {
            proximal_limit_km: 1.0,
            distal_limit_km: 300.0,
        }));
        assert!(text.contains("Exponent: 1.29"), "{text}");
        assert!(text.contains("Suggested Proximal Limit: "));
        assert!(!text.contains("N/A"));
    }
}
