//! JSON exports: fit reports and error surfaces.
//!
//! Non-finite numbers (the `+∞` exponential limit, undefined surface cells)
//! are written as `null`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::AppError;

/// Write any serialisable value as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create JSON export '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| AppError::new(2, format!("Failed to write JSON export '{}': {e}", path.display())))?;

    info!(file = %path.display(), "wrote JSON export");
    Ok(())
}

/// Render a serialisable value as pretty-printed JSON for stdout.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::new(2, format!("Failed to serialise JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Limits {
        limits: Vec<f64>,
    }

    #[test]
    fn infinity_becomes_null() {
        let json = to_json_string(&Limits {
            limits: vec![0.0, f64::INFINITY],
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["limits"][0], 0.0);
        assert!(value["limits"][1].is_null());
    }

    #[test]
    fn writes_file() {
        let path = std::env::temp_dir().join(format!("ashcalc-export-{}.json", std::process::id()));
        write_json(&path, &Limits { limits: vec![1.0] }).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.contains("\"limits\""));
    }
}
