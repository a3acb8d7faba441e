//! Isopach file reader.
//!
//! Format: one `thickness_m,sqrt_area_km` pair per line. Lines beginning
//! with `#` are comments and are returned (without the `#`) for the report
//! header. Blank lines are ignored.
//!
//! Only parsing happens here. Deposit validation (positivity, unique
//! thicknesses) is left to the fit so every entry point shares it.

use std::fs;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::domain::Isopach;
use crate::error::AppError;

/// Parsed contents of an isopach file.
#[derive(Debug, Clone, PartialEq)]
pub struct IsopachFile {
    pub isopachs: Vec<Isopach>,
    pub comments: Vec<String>,
}

/// Read and parse an isopach file.
pub fn read_isopach_file(path: &Path) -> Result<IsopachFile, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read isopach file '{}': {e}", path.display())))?;

    let parsed = parse_isopachs(&text).map_err(|e| e.with_context(&path.display().to_string()))?;

    info!(
        file = %path.display(),
        isopachs = parsed.isopachs.len(),
        comments = parsed.comments.len(),
        "loaded isopach file"
    );
    Ok(parsed)
}

/// Parse isopach file contents.
pub fn parse_isopachs(text: &str) -> Result<IsopachFile, AppError> {
    let comments = text
        .lines()
        .filter_map(|line| line.strip_prefix('#'))
        .map(|c| c.trim().to_string())
        .collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut isopachs = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::new(2, format!("Failed to read isopach row: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.iter().all(str::is_empty) {
            continue;
        }
        isopachs.push(parse_record(&record, line)?);
    }

    Ok(IsopachFile { isopachs, comments })
}

fn parse_record(record: &StringRecord, line: u64) -> Result<Isopach, AppError> {
    if record.len() != 2 {
        return Err(AppError::new(
            2,
            format!(
                "line {line}: expected 2 values (thickness, sqrt(area)), found {}",
                record.len()
            ),
        ));
    }

    let field = |idx: usize, name: &str| -> Result<f64, AppError> {
        let raw = &record[idx];
        raw.parse::<f64>()
            .map_err(|_| AppError::new(2, format!("line {line}: invalid {name} '{raw}'")))
    };

    Ok(Isopach::new(field(0, "thickness")?, field(1, "sqrt(area)")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_comments() {
        let text = "# Hekla 1947\n#  sample B \n0.4,16.25\n\n0.2, 30.63\n";
        let parsed = parse_isopachs(text).unwrap();
        assert_eq!(parsed.comments, vec!["Hekla 1947".to_string(), "sample B".to_string()]);
        assert_eq!(
            parsed.isopachs,
            vec![Isopach::new(0.4, 16.25), Isopach::new(0.2, 30.63)]
        );
    }

    #[test]
    fn comments_may_follow_data() {
        let parsed = parse_isopachs("0.4,16.25\n# trailing note, with comma\n0.2,30.63").unwrap();
        assert_eq!(parsed.isopachs.len(), 2);
        assert_eq!(parsed.comments, vec!["trailing note, with comma".to_string()]);
    }

    #[test]
    fn malformed_rows_name_the_line() {
        let err = parse_isopachs("0.4,16.25\n0.2,abc\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("line 2"), "{err}");

        let err = parse_isopachs("0.4,16.25,1\n").unwrap_err();
        assert!(err.to_string().contains("expected 2 values"), "{err}");
    }

    #[test]
    fn reads_from_disk() {
        let path = std::env::temp_dir().join(format!("ashcalc-isopach-{}.csv", std::process::id()));
        fs::write(&path, "# test\n1.0,10.0\n0.5,20.0\n").unwrap();
        let parsed = read_isopach_file(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(parsed.isopachs.len(), 2);
        assert_eq!(parsed.comments, vec!["test".to_string()]);

        let missing = read_isopach_file(Path::new("/nonexistent/ashcalc.csv")).unwrap_err();
        assert_eq!(missing.exit_code(), 2);
    }
}
