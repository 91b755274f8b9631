use std::path::Path;

use anyhow::Result;

use crate::SyncError;

/// Night identifier: the Julian Date truncated downward to a whole day.
/// Frames taken the same observing night share one identifier and therefore
/// one remote directory.
pub fn night_id(jd: f64) -> Result<i64> {
    if !jd.is_finite() || jd < 0.0 {
        return Err(SyncError::KeywordOutOfRange(jd).into());
    }
    Ok(jd.floor() as i64)
}

/// Reads the date keyword from the frame header via the telescope suite's
/// `readkeyword` helper and parses its stdout as a real number.
///
/// A missing or unparsable keyword is fatal; every frame written by the
/// camera daemon carries it, so there is no retry path.
pub fn read_date_keyword(file: &Path, keyword: &str) -> Result<f64> {
    let output = std::process::Command::new("readkeyword")
        .arg(file)
        .arg(keyword)
        .output()
        .map_err(|e| SyncError::KeywordReadFailed(file.to_path_buf(), e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(SyncError::KeywordReadFailed(
            file.to_path_buf(),
            format!("readkeyword exited {}: {}", output.status, stderr),
        )
        .into());
    }
    parse_keyword_value(&String::from_utf8_lossy(&output.stdout))
}

pub fn parse_keyword_value(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| SyncError::KeywordNotNumeric(trimmed.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_id_floors_fractional_dates() {
        assert_eq!(night_id(2459123.73).unwrap(), 2459123);
        assert_eq!(night_id(2459123.0).unwrap(), 2459123);
        assert_eq!(night_id(0.99).unwrap(), 0);
    }

    #[test]
    fn night_id_rejects_bad_values() {
        assert!(night_id(-1.0).is_err());
        assert!(night_id(f64::NAN).is_err());
        assert!(night_id(f64::INFINITY).is_err());
    }

    #[test]
    fn keyword_value_parses_with_whitespace() {
        assert_eq!(parse_keyword_value(" 2459123.73\n").unwrap(), 2459123.73);
        assert!(parse_keyword_value("JD missing").is_err());
        assert!(parse_keyword_value("").is_err());
    }
}
