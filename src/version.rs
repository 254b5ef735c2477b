use crate::error::UpdateError;
use std::fmt;
use std::str::FromStr;

/// Number of dot separated segments in an assembly version
pub const SEGMENT_COUNT: usize = 4;

/// Checks that `candidate` has exactly four non-empty, all-digit segments.
///
/// There is no bound on the number of digits, so `"0001.2.3.99999999999"` is
/// accepted as written.
pub fn validate(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('.').collect();
    parts.len() == SEGMENT_COUNT
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// A validated four-part version such as `1.0.0.0`.
///
/// The original text is kept so leading zeros survive a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    raw: String,
}

impl Version {
    pub fn parse(candidate: &str) -> Result<Self, UpdateError> {
        if validate(candidate) {
            Ok(Version { raw: candidate.to_string() })
        } else {
            Err(UpdateError::InvalidVersionFormat(candidate.to_string()))
        }
    }

    /// Builds a version from separately entered segments, e.g. `["1", "2", "0", "7"]`
    pub fn from_segments(segments: &[&str]) -> Result<Self, UpdateError> {
        Self::parse(&segments.join("."))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('.')
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_four_numeric_segments() {
        assert!(validate("1.2.3.4"));
        assert!(validate("0.0.0.1"));
        assert!(validate("10.200.3000.40000"));
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert!(!validate("1.2.3"));
        assert!(!validate("1.2.3.a"));
        assert!(!validate("1..3.4"));
        assert!(!validate(""));
        assert!(!validate("1.2.3.4.5"));
        assert!(!validate("1.2.3.4 "));
        assert!(!validate("1.2.3.-4"));
        assert!(!validate("v1.2.3.4"));
    }

    #[test]
    fn test_validate_rejects_non_ascii_digits() {
        assert!(!validate("1.2.3.٤"));
    }

    #[test]
    fn test_validate_has_no_magnitude_limit() {
        assert!(validate("99999999999999999999.0.0.0"));
    }

    #[test]
    fn test_parse_preserves_leading_zeros() {
        let version = Version::parse("01.002.0.0").unwrap();
        assert_eq!(version.as_str(), "01.002.0.0");
        assert_eq!(version.to_string(), "01.002.0.0");
        assert_eq!(version.segments().collect::<Vec<_>>(), vec!["01", "002", "0", "0"]);
    }

    #[test]
    fn test_parse_invalid_reports_candidate() {
        let err = Version::parse("1.2.3").unwrap_err();
        assert!(matches!(err, UpdateError::InvalidVersionFormat(ref v) if v == "1.2.3"));
    }

    #[test]
    fn test_from_segments() {
        let version = Version::from_segments(&["2", "1", "0", "15"]).unwrap();
        assert_eq!(version.as_str(), "2.1.0.15");
        assert!(Version::from_segments(&["2", "", "0", "15"]).is_err());
        assert!(Version::from_segments(&["2", "1", "0"]).is_err());
    }

    #[test]
    fn test_from_str() {
        let version: Version = "3.1.4.1".parse().unwrap();
        assert_eq!(version, Version::parse("3.1.4.1").unwrap());
        assert!("3.1.4".parse::<Version>().is_err());
    }
}
