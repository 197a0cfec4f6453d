use std::fmt;

/// An opaque UPS status token as reported by the status tool (e.g. "OL", "OB", "LB").
///
/// Two sentinel values exist: [`UpsStatus::none`], meaning no reading has been taken
/// yet, and [`UpsStatus::unknown`], meaning the reader could not determine a status.
/// Both compare as ordinary values, so a transition into or out of either sentinel is
/// a reportable change like any other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsStatus(String);

impl UpsStatus {
    /// Initial sentinel: no reading taken yet.
    pub fn none() -> Self {
        Self("NONE".to_string())
    }

    /// Failure sentinel: the status could not be determined.
    pub fn unknown() -> Self {
        Self("UNKNOWN".to_string())
    }

    /// Build a status from raw tool output, trimming surrounding whitespace.
    pub fn from_raw(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
