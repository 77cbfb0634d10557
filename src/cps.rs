//! Tempo expression (`setcps`) validation.
//!
//! A tempo expression is three runs of ASCII digits separated by `/`,
//! read as beats-per-minute / steps-per-minute / beats-per-cycle.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

const CPS_PATTERN: &str = r"^([0-9]+)/([0-9]+)/([0-9]+)$";

static CPS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CPS_PATTERN).expect("invalid regex pattern"));

/// True iff `value` is exactly `digits/digits/digits` with nothing around it.
pub fn validate_cps(value: &str) -> bool {
    CpsExpr::parse(value).is_some()
}

/// A validated tempo expression. Segments are kept as text because their
/// width is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpsExpr {
    pub bpm: String,
    pub spm: String,
    pub bpc: String,
}

impl CpsExpr {
    pub fn parse(value: &str) -> Option<Self> {
        let caps = CPS_REGEX.captures(value)?;
        Some(CpsExpr {
            bpm: caps[1].to_string(),
            spm: caps[2].to_string(),
            bpc: caps[3].to_string(),
        })
    }
}

impl fmt::Display for CpsExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bpm, self.spm, self.bpc)
    }
}
