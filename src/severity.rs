// Severity classification for SQLi Sentinel
//
// Severity is derived from the finding's description text while the CVSS
// score is a fixed per-technique lookup. The two are independent: an
// error-signature hit under boolean-based testing is critical, yet scores 7.0.

use crate::models::Severity;
use crate::payloads::{BOOLEAN_BASED, ERROR_BASED, TIME_BASED, UNION_BASED};

/// Score for techniques missing from the lookup table
pub const UNKNOWN_CVSS: &str = "6.0";

/// Fixed CVSS base score for a technique, as a one-decimal string.
pub fn cvss_score(technique: &str) -> &'static str {
    match technique {
        UNION_BASED => "9.1",
        ERROR_BASED => "8.6",
        TIME_BASED => "7.5",
        BOOLEAN_BASED => "7.0",
        _ => UNKNOWN_CVSS,
    }
}

/// Severity from the description alone. First match wins.
pub fn severity_for(description: &str) -> Severity {
    let text = description.to_lowercase();
    if text.contains(UNION_BASED) || text.contains(ERROR_BASED) {
        Severity::Critical
    } else if text.contains(TIME_BASED) || text.contains(BOOLEAN_BASED) {
        Severity::High
    } else {
        Severity::Medium
    }
}

pub fn classify(technique: &str, description: &str) -> (Severity, &'static str) {
    (severity_for(description), cvss_score(technique))
}
