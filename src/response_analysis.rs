// Response analysis for SQLi Sentinel
// Heuristics that turn one probe outcome into at most one finding

use lazy_static::lazy_static;
use regex::Regex;

use crate::engine::ProbeOutcome;
use crate::payloads::{BOOLEAN_BASED, TIME_BASED, UNION_BASED};
use crate::severity::cvss_score;

/// Vendor error strings that leak from a broken SQL statement
pub const SQL_ERROR_FINGERPRINTS: &[&str] = &[
    "sql syntax",
    "mysql_fetch",
    "ora-01756",
    "microsoft ole db",
    "odbc driver",
    "sqlite_error",
    "postgresql error",
    "warning: mysql",
    "valid mysql result",
    "mysqlclient",
];

/// Union hits need a 200 with a body longer than this many characters
pub const UNION_MIN_BODY_CHARS: usize = 1000;

lazy_static! {
    static ref SQL_ERROR_PATTERN: Regex = {
        let alternatives: Vec<String> = SQL_ERROR_FINGERPRINTS
            .iter()
            .map(|f| regex::escape(f))
            .collect();
        Regex::new(&format!("(?i){}", alternatives.join("|"))).unwrap()
    };
}

/// A positive detection, before severity is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub parameter: String,
    pub description: String,
    pub cvss_score: String,
    /// The probed URL
    pub endpoint: String,
}

/// First SQL error fingerprint found in `body`, lowercased.
pub fn find_sql_error(body: &str) -> Option<String> {
    SQL_ERROR_PATTERN
        .find(body)
        .map(|m| m.as_str().to_lowercase())
}

/// Decide whether a probe outcome signals SQL injection.
///
/// Checks, in order:
/// 1. Network failure under time-based testing: the payload stalled the server.
/// 2. A SQL error fingerprint anywhere in the body, whatever the technique.
/// 3. Union-based: a UNION payload answered with 200 and a body over 1000 chars.
/// 4. Boolean-based: 200 with any body.
///
/// 3 and 4 stand in for baseline-differential analysis and are kept coarse.
pub fn analyze(
    technique: &str,
    outcome: &ProbeOutcome,
    parameter: &str,
    probed_url: &str,
    payload: &str,
) -> Option<Finding> {
    let finding = |description: String, cvss: &str| Finding {
        parameter: parameter.to_string(),
        description,
        cvss_score: cvss.to_string(),
        endpoint: probed_url.to_string(),
    };

    let (status, body) = match outcome {
        ProbeOutcome::NetworkFailure { .. } => {
            return if technique == TIME_BASED {
                Some(finding(
                    format!(
                        "Time-based SQL injection detected: Request timeout after {}",
                        payload
                    ),
                    "7.5",
                ))
            } else {
                None
            };
        }
        ProbeOutcome::Response { status, body } => (*status, body.as_str()),
    };

    if find_sql_error(body).is_some() {
        return Some(finding(
            format!(
                "SQL injection vulnerability detected via error-based testing with payload: {}",
                payload
            ),
            cvss_score(technique),
        ));
    }

    if technique == UNION_BASED && payload.contains("UNION") {
        if status == 200 && body.chars().count() > UNION_MIN_BODY_CHARS {
            return Some(finding(
                format!("Potential union-based SQL injection detected with payload: {}", payload),
                cvss_score(UNION_BASED),
            ));
        }
        return None;
    }

    if technique == BOOLEAN_BASED && status == 200 && !body.is_empty() {
        return Some(finding(
            format!(
                "Boolean-based blind SQL injection indicators detected with payload: {}",
                payload
            ),
            cvss_score(BOOLEAN_BASED),
        ));
    }

    None
}
