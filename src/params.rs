// Test parameter resolution for SQLi Sentinel
// Turns a target's raw query-string-like text into the parameters to probe

/// Parameters probed when a target declares none
pub const DEFAULT_PARAMETERS: &[(&str, &str)] = &[("id", "1"), ("user", "admin"), ("search", "test")];

/// Parse `raw` as form-urlencoded pairs, in order, duplicates kept.
/// A leading `?` is ignored and pairs with an empty name are dropped.
/// Falls back to `DEFAULT_PARAMETERS` when nothing usable is present.
pub fn resolve_test_parameters(raw: Option<&str>) -> Vec<(String, String)> {
    let raw = raw.map(str::trim).unwrap_or("");
    let raw = raw.strip_prefix('?').unwrap_or(raw);

    let parsed: Vec<(String, String)> = url::form_urlencoded::parse(raw.as_bytes())
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if parsed.is_empty() {
        DEFAULT_PARAMETERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(params: &[(String, String)]) -> Vec<&str> {
        params.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn defaults_when_missing() {
        assert_eq!(names(&resolve_test_parameters(None)), vec!["id", "user", "search"]);
        assert_eq!(names(&resolve_test_parameters(Some(""))), vec!["id", "user", "search"]);
        assert_eq!(names(&resolve_test_parameters(Some("   "))), vec!["id", "user", "search"]);
    }

    #[test]
    fn parses_pairs_in_order() {
        let params = resolve_test_parameters(Some("?page=2&q=hello+world&page=3"));
        assert_eq!(
            params,
            vec![
                ("page".to_string(), "2".to_string()),
                ("q".to_string(), "hello world".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn name_without_value() {
        let params = resolve_test_parameters(Some("token&=orphan"));
        assert_eq!(params, vec![("token".to_string(), String::new())]);
    }
}
