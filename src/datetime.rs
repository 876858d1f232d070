//! Date/time utilities for Cabinet.

/// Convert a SQLite datetime string to RFC3339 format.
///
/// SQLite `datetime('now')` produces "YYYY-MM-DD HH:MM:SS" in UTC.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_to_rfc3339() {
        assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_to_rfc3339_is_parseable() {
        let converted = to_rfc3339("2024-02-29 23:59:59");
        assert!(DateTime::parse_from_rfc3339(&converted).is_ok());
    }
}
