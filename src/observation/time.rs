//! Timestamp parsing for observation and result files

use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse RFC 3339 or a naive `YYYY-MM-DD HH:MM:SS` timestamp (taken as UTC)
pub fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    let s = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unrecognised timestamp '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_time_variants() {
        let expected = Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(parse_time("2022-03-04 05:06:07").unwrap(), expected);
        assert_eq!(parse_time("2022-03-04T05:06:07").unwrap(), expected);
        assert_eq!(parse_time("2022-03-04T05:06:07Z").unwrap(), expected);
        assert_eq!(parse_time("2022-03-04T06:06:07+01:00").unwrap(), expected);
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let t = parse_time("2022-03-04 05:06:07.250").unwrap();
        assert_eq!(t.timestamp_subsec_millis(), 250);
    }
}
