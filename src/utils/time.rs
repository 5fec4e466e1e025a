use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub fn from_rfc3339(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Parses the date forms the vacancy API emits: RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM:SS`, or a bare `YYYY-MM-DD`.
pub fn parse_api_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// "February 28, 2025"; unparseable input is returned unchanged.
pub fn format_display_date(s: &str) -> String {
    match parse_api_date(s) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_supported_shape() {
        assert_eq!(format_display_date("2025-02-28T00:00:00Z"), "February 28, 2025");
        assert_eq!(format_display_date("2025-03-01T09:30:00"), "March 1, 2025");
        assert_eq!(format_display_date("2025-12-05"), "December 5, 2025");
    }

    #[test]
    fn leaves_unknown_formats_alone() {
        assert_eq!(format_display_date("next week"), "next week");
    }
}
