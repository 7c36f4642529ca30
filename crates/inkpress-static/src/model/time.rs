use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use serde::ser::{Serialize, SerializeStruct, Serializer};

const LAYOUTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// A local timestamp attached to posts and pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(NaiveDateTime);

impl Time {
    pub fn from_system(t: SystemTime) -> Self {
        Self(DateTime::<Local>::from(t).naive_local())
    }

    /// Parse a metadata date, falling back to `fallback` when it is empty or invalid.
    pub fn parse_or(raw: &str, fallback: SystemTime) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            if !raw.trim().is_empty() {
                tracing::warn!("Unrecognized date {:?}, using file time", raw);
            }
            Self::from_system(fallback)
        })
    }

    /// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM` and `YYYY-MM-DD`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        LAYOUTS
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn format(&self, layout: &str) -> String {
        self.0.format(layout).to_string()
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Time", 5)?;
        s.serialize_field("Year", &self.year())?;
        s.serialize_field("Month", &self.month())?;
        s.serialize_field("Day", &self.0.day())?;
        s.serialize_field("Date", &self.format("%Y-%m-%d"))?;
        s.serialize_field("Iso", &self.format("%Y-%m-%dT%H:%M:%S"))?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_layouts() {
        let t = Time::parse("2021-01-02 03:04:05").unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M:%S"), "2021-01-02 03:04:05");

        let t = Time::parse("2021-01-02 03:04").unwrap();
        assert_eq!(t.format("%H:%M"), "03:04");

        let t = Time::parse(" 2021-01-02 ").unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2021, 1, 2).unwrap());

        assert!(Time::parse("January 2nd").is_none());
        assert!(Time::parse("").is_none());
    }

    #[test]
    fn falls_back_to_file_time() {
        let file_time = SystemTime::UNIX_EPOCH;

        assert_eq!(Time::parse_or("nope", file_time), Time::from_system(file_time));
        assert_eq!(
            Time::parse_or("2020-05-06", file_time).date(),
            NaiveDate::from_ymd_opt(2020, 5, 6).unwrap()
        );
    }
}
