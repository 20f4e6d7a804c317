//! Clock timestamps arrive either as naive local date-times
//! (`2024-03-01T09:00:00`) or as RFC 3339 instants (`2024-03-01T09:00:00Z`).
//! Both decode to a `NaiveDateTime`; RFC 3339 values are normalized to UTC.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

pub(crate) mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&value.format(WIRE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn accepts_naive_and_rfc3339() {
        assert_eq!(parse("2024-03-01T09:15:00"), Some(at(9, 15)));
        assert_eq!(
            parse("2024-03-01T09:15:00.250"),
            Some(at(9, 15) + chrono::Duration::milliseconds(250))
        );
        assert_eq!(parse("2024-03-01T09:15"), Some(at(9, 15)));
        assert_eq!(parse("2024-03-01T09:15:00Z"), Some(at(9, 15)));
        assert_eq!(parse("2024-03-01T11:15:00+02:00"), Some(at(9, 15)));
        assert_eq!(parse("yesterday"), None);
    }
}
