use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How date-time values are written into a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeFormat {
    /// Stored as `Value::DateTime`
    #[default]
    Native,
    /// Stored as a formatted string (see `Settings::date_time_string_format`)
    String,
    /// Stored as whole seconds since `Settings::unix_epoch`
    UnixTimeStamp,
}

/// How enumerated values are written into a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnumFormat {
    /// Stored as `Value::Enum` carrying both name and ordinal
    #[default]
    Native,
    /// Stored as the ordinal
    Integer,
    /// Stored as the variant name
    String,
}

/// Field conflict policy for `Document::merge`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Fields of the merged document replace existing ones
    #[default]
    OverwriteFields,
    /// Existing fields are left untouched, only absent ones are added
    KeepFields,
}

/// Encoding defaults consulted by typed setters, date-time parsing and merging.
///
/// Passed explicitly to the `*_with` accessor variants or bound to a
/// `DocumentWriter`; the plain accessors use `Settings::default()`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub date_time_format: DateTimeFormat,

    /// chrono format string used for `DateTimeFormat::String` and for parsing
    /// string fields. RFC 3339 when unset.
    #[serde(default)]
    pub date_time_string_format: Option<String>,

    /// Base for numeric date-time values
    #[serde(default = "default_unix_epoch")]
    pub unix_epoch: DateTime<Utc>,

    #[serde(default)]
    pub enum_format: EnumFormat,

    #[serde(default)]
    pub merge_policy: MergePolicy,
}

fn default_unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_time_format: DateTimeFormat::default(),
            date_time_string_format: None,
            unix_epoch: default_unix_epoch(),
            enum_format: EnumFormat::default(),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    /// Render a date-time the way `DateTimeFormat::String` stores it
    pub fn format_date_time(&self, value: &DateTime<Utc>) -> String {
        match &self.date_time_string_format {
            Some(format) => value.format(format).to_string(),
            None => value.to_rfc3339(),
        }
    }

    /// Parse a date-time string with the configured format.
    ///
    /// Formats without an offset are read as UTC, date-only formats as midnight.
    pub fn parse_date_time(&self, text: &str) -> Option<DateTime<Utc>> {
        match &self.date_time_string_format {
            Some(format) => DateTime::parse_from_str(text, format)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    chrono::NaiveDateTime::parse_from_str(text, format)
                        .ok()
                        .map(|naive| naive.and_utc())
                })
                .or_else(|| {
                    // Date-only formats read as midnight UTC
                    let date = chrono::NaiveDate::parse_from_str(text, format).ok()?;
                    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
                }),
            None => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok(),
        }
    }

    /// Seconds between the configured epoch and `value`
    pub fn to_timestamp(&self, value: &DateTime<Utc>) -> i64 {
        (*value - self.unix_epoch).num_seconds()
    }

    pub fn from_timestamp(&self, seconds: f64) -> Option<DateTime<Utc>> {
        if !seconds.is_finite() {
            return None;
        }
        let millis = (seconds * 1000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        self.unix_epoch
            .checked_add_signed(chrono::Duration::try_milliseconds(millis as i64)?)
    }
}
