//! Transaction snapshots as sent by the client.
//!
//! The client reads transactions from the managed backend and forwards a copy
//! of the rows it wants analysed or printed. The server only ever reads these
//! snapshots, so unknown fields such as IDs or receipt references are ignored.

use std::fmt;

use serde::{Deserialize, Deserializer, de};
use time::{Date, Month, format_description::BorrowedFormatItem, macros::format_description};

/// The label used for transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A read-only copy of a transaction taken from the managed backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionSnapshot {
    /// The value of the transaction in dollars.
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    /// The category name as joined by the client.
    #[serde(default)]
    pub category: Option<String>,
    /// Older clients send the joined category name under this key.
    #[serde(default)]
    pub category_name: Option<String>,
    /// The date the transaction occurred, as an ISO-8601 date or date-time.
    #[serde(default)]
    pub date: String,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionSnapshot {
    /// Create a snapshot with a category and date, mostly useful in tests.
    pub fn new(amount: f64, category: &str, date: &str) -> Self {
        Self {
            amount,
            category: Some(category.to_owned()),
            category_name: None,
            date: date.to_owned(),
            description: None,
        }
    }

    /// Set the description of the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// The category label, preferring `category` over `category_name`.
    ///
    /// Blank names count as missing and resolve to [UNCATEGORIZED_LABEL].
    pub fn category_label(&self) -> &str {
        [&self.category, &self.category_name]
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
            .unwrap_or(UNCATEGORIZED_LABEL)
    }

    /// The description, or `None` if it is missing or blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
    }

    /// The date formatted as "YYYY-MM-DD".
    ///
    /// Date-times are truncated to their date. Strings that do not start with
    /// an ISO-8601 date are returned unchanged.
    pub fn display_date(&self) -> String {
        match self.parsed_date() {
            Some(date) => date
                .format(ISO_DATE_FORMAT)
                .unwrap_or_else(|_| self.date.clone()),
            None => self.date.clone(),
        }
    }

    fn parsed_date(&self) -> Option<Date> {
        let date_part = self.date.get(..10)?;
        Date::parse(date_part, ISO_DATE_FORMAT).ok()
    }
}

/// Accepts amounts as JSON numbers or numeric strings, e.g. `12.5` or `"12.50"`.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    let amount = match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(amount) => amount,
        RawAmount::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid amount \"{text}\"")))?,
    };

    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(de::Error::custom("amount must be a finite number"))
    }
}

/// A reporting month as sent by the client, either a number (`3`) or a name (`"March"`).
///
/// The raw value is kept so it can be echoed back verbatim, e.g. in file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodMonth(String);

impl PeriodMonth {
    /// Create a month from its raw value.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_owned())
    }

    /// The value exactly as the client sent it.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The English name of the month if the raw value can be resolved, e.g. "March".
    ///
    /// Falls back to the raw value.
    pub fn display_name(&self) -> String {
        self.month()
            .map(|month| month.to_string())
            .unwrap_or_else(|| self.0.clone())
    }

    fn month(&self) -> Option<Month> {
        if let Ok(number) = self.0.parse::<u8>() {
            return Month::try_from(number).ok();
        }

        let lowercase = self.0.to_lowercase();
        let mut month = Month::January;
        for _ in 0..12 {
            let name = month.to_string().to_lowercase();
            if name == lowercase || (lowercase.len() >= 3 && name.starts_with(&lowercase)) {
                return Some(month);
            }
            month = month.next();
        }

        None
    }
}

impl fmt::Display for PeriodMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PeriodMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawMonth {
            Number(u64),
            Text(String),
        }

        match RawMonth::deserialize(deserializer)? {
            RawMonth::Number(number) => Ok(PeriodMonth(number.to_string())),
            RawMonth::Text(text) if text.trim().is_empty() => {
                Err(de::Error::custom("month must not be empty"))
            }
            RawMonth::Text(text) => Ok(PeriodMonth::new(&text)),
        }
    }
}

/// A reporting year, sent by the client as a number or a numeric string.
pub(crate) fn deserialize_optional_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(i32),
        Text(String),
    }

    match Option::<RawYear>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawYear::Number(year)) => Ok(Some(year)),
        Some(RawYear::Text(text)) => text
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid year \"{text}\""))),
    }
}

/// Format a period for prose, e.g. "March 2024", or "this period" if unknown.
pub(crate) fn period_label(month: Option<&PeriodMonth>, year: Option<i32>) -> String {
    match (month, year) {
        (Some(month), Some(year)) => format!("{} {year}", month.display_name()),
        (Some(month), None) => month.display_name(),
        (None, Some(year)) => year.to_string(),
        (None, None) => "this period".to_owned(),
    }
}
