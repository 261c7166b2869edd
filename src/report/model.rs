//! The content of an expense report, independent of how it is laid out.

use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    insights::format_amount,
    transaction::{PeriodMonth, TransactionSnapshot, deserialize_optional_year},
};

/// The summary printed when the client did not send one.
pub const MISSING_SUMMARY_TEXT: &str = "No summary provided.";

/// The placeholder printed for transactions without a description.
pub const MISSING_DESCRIPTION_TEXT: &str = "-";

const GENERATED_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The request body for rendering a report.
///
/// A caller-supplied `total` is deliberately not part of this type, the
/// report total is always computed from the transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    /// The month the report covers.
    #[serde(default)]
    pub month: Option<PeriodMonth>,
    /// The year the report covers.
    #[serde(default, deserialize_with = "deserialize_optional_year")]
    pub year: Option<i32>,
    /// The transactions to list, in the order the client listed them.
    pub transactions: Vec<TransactionSnapshot>,
    /// The insight text to print above the table.
    #[serde(default)]
    pub summary: Option<String>,
}

/// One line of the transaction table, already formatted for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// The transaction date.
    pub date: String,
    /// The category label.
    pub category: String,
    /// The description or [MISSING_DESCRIPTION_TEXT].
    pub description: String,
    /// The amount with two decimals.
    pub amount: String,
}

/// Everything printed in an expense report.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseReport {
    /// The document title, e.g. "Expense Report - March 2024".
    pub title: String,
    /// The download file name, e.g. "expense-report-3-2024.pdf".
    pub file_name: String,
    /// The date the report was generated, e.g. "2024-04-01".
    pub generated_on: String,
    /// The summary text.
    pub summary: String,
    /// One row per transaction, in request order.
    pub rows: Vec<ReportRow>,
    /// The sum of the amounts of every listed transaction.
    pub total: f64,
}

impl ExpenseReport {
    /// Build the report content for `request`, generated on `today`.
    ///
    /// # Errors
    /// Returns [Error::InvalidRequest] if the month or year is missing.
    pub fn new(request: ReportRequest, today: Date) -> Result<Self, Error> {
        let (Some(month), Some(year)) = (request.month, request.year) else {
            return Err(Error::InvalidRequest(
                "Month and year are required".to_owned(),
            ));
        };

        let rows = request
            .transactions
            .iter()
            .map(|transaction| ReportRow {
                date: transaction.display_date(),
                category: transaction.category_label().to_owned(),
                description: transaction
                    .description_text()
                    .unwrap_or(MISSING_DESCRIPTION_TEXT)
                    .to_owned(),
                amount: format_amount(transaction.amount),
            })
            .collect();
        let total: f64 = request
            .transactions
            .iter()
            .map(|transaction| transaction.amount)
            .sum();

        let summary = request
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|summary| !summary.is_empty())
            .unwrap_or(MISSING_SUMMARY_TEXT)
            .to_owned();

        Ok(Self {
            title: format!("Expense Report - {} {year}", month.display_name()),
            file_name: sanitize_file_name(&format!("expense-report-{month}-{year}.pdf")),
            generated_on: today
                .format(GENERATED_DATE_FORMAT)
                .unwrap_or_else(|_| today.to_string()),
            summary,
            rows,
            total,
        })
    }

    /// The total with two decimals.
    pub fn formatted_total(&self) -> String {
        format_amount(self.total)
    }
}

/// Replace characters that are not safe in a `Content-Disposition` file name.
fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
