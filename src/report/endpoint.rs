//! Defines the endpoint for downloading an expense report.

use axum::{
    Extension,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::AuthenticatedUser,
    json::ApiJson,
    report::{
        model::{ExpenseReport, ReportRequest},
        pdf::render_pdf,
    },
};

/// A route handler that renders the transactions in the request body as a PDF
/// attachment.
///
/// # Errors
/// Responds with 400 if the month or year is missing and with 500 if the PDF
/// cannot be rendered.
pub async fn generate_report_endpoint(
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<ReportRequest>,
) -> Result<Response, Error> {
    let report = ExpenseReport::new(request, OffsetDateTime::now_utc().date())?;
    let bytes = render_pdf(&report)?;

    tracing::info!(
        "Rendered {} for user {} ({} rows, {} bytes)",
        report.file_name,
        user.id,
        report.rows.len(),
        bytes.len()
    );

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
