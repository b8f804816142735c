use crate::pdf_extract::PdfError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Failures a handler turns into an HTTP error response.
///
/// LLM failures are absent on purpose: they are rendered in place of the result.
#[derive(Debug)]
pub enum AppError {
    /// The multipart body had no `file` part.
    MissingFile,
    /// The `file` part carried no filename to check.
    UnnamedFile,
    /// The uploaded filename does not end in `.pdf`.
    NotPdf(String),
    /// The submitted text was not base64 of UTF-8.
    BadEncoding(String),
    /// The upload could not be read as a PDF.
    Pdf(PdfError),
    /// The multipart stream itself was broken or too large.
    Multipart(MultipartError),
    /// A page template failed to render.
    Render(minijinja::Error),
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        AppError::Pdf(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Multipart(err)
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Render(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "No file uploaded. Send the PDF in a 'file' field.".to_string(),
            ),
            AppError::UnnamedFile => (
                StatusCode::BAD_REQUEST,
                "The uploaded file has no filename; a '.pdf' name is required.".to_string(),
            ),
            AppError::NotPdf(name) => (
                StatusCode::BAD_REQUEST,
                format!("'{name}' is not a PDF file."),
            ),
            AppError::BadEncoding(reason) => (
                StatusCode::BAD_REQUEST,
                format!("The submitted text could not be decoded: {reason}"),
            ),
            AppError::Pdf(err) => {
                error!(error = %err, "PDF extraction failed");
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            AppError::Multipart(err) => {
                error!(error = %err, "Multipart upload failed");
                (err.status(), err.body_text())
            }
            AppError::Render(err) => {
                error!(error = ?err, "Template rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
