use super::{errors::AppError, page::PageContext, state::AppState};
use crate::llm_extract::extract_invoice_json;
use crate::pdf_extract::{ExtractedDocument, extract_text_from_pdf};
use crate::prompt::create_prompt;
use axum::{
    Form, Json,
    extract::{Multipart, State},
    http::header,
    response::{Html, IntoResponse},
};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Bundled example invoice offered for download on every page.
pub const SAMPLE_PDF: &[u8] = include_bytes!("../../assets/sample_invoice.pdf");
pub const SAMPLE_FILENAME: &str = "sample_invoice.pdf";

/// The root handler: the page with nothing uploaded yet.
pub async fn root(State(app_state): State<AppState>) -> Result<Html<String>, AppError> {
    let html = app_state.pages.render_index(&PageContext::default())?;
    Ok(Html(html))
}

/// The health check handler.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Serves the sample invoice, independent of any upload.
pub async fn sample_handler() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SAMPLE_FILENAME}\""),
            ),
        ],
        SAMPLE_PDF,
    )
}

/// Accept one PDF, extract its text right away and show it with the submit button.
pub async fn upload_handler(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let (filename, doc) = extract_upload(&app_state, multipart).await?;
    let encoded_text = general_purpose::URL_SAFE.encode(&doc.text);

    let ctx = PageContext {
        filename: Some(&filename),
        document_id: Some(&doc.document_id),
        page_count: Some(doc.page_count()),
        text: Some(&doc.text),
        encoded_text: Some(&encoded_text),
        result: None,
    };
    Ok(Html(app_state.pages.render_index(&ctx)?))
}

/// Form posted by the submit button; carries the text extracted on upload.
///
/// The text travels base64-encoded because browsers normalise line breaks and
/// drop control characters in form values.
#[derive(Debug, Deserialize)]
pub struct ExtractForm {
    pub encoded_text: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl ExtractForm {
    /// The extracted text exactly as the upload page rendered it.
    pub fn text(&self) -> Result<String, AppError> {
        let bytes = general_purpose::URL_SAFE
            .decode(&self.encoded_text)
            .map_err(|e| AppError::BadEncoding(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::BadEncoding(e.to_string()))
    }
}

/// Build the prompt from the posted text, ask the model and show its answer.
pub async fn extract_handler(
    State(app_state): State<AppState>,
    Form(form): Form<ExtractForm>,
) -> Result<Html<String>, AppError> {
    let text = form.text()?;
    info!(chars = text.len(), filename = ?form.filename, "Extraction requested");

    let prompt = create_prompt(&text);
    let result = extract_invoice_json(app_state.llm.as_ref(), &prompt).await;

    let ctx = PageContext {
        filename: form.filename.as_deref(),
        document_id: None,
        page_count: None,
        text: Some(&text),
        encoded_text: Some(&form.encoded_text),
        result: Some(&result),
    };
    Ok(Html(app_state.pages.render_index(&ctx)?))
}

/// JSON twin of `/upload`.
pub async fn api_text_handler(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractedDocument>, AppError> {
    let (_filename, doc) = extract_upload(&app_state, multipart).await?;
    Ok(Json(doc))
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub result: String,
}

/// JSON twin of `/extract`. LLM failures still come back as 200 with the error text.
pub async fn api_extract_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    info!(chars = payload.text.len(), "Extraction requested via API");
    let prompt = create_prompt(&payload.text);
    let result = extract_invoice_json(app_state.llm.as_ref(), &prompt).await;
    Json(ExtractResponse { result })
}

/// Pull the `file` part out of the form, check its extension and extract its text.
async fn extract_upload(
    app_state: &AppState,
    mut multipart: Multipart,
) -> Result<(String, ExtractedDocument), AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().ok_or(AppError::UnnamedFile)?.to_string();
                let bytes = field.bytes().await?.to_vec();
                upload = Some((filename, bytes));
            }
            _ => warn!("Ignoring unknown multipart field: {}", name),
        }
    }

    let (filename, bytes) = upload.ok_or(AppError::MissingFile)?;
    if !has_pdf_extension(&filename) {
        return Err(AppError::NotPdf(filename));
    }
    info!(filename = %filename, bytes = bytes.len(), "PDF uploaded");

    let doc = extract_text_from_pdf(&bytes, app_state.pdf_backend)?;
    Ok((filename, doc))
}

/// Uploads are filtered by extension only; the parser rejects the rest.
fn has_pdf_extension(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}
