use super::page::Pages;
use crate::config::Config;
use crate::llm_extract::ChatCompletion;
use crate::pdf_extract::PdfBackend;
use std::sync::Arc;

/// The shared application state.
///
/// Everything here is immutable once built; per-user data (the uploaded file,
/// its text, the model's answer) travels in the requests themselves.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn ChatCompletion>,
    pub pages: Arc<Pages>,
    pub pdf_backend: PdfBackend,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build the state around an already constructed chat-completion client.
    pub fn new(config: &Config, llm: Arc<dyn ChatCompletion>) -> Result<Self, minijinja::Error> {
        Ok(Self {
            llm,
            pages: Arc::new(Pages::new()?),
            pdf_backend: config.pdf.backend,
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}
