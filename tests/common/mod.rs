//! Shared helpers for the integration tests: in-memory PDFs, a scripted chat
//! model and a server spawned on a random port.

// Not every test file uses every helper.
#![allow(unused)]

use async_trait::async_trait;
use invoice_extractor::config::Config;
use invoice_extractor::llm_extract::{ChatCompletion, ChatMessage, LlmError};
use invoice_extractor::web::{self, AppState};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// One page of a generated test PDF.
pub enum PageSpec<'a> {
    /// A single line of Helvetica text.
    Text(&'a str),
    /// A grey image and no text layer, like a scanned page.
    ImageOnly,
}

/// Build a PDF in memory, one page per entry.
pub fn build_pdf(pages: &[PageSpec<'_>]) -> Vec<u8> {
    save(build_document(pages))
}

/// Like [`build_pdf`], with every stream Flate-compressed.
pub fn build_compressed_pdf(pages: &[PageSpec<'_>]) -> Vec<u8> {
    let mut doc = build_document(pages);
    doc.compress();
    save(doc)
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save test pdf");
    buf
}

fn build_document(pages: &[PageSpec<'_>]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    for spec in pages {
        let (resources, operations) = match spec {
            PageSpec::Text(text) => (
                dictionary! { "Font" => dictionary! { "F1" => font_id } },
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            ),
            PageSpec::ImageOnly => {
                let image_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => 1,
                        "Height" => 1,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                    },
                    vec![0x80],
                ));
                (
                    dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
                    vec![
                        Operation::new("q", vec![]),
                        Operation::new(
                            "cm",
                            vec![
                                500.into(),
                                0.into(),
                                0.into(),
                                700.into(),
                                40.into(),
                                60.into(),
                            ],
                        ),
                        Operation::new("Do", vec!["Im1".into()]),
                        Operation::new("Q", vec![]),
                    ],
                )
            }
        };

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => resources,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// A chat model that answers from a script and records what it was sent.
pub struct StubLlm {
    reply: Result<String, StatusCode>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubLlm {
    pub fn answering(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn last_call(&self) -> Option<Vec<ChatMessage>> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for StubLlm {
    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(status) => Err(LlmError::from_status(*status, "stubbed failure".to_string())),
        }
    }
}

/// Start the server on a random port; returns its base URL.
pub async fn spawn_app(llm: Arc<dyn ChatCompletion>) -> String {
    spawn_app_with_config(&Config::default(), llm).await
}

pub async fn spawn_app_with_config(config: &Config, llm: Arc<dyn ChatCompletion>) -> String {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init();

    let state = AppState::new(config, llm).expect("build app state");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        if let Err(e) = web::serve(listener, state).await {
            eprintln!("Server error during test: {e}");
        }
    });

    address
}
