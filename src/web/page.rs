use minijinja::Environment;
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// What the single page shows for one request. Unset fields hide their section.
#[derive(Debug, Default, Serialize)]
pub struct PageContext<'a> {
    pub filename: Option<&'a str>,
    pub document_id: Option<&'a str>,
    pub page_count: Option<usize>,
    pub text: Option<&'a str>,
    /// `text` as URL-safe base64, carried by the submit form so it comes back byte-exact.
    pub encoded_text: Option<&'a str>,
    pub result: Option<&'a str>,
}

/// Compiled page templates. Output is HTML-escaped.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render_index(&self, ctx: &PageContext<'_>) -> Result<String, minijinja::Error> {
        self.env.get_template("index.html")?.render(ctx)
    }
}
