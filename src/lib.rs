//! Upload a PDF invoice, pull out its text and let a hosted chat model turn it
//! into JSON.

pub mod config;
pub mod llm_extract;
pub mod pdf_extract;
pub mod prompt;
pub mod web;
