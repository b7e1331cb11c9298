//! PaperGraph Outline Service
//!
//! Turns client-supplied paper content into a structured topic outline via
//! an external chat-completion API and renders it as Mermaid flowchart
//! source. The SVG rendering of that source happens outside this service.

mod client;
pub mod mermaid;

pub use client::OutlineClient;
