//! HTML feature extraction layer.
//!
//! Turns a raw HTML snapshot into a [`FeatureRecord`]: the lowercased,
//! whitespace-collapsed visible text plus a canonical rendition of every
//! style the page carries (inline attributes, `<style>` blocks and linked
//! stylesheets).
//!
//! ## Contract
//!
//! - Output depends only on the document bytes, the [`ExtractConfig`] and
//!   whatever the supplied [`StylesheetFetcher`] returns.
//! - A failing stylesheet fetch never fails the document; it simply
//!   contributes nothing.
//! - Text inside `script`, `style`, `noscript` and `iframe` elements is not
//!   part of the visible text.
//!
//! ## Example
//!
//! ```
//! use extract::{extract, ExtractConfig, NoopFetcher};
//!
//! let html = r#"<html><body style="margin:0; color:red">Hello <b>World</b></body></html>"#;
//! let record = extract(html, "index.html", &NoopFetcher, &ExtractConfig::default()).unwrap();
//!
//! assert_eq!(record.visible_text, "hello world");
//! assert_eq!(record.normalized_style_text, "color:red;margin:0");
//! ```

mod config;
mod css;
mod document;
mod error;
mod fetch;
mod html;
mod whitespace;

pub use crate::config::{ExtractConfig, DEFAULT_USER_AGENT};
pub use crate::css::normalize_css;
pub use crate::document::FeatureRecord;
pub use crate::error::ExtractError;
pub use crate::fetch::{
    resolve_stylesheet_url, FetchError, HttpFetcher, NoopFetcher, StylesheetFetcher,
};
pub use crate::html::{extract, extract_visible_text, HIDDEN_TAGS};
pub use crate::whitespace::collapse_whitespace;
