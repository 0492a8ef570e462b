//! DOM-level extraction of visible text and style blobs.

use once_cell::sync::Lazy;
use scraper::{Html, Node, Selector};
use tracing::debug;

use crate::config::ExtractConfig;
use crate::css::normalize_css;
use crate::document::FeatureRecord;
use crate::error::ExtractError;
use crate::fetch::{resolve_stylesheet_url, StylesheetFetcher};
use crate::whitespace::collapse_whitespace;

/// Elements whose text never reaches the visible-text signal.
pub const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "iframe"];

static BASE_HREF: Lazy<Selector> = Lazy::new(|| selector("base[href]"));
static STYLE_ATTR: Lazy<Selector> = Lazy::new(|| selector("[style]"));
static STYLE_BLOCK: Lazy<Selector> = Lazy::new(|| selector("style"));
static LINK_HREF: Lazy<Selector> = Lazy::new(|| selector("link[rel][href]"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Extract the feature pair of one HTML document.
///
/// Styles are gathered from the whole document in three passes: inline
/// `style` attributes, then `<style>` blocks, then linked stylesheets. Each
/// blob is normalized with [`normalize_css`] and the results are joined with
/// single spaces. Linked stylesheets are only requested when
/// `cfg.fetch_external_styles` is set.
pub fn extract(
    raw_html: &str,
    doc_id: impl Into<String>,
    fetcher: &dyn StylesheetFetcher,
    cfg: &ExtractConfig,
) -> Result<FeatureRecord, ExtractError> {
    cfg.validate()?;
    let doc_id = doc_id.into();
    if doc_id.is_empty() {
        return Err(ExtractError::MissingDocId);
    }

    let document = Html::parse_document(raw_html);
    let base_url = document
        .select(&BASE_HREF)
        .next()
        .and_then(|base| base.value().attr("href"))
        .filter(|href| !href.trim().is_empty());

    let visible_text = extract_visible_text(&document);
    let normalized_style_text = collect_styles(&document, base_url, fetcher, cfg, &doc_id);

    Ok(FeatureRecord {
        doc_id,
        visible_text,
        normalized_style_text,
    })
}

/// Lowercased, whitespace-collapsed text of every text node outside
/// [`HIDDEN_TAGS`]. Comments are not text nodes and never contribute.
pub fn extract_visible_text(document: &Html) -> String {
    let mut raw = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        if !raw.is_empty() {
            raw.push(' ');
        }
        raw.push_str(text);
    }
    collapse_whitespace(&raw.to_lowercase())
}

fn collect_styles(
    document: &Html,
    base_url: Option<&str>,
    fetcher: &dyn StylesheetFetcher,
    cfg: &ExtractConfig,
    doc_id: &str,
) -> String {
    let mut blobs: Vec<String> = Vec::new();

    for element in document.select(&STYLE_ATTR) {
        if let Some(style) = element.value().attr("style") {
            blobs.push(normalize_css(style));
        }
    }

    for element in document.select(&STYLE_BLOCK) {
        let css: String = element.text().collect();
        if !css.is_empty() {
            blobs.push(normalize_css(&css));
        }
    }

    if cfg.fetch_external_styles {
        for href in stylesheet_hrefs(document) {
            let Some(url) = resolve_stylesheet_url(href, base_url) else {
                debug!(doc_id, href, "skipping unresolvable stylesheet");
                continue;
            };
            let referer = base_url.unwrap_or(url.as_str());
            match fetcher.fetch(&url, referer) {
                Ok(css) if !css.trim().is_empty() => blobs.push(normalize_css(&css)),
                Ok(_) => debug!(doc_id, %url, "stylesheet body is empty"),
                Err(err) => debug!(doc_id, %url, error = %err, "stylesheet fetch failed"),
            }
        }
    }

    blobs.join(" ")
}

/// `href` values of `<link>` elements whose `rel` keyword list contains
/// `stylesheet`.
fn stylesheet_hrefs(document: &Html) -> Vec<&str> {
    document
        .select(&LINK_HREF)
        .filter(|link| {
            link.value().attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|kw| kw.eq_ignore_ascii_case("stylesheet"))
            })
        })
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| !href.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use url::Url;

    use crate::fetch::{FetchError, NoopFetcher};

    /// In-memory fetcher that records every request it serves.
    #[derive(Default)]
    struct MapFetcher {
        sheets: HashMap<String, String>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl MapFetcher {
        fn with(mut self, url: &str, css: &str) -> Self {
            self.sheets.insert(url.to_string(), css.to_string());
            self
        }

        fn requests(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl StylesheetFetcher for MapFetcher {
        fn fetch(&self, url: &Url, referer: &str) -> Result<String, FetchError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), referer.to_string()));
            self.sheets
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn offline() -> ExtractConfig {
        ExtractConfig::default().with_fetch_external_styles(false)
    }

    #[test]
    fn visible_text_is_lowercased_and_collapsed() {
        let html = "<html><head><title>My  Site</title></head>\
                    <body><h1>Hello\n   World</h1><p>Second&nbsp;line</p></body></html>";
        let rec = extract(html, "a.html", &NoopFetcher, &offline()).unwrap();
        assert_eq!(rec.visible_text, "my site hello world second line");
    }

    #[test]
    fn hidden_elements_do_not_contribute_text() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script>var secret = "token";</script></head>
            <body>visible<noscript>enable js</noscript>
            <iframe>frame text</iframe> tail</body></html>"#;
        let rec = extract(html, "a.html", &NoopFetcher, &offline()).unwrap();
        assert_eq!(rec.visible_text, "visible tail");
    }

    #[test]
    fn comments_are_not_visible_text() {
        let html = "<html><body>kept<!-- dropped comment --></body></html>";
        let rec = extract(html, "a.html", &NoopFetcher, &offline()).unwrap();
        assert_eq!(rec.visible_text, "kept");
    }

    #[test]
    fn adjacent_text_nodes_are_space_separated() {
        let html = "<html><body><span>one</span><span>two</span></body></html>";
        let rec = extract(html, "a.html", &NoopFetcher, &offline()).unwrap();
        assert_eq!(rec.visible_text, "one two");
    }

    #[test]
    fn inline_attributes_precede_style_blocks() {
        let html = r#"<html><head><style>z-index: 1; color: blue</style></head>
            <body style="margin:0; padding:0"><div style="display:none">x</div></body></html>"#;
        let rec = extract(html, "a.html", &NoopFetcher, &offline()).unwrap();
        assert_eq!(
            rec.normalized_style_text,
            "margin:0;padding:0 display:none color: blue;z-index: 1"
        );
    }

    #[test]
    fn style_declaration_order_does_not_matter() {
        let a = r#"<html><body style="color:red; margin:0">x</body></html>"#;
        let b = r#"<html><body style="margin:0;color:red;">x</body></html>"#;
        let ra = extract(a, "a.html", &NoopFetcher, &offline()).unwrap();
        let rb = extract(b, "b.html", &NoopFetcher, &offline()).unwrap();
        assert_eq!(ra.normalized_style_text, rb.normalized_style_text);
    }

    #[test]
    fn empty_style_block_is_ignored() {
        let html = "<html><head><style></style></head><body>x</body></html>";
        let rec = extract(html, "a.html", &NoopFetcher, &offline()).unwrap();
        assert_eq!(rec.normalized_style_text, "");
    }

    #[test]
    fn external_stylesheets_are_fetched_and_appended_last() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="https://cdn.example.com/site.css">
            <link rel="icon" href="https://cdn.example.com/favicon.ico">
            <style>b:2;a:1</style></head><body>x</body></html>"#;
        let fetcher = MapFetcher::default().with("https://cdn.example.com/site.css", "q:1; p:0");
        let rec = extract(html, "a.html", &fetcher, &ExtractConfig::default()).unwrap();

        assert_eq!(rec.normalized_style_text, "a:1;b:2 p:0;q:1");
        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://cdn.example.com/site.css");
        assert_eq!(requests[0].1, "https://cdn.example.com/site.css");
    }

    #[test]
    fn rel_keyword_list_is_matched_case_insensitively() {
        let html = r#"<html><head>
            <link rel="preload StyleSheet" href="https://cdn.example.com/a.css">
            </head><body>x</body></html>"#;
        let fetcher = MapFetcher::default().with("https://cdn.example.com/a.css", "c:3");
        let rec = extract(html, "a.html", &fetcher, &ExtractConfig::default()).unwrap();
        assert_eq!(rec.normalized_style_text, "c:3");
    }

    #[test]
    fn base_href_resolves_root_relative_links_and_is_referer() {
        let html = r#"<html><head><base href="https://shop.example.com/en/">
            <link rel="stylesheet" href="/css/main.css"></head><body>x</body></html>"#;
        let fetcher =
            MapFetcher::default().with("https://shop.example.com/css/main.css", "color:green");
        let rec = extract(html, "a.html", &fetcher, &ExtractConfig::default()).unwrap();

        assert_eq!(rec.normalized_style_text, "color:green");
        let requests = fetcher.requests();
        assert_eq!(requests[0].1, "https://shop.example.com/en/");
    }

    #[test]
    fn empty_base_href_falls_back_to_stylesheet_url_as_referer() {
        let html = r#"<html><head><base href="">
            <link rel="stylesheet" href="https://cdn.example.com/site.css">
            </head><body>x</body></html>"#;
        let fetcher = MapFetcher::default().with("https://cdn.example.com/site.css", "a:1");
        let rec = extract(html, "a.html", &fetcher, &ExtractConfig::default()).unwrap();

        assert_eq!(rec.normalized_style_text, "a:1");
        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, "https://cdn.example.com/site.css");
    }

    #[test]
    fn failed_fetch_keeps_previously_collected_styles() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="https://cdn.example.com/missing.css">
            </head><body style="margin:0">still here</body></html>"#;
        let fetcher = MapFetcher::default();
        let rec = extract(html, "a.html", &fetcher, &ExtractConfig::default()).unwrap();

        assert_eq!(rec.visible_text, "still here");
        assert_eq!(rec.normalized_style_text, "margin:0");
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn unresolvable_links_are_never_requested() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="css/relative.css">
            <link rel="stylesheet" href="/root.css">
            <link rel="stylesheet" href="">
            </head><body>x</body></html>"#;
        let fetcher = MapFetcher::default();
        extract(html, "a.html", &fetcher, &ExtractConfig::default()).unwrap();
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn disabled_fetching_makes_no_requests() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="https://cdn.example.com/site.css">
            </head><body>x</body></html>"#;
        let fetcher = MapFetcher::default().with("https://cdn.example.com/site.css", "a:1");
        let rec = extract(html, "a.html", &fetcher, &offline()).unwrap();
        assert_eq!(rec.normalized_style_text, "");
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn empty_doc_id_rejected() {
        let err = extract("<p>x</p>", "", &NoopFetcher, &offline()).unwrap_err();
        assert_eq!(err, ExtractError::MissingDocId);
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = ExtractConfig::default().with_fetch_timeout_secs(0);
        let err = extract("<p>x</p>", "a.html", &NoopFetcher, &cfg).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn empty_document_yields_blank_record() {
        let rec = extract("", "empty.html", &NoopFetcher, &offline()).unwrap();
        assert!(rec.is_blank());
        assert_eq!(rec.doc_id, "empty.html");
    }
}
