//! Link classifier
//!
//! Splits the anchors of an HTML page into file links (spreadsheets to
//! download) and navigation links (pages to crawl next).
//!
//! # Rules
//!
//! An anchor is a **file link** iff its text contains a keyword from
//! [`TEXT_KEYWORDS`](super::TEXT_KEYWORDS) and its `href` attribute contains
//! an extension from [`FILE_EXTENSIONS`](super::FILE_EXTENSIONS) anywhere in
//! the string.
//!
//! Navigation links are only computed when a page has no file links at all.
//! An anchor is a **navigation link** iff its text contains a keyword from the
//! same text list and its `href` contains a keyword from
//! [`URL_KEYWORDS`](super::URL_KEYWORDS).
//!
//! The text rule only looks at the anchor's first descendant text node, so
//! `<a><span>Descarca</span> Programul</a>` does not match on "Programul".
//!
//! Both predicates test the raw `href` attribute; matching anchors are then
//! resolved against the page URL. Anchors are reported in document order,
//! duplicates included.

use crate::crawler::keywords::{
    href_contains_extension, href_contains_url_keyword, text_matches_keyword,
};
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while classifying a page
///
/// None of these are fatal: the dispatcher treats them as "no links found".
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Invalid anchor selector: {0}")]
    Selector(String),

    #[error("Base URL cannot resolve relative links: {0}")]
    CannotBeABase(String),
}

/// An anchor picked by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// The href resolved against the page URL
    pub uri: Url,

    /// The anchor's text content
    pub anchor_text: String,
}

/// The two disjoint link sets found on one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub file_links: Vec<LinkCandidate>,
    pub nav_links: Vec<LinkCandidate>,
}

impl Classification {
    /// Returns true if the page yielded neither file nor navigation links
    pub fn is_empty(&self) -> bool {
        self.file_links.is_empty() && self.nav_links.is_empty()
    }
}

/// Raw anchor data pulled from the document
struct Anchor {
    /// First descendant text node; the only text the keyword rule sees
    first_text: String,
    text: String,
    href: String,
}

/// Classifies the links of `html`, resolving hrefs against `base_url`
///
/// # Example
///
/// ```
/// use paap_crawler::crawler::try_classify;
/// use url::Url;
///
/// let html = r#"<a href="/docs/plan.xlsx">Programul anual</a>"#;
/// let base = Url::parse("https://mfe.gov.ro/achizitii/").unwrap();
/// let links = try_classify(html, &base).unwrap();
/// assert_eq!(links.file_links[0].uri.as_str(), "https://mfe.gov.ro/docs/plan.xlsx");
/// assert!(links.nav_links.is_empty());
/// ```
pub fn try_classify(html: &str, base_url: &Url) -> Result<Classification, ClassificationError> {
    if base_url.cannot_be_a_base() {
        return Err(ClassificationError::CannotBeABase(base_url.to_string()));
    }

    let anchors = extract_anchors(html)?;

    let file_links = select(&anchors, base_url, href_contains_extension);
    if !file_links.is_empty() {
        return Ok(Classification {
            file_links,
            nav_links: Vec::new(),
        });
    }

    let nav_links = select(&anchors, base_url, href_contains_url_keyword);
    Ok(Classification {
        file_links,
        nav_links,
    })
}

/// Classifies the links of `html`, treating any failure as an empty page
pub fn classify(html: &str, base_url: &Url) -> Classification {
    try_classify(html, base_url).unwrap_or_else(|e| {
        tracing::warn!("Could not classify {}: {}", base_url, e);
        Classification::default()
    })
}

fn extract_anchors(html: &str) -> Result<Vec<Anchor>, ClassificationError> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("a[href]").map_err(|e| ClassificationError::Selector(e.to_string()))?;

    Ok(document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(Anchor {
                first_text: element.text().next().unwrap_or_default().to_string(),
                text: element.text().collect(),
                href: href.to_string(),
            })
        })
        .collect())
}

/// Picks anchors whose text matches a keyword and whose href passes `href_rule`
fn select(anchors: &[Anchor], base_url: &Url, href_rule: fn(&str) -> bool) -> Vec<LinkCandidate> {
    anchors
        .iter()
        .filter(|anchor| text_matches_keyword(&anchor.first_text) && href_rule(&anchor.href))
        .filter_map(|anchor| match base_url.join(anchor.href.trim()) {
            Ok(uri) => Some(LinkCandidate {
                uri,
                anchor_text: anchor.text.trim().to_string(),
            }),
            Err(e) => {
                tracing::debug!("Unresolvable href {:?} on {}: {}", anchor.href, base_url, e);
                None
            }
        })
        .collect()
}
