//! Fixed keyword lists driving link classification
//!
//! Matching is case-sensitive substring containment, so the lists carry their
//! own case and diacritic variants. Keep them verbatim: the set of documents
//! a crawl finds depends on every entry, duplicates included.

/// Anchor-text keywords shared by file and navigation links
pub const TEXT_KEYWORDS: &[&str] = &[
    "PAAP",
    "P.A.A.P",
    "PAP",
    "Paap",
    "Pap",
    "pap",
    "paap",
    "achizitii publice",
    "achiziții publice",
    "achizițiilor publice",
    "achizitiilor publice",
    "Achizitii publice",
    "Achiziții publice",
    "Achizițiilor publice",
    "Achizitiilor publice",
    "Achizițiilor Publice",
    "Programul",
    "Program",
    "programul",
    "program",
    "interes",
    "Interes",
    "Informații",
    "Informatii",
    "Public",
    "public",
];

/// Spreadsheet extensions an href must contain to be a file link
pub const FILE_EXTENSIONS: &[&str] = &[".xlsx", ".xlsm", ".xltx", ".xls", ".xlt", ".ods"];

/// Path keywords an href must contain to be a navigation link
pub const URL_KEYWORDS: &[&str] = &[
    "achizitii",
    "informații",
    "informatii",
    "programul",
    "program",
    "public",
    "publice",
    "interes-public",
];

/// Returns true if `text` contains any of the anchor-text keywords
pub fn text_matches_keyword(text: &str) -> bool {
    contains_any(text, TEXT_KEYWORDS)
}

/// Returns true if `href` contains any spreadsheet extension, anywhere
pub fn href_contains_extension(href: &str) -> bool {
    contains_any(href, FILE_EXTENSIONS)
}

/// Returns true if `href` contains any navigation path keyword
pub fn href_contains_url_keyword(href: &str) -> bool {
    contains_any(href, URL_KEYWORDS)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
