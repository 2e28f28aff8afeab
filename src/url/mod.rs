//! URL handling module
//!
//! Host extraction for domain scoping, seed URL parsing, and the key under
//! which a URL is recorded in the visited set.

mod domain;
mod normalize;

pub use domain::{extract_host, same_host};
pub use normalize::{parse_crawl_url, visited_key};
