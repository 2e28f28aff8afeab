use crate::UrlError;
use url::Url;

/// Parses an absolute crawl URL
///
/// Only http and https URLs with a host can be crawled.
pub fn parse_crawl_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    Ok(url)
}

/// Builds the visited-set key for a URL
///
/// Parsing already lower-cases the host, drops default ports and resolves
/// dot segments; the fragment is removed because it never changes the
/// fetched document. Path, query and scheme are kept verbatim so that two
/// keys are equal only when the requests would be identical.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use paap_crawler::url::visited_key;
///
/// let url = Url::parse("https://MFE.gov.ro:443/achizitii/#sus").unwrap();
/// assert_eq!(visited_key(&url), "https://mfe.gov.ro/achizitii/");
/// ```
pub fn visited_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}
