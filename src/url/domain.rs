use url::Url;

/// Extracts the host from a URL
///
/// The `url` crate already lower-cases domain hosts while parsing; the extra
/// lowercase keeps the result stable for hosts it leaves untouched.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use paap_crawler::url::extract_host;
///
/// let url = Url::parse("https://MFE.gov.ro/achizitii").unwrap();
/// assert_eq!(extract_host(&url), Some("mfe.gov.ro".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs carry a host and the hosts are identical
///
/// Ports and schemes are not compared: `http://a.ro` and `https://a.ro:8443`
/// are the same site for crawling purposes. Subdomains are different hosts.
pub fn same_host(candidate: &Url, current: &Url) -> bool {
    match (extract_host(candidate), extract_host(current)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_extract_simple_host() {
        assert_eq!(
            extract_host(&url("https://ina.gov.ro/")),
            Some("ina.gov.ro".to_string())
        );
    }

    #[test]
    fn test_extract_with_port() {
        assert_eq!(
            extract_host(&url("http://127.0.0.1:8080/page")),
            Some("127.0.0.1".to_string())
        );
    }

    #[test]
    fn test_extract_uppercase_converted_to_lowercase() {
        assert_eq!(
            extract_host(&url("https://PORTAL.RNA.RO/")),
            Some("portal.rna.ro".to_string())
        );
    }

    #[test]
    fn test_no_host() {
        assert_eq!(extract_host(&url("mailto:office@mfe.gov.ro")), None);
    }

    #[test]
    fn test_same_host() {
        assert!(same_host(
            &url("https://mfe.gov.ro/achizitii/pagina2"),
            &url("https://mfe.gov.ro/")
        ));
        assert!(same_host(
            &url("http://mfe.gov.ro/a"),
            &url("https://mfe.gov.ro:443/b")
        ));
    }

    #[test]
    fn test_different_hosts() {
        assert!(!same_host(
            &url("https://www.mfe.gov.ro/"),
            &url("https://mfe.gov.ro/")
        ));
        assert!(!same_host(
            &url("https://ina.gov.ro/public"),
            &url("https://mfe.gov.ro/")
        ));
        assert!(!same_host(
            &url("mailto:office@mfe.gov.ro"),
            &url("https://mfe.gov.ro/")
        ));
    }
}
