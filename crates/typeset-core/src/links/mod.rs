//! Link classification and the `a[href]` processor.

pub mod processor;

use url::{ParseError, Url};

use crate::types::LinkType;

pub use processor::{Link, LinkOptions, LinkProcessor};

/// Extensions of pages rather than downloadable files.
pub const WEB_EXTENSIONS: &[&str] = &["html", "htm", "php", "asp", "aspx", "jsp"];

const RELATIVE_BASE: &str = "http://relative.invalid/";

enum Parsed {
    Absolute(Url),
    Relative(Url),
}

fn parse(href: &str) -> Option<Parsed> {
    if let Some(rest) = href.strip_prefix("//") {
        return Url::parse(&format!("https://{rest}")).ok().map(Parsed::Absolute);
    }
    match Url::parse(href) {
        Ok(url) => Some(Parsed::Absolute(url)),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(href))
            .ok()
            .map(Parsed::Relative),
        Err(_) => None,
    }
}

/// `(host without "www.", explicit port)`.
fn host_key(url: &Url) -> Option<(String, Option<u16>)> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);
    Some((host, url.port()))
}

/// Normalize a configured current host given as `host`, `host:port` or a
/// full URL.
fn current_host_key(current: &str) -> Option<(String, Option<u16>)> {
    let current = current.trim();
    if current.is_empty() {
        return None;
    }
    let url = if current.contains("://") {
        Url::parse(current).ok()?
    } else {
        Url::parse(&format!("http://{current}")).ok()?
    };
    host_key(&url)
}

/// Classify `href` relative to the site at `current_host`.
///
/// Without a current host every http(s) link counts as internal.
pub fn classify(href: &str, current_host: Option<&str>) -> LinkType {
    let href = href.trim();
    if href.starts_with('#') {
        return LinkType::Anchor;
    }
    let url = match parse(href) {
        Some(Parsed::Relative(_)) => return LinkType::Internal,
        Some(Parsed::Absolute(url)) => url,
        None => return LinkType::Invalid,
    };
    match url.scheme() {
        "mailto" => return LinkType::Mailto,
        "tel" => return LinkType::Tel,
        "http" | "https" => {}
        _ => return LinkType::External,
    }
    let Some(link) = host_key(&url) else {
        return LinkType::Invalid;
    };
    match current_host.and_then(current_host_key) {
        Some(current) if current != link => LinkType::External,
        _ => LinkType::Internal,
    }
}

/// Lowercased extension of the last path segment of an http(s) or relative
/// link.
pub fn extension(href: &str) -> Option<String> {
    let href = href.trim();
    if href.starts_with('#') {
        return None;
    }
    let url = match parse(href)? {
        Parsed::Relative(url) => url,
        Parsed::Absolute(url) if matches!(url.scheme(), "http" | "https") => url,
        Parsed::Absolute(_) => return None,
    };
    let path = url.path();
    if path.is_empty() || path == "/" {
        return None;
    }
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_file_extension(ext: &str) -> bool {
    !WEB_EXTENSIONS.contains(&ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: Option<&str> = Some("example.com");

    #[test]
    fn schemes() {
        assert_eq!(classify("mailto:mail@example.com", HOST), LinkType::Mailto);
        assert_eq!(classify("tel:123456", HOST), LinkType::Tel);
        assert_eq!(classify("skype://example.com", HOST), LinkType::External);
        assert_eq!(classify("#some-anchor", HOST), LinkType::Anchor);
    }

    #[test]
    fn hosts() {
        assert_eq!(classify("https://example.com", HOST), LinkType::Internal);
        assert_eq!(classify("https://www.example.com/a", HOST), LinkType::Internal);
        assert_eq!(classify("https://external.com", HOST), LinkType::External);
        assert_eq!(classify("https://external.example.com", HOST), LinkType::External);
        assert_eq!(classify("//example.com/x", HOST), LinkType::Internal);
        assert_eq!(classify("//cdn.net/x", HOST), LinkType::External);
    }

    #[test]
    fn relative_links_are_internal() {
        assert_eq!(classify("file.zip", HOST), LinkType::Internal);
        assert_eq!(classify("/path/to/page", HOST), LinkType::Internal);
        assert_eq!(classify("?q=1", HOST), LinkType::Internal);
    }

    #[test]
    fn ports_are_compared() {
        let host = Some("example.com.ddev.site:33003");
        assert_eq!(classify("https://example.com.ddev.site:33003", host), LinkType::Internal);
        assert_eq!(classify("https://example.com.ddev.site:4000", host), LinkType::External);
        assert_eq!(classify("https://example.com.ddev.site", host), LinkType::External);
    }

    #[test]
    fn current_host_forms() {
        let url = "https://example.com";
        assert_eq!(classify(url, Some("https://example.local")), LinkType::External);
        assert_eq!(classify(url, Some("https://www.example.com/")), LinkType::Internal);
        assert_eq!(classify(url, Some("")), LinkType::Internal);
        assert_eq!(classify(url, None), LinkType::Internal);
    }

    #[test]
    fn malformed_urls_are_invalid() {
        assert_eq!(classify("http://user@:80", HOST), LinkType::Invalid);
        assert_eq!(classify("http://", HOST), LinkType::Invalid);
    }

    #[test]
    fn extensions() {
        assert_eq!(extension("https://example.com/file.ZIP").as_deref(), Some("zip"));
        assert_eq!(extension("/path/to/file.zip").as_deref(), Some("zip"));
        assert_eq!(extension("file.zip?download=1").as_deref(), Some("zip"));
        assert_eq!(extension("https://example.com/page.html").as_deref(), Some("html"));
        assert_eq!(extension("https://example.com/"), None);
        assert_eq!(extension("https://example.com/dir/"), None);
        assert_eq!(extension("https://example.com/.hidden"), None);
        assert_eq!(extension("mailto:a@b.de"), None);
        assert!(is_file_extension("zip"));
        assert!(!is_file_extension("html"));
    }
}
