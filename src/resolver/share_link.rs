//! Share URL recognition and normalization.
//!
//! Terabox serves the same share under many mirror hosts. Each recognized
//! mirror gets its own `TeraboxDomain` variant so extraction logic can branch
//! per mirror without string-matching hosts all over the codebase.

use lazy_regex::regex;
use url::Url;

use super::ResolveError;

/// A recognized Terabox mirror host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeraboxDomain {
    /// terabox.com — the canonical share host
    Main,
    /// teraboxapp.com — normalized to terabox.com before fetching
    App,
    /// terabox.app
    AppDomain,
    /// teraboxshare.com
    Share,
    /// 1024terabox.com
    Mirror1024,
    /// dm.terabox.com — mobile share host
    Dm,
    /// terabox.hnn.workers.dev — the sign/download helper service
    Workers,
    /// d-*.terabox.com — signed direct-download hosts
    Direct,
}

impl TeraboxDomain {
    /// Classify a hostname. Returns `None` for anything outside the
    /// recognized mirror set.
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        match host {
            "terabox.com" => Some(TeraboxDomain::Main),
            "teraboxapp.com" => Some(TeraboxDomain::App),
            "terabox.app" => Some(TeraboxDomain::AppDomain),
            "teraboxshare.com" => Some(TeraboxDomain::Share),
            "1024terabox.com" => Some(TeraboxDomain::Mirror1024),
            "dm.terabox.com" => Some(TeraboxDomain::Dm),
            "terabox.hnn.workers.dev" => Some(TeraboxDomain::Workers),
            h if h.starts_with("d-") && h.ends_with(".terabox.com") => Some(TeraboxDomain::Direct),
            _ => None,
        }
    }
}

/// A parsed and validated Terabox share URL.
///
/// Parsing never touches the network: unrecognized hosts fail with
/// `UnsupportedDomain` immediately.
#[derive(Debug, Clone)]
pub struct ShareLink {
    url: Url,
    domain: TeraboxDomain,
    surl: Option<String>,
}

impl ShareLink {
    /// Parse and validate a share URL string.
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let url = Url::parse(input)?;
        let host = url.host_str().unwrap_or_default().to_string();

        let domain = TeraboxDomain::from_host(&host)
            .ok_or(ResolveError::UnsupportedDomain { host })?;

        let surl = extract_surl(&url);

        Ok(Self { url, domain, surl })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn domain(&self) -> TeraboxDomain {
        self.domain
    }

    /// The share token ("surl"), if the URL carries one.
    pub fn surl(&self) -> Option<&str> {
        self.surl.as_deref()
    }

    /// True for signed `d-*.terabox.com/file/...` URLs that already point at
    /// the media and need no API round trips.
    pub fn is_direct_download(&self) -> bool {
        self.domain == TeraboxDomain::Direct && self.url.path().starts_with("/file/")
    }

    /// Normalized form: scheme + host + path, query dropped, with the
    /// teraboxapp.com alias folded into terabox.com.
    pub fn normalized(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        let host = if host.ends_with("teraboxapp.com") {
            host.replace("teraboxapp.com", "terabox.com")
        } else {
            host.to_string()
        };
        format!("{}://{}{}", self.url.scheme(), host, self.url.path())
    }
}

/// Extract the share token from a URL.
///
/// Two shapes exist in the wild: `?surl=<token>` and `/s/<token>` where the
/// path token carries a leading `1` that the API adds back itself.
fn extract_surl(url: &Url) -> Option<String> {
    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "surl") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.len() >= 2 && segments[0] == "s" {
        let token = segments[1].strip_prefix('1').unwrap_or(segments[1]);
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

/// Find a Terabox URL inside a free-form chat message.
///
/// Signed direct-download URLs are matched first (they can be very long and
/// full of query params), then a word scan against the mirror set with
/// trailing-punctuation cleanup. A bare `terabox.com/s/...` without a scheme
/// gets `https://` prepended so the result always parses.
pub fn extract_share_url(text: &str) -> Option<String> {
    let direct = regex!(r"https?://d-[a-z0-9-]+\.terabox\.com/file/\S+");
    if let Some(m) = direct.find(text) {
        return Some(m.as_str().to_string());
    }

    for word in text.split_whitespace() {
        let candidate = word.trim_end_matches(['.', ',', '!', '?', ')']);
        let host_part = candidate
            .strip_prefix("https://")
            .or_else(|| candidate.strip_prefix("http://"))
            .unwrap_or(candidate);
        let host = host_part.split(['/', '?']).next().unwrap_or_default();

        if TeraboxDomain::from_host(host).is_some() {
            if candidate.starts_with("http://") || candidate.starts_with("https://") {
                return Some(candidate.to_string());
            }
            return Some(format!("https://{}", candidate));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_recognized_domains_classify() {
        let cases = [
            ("terabox.com", TeraboxDomain::Main),
            ("www.terabox.com", TeraboxDomain::Main),
            ("teraboxapp.com", TeraboxDomain::App),
            ("terabox.app", TeraboxDomain::AppDomain),
            ("www.terabox.app", TeraboxDomain::AppDomain),
            ("teraboxshare.com", TeraboxDomain::Share),
            ("1024terabox.com", TeraboxDomain::Mirror1024),
            ("dm.terabox.com", TeraboxDomain::Dm),
            ("terabox.hnn.workers.dev", TeraboxDomain::Workers),
            ("d-jp02-cpt.terabox.com", TeraboxDomain::Direct),
            ("d-jp02-zen.terabox.com", TeraboxDomain::Direct),
        ];
        for (host, expected) in cases {
            assert_eq!(TeraboxDomain::from_host(host), Some(expected), "host: {}", host);
        }
    }

    #[test]
    fn test_unrecognized_hosts_rejected() {
        for host in ["example.com", "terabox.evil.com", "dterabox.com", "x.workers.dev"] {
            assert_eq!(TeraboxDomain::from_host(host), None, "host: {}", host);
        }
    }

    #[test]
    fn test_parse_unsupported_domain_fails() {
        let err = ShareLink::parse("https://example.com/s/abc123").unwrap_err();
        match err {
            ResolveError::UnsupportedDomain { host } => assert_eq!(host, "example.com"),
            other => panic!("expected UnsupportedDomain, got {:?}", other),
        }
    }

    #[test]
    fn test_surl_from_path() {
        let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();
        assert_eq!(link.surl(), Some("abc123"));
        assert_eq!(link.domain(), TeraboxDomain::Main);
    }

    #[test]
    fn test_surl_path_leading_one_stripped() {
        let link = ShareLink::parse("https://terabox.com/s/1abc123").unwrap();
        assert_eq!(link.surl(), Some("abc123"));
    }

    #[test]
    fn test_surl_from_query() {
        let link = ShareLink::parse("https://www.terabox.com/sharing/link?surl=xyz789").unwrap();
        assert_eq!(link.surl(), Some("xyz789"));
    }

    #[test]
    fn test_normalized_folds_app_alias() {
        let link = ShareLink::parse("https://teraboxapp.com/s/abc?foo=bar").unwrap();
        assert_eq!(link.normalized(), "https://terabox.com/s/abc");
    }

    #[test]
    fn test_direct_download_detection() {
        let link =
            ShareLink::parse("https://d-jp02-cpt.terabox.com/file/xyz?fn=video.mp4&size=1000").unwrap();
        assert!(link.is_direct_download());

        let link = ShareLink::parse("https://terabox.com/s/abc123").unwrap();
        assert!(!link.is_direct_download());
    }

    #[test]
    fn test_extract_share_url_from_text() {
        assert_eq!(
            extract_share_url("check this out https://terabox.com/s/abc123 please"),
            Some("https://terabox.com/s/abc123".to_string())
        );
        // Trailing punctuation cleanup
        assert_eq!(
            extract_share_url("look: https://1024terabox.com/s/abc!"),
            Some("https://1024terabox.com/s/abc".to_string())
        );
        // Scheme-less links get https:// prepended
        assert_eq!(
            extract_share_url("terabox.com/s/abc123"),
            Some("https://terabox.com/s/abc123".to_string())
        );
        assert_eq!(extract_share_url("no links here"), None);
        assert_eq!(extract_share_url("https://youtube.com/watch?v=x"), None);
    }

    #[test]
    fn test_extract_share_url_prefers_direct_download() {
        let text = "terabox.com https://d-jp02-zen.terabox.com/file/abc?fn=v.mp4&size=5";
        assert_eq!(
            extract_share_url(text),
            Some("https://d-jp02-zen.terabox.com/file/abc?fn=v.mp4&size=5".to_string())
        );
    }
}
