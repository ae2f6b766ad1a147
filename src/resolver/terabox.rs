//! Terabox extraction engine.
//!
//! Three-step pipeline against external, uncontrolled services:
//!   1. `shorturlinfo` on a Terabox API mirror — shareid, uk, file list
//!   2. `get-info` on the sign helper — sign + timestamp
//!   3. `get-download` on the sign helper — the signed direct URL
//!
//! Every response shape here is third-party and unstable; all parsing is
//! best-effort `serde_json::Value` navigation kept in this one module so
//! adaptation stays local when Terabox changes its pages.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::seq::SliceRandom;
use serde_json::Value;
use url::Url;

use super::{ResolveError, ResolvedMedia, ShareLink};
use crate::core::config;

/// App id embedded in the Terabox web client, required by `shorturlinfo`.
const TERABOX_APP_ID: &str = "250528";

/// Share metadata recovered from `shorturlinfo`.
#[derive(Debug, Clone)]
struct ShareInfo {
    shareid: u64,
    uk: u64,
    fs_id: String,
    filename: String,
    size_bytes: u64,
}

/// Resolves Terabox share links to direct media URLs.
///
/// Endpoints are injectable so tests can point the resolver at a mock
/// server; `new()` targets the real services.
pub struct TeraboxResolver {
    client: reqwest::Client,
    api_bases: Vec<String>,
    worker_base: String,
    wrap_hosts: Vec<String>,
}

impl Default for TeraboxResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TeraboxResolver {
    pub fn new() -> Self {
        Self::with_endpoints(
            vec![
                "https://www.terabox.com".to_string(),
                "https://dm.terabox.com".to_string(),
            ],
            "https://terabox.hnn.workers.dev".to_string(),
            vec![
                "plain-grass-58b2.comprehensiveaquamarine".to_string(),
                "royal-block-6609.ninnetta7875".to_string(),
                "bold-hall-f23e.7rochelle".to_string(),
                "winter-thunder-0360.belitawhite".to_string(),
                "fragrant-term-0df9.elviraeducational".to_string(),
                "purple-glitter-924b.miguelalocal".to_string(),
            ],
        )
    }

    /// Build a resolver against explicit endpoints (used by tests).
    pub fn with_endpoints(api_bases: Vec<String>, worker_base: String, wrap_hosts: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config::resolver::USER_AGENT)
            .timeout(config::network::timeout())
            .connect_timeout(config::network::connect_timeout())
            .build()
            .expect("resolver HTTP client build should succeed");

        Self {
            client,
            api_bases,
            worker_base: worker_base.trim_end_matches('/').to_string(),
            wrap_hosts,
        }
    }

    /// Resolve a validated share link to a direct media URL plus metadata.
    ///
    /// Signed direct-download links short-circuit without any network round
    /// trip; everything else goes through the three-step API pipeline.
    pub async fn resolve(&self, link: &ShareLink) -> Result<ResolvedMedia, ResolveError> {
        if link.is_direct_download() {
            log::info!("Direct download URL detected, extracting metadata from query params");
            return media_from_direct_url(link.url());
        }

        let surl = link
            .surl()
            .ok_or_else(|| ResolveError::Extraction("share URL carries no surl token".to_string()))?;

        log::info!("Resolving share {} ({})", surl, link.normalized());

        let info = self.fetch_share_info(surl).await?;
        let (sign, timestamp) = self.fetch_sign(surl).await?;
        let direct_url = self.fetch_download_link(&info, &sign, &timestamp).await?;

        Ok(ResolvedMedia {
            direct_url,
            filename: info.filename,
            size_bytes: info.size_bytes,
        })
    }

    /// Step 1: share info from `shorturlinfo`, trying API mirrors in order.
    ///
    /// Attempts are independent and stateless — no backoff, no shared
    /// budget; the first mirror that answers with a usable file list wins.
    async fn fetch_share_info(&self, surl: &str) -> Result<ShareInfo, ResolveError> {
        let mut last_err: Option<ResolveError> = None;

        for (attempt, base) in self
            .api_bases
            .iter()
            .cycle()
            .take(config::resolver::MAX_ATTEMPTS)
            .enumerate()
        {
            let endpoint = format!(
                "{}/api/shorturlinfo?app_id={}&shorturl=1{}&root=1",
                base.trim_end_matches('/'),
                TERABOX_APP_ID,
                surl
            );

            match self.fetch_json(&endpoint).await.and_then(|v| parse_share_info(&v)) {
                Ok(info) => return Ok(info),
                Err(e) => {
                    log::warn!("shorturlinfo attempt {} via {} failed: {}", attempt + 1, base, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| ResolveError::Extraction("no API mirrors configured".to_string())))
    }

    /// Step 2: sign + timestamp from the helper service.
    async fn fetch_sign(&self, surl: &str) -> Result<(String, String), ResolveError> {
        let endpoint = format!("{}/api/get-info?shorturl={}&pwd=", self.worker_base, surl);
        let value = self.fetch_json(&endpoint).await?;
        parse_sign(&value)
    }

    /// Step 3: signed download link. `get-download` first; on failure fall
    /// back to `get-downloadp` and wrap the link in a workers.dev redirector.
    async fn fetch_download_link(
        &self,
        info: &ShareInfo,
        sign: &str,
        timestamp: &str,
    ) -> Result<String, ResolveError> {
        let params = serde_json::json!({
            "shareid": info.shareid.to_string(),
            "uk": info.uk.to_string(),
            "sign": sign,
            "timestamp": timestamp,
            "fs_id": info.fs_id,
        });

        let primary = format!("{}/api/get-download", self.worker_base);
        match self.post_json(&primary, &params).await.and_then(|v| parse_download_link(&v)) {
            Ok(link) => return Ok(link),
            Err(e) => log::warn!("get-download failed, trying get-downloadp: {}", e),
        }

        let fallback = format!("{}/api/get-downloadp", self.worker_base);
        let link = self
            .post_json(&fallback, &params)
            .await
            .and_then(|v| parse_download_link(&v))?;

        Ok(self.wrap_url(&link))
    }

    async fn fetch_json(&self, endpoint: &str) -> Result<Value, ResolveError> {
        let resp = self
            .client
            .get(endpoint)
            .header("Accept-Language", config::resolver::ACCEPT_LANGUAGE)
            .header("Referer", format!("{}/", self.worker_base))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ResolveError::Extraction(format!(
                "{} answered HTTP {}",
                endpoint,
                resp.status()
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| ResolveError::Extraction(format!("non-JSON response from {}: {}", endpoint, e)))
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, ResolveError> {
        let resp = self
            .client
            .post(endpoint)
            .header("Accept-Language", config::resolver::ACCEPT_LANGUAGE)
            .header("Referer", format!("{}/", self.worker_base))
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ResolveError::Extraction(format!(
                "{} answered HTTP {}",
                endpoint,
                resp.status()
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| ResolveError::Extraction(format!("non-JSON response from {}: {}", endpoint, e)))
    }

    /// Wrap a download URL in a base64 workers.dev redirector. The wrapper
    /// hosts strip referer checks that break plain `get-downloadp` links.
    fn wrap_url(&self, original: &str) -> String {
        let host = self
            .wrap_hosts
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or("plain-grass-58b2.comprehensiveaquamarine");
        let quoted = urlencoding::encode(original);
        let encoded = URL_SAFE.encode(quoted.as_bytes());
        format!("https://{}.workers.dev/?url={}", host, encoded)
    }
}

/// Build media metadata from a signed direct-download URL.
///
/// Filename travels in the `fn=` (or legacy `fin=`) query param, size in
/// `size=`. A missing size is treated as zero — the link is already usable,
/// the dispatcher just loses the inline/player distinction.
pub fn media_from_direct_url(url: &Url) -> Result<ResolvedMedia, ResolveError> {
    let mut filename = None;
    let mut size_bytes = 0u64;

    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "fn" => filename = Some(v.into_owned()),
            "fin" if filename.is_none() => filename = Some(v.into_owned()),
            "size" => size_bytes = v.parse().unwrap_or(0),
            _ => {}
        }
    }

    Ok(ResolvedMedia {
        direct_url: url.to_string(),
        filename: filename.unwrap_or_else(|| "TeraboxFile".to_string()),
        size_bytes,
    })
}

/// Parse the `shorturlinfo` response. The first non-directory entry wins.
fn parse_share_info(value: &Value) -> Result<ShareInfo, ResolveError> {
    let shareid = value
        .get("shareid")
        .and_then(Value::as_u64)
        .ok_or_else(|| ResolveError::Extraction("shorturlinfo: missing shareid".to_string()))?;
    let uk = value
        .get("uk")
        .and_then(Value::as_u64)
        .ok_or_else(|| ResolveError::Extraction("shorturlinfo: missing uk".to_string()))?;

    let list = value
        .get("list")
        .and_then(Value::as_array)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ResolveError::Extraction("no files found in the share".to_string()))?;

    let entry = list
        .iter()
        .find(|item| !entry_is_dir(item))
        .ok_or_else(|| ResolveError::Extraction("share contains only directories".to_string()))?;

    // fs_id arrives as a number on terabox.com and as a string on some mirrors
    let fs_id = match entry.get("fs_id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return Err(ResolveError::Extraction("file entry missing fs_id".to_string())),
    };

    let filename = entry
        .get("server_filename")
        .and_then(Value::as_str)
        .ok_or_else(|| ResolveError::Extraction("file entry missing server_filename".to_string()))?
        .to_string();

    let size_bytes = match entry.get("size") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    };

    Ok(ShareInfo {
        shareid,
        uk,
        fs_id,
        filename,
        size_bytes,
    })
}

/// `isdir` arrives as "1"/"0" strings or bare numbers depending on mirror.
fn entry_is_dir(entry: &Value) -> bool {
    match entry.get("isdir") {
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(Value::String(s)) => s == "1",
        _ => false,
    }
}

/// Parse the `get-info` response into (sign, timestamp).
fn parse_sign(value: &Value) -> Result<(String, String), ResolveError> {
    if value.get("ok").and_then(Value::as_bool) != Some(true) {
        return Err(ResolveError::Extraction(
            "sign service did not acknowledge the share".to_string(),
        ));
    }

    let sign = value
        .get("sign")
        .and_then(Value::as_str)
        .ok_or_else(|| ResolveError::Extraction("sign service response missing sign".to_string()))?
        .to_string();

    let timestamp = match value.get("timestamp") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return Err(ResolveError::Extraction("sign service response missing timestamp".to_string())),
    };

    Ok((sign, timestamp))
}

/// Parse a `get-download`/`get-downloadp` response.
fn parse_download_link(value: &Value) -> Result<String, ResolveError> {
    value
        .get("downloadLink")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ResolveError::Extraction("no download link in response".to_string()))
}
