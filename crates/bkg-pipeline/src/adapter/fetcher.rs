// HTTP Fetcher with cache-root reuse
//
// Capability object held by adapters (composition, not inheritance): wraps
// a reqwest client with bounded retries, gzip decompression, and
// check-then-write caching of raw payloads under the cache root. Derived
// tuples are never cached, only upstream bytes.
//
// Cache access is exists?-reuse-:-download-then-write with no file-lock
// discipline; two processes sharing a cache root can race on the same
// download. Known gap, recorded rather than mitigated.

use super::{AdapterError, Result};
use bkg_common::checksum;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP client for downloading source exports into the cache root
pub struct HttpFetcher {
    client: Client,
    cache_dir: PathBuf,
    max_retries: u32,
}

impl HttpFetcher {
    /// Create a new fetcher rooted at `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>, timeout_secs: u64, max_retries: u32) -> Result<Self> {
        if timeout_secs == 0 {
            return Err(AdapterError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("BKG-Pipeline/0.1")
            .build()?;

        Ok(HttpFetcher {
            client,
            cache_dir,
            max_retries: max_retries.max(1),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Fetch a URL, reusing the cached copy under `filename` when present
    pub async fn fetch_cached(&self, url: &str, filename: &str) -> Result<Vec<u8>> {
        let cache_path = self.cache_dir.join(filename);

        if cache_path.exists() {
            info!("Using cached file: {}", cache_path.display());
            return Ok(std::fs::read(&cache_path)?);
        }

        let content = self.download_with_retry(url).await?;
        info!(
            "Downloaded {}: {} bytes (sha256 {})",
            url,
            content.len(),
            checksum::sha256_hex(&content)
        );

        if let Some(parent) = cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&cache_path, &content)?;
        debug!("Cached payload at {}", cache_path.display());

        Ok(content)
    }

    /// Fetch a URL as UTF-8 text, decompressing gzip payloads by filename
    pub async fn fetch_text_cached(&self, url: &str, filename: &str) -> Result<String> {
        let bytes = self.fetch_cached(url, filename).await?;

        let bytes = if filename.ends_with(".gz") {
            self.decompress_gzip(&bytes)?
        } else {
            bytes
        };

        String::from_utf8(bytes)
            .map_err(|e| AdapterError::Parse(format!("Payload is not valid UTF-8: {}", e)))
    }

    /// Issue a GET and deserialize a JSON response without caching.
    ///
    /// Used by paginated API backends where page boundaries are not stable
    /// enough to be worth a cache entry.
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AdapterError::Validation(format!(
                "HTTP error from {}: {}",
                url,
                response.status()
            )));
        }

        Ok(response.json::<T>().await?)
    }

    /// Download a URL with retry and exponential backoff
    async fn download_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.download_url(url).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!("Download attempt {}/{} failed: {}", attempt, self.max_retries, e);
                    last_error = Some(e);

                    if attempt < self.max_retries {
                        let backoff_secs = 2u64.pow(attempt);
                        info!("Retrying in {} seconds...", backoff_secs);
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    }
                },
            }
        }

        // max_retries >= 1, so at least one failure was recorded
        match last_error {
            Some(err) => Err(err),
            None => Err(AdapterError::Validation(format!(
                "Download of {} failed with no error captured",
                url
            ))),
        }
    }

    /// Download a URL once, streaming with a progress bar
    async fn download_url(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AdapterError::Validation(format!(
                "HTTP error from {}: {}",
                url,
                response.status()
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        let pb = ProgressBar::new(total_size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .map_err(|e| AdapterError::Validation(e.to_string()))?
                .progress_chars("#>-"),
        );

        let mut content = Vec::with_capacity(total_size as usize);
        let mut stream = response.bytes_stream();

        use futures::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            content.extend_from_slice(&chunk);
            pb.set_position(content.len() as u64);
        }

        pb.finish_and_clear();
        Ok(content)
    }

    /// Decompress gzip data
    pub fn decompress_gzip(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(compressed);
        let mut decompressed = Vec::new();

        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| AdapterError::Decompression(e.to_string()))?;

        Ok(decompressed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_fetcher(dir: &Path) -> HttpFetcher {
        HttpFetcher::new(dir, 30, 2).unwrap()
    }

    #[test]
    fn test_fetcher_creation() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(dir.path(), 30, 3);
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(dir.path(), 0, 3);
        assert!(fetcher.is_err());
    }

    #[test]
    fn test_decompress_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = test_fetcher(dir.path());

        let test_data = b"protein1 protein2 900";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(test_data).unwrap();
        let compressed = encoder.finish().unwrap();

        let decompressed = fetcher.decompress_gzip(&compressed).unwrap();
        assert_eq!(decompressed, test_data);
    }

    #[tokio::test]
    async fn test_fetch_cached_reuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = test_fetcher(dir.path());

        // Seed the cache; the bogus URL proves no network call is made
        std::fs::write(dir.path().join("seeded.txt"), b"cached bytes").unwrap();

        let content = fetcher
            .fetch_cached("http://127.0.0.1:1/unreachable", "seeded.txt")
            .await
            .unwrap();
        assert_eq!(content, b"cached bytes");
    }

    #[tokio::test]
    async fn test_fetch_cached_downloads_and_writes() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/export.tsv"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a\tb\n".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = test_fetcher(dir.path());

        let url = format!("{}/export.tsv", server.uri());
        let content = fetcher.fetch_cached(&url, "export.tsv").await.unwrap();
        assert_eq!(content, b"a\tb\n");

        // Second fetch must come from the cache root
        let cached = std::fs::read(dir.path().join("export.tsv")).unwrap();
        assert_eq!(cached, b"a\tb\n");
    }

    #[tokio::test]
    async fn test_download_fails_after_retries() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = test_fetcher(dir.path());

        let url = format!("{}/broken", server.uri());
        let result = fetcher.fetch_cached(&url, "broken.bin").await;
        assert!(result.is_err());
        assert!(!dir.path().join("broken.bin").exists());
    }
}
