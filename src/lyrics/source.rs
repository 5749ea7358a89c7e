//! Where lyric text comes from.
//!
//! A locator is either an `http(s)://` URL or a path, resolved against a
//! base directory when relative.

use anyhow::Context;
use std::future::Future;
use std::path::PathBuf;

/// Fetch raw text for a locator. No retries, no caching.
pub trait TextSource {
    fn fetch(&self, locator: &str) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// Reads lyric files from disk.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    base_dir: Option<PathBuf>,
}

impl FileSource {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        let locator = locator.strip_prefix("file://").unwrap_or(locator);
        let path = PathBuf::from(locator);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl TextSource for FileSource {
    async fn fetch(&self, locator: &str) -> anyhow::Result<String> {
        let path = self.resolve(locator);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read {}", path.display()))
    }
}

/// Plain HTTP GET, body as text.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, timeout: std::time::Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("build reqwest client")?;
        Ok(Self { client })
    }
}

impl TextSource for HttpSource {
    async fn fetch(&self, locator: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .with_context(|| format!("GET {locator}"))?;

        if !response.status().is_success() {
            anyhow::bail!("GET {locator}: {}", response.status());
        }

        response.text().await.context("read lyrics body")
    }
}

/// Picks HTTP or file access by the locator's scheme.
#[derive(Debug, Clone)]
pub struct AnySource {
    pub http: HttpSource,
    pub file: FileSource,
}

impl AnySource {
    pub fn from_config(cfg: &crate::config::Config) -> anyhow::Result<Self> {
        Ok(Self {
            http: HttpSource::new(
                &cfg.lyrics.user_agent,
                std::time::Duration::from_secs(cfg.lyrics.fetch_timeout_secs),
            )?,
            file: FileSource::new(cfg.lyrics_base()),
        })
    }
}

impl TextSource for AnySource {
    async fn fetch(&self, locator: &str) -> anyhow::Result<String> {
        if is_remote(locator) {
            self.http.fetch(locator).await
        } else {
            self.file.fetch(locator).await
        }
    }
}

fn is_remote(locator: &str) -> bool {
    let lower = locator.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
