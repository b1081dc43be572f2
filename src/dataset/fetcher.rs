//! Remote dataset download.
//!
//! Downloads a CSV from a plain HTTP(S) URL into a temporary file so
//! the loader can treat it like any local source. One attempt, no
//! retries: an unreachable source fails closed with a single clear
//! error and no partial state.

use crate::error::{ChurnError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Options for fetching a remote dataset.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Whether to show a download progress bar.
    pub show_progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            show_progress: true,
        }
    }
}

/// Result of a successful download.
#[derive(Debug)]
pub struct FetchResult {
    /// Temporary file holding the downloaded CSV. Dropping the result
    /// deletes the file, so keep it alive until loading is done.
    file: NamedTempFile,
    /// Number of bytes downloaded.
    pub bytes: u64,
}

impl FetchResult {
    /// Path to the downloaded file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Download a dataset from a URL to a temporary file.
pub async fn fetch_dataset(url: &str, options: FetchOptions) -> Result<FetchResult> {
    info!("Downloading dataset: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(options.timeout_seconds))
        .build()
        .map_err(|e| ChurnError::NotFound(format!("{}: {}", url, e)))?;

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ChurnError::NotFound(format!("failed to download {}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(ChurnError::NotFound(format!(
            "{}: HTTP {}",
            url,
            response.status()
        )));
    }

    let progress_bar = if options.show_progress {
        let pb = match response.content_length() {
            Some(length) => ProgressBar::new(length),
            None => ProgressBar::new_spinner(),
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut file = NamedTempFile::new()?;
    let mut bytes: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ChurnError::NotFound(format!("download interrupted for {}: {}", url, e)))?
    {
        file.write_all(&chunk)?;
        bytes += chunk.len() as u64;
        if let Some(ref pb) = progress_bar {
            pb.set_position(bytes);
        }
    }
    file.flush()?;

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Download complete");
    }

    debug!("Downloaded {} bytes to {}", bytes, file.path().display());

    Ok(FetchResult { file, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_options_default() {
        let opts = FetchOptions::default();
        assert_eq!(opts.timeout_seconds, 60);
        assert!(opts.show_progress);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_fails_closed() {
        let options = FetchOptions {
            timeout_seconds: 2,
            show_progress: false,
        };

        let err = fetch_dataset("http://127.0.0.1:1/churn.csv", options)
            .await
            .unwrap_err();
        assert!(matches!(err, ChurnError::NotFound(_)));
    }
}
