// Download module for streaming files to disk or standard output

use crate::api::http;
use crate::error::ModError;
use crate::ui;
use async_trait::async_trait;
use indicatif::{HumanBytes, HumanDuration};
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Where a downloaded file is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Path(PathBuf),
}

impl Destination {
    fn io_path(&self) -> &Path {
        match self {
            Destination::Stdout => Path::new("/dev/stdout"),
            Destination::Path(path) => path,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("<stdout>"),
            Destination::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Outcome of one completed download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub bytes: u64,
    /// Size announced by the server, if any
    pub expected: Option<u64>,
    pub elapsed: Duration,
}

impl Transfer {
    /// Human readable transfer rate, e.g. `1.20 MiB/s`
    pub fn rate(&self) -> String {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return format!("{}/s", HumanBytes(self.bytes));
        }
        format!("{}/s", HumanBytes((self.bytes as f64 / secs) as u64))
    }

    pub fn summary(&self) -> String {
        format!(
            "{} in {} ({})",
            HumanBytes(self.bytes),
            HumanDuration(self.elapsed),
            self.rate()
        )
    }
}

/// Something that can fetch a URL into a destination
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn stream(&self, url: &str, destination: &Destination) -> Result<Transfer, ModError>;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn stream(&self, url: &str, destination: &Destination) -> Result<Transfer, ModError> {
        let mut response = http::get(&self.client, url).await?;
        let expected = response.content_length();

        let io_error = |source| ModError::Io {
            path: destination.io_path().to_path_buf(),
            source,
        };

        let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match destination {
            Destination::Stdout => Box::new(tokio::io::stdout()),
            Destination::Path(path) => Box::new(tokio::fs::File::create(path).await.map_err(io_error)?),
        };

        let bar = match expected {
            Some(total) => ui::download_bar(total),
            None => ui::download_bar_indeterminate(),
        };
        bar.set_message(destination.to_string());

        let start = Instant::now();
        let mut bytes = 0u64;
        let copied = async {
            while let Some(chunk) = response.chunk().await? {
                writer.write_all(&chunk).await.map_err(io_error)?;
                bytes += chunk.len() as u64;
                bar.set_position(bytes);
            }
            writer.flush().await.map_err(io_error)?;
            Ok::<(), ModError>(())
        }
        .await;
        let elapsed = start.elapsed();

        ui::clear_bar(&bar);
        copied?;

        Ok(Transfer {
            bytes,
            expected,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{http_response, local_client, serve};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stream_writes_file() {
        let base = serve(http_response("200 OK", 11, "jar content")).await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("mod.jar");

        let transfer = HttpDownloader::new(local_client())
            .stream(&base, &Destination::Path(target.clone()))
            .await
            .unwrap();

        assert_eq!(transfer.bytes, 11);
        assert_eq!(transfer.expected, Some(11));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "jar content");
    }

    #[tokio::test]
    async fn test_stream_error_status_creates_nothing() {
        let base = serve(http_response("500 Internal Server Error", 4, "oops")).await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("mod.jar");

        let err = HttpDownloader::new(local_client())
            .stream(&base, &Destination::Path(target.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, ModError::HttpStatus { status: 500, .. }));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_stream_short_body_leaves_partial_file() {
        // Announces more bytes than it sends before closing
        let base = serve(http_response("200 OK", 64, "part")).await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("mod.jar");

        let err = HttpDownloader::new(local_client())
            .stream(&base, &Destination::Path(target.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, ModError::Http(_)));
        assert!(target.exists());
        assert!(std::fs::metadata(&target).unwrap().len() <= 4);
    }

    #[tokio::test]
    async fn test_stream_missing_directory_is_io_error() {
        let base = serve(http_response("200 OK", 2, "ok")).await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("mod.jar");

        let err = HttpDownloader::new(local_client())
            .stream(&base, &Destination::Path(target.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, ModError::Io { ref path, .. } if *path == target));
    }

    #[test]
    fn test_transfer_rate() {
        let transfer = Transfer {
            bytes: 2 * 1024 * 1024,
            expected: None,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(transfer.rate(), "1.00 MiB/s");
    }

    #[test]
    fn test_transfer_rate_instant() {
        let transfer = Transfer {
            bytes: 512,
            expected: Some(512),
            elapsed: Duration::ZERO,
        };
        assert_eq!(transfer.rate(), "512 B/s");
    }

    #[test]
    fn test_destination_display() {
        assert_eq!(Destination::Stdout.to_string(), "<stdout>");
        assert_eq!(
            Destination::Path(PathBuf::from("mods/jei.jar")).to_string(),
            "mods/jei.jar"
        );
    }
}
