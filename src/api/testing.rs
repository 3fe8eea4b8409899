// In-memory registry and downloader used by unit tests

use crate::api::{Addon, Dependency, File, Registry, RelationType, ReleaseType, SearchQuery};
use crate::download::{Destination, Downloader, Transfer};
use crate::error::ModError;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub fn addon(id: u32, slug: &str, name: &str) -> Addon {
    Addon {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        download_count: 0.0,
        date_modified: None,
        game_version_latest_files: Vec::new(),
    }
}

/// A file published at midnight UTC on `date` (`YYYY-MM-DD`)
pub fn file(id: u32, release: ReleaseType, date: &str, versions: &[&str]) -> File {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    File {
        id,
        display_name: format!("file-{}", id),
        file_name: format!("file-{}.jar", id),
        file_date: Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap()),
        file_length: 1024,
        release_type: release,
        download_url: format!("https://cdn.example.com/files/{}.jar", id),
        game_version: versions.iter().map(|v| v.to_string()).collect(),
        dependencies: Vec::new(),
    }
}

pub fn with_dependencies(mut file: File, addon_ids: &[u32]) -> File {
    file.dependencies = addon_ids
        .iter()
        .map(|&addon_id| Dependency {
            addon_id,
            relation: RelationType::RequiredDependency,
        })
        .collect();
    file
}

pub fn unavailable(url: &str) -> ModError {
    ModError::HttpStatus {
        method: "GET",
        url: url.to_string(),
        status: 503,
        body: "service unavailable".to_string(),
    }
}

/// An HTTP/1.1 response with a JSON content type and `Connection: close`
pub fn http_response(status: &str, content_length: usize, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status, content_length, body
    )
}

/// Answer every request on a local port with `response`, returning the base URL
pub async fn serve(response: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

/// A client that never routes local test traffic through a proxy
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    AddonById(u32),
    Files(u32),
}

#[derive(Default)]
pub struct FakeRegistry {
    addons: Vec<Addon>,
    files: HashMap<u32, Vec<File>>,
    failing_searches: HashSet<String>,
    failing_files: HashSet<u32>,
    held_files: HashMap<u32, CancellationToken>,
    misreported_ids: HashMap<u32, u32>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_addon(mut self, addon: Addon, files: Vec<File>) -> Self {
        self.files.insert(addon.id, files);
        self.addons.push(addon);
        self
    }

    pub fn fail_search(mut self, filter: &str) -> Self {
        self.failing_searches.insert(filter.to_string());
        self
    }

    pub fn fail_files(mut self, addon_id: u32) -> Self {
        self.failing_files.insert(addon_id);
        self
    }

    /// Answer the file listing for `addon_id` only once `token` is cancelled
    pub fn hold_files_until(mut self, addon_id: u32, token: CancellationToken) -> Self {
        self.held_files.insert(addon_id, token);
        self
    }

    /// Answer lookups of `requested` with a record carrying `returned`
    pub fn misreport_id(mut self, requested: u32, returned: u32) -> Self {
        self.misreported_ids.insert(requested, returned);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Addon>, ModError> {
        self.record(Call::Search(query.filter.clone()));
        if self.failing_searches.contains(&query.filter) {
            return Err(unavailable("https://registry.test/v2/addon/search"));
        }

        let needle = query.filter.to_lowercase();
        Ok(self
            .addons
            .iter()
            .filter(|a| a.slug.to_lowercase().contains(&needle) || a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn addon_by_id(&self, id: u32) -> Result<Option<Addon>, ModError> {
        self.record(Call::AddonById(id));
        let found = self.addons.iter().find(|a| a.id == id).cloned();
        Ok(found.map(|mut addon| {
            if let Some(&returned) = self.misreported_ids.get(&id) {
                addon.id = returned;
            }
            addon
        }))
    }

    async fn files(&self, addon_id: u32) -> Result<Vec<File>, ModError> {
        self.record(Call::Files(addon_id));
        if let Some(token) = self.held_files.get(&addon_id) {
            token.cancelled().await;
        }
        if self.failing_files.contains(&addon_id) {
            return Err(unavailable(&format!("https://registry.test/v2/addon/{}/files", addon_id)));
        }
        Ok(self.files.get(&addon_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeDownloader {
    downloads: Mutex<Vec<(String, Destination)>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<(String, Destination)> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn stream(&self, url: &str, destination: &Destination) -> Result<Transfer, ModError> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), destination.clone()));
        Ok(Transfer {
            bytes: 1024,
            expected: Some(1024),
            elapsed: Duration::from_millis(10),
        })
    }
}
