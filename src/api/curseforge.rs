// CurseForge addon registry client

use crate::api::http;
use crate::api::{Addon, File, Registry, SearchQuery};
use crate::constants::SEARCH_PAGE_SIZE;
use crate::error::ModError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

pub struct CurseForgeClient {
    client: Client,
    api_url: String,
}

impl CurseForgeClient {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        let mut params = vec![
            format!("gameId={}", query.game_id),
            format!("pageSize={}", SEARCH_PAGE_SIZE),
            format!("searchFilter={}", urlencoding::encode(&query.filter)),
        ];
        if let Some(version) = &query.game_version {
            params.push(format!("gameVersion={}", urlencoding::encode(version)));
        }
        if let Some(sort) = query.sort {
            params.push(format!("sort={}", sort as u8));
        }
        format!("{}?{}", self.url("v2/addon/search"), params.join("&"))
    }
}

#[async_trait]
impl Registry for CurseForgeClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Addon>, ModError> {
        let url = self.search_url(query);
        let results: Vec<Addon> = http::fetch_json(&self.client, &url).await?;
        debug!("search '{}' returned {} result(s)", query.filter, results.len());
        Ok(results)
    }

    async fn addon_by_id(&self, id: u32) -> Result<Option<Addon>, ModError> {
        let url = self.url(&format!("v2/addon/{}", id));
        http::fetch_json_optional(&self.client, &url).await
    }

    async fn files(&self, addon_id: u32) -> Result<Vec<File>, ModError> {
        let url = self.url(&format!("v2/addon/{}/files", addon_id));
        http::fetch_json(&self.client, &url).await
    }
}
