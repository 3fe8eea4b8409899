// API module for addon registry records and the registry interface

use crate::error::ModError;
use crate::minecraft::{Version, VersionSet};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub mod curseforge;
pub mod filter;
pub mod http;
#[cfg(test)]
pub mod testing;

pub use curseforge::CurseForgeClient;

/// Stability classification of a file.
///
/// The discriminants are the registry's integer codes; `Any` is never
/// stored on a file and only acts as "no constraint" in a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "i64")]
pub enum ReleaseType {
    Any = -1,
    Unknown = 0,
    Release = 1,
    Beta = 2,
    Alpha = 3,
}

impl ReleaseType {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl From<i64> for ReleaseType {
    fn from(code: i64) -> Self {
        match code {
            1 => ReleaseType::Release,
            2 => ReleaseType::Beta,
            3 => ReleaseType::Alpha,
            _ => ReleaseType::Unknown,
        }
    }
}

impl FromStr for ReleaseType {
    type Err = ModError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(ReleaseType::Any),
            "release" => Ok(ReleaseType::Release),
            "beta" => Ok(ReleaseType::Beta),
            "alpha" => Ok(ReleaseType::Alpha),
            _ => Err(ModError::InvalidReleaseType(s.to_string())),
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseType::Any => "any",
            ReleaseType::Unknown => "unknown",
            ReleaseType::Release => "release",
            ReleaseType::Beta => "beta",
            ReleaseType::Alpha => "alpha",
        };
        f.write_str(name)
    }
}

/// How a file refers to another addon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "i64")]
pub enum RelationType {
    EmbeddedLibrary,
    OptionalDependency,
    RequiredDependency,
    Tool,
    Incompatible,
    Include,
    Other(i64),
}

impl From<i64> for RelationType {
    fn from(code: i64) -> Self {
        match code {
            1 => RelationType::EmbeddedLibrary,
            2 => RelationType::OptionalDependency,
            3 => RelationType::RequiredDependency,
            4 => RelationType::Tool,
            5 => RelationType::Incompatible,
            6 => RelationType::Include,
            other => RelationType::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub addon_id: u32,
    #[serde(rename = "type")]
    pub relation: RelationType,
}

/// One downloadable build of an addon
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: u32,
    #[serde(default)]
    pub display_name: String,
    pub file_name: String,
    pub file_date: DateTime<Utc>,
    #[serde(default)]
    pub file_length: u64,
    pub release_type: ReleaseType,
    pub download_url: String,
    #[serde(default)]
    pub game_version: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// Latest file of an addon for one game version
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameVersionLatestFile {
    pub game_version: String,
}

/// Identity and metadata of a mod project
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub id: u32,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub download_count: f64,
    #[serde(default)]
    pub date_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub game_version_latest_files: Vec<GameVersionLatestFile>,
}

impl Addon {
    /// Game versions this addon has published files for.
    ///
    /// Entries that are not game versions (loader names and the like) are
    /// dropped.
    pub fn supported_versions(&self) -> VersionSet {
        let mut seen = HashSet::new();
        self.game_version_latest_files
            .iter()
            .filter_map(|latest| Version::parse(&latest.game_version).ok())
            .filter(|version| seen.insert(*version))
            .collect()
    }
}

/// Find an addon whose slug equals `slug`, ignoring case
pub fn find_by_slug<'a>(addons: &'a [Addon], slug: &str) -> Option<&'a Addon> {
    let slug = slug.to_lowercase();
    addons.iter().find(|addon| addon.slug.to_lowercase() == slug)
}

/// Find an addon whose display name equals `name`, ignoring case
pub fn find_by_name<'a>(addons: &'a [Addon], name: &str) -> Option<&'a Addon> {
    let name = name.to_lowercase();
    addons.iter().find(|addon| addon.name.to_lowercase() == name)
}

/// Sort orders understood by the registry search endpoint
#[allow(dead_code)] // Mirrors the registry's sort codes, only some are used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Featured = 0,
    Popularity = 1,
    LastUpdated = 2,
    Name = 3,
    Author = 4,
    TotalDownloads = 5,
}

/// Parameters of a free-text addon search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filter: String,
    pub game_id: u32,
    pub game_version: Option<String>,
    pub sort: Option<SortOrder>,
}

impl SearchQuery {
    pub fn new(filter: impl Into<String>, game_id: u32) -> Self {
        Self {
            filter: filter.into(),
            game_id,
            game_version: None,
            sort: None,
        }
    }

    pub fn game_version(mut self, version: Option<String>) -> Self {
        self.game_version = version;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// A source of addon and file records
#[async_trait]
pub trait Registry: Send + Sync {
    /// Free-text search over addons, up to an implementation defined cap
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Addon>, ModError>;

    /// Fetch a single addon, `None` when the registry has no such id
    async fn addon_by_id(&self, id: u32) -> Result<Option<Addon>, ModError>;

    /// List every file published for an addon
    async fn files(&self, addon_id: u32) -> Result<Vec<File>, ModError>;
}
