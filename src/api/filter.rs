// Composable filters that narrow a file list down to the requested release

use crate::api::{File, ReleaseType};
use std::fmt;

/// A predicate over a single file
pub trait FileFilter: Send + Sync {
    /// Short label used in diagnostics, e.g. `release=beta`
    fn describe(&self) -> String;

    fn matches(&self, file: &File) -> bool;
}

/// Keep files at or below a release type.
///
/// Release types order as `Release < Beta < Alpha`, so asking for `Beta`
/// admits release and beta files and drops alphas. A looser request admits
/// more files; it never restricts the result to the less stable kinds.
/// Files with an unknown release type pass every ceiling.
pub struct ReleaseFilter {
    ceiling: ReleaseType,
}

impl ReleaseFilter {
    pub fn new(ceiling: ReleaseType) -> Self {
        Self { ceiling }
    }
}

impl FileFilter for ReleaseFilter {
    fn describe(&self) -> String {
        format!("release={}", self.ceiling)
    }

    fn matches(&self, file: &File) -> bool {
        file.release_type.code() <= self.ceiling.code()
    }
}

/// Keep files that list an exact game version string
pub struct VersionFilter {
    version: String,
}

impl VersionFilter {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl FileFilter for VersionFilter {
    fn describe(&self) -> String {
        format!("version={}", self.version)
    }

    fn matches(&self, file: &File) -> bool {
        file.game_version.iter().any(|v| *v == self.version)
    }
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub release: ReleaseType,
    pub game_version: Option<String>,
}

impl FilterSpec {
    pub fn new(release: ReleaseType, game_version: Option<String>) -> Self {
        Self {
            release,
            game_version,
        }
    }

    /// Filters implied by these settings, in the order they are applied
    pub fn filters(&self) -> Vec<Box<dyn FileFilter>> {
        let mut filters: Vec<Box<dyn FileFilter>> = Vec::new();
        if self.release != ReleaseType::Any {
            filters.push(Box::new(ReleaseFilter::new(self.release)));
        }
        if let Some(version) = self.game_version.as_deref().filter(|v| !v.is_empty()) {
            filters.push(Box::new(VersionFilter::new(version)));
        }
        filters
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "release={}", self.release)?;
        if let Some(version) = &self.game_version {
            write!(f, " version={}", version)?;
        }
        Ok(())
    }
}

/// Run `filters` in sequence, each over the survivors of the previous one.
///
/// Stops as soon as nothing survives. `observe` is called after every filter
/// that ran with the files that passed it; it cannot change the result.
pub fn apply(
    files: &[File],
    filters: &[Box<dyn FileFilter>],
    mut observe: Option<&mut dyn FnMut(&dyn FileFilter, &[File])>,
) -> Vec<File> {
    let mut remaining = files.to_vec();
    for filter in filters {
        remaining.retain(|file| filter.matches(file));
        if let Some(observe) = observe.as_deref_mut() {
            observe(filter.as_ref(), &remaining);
        }
        if remaining.is_empty() {
            break;
        }
    }
    remaining
}

/// Order files newest first; files with equal dates keep their order
pub fn sort_newest_first(files: &mut [File]) {
    files.sort_by(|a, b| b.file_date.cmp(&a.file_date));
}

/// Pick the most recently published file, `None` when there are no files
pub fn select_latest(mut files: Vec<File>) -> Option<File> {
    sort_newest_first(&mut files);
    files.into_iter().next()
}
