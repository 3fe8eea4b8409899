// Parsing, ordering and grouping of Minecraft game versions

use crate::error::ModError;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Development phase a game version was published in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Release,
    Alpha,
    Beta,
    Indev,
    Infdev,
}

impl Phase {
    /// Phases that may prefix a version string, e.g. "Beta 1.7.3"
    const PREFIXED: [Phase; 4] = [Phase::Alpha, Phase::Beta, Phase::Indev, Phase::Infdev];

    fn as_str(self) -> &'static str {
        match self {
            Phase::Release => "release",
            Phase::Alpha => "alpha",
            Phase::Beta => "beta",
            Phase::Indev => "indev",
            Phase::Infdev => "infdev",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Phase::Release => "Release",
            Phase::Alpha => "Alpha",
            Phase::Beta => "Beta",
            Phase::Indev => "Indev",
            Phase::Infdev => "Infdev",
        }
    }
}

/// A parsed game version such as `1.16.5`, `1.0_01` or `Alpha 1.0.17_04`.
///
/// Components that were not written in the source text are `None`, which is
/// distinct from an explicit zero. Ordering (see [`Version::compare`]) only
/// looks at the numeric components; `phase` does not take part in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: Option<u32>,
    pub patch: Option<u32>,
    pub build: Option<u32>,
    pub phase: Phase,
}

impl Version {
    /// Parse `[phase ]['v']major.minor[.patch][_build]`
    ///
    /// The phase word is matched case-insensitively and must be followed by a
    /// single space. Major, minor and patch are one or two digits, the build
    /// number exactly two.
    pub fn parse(text: &str) -> Result<Self, ModError> {
        let invalid = || ModError::InvalidVersion(text.to_string());

        let (phase, rest) = split_phase(text);
        let rest = rest.strip_prefix(['v', 'V']).unwrap_or(rest);

        let (major, rest) = take_digits(rest, 1, 2).ok_or_else(invalid)?;
        let rest = rest.strip_prefix('.').ok_or_else(invalid)?;
        let (minor, mut rest) = take_digits(rest, 1, 2).ok_or_else(invalid)?;

        let mut patch = None;
        if let Some(after) = rest.strip_prefix('.') {
            let (value, after) = take_digits(after, 1, 2).ok_or_else(invalid)?;
            patch = Some(value);
            rest = after;
        }

        let mut build = None;
        if let Some(after) = rest.strip_prefix('_') {
            let (value, after) = take_digits(after, 2, 2).ok_or_else(invalid)?;
            build = Some(value);
            rest = after;
        }

        if !rest.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            major,
            minor: Some(minor),
            patch,
            build,
            phase,
        })
    }

    /// Compare by (major, minor, patch, build), most significant first.
    ///
    /// An absent component orders below any explicit value, so `1.0 < 1.0.0`.
    pub fn compare(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.build).cmp(&(
            other.major,
            other.minor,
            other.patch,
            other.build,
        ))
    }

    pub fn less_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// The (major, minor) pair patch releases are grouped under
    pub fn significance(&self) -> (u32, Option<u32>) {
        (self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.phase != Phase::Release {
            write!(f, "{} ", self.phase.title())?;
        }
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{}", patch)?;
        }
        if let Some(build) = self.build {
            write!(f, "_{:02}", build)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ModError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split_phase(text: &str) -> (Phase, &str) {
    for phase in Phase::PREFIXED {
        let word = phase.as_str();
        let matches_word = text
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word));
        if matches_word && let Some(rest) = text[word.len()..].strip_prefix(' ') {
            return (phase, rest);
        }
    }
    (Phase::Release, text)
}

/// Read between `min` and `max` leading ASCII digits
fn take_digits(text: &str, min: usize, max: usize) -> Option<(u32, &str)> {
    let len = text.bytes().take_while(u8::is_ascii_digit).count();
    if len < min || len > max {
        return None;
    }
    let value = text[..len].parse().ok()?;
    Some((value, &text[len..]))
}

/// An ordered collection of versions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSet(Vec<Version>);

impl VersionSet {
    pub fn sort(&mut self) {
        self.0.sort_by(Version::compare);
    }

    /// Keep the greatest version of every (major, minor) group, ascending
    pub fn latest_patches(&self) -> VersionSet {
        let mut latest: BTreeMap<(u32, Option<u32>), Version> = BTreeMap::new();
        for version in &self.0 {
            latest
                .entry(version.significance())
                .and_modify(|current| {
                    if current.less_than(version) {
                        *current = *version;
                    }
                })
                .or_insert(*version);
        }

        let mut set: VersionSet = latest.into_values().collect();
        set.sort();
        set
    }

    /// Render every version in its canonical form
    pub fn strings(&self) -> Vec<String> {
        self.0.iter().map(Version::to_string).collect()
    }
}

impl FromIterator<Version> for VersionSet {
    fn from_iter<I: IntoIterator<Item = Version>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for VersionSet {
    type Item = Version;
    type IntoIter = std::vec::IntoIter<Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
