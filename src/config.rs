// Config module for output location settings

use crate::constants::STDOUT_FILENAME;
use crate::download::Destination;
use crate::error::ModError;
use std::path::{Path, PathBuf};

/// Validated output filename and directory overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputConfig {
    file: Option<String>,
    dir: Option<PathBuf>,
}

impl OutputConfig {
    /// Both overrides may be given only when the filename has no directory part
    pub fn new(file: Option<String>, dir: Option<PathBuf>) -> Result<Self, ModError> {
        let file = file.filter(|f| !f.is_empty());
        let dir = dir.filter(|d| !d.as_os_str().is_empty());

        if let (Some(file), Some(dir)) = (&file, &dir)
            && has_dir_component(file)
        {
            return Err(ModError::ConflictingOutputPath(format!(
                "output file '{}' already names a directory, cannot also write into '{}'",
                file,
                dir.display()
            )));
        }

        Ok(Self { file, dir })
    }

    /// True when every download would land on the same explicit filename
    pub fn is_single_file(&self) -> bool {
        self.file.is_some()
    }

    /// Where a file published as `file_name` should be written
    pub fn destination(&self, file_name: &str) -> Destination {
        let name = match self.file.as_deref() {
            Some(STDOUT_FILENAME) => return Destination::Stdout,
            Some(file) => file,
            None => file_name,
        };
        match &self.dir {
            Some(dir) => Destination::Path(dir.join(name)),
            None => Destination::Path(PathBuf::from(name)),
        }
    }
}

fn has_dir_component(file: &str) -> bool {
    Path::new(file)
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_published_name() {
        let config = OutputConfig::new(None, None).unwrap();
        assert_eq!(
            config.destination("jei-1.16.5.jar"),
            Destination::Path(PathBuf::from("jei-1.16.5.jar"))
        );
    }

    #[test]
    fn test_directory_override() {
        let config = OutputConfig::new(None, Some(PathBuf::from("mods"))).unwrap();
        assert_eq!(
            config.destination("jei.jar"),
            Destination::Path(PathBuf::from("mods/jei.jar"))
        );
    }

    #[test]
    fn test_file_override_inside_directory() {
        let config = OutputConfig::new(Some("jei.jar".into()), Some(PathBuf::from("mods"))).unwrap();
        assert_eq!(
            config.destination("jei-1.16.5-7.6.1.jar"),
            Destination::Path(PathBuf::from("mods/jei.jar"))
        );
        assert!(config.is_single_file());
    }

    #[test]
    fn test_file_with_directory_and_directory_conflict() {
        let err = OutputConfig::new(Some("out/jei.jar".into()), Some(PathBuf::from("mods"))).unwrap_err();
        assert!(matches!(err, ModError::ConflictingOutputPath(_)));
    }

    #[test]
    fn test_file_with_directory_alone() {
        let config = OutputConfig::new(Some("out/jei.jar".into()), None).unwrap();
        assert_eq!(
            config.destination("anything.jar"),
            Destination::Path(PathBuf::from("out/jei.jar"))
        );
    }

    #[test]
    fn test_dash_means_stdout() {
        let config = OutputConfig::new(Some("-".into()), Some(PathBuf::from("mods"))).unwrap();
        assert_eq!(config.destination("jei.jar"), Destination::Stdout);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = OutputConfig::new(Some(String::new()), Some(PathBuf::new())).unwrap();
        assert_eq!(config, OutputConfig::default());
    }
}
