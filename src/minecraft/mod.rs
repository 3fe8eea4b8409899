// Minecraft game version model

pub mod version;

pub use version::{Version, VersionSet};
