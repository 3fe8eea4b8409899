// Constants module for shared constants

/// Base URL of the addon registry API
pub const DEFAULT_API_URL: &str = "https://addons-ecs.forgesvc.net/api";

/// Registry game id of Minecraft
pub const GAME_MINECRAFT: u32 = 432;

/// Upper bound on results requested from a registry search
pub const SEARCH_PAGE_SIZE: u32 = 9999;

/// Output filename that means standard output
pub const STDOUT_FILENAME: &str = "-";

/// Width at which mod names are cut in search listings
pub const NAME_WIDTH: usize = 32;
