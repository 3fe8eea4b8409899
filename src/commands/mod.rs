// Commands module, one submodule per subcommand

pub mod get;
pub mod search;
