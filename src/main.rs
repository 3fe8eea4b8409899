mod api;
mod cli;
mod commands;
mod config;
mod constants;
mod download;
mod error;
mod minecraft;
mod resolver;
mod ui;

use api::CurseForgeClient;
use api::filter::FilterSpec;
use clap::Parser;
use cli::{Cli, Commands};
use commands::get::GetOptions;
use commands::search::SearchOptions;
use config::OutputConfig;
use download::HttpDownloader;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{:?}", e);
            ui::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Get {
            mods,
            directory,
            output,
            release,
            gamever,
            no_deps,
        } => {
            // Output paths are checked before anything touches the network
            let output = OutputConfig::new(output, directory)?;
            let options = GetOptions {
                tokens: mods,
                filter: FilterSpec::new(release, gamever),
                resolve_dependencies: !no_deps,
                output,
            };

            let client = api::http::build_client()?;
            let registry = Arc::new(CurseForgeClient::new(client.clone(), cli.api_url));
            let downloader = HttpDownloader::new(client);

            let transfers = commands::get::get(registry, &downloader, options).await?;
            log::debug!("downloaded {} file(s)", transfers.len());
        }
        Commands::Search {
            term,
            count,
            all,
            gamever,
        } => {
            let options = SearchOptions {
                term: term.join(" "),
                game_version: gamever,
                limit: (!all).then_some(count),
            };

            let client = api::http::build_client()?;
            let registry = CurseForgeClient::new(client, cli.api_url);
            commands::search::search(&registry, options).await?;
        }
    }
    Ok(())
}
