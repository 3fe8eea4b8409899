// Get command for resolving mods with their dependencies and downloading them

use crate::api::filter::{self, FileFilter, FilterSpec};
use crate::api::{File, Registry, RelationType};
use crate::config::OutputConfig;
use crate::download::{Downloader, Transfer};
use crate::error::ModError;
use crate::{resolver, ui};
use futures::future::join_all;
use indicatif::HumanBytes;
use log::{debug, error, info, trace, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Everything one `get` invocation was asked to do
#[derive(Debug, Clone)]
pub struct GetOptions {
    pub tokens: Vec<String>,
    pub filter: FilterSpec,
    pub resolve_dependencies: bool,
    pub output: OutputConfig,
}

/// Files selected so far in a batch.
///
/// Resolution tasks append to it concurrently, so the order of `files` says
/// nothing about which mod asked for which file.
#[derive(Debug, Default)]
pub struct ResolvedFileSet {
    files: Vec<File>,
    claimed_dependencies: HashSet<u32>,
}

impl ResolvedFileSet {
    /// Add a file unless the same file is already selected
    pub fn push(&mut self, file: File) -> bool {
        if self.files.iter().any(|f| f.id == file.id) {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Reserve a dependency addon id, false if another task already has it
    pub fn claim_dependency(&mut self, addon_id: u32) -> bool {
        self.claimed_dependencies.insert(addon_id)
    }

    pub fn into_files(self) -> Vec<File> {
        self.files
    }
}

/// Resolve every token, then download the selected files one after another
pub async fn get(
    registry: Arc<dyn Registry>,
    downloader: &dyn Downloader,
    options: GetOptions,
) -> Result<Vec<Transfer>, ModError> {
    let pb = ui::spinner(&format!("Resolving {} mod(s)...", options.tokens.len()));
    let resolved = resolve_batch(
        registry,
        &options.tokens,
        &options.filter,
        options.resolve_dependencies,
        CancellationToken::new(),
    )
    .await;

    let files = match resolved {
        Ok(files) => {
            ui::finish_spinner_success(&pb, &format!("Resolved {} file(s)", files.len()));
            files
        }
        Err(e) => {
            ui::finish_spinner_error(&pb, "Resolution failed");
            return Err(e);
        }
    };

    if options.output.is_single_file() && files.len() > 1 {
        return Err(ModError::ConflictingOutputPath(format!(
            "an output filename was given but {} files were resolved, use --no-deps or --directory",
            files.len()
        )));
    }

    download_all(downloader, &files, &options.output).await
}

/// Resolve `tokens` concurrently into the files to download.
///
/// One task runs per token and each fans out over the dependencies of the
/// file it selected. The first hard error cancels `cancel`; every task is
/// still joined before that error is returned.
pub async fn resolve_batch(
    registry: Arc<dyn Registry>,
    tokens: &[String],
    filter: &FilterSpec,
    resolve_dependencies: bool,
    cancel: CancellationToken,
) -> Result<Vec<File>, ModError> {
    let resolved: Arc<Mutex<ResolvedFileSet>> = Arc::default();

    let mut tasks = JoinSet::new();
    for token in tokens {
        let task = ModTask {
            registry: Arc::clone(&registry),
            filter: filter.clone(),
            resolve_dependencies,
            cancel: cancel.clone(),
            resolved: Arc::clone(&resolved),
        };
        let token = token.clone();
        tasks.spawn(async move { task.run(&token).await });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let Err(e) = joined.map_err(ModError::from).and_then(|result| result) else {
            continue;
        };
        if first_error.is_none() {
            if e.is_transport() {
                error!("registry request failed: {}", e);
            }
            debug!("cancelling outstanding resolution after: {}", e);
            cancel.cancel();
            first_error = Some(e);
        } else {
            debug!("additional failure while cancelling: {}", e);
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    let mut resolved = resolved.lock().await;
    Ok(std::mem::take(&mut *resolved).into_files())
}

/// Resolution of one requested mod and its direct dependencies
struct ModTask {
    registry: Arc<dyn Registry>,
    filter: FilterSpec,
    resolve_dependencies: bool,
    cancel: CancellationToken,
    resolved: Arc<Mutex<ResolvedFileSet>>,
}

impl ModTask {
    /// Resolve `token`, cancelling the whole batch if it fails
    async fn run(self, token: &str) -> Result<(), ModError> {
        let result = self.resolve(token).await;
        if let Err(e) = &result {
            self.abort(token, e);
        }
        result
    }

    async fn resolve(&self, token: &str) -> Result<(), ModError> {
        if self.aborted(token, "resolving") {
            return Ok(());
        }
        let addon = resolver::lookup(self.registry.as_ref(), token).await?;
        info!("[{}] found mod (id {})", addon.slug, addon.id);

        if self.aborted(&addon.slug, "listing files") {
            return Ok(());
        }
        let file = latest_matching_file(self.registry.as_ref(), addon.id, &addon.slug, &self.filter)
            .await?
            .ok_or_else(|| ModError::NoMatchingFile {
                addon: addon.slug.clone(),
                filter: self.filter.to_string(),
            })?;
        trace!(
            "[{}] chose '{}' (file {}, {}) as latest file",
            addon.slug,
            file.file_name,
            file.id,
            file.display_name
        );

        let dependencies: Vec<u32> = file
            .dependencies
            .iter()
            .filter(|dep| dep.relation != RelationType::Incompatible)
            .map(|dep| dep.addon_id)
            .collect();
        self.resolved.lock().await.push(file);

        if !self.resolve_dependencies || dependencies.is_empty() {
            return Ok(());
        }
        if self.aborted(&addon.slug, "resolving dependencies") {
            return Ok(());
        }

        debug!("[{}] resolving {} dependencies", addon.slug, dependencies.len());
        let results = join_all(
            dependencies
                .into_iter()
                .map(|dep_id| self.resolve_dependency(dep_id, &addon.slug)),
        )
        .await;
        let added = results.into_iter().collect::<Result<Vec<bool>, _>>()?;
        debug!(
            "[{}] found an additional {} file(s)",
            addon.slug,
            added.into_iter().filter(|&a| a).count()
        );
        Ok(())
    }

    /// Resolve one dependency, returning whether a file was added.
    ///
    /// A dependency that cannot be looked up or has no matching file is
    /// skipped; only a failed file listing is a hard error.
    async fn resolve_dependency(&self, addon_id: u32, parent: &str) -> Result<bool, ModError> {
        let label = format!("{} dep-of {}", addon_id, parent);
        if self.aborted(&label, "dependency") {
            return Ok(false);
        }
        if !self.resolved.lock().await.claim_dependency(addon_id) {
            debug!("[{}] already resolved by another task", label);
            return Ok(false);
        }

        let addon = match self.registry.addon_by_id(addon_id).await {
            Ok(Some(addon)) if addon.id == addon_id => addon,
            Ok(Some(addon)) => {
                warn!("[{}] registry answered with mod {}, skipping", label, addon.id);
                return Ok(false);
            }
            Ok(None) => {
                warn!("[{}] no such mod, skipping", label);
                return Ok(false);
            }
            Err(e) => {
                warn!("[{}] failed to lookup dependency, skipping: {}", label, e);
                return Ok(false);
            }
        };
        let label = format!("{} dep-of {}", addon.slug, parent);

        if self.aborted(&label, "listing files") {
            return Ok(false);
        }
        let file = latest_matching_file(self.registry.as_ref(), addon_id, &label, &self.filter)
            .await
            .inspect_err(|e| self.abort(&label, e))?;
        match file {
            Some(file) => {
                trace!("[{}] chose '{}' as latest file", label, file.file_name);
                Ok(self.resolved.lock().await.push(file))
            }
            None => {
                warn!("[{}] no download found for {}, skipping", label, self.filter);
                Ok(false)
            }
        }
    }

    /// Broadcast cancellation to every task in the batch
    fn abort(&self, label: &str, cause: &ModError) {
        if !self.cancel.is_cancelled() {
            debug!("[{}] cancelling batch after: {}", label, cause);
            self.cancel.cancel();
        }
    }

    fn aborted(&self, label: &str, stage: &str) -> bool {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            debug!("[{}] cancelled before {}", label, stage);
        }
        cancelled
    }
}

/// List an addon's files, filter them and pick the newest survivor
async fn latest_matching_file(
    registry: &dyn Registry,
    addon_id: u32,
    label: &str,
    spec: &FilterSpec,
) -> Result<Option<File>, ModError> {
    let files = registry
        .files(addon_id)
        .await
        .inspect_err(|e| error!("[{}] failed to list mod files: {}", label, e))?;
    debug!("[{}] found {} downloads", label, files.len());

    let filters = spec.filters();
    let observe: &mut dyn FnMut(&dyn FileFilter, &[File]) = &mut |filter, survivors| {
        debug!("[{}] {} files match {}", label, survivors.len(), filter.describe());
    };
    let kept = filter::apply(&files, &filters, Some(observe));
    Ok(filter::select_latest(kept))
}

/// Write every file in turn; the first failure stops the rest
async fn download_all(
    downloader: &dyn Downloader,
    files: &[File],
    output: &OutputConfig,
) -> Result<Vec<Transfer>, ModError> {
    let mut transfers = Vec::with_capacity(files.len());
    for file in files {
        let destination = output.destination(&file.file_name);
        info!(
            "downloading {} ({}) to {}",
            file.file_name,
            HumanBytes(file.file_length),
            destination
        );

        let transfer = downloader
            .stream(&file.download_url, &destination)
            .await
            .inspect_err(|e| error!("failed writing {}: {}", destination, e))?;

        info!("{} transferred {}", destination, transfer.summary());
        if let Some(expected) = transfer.expected
            && expected != transfer.bytes
        {
            warn!(
                "{} received {} bytes but {} were announced",
                destination, transfer.bytes, expected
            );
        }
        ui::success(&format!("{} ({})", destination, transfer.rate()));
        transfers.push(transfer);
    }
    Ok(transfers)
}
