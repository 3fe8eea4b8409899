// Resolver module for turning a user supplied name or id into an addon

use crate::api::{self, Addon, Registry, SearchQuery};
use crate::constants::GAME_MINECRAFT;
use crate::error::{AddonRef, ModError};
use log::{debug, error};

/// Look up the addon a user meant by `token`.
///
/// An integer token is fetched by id. Anything else is searched for and
/// matched against the results by slug first, then by display name, both
/// ignoring case. Slugs are unique, names are not, so a slug match wins.
pub async fn lookup(registry: &dyn Registry, token: &str) -> Result<Addon, ModError> {
    match integer_token(token) {
        Some(value) => match u32::try_from(value) {
            Ok(id) => lookup_by_id(registry, id).await,
            Err(_) => {
                debug!("[{}] id is outside the registry's range", token);
                Err(ModError::NoSuchAddon(AddonRef::Id(value)))
            }
        },
        None => lookup_by_name(registry, token).await,
    }
}

/// Parse a token written as plain decimal digits with an optional minus sign
fn integer_token(token: &str) -> Option<i64> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

async fn lookup_by_id(registry: &dyn Registry, id: u32) -> Result<Addon, ModError> {
    debug!("[{}] fetching mod metadata by id", id);

    let addon = registry
        .addon_by_id(id)
        .await
        .inspect_err(|e| error!("[{}] failed to query: {}", id, e))?
        .ok_or(ModError::NoSuchAddon(AddonRef::Id(id.into())))?;

    if addon.id != id {
        error!("[{}] registry answered with mod {}, aborting", id, addon.id);
        return Err(ModError::AddonIdMismatch {
            requested: id,
            returned: addon.id,
        });
    }
    Ok(addon)
}

async fn lookup_by_name(registry: &dyn Registry, name: &str) -> Result<Addon, ModError> {
    debug!("[{}] searching for mod by name", name);

    let query = SearchQuery::new(name, GAME_MINECRAFT);
    let results = registry
        .search(&query)
        .await
        .inspect_err(|e| error!("[{}] failed to search: {}", name, e))?;

    if let Some(addon) = api::find_by_slug(&results, name) {
        debug!("[{}] matched mod by slug", name);
        return Ok(addon.clone());
    }
    if let Some(addon) = api::find_by_name(&results, name) {
        debug!("[{}] matched mod by name", name);
        return Ok(addon.clone());
    }

    Err(ModError::NoSuchAddon(AddonRef::Name(name.to_string())))
}
