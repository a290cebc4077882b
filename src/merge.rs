//! Merge engine: folds parsed sources into one mapping per kind.
//!
//! Names must be unique across every source of a kind. The fold stops at the
//! first error, so later sources are never read after a failure and no
//! partial mapping escapes.

use crate::error::{ConfigurationError, Result};
use crate::parser::ParsedSource;
use crate::types::{Definition, Definitions};
use tracing::{error, info, warn};

/// Merge sources in order into a single [`Definitions`].
///
/// `sources` is consumed lazily; an `Err` item ends the fold with that error.
/// Fails with `DuplicateDefinition` when a name repeats and with
/// `EmptyResult` when no source contributed anything.
pub fn merge_sources<T, I>(sources: I) -> Result<Definitions<T>>
where
    T: Definition,
    I: IntoIterator<Item = Result<ParsedSource<T>>>,
{
    let kind = T::KIND;
    let mut files = 0usize;

    let merged = sources
        .into_iter()
        .try_fold(Definitions::new(), |acc, source| {
            files += 1;
            merge_one(acc, source?)
        })?;

    if merged.is_empty() {
        error!(
            kind = %kind,
            files_processed = files,
            "FATAL CONFIGURATION ERROR: no {} configurations found in any file", kind
        );
        return Err(ConfigurationError::EmptyResult { kind, files });
    }

    info!(
        kind = %kind,
        total = merged.len(),
        files,
        "Successfully loaded {} configurations", kind
    );
    Ok(merged)
}

fn merge_one<T: Definition>(
    mut acc: Definitions<T>,
    source: ParsedSource<T>,
) -> Result<Definitions<T>> {
    let kind = T::KIND;

    if source.is_empty() {
        warn!(kind = %kind, file = %source.origin, "Skipping file without definitions");
        return Ok(acc);
    }

    // Check the whole source first so a conflict leaves nothing half-merged.
    for (name, _) in &source.definitions {
        if let Some(existing) = acc.entry(name) {
            error!(
                kind = %kind,
                name = %name,
                first_defined_in = %existing.origin,
                duplicate_found_in = %source.origin,
                "FATAL CONFIGURATION ERROR: duplicate {} configuration", kind
            );
            return Err(ConfigurationError::DuplicateDefinition {
                kind,
                name: name.clone(),
                first: existing.origin.clone(),
                duplicate: source.origin.clone(),
            });
        }
    }

    let count = source.definitions.len();
    for (name, definition) in source.definitions {
        info!(kind = %kind, name = %name, "  - {}", definition.summary());
        if let Err(existing) = acc.try_insert(name.clone(), source.origin.clone(), definition) {
            // Same name twice inside one source
            return Err(ConfigurationError::DuplicateDefinition {
                kind,
                name,
                first: existing.origin.clone(),
                duplicate: source.origin,
            });
        }
    }
    info!(kind = %kind, count, file = %source.origin, "Loaded {} configurations", kind);

    Ok(acc)
}
