use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::Path;
use std::time::Instant;

use super::types::{ListInput, Resource, ResourceKind};
use crate::pool::ScanResult;

/// Work function: list every resource of `input.kind` below `origin`.
///
/// Always returns exactly one result. Unreadable roots, walk errors and an
/// exceeded deadline are reported as error results for `origin`.
pub fn list_resources(origin: &str, input: ListInput) -> ScanResult<Resource> {
    let started = Instant::now();
    let kind = input.kind;
    let outcome = walk_origin(Path::new(origin), &input, started);

    match &outcome {
        Ok(resources) => tracing::debug!(
            origin,
            resource = %kind,
            count = resources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "listing complete"
        ),
        Err(e) => tracing::debug!(origin, resource = %kind, "listing failed: {:#}", e),
    }

    ScanResult::from_outcome(origin, outcome)
}

fn walk_origin(root: &Path, input: &ListInput, started: Instant) -> Result<Vec<Resource>> {
    let metadata = std::fs::metadata(root)
        .with_context(|| format!("Failed to read origin {}", root.display()))?;
    if !metadata.is_dir() {
        anyhow::bail!("Origin {} is not a directory", root.display());
    }

    let walker = WalkBuilder::new(root)
        .max_depth(input.max_depth)
        .hidden(!input.hidden)
        .follow_links(false)
        .build();

    let mut resources = Vec::new();
    for entry in walker {
        if started.elapsed() >= input.timeout {
            anyhow::bail!(
                "Timed out after {}s listing {} ({} found so far)",
                input.timeout.as_secs(),
                input.kind,
                resources.len()
            );
        }

        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.depth() == 0 {
            continue;
        }
        let Some(file_type) = entry.file_type() else {
            continue;
        };

        let path = entry.path();
        if let Some(include) = &input.include {
            let relative = path.strip_prefix(root).unwrap_or(path);
            if !include.is_match(relative) {
                continue;
            }
        }

        let resource = match input.kind {
            ResourceKind::Files if file_type.is_file() => {
                let size = entry
                    .metadata()
                    .with_context(|| format!("Failed to stat {}", path.display()))?
                    .len();
                Resource::File {
                    path: path.to_path_buf(),
                    size,
                }
            }
            ResourceKind::Directories if file_type.is_dir() => Resource::Directory {
                path: path.to_path_buf(),
            },
            ResourceKind::Symlinks if file_type.is_symlink() => Resource::Symlink {
                path: path.to_path_buf(),
                target: std::fs::read_link(path).ok(),
            },
            _ => continue,
        };
        resources.push(resource);
    }

    Ok(resources)
}
