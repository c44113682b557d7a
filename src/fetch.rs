//! Downloads the monthly AirDNA export into a local directory.
//!
//! Objects under the export prefix are saved by file name. Gzip files are
//! decompressed in place and the compressed copy removed.

use anyhow::{Context, Result, anyhow, bail};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::services::ObjectStore;

/// Files of one export month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFiles {
    /// Per-property monthly performance, the analysis input.
    pub monthly: PathBuf,
    /// Property attributes.
    pub property: PathBuf,
}

/// Downloads every object under `prefix` into `dest_dir`.
///
/// Returns the local paths written. Individual file failures are logged and
/// skipped; only a failed listing or an unusable destination is an error.
#[tracing::instrument(skip(store, dest_dir), fields(dest = %dest_dir.display()))]
pub async fn fetch_export<S>(store: &S, prefix: &str, dest_dir: &Path) -> Result<Vec<PathBuf>>
where
    S: ObjectStore + ?Sized,
{
    let keys: Vec<String> = store
        .list_keys(prefix)
        .await?
        .into_iter()
        .filter(|k| k != prefix)
        .collect();

    if keys.is_empty() {
        warn!("No objects found under the export prefix");
        return Ok(Vec::new());
    }

    fs::create_dir_all(dest_dir)
        .with_context(|| format!("failed to create {}", dest_dir.display()))?;
    info!(objects = keys.len(), "Export directory ready");

    let mut saved = Vec::with_capacity(keys.len());
    for key in &keys {
        match fetch_object(store, key, dest_dir).await {
            Ok(path) => saved.push(path),
            Err(e) => error!(key = %key, error = %e, "Failed to fetch export file"),
        }
    }

    info!(saved = saved.len(), "Export download complete");
    Ok(saved)
}

async fn fetch_object<S>(store: &S, key: &str, dest_dir: &Path) -> Result<PathBuf>
where
    S: ObjectStore + ?Sized,
{
    let file_name = key
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("object key '{key}' has no file name"))?;
    let local_path = dest_dir.join(file_name);

    info!(key, path = %local_path.display(), "Downloading file");
    let body = store.get_object(key).await?;
    fs::write(&local_path, &body)
        .with_context(|| format!("failed to write {}", local_path.display()))?;

    let Some(stem) = file_name.strip_suffix(".gz") else {
        return Ok(local_path);
    };

    let uncompressed = dest_dir.join(stem);
    let bytes = gunzip_file(&local_path, &uncompressed)?;
    info!(path = %uncompressed.display(), bytes, "File decompressed");
    fs::remove_file(&local_path)
        .with_context(|| format!("failed to remove {}", local_path.display()))?;

    Ok(uncompressed)
}

/// Decompresses a gzip file. Returns the number of bytes written.
///
/// On failure `dest` is removed so no partial file is left behind.
pub fn gunzip_file(src: &Path, dest: &Path) -> Result<u64> {
    let input = File::open(src).with_context(|| format!("failed to open {}", src.display()))?;
    let mut decoder = GzDecoder::new(BufReader::new(input));

    let output =
        File::create(dest).with_context(|| format!("failed to create {}", dest.display()))?;
    let mut writer = BufWriter::new(output);

    let result = io::copy(&mut decoder, &mut writer)
        .and_then(|bytes| writer.flush().map(|()| bytes))
        .with_context(|| format!("failed to decompress {}", src.display()));
    if result.is_err() {
        drop(writer);
        if let Err(e) = fs::remove_file(dest) {
            warn!(path = %dest.display(), error = %e, "Failed to remove partial file");
        }
    }
    result
}

/// Finds the single `monthly` and single `property` export file in `dir`.
pub fn locate_export_files(dir: &Path) -> Result<ExportFiles> {
    let mut monthly: Option<PathBuf> = None;
    let mut property: Option<PathBuf> = None;

    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let slot = if name.contains("monthly") {
            (&mut monthly, "monthly")
        } else if name.contains("property") {
            (&mut property, "property")
        } else {
            continue;
        };

        if slot.0.is_some() {
            bail!("more than one '{}' file found in {}", slot.1, dir.display());
        }
        *slot.0 = Some(entry.path());
    }

    match (monthly, property) {
        (Some(monthly), Some(property)) => Ok(ExportFiles { monthly, property }),
        (None, _) => bail!("no 'monthly' file found in {}", dir.display()),
        (_, None) => bail!("no 'property' file found in {}", dir.display()),
    }
}
