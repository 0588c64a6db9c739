//! Package deployment into the live binary directory.
//!
//! The package is a zstd-compressed tar archive produced by the build
//! pipeline's packaging step. Deployment clears the binary directory,
//! extracts every entry behind a path-traversal guard, then deletes the
//! consumed package.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Component, Path};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::cancel::CancelToken;
use crate::error::UpdateError;

/// Replace `bin_dir`'s contents with the package's contents.
///
/// The directory is cleared before extraction, so a failure part-way through
/// leaves it partially populated; callers must treat any error as "no usable
/// deploy", not "back to the previous version". The package file is removed
/// only after every entry has been extracted.
pub fn deploy_package(
    package: &Path,
    bin_dir: &Path,
    cancel: &CancelToken,
) -> Result<(), UpdateError> {
    if bin_dir.exists() {
        fs::remove_dir_all(bin_dir).map_err(|e| {
            extraction(format!(
                "removing previous binary directory '{}': {}",
                bin_dir.display(),
                e
            ))
        })?;
    }
    fs::create_dir_all(bin_dir).map_err(|e| {
        extraction(format!(
            "creating binary directory '{}': {}",
            bin_dir.display(),
            e
        ))
    })?;

    let file = File::open(package).map_err(|e| {
        extraction(format!(
            "opening server package '{}': {}",
            package.display(),
            e
        ))
    })?;
    let decoder = zstd::stream::Decoder::new(file).map_err(|e| {
        extraction(format!(
            "reading server package '{}': {}",
            package.display(),
            e
        ))
    })?;
    let mut archive = tar::Archive::new(decoder);

    let mut entries = 0usize;
    let mut bytes = 0u64;
    for entry in archive
        .entries()
        .map_err(|e| extraction(format!("listing package entries: {e}")))?
    {
        if cancel.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        let mut entry = entry.map_err(|e| extraction(format!("reading package entry: {e}")))?;
        let entry_path = entry
            .path()
            .map_err(|e| extraction(format!("decoding package entry path: {e}")))?
            .into_owned();
        reject_escaping_path(&entry_path)?;

        bytes += entry.size();
        let unpacked = entry.unpack_in(bin_dir).map_err(|e| {
            extraction(format!("unpacking '{}': {}", entry_path.display(), e))
        })?;
        if !unpacked {
            // `unpack_in` refused the entry; surface it, never skip silently.
            return Err(UpdateError::PathTraversal {
                entry: entry_path.display().to_string(),
            });
        }
        entries += 1;
    }

    fs::remove_file(package).map_err(|e| {
        extraction(format!(
            "removing consumed package '{}': {}",
            package.display(),
            e
        ))
    })?;

    info!(entries, bytes, dir = %bin_dir.display(), "server package deployed");
    Ok(())
}

/// Hex sha256 of the produced package, recorded before deployment.
pub fn package_digest(path: &Path) -> Result<String, UpdateError> {
    let file = File::open(path)
        .map_err(|e| extraction(format!("opening '{}' for digest: {}", path.display(), e)))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| extraction(format!("hashing '{}': {}", path.display(), e)))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Entries must stay inside the deploy directory once joined: no absolute
/// paths, no drive prefixes, no `..` components.
fn reject_escaping_path(path: &Path) -> Result<(), UpdateError> {
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(UpdateError::PathTraversal {
            entry: path.display().to_string(),
        });
    }
    Ok(())
}

fn extraction(reason: String) -> UpdateError {
    UpdateError::Extraction { reason }
}
