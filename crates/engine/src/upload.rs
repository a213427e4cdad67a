// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unpacking uploaded archives into workspaces

use crate::error::ExecutorError;
use bx_core::ArchiveFormat;
use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

/// Unpack `data` into `dest`, creating it first.
///
/// Existing files are overwritten; files absent from the archive are left
/// alone. Entries whose path would land outside `dest` fail the whole upload.
pub fn extract(format: ArchiveFormat, data: &[u8], dest: &Path) -> Result<usize, ExecutorError> {
    // Checked before touching the filesystem
    if format == ArchiveFormat::Gzip {
        return Err(ExecutorError::Execution(format!(
            "Error extracting GZIP data to {}: GZIP archives are not implemented",
            dest.display()
        )));
    }

    fs::create_dir_all(dest).map_err(|e| ExecutorError::fs(dest, e))?;
    extract_zip(data, dest)
}

fn extract_zip(data: &[u8], dest: &Path) -> Result<usize, ExecutorError> {
    let zip_err = |e: zip::result::ZipError| {
        ExecutorError::Execution(format!(
            "Error extracting ZIP data to {}: {}",
            dest.display(),
            e
        ))
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(zip_err)?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_err)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(ExecutorError::Validation(format!(
                "archive entry escapes the workspace: {}",
                entry.name()
            )));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| ExecutorError::fs(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ExecutorError::fs(parent, e))?;
        }
        let mut out_file =
            fs::File::create(&out_path).map_err(|e| ExecutorError::fs(&out_path, e))?;
        io::copy(&mut entry, &mut out_file).map_err(|e| ExecutorError::fs(&out_path, e))?;

        // Scripts keep their executable bits
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o777))
                .map_err(|e| ExecutorError::fs(&out_path, e))?;
        }
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
