use std::path::{Path, PathBuf};

use crate::error::LicenseError;

/// Case-sensitive substrings that mark a file as a license file.
pub const LICENSE_MARKERS: &[&str] = &["COPYING", "LICENSE"];

/// Pick the license file inside a module directory.
///
/// Entries are visited in file-name order and the last one whose name
/// contains a [`LICENSE_MARKERS`] substring is chosen, so `LICENSE.txt`
/// beats `LICENSE` and `LICENSE` beats `COPYING`. Subdirectories are skipped.
pub fn locate_license_file(dir: &Path) -> Result<PathBuf, LicenseError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LicenseError::CacheMiss {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LicenseError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        if !is_license_name(&name.to_string_lossy()) {
            continue;
        }
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            tracing::debug!(dir = %dir.display(), entry = ?name, "skipping license-named directory");
            continue;
        }
        candidates.push(name);
    }

    candidates.sort();
    candidates
        .pop()
        .map(|name| dir.join(name))
        .ok_or_else(|| LicenseError::NoLicenseFile {
            path: dir.to_path_buf(),
        })
}

fn is_license_name(name: &str) -> bool {
    LICENSE_MARKERS.iter().any(|marker| name.contains(marker))
}
