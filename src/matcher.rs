use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::LicenseError;
use crate::models::License;

/// Files are read up to this many bytes; anything longer is not a plain
/// license file.
pub const MAX_LICENSE_BYTES: u64 = 100_000;

/// Minimum coverage, in percent, for a match to be trusted.
pub const CONFIDENCE_THRESHOLD: f64 = 90.0;

/// One candidate produced by a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// License identifier, e.g. `MIT`.
    pub id: String,
    /// Share of the scanned text explained by this license, in `[0, 100]`.
    pub coverage: f64,
}

/// Recognizes known license texts inside arbitrary text.
pub trait LicenseScanner: Send + Sync {
    /// Candidates ranked best first. Empty when nothing resembles a known
    /// license.
    fn scan(&self, text: &str) -> Vec<Candidate>;
}

/// The accepted best match for a license file.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub license: License,
    pub coverage: f64,
}

pub struct LicenseMatcher {
    scanner: Box<dyn LicenseScanner>,
}

impl LicenseMatcher {
    pub fn new(scanner: impl LicenseScanner + 'static) -> Self {
        Self {
            scanner: Box::new(scanner),
        }
    }

    /// Scan the first [`MAX_LICENSE_BYTES`] of `path` and return the top
    /// candidate if its coverage reaches [`CONFIDENCE_THRESHOLD`].
    pub fn match_file(&self, path: &Path) -> Result<MatchResult, LicenseError> {
        let io_err = |source: std::io::Error| LicenseError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut content = Vec::new();
        File::open(path)
            .map_err(io_err)?
            .take(MAX_LICENSE_BYTES)
            .read_to_end(&mut content)
            .map_err(io_err)?;

        let text = String::from_utf8_lossy(&content);
        let best = self.scanner.scan(&text).into_iter().next();
        let coverage = best.as_ref().map_or(0.0, |c| c.coverage);

        match best {
            Some(candidate) if candidate.coverage >= CONFIDENCE_THRESHOLD => Ok(MatchResult {
                license: License::new(candidate.id),
                coverage,
            }),
            _ => Err(LicenseError::NoConfidentLicense {
                path: path.to_path_buf(),
                coverage,
            }),
        }
    }
}
