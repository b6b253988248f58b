use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a `go.mod` manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while resolving the license of a single dependency.
#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("module not found in cache at {}: {source}", path.display())]
    CacheMiss {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no license file found in {}", path.display())]
    NoLicenseFile { path: PathBuf },

    #[error("no confident license found in {} (best coverage {coverage:.1}%)", path.display())]
    NoConfidentLicense { path: PathBuf, coverage: f64 },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A fatal error that aborts a whole resolution run.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to extract license for {module} {version}: {source}")]
    Dependency {
        module: String,
        version: String,
        #[source]
        source: LicenseError,
    },

    #[error("resolution worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Errors raised while building a license corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("invalid corpus pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to read corpus text {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading a previously produced license document.
#[derive(Debug, Error)]
pub enum KnownFileError {
    #[error("malformed key '{0}': expected '<module> <version>'")]
    MalformedKey(String),

    #[error("invalid known-license document: {0}")]
    Json(#[from] serde_json::Error),
}
