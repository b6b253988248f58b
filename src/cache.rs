//! Module-cache path derivation.
//!
//! Module paths are case-sensitive but many filesystems are not, so the Go
//! module cache stores each path segment with every uppercase letter replaced
//! by `!` followed by its lowercase form (`BurntSushi` → `!burnt!sushi`).

use std::path::{Path, PathBuf};

use crate::models::Dependency;

const ESCAPE_MARKER: char = '!';

/// Encode one module-path segment for use as a cache directory name.
pub fn escape_segment(segment: &str) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c.is_uppercase() {
            escaped.push(ESCAPE_MARKER);
        }
        escaped.extend(c.to_lowercase());
    }
    escaped
}

/// Decode a segment produced by [`escape_segment`].
///
/// Returns `None` for input that no segment escapes to: a marker not followed
/// by a lowercase letter, or a bare uppercase letter.
#[cfg_attr(not(test), allow(dead_code))]
pub fn unescape_segment(escaped: &str) -> Option<String> {
    let mut segment = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE_MARKER {
            let next = chars.next().filter(|n| n.is_lowercase())?;
            segment.extend(next.to_uppercase());
        } else if c.is_uppercase() {
            return None;
        } else {
            segment.push(c);
        }
    }
    Some(segment)
}

/// Location of the module cache, e.g. `$GOPATH/pkg/mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModCache {
    root: PathBuf,
}

impl ModCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory expected to hold the extracted source of `dep`. Existence is
    /// not checked.
    pub fn module_dir(&self, dep: &Dependency) -> PathBuf {
        let mut path = self.root.clone();
        for segment in dep.module.split('/') {
            path.push(escape_segment(segment));
        }
        let mut leaf = path.into_os_string();
        leaf.push("@");
        leaf.push(&dep.version);
        PathBuf::from(leaf)
    }
}

/// Inputs that can name the cache root, in decreasing precedence after an
/// explicit override.
#[derive(Debug, Clone, Default)]
pub struct CacheEnv {
    pub gomodcache: Option<PathBuf>,
    pub gopath: Option<std::ffi::OsString>,
    pub home: Option<PathBuf>,
}

impl CacheEnv {
    /// Snapshot the relevant process environment.
    pub fn from_process() -> Self {
        Self {
            gomodcache: std::env::var_os("GOMODCACHE").map(PathBuf::from),
            gopath: std::env::var_os("GOPATH"),
            home: dirs::home_dir(),
        }
    }
}

/// Pick the cache root: explicit override, then `GOMODCACHE`, then the first
/// `GOPATH` entry joined with `pkg/mod`, then `~/go/pkg/mod`.
pub fn resolve_cache_root(explicit: Option<&Path>, env: &CacheEnv) -> Option<PathBuf> {
    if let Some(root) = explicit {
        return Some(root.to_path_buf());
    }
    if let Some(root) = env.gomodcache.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        return Some(root.clone());
    }
    let gopath = env
        .gopath
        .as_ref()
        .and_then(|raw| std::env::split_paths(raw).find(|p| !p.as_os_str().is_empty()))
        .or_else(|| env.home.as_ref().map(|home| home.join("go")))?;
    Some(gopath.join("pkg").join("mod"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_segment() {
        assert_eq!(escape_segment("BurntSushi"), "!burnt!sushi");
        assert_eq!(escape_segment("github.com"), "github.com");
        assert_eq!(escape_segment("v3.3"), "v3.3");
        assert_eq!(escape_segment("ABC"), "!a!b!c");
    }

    #[test]
    fn test_escape_distinguishes_case() {
        assert_ne!(escape_segment("Azure"), escape_segment("azure"));
        assert_ne!(escape_segment("xGB"), escape_segment("XGb"));
    }

    #[test]
    fn test_unescape_inverts_escape() {
        for segment in ["BurntSushi", "xgbutil", "Go-GL", "already.lower", "X", "a_B-9.C"] {
            assert_eq!(unescape_segment(&escape_segment(segment)).as_deref(), Some(segment));
        }
    }

    #[test]
    fn test_unescape_rejects_invalid() {
        assert_eq!(unescape_segment("trailing!"), None);
        assert_eq!(unescape_segment("!!a"), None);
        assert_eq!(unescape_segment("Upper"), None);
        assert_eq!(unescape_segment("!1"), None);
    }

    #[test]
    fn test_module_dir() {
        let cache = ModCache::new("/home/u/go/pkg/mod");
        let dep = Dependency::new("github.com/BurntSushi/xgb", "v0.0.0-20210121224620-deaf085860bc");
        assert_eq!(
            cache.module_dir(&dep),
            PathBuf::from("/home/u/go/pkg/mod/github.com/!burnt!sushi/xgb@v0.0.0-20210121224620-deaf085860bc")
        );
    }

    #[test]
    fn test_module_dir_nested_major_version() {
        let cache = ModCache::new("/cache");
        let dep = Dependency::new("github.com/go-gl/glfw/v3.3/glfw", "v0.0.0-1");
        assert_eq!(
            cache.module_dir(&dep),
            PathBuf::from("/cache/github.com/go-gl/glfw/v3.3/glfw@v0.0.0-1")
        );
    }

    #[test]
    fn test_resolve_cache_root_precedence() {
        let env = CacheEnv {
            gomodcache: Some(PathBuf::from("/modcache")),
            gopath: Some("/gopath".into()),
            home: Some(PathBuf::from("/home/u")),
        };
        assert_eq!(
            resolve_cache_root(Some(Path::new("/explicit")), &env),
            Some(PathBuf::from("/explicit"))
        );
        assert_eq!(resolve_cache_root(None, &env), Some(PathBuf::from("/modcache")));

        let env = CacheEnv {
            gomodcache: None,
            ..env
        };
        assert_eq!(resolve_cache_root(None, &env), Some(PathBuf::from("/gopath/pkg/mod")));

        let env = CacheEnv {
            gopath: None,
            ..env
        };
        assert_eq!(resolve_cache_root(None, &env), Some(PathBuf::from("/home/u/go/pkg/mod")));

        assert_eq!(resolve_cache_root(None, &CacheEnv::default()), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_cache_root_uses_first_gopath_entry() {
        let env = CacheEnv {
            gopath: Some("/first:/second".into()),
            ..CacheEnv::default()
        };
        assert_eq!(resolve_cache_root(None, &env), Some(PathBuf::from("/first/pkg/mod")));
    }
}
