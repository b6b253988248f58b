use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::KnownFileError;

/// A required module pinned to a version, as declared in `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency {
    pub module: String,
    pub version: String,
}

impl Dependency {
    pub fn new(module: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.module, self.version)
    }
}

impl FromStr for Dependency {
    type Err = KnownFileError;

    /// Parse the canonical `"<module> <version>"` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(' ').collect();
        match parts.as_slice() {
            [module, version] if !module.is_empty() && !version.is_empty() => {
                Ok(Dependency::new(*module, *version))
            }
            _ => Err(KnownFileError::MalformedKey(s.to_string())),
        }
    }
}

/// A license identifier, or the `unknown` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct License(String);

impl License {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved licenses keyed by dependency.
///
/// Serializes as a flat `{"<module> <version>": "<license>"}` object with keys
/// in sorted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicenseSet {
    licenses: BTreeMap<Dependency, License>,
}

impl LicenseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dep: Dependency, license: License) {
        self.licenses.insert(dep, license);
    }

    pub fn get(&self, dep: &Dependency) -> Option<&License> {
        self.licenses.get(dep)
    }

    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Dependency, &License)> {
        self.licenses.iter()
    }

    pub fn unknown_count(&self) -> usize {
        self.licenses.values().filter(|l| l.is_unknown()).count()
    }

    /// Fill `unknown` entries from a previously known document.
    ///
    /// Only entries currently `unknown` are touched, and only when `known`
    /// has a non-`unknown` license for the same dependency. Returns the number
    /// of entries replaced.
    pub fn merge_known(&mut self, known: &LicenseSet) -> usize {
        let mut replaced = 0;
        for (dep, license) in self.licenses.iter_mut() {
            if !license.is_unknown() {
                continue;
            }
            if let Some(prev) = known.get(dep).filter(|l| !l.is_unknown()) {
                *license = prev.clone();
                replaced += 1;
            }
        }
        replaced
    }

    /// Parse a document previously produced by this tool.
    pub fn from_json(content: &str) -> Result<Self, KnownFileError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(content)?;
        let mut set = LicenseSet::new();
        for (key, value) in raw {
            set.insert(key.parse()?, License::new(value));
        }
        Ok(set)
    }
}

impl FromIterator<(Dependency, License)> for LicenseSet {
    fn from_iter<I: IntoIterator<Item = (Dependency, License)>>(iter: I) -> Self {
        Self {
            licenses: iter.into_iter().collect(),
        }
    }
}

impl Serialize for LicenseSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.licenses.iter().map(|(k, v)| (k.to_string(), v)))
    }
}

/// Broad risk family of a detected license, shown in the terminal report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseRisk {
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
    Unknown,
}

impl std::fmt::Display for LicenseRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseRisk::Permissive => write!(f, "Permissive"),
            LicenseRisk::WeakCopyleft => write!(f, "Weak Copyleft"),
            LicenseRisk::StrongCopyleft => write!(f, "Strong Copyleft"),
            LicenseRisk::Unknown => write!(f, "Unknown"),
        }
    }
}
