//! Per-dependency resolution: cache directory → license file → license id.
//!
//! An inconclusive match is recorded as `unknown`; every other failure aborts
//! the whole run with the module named in the error.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::cache::ModCache;
use crate::error::{LicenseError, ResolveError};
use crate::locator::locate_license_file;
use crate::matcher::LicenseMatcher;
use crate::models::{Dependency, License, LicenseSet};

pub struct Resolver {
    cache: ModCache,
    matcher: LicenseMatcher,
}

impl Resolver {
    pub fn new(cache: ModCache, matcher: LicenseMatcher) -> Self {
        Self { cache, matcher }
    }

    /// Resolve one dependency. A match below the confidence threshold yields
    /// [`License::unknown`]; other failures are returned.
    pub fn resolve_dependency(&self, dep: &Dependency) -> Result<License, LicenseError> {
        let dir = self.cache.module_dir(dep);
        tracing::debug!(dependency = %dep, dir = %dir.display(), "resolving");

        let file = locate_license_file(&dir)?;
        match self.matcher.match_file(&file) {
            Ok(result) => {
                tracing::debug!(
                    dependency = %dep,
                    file = %file.display(),
                    license = %result.license,
                    coverage = result.coverage,
                    "matched"
                );
                Ok(result.license)
            }
            Err(LicenseError::NoConfidentLicense { coverage, .. }) => {
                tracing::warn!(
                    dependency = %dep,
                    file = %file.display(),
                    coverage,
                    "no confident license match; recording unknown"
                );
                Ok(License::unknown())
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve every dependency in order, stopping at the first fatal error.
    pub fn resolve<'a, I>(&self, deps: I) -> Result<LicenseSet, ResolveError>
    where
        I: IntoIterator<Item = &'a Dependency>,
    {
        let mut licenses = LicenseSet::new();
        for dep in deps {
            let license = self
                .resolve_dependency(dep)
                .map_err(|source| wrap(dep, source))?;
            licenses.insert(dep.clone(), license);
        }
        Ok(licenses)
    }

    /// Resolve dependencies on up to `jobs` blocking workers.
    ///
    /// The first fatal error is returned as soon as it is observed; results
    /// still in flight are discarded. `on_done` is called once per
    /// successfully resolved dependency.
    pub async fn resolve_concurrent<F>(
        self: Arc<Self>,
        deps: Vec<Dependency>,
        jobs: usize,
        on_done: F,
    ) -> Result<LicenseSet, ResolveError>
    where
        F: Fn(&Dependency, &License),
    {
        let mut pending = stream::iter(deps)
            .map(|dep| {
                let resolver = Arc::clone(&self);
                tokio::task::spawn_blocking(move || {
                    let result = resolver.resolve_dependency(&dep);
                    (dep, result)
                })
            })
            .buffer_unordered(jobs.max(1));

        let mut licenses = LicenseSet::new();
        while let Some(joined) = pending.next().await {
            let (dep, result) = joined?;
            let license = result.map_err(|source| wrap(&dep, source))?;
            on_done(&dep, &license);
            licenses.insert(dep, license);
        }
        Ok(licenses)
    }
}

fn wrap(dep: &Dependency, source: LicenseError) -> ResolveError {
    ResolveError::Dependency {
        module: dep.module.clone(),
        version: dep.version.clone(),
        source,
    }
}
