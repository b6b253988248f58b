//! `gomod-license` — resolve the license of every dependency in a `go.mod`
//! from the local module cache.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and install logging ([`logging`]).
//! 2. Load config ([`config::load_config`]) and pick the cache root ([`cache`]).
//! 3. Parse the manifest into dependencies ([`manifest`]).
//! 4. Resolve each dependency: cache directory ([`cache`]) → license file
//!    ([`locator`]) → license text match ([`matcher`], [`corpus`]).
//! 5. Optionally fill `unknown` entries from a known-license file (`--known`).
//! 6. Render JSON or a terminal table ([`report`]).
//!
//! Any error exits with code `1`.

mod cache;
mod cli;
mod config;
mod corpus;
mod error;
mod locator;
mod logging;
mod manifest;
mod matcher;
mod models;
mod report;
mod resolver;
mod risk;

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use cache::{resolve_cache_root, CacheEnv, ModCache};
use cli::{Cli, ReportFormat};
use config::load_config;
use corpus::Corpus;
use matcher::LicenseMatcher;
use models::LicenseSet;
use resolver::Resolver;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let config = load_config(&cli.directory, cli.config.as_deref())?;

    let explicit_root = cli.cache_root.as_deref().or(config.cache.root.as_deref());
    let cache_root = resolve_cache_root(explicit_root, &CacheEnv::from_process())
        .ok_or_else(|| anyhow!("cannot locate the module cache: set GOMODCACHE or GOPATH, or pass --cache-root"))?;
    tracing::debug!(root = %cache_root.display(), "module cache");

    let corpus = match &config.scan.corpus_dir {
        Some(dir) => Corpus::with_dir(dir)?,
        None => Corpus::builtin()?,
    };
    tracing::debug!(licenses = ?corpus.ids().collect::<Vec<_>>(), "license corpus");

    let manifest_path = cli.directory.join(&cli.modfile);
    let deps = manifest::parse_manifest_path(&manifest_path)
        .with_context(|| format!("failed to load {}", manifest_path.display()))?;

    if !cli.quiet {
        eprintln!(
            "  {} {} dependencies in {}",
            "→".cyan(),
            deps.len(),
            manifest_path.display()
        );
    }

    let resolver = Arc::new(Resolver::new(
        ModCache::new(cache_root),
        LicenseMatcher::new(corpus),
    ));
    let jobs = cli.jobs.unwrap_or(config.scan.jobs);

    let result = if jobs <= 1 {
        resolver.resolve(&deps)
    } else {
        let pb = progress_bar(deps.len() as u64, cli.quiet)?;
        let result = resolver
            .resolve_concurrent(deps.into_iter().collect(), jobs, |dep, _| {
                if let Some(pb) = &pb {
                    pb.set_message(dep.module.clone());
                    pb.inc(1);
                }
            })
            .await;
        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }
        result
    };
    let mut licenses = result?;

    if let Some(known_path) = &cli.known {
        let known = load_known(known_path)?;
        let replaced = licenses.merge_known(&known);
        tracing::debug!(replaced, path = %known_path.display(), "merged known licenses");
    }

    match cli.report {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&licenses)?),
        ReportFormat::Terminal => report::terminal::render(&licenses, &manifest_path, cli.quiet),
    }

    Ok(())
}

fn load_known(path: &Path) -> Result<LicenseSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read known licenses {}", path.display()))?;
    LicenseSet::from_json(&content)
        .with_context(|| format!("failed to parse known licenses {}", path.display()))
}

fn progress_bar(len: u64, quiet: bool) -> Result<Option<ProgressBar>> {
    if quiet || !std::io::stderr().is_terminal() {
        return Ok(None);
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}
