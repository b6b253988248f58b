//! Reference license texts and the word-alignment scanner built on them.
//!
//! A scanned text is reduced to lowercase alphanumeric words with copyright
//! notice lines removed. Each reference is aligned against it by longest
//! common word subsequence; coverage is the share of scanned words that
//! align with the reference.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use crate::error::CorpusError;
use crate::matcher::{Candidate, LicenseScanner};

/// Texts shipped with the binary, keyed by SPDX identifier.
const BUILTIN_TEXTS: &[(&str, &str)] = &[
    ("0BSD", include_str!("texts/0BSD.txt")),
    ("AGPL-3.0", include_str!("texts/AGPL-3.0.txt")),
    ("Apache-2.0", include_str!("texts/Apache-2.0.txt")),
    ("BSD-2-Clause", include_str!("texts/BSD-2-Clause.txt")),
    ("BSD-3-Clause", include_str!("texts/BSD-3-Clause.txt")),
    ("BSL-1.0", include_str!("texts/BSL-1.0.txt")),
    ("CC0-1.0", include_str!("texts/CC0-1.0.txt")),
    ("EPL-2.0", include_str!("texts/EPL-2.0.txt")),
    ("GPL-2.0", include_str!("texts/GPL-2.0.txt")),
    ("GPL-3.0", include_str!("texts/GPL-3.0.txt")),
    ("ISC", include_str!("texts/ISC.txt")),
    ("LGPL-2.1", include_str!("texts/LGPL-2.1.txt")),
    ("LGPL-3.0", include_str!("texts/LGPL-3.0.txt")),
    ("MIT", include_str!("texts/MIT.txt")),
    ("MIT-0", include_str!("texts/MIT-0.txt")),
    ("MPL-2.0", include_str!("texts/MPL-2.0.txt")),
    ("Unlicense", include_str!("texts/Unlicense.txt")),
    ("WTFPL", include_str!("texts/WTFPL.txt")),
    ("Zlib", include_str!("texts/Zlib.txt")),
];

/// A reference must have at least this share of its own words aligned to be
/// reported at all.
const MIN_REFERENCE_FRACTION: f64 = 0.5;

/// Interned id for words that appear in no reference text.
const FOREIGN_WORD: u32 = u32::MAX;

struct Reference {
    id: String,
    words: Vec<u32>,
    counts: HashMap<u32, u32>,
}

pub struct Corpus {
    references: Vec<Reference>,
    vocabulary: HashMap<String, u32>,
    word_re: Regex,
    copyright_re: Regex,
}

impl Corpus {
    /// Corpus of the texts compiled into the binary.
    pub fn builtin() -> Result<Self, CorpusError> {
        let mut corpus = Corpus {
            references: Vec::new(),
            vocabulary: HashMap::new(),
            word_re: Regex::new(r"[a-z0-9]+")?,
            copyright_re: Regex::new(
                r"(?im)^[ \t]*(?:copyright[ \t]*(?:\(c\)|©|[0-9])|\(c\)[ \t]*[0-9]|©).*$",
            )?,
        };
        for (id, text) in BUILTIN_TEXTS {
            corpus.add(id, text);
        }
        Ok(corpus)
    }

    /// Built-in corpus extended with every `<id>.txt` file in `dir`. A file
    /// whose id matches a built-in text replaces it.
    pub fn with_dir(dir: &Path) -> Result<Self, CorpusError> {
        let mut corpus = Self::builtin()?;
        let io_err = |source: std::io::Error| CorpusError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let Some(id) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path).map_err(|source| CorpusError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(id = %id, path = %path.display(), "loaded corpus text");
            corpus.add(&id, &text);
        }
        Ok(corpus)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|r| r.id.as_str())
    }

    fn add(&mut self, id: &str, text: &str) {
        let words: Vec<u32> = self
            .normalize(text)
            .into_iter()
            .map(|word| {
                let next = self.vocabulary.len() as u32;
                *self.vocabulary.entry(word).or_insert(next)
            })
            .collect();
        let counts = word_counts(&words);
        self.references.retain(|r| r.id != id);
        self.references.push(Reference {
            id: id.to_string(),
            words,
            counts,
        });
    }

    fn normalize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let stripped = self.copyright_re.replace_all(&lower, "");
        self.word_re
            .find_iter(&stripped)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn intern(&self, text: &str) -> Vec<u32> {
        self.normalize(text)
            .iter()
            .map(|word| self.vocabulary.get(word).copied().unwrap_or(FOREIGN_WORD))
            .collect()
    }
}

impl LicenseScanner for Corpus {
    fn scan(&self, text: &str) -> Vec<Candidate> {
        let words = self.intern(text);
        if words.is_empty() {
            return Vec::new();
        }
        let counts = word_counts(&words);

        let mut ranked: Vec<(Candidate, f64)> = self
            .references
            .iter()
            .filter(|r| !r.words.is_empty())
            .filter(|r| {
                // Shared word counts bound the alignment from above; skip the
                // quadratic pass when even that cannot reach the floor.
                let bound = shared_words(&counts, &r.counts);
                bound as f64 >= MIN_REFERENCE_FRACTION * r.words.len() as f64
            })
            .filter_map(|reference| {
                let aligned = aligned_words(&words, &reference.words);
                let fraction = aligned as f64 / reference.words.len() as f64;
                if fraction < MIN_REFERENCE_FRACTION {
                    return None;
                }
                let coverage = 100.0 * aligned as f64 / words.len() as f64;
                Some((
                    Candidate {
                        id: reference.id.clone(),
                        coverage,
                    },
                    fraction,
                ))
            })
            .collect();

        // Highest coverage first; on a tie the reference explained most
        // completely wins, so a text is attributed to the smallest license
        // that contains it.
        ranked.sort_by(|(a, fa), (b, fb)| {
            b.coverage.total_cmp(&a.coverage).then(fb.total_cmp(fa))
        });
        ranked.into_iter().map(|(candidate, _)| candidate).collect()
    }
}

fn word_counts(words: &[u32]) -> HashMap<u32, u32> {
    let mut counts = HashMap::new();
    for &word in words.iter().filter(|&&w| w != FOREIGN_WORD) {
        *counts.entry(word).or_insert(0) += 1;
    }
    counts
}

/// Size of the multiset intersection of two word bags.
fn shared_words(a: &HashMap<u32, u32>, b: &HashMap<u32, u32>) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .map(|(word, &n)| n.min(large.get(word).copied().unwrap_or(0)) as usize)
        .sum()
}

/// Length of the longest common subsequence of `text` and `reference`.
fn aligned_words(text: &[u32], reference: &[u32]) -> usize {
    let mut prev = vec![0u32; reference.len() + 1];
    let mut curr = vec![0u32; reference.len() + 1];
    for &word in text {
        // A word absent from every reference leaves the row unchanged.
        if word == FOREIGN_WORD {
            continue;
        }
        for (j, &r) in reference.iter().enumerate() {
            curr[j + 1] = if word == r {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[reference.len()] as usize
}
