//! `go.mod` parsing: extracts the `(module, version)` pairs named by
//! `require` directives.
//!
//! Parsing is a two-state machine driven one line at a time by [`step`]:
//! outside a block only `require` lines matter; inside a `require ( ... )`
//! block every non-blank line is a dependency until the closing `)`.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ManifestError;
use crate::models::Dependency;

const REQUIRE_KEYWORD: &str = "require";
const COMMENT_MARKER: &str = "//";
const BLOCK_OPEN: char = '(';
const BLOCK_CLOSE: &str = ")";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    TopLevel,
    InRequireBlock,
}

/// Advance the parser by one line, returning the next state and the
/// dependency declared on that line, if any. `Err` carries the reason the
/// line is malformed; the caller attaches the line number.
pub fn step(state: ParserState, line: &str) -> Result<(ParserState, Option<Dependency>), String> {
    let line = line.trim();
    match state {
        ParserState::TopLevel => {
            let Some(rest) = strip_require_keyword(line) else {
                return Ok((ParserState::TopLevel, None));
            };
            if strip_comment(rest).contains(BLOCK_OPEN) {
                Ok((ParserState::InRequireBlock, None))
            } else {
                parse_dependency(rest).map(|dep| (ParserState::TopLevel, Some(dep)))
            }
        }
        ParserState::InRequireBlock => {
            let content = strip_comment(line).trim();
            if content == BLOCK_CLOSE {
                Ok((ParserState::TopLevel, None))
            } else if content.is_empty() {
                Ok((ParserState::InRequireBlock, None))
            } else {
                parse_dependency(line).map(|dep| (ParserState::InRequireBlock, Some(dep)))
            }
        }
    }
}

/// Parse a single `<module> <version> [// comment]` declaration.
pub fn parse_dependency(line: &str) -> Result<Dependency, String> {
    let content = strip_comment(line).trim();
    let fields: Vec<&str> = if content.is_empty() {
        Vec::new()
    } else {
        content.split(' ').collect()
    };

    match fields.as_slice() {
        [module, version] if !module.is_empty() && !version.is_empty() => {
            Ok(Dependency::new(*module, *version))
        }
        _ => Err(format!(
            "line did not match 'module vX.Y.Z' (found {} field(s))",
            fields.len()
        )),
    }
}

/// Read a manifest line by line and collect every required dependency.
///
/// Reaching end of input inside an unterminated `require (` block is not an
/// error. Duplicate declarations collapse into one entry. Invalid UTF-8 is
/// replaced rather than rejected, so stray bytes in comments are harmless.
pub fn parse_manifest<R: BufRead>(mut reader: R) -> Result<BTreeSet<Dependency>, ManifestError> {
    let mut deps = BTreeSet::new();
    let mut state = ParserState::TopLevel;
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;
        let line = String::from_utf8_lossy(&buf);

        let (next, dep) = step(state, &line).map_err(|reason| ManifestError::Parse {
            line: line_number,
            reason,
        })?;
        if let Some(dep) = dep {
            deps.insert(dep);
        }
        state = next;
    }

    if state == ParserState::InRequireBlock {
        tracing::debug!("manifest ended inside a require block; treating it as closed");
    }

    Ok(deps)
}

/// Open and parse the manifest at `path`.
pub fn parse_manifest_path(path: &Path) -> Result<BTreeSet<Dependency>, ManifestError> {
    let file = File::open(path)?;
    parse_manifest(BufReader::new(file))
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(at) => &line[..at],
        None => line,
    }
}

/// Return the remainder of a `require` directive line, or `None` when the
/// line is something else (including identifiers that merely start with
/// `require`).
fn strip_require_keyword(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(REQUIRE_KEYWORD)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == BLOCK_OPEN => Some(rest),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<BTreeSet<Dependency>, ManifestError> {
        parse_manifest(content.as_bytes())
    }

    fn parse_error_line(content: &str) -> usize {
        match parse(content) {
            Err(ManifestError::Parse { line, .. }) => line,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_single_inline_require() {
        let deps = parse("module example.com/app\n\ngo 1.21\n\nrequire github.com/pkg/errors v0.9.1\n")
            .unwrap();
        assert_eq!(deps.len(), 1);
        assert!(deps.contains(&Dependency::new("github.com/pkg/errors", "v0.9.1")));
    }

    #[test]
    fn test_inline_require_with_comment() {
        let deps = parse("require golang.org/x/sys v0.1.0 // indirect").unwrap();
        assert!(deps.contains(&Dependency::new("golang.org/x/sys", "v0.1.0")));
    }

    #[test]
    fn test_require_block_ignores_blank_and_comment_lines() {
        let content = "module example.com/app

require (
\tgithub.com/a/b v1.0.0

\t// tooling
\tgithub.com/c/d v2.3.4 // indirect
\tgolang.org/x/image v0.0.0-20220321031419-a8550c1d254a
)
";
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 3);
        assert!(deps.contains(&Dependency::new("github.com/c/d", "v2.3.4")));
    }

    #[test]
    fn test_multiple_blocks_and_inline() {
        let content = "require (
\tgithub.com/a/b v1.0.0
)

replace github.com/a/b => ../b

require github.com/e/f v0.2.0

require (
\tgithub.com/g/h v3.0.0+incompatible
)
";
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 3);
        assert!(deps.contains(&Dependency::new("github.com/g/h", "v3.0.0+incompatible")));
    }

    #[test]
    fn test_duplicates_collapse() {
        let content = "require (\n\tgithub.com/a/b v1.0.0\n\tgithub.com/a/b v1.0.0 // again\n)\n";
        assert_eq!(parse(content).unwrap().len(), 1);
    }

    #[test]
    fn test_eof_inside_block_is_not_an_error() {
        let deps = parse("require (\n\tgithub.com/a/b v1.0.0").unwrap();
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn test_lines_outside_require_are_ignored() {
        let content = "module example.com/app\ngo 1.21\nexclude github.com/x/y v1.0.0 extra\nrequirements are ignored\n";
        assert!(parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_field_count_reports_line_number() {
        // zero fields
        assert_eq!(parse_error_line("module m\nrequire\n"), 2);
        // one field
        assert_eq!(parse_error_line("require (\n\tgithub.com/a/b\n)\n"), 2);
        // three fields
        assert_eq!(
            parse_error_line("module m\n\nrequire (\n\tgithub.com/a/b v1.0.0\n\tgithub.com/c/d v1 extra\n)\n"),
            5
        );
        // double space yields an empty field
        assert_eq!(parse_error_line("require github.com/a/b  v1.0.0\n"), 1);
    }

    #[test]
    fn test_step_transitions() {
        assert_eq!(
            step(ParserState::TopLevel, "require (").unwrap(),
            (ParserState::InRequireBlock, None)
        );
        assert_eq!(
            step(ParserState::TopLevel, "go 1.21").unwrap(),
            (ParserState::TopLevel, None)
        );
        assert_eq!(
            step(ParserState::InRequireBlock, ")").unwrap(),
            (ParserState::TopLevel, None)
        );
        assert_eq!(
            step(ParserState::InRequireBlock, "   ").unwrap(),
            (ParserState::InRequireBlock, None)
        );
        assert_eq!(
            step(ParserState::InRequireBlock, "\tgithub.com/a/b v1.0.0\r\n").unwrap(),
            (
                ParserState::InRequireBlock,
                Some(Dependency::new("github.com/a/b", "v1.0.0"))
            )
        );
        assert!(step(ParserState::TopLevel, "require github.com/a/b").is_err());
    }

    #[test]
    fn test_invalid_utf8_in_comment_is_tolerated() {
        let mut content = b"require (\n\tgithub.com/a/b v1.0.0 // caf".to_vec();
        content.extend_from_slice(&[0xe9, 0xff]);
        content.extend_from_slice(b"\n\tgithub.com/c/d v2.0.0\n)\n");

        let deps = parse_manifest(content.as_slice()).unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.contains(&Dependency::new("github.com/a/b", "v1.0.0")));
    }

    /// Yields its first chunk, then fails every later read.
    struct FailingReader {
        first: Option<&'static [u8]>,
    }

    impl std::io::Read for FailingReader {
        fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
            match self.first.take() {
                Some(chunk) => {
                    let n = chunk.len().min(out.len());
                    out[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                None => Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone")),
            }
        }
    }

    #[test]
    fn test_read_error_mid_manifest_is_io_error() {
        let reader = BufReader::new(FailingReader {
            first: Some(b"module example.com/app\nrequire (\n\tgithub.com/a/b"),
        });
        let err = parse_manifest(reader).unwrap_err();
        assert!(matches!(err, ManifestError::Io(ref e) if e.to_string() == "device gone"));
    }

    #[test]
    fn test_parse_manifest_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_manifest_path(&dir.path().join("go.mod")).unwrap_err();
        assert!(matches!(err, ManifestError::Io(_)));
    }
}
