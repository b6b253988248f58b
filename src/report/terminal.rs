use std::collections::HashMap;
use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{LicenseRisk, LicenseSet};
use crate::risk::classify;

/// Render a colored terminal report.
pub fn render(licenses: &LicenseSet, manifest: &Path, quiet: bool) {
    let total = licenses.len();
    let unknown = licenses.unknown_count();

    if quiet {
        println!(
            "Total: {}  Identified: {}  Unknown: {}",
            total,
            (total - unknown).to_string().green(),
            unknown.to_string().yellow(),
        );
        return;
    }

    println!(
        "\n {} v{}",
        "gomod-license".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Manifest: {}\n", manifest.display());

    if total > 0 {
        println!("{}", build_table(licenses));
    }

    println!(
        "\n {} dependencies  {} {}  {} {}  {}",
        total,
        "✓".green(),
        total - unknown,
        "?".yellow(),
        unknown,
        summarize_licenses(licenses)
    );
}

fn build_table(licenses: &LicenseSet) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Module").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
        ]);

    for (dep, license) in licenses.iter() {
        let risk = classify(license);
        let risk_color = match risk {
            LicenseRisk::Permissive => Color::Green,
            LicenseRisk::WeakCopyleft => Color::Yellow,
            LicenseRisk::StrongCopyleft => Color::Red,
            LicenseRisk::Unknown => Color::DarkGrey,
        };
        let license_cell = if license.is_unknown() {
            Cell::new(license.as_str()).fg(Color::Yellow)
        } else {
            Cell::new(license.as_str())
        };

        table.add_row(vec![
            Cell::new(&dep.module),
            Cell::new(&dep.version),
            license_cell,
            Cell::new(risk.to_string()).fg(risk_color),
        ]);
    }

    table
}

/// Top three license ids by count, e.g. `[MIT (4), BSD-3-Clause (2)]`.
fn summarize_licenses(licenses: &LicenseSet) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_, license) in licenses.iter() {
        *counts.entry(license.as_str()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dependency, License};

    fn sample() -> LicenseSet {
        [
            ("github.com/a/b", "v1.0.0", "MIT"),
            ("github.com/c/d", "v1.0.0", "MIT"),
            ("golang.org/x/sys", "v0.1.0", "BSD-3-Clause"),
            ("github.com/e/f", "v0.2.0", "unknown"),
        ]
        .into_iter()
        .map(|(m, v, l)| (Dependency::new(m, v), License::new(l)))
        .collect()
    }

    #[test]
    fn test_summarize_licenses() {
        assert_eq!(
            summarize_licenses(&sample()),
            "[MIT (2), BSD-3-Clause (1), unknown (1)]"
        );
        assert_eq!(summarize_licenses(&LicenseSet::new()), "");
    }

    #[test]
    fn test_table_has_row_per_dependency() {
        let table = build_table(&sample());
        assert_eq!(table.row_iter().count(), 4);
    }
}
