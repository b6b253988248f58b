use crate::models::{License, LicenseRisk};

/// Classify a resolved license identifier into a risk family.
///
/// Only the identifier's family matters here; anything unrecognized,
/// including the `unknown` sentinel, is [`LicenseRisk::Unknown`].
pub fn classify(license: &License) -> LicenseRisk {
    match license.as_str().trim() {
        "MIT" | "MIT-0" | "Apache-2.0" | "BSD-2-Clause" | "BSD-3-Clause" | "BSD-4-Clause"
        | "ISC" | "0BSD" | "Unlicense" | "Zlib" | "CC0-1.0" | "WTFPL" | "BSL-1.0"
        | "BlueOak-1.0.0" => LicenseRisk::Permissive,

        "LGPL-2.1" | "LGPL-2.1-only" | "LGPL-2.1-or-later" | "LGPL-3.0" | "LGPL-3.0-only"
        | "LGPL-3.0-or-later" | "MPL-2.0" | "EPL-1.0" | "EPL-2.0" | "CDDL-1.0" => {
            LicenseRisk::WeakCopyleft
        }

        "GPL-2.0" | "GPL-2.0-only" | "GPL-2.0-or-later" | "GPL-3.0" | "GPL-3.0-only"
        | "GPL-3.0-or-later" | "AGPL-3.0" | "AGPL-3.0-only" | "AGPL-3.0-or-later" => {
            LicenseRisk::StrongCopyleft
        }

        _ => LicenseRisk::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permissive() {
        assert_eq!(classify(&License::new("MIT")), LicenseRisk::Permissive);
        assert_eq!(classify(&License::new("BSD-3-Clause")), LicenseRisk::Permissive);
    }

    #[test]
    fn test_classify_copyleft() {
        assert_eq!(classify(&License::new("MPL-2.0")), LicenseRisk::WeakCopyleft);
        assert_eq!(classify(&License::new("GPL-3.0")), LicenseRisk::StrongCopyleft);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify(&License::unknown()), LicenseRisk::Unknown);
        assert_eq!(classify(&License::new("Custom-1.0")), LicenseRisk::Unknown);
    }
}
