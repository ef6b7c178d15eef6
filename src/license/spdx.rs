/// Every id the classifier can produce, besides `UNKNOWN`.
pub const CANONICAL_IDS: &[&str] = &[
    "MIT",
    "MIT-0",
    "Apache-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "0BSD",
    "ISC",
    "Zlib",
    "Unlicense",
    "CC0-1.0",
    "PSF-2.0",
    "BSL-1.0",
    "Artistic-2.0",
    "MPL-2.0",
    "EPL-2.0",
    "LGPL-2.0",
    "LGPL-2.1",
    "LGPL-3.0",
    "GPL-2.0",
    "GPL-3.0",
    "AGPL-3.0",
    "LGPL-UNVERSIONED",
    "GPL-UNVERSIONED",
    "AGPL-UNVERSIONED",
];

/// Known spellings of each canonical id, keyed in normalized form
/// (lowercase, single spaces). Canonical ids match themselves separately.
pub const VARIANTS: &[(&str, &str)] = &[
    // MIT
    ("mit license", "MIT"),
    ("the mit license", "MIT"),
    ("the mit license (mit)", "MIT"),
    ("mit license (mit)", "MIT"),
    ("expat", "MIT"),
    ("mit no attribution", "MIT-0"),
    // Apache
    ("apache 2", "Apache-2.0"),
    ("apache 2.0", "Apache-2.0"),
    ("apache-2", "Apache-2.0"),
    ("apache2", "Apache-2.0"),
    ("apache license 2.0", "Apache-2.0"),
    ("apache license, version 2.0", "Apache-2.0"),
    ("apache license version 2.0", "Apache-2.0"),
    ("apache software license", "Apache-2.0"),
    ("apache software license 2.0", "Apache-2.0"),
    ("the apache software license, version 2.0", "Apache-2.0"),
    ("the apache license, version 2.0", "Apache-2.0"),
    ("asl 2.0", "Apache-2.0"),
    // BSD
    ("bsd", "BSD-3-Clause"),
    ("bsd license", "BSD-3-Clause"),
    ("bsd 3-clause", "BSD-3-Clause"),
    ("bsd-3", "BSD-3-Clause"),
    ("3-clause bsd", "BSD-3-Clause"),
    ("3-clause bsd license", "BSD-3-Clause"),
    ("new bsd", "BSD-3-Clause"),
    ("new bsd license", "BSD-3-Clause"),
    ("modified bsd", "BSD-3-Clause"),
    ("bsd 2-clause", "BSD-2-Clause"),
    ("bsd-2", "BSD-2-Clause"),
    ("2-clause bsd", "BSD-2-Clause"),
    ("simplified bsd", "BSD-2-Clause"),
    ("freebsd", "BSD-2-Clause"),
    ("zero-clause bsd", "0BSD"),
    // Other permissive
    ("isc license", "ISC"),
    ("isc license (iscl)", "ISC"),
    ("iscl", "ISC"),
    ("zlib license", "Zlib"),
    ("zlib/libpng license", "Zlib"),
    ("the unlicense", "Unlicense"),
    ("the unlicense (unlicense)", "Unlicense"),
    ("cc0", "CC0-1.0"),
    ("cc0 1.0 universal", "CC0-1.0"),
    ("cc0 1.0 universal (cc0 1.0) public domain dedication", "CC0-1.0"),
    ("python software foundation license", "PSF-2.0"),
    ("psf", "PSF-2.0"),
    ("psfl", "PSF-2.0"),
    ("boost software license", "BSL-1.0"),
    ("boost software license 1.0 (bsl-1.0)", "BSL-1.0"),
    ("artistic license 2.0", "Artistic-2.0"),
    // Weak copyleft
    ("mpl 2.0", "MPL-2.0"),
    ("mpl-2", "MPL-2.0"),
    ("mplv2", "MPL-2.0"),
    ("mozilla public license 2.0", "MPL-2.0"),
    ("mozilla public license 2.0 (mpl 2.0)", "MPL-2.0"),
    ("eclipse public license 2.0", "EPL-2.0"),
    ("lgpl-2.0-only", "LGPL-2.0"),
    ("lgpl-2.0-or-later", "LGPL-2.0"),
    ("gnu lesser general public license v2 (lgplv2)", "LGPL-2.0"),
    ("gnu lesser general public license v2 or later (lgplv2+)", "LGPL-2.0"),
    ("lgpl-2.1-only", "LGPL-2.1"),
    ("lgpl-2.1-or-later", "LGPL-2.1"),
    ("lgpl v2.1", "LGPL-2.1"),
    ("lgplv2.1", "LGPL-2.1"),
    ("gnu lgpl v2.1", "LGPL-2.1"),
    ("lgpl-3.0-only", "LGPL-3.0"),
    ("lgpl-3.0-or-later", "LGPL-3.0"),
    ("lgpl v3", "LGPL-3.0"),
    ("lgplv3", "LGPL-3.0"),
    ("gnu lgpl v3", "LGPL-3.0"),
    ("gnu lesser general public license v3 (lgplv3)", "LGPL-3.0"),
    ("gnu lesser general public license v3 or later (lgplv3+)", "LGPL-3.0"),
    ("gnu library or lesser general public license (lgpl)", "LGPL-UNVERSIONED"),
    // Strong copyleft
    ("gpl-2.0-only", "GPL-2.0"),
    ("gpl-2.0-or-later", "GPL-2.0"),
    ("gpl v2", "GPL-2.0"),
    ("gplv2", "GPL-2.0"),
    ("gpl-2", "GPL-2.0"),
    ("gnu gpl v2", "GPL-2.0"),
    ("gnu general public license v2", "GPL-2.0"),
    ("gnu general public license v2 (gplv2)", "GPL-2.0"),
    ("gnu general public license v2 or later (gplv2+)", "GPL-2.0"),
    ("gpl-3.0-only", "GPL-3.0"),
    ("gpl-3.0-or-later", "GPL-3.0"),
    ("gpl v3", "GPL-3.0"),
    ("gplv3", "GPL-3.0"),
    ("gpl-3", "GPL-3.0"),
    ("gnu gpl v3", "GPL-3.0"),
    ("gnu general public license v3", "GPL-3.0"),
    ("gnu general public license v3 (gplv3)", "GPL-3.0"),
    ("gnu general public license v3 or later (gplv3+)", "GPL-3.0"),
    ("gnu general public license (gpl)", "GPL-UNVERSIONED"),
    ("agpl-3.0-only", "AGPL-3.0"),
    ("agpl-3.0-or-later", "AGPL-3.0"),
    ("agpl v3", "AGPL-3.0"),
    ("agplv3", "AGPL-3.0"),
    ("gnu agpl v3", "AGPL-3.0"),
    ("gnu affero general public license v3", "AGPL-3.0"),
    ("gnu affero general public license v3 or later (agplv3+)", "AGPL-3.0"),
];

/// Canonical spelling of `text`: a canonical id in any case, or a known variant.
pub fn canonical_id(text: &str) -> Option<&'static str> {
    let key = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    CANONICAL_IDS
        .iter()
        .copied()
        .find(|id| id.to_lowercase() == key)
        .or_else(|| {
            VARIANTS
                .iter()
                .find(|(variant, _)| *variant == key)
                .map(|(_, id)| *id)
        })
}
