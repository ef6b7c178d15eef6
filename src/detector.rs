use std::path::Path;

use crate::manifest::ManifestFormat;

/// Guess the manifest format from its file name.
///
/// `package.json` → Node; `requirements*.txt` and pip-tools `*.in` → Python.
pub fn detect_format(path: &Path) -> Option<ManifestFormat> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();

    if name == "package.json" {
        return Some(ManifestFormat::NodePackageJson);
    }

    if (name.starts_with("requirements") && name.ends_with(".txt")) || name.ends_with(".in") {
        return Some(ManifestFormat::PythonRequirements);
    }

    None
}
