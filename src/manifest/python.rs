use crate::error::ParseError;
use crate::models::{Dependency, Ecosystem};

/// Characters that open a version specifier (`==`, `>=`, `~=`, `!=`, ...) or a
/// PEP 508 direct reference (`name @ url`).
const SPECIFIER_START: &[char] = &['=', '<', '>', '!', '~', '@'];

/// Parser for `requirements.txt`-style manifests.
///
/// One requirement per line. Blank lines, `#` comments and pip options
/// (`-r other.txt`, `-e .`, `--index-url ...`) are skipped. Backslash line
/// continuations are joined before parsing.
///
/// Bare URLs and local paths (`git+https://...`, `./vendor/pkg`) carry no
/// registry name and are skipped, unless a `#egg=name` fragment names the
/// project.
pub struct RequirementsParser;

impl RequirementsParser {
    pub fn new() -> Self {
        Self
    }
}

impl super::ManifestParser for RequirementsParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let mut deps = Vec::new();

        for (line_no, line) in logical_lines(content) {
            if let Some(dep) = parse_requirement(&line, line_no)? {
                deps.push(dep);
            }
        }

        Ok(deps)
    }
}

/// Join `\`-continued lines, keeping the 1-based number of the first physical line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let (start, mut buf) = pending.take().unwrap_or((idx + 1, String::new()));
        match raw.strip_suffix('\\') {
            Some(head) => {
                buf.push_str(head);
                buf.push(' ');
                pending = Some((start, buf));
            }
            None => {
                buf.push_str(raw);
                lines.push((start, buf));
            }
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }

    lines
}

fn parse_requirement(line: &str, line_no: usize) -> Result<Option<Dependency>, ParseError> {
    let line = strip_comment(line).trim();
    if line.is_empty() || line.starts_with('-') {
        return Ok(None);
    }

    // Per-requirement options such as `--hash=...` trail the requirement.
    let line = line.split(" --").next().unwrap_or(line).trim();

    if is_direct_reference(line) {
        return egg_requirement(line, line_no);
    }

    // Environment markers (`; python_version < "3.8"`) are not part of the constraint.
    let line = line.split(';').next().unwrap_or(line).trim();

    let location = format!("line {}", line_no);
    let (name_part, constraint) = match line.find(SPECIFIER_START) {
        Some(idx) => {
            let (name, rest) = line.split_at(idx);
            let constraint = match rest.strip_prefix('@') {
                Some(url) => format!("@ {}", url.trim()),
                None => rest.trim().to_string(),
            };
            (name.trim(), Some(constraint))
        }
        None => (line, None),
    };

    let name = strip_extras(name_part).ok_or_else(|| ParseError::InvalidName {
        location: location.clone(),
        name: name_part.to_string(),
    })?;

    if name.is_empty() {
        return Err(ParseError::EmptyName { location });
    }
    if !is_valid_name(name) {
        return Err(ParseError::InvalidName {
            location,
            name: name.to_string(),
        });
    }

    Ok(Some(Dependency::new(name, constraint, Ecosystem::Python)))
}

/// A URL (`https://...`, `git+ssh://...`), a filesystem path, or a local archive.
fn is_direct_reference(line: &str) -> bool {
    let has_scheme = line.find("://").is_some_and(|idx| {
        let scheme = &line[..idx];
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
    });
    let token = line.split_whitespace().next().unwrap_or(line);
    has_scheme
        || token.starts_with("./")
        || token.starts_with("../")
        || token.starts_with('/')
        || token.starts_with("~/")
        || [".whl", ".tar.gz", ".zip"].iter().any(|ext| token.ends_with(ext))
}

/// `git+https://host/repo.git#egg=flask` → `flask @ git+https://host/repo.git`.
fn egg_requirement(line: &str, line_no: usize) -> Result<Option<Dependency>, ParseError> {
    let line = line.split(';').next().unwrap_or(line).trim();
    let Some((location_part, fragment)) = line.split_once('#') else {
        return Ok(None);
    };
    let Some(egg) = fragment
        .split('&')
        .find_map(|pair| pair.strip_prefix("egg="))
    else {
        return Ok(None);
    };

    let name = strip_extras(egg).filter(|name| is_valid_name(name)).ok_or_else(|| {
        ParseError::InvalidName {
            location: format!("line {}", line_no),
            name: egg.to_string(),
        }
    })?;

    Ok(Some(Dependency::new(
        name,
        Some(format!("@ {}", location_part.trim())),
        Ecosystem::Python,
    )))
}

/// Remove a trailing ` # comment`. A `#` glued to a token (URL fragments) is kept.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// `requests[security,socks]` → `requests`. `None` when the bracket is unbalanced.
fn strip_extras(name: &str) -> Option<&str> {
    match name.find('[') {
        Some(open) => {
            if name.trim_end().ends_with(']') {
                Some(name[..open].trim())
            } else {
                None
            }
        }
        None if name.contains(']') => None,
        None => Some(name.trim()),
    }
}

/// PEP 508 project name: ASCII alphanumerics, with `.`, `_`, `-` allowed
/// between the first and last character.
fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}
