//! Loading of the per-directory exclude configuration.
//!
//! The configuration is an INI-style file in which every section names a
//! directory and holds a single `files` option, a JSON list of literal names
//! or wildcard patterns to keep:
//!
//! ```ini
//! # Application logs
//! [/ops/app/logs]
//! files = ["current.log", "tf*.env"]
//!
//! [/ops/app/tmp]
//! files = []
//! ```
//!
//! Structural problems with the file as a whole are fatal
//! ([`PurgeError::ConfigParseError`]). Problems with a single section only
//! reject that section, see [`LoadedConfig::entries`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{PurgeError, Result, SpecEntryError};
use crate::retention::RetentionSpec;


/// The only option a section may carry.
pub const FILES_KEY: &str = "files";

/// Default location of the exclude configuration.
pub const DEFAULT_CONFIG_PATH: &str = "/ops/scripts/ops_files_purge_exceptions.cfg";

/// One `[section]` of the file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub line: usize,
    /// Options as `(lower-cased key, raw value)`, in file order
    pub options: Vec<(String, String)>,
}

/// A structurally valid configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    path: PathBuf,
    sections: Vec<Section>,
}

impl LoadedConfig {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Validate every section, in file order.
    ///
    /// Each section yields either a [`RetentionSpec`] or the reason it was
    /// rejected; one bad section never affects the others.
    pub fn entries(&self) -> Vec<std::result::Result<RetentionSpec, SpecEntryError>> {
        self.sections.iter().map(validate_section).collect()
    }
}

/// Read and parse the configuration at `path`.
///
/// # Errors
///
/// - [`PurgeError::ConfigSourceMissing`] if the file does not exist
/// - [`PurgeError::Io`] if it exists but cannot be read
/// - [`PurgeError::ConfigParseError`] if it is structurally malformed
pub fn load(path: &Path) -> Result<LoadedConfig> {
    if !path.is_file() {
        return Err(PurgeError::ConfigSourceMissing(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|source| PurgeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse(path, &text)
}

/// Parse configuration `text`; `path` is only used in error messages.
pub fn parse(path: &Path, text: &str) -> Result<LoadedConfig> {
    static SECTION_RE: OnceLock<Regex> = OnceLock::new();
    static OPTION_RE: OnceLock<Regex> = OnceLock::new();

    let section_re = SECTION_RE.get_or_init(|| {
        // Header runs to the last `]`; anything after it is ignored
        Regex::new(r"^\[(?P<name>.+)\]").expect("section regex should compile")
    });
    let option_re = OPTION_RE.get_or_init(|| {
        Regex::new(r"^(?P<key>[^=:\s][^=:]*?)\s*[=:]\s*(?P<value>.*)$")
            .expect("option regex should compile")
    });

    let parse_error = |line: usize, message: &str| PurgeError::ConfigParseError {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    };

    let mut sections: Vec<Section> = Vec::new();
    // Whether the last non-blank line was an option that may continue
    let mut continuable = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.len() != trimmed.len();
        if indented && continuable {
            if let Some((_, value)) = sections.last_mut().and_then(|s| s.options.last_mut()) {
                value.push('\n');
                value.push_str(trimmed);
            }
            continue;
        }

        if let Some(captures) = section_re.captures(trimmed) {
            let name = captures["name"].trim().to_string();
            if sections.iter().any(|s| s.name == name) {
                return Err(parse_error(
                    line_no,
                    &format!("section {name:?} already exists"),
                ));
            }
            sections.push(Section {
                name,
                line: line_no,
                options: Vec::new(),
            });
            continuable = false;
            continue;
        }

        if trimmed.starts_with('[') {
            return Err(parse_error(line_no, "section header is not closed"));
        }

        let Some(captures) = option_re.captures(trimmed) else {
            return Err(parse_error(
                line_no,
                "line is neither a section header nor a `key = value` option",
            ));
        };
        let Some(section) = sections.last_mut() else {
            return Err(parse_error(
                line_no,
                "file contains no section headers; options must follow a [DIRECTORY_PATH] header",
            ));
        };

        let key = captures["key"].trim().to_lowercase();
        if section.options.iter().any(|(existing, _)| *existing == key) {
            return Err(parse_error(
                line_no,
                &format!("option {key:?} in section {:?} already exists", section.name),
            ));
        }
        section
            .options
            .push((key, captures["value"].trim().to_string()));
        continuable = true;
    }

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        sections,
    })
}

fn validate_section(section: &Section) -> std::result::Result<RetentionSpec, SpecEntryError> {
    let directory = section.name.clone();

    if !Path::new(&directory).is_dir() {
        return Err(SpecEntryError::MissingDirectory { directory });
    }

    let value = match section.options.first() {
        Some((key, value)) if key == FILES_KEY => value,
        Some((key, _)) => {
            return Err(SpecEntryError::InvalidKey {
                directory,
                found: key.clone(),
            });
        }
        None => {
            return Err(SpecEntryError::InvalidKey {
                directory,
                found: String::new(),
            });
        }
    };

    if let Some((extra, _)) = section.options.get(1) {
        return Err(SpecEntryError::InvalidKey {
            directory,
            found: extra.clone(),
        });
    }

    let patterns: Vec<String> =
        serde_json::from_str(value).map_err(|err| SpecEntryError::InvalidPatternList {
            directory: directory.clone(),
            message: err.to_string(),
        })?;

    Ok(RetentionSpec::new(directory, patterns))
}
