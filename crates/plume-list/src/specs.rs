//! Discovery and loading of spec files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use plume_core::{IMPORTANCE_RANGE, NodeSpec, SPEC_FILE_NAME, SpecPattern};

const BUILTIN_SPECS: &str = include_str!("builtin.toml");

/// Errors that can occur while loading spec files.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Spec file could not be read.
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Spec file is not valid TOML or has unknown keys.
    #[error("Could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A single spec is malformed.
    #[error("Invalid spec #{index} in {path}: {message}")]
    InvalidSpec {
        path: PathBuf,
        index: usize,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct SpecFile {
    #[serde(default)]
    specs: Vec<RawSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpec {
    name: Option<String>,
    extension: Option<String>,
    pattern: Option<String>,
    color: Option<String>,
    importance: Option<i8>,
    icon: Option<String>,
}

impl RawSpec {
    fn into_spec(self) -> Result<NodeSpec, String> {
        let pattern = match (self.name, self.extension, self.pattern) {
            (Some(name), None, None) => SpecPattern::Name(name.into()),
            (None, Some(ext), None) => SpecPattern::Extension(ext.trim_start_matches('.').into()),
            (None, None, Some(glob)) => SpecPattern::glob(&glob).map_err(|e| e.to_string())?,
            (None, None, None) => {
                return Err("one of `name`, `extension` or `pattern` is required".to_string());
            }
            _ => return Err("only one of `name`, `extension` or `pattern` may be set".to_string()),
        };

        let mut spec = NodeSpec::new(pattern);
        if let Some(color) = self.color {
            spec = spec.with_color(color);
        }
        if let Some(importance) = self.importance {
            if !IMPORTANCE_RANGE.contains(&importance) {
                return Err(format!(
                    "importance {importance} is outside {}..={}",
                    IMPORTANCE_RANGE.start(),
                    IMPORTANCE_RANGE.end()
                ));
            }
            spec = spec.with_importance(importance);
        }
        if let Some(icon) = self.icon {
            spec = spec.with_icon(icon);
        }
        Ok(spec)
    }
}

/// Parse specs from TOML text. `origin` is only used in error messages.
pub fn parse_specs(text: &str, origin: &Path) -> Result<Vec<Arc<NodeSpec>>, SpecError> {
    let file: SpecFile = toml::from_str(text).map_err(|source| SpecError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    file.specs
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            raw.into_spec()
                .map(Arc::new)
                .map_err(|message| SpecError::InvalidSpec {
                    path: origin.to_path_buf(),
                    index,
                    message,
                })
        })
        .collect()
}

/// Read and parse one spec file.
pub fn read_spec_file(path: &Path) -> Result<Vec<Arc<NodeSpec>>, SpecError> {
    let text = fs::read_to_string(path).map_err(|source| SpecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_specs(&text, path)
}

/// Specs shipped with plume.
pub fn builtin_specs() -> Result<Vec<Arc<NodeSpec>>, SpecError> {
    parse_specs(BUILTIN_SPECS, Path::new("<builtin>"))
}

/// Spec files in `dir` and its ancestors, nearest first, at most `depth` levels.
pub fn discover_spec_files(dir: &Path, depth: usize) -> Vec<PathBuf> {
    dir.ancestors()
        .take(depth)
        .map(|ancestor| ancestor.join(SPEC_FILE_NAME))
        .filter(|path| path.is_file())
        .collect()
}

/// User-wide spec file, e.g. `~/.config/plume/plume.toml`.
pub fn user_spec_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("plume").join("plume.toml");
    path.is_file().then_some(path)
}

/// All specs applicable to a listing of `dir`, highest precedence first:
/// nearest directory spec file, farther ancestors, the user file, built-ins.
pub fn load_specs(dir: &Path, depth: usize) -> Result<Vec<Arc<NodeSpec>>, SpecError> {
    let mut files = discover_spec_files(dir, depth);
    files.extend(user_spec_file());

    let mut specs = Vec::new();
    for path in &files {
        let loaded = read_spec_file(path)?;
        debug!(path = %path.display(), count = loaded.len(), "loaded spec file");
        specs.extend(loaded);
    }
    specs.extend(builtin_specs()?);
    Ok(specs)
}
