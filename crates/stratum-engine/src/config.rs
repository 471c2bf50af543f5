//! Engine resolution table loaded from YAML.
//!
//! An application declares which engine handles which template type once, in
//! configuration, instead of wiring engines by hand:
//!
//! ```yaml
//! default_type: html
//! template_dirs:
//!   - templates
//! engines:
//!   - type: twig
//!     engine: minijinja
//!   - type: html
//!     engine: string
//! ```
//!
//! Tags map to engine kinds; every tag mapped to the same kind shares one engine
//! instance, built the first time a template of any of those types renders.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::{
    DelegatingEngine, LazyEngineResolver, MiniJinjaEngine, StringEngine, TemplateEngine,
    TemplateFinder,
};

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid engine config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("template type \"{0}\" is mapped more than once")]
    DuplicateType(String),

    #[error("default type \"{0}\" has no engine mapping")]
    UnmappedDefault(String),
}

/// Backends that can be named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// [`StringEngine`]
    String,
    /// [`MiniJinjaEngine`]
    Minijinja,
}

impl EngineKind {
    fn build(self, template_dirs: &[PathBuf]) -> Arc<dyn TemplateEngine> {
        match self {
            EngineKind::String => Arc::new(StringEngine::new()),
            EngineKind::Minijinja => {
                Arc::new(MiniJinjaEngine::new().with_template_dirs(template_dirs.to_vec()))
            }
        }
    }
}

/// One row of the resolution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMapping {
    /// Type tag, usually a file extension without the dot.
    #[serde(rename = "type")]
    pub tag: String,
    /// Engine rendering templates of this type.
    pub engine: EngineKind,
}

/// Engine resolution table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Tag used for templates with neither extension nor type hint.
    #[serde(default)]
    pub default_type: Option<String>,

    /// Directories for named templates and the finder.
    #[serde(default)]
    pub template_dirs: Vec<PathBuf>,

    /// Type tag to engine mappings, in priority order.
    #[serde(default)]
    pub engines: Vec<EngineMapping>,
}

impl EngineConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    ///
    /// Relative `template_dirs` are resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml(&yaml)?;
        if let Some(base) = path.parent() {
            config.template_dirs = config
                .template_dirs
                .into_iter()
                .map(|dir| if dir.is_relative() { base.join(dir) } else { dir })
                .collect();
        }
        Ok(config)
    }

    /// Checks for duplicate tags and an unmapped default type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, mapping) in self.engines.iter().enumerate() {
            if self.engines[..i].iter().any(|m| m.tag == mapping.tag) {
                return Err(ConfigError::DuplicateType(mapping.tag.clone()));
            }
        }

        if let Some(default) = &self.default_type {
            if !self.engines.iter().any(|m| &m.tag == default) {
                return Err(ConfigError::UnmappedDefault(default.clone()));
            }
        }

        Ok(())
    }

    /// Builds a [`LazyEngineResolver`] from the table.
    pub fn lazy_resolver(&self) -> LazyEngineResolver {
        let mut resolver = match &self.default_type {
            Some(default) => LazyEngineResolver::new().with_default_type(default.clone()),
            None => LazyEngineResolver::new(),
        };

        let mut shared: Vec<(EngineKind, Arc<OnceCell<Arc<dyn TemplateEngine>>>)> = Vec::new();

        for mapping in &self.engines {
            let kind = mapping.engine;
            let cell = match shared.iter().find(|(k, _)| *k == kind) {
                Some((_, cell)) => Arc::clone(cell),
                None => {
                    let cell = Arc::new(OnceCell::new());
                    shared.push((kind, Arc::clone(&cell)));
                    cell
                }
            };

            let dirs = self.template_dirs.clone();
            resolver.add_mapping(mapping.tag.clone(), move || {
                cell.get_or_init(|| kind.build(&dirs)).clone()
            });
        }

        resolver
    }

    /// Builds a [`DelegatingEngine`] over [`lazy_resolver`](Self::lazy_resolver).
    pub fn delegating_engine(&self) -> DelegatingEngine {
        DelegatingEngine::new(self.lazy_resolver())
    }

    /// Builds a [`TemplateFinder`] searching `template_dirs` in order.
    pub fn finder(&self) -> TemplateFinder {
        let mut finder = TemplateFinder::new();
        for dir in &self.template_dirs {
            finder.add_location(dir.clone());
        }
        finder
    }
}
