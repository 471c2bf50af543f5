//! Logical template names to filesystem paths.
//!
//! [`TemplateFinder`] lets callers refer to templates by name (`"users/list"`,
//! `"admin::dashboard"`) instead of by path.
//!
//! # Resolution
//!
//! 1. `ns::rest` names search only the directories registered for namespace
//!    `ns`; plain names search the locations in registration order
//! 2. A name that already ends in a known extension is tried verbatim first
//! 3. Otherwise each extension is tried in priority order, per directory
//!
//! The first existing file wins and is cached for the finder's lifetime.
//!
//! # Supported Extensions
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.html` |
//! | 2 | `.twig` |
//! | 3 | `.jinja` |
//! | 4 | `.jinja2` |
//! | 5 | `.j2` |
//! | 6 (lowest) | `.txt` |
//!
//! [`TemplateFinder::add_extension`] registers a new highest-priority extension.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

/// Separates a namespace from the template path in a name.
pub const NAMESPACE_DELIMITER: &str = "::";

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".html", ".twig", ".jinja", ".jinja2", ".j2", ".txt"];

/// Errors from template lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// The name uses a namespace nothing was registered for.
    #[error("no hint path defined for namespace \"{namespace}\"")]
    UnknownNamespace { namespace: String },

    /// The name has an empty namespace or an empty path.
    #[error("invalid template name \"{name}\"")]
    InvalidName { name: String },

    /// No candidate file exists.
    #[error("template \"{name}\" not found (searched {} paths)", .searched.len())]
    NotFound { name: String, searched: Vec<PathBuf> },
}

/// Returns the extension priority (lower is higher priority).
///
/// Returns `usize::MAX` if the extension is not recognized.
pub fn extension_priority(name: &str, extensions: &[String]) -> usize {
    extensions
        .iter()
        .position(|ext| name.ends_with(ext.as_str()))
        .unwrap_or(usize::MAX)
}

/// Strips the first matching extension from a name.
pub fn strip_extension(name: &str, extensions: &[String]) -> String {
    for ext in extensions {
        if let Some(base) = name.strip_suffix(ext.as_str()) {
            return base.to_string();
        }
    }
    name.to_string()
}

/// Finds template files by logical name.
///
/// # Example
///
/// ```rust,ignore
/// let mut finder = TemplateFinder::new();
/// finder.add_location("./templates");
/// finder.add_namespace("admin", ["./admin/templates"]);
///
/// let list = finder.find("users/list")?;       // ./templates/users/list.html
/// let dash = finder.find("admin::dashboard")?; // ./admin/templates/dashboard.twig
/// ```
#[derive(Debug)]
pub struct TemplateFinder {
    locations: Vec<PathBuf>,
    namespaces: IndexMap<String, Vec<PathBuf>>,
    extensions: Vec<String>,
    cache: RefCell<HashMap<String, PathBuf>>,
}

impl Default for TemplateFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateFinder {
    /// Creates a finder with no locations and the default extensions.
    pub fn new() -> Self {
        Self {
            locations: Vec::new(),
            namespaces: IndexMap::new(),
            extensions: TEMPLATE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Adds a directory searched for plain names (lowest priority so far).
    pub fn add_location(&mut self, location: impl Into<PathBuf>) {
        self.locations.push(location.into());
    }

    /// Appends directories to a namespace, creating it if needed.
    pub fn add_namespace<I, P>(&mut self, namespace: impl Into<String>, hints: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .extend(hints.into_iter().map(Into::into));
    }

    /// Prepends directories to a namespace so they are searched first.
    pub fn prepend_namespace<I, P>(&mut self, namespace: impl Into<String>, hints: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs = self.namespaces.entry(namespace.into()).or_default();
        let mut hints: Vec<PathBuf> = hints.into_iter().map(Into::into).collect();
        hints.append(dirs);
        *dirs = hints;
        self.cache.borrow_mut().clear();
    }

    /// Registers an extension with the highest priority.
    ///
    /// Accepts `"tpl"` or `".tpl"`. Re-adding an extension moves it to the front.
    pub fn add_extension(&mut self, extension: &str) {
        let ext = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };
        self.extensions.retain(|e| *e != ext);
        self.extensions.insert(0, ext);
        self.cache.borrow_mut().clear();
    }

    /// Returns the extensions in priority order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns the plain-name search locations.
    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    /// Resolves a logical name to an existing template file.
    pub fn find(&self, name: &str) -> Result<PathBuf, FinderError> {
        if let Some(hit) = self.cache.borrow().get(name) {
            return Ok(hit.clone());
        }

        let (dirs, relative) = self.split_name(name)?;
        let candidates = self.candidates(relative);

        let mut searched = Vec::new();
        for dir in dirs {
            for candidate in &candidates {
                let path = dir.join(candidate);
                if path.is_file() {
                    self.cache
                        .borrow_mut()
                        .insert(name.to_string(), path.clone());
                    return Ok(path);
                }
                searched.push(path);
            }
        }

        Err(FinderError::NotFound {
            name: name.to_string(),
            searched,
        })
    }

    /// Returns the logical name for a path under one of the locations.
    ///
    /// This is the inverse of [`find`](Self::find) for plain names.
    pub fn name_for(&self, path: &Path) -> Option<String> {
        self.locations.iter().find_map(|root| {
            let relative = path.strip_prefix(root).ok()?;
            let relative = relative.to_str()?.replace('\\', "/");
            Some(strip_extension(&relative, &self.extensions))
        })
    }

    fn split_name<'a>(&'a self, name: &'a str) -> Result<(&'a [PathBuf], &'a str), FinderError> {
        match name.split_once(NAMESPACE_DELIMITER) {
            Some((namespace, relative)) => {
                if namespace.is_empty() || relative.is_empty() {
                    return Err(FinderError::InvalidName {
                        name: name.to_string(),
                    });
                }
                let dirs = self.namespaces.get(namespace).ok_or_else(|| {
                    FinderError::UnknownNamespace {
                        namespace: namespace.to_string(),
                    }
                })?;
                Ok((dirs.as_slice(), relative))
            }
            None if name.is_empty() => Err(FinderError::InvalidName {
                name: name.to_string(),
            }),
            None => Ok((self.locations.as_slice(), name)),
        }
    }

    fn candidates(&self, relative: &str) -> Vec<String> {
        let mut candidates = Vec::with_capacity(self.extensions.len() + 1);
        if extension_priority(relative, &self.extensions) != usize::MAX {
            candidates.push(relative.to_string());
        }
        candidates.extend(self.extensions.iter().map(|ext| format!("{}{}", relative, ext)));
        candidates
    }
}
