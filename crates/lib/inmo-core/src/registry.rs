use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum RegistryError {
    UnknownCollection(String),
    LoadFailed { path: PathBuf, message: String },
    InvalidEntry { name: String, reason: &'static str },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCollection(name) => write!(f, "unknown collection: {name}"),
            Self::LoadFailed { path, message } => {
                write!(f, "failed to load collections from {}: {message}", path.display())
            }
            Self::InvalidEntry { name, reason } => {
                write!(f, "invalid collection entry {name:?}: {reason}")
            }
        }
    }
}

impl Error for RegistryError {}

/// Read-only mapping from logical collection names to store collection ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionRegistry {
    entries: BTreeMap<String, String>,
}

impl CollectionRegistry {
    /// Builds a registry from name/id pairs.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidEntry` when a name or id is blank.
    pub fn new<I, K, V>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, id) in entries {
            let name = name.into();
            let id = id.into();
            if name.trim().is_empty() {
                return Err(RegistryError::InvalidEntry {
                    name,
                    reason: "name is empty",
                });
            }
            if id.trim().is_empty() {
                return Err(RegistryError::InvalidEntry {
                    name,
                    reason: "collection id is empty",
                });
            }
            map.insert(name, id.trim().to_string());
        }
        Ok(Self { entries: map })
    }

    /// Loads a registry file: TOML when the extension is `.toml`, JSON otherwise.
    ///
    /// # Errors
    /// Returns `RegistryError` if the file cannot be read, parsed, or holds blank entries.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let load_failed = |message: String| RegistryError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|err| load_failed(err.to_string()))?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let entries: BTreeMap<String, String> = if is_toml {
            toml::from_str(&raw).map_err(|err| load_failed(err.to_string()))?
        } else {
            serde_json::from_str(&raw).map_err(|err| load_failed(err.to_string()))?
        };
        Self::new(entries)
    }

    /// Resolves a logical name to its collection id.
    ///
    /// # Errors
    /// Returns `RegistryError::UnknownCollection` if the name is not configured.
    pub fn resolve(&self, name: &str) -> Result<&str, RegistryError> {
        self.entries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::UnknownCollection(name.to_string()))
    }

    /// Configured logical names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
