use crate::error::CollaboratorError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// How a piece of chrome (menus, minimap, ...) is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceMode {
    #[default]
    Shown,
    Hidden,
    Hover,
}

impl fmt::Display for PreferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PreferenceMode::Shown => "shown",
            PreferenceMode::Hidden => "hidden",
            PreferenceMode::Hover => "hover",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PreferenceMode {
    type Err = CollaboratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shown" => Ok(PreferenceMode::Shown),
            "hidden" => Ok(PreferenceMode::Hidden),
            "hover" => Ok(PreferenceMode::Hover),
            other => Err(CollaboratorError::Rejected(format!(
                "unknown preference mode '{other}'"
            ))),
        }
    }
}

/// Per-user key/mode storage.
pub trait PreferenceStore {
    /// `Ok(None)` when the user has never set `key`.
    fn load(&self, key: &str) -> Result<Option<PreferenceMode>, CollaboratorError>;

    fn save(&mut self, key: &str, mode: PreferenceMode) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: AHashMap<String, PreferenceMode>,
    authenticated: bool,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self {
            values: AHashMap::new(),
            authenticated: true,
        }
    }

    /// A store whose every call fails as if nobody were signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> Result<Option<PreferenceMode>, CollaboratorError> {
        if !self.authenticated {
            return Err(CollaboratorError::Unauthenticated);
        }
        Ok(self.values.get(key).copied())
    }

    fn save(&mut self, key: &str, mode: PreferenceMode) -> Result<(), CollaboratorError> {
        if !self.authenticated {
            return Err(CollaboratorError::Unauthenticated);
        }
        self.values.insert(key.to_string(), mode);
        Ok(())
    }
}

/// A single preference value that never fails its reader.
#[derive(Debug, Clone)]
pub struct UserPreference {
    key: String,
    mode: PreferenceMode,
}

impl UserPreference {
    /// Load `key`, falling back to `default` when nothing is stored or the
    /// store cannot be reached.
    pub fn load(store: &dyn PreferenceStore, key: &str, default: PreferenceMode) -> Self {
        let mode = match store.load(key) {
            Ok(Some(mode)) => mode,
            Ok(None) => default,
            Err(CollaboratorError::Unauthenticated) => {
                debug!(key, "No signed-in user; using default preference");
                default
            }
            Err(e) => {
                warn!(key, error = %e, "Could not load preference; using default");
                default
            }
        };
        Self {
            key: key.to_string(),
            mode,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mode(&self) -> PreferenceMode {
        self.mode
    }

    /// Save a new mode and return the mode now in effect.
    ///
    /// Without a signed-in user the value only lives in memory. Any other
    /// failure keeps the previous value.
    pub fn set(&mut self, store: &mut dyn PreferenceStore, mode: PreferenceMode) -> PreferenceMode {
        match store.save(&self.key, mode) {
            Ok(()) | Err(CollaboratorError::Unauthenticated) => self.mode = mode,
            Err(e) => warn!(key = %self.key, error = %e, "Could not save preference"),
        }
        self.mode
    }
}
