// Runtime on/off switches for the command groups.
//
// Commands are compiled in, so "unloading" an extension means the framework
// check rejects its commands until it is loaded again.

use dashmap::DashMap;
use tracing::info;

pub const MISCELLANEOUS: &str = "cogs.miscellaneous";
pub const OWNER: &str = "cogs.owner";

struct Extension {
    name: &'static str,
    category: &'static str,
    /// Pinned extensions can be reloaded but never unloaded.
    pinned: bool,
}

const EXTENSIONS: &[Extension] = &[
    Extension {
        name: MISCELLANEOUS,
        category: "Miscellaneous",
        pinned: false,
    },
    Extension {
        name: OWNER,
        category: "Owner",
        pinned: true,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtensionError {
    #[error("Extension '{0}' could not be loaded.")]
    NotFound(String),
    #[error("Extension '{0}' is already loaded.")]
    AlreadyLoaded(String),
    #[error("Extension '{0}' has not been loaded.")]
    NotLoaded(String),
    #[error("Extension '{0}' raised an error: {1}")]
    Failed(String, String),
}

impl ExtensionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtensionError::NotFound(_) => "ExtensionNotFound",
            ExtensionError::AlreadyLoaded(_) => "ExtensionAlreadyLoaded",
            ExtensionError::NotLoaded(_) => "ExtensionNotLoaded",
            ExtensionError::Failed(..) => "ExtensionFailed",
        }
    }
}

pub struct ExtensionRegistry {
    loaded: DashMap<&'static str, bool>,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionRegistry {
    /// Every known extension starts loaded.
    pub fn new() -> Self {
        let loaded = DashMap::new();
        for extension in EXTENSIONS {
            loaded.insert(extension.name, true);
        }
        Self { loaded }
    }

    fn find(name: &str) -> Result<&'static Extension, ExtensionError> {
        EXTENSIONS
            .iter()
            .find(|e| e.name == name.trim())
            .ok_or_else(|| ExtensionError::NotFound(name.trim().to_string()))
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.get(name).map(|entry| *entry).unwrap_or(false)
    }

    /// Whether commands of `category` may run. Commands outside any
    /// extension (such as `help`) always may.
    pub fn category_enabled(&self, category: Option<&str>) -> bool {
        let Some(category) = category else {
            return true;
        };
        match EXTENSIONS.iter().find(|e| e.category == category) {
            Some(extension) => self.is_loaded(extension.name),
            None => true,
        }
    }

    pub fn load(&self, name: &str) -> Result<(), ExtensionError> {
        let extension = Self::find(name)?;
        let mut entry = self.loaded.entry(extension.name).or_insert(false);
        if *entry {
            return Err(ExtensionError::AlreadyLoaded(extension.name.to_string()));
        }
        *entry = true;
        info!(extension = extension.name, "Extension loaded");
        Ok(())
    }

    pub fn unload(&self, name: &str) -> Result<(), ExtensionError> {
        let extension = Self::find(name)?;
        if extension.pinned {
            return Err(ExtensionError::Failed(
                extension.name.to_string(),
                "this extension cannot be unloaded".to_string(),
            ));
        }
        let mut entry = self.loaded.entry(extension.name).or_insert(false);
        if !*entry {
            return Err(ExtensionError::NotLoaded(extension.name.to_string()));
        }
        *entry = false;
        info!(extension = extension.name, "Extension unloaded");
        Ok(())
    }

    /// Reloading only checks that the extension is currently loaded; there is
    /// no state to rebuild.
    pub fn reload(&self, name: &str) -> Result<(), ExtensionError> {
        let extension = Self::find(name)?;
        if !self.is_loaded(extension.name) {
            return Err(ExtensionError::NotLoaded(extension.name.to_string()));
        }
        info!(extension = extension.name, "Extension reloaded");
        Ok(())
    }

    /// `(name, loaded)` for every known extension.
    pub fn list(&self) -> Vec<(&'static str, bool)> {
        EXTENSIONS
            .iter()
            .map(|e| (e.name, self.is_loaded(e.name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_starts_loaded() {
        let registry = ExtensionRegistry::new();
        assert_eq!(
            registry.list(),
            vec![(MISCELLANEOUS, true), (OWNER, true)]
        );
    }

    #[test]
    fn test_unload_then_load() {
        let registry = ExtensionRegistry::new();
        registry.unload(MISCELLANEOUS).unwrap();
        assert!(!registry.category_enabled(Some("Miscellaneous")));
        assert_eq!(
            registry.unload(MISCELLANEOUS).unwrap_err().kind(),
            "ExtensionNotLoaded"
        );
        assert_eq!(
            registry.reload(MISCELLANEOUS).unwrap_err().kind(),
            "ExtensionNotLoaded"
        );

        registry.load(MISCELLANEOUS).unwrap();
        assert!(registry.category_enabled(Some("Miscellaneous")));
        assert_eq!(
            registry.load(MISCELLANEOUS).unwrap_err().kind(),
            "ExtensionAlreadyLoaded"
        );
        registry.reload(MISCELLANEOUS).unwrap();
    }

    #[test]
    fn test_unknown_extension() {
        let registry = ExtensionRegistry::new();
        let err = registry.load("cogs.music").unwrap_err();
        assert_eq!(err.kind(), "ExtensionNotFound");
        assert_eq!(err.to_string(), "Extension 'cogs.music' could not be loaded.");
    }

    #[test]
    fn test_owner_extension_is_pinned() {
        let registry = ExtensionRegistry::new();
        let err = registry.unload(OWNER).unwrap_err();
        assert_eq!(err.kind(), "ExtensionFailed");
        assert!(registry.is_loaded(OWNER));
        registry.reload(OWNER).unwrap();
    }

    #[test]
    fn test_uncategorized_commands_are_enabled() {
        let registry = ExtensionRegistry::new();
        registry.unload(MISCELLANEOUS).unwrap();
        assert!(registry.category_enabled(None));
        assert!(registry.category_enabled(Some("Help")));
    }
}
