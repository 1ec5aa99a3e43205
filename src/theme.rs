//! Light/dark theme preference persisted under the `theme` key.
//!
//! On startup the stored preference wins; if there is none (or it is not a
//! theme we know), the system preference decides. The resolved theme is
//! written back at once so every context agrees on it.

use crate::accessor::StorageAccessor;
use crate::store::KeyValueStore;
use crate::GuardpostError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Store key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background.
    Light,
    /// Dark background.
    Dark,
}

impl Theme {
    /// Theme matching the system color-scheme preference.
    pub fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

/// Current theme, kept in sync with the store.
#[derive(Debug)]
pub struct ThemeController {
    accessor: StorageAccessor,
    theme: Theme,
    prefers_dark: bool,
}

impl ThemeController {
    /// Resolve the initial theme and persist it.
    pub fn new(store: Arc<dyn KeyValueStore>, prefers_dark: bool) -> Self {
        let mut accessor = StorageAccessor::new(store, [THEME_KEY]);
        let theme = resolve(&accessor, prefers_dark);
        accessor.set(THEME_KEY, Some(theme.as_str()));

        Self {
            accessor,
            theme,
            prefers_dark,
        }
    }

    /// Current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Persist `theme` and switch to it.
    ///
    /// If the store rejects the write the current theme is kept.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), GuardpostError> {
        self.accessor.try_set(THEME_KEY, Some(theme.as_str()))?;
        self.theme = theme;
        Ok(())
    }

    /// Switch to the other theme, returning it.
    pub fn toggle(&mut self) -> Result<Theme, GuardpostError> {
        let next = self.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Pick up a theme changed by another context.
    ///
    /// Returns `true` if the current theme changed.
    pub fn sync(&mut self) -> bool {
        if !self.accessor.sync() {
            return false;
        }
        let theme = resolve(&self.accessor, self.prefers_dark);
        let changed = theme != self.theme;
        self.theme = theme;
        changed
    }
}

fn resolve(accessor: &StorageAccessor, prefers_dark: bool) -> Theme {
    accessor
        .get(THEME_KEY)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| Theme::from_system(prefers_dark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreChanged};
    use tokio::sync::broadcast;

    /// Store that serves reads but fails every write.
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), GuardpostError> {
            Err(GuardpostError::StoreIO("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), GuardpostError> {
            Err(GuardpostError::StoreIO("read-only".to_string()))
        }

        fn subscribe(&self) -> broadcast::Receiver<StoreChanged> {
            self.inner.subscribe()
        }
    }

    fn controller(store: &MemoryStore, prefers_dark: bool) -> ThemeController {
        ThemeController::new(Arc::new(store.clone()), prefers_dark)
    }

    #[test]
    fn test_theme_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        let parsed: Theme = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(parsed, Theme::Light);
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("Dark".parse::<Theme>().is_err());
    }

    #[test]
    fn test_falls_back_to_system_and_persists() {
        let store = MemoryStore::new();
        let themes = controller(&store, true);

        assert_eq!(themes.theme(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_stored_preference_wins_over_system() {
        let store = MemoryStore::with_entries([(THEME_KEY, "light")]);
        let themes = controller(&store, true);
        assert_eq!(themes.theme(), Theme::Light);
    }

    #[test]
    fn test_unknown_stored_value_is_replaced() {
        let store = MemoryStore::with_entries([(THEME_KEY, "sepia")]);
        let themes = controller(&store, false);

        assert_eq!(themes.theme(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_toggle_persists() {
        let store = MemoryStore::new();
        let mut themes = controller(&store, false);

        assert_eq!(themes.toggle().unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(themes.toggle().unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_failed_write_keeps_current_theme() {
        let store = ReadOnlyStore {
            inner: MemoryStore::with_entries([(THEME_KEY, "light")]),
        };
        let mut themes = ThemeController::new(Arc::new(store), true);
        assert_eq!(themes.theme(), Theme::Light);

        let result = themes.set_theme(Theme::Dark);
        assert!(matches!(result, Err(GuardpostError::StoreIO(_))));
        assert_eq!(themes.theme(), Theme::Light);

        assert!(themes.toggle().is_err());
        assert_eq!(themes.theme(), Theme::Light);
    }

    #[test]
    fn test_sync_follows_other_context() {
        let store = MemoryStore::new();
        let mut ours = controller(&store, false);
        let mut theirs = controller(&store, false);
        ours.sync();

        theirs.set_theme(Theme::Dark).unwrap();

        assert!(ours.sync());
        assert_eq!(ours.theme(), Theme::Dark);
        assert!(!ours.sync());
    }

    #[test]
    fn test_sync_after_removal_uses_system_preference() {
        let store = MemoryStore::new();
        let mut themes = controller(&store, true);
        themes.set_theme(Theme::Light).unwrap();
        themes.sync();

        store.remove(THEME_KEY).unwrap();

        assert!(themes.sync());
        assert_eq!(themes.theme(), Theme::Dark);
    }
}
