//! FILENAME: core/geo/src/icons.rs
//! PURPOSE: Per-colour marker icon descriptors, created once and shared.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Default pin scale.
pub const ICON_SCALE: f64 = 1.2;

/// Pin anchor: bottom centre of a 24x24 glyph.
pub const ICON_ANCHOR: (u32, u32) = (12, 24);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerIcon {
    pub color: String,
    pub scale: f64,
    pub anchor: (u32, u32),
}

/// Memoises one icon per colour. Owned by whoever renders markers and
/// shared through `Arc`.
#[derive(Debug, Default)]
pub struct IconCache {
    icons: Mutex<FxHashMap<String, Arc<MarkerIcon>>>,
}

impl IconCache {
    pub fn new() -> Self {
        IconCache::default()
    }

    /// Returns the icon for `color`, creating it on first use.
    pub fn get_or_create(&self, color: &str) -> Arc<MarkerIcon> {
        let mut icons = match self.icons.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(icon) = icons.get(color) {
            return Arc::clone(icon);
        }
        let icon = Arc::new(MarkerIcon {
            color: color.to_string(),
            scale: ICON_SCALE,
            anchor: ICON_ANCHOR,
        });
        icons.insert(color.to_string(), Arc::clone(&icon));
        icon
    }

    pub fn len(&self) -> usize {
        self.icons.lock().map(|icons| icons.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut icons) = self.icons.lock() {
            icons.clear();
        }
    }
}
