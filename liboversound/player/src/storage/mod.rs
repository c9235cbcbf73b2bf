mod file_store;
mod memory_store;
mod storage_error;

pub use file_store::*;
pub use memory_store::*;
pub use storage_error::*;

use eyre::Result;
use tap::TapFallible;
use tracing::warn;

use crate::settings::clamp_volume;

pub const VOLUME_KEY: &str = "oversound_volume";

/// Durable client-side key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Restores the persisted volume, clamped to `[0, 1]`.
pub(crate) fn load_volume(store: &dyn KeyValueStore, default_volume: f32) -> f32 {
    let default_volume = clamp_volume(default_volume, 1.0);
    match store.get(VOLUME_KEY) {
        Some(saved) => match saved.parse::<f32>() {
            Ok(volume) => clamp_volume(volume, default_volume),
            Err(_) => {
                warn!("Ignoring unreadable saved volume {saved:?}");
                default_volume
            }
        },
        None => default_volume,
    }
}

pub(crate) fn save_volume(store: &dyn KeyValueStore, volume: f32) {
    let _ = store
        .set(VOLUME_KEY, &volume.to_string())
        .tap_err(|e| warn!("Error persisting volume: {e:?}"));
}
