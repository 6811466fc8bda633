//! First-launch flag.
//!
//! Distinguishes the first run (show the onboarding manual) from later runs
//! (open the main tabs directly).

use crate::repo::kv_store::{KeyValueStore, StoreResult};
use log::info;

/// Storage key shared with earlier app builds.
pub const HAS_LAUNCHED_KEY: &str = "@hasLaunched";
const LAUNCHED_VALUE: &str = "true";

/// Returns `true` until [`mark_launched`] has been persisted.
pub fn is_first_launch(store: &impl KeyValueStore) -> StoreResult<bool> {
    let value = store.get_item(HAS_LAUNCHED_KEY)?;
    Ok(value.as_deref().map(str::trim) != Some(LAUNCHED_VALUE))
}

/// Records that onboarding has been completed.
pub fn mark_launched(store: &impl KeyValueStore) -> StoreResult<()> {
    store.set_item(HAS_LAUNCHED_KEY, LAUNCHED_VALUE)?;
    info!("event=launch_mark module=repo status=ok");
    Ok(())
}
