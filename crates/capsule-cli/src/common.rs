use std::path::PathBuf;

use capsule_core::JsonStore;
use chrono::Duration;
use uuid::Uuid;

/// Open the capsule store. CAPSULE_STORE overrides the default
/// location, mainly for tests and scripting.
pub fn open_store() -> Result<JsonStore, Box<dyn std::error::Error>> {
    match std::env::var("CAPSULE_STORE") {
        Ok(path) => Ok(JsonStore::open(PathBuf::from(path))?),
        Err(_) => Ok(JsonStore::open_default()?),
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
    Uuid::parse_str(raw).map_err(|_| format!("'{raw}' is not a capsule id").into())
}

/// Human countdown, largest two units.
pub fn format_duration(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3600, rem % 3600);
    let (mins, secs) = (rem / 60, rem % 60);
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
