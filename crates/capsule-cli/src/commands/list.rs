use capsule_core::{AccessController, CapsuleStore};
use chrono::Utc;

use crate::common;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = common::open_store()?;
    let items = store.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No capsules sealed yet.");
        return Ok(());
    }

    let now = Utc::now();
    for item in items {
        let access = AccessController::resolve(now, item.unlock_at());
        let state = if item.viewed {
            "viewed".to_string()
        } else {
            format!("{access:?}").to_lowercase()
        };
        println!("{}  [{state}]  {}", item.id, item.message);
    }
    Ok(())
}
