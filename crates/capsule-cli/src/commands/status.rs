use capsule_core::{AccessController, AccessState, CapsuleStore};
use chrono::Utc;

use crate::common;

pub fn run(id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let id = common::parse_id(id)?;
    let store = common::open_store()?;
    let item = store.fetch(id)?;

    let now = Utc::now();
    let access = AccessController::resolve(now, item.unlock_at());
    let remaining = AccessController::remaining(now, item.unlock_at());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "id": item.id,
                "access": access,
                "unlock_at": item.unlock_at(),
                "remaining_ms": AccessController::remaining_ms(now, item.unlock_at()),
                "viewed": item.viewed,
                "viewed_at": item.viewed_at,
            }))?
        );
        return Ok(());
    }

    match access {
        AccessState::Locked => {
            println!(
                "Locked. Unlocks {} (in {}).",
                item.unlock_at(),
                common::format_duration(remaining)
            );
        }
        AccessState::Unlocked => {
            if item.viewed {
                println!("Unlocked, already viewed.");
            } else {
                println!("Unlocked. Run `capsule open {}` to reveal it.", item.id);
            }
        }
    }
    Ok(())
}
