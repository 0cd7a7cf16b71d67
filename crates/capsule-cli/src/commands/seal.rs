use capsule_core::{CapsuleStore, OwnerRole, SealedItem};
use chrono::{DateTime, Duration, Utc};
use clap::Args;

use crate::common;

#[derive(Args)]
pub struct SealArgs {
    /// Message to seal
    #[arg(long)]
    message: String,
    /// Unlock after this many minutes from now
    #[arg(long, conflicts_with = "unlock_at")]
    unlock_in: Option<i64>,
    /// Absolute unlock time, RFC 3339 (e.g. 2027-01-01T00:00:00Z)
    #[arg(long)]
    unlock_at: Option<String>,
    /// Media reference to attach
    #[arg(long)]
    asset: Option<String>,
    /// Store the capsule as seen by its sender
    #[arg(long)]
    as_sender: bool,
    /// Print the sealed capsule as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: SealArgs) -> Result<(), Box<dyn std::error::Error>> {
    let unlock_at: DateTime<Utc> = match (&args.unlock_at, args.unlock_in) {
        (Some(raw), _) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid --unlock-at: {e}"))?
            .with_timezone(&Utc),
        (None, Some(minutes)) => Utc::now() + Duration::minutes(minutes),
        (None, None) => Utc::now() + Duration::minutes(60),
    };

    let role = if args.as_sender {
        OwnerRole::Sender
    } else {
        OwnerRole::Receiver
    };

    let item = SealedItem::new(args.message, unlock_at, role, args.asset);
    let mut store = common::open_store()?;
    store.insert(item.clone())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("Sealed capsule {} (unlocks {})", item.id, item.unlock_at());
    }
    Ok(())
}
