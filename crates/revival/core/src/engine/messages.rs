//! User-facing notification catalog.

use std::time::Duration;

use crate::config::RevivalConfig;
use crate::cooldown;
use crate::host::{Notification, NotificationColor};

pub(super) fn critical(config: &RevivalConfig) -> Notification {
    Notification::new(
        format!(
            "CRITICAL CONDITION! Press {} to use your {}!",
            config.revival_key, config.item_name
        ),
        NotificationColor::Red,
    )
    .persistent()
}

pub(super) fn on_cooldown(remaining: Duration) -> Notification {
    Notification::new(
        format!(
            "Revival on cooldown! Available in {} seconds",
            cooldown::display_seconds(remaining)
        ),
        NotificationColor::Yellow,
    )
    .alert()
}

pub(super) fn missing_item(config: &RevivalConfig) -> Notification {
    Notification::new(
        format!("No {} found! Unable to revive!", config.item_name),
        NotificationColor::Red,
    )
    .alert()
}

pub(super) fn revived(config: &RevivalConfig) -> Notification {
    Notification::new(
        format!(
            "{} used successfully! You are temporarily invulnerable.",
            capitalize(&config.item_name)
        ),
        NotificationColor::Green,
    )
}

pub(super) fn invulnerability_ended() -> Notification {
    Notification::new(
        "Temporary invulnerability has ended.",
        NotificationColor::White,
    )
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
