use crate::state::EntityId;

/// How prominently a notification is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum NotificationSeverity {
    #[default]
    Info,
    Alert,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum NotificationColor {
    Red,
    Yellow,
    Green,
    White,
}

/// How long the host keeps a notification on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum NotificationDuration {
    #[default]
    Long,
    /// Stays until replaced or dismissed by the host.
    Infinite,
}

/// User-facing message emitted by the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notification {
    pub message: String,
    pub severity: NotificationSeverity,
    pub color: NotificationColor,
    pub duration: NotificationDuration,
}

impl Notification {
    pub fn new(message: impl Into<String>, color: NotificationColor) -> Self {
        Self {
            message: message.into(),
            severity: NotificationSeverity::Info,
            color,
            duration: NotificationDuration::Long,
        }
    }

    #[must_use]
    pub fn alert(mut self) -> Self {
        self.severity = NotificationSeverity::Alert;
        self
    }

    #[must_use]
    pub fn persistent(mut self) -> Self {
        self.duration = NotificationDuration::Infinite;
        self
    }
}

/// Fire-and-forget sink for user-facing notifications.
pub trait NotificationPort: Send {
    fn notify(&mut self, entity: &EntityId, notification: Notification);
}
