//! Push payloads and notifications.
//!
//! A push message is parsed as JSON; a payload that fails to parse becomes
//! the plain-text body of an otherwise default notification. Display never
//! fails for lack of fields.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::WorkerConfig;

/// Action identifier for "view" buttons.
pub const ACTION_VIEW: &str = "view";
/// Action identifier for "dismiss" buttons.
pub const ACTION_DISMISS: &str = "dismiss";

/// Payload type tag for class reminders.
pub const TYPE_CLASS_REMINDER: &str = "class_reminder";
/// Payload type tag for XP awards.
pub const TYPE_XP_EARNED: &str = "xp_earned";

/// Structured push payload as sent by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub message: Option<String>,
    pub icon: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl PushPayload {
    /// Parse raw push data. Non-JSON data degrades to a plain-text body;
    /// empty data yields an all-defaults payload.
    pub fn parse(data: &[u8]) -> Self {
        if data.is_empty() {
            return Self::default();
        }

        match serde_json::from_slice(data) {
            Ok(payload) => payload,
            Err(_) => Self {
                body: Some(String::from_utf8_lossy(data).into_owned()),
                ..Default::default()
            },
        }
    }
}

/// A button on a displayed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Action identifier reported on click.
    pub action: String,
    /// Button label.
    pub title: String,
}

impl NotificationAction {
    fn new(action: &str, title: &str) -> Self {
        Self {
            action: action.to_string(),
            title: title.to_string(),
        }
    }
}

/// A concrete notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Navigation target retrieved on click.
    pub url: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build a notification from a payload, filling gaps from config
    /// defaults and selecting actions by the payload's type tag.
    pub fn from_payload(config: &WorkerConfig, payload: PushPayload) -> Self {
        let defaults = &config.notifications;

        let actions = match payload.kind.as_deref() {
            Some(TYPE_CLASS_REMINDER) => vec![
                NotificationAction::new(ACTION_VIEW, "Ver Agendamento"),
                NotificationAction::new(ACTION_DISMISS, "Dispensar"),
            ],
            Some(TYPE_XP_EARNED) => vec![
                NotificationAction::new(ACTION_VIEW, "Ver XP"),
                NotificationAction::new(ACTION_DISMISS, "OK"),
            ],
            _ => Vec::new(),
        };

        Self {
            title: payload.title.unwrap_or_else(|| defaults.title.clone()),
            body: payload
                .body
                .or(payload.message)
                .unwrap_or_else(|| defaults.body.clone()),
            icon: payload.icon.unwrap_or_else(|| defaults.icon.clone()),
            badge: defaults.badge.clone(),
            vibrate: defaults.vibrate.clone(),
            url: payload.url.unwrap_or_else(|| defaults.url.clone()),
            actions,
        }
    }
}

/// What a notification click resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Notification closed, no navigation.
    Dismissed,
    /// An existing page was focused.
    Focused(String),
    /// A new page was opened.
    Opened(Url),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorkerConfig {
        WorkerConfig::for_scope(Url::parse("https://studio.example/").unwrap())
    }

    #[test]
    fn test_xp_earned_actions() {
        let payload =
            PushPayload::parse(br#"{"type":"xp_earned","title":"XP!","body":"+50 XP"}"#);
        let notification = Notification::from_payload(&config(), payload);

        assert_eq!(notification.title, "XP!");
        assert_eq!(notification.body, "+50 XP");
        assert_eq!(
            notification.actions,
            vec![
                NotificationAction::new(ACTION_VIEW, "Ver XP"),
                NotificationAction::new(ACTION_DISMISS, "OK"),
            ]
        );
    }

    #[test]
    fn test_class_reminder_actions() {
        let payload = PushPayload::parse(
            br#"{"type":"class_reminder","title":"Aula","body":"HIIT em 30 minutos","url":"/student/schedule"}"#,
        );
        let notification = Notification::from_payload(&config(), payload);

        assert_eq!(notification.url, "/student/schedule");
        assert_eq!(notification.actions[0].action, ACTION_VIEW);
        assert_eq!(notification.actions[0].title, "Ver Agendamento");
        assert_eq!(notification.actions[1].action, ACTION_DISMISS);
    }

    #[test]
    fn test_unknown_type_has_no_actions() {
        let payload = PushPayload::parse(br#"{"type":"promo","body":"Nova modalidade"}"#);
        let notification = Notification::from_payload(&config(), payload);
        assert!(notification.actions.is_empty());
    }

    #[test]
    fn test_missing_type_has_no_actions() {
        let payload = PushPayload::parse(br#"{"body":"oi"}"#);
        let notification = Notification::from_payload(&config(), payload);
        assert!(notification.actions.is_empty());
    }

    #[test]
    fn test_plain_text_payload_becomes_body() {
        let payload = PushPayload::parse("Bem-vindo".as_bytes());
        let notification = Notification::from_payload(&config(), payload);

        assert_eq!(notification.body, "Bem-vindo");
        assert_eq!(notification.title, "Biohacking Studio");
        assert!(notification.actions.is_empty());
    }

    #[test]
    fn test_empty_payload_uses_all_defaults() {
        let payload = PushPayload::parse(b"");
        let notification = Notification::from_payload(&config(), payload);

        assert_eq!(notification.title, "Biohacking Studio");
        assert_eq!(notification.body, "Voce tem uma notificacao!");
        assert_eq!(notification.url, "/student/dashboard");
    }

    #[test]
    fn test_message_field_fills_body() {
        let payload = PushPayload::parse(br#"{"message":"Treino atualizado"}"#);
        let notification = Notification::from_payload(&config(), payload);
        assert_eq!(notification.body, "Treino atualizado");
    }

    #[test]
    fn test_body_wins_over_message() {
        let payload = PushPayload::parse(br#"{"body":"a","message":"b"}"#);
        let notification = Notification::from_payload(&config(), payload);
        assert_eq!(notification.body, "a");
    }

    #[test]
    fn test_icon_default() {
        let payload = PushPayload::parse(br#"{"body":"x"}"#);
        let notification = Notification::from_payload(&config(), payload);
        assert_eq!(notification.icon, "/static/icons/icon-192x192.png");
        assert_eq!(notification.badge, "/static/icons/icon-72x72.png");
        assert_eq!(notification.vibrate, vec![100, 50, 100]);
    }
}
