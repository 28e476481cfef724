//! Notification sink and string lookup.
//!
//! Both are injected: the core decides *what* to say (as localization keys)
//! and when, the host decides how keys become text and how text reaches the
//! user.

use std::sync::{Arc, Mutex};

use crate::timer::BreakKind;

pub mod keys {
    pub const WORK_COMPLETE_TITLE: &str = "notification.workComplete.title";
    pub const WORK_COMPLETE_BODY_SHORT: &str = "notification.workComplete.body.short";
    pub const WORK_COMPLETE_BODY_LONG: &str = "notification.workComplete.body.long";
    pub const SESSION_SKIPPED_TITLE: &str = "notification.sessionSkipped.title";
    pub const SESSION_SKIPPED_BODY: &str = "notification.sessionSkipped.body";
    pub const BREAK_COMPLETE_TITLE: &str = "notification.breakComplete.title";
    pub const BREAK_COMPLETE_BODY: &str = "notification.breakComplete.body";
}

/// Fire-and-forget delivery of a user notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str, with_sound: bool);
}

/// `translate(key) -> string`.
pub trait Translate: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

/// Returns keys unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyTranslator;

impl Translate for KeyTranslator {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Built-in English text for the notification keys; other keys pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTranslator;

impl Translate for EnglishTranslator {
    fn translate(&self, key: &str) -> String {
        let text = match key {
            keys::WORK_COMPLETE_TITLE => "Work Session Complete!",
            keys::WORK_COMPLETE_BODY_SHORT => "Great job! Time for a short break.",
            keys::WORK_COMPLETE_BODY_LONG => "Great job! Time for a long break.",
            keys::SESSION_SKIPPED_TITLE => "Session Skipped",
            keys::SESSION_SKIPPED_BODY => {
                "Session skipped. Complete full sessions to water your plant!"
            }
            keys::BREAK_COMPLETE_TITLE => "Break Complete!",
            keys::BREAK_COMPLETE_BODY => "Ready to focus again?",
            other => return other.to_string(),
        };
        text.to_string()
    }
}

/// A notification as title/body keys, before translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub title_key: &'static str,
    pub body_key: &'static str,
}

impl Message {
    pub fn work_complete(next_break: BreakKind) -> Self {
        Self {
            title_key: keys::WORK_COMPLETE_TITLE,
            body_key: match next_break {
                BreakKind::Long => keys::WORK_COMPLETE_BODY_LONG,
                BreakKind::Short => keys::WORK_COMPLETE_BODY_SHORT,
            },
        }
    }

    pub fn session_skipped() -> Self {
        Self {
            title_key: keys::SESSION_SKIPPED_TITLE,
            body_key: keys::SESSION_SKIPPED_BODY,
        }
    }

    pub fn break_complete() -> Self {
        Self {
            title_key: keys::BREAK_COMPLETE_TITLE,
            body_key: keys::BREAK_COMPLETE_BODY,
        }
    }

    pub fn send(&self, notifier: &dyn Notifier, translator: &dyn Translate, with_sound: bool) {
        notifier.notify(
            &translator.translate(self.title_key),
            &translator.translate(self.body_key),
            with_sound,
        );
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _body: &str, _with_sound: bool) {}
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str, with_sound: bool) {
        tracing::info!(title, body, with_sound, "notification");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub title: String,
    pub body: String,
    pub with_sound: bool,
}

/// Keeps every notification. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str, with_sound: bool) {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentNotification {
                title: title.to_string(),
                body: body.to_string(),
                with_sound,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_translate() {
        let upper = |key: &str| key.to_uppercase();
        assert_eq!(upper.translate("a.b"), "A.B");
        assert_eq!(KeyTranslator.translate("a.b"), "a.b");
    }

    #[test]
    fn message_goes_through_translator() {
        let notifier = RecordingNotifier::new();
        Message::work_complete(BreakKind::Long).send(&notifier, &EnglishTranslator, false);
        Message::session_skipped().send(&notifier, &KeyTranslator, true);

        let sent = notifier.sent();
        assert_eq!(sent[0].title, "Work Session Complete!");
        assert_eq!(sent[0].body, "Great job! Time for a long break.");
        assert!(!sent[0].with_sound);
        assert_eq!(sent[1].title, keys::SESSION_SKIPPED_TITLE);
        assert!(sent[1].with_sound);
    }

    #[test]
    fn english_falls_back_to_key() {
        assert_eq!(EnglishTranslator.translate("plant.status.thriving"), "plant.status.thriving");
    }
}
