use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::{runtime::Handle, sync::watch};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);
/// Time a hidden notification is kept around for its exit transition.
pub const EXIT_WINDOW: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "✔",
            NotificationKind::Error => "✖",
            NotificationKind::Warning => "!",
            NotificationKind::Info => "i",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub message: String,
    /// Zero keeps the notification until it is dismissed.
    pub duration: Duration,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind.icon())?;
        if let Some(title) = &self.title {
            write!(f, "{title}: ")?;
        }
        f.write_str(&self.message)
    }
}

/// Render the visible stack, most recent on top.
pub fn render_stack(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .map(|notification| format!("[{}] {notification}", notification.kind.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug)]
struct Entry {
    notification: Notification,
    leaving: bool,
}

/// Handle on the active notification list. Clones share the same list.
///
/// Expiry timers run on the ambient tokio runtime; outside a runtime,
/// notifications stay until dismissed.
#[derive(Clone, Debug)]
pub struct NotificationCenter {
    entries: Arc<Mutex<Vec<Entry>>>,
    visible: Arc<watch::Sender<Vec<Notification>>>,
    default_duration: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl NotificationCenter {
    pub fn new(default_duration: Duration) -> Self {
        let (visible, _) = watch::channel(Vec::new());
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            visible: Arc::new(visible),
            default_duration,
        }
    }

    /// Push a notification to the front of the list. Returns its id so the
    /// caller can dismiss it early.
    pub fn emit(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        title: Option<String>,
        duration: Option<Duration>,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            title,
            message: message.into(),
            duration: duration.unwrap_or(self.default_duration),
        };
        let id = notification.id;
        let lifetime = notification.duration;
        debug!(%id, kind = kind.as_str(), message = %notification.message, "notification emitted");
        {
            let mut entries = self.lock();
            entries.insert(
                0,
                Entry {
                    notification,
                    leaving: false,
                },
            );
            self.publish(&entries);
        }

        if !lifetime.is_zero() {
            match Handle::try_current() {
                Ok(handle) => {
                    let center = self.clone();
                    handle.spawn(async move {
                        tokio::time::sleep(lifetime).await;
                        center.dismiss(id);
                    });
                }
                Err(_) => warn!(%id, "no runtime for notification timer; it stays until dismissed"),
            }
        }
        id
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.emit(NotificationKind::Success, message, None, None)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.emit(NotificationKind::Error, message, None, None)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.emit(NotificationKind::Warning, message, None, None)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.emit(NotificationKind::Info, message, None, None)
    }

    /// Hide a notification now and drop it once its exit window has passed.
    /// Returns false when the id is unknown or already leaving.
    pub fn dismiss(&self, id: Uuid) -> bool {
        {
            let mut entries = self.lock();
            let Some(entry) = entries
                .iter_mut()
                .find(|entry| entry.notification.id == id && !entry.leaving)
            else {
                return false;
            };
            entry.leaving = true;
            self.publish(&entries);
        }

        match Handle::try_current() {
            Ok(handle) => {
                let center = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(EXIT_WINDOW).await;
                    center.purge(id);
                });
            }
            Err(_) => self.purge(id),
        }
        true
    }

    /// Visible notifications, most recent first.
    pub fn active(&self) -> Vec<Notification> {
        self.visible.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.visible.subscribe()
    }

    /// Entries still held, including those in their exit window.
    pub fn tracked(&self) -> usize {
        self.lock().len()
    }

    fn purge(&self, id: Uuid) {
        self.lock().retain(|entry| entry.notification.id != id);
    }

    /// Must be called with the entries lock held, so concurrent publishers
    /// cannot overwrite a newer list with an older one.
    fn publish(&self, entries: &[Entry]) {
        let visible = entries
            .iter()
            .filter(|entry| !entry.leaving)
            .map(|entry| entry.notification.clone())
            .collect::<Vec<_>>();
        self.visible.send_replace(visible);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
