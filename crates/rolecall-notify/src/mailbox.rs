//! In-memory mailboxes with an optional live feed per recipient.

use std::pin::Pin;

use dashmap::DashMap;
use futures::Stream;
use rolecall_storage::UserId;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::{Notification, NotificationId, NotifyError};

pub const DEFAULT_FEED_CAPACITY: usize = 100;

/// Stream of notifications published to one recipient
pub type NotificationStream = Pin<Box<dyn Stream<Item = Notification> + Send>>;

/// Process-scoped notification mailboxes.
///
/// Mailboxes grow monotonically: there is no deletion API. Appends to
/// different recipients never contend beyond the map's shard locks.
pub struct NotificationStore {
    mailboxes: DashMap<UserId, Vec<Notification>>,
    owners: DashMap<NotificationId, UserId>,
    feeds: DashMap<UserId, broadcast::Sender<Notification>>,
    feed_capacity: usize,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::with_feed_capacity(DEFAULT_FEED_CAPACITY)
    }

    /// Buffer size of each live feed; slower subscribers skip ahead.
    pub fn with_feed_capacity(feed_capacity: usize) -> Self {
        Self {
            mailboxes: DashMap::new(),
            owners: DashMap::new(),
            feeds: DashMap::new(),
            feed_capacity: feed_capacity.max(1),
        }
    }

    /// Append a notification to its recipient's mailbox.
    pub fn publish(&self, notification: Notification) -> NotificationId {
        let id = notification.id;
        let recipient = notification.recipient_id;
        debug!(
            notification_id = %id,
            recipient = %recipient,
            kind = %notification.kind,
            "publishing notification"
        );

        // Anything handed out by `list` or the feed must already resolve by id
        self.owners.insert(id, recipient);
        self.mailboxes
            .entry(recipient)
            .or_default()
            .push(notification.clone());
        if let Some(feed) = self.feeds.get(&recipient) {
            // No receivers left is fine
            let _ = feed.send(notification);
        }
        id
    }

    /// Snapshot of a mailbox, most recent first.
    pub fn list(&self, user_id: &UserId) -> Vec<Notification> {
        self.mailboxes
            .get(user_id)
            .map(|mailbox| mailbox.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Unread notifications, most recent first.
    pub fn list_unread(&self, user_id: &UserId) -> Vec<Notification> {
        self.mailboxes
            .get(user_id)
            .map(|mailbox| mailbox.iter().rev().filter(|n| !n.read).cloned().collect())
            .unwrap_or_default()
    }

    pub fn unread_count(&self, user_id: &UserId) -> usize {
        self.mailboxes
            .get(user_id)
            .map(|mailbox| mailbox.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    pub fn get(&self, id: &NotificationId) -> Result<Notification, NotifyError> {
        let owner = *self.owners.get(id).ok_or(NotifyError::NotFound(*id))?;
        self.mailboxes
            .get(&owner)
            .and_then(|mailbox| mailbox.iter().find(|n| n.id == *id).cloned())
            .ok_or(NotifyError::NotFound(*id))
    }

    /// Mark one notification read. Marking it again is a no-op.
    pub fn mark_read(&self, id: &NotificationId) -> Result<(), NotifyError> {
        let owner = *self.owners.get(id).ok_or(NotifyError::NotFound(*id))?;
        let mut mailbox = self
            .mailboxes
            .get_mut(&owner)
            .ok_or(NotifyError::NotFound(*id))?;
        let notification = mailbox
            .iter_mut()
            .find(|n| n.id == *id)
            .ok_or(NotifyError::NotFound(*id))?;
        notification.read = true;
        Ok(())
    }

    /// Mark every notification of a user read; returns how many changed.
    pub fn mark_all_read(&self, user_id: &UserId) -> usize {
        let Some(mut mailbox) = self.mailboxes.get_mut(user_id) else {
            return 0;
        };
        let mut changed = 0;
        for notification in mailbox.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        changed
    }

    /// Live feed of notifications published to `user_id` from now on.
    ///
    /// Earlier notifications are not replayed; use [`list`](Self::list) to
    /// resynchronize after subscribing or after falling behind.
    pub fn subscribe(&self, user_id: &UserId) -> NotificationStream {
        let rx = self
            .feeds
            .entry(*user_id)
            .or_insert_with(|| broadcast::channel(self.feed_capacity).0)
            .subscribe();

        // Lagged receivers drop the missed items and keep going
        let stream = BroadcastStream::new(rx).filter_map(|result| result.ok());
        Box::pin(stream)
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
