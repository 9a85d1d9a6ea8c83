use log::warn;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{Database, EventSender, NewNotification, PlatformEvent};

/// Capacity of the outbox. Enqueueing into a full outbox drops the
/// notification instead of blocking the primary operation.
const OUTBOX_CAPACITY: usize = 256;

/// The notification outbox. Callers enqueue, a background worker writes the
/// records and emits a realtime event per delivered notification. Delivery
/// is best effort and never fails the operation that triggered it.
#[derive(Clone)]
pub struct Notifier {
    sender: mpsc::Sender<NewNotification>,
}

impl Notifier {
    /// Spawns the outbox worker and returns the enqueue handle
    pub fn spawn<Db>(db: &Arc<Db>, events: EventSender) -> Self
    where
        Db: Database,
    {
        let (sender, mut receiver) = mpsc::channel(OUTBOX_CAPACITY);
        let db = db.clone();

        tokio::spawn(async move {
            while let Some(new_notification) = receiver.recv().await {
                match db.create_notification(new_notification).await {
                    Ok(notification) => {
                        let _ = events.send(PlatformEvent::NotificationCreated { notification });
                    }
                    Err(e) => warn!("Failed to deliver notification: {e}"),
                }
            }
        });

        Self { sender }
    }

    pub fn enqueue(&self, new_notification: NewNotification) {
        if let Err(e) = self.sender.try_send(new_notification) {
            warn!("Notification dropped: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDatabase;
    use crate::{NotificationKind, PlatformEvent};
    use std::time::Duration;

    fn announcement(title: &str) -> NewNotification {
        NewNotification {
            title: title.to_string(),
            message: "message".to_string(),
            kind: NotificationKind::Info,
            target_user_id: None,
        }
    }

    #[tokio::test]
    async fn test_outbox_delivers_to_the_database() {
        let db = Arc::new(MemoryDatabase::default());
        let (sender, events) = crossbeam::channel::unbounded();

        let notifier = Notifier::spawn(&db, sender);
        notifier.enqueue(announcement("hello"));

        // The worker runs concurrently, so poll until it has drained
        let mut delivered = vec![];
        for _ in 0..100 {
            delivered = db.notifications_for_user(1).await.expect("lists");

            if !delivered.is_empty() {
                break;
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].title, "hello");
        assert_eq!(delivered[0].target_user_id, None, "announcement is a broadcast");

        let event = events.try_recv().expect("delivery emits an event");
        assert!(matches!(event, PlatformEvent::NotificationCreated { .. }));
    }
}
