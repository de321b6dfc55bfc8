use futures::{stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::Notification;
use crate::services::PushDispatcher;

/// Emitted after a notification has been stored
#[derive(Debug, Clone)]
pub struct NotificationCreated {
    pub notification: Notification,
}

/// Producer side of the notification-created queue.
///
/// A disabled instance (no push backend) drops every event.
#[derive(Debug, Clone)]
pub struct NotificationEvents {
    tx: Option<mpsc::Sender<NotificationCreated>>,
}

impl NotificationEvents {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NotificationCreated>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Queue a fan-out. Returns whether the event was accepted; a full or
    /// closed queue drops it and the notification stays stored unpushed.
    pub fn publish(&self, notification: Notification) -> bool {
        let Some(tx) = &self.tx else {
            debug!("Push disabled, not dispatching notification {}", notification.id);
            return false;
        };

        let id = notification.id;
        match tx.try_send(NotificationCreated { notification }) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Push queue full, dropping dispatch of notification {}", id);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Push queue closed, dropping dispatch of notification {}", id);
                false
            }
        }
    }
}

/// Drain the queue, running up to `max_in_flight` fan-outs at once so one
/// slow recipient does not hold up the others. Stops once every producer is
/// gone and the fan-outs already started have finished.
pub fn spawn_dispatch_worker(
    rx: mpsc::Receiver<NotificationCreated>,
    dispatcher: PushDispatcher,
    max_in_flight: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Push dispatch worker started (max {} in flight)", max_in_flight.max(1));

        let events = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        events
            .for_each_concurrent(max_in_flight.max(1), |event| {
                let dispatcher = dispatcher.clone();
                async move {
                    dispatcher.dispatch(&event.notification).await;
                }
            })
            .await;

        info!("Push dispatch worker stopped");
    })
}
