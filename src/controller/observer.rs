// ABOUTME: Completion sink a state uses to report its outcome to the controller.
// ABOUTME: DockerError waits until the controller has run recovery.

use crate::types::EventType;
use tokio::sync::{mpsc, oneshot};

/// An event raised by a state, with an optional acknowledgement slot.
#[derive(Debug)]
pub struct Notification {
    pub event: EventType,
    ack: Option<oneshot::Sender<()>>,
}

impl Notification {
    /// Release the state waiting on this event, if any.
    pub fn acknowledge(self) {
        if let Some(ack) = self.ack {
            let _ = ack.send(());
        }
    }
}

#[derive(Debug, Clone)]
pub struct Observer {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Observer {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// An observer nobody listens to. Events sent to it are discarded.
    pub fn disconnected() -> Self {
        Self::channel().0
    }

    /// Report `event`. Returns once the event is queued, except for
    /// `DockerError`, which returns after the controller acknowledges it.
    pub async fn update(&self, event: EventType) {
        if event != EventType::DockerError {
            let _ = self.tx.send(Notification { event, ack: None });
            return;
        }

        let (ack, acked) = oneshot::channel();
        if self
            .tx
            .send(Notification {
                event,
                ack: Some(ack),
            })
            .is_ok()
        {
            let _ = acked.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finish_is_queued_without_waiting() {
        let (observer, mut rx) = Observer::channel();
        observer.update(EventType::Finish).await;
        assert_eq!(rx.recv().await.unwrap().event, EventType::Finish);
    }

    #[tokio::test]
    async fn docker_error_waits_for_acknowledgement() {
        let (observer, mut rx) = Observer::channel();
        let controller = tokio::spawn(async move {
            let notification = rx.recv().await.unwrap();
            assert_eq!(notification.event, EventType::DockerError);
            notification.acknowledge();
        });

        observer.update(EventType::DockerError).await;
        controller.await.unwrap();
    }

    #[tokio::test]
    async fn closed_controller_does_not_block() {
        let (observer, rx) = Observer::channel();
        drop(rx);
        observer.update(EventType::DockerError).await;
    }
}
