//! EmailSender processor.
//!
//! The EmailSender is responsible for:
//! - Receiving `EmailEvent` from the queue
//! - Rendering the `OutboundEmail` for each event
//! - Handing it to the configured `Notifier`, once
//! - Logging the outcome
//!
//! Delivery is best-effort. A failed send is logged and dropped; nothing is
//! written back to the store.

use crate::events::{EmailEvent, EmailEventReceiver};
use crate::notifier::{Notifier, OutboundEmail};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// EmailSender drains the email queue into a [`Notifier`].
pub struct EmailSender {
    notifier: Arc<dyn Notifier>,
    email_rx: EmailEventReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl EmailSender {
    /// Create a new EmailSender.
    ///
    /// # Arguments
    ///
    /// * `notifier` - Delivery backend
    /// * `email_rx` - Receiver for EmailEvent events
    /// * `shutdown_rx` - Receiver for shutdown signal
    pub fn new(
        notifier: Arc<dyn Notifier>,
        email_rx: EmailEventReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            notifier,
            email_rx,
            shutdown_rx,
        }
    }

    /// Run the EmailSender until shutdown or until every sender is dropped.
    pub async fn run(mut self) {
        info!("EmailSender started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    // A dropped shutdown sender counts as a shutdown request.
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("EmailSender received shutdown signal");
                        break;
                    }
                }

                event = self.email_rx.recv() => match event {
                    Some(event) => {
                        debug!(event = ?event, "Received EmailEvent");
                        self.process_event(event).await;
                    }
                    None => {
                        info!("EmailEvent channel closed");
                        break;
                    }
                },
            }
        }

        // Decisions already committed still get their attempt.
        self.email_rx.close();
        while let Ok(event) = self.email_rx.try_recv() {
            self.process_event(event).await;
        }

        info!("EmailSender shutdown complete");
    }

    async fn process_event(&self, event: EmailEvent) {
        match event {
            EmailEvent::RequestDecided {
                request_id,
                disposal_id,
                receiver_email,
                status,
            } => {
                let email = OutboundEmail::request_decided(receiver_email, disposal_id, status);
                match self.notifier.send(&email).await {
                    Ok(()) => {
                        info!(request_id, to = %email.to, "Decision email sent");
                    }
                    Err(e) => {
                        warn!(
                            request_id,
                            to = %email.to,
                            error = %e,
                            "Decision email delivery failed"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::RequestStatus;
    use crate::events::email_event_channel;
    use crate::notifier::NotifierError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every email and fails for addresses in `failing`.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub sent: Mutex<Vec<OutboundEmail>>,
        pub failing: Vec<String>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, email: &OutboundEmail) -> Result<(), NotifierError> {
            if self.failing.contains(&email.to) {
                return Err(NotifierError::Transport("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn decided(request_id: i64, to: &str) -> EmailEvent {
        EmailEvent::RequestDecided {
            request_id,
            disposal_id: 7,
            receiver_email: to.to_string(),
            status: RequestStatus::Rejected,
        }
    }

    #[tokio::test]
    async fn test_delivers_queued_events_until_channel_closes() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (tx, rx) = email_event_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        tx.send(decided(1, "ana@example.com")).await.unwrap();
        tx.send(decided(2, "ben@example.com")).await.unwrap();
        drop(tx);

        EmailSender::new(notifier.clone(), rx, shutdown_rx).run().await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "ana@example.com");
        assert_eq!(sent[0].subject, "Your E-Waste Request has been Rejected");
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_stop_the_loop() {
        let notifier = Arc::new(RecordingNotifier {
            failing: vec!["broken@example.com".to_string()],
            ..Default::default()
        });
        let (tx, rx) = email_event_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        tx.send(decided(1, "broken@example.com")).await.unwrap();
        tx.send(decided(2, "ana@example.com")).await.unwrap();
        drop(tx);

        EmailSender::new(notifier.clone(), rx, shutdown_rx).run().await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ana@example.com");
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_events() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (tx, rx) = email_event_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tx.send(decided(1, "ana@example.com")).await.unwrap();
        shutdown_tx.send(true).unwrap();

        EmailSender::new(notifier.clone(), rx, shutdown_rx).run().await;

        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
        assert!(tx.is_closed());
    }
}
