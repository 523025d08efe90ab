// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! In-process delivery of media events to the index synchronizer.
//!
//! Producers hand events to an [`EventPublisher`]; a single [`EventWorker`]
//! drains the bounded queue in order and owns the retry policy.

use crate::error::DiscoveryError;
use crate::models::event::MediaEvent;
use crate::services::synchronizer::IndexSynchronizer;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::sleep;

/// Attempts per event before it is dropped
pub const MAX_DELIVERY_ATTEMPTS: u32 = 5;

/// Base delay between attempts, multiplied by the attempt number
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Create a bounded event queue
pub fn event_queue(capacity: usize) -> (EventPublisher, mpsc::Receiver<MediaEvent>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (EventPublisher { sender }, receiver)
}

/// Producer side of the event queue
#[derive(Clone)]
pub struct EventPublisher {
    sender: mpsc::Sender<MediaEvent>,
}

impl EventPublisher {
    /// Enqueue without waiting. A full queue is reported instead of applying
    /// backpressure to the caller.
    pub fn publish(&self, event: MediaEvent) -> Result<(), DiscoveryError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(event) => {
                tracing::warn!(media_id = event.media_id(), event = event.kind(), "media event queue full");
                DiscoveryError::EventQueueFull
            }
            TrySendError::Closed(_) => DiscoveryError::EventQueueClosed,
        })
    }
}

/// Result of delivering one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied { attempts: u32 },
    /// The backend refused the document; redelivery cannot fix it
    Rejected,
    /// Every attempt failed
    Exhausted,
}

pub struct EventWorker {
    receiver: mpsc::Receiver<MediaEvent>,
    synchronizer: IndexSynchronizer,
    backoff: Duration,
}

impl EventWorker {
    pub fn new(receiver: mpsc::Receiver<MediaEvent>, synchronizer: IndexSynchronizer) -> Self {
        Self {
            receiver,
            synchronizer,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Drain the queue until every publisher is dropped
    pub async fn start(mut self) {
        tracing::info!("media event worker started");

        while let Some(event) = self.receiver.recv().await {
            self.deliver(&event).await;
        }

        tracing::info!("media event worker stopped");
    }

    pub async fn deliver(&self, event: &MediaEvent) -> Delivery {
        for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
            match self.synchronizer.handle(event).await {
                Ok(()) => return Delivery::Applied { attempts: attempt },
                Err(e) if !e.is_retryable() => {
                    tracing::error!(media_id = event.media_id(), event = event.kind(), error = %e, "media event rejected");
                    return Delivery::Rejected;
                }
                Err(e) if attempt < MAX_DELIVERY_ATTEMPTS => {
                    tracing::info!(
                        media_id = event.media_id(),
                        attempt,
                        max_attempts = MAX_DELIVERY_ATTEMPTS,
                        error = %e,
                        "retrying media event"
                    );
                    sleep(self.backoff * attempt).await;
                }
                Err(e) => {
                    tracing::error!(
                        media_id = event.media_id(),
                        event = event.kind(),
                        occurred_at = %event.occurred_at(),
                        attempts = attempt,
                        error = %e,
                        "giving up on media event, a reindex will repair the index"
                    );
                }
            }
        }
        Delivery::Exhausted
    }
}
