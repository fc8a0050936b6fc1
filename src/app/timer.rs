// SPDX-License-Identifier: GPL-3.0-only

//! Delayed controller messages
//!
//! The success display timer and the decode hint expiry both post a message
//! back to the controller after a delay. Dropping the handle cancels it.

use crate::app::state::Message;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::debug;

/// Message delivered after a delay unless dropped first
#[derive(Debug)]
pub(crate) struct DelayedMessage {
    handle: AbortHandle,
}

impl DelayedMessage {
    pub(crate) fn schedule(
        delay: Duration,
        message: Message,
        sender: UnboundedSender<Message>,
    ) -> Self {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(message);
        });
        Self {
            handle: task.abort_handle(),
        }
    }
}

impl Drop for DelayedMessage {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Pending timer that closes the session after a success
///
/// The timer posts [`Message::SuccessTimerElapsed`] carrying its generation.
/// Dropping it cancels the timer.
#[derive(Debug)]
pub struct SuccessTimer {
    generation: u64,
    _delivery: DelayedMessage,
}

impl SuccessTimer {
    pub(crate) fn schedule(
        generation: u64,
        delay: Duration,
        sender: UnboundedSender<Message>,
    ) -> Self {
        debug!(generation, delay_ms = delay.as_millis() as u64, "Scheduling success timer");
        Self {
            generation,
            _delivery: DelayedMessage::schedule(
                delay,
                Message::SuccessTimerElapsed { generation },
                sender,
            ),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_with_generation() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let _timer = SuccessTimer::schedule(7, Duration::from_millis(2000), sender);

        match receiver.recv().await {
            Some(Message::SuccessTimerElapsed { generation }) => assert_eq!(generation, 7),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_timer_never_fires() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let timer = SuccessTimer::schedule(1, Duration::from_millis(50), sender);
        drop(timer);

        let result = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await;
        // The aborted task drops its sender, closing the channel.
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_message_waits_for_delay() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let started = tokio::time::Instant::now();
        let _hint = DelayedMessage::schedule(
            Duration::from_millis(1500),
            Message::DecodeHintExpired { activation: 3 },
            sender,
        );

        match receiver.recv().await {
            Some(Message::DecodeHintExpired { activation }) => assert_eq!(activation, 3),
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }
}
