//! # Event Loop
//!
//! Drains the channel fed by the transport adapter and runs one handler at a time,
//! in arrival order. Each event is fully processed (join, webhook call, acknowledgement)
//! before the next one is taken, so the membership store has a single writer and no locks.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::dispatcher::MessageDispatcher;
use crate::application::invite::InviteHandler;
use crate::domain::types::IncomingEvent;
use crate::strings::logs;

const RECENT_EVENT_CAPACITY: usize = 1024;

/// Bounded memory of processed event ids.
#[derive(Debug, Default)]
struct RecentEvents {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RecentEvents {
    /// Returns false if the id was already seen.
    fn insert(&mut self, event_id: &str) -> bool {
        if !self.seen.insert(event_id.to_string()) {
            return false;
        }
        self.order.push_back(event_id.to_string());
        if self.order.len() > RECENT_EVENT_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }
}

pub struct EventLoop {
    invites: InviteHandler,
    dispatcher: MessageDispatcher,
    recent: RecentEvents,
}

impl EventLoop {
    pub fn new(invites: InviteHandler, dispatcher: MessageDispatcher) -> Self {
        Self {
            invites,
            dispatcher,
            recent: RecentEvents::default(),
        }
    }

    /// Runs until every sender of the channel is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<IncomingEvent>) {
        tracing::info!("{}", logs::EVENT_LOOP_START);
        while let Some(event) = events.recv().await {
            self.process(event).await;
        }
        tracing::info!("{}", logs::EVENT_LOOP_STOP);
    }

    pub async fn process(&mut self, event: IncomingEvent) {
        if let Some(id) = event.event_id() {
            if !self.recent.insert(id) {
                tracing::debug!("Skipping duplicate event {}", id);
                return;
            }
        }

        match event {
            IncomingEvent::RoomInvite { room_id } => {
                self.invites.handle(&room_id).await;
            }
            IncomingEvent::RoomMessage { message, .. } => {
                if !self.invites.is_joined(&message.room_id) {
                    tracing::debug!("Message in unmonitored room {}", message.room_id);
                    return;
                }
                self.dispatcher.handle(&message).await;
            }
        }
    }
}

/// Waits for a spawned loop to finish what is already queued once its senders are gone.
/// Returns false if it is still running after `grace` or ended abnormally.
pub async fn drain(event_loop: JoinHandle<()>, grace: Duration) -> bool {
    tracing::info!("{}", logs::EVENT_LOOP_DRAIN);
    match tokio::time::timeout(grace, event_loop).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!("{}", logs::event_loop_fail(&e.to_string()));
            false
        }
        Err(_) => {
            tracing::warn!("{}", logs::event_loop_drain_timeout(grace.as_secs()));
            false
        }
    }
}
