//! # Invite Handler
//!
//! Accepts room invitations and records the room in the membership store.
//! A room is either not joined or joined; there is no way back (no leave handling).
//! A join whose record could not be written still counts as joined for this process.

use std::collections::HashSet;
use std::sync::Arc;

use crate::application::membership::MembershipStore;
use crate::domain::traits::ChatTransport;
use crate::domain::types::{InviteOutcome, JoinRecord};
use crate::strings::logs;

pub struct InviteHandler {
    transport: Arc<dyn ChatTransport>,
    membership: MembershipStore,
    /// Rooms monitored right now: the stored ones plus every successful join.
    joined: HashSet<String>,
}

impl InviteHandler {
    pub fn new(transport: Arc<dyn ChatTransport>, membership: MembershipStore) -> Self {
        let joined = membership.rooms().iter().cloned().collect();
        Self {
            transport,
            membership,
            joined,
        }
    }

    pub fn is_joined(&self, room_id: &str) -> bool {
        self.joined.contains(room_id)
    }

    /// Joins the room and records it. Never retries: a failed join waits for the next invite.
    pub async fn handle(&mut self, room_id: &str) -> InviteOutcome {
        tracing::info!("{}", logs::invite_received(room_id));

        if let Err(e) = self.transport.join_room(room_id).await {
            tracing::error!("{}", logs::join_invite_fail(room_id, &e.to_string()));
            return InviteOutcome::JoinFailed(e.to_string());
        }
        self.joined.insert(room_id.to_string());

        match self.membership.record_join(room_id) {
            Ok(record) => {
                match record {
                    JoinRecord::Recorded => tracing::info!("{}", logs::join_invite_success(room_id)),
                    JoinRecord::AlreadyRecorded => {
                        tracing::info!("{}", logs::rejoin_known_room(room_id))
                    }
                }
                InviteOutcome::Joined(record)
            }
            Err(e) => {
                tracing::error!("{}", logs::membership_write_fail(room_id, &format!("{e:#}")));
                InviteOutcome::JoinedNotRecorded(e.to_string())
            }
        }
    }
}
