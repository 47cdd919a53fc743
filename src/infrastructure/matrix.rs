//! # Matrix Transport Adapter
//!
//! Implements the `ChatTransport` trait for the Matrix protocol using the `matrix_sdk`.
//! Also owns session setup (client build, login or access-token session restore) and the
//! sync event handlers, which do nothing but translate SDK events into `IncomingEvent`s
//! for the event loop.

use crate::domain::config::{AppConfig, Credentials};
use crate::domain::traits::ChatTransport;
use crate::domain::types::{IncomingEvent, MessageKind, RoomMessage};
use crate::strings::logs;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use matrix_sdk::authentication::SessionTokens;
use matrix_sdk::authentication::matrix::MatrixSession;
use matrix_sdk::event_handler::EventHandlerHandle;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::member::{MembershipState, StrippedRoomMemberEvent};
use matrix_sdk::ruma::events::room::message::{
    MessageType, RoomMessageEventContent, SyncRoomMessageEvent,
};
use matrix_sdk::ruma::{MilliSecondsSinceUnixEpoch, OwnedDeviceId, RoomId, UserId};
use matrix_sdk::{Client, SessionMeta};
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::UnboundedSender;

const DEVICE_DISPLAY_NAME: &str = "webhook-b0t";

/// Response of `GET /_matrix/client/v3/account/whoami`.
#[derive(Debug, Deserialize)]
struct WhoAmI {
    user_id: String,
    #[serde(default)]
    device_id: Option<String>,
}

/// Asks the homeserver which user and device an access token belongs to.
async fn whoami(homeserver: &str, access_token: &str) -> Result<SessionMeta> {
    let url = format!(
        "{}/_matrix/client/v3/account/whoami",
        homeserver.trim_end_matches('/')
    );
    let who: WhoAmI = reqwest::Client::new()
        .get(url)
        .bearer_auth(access_token)
        .send()
        .await
        .context("Failed to reach homeserver for whoami")?
        .error_for_status()
        .context("Homeserver rejected the access token")?
        .json()
        .await
        .context("Unexpected whoami response")?;

    let Some(device_id) = who.device_id else {
        bail!("Access token for {} is not bound to a device", who.user_id);
    };
    let device_id: OwnedDeviceId = device_id.as_str().into();
    Ok(SessionMeta {
        user_id: UserId::parse(&who.user_id)?,
        device_id,
    })
}

/// Messages sent before the bot started are history, not commands.
pub(crate) fn is_stale(ts: MilliSecondsSinceUnixEpoch, started: SystemTime) -> bool {
    let event_time = UNIX_EPOCH + Duration::from_millis(u64::from(ts.get()));
    event_time < started
}

/// Only invitations addressed to our own account are acted on.
pub(crate) fn is_invite_for(
    me: Option<&UserId>,
    membership: &MembershipState,
    target: &UserId,
) -> bool {
    *membership == MembershipState::Invite && me.is_some_and(|me| me == target)
}

pub(crate) fn message_kind(msgtype: &MessageType) -> MessageKind {
    match msgtype {
        MessageType::Text(_) => MessageKind::Text,
        other => MessageKind::Other(other.msgtype().to_string()),
    }
}

#[derive(Clone)]
pub struct MatrixTransport {
    client: Client,
}

impl MatrixTransport {
    /// Builds the client and logs in. Any failure here is fatal for the process.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .homeserver_url(config.server_url())
            .build()
            .await
            .context("Failed to initialize Matrix client")?;

        match config.credentials()? {
            Credentials::Token(token) => {
                Self::restore_session(&client, token).await?;
            }
            Credentials::Password { username, password } => {
                client
                    .matrix_auth()
                    .login_username(&username, &password)
                    .initial_device_display_name(DEVICE_DISPLAY_NAME)
                    .send()
                    .await
                    .context("Failed to log in with username and password")?;
            }
        }

        let user = client
            .user_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        tracing::info!("{}", logs::logged_in(&user));

        if let Some(name) = &config.matrix.display_name {
            tracing::info!("{}", logs::setting_display_name(name));
            if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
                tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
            }
        }

        Ok(Self { client })
    }

    /// Resumes an existing session from an access token. The owning user and device
    /// are looked up with `whoami`, so only the token has to be configured.
    async fn restore_session(client: &Client, access_token: String) -> Result<()> {
        let meta = whoami(client.homeserver().as_str(), &access_token).await?;
        let session = MatrixSession {
            meta,
            tokens: SessionTokens {
                access_token,
                refresh_token: None,
            },
        };
        client
            .restore_session(session)
            .await
            .context("Failed to restore session from access token")?;
        Ok(())
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Forwards invites for our own account and new room messages into `events`.
    /// Messages older than `started` or sent by the bot itself are dropped here.
    /// The returned handles keep the senders alive until `stop_forwarding`.
    pub fn forward_events(
        &self,
        events: UnboundedSender<IncomingEvent>,
        started: SystemTime,
    ) -> Vec<EventHandlerHandle> {
        let invite_tx = events.clone();
        let invites = self.client.add_event_handler(
            move |ev: StrippedRoomMemberEvent, room: Room, client: Client| {
                let tx = invite_tx.clone();
                async move {
                    if !is_invite_for(client.user_id(), &ev.content.membership, &ev.state_key) {
                        return;
                    }
                    let _ = tx.send(IncomingEvent::RoomInvite {
                        room_id: room.room_id().to_string(),
                    });
                }
            },
        );

        let message_tx = events;
        let messages = self
            .client
            .add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
                let tx = message_tx.clone();
                async move {
                    let Some(original) = ev.as_original() else {
                        return;
                    };
                    if is_stale(ev.origin_server_ts(), started) {
                        return;
                    }
                    if original.sender == room.own_user_id() {
                        return;
                    }

                    let _ = tx.send(IncomingEvent::RoomMessage {
                        event_id: Some(original.event_id.to_string()),
                        message: RoomMessage {
                            room_id: room.room_id().to_string(),
                            sender: original.sender.to_string(),
                            body: original.content.body().to_string(),
                            kind: message_kind(&original.content.msgtype),
                        },
                    });
                }
            });

        vec![invites, messages]
    }

    /// Unregisters the handlers, dropping their senders so the event loop can drain and exit.
    pub fn stop_forwarding(&self, handles: Vec<EventHandlerHandle>) {
        for handle in handles {
            self.client.remove_event_handler(handle);
        }
    }
}

#[async_trait]
impl ChatTransport for MatrixTransport {
    async fn join_room(&self, room_id: &str) -> Result<()> {
        let room_id = <&RoomId>::try_from(room_id)?;
        self.client.join_room_by_id(room_id).await?;
        Ok(())
    }

    async fn send_message(&self, room_id: &str, content: &str) -> Result<()> {
        let room_id = <&RoomId>::try_from(room_id)?;
        let room = self
            .client
            .get_room(room_id)
            .with_context(|| format!("Room {room_id} is not known to the client"))?;
        tracing::info!("Bot sending message to {}: {}", room_id, content);
        room.send(RoomMessageEventContent::text_plain(content)).await?;
        Ok(())
    }
}
