pub fn config_loaded(path: &str) -> String {
    format!("Loaded configuration from {path}")
}

pub fn tables_built(senders: usize, commands: usize) -> String {
    format!("Authorization table: {senders} sender(s), command registry: {commands} webhook(s)")
}

pub fn membership_loaded(count: usize, path: &str) -> String {
    format!("Loaded {count} joined room(s) from {path}")
}

pub fn logged_in(user: &str) -> String {
    format!("Logged in as {user}")
}

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub fn rejoining(room: &str) -> String {
    format!("Rejoining room {room}...")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub const SHUTDOWN: &str = "Shutting down...";

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

pub const EVENT_LOOP_START: &str = "Event loop started";
pub const EVENT_LOOP_STOP: &str = "Event loop stopped: event stream closed";
pub const EVENT_LOOP_DRAIN: &str = "Waiting for in-flight events to finish...";

pub fn event_loop_drain_timeout(secs: u64) -> String {
    format!("Event loop still busy after {secs}s, abandoning remaining events")
}

pub fn event_loop_fail(err: &str) -> String {
    format!("Event loop task failed: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id}")
}

pub fn join_invite_fail(room_id: &str, err: &str) -> String {
    format!("Failed to join room {room_id} after invite: {err}")
}

pub fn join_invite_success(room_id: &str) -> String {
    format!("✅ Joined room {room_id}")
}

pub fn rejoin_known_room(room_id: &str) -> String {
    format!("Joined room {room_id} again (already recorded)")
}

pub fn membership_write_fail(room_id: &str, err: &str) -> String {
    format!("Joined room {room_id} but could not record it: {err}")
}

pub fn missing_webhook(command: &str, sender: &str) -> String {
    format!("Command `{command}` from {sender} is permitted but has no webhook configured")
}

pub fn webhook_fail(url: &str, err: &str) -> String {
    format!("Error triggering webhook {url}: {err}")
}

pub fn ack_send_fail(room_id: &str, err: &str) -> String {
    format!("Failed to send acknowledgement to {room_id}: {err}")
}
