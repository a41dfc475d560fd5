//! Wire protocol shared with chat clients.
//!
//! One command or message per line. The server drives name negotiation
//! with `SUBMITNAME` until it can answer `NAMEACCEPTED`; after that,
//! everything broadcast to clients is a `MESSAGE <sender>: <text>` line.

pub const SUBMIT_NAME: &str = "SUBMITNAME";
pub const NAME_ACCEPTED: &str = "NAMEACCEPTED";
pub const DISCONNECT: &str = "DISCONNECTME";

/// Sender used for join/leave/kick notices. Reserved during name
/// negotiation so no real client can impersonate it.
pub const SYSTEM_SENDER: &str = "SERVER";

#[derive(Debug, PartialEq, Eq)]
pub enum Request {
    Disconnect,
    Chat(String),
}

/// Classifies one raw line from a named client.
pub fn parse_request(line: &str) -> Request {
    let line = line.trim();

    if line == DISCONNECT {
        Request::Disconnect
    } else {
        Request::Chat(line.to_string())
    }
}

/// Broadcast line carrying one chat message.
pub fn message(sender: &str, text: &str) -> String {
    format!("MESSAGE {sender}: {text}")
}

/// Broadcast line for a notice issued by the server itself.
pub fn system_message(text: &str) -> String {
    message(SYSTEM_SENDER, text)
}
