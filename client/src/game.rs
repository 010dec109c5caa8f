//! Client-side view of the round, rebuilt entirely from server datagrams.

use log::{info, warn};
use shared::{
    EndSummary, ErrorCode, ProtocolError, Role, ServerMessage, StateUpdate, WorldMap,
    MAX_ATTEMPTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Joined (or joining), not yet seen an unfrozen snapshot
    Waiting,
    /// Seen at least one unfrozen snapshot
    Playing,
    GameOver,
}

/// What the loop should do after a datagram has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Continue,
    Ended(EndSummary),
    /// The server refused us in a way that ends the session
    Rejected(ErrorCode),
}

pub struct ClientSession {
    role: Role,
    map: WorldMap,
    status: Status,
    frozen: bool,
    attempts: u8,
    message: String,
    result: Option<EndSummary>,
}

impl ClientSession {
    pub fn new(role: Role, map: WorldMap) -> Self {
        Self {
            role,
            map,
            status: Status::Waiting,
            frozen: true,
            attempts: 0,
            message: String::new(),
            result: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    pub fn result(&self) -> Option<EndSummary> {
        self.result
    }

    /// Players may send moves once the round is running for them and the
    /// latest snapshot did not freeze them.
    pub fn can_move(&self) -> bool {
        self.role != Role::Spectator && self.status == Status::Playing && !self.frozen
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn message_line(&self) -> String {
        if self.message.is_empty() {
            String::new()
        } else {
            format!("Message: {}", self.message)
        }
    }

    pub fn attempts_line(&self) -> String {
        let attempt = self.attempts.saturating_add(1).min(MAX_ATTEMPTS);
        format!("Attempt: {}/{}", attempt, MAX_ATTEMPTS)
    }

    /// Decodes and applies one raw datagram from the server.
    pub fn apply_datagram(&mut self, data: &[u8]) -> SessionEvent {
        match ServerMessage::decode(data) {
            Ok(message) => self.apply(message),
            Err(ProtocolError::UnknownErrorCode(code)) => {
                warn!("Server sent unknown error code {}", code);
                self.set_message("Unknown error");
                SessionEvent::Continue
            }
            Err(e) => {
                warn!("Dropping undecodable datagram: {}", e);
                SessionEvent::Continue
            }
        }
    }

    pub fn apply(&mut self, message: ServerMessage) -> SessionEvent {
        if self.status == Status::GameOver {
            return SessionEvent::Continue;
        }

        match message {
            ServerMessage::StateUpdate(update) => {
                self.apply_update(&update);
                SessionEvent::Continue
            }
            ServerMessage::End(summary) => {
                info!("Round over, {} wins", summary.winner);
                self.status = Status::GameOver;
                self.result = Some(summary);
                SessionEvent::Ended(summary)
            }
            ServerMessage::Error(code) => {
                self.set_message(format!("Server Error: {}", code));
                if code.is_fatal() {
                    SessionEvent::Rejected(code)
                } else {
                    SessionEvent::Continue
                }
            }
        }
    }

    fn apply_update(&mut self, update: &StateUpdate) {
        if let Err(e) = self.map.apply_snapshot(update) {
            warn!("Rejected snapshot: {}", e);
            return;
        }

        self.frozen = update.freeze;
        self.attempts = update.attempts;

        if !update.freeze {
            self.status = Status::Playing;
            self.set_message("Game started!");
        } else if self.role == Role::Spectator {
            self.set_message("Watching the game.");
        } else if self.status == Status::Playing {
            self.set_message("Cman was caught, hold still.");
        } else {
            self.set_message("Connected to server. Cannot move.");
        }
    }
}
