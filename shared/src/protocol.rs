//! Fixed-size binary wire protocol
//!
//! Every datagram starts with a one-byte opcode. Client requests are at most
//! two bytes; server replies are fixed-length so a client can read them into
//! a single buffer. There is no versioning or sequence field: both sides
//! agree on the layouts below out of band.
//!
//! | Message     | Layout                                                        |
//! |-------------|---------------------------------------------------------------|
//! | Join        | opcode, role                                                  |
//! | Move        | opcode, direction                                             |
//! | Quit        | opcode                                                        |
//! | StateUpdate | opcode, freeze, cman row/col, ghost row/col, attempts, 5 bitmap bytes |
//! | End         | opcode, winner, ghost catches, cman score                     |
//! | Error       | opcode, 10 zero bytes, error code                             |

use crate::points::{PointsBitmap, POINTS_BITMAP_LEN};
use crate::Coord;
use thiserror::Error;

pub const OP_JOIN: u8 = 0x00;
pub const OP_MOVE: u8 = 0x01;
pub const OP_QUIT: u8 = 0x0F;
pub const OP_STATE_UPDATE: u8 = 0x80;
pub const OP_END: u8 = 0x8F;
pub const OP_ERROR: u8 = 0xFF;

pub const JOIN_LEN: usize = 2;
pub const MOVE_LEN: usize = 2;
pub const QUIT_LEN: usize = 1;
pub const STATE_UPDATE_LEN: usize = 7 + POINTS_BITMAP_LEN;
pub const END_LEN: usize = 4;
pub const ERROR_LEN: usize = 12;

/// Role requested in a Join. The byte values double as the winner byte of
/// an End message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Spectator,
    Cman,
    Ghost,
}

impl Role {
    pub fn to_byte(self) -> u8 {
        match self {
            Role::Spectator => 0,
            Role::Cman => 1,
            Role::Ghost => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Role::Spectator),
            1 => Some(Role::Cman),
            2 => Some(Role::Ghost),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Spectator => "spectator",
            Role::Cman => "cman",
            Role::Ghost => "ghost",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    pub fn to_byte(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Left => 1,
            Direction::Down => 2,
            Direction::Right => 3,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Direction::Up),
            1 => Some(Direction::Left),
            2 => Some(Direction::Down),
            3 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Reason carried in the trailing byte of an Error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Empty datagram or an opcode the server does not accept
    InvalidOpcode,
    /// Move or Quit from an address that never joined
    UnknownClient,
    InvalidJoin,
    AlreadyJoined,
    CmanTaken,
    GhostTaken,
    NotStarted,
    InvalidMove,
    /// A watcher tried to move
    WatcherMove,
    InvalidQuit,
}

impl ErrorCode {
    pub fn to_byte(self) -> u8 {
        match self {
            ErrorCode::InvalidOpcode => 0,
            ErrorCode::UnknownClient => 1,
            ErrorCode::InvalidJoin => 2,
            ErrorCode::AlreadyJoined => 3,
            ErrorCode::CmanTaken => 4,
            ErrorCode::GhostTaken => 5,
            ErrorCode::NotStarted => 6,
            ErrorCode::InvalidMove => 7,
            ErrorCode::WatcherMove => 8,
            ErrorCode::InvalidQuit => 9,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        let code = match byte {
            0 => ErrorCode::InvalidOpcode,
            1 => ErrorCode::UnknownClient,
            2 => ErrorCode::InvalidJoin,
            3 => ErrorCode::AlreadyJoined,
            4 => ErrorCode::CmanTaken,
            5 => ErrorCode::GhostTaken,
            6 => ErrorCode::NotStarted,
            7 => ErrorCode::InvalidMove,
            8 => ErrorCode::WatcherMove,
            9 => ErrorCode::InvalidQuit,
            _ => return None,
        };
        Some(code)
    }

    /// Errors that mean the client never made it into the round. A client
    /// receiving one of these gives up.
    pub fn is_fatal(self) -> bool {
        self.to_byte() <= ErrorCode::GhostTaken.to_byte()
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::InvalidOpcode => "bad format error, message prefix is not correct",
            ErrorCode::UnknownClient => "unknown client",
            ErrorCode::InvalidJoin => "bad format error, join request role is not correct",
            ErrorCode::AlreadyJoined => "client is already in the game",
            ErrorCode::CmanTaken => "cman position is already taken",
            ErrorCode::GhostTaken => "ghost position is already taken",
            ErrorCode::NotStarted => "game not started yet, can't move",
            ErrorCode::InvalidMove => "bad format error, move is not correct",
            ErrorCode::WatcherMove => "non players are not allowed to send move commands",
            ErrorCode::InvalidQuit => "bad format error, quit request is not correct",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty datagram")]
    Empty,
    #[error("unrecognized opcode {0:#04x}")]
    UnknownOpcode(u8),
    #[error("opcode {opcode:#04x} expects {expected} bytes, got {actual}")]
    BadLength {
        opcode: u8,
        expected: usize,
        actual: usize,
    },
    #[error("role byte {0} out of range")]
    InvalidRole(u8),
    #[error("direction byte {0} out of range")]
    InvalidDirection(u8),
    #[error("freeze byte {0} is neither 0 nor 1")]
    InvalidFreeze(u8),
    #[error("winner byte {0} names no player")]
    InvalidWinner(u8),
    #[error("unknown error code {0}")]
    UnknownErrorCode(u8),
}

impl ProtocolError {
    /// The code reported back to a client whose request failed to decode.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ProtocolError::BadLength { opcode, .. } => match *opcode {
                OP_JOIN => ErrorCode::InvalidJoin,
                OP_MOVE => ErrorCode::InvalidMove,
                OP_QUIT => ErrorCode::InvalidQuit,
                _ => ErrorCode::InvalidOpcode,
            },
            ProtocolError::InvalidRole(_) => ErrorCode::InvalidJoin,
            ProtocolError::InvalidDirection(_) => ErrorCode::InvalidMove,
            _ => ErrorCode::InvalidOpcode,
        }
    }
}

fn expect_len(data: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if data.len() != expected {
        return Err(ProtocolError::BadLength {
            opcode: data[0],
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Requests sent from a client to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    Join(Role),
    Move(Direction),
    Quit,
}

impl ClientMessage {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ClientMessage::Join(role) => vec![OP_JOIN, role.to_byte()],
            ClientMessage::Move(direction) => vec![OP_MOVE, direction.to_byte()],
            ClientMessage::Quit => vec![OP_QUIT],
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let opcode = *data.first().ok_or(ProtocolError::Empty)?;
        match opcode {
            OP_JOIN => {
                expect_len(data, JOIN_LEN)?;
                Role::from_byte(data[1])
                    .map(ClientMessage::Join)
                    .ok_or(ProtocolError::InvalidRole(data[1]))
            }
            OP_MOVE => {
                expect_len(data, MOVE_LEN)?;
                Direction::from_byte(data[1])
                    .map(ClientMessage::Move)
                    .ok_or(ProtocolError::InvalidDirection(data[1]))
            }
            OP_QUIT => {
                expect_len(data, QUIT_LEN)?;
                Ok(ClientMessage::Quit)
            }
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }
}

/// One world snapshot as seen by a single recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateUpdate {
    pub freeze: bool,
    pub cman: Coord,
    pub ghost: Coord,
    /// Lives the Cman has lost so far this round
    pub attempts: u8,
    pub points: PointsBitmap,
}

/// Final result of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndSummary {
    /// Either `Role::Cman` or `Role::Ghost`
    pub winner: Role,
    pub ghost_catches: u8,
    pub cman_score: u8,
}

/// Messages sent from the server to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage {
    StateUpdate(StateUpdate),
    End(EndSummary),
    Error(ErrorCode),
}

impl ServerMessage {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ServerMessage::StateUpdate(update) => {
                let mut data = Vec::with_capacity(STATE_UPDATE_LEN);
                data.extend_from_slice(&[
                    OP_STATE_UPDATE,
                    update.freeze as u8,
                    update.cman.row,
                    update.cman.col,
                    update.ghost.row,
                    update.ghost.col,
                    update.attempts,
                ]);
                data.extend_from_slice(update.points.as_bytes());
                data
            }
            ServerMessage::End(summary) => vec![
                OP_END,
                summary.winner.to_byte(),
                summary.ghost_catches,
                summary.cman_score,
            ],
            ServerMessage::Error(code) => {
                let mut data = vec![0u8; ERROR_LEN];
                data[0] = OP_ERROR;
                data[ERROR_LEN - 1] = code.to_byte();
                data
            }
        }
    }

    /// Decodes a server datagram. Coordinates are not checked against any
    /// map here; the receiver validates them when applying the snapshot.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let opcode = *data.first().ok_or(ProtocolError::Empty)?;
        match opcode {
            OP_STATE_UPDATE => {
                expect_len(data, STATE_UPDATE_LEN)?;
                let freeze = match data[1] {
                    0 => false,
                    1 => true,
                    other => return Err(ProtocolError::InvalidFreeze(other)),
                };
                let mut bitmap = [0u8; POINTS_BITMAP_LEN];
                bitmap.copy_from_slice(&data[7..STATE_UPDATE_LEN]);
                Ok(ServerMessage::StateUpdate(StateUpdate {
                    freeze,
                    cman: Coord::new(data[2], data[3]),
                    ghost: Coord::new(data[4], data[5]),
                    attempts: data[6],
                    points: PointsBitmap::from_bytes(bitmap),
                }))
            }
            OP_END => {
                expect_len(data, END_LEN)?;
                let winner = match Role::from_byte(data[1]) {
                    Some(role @ (Role::Cman | Role::Ghost)) => role,
                    _ => return Err(ProtocolError::InvalidWinner(data[1])),
                };
                Ok(ServerMessage::End(EndSummary {
                    winner,
                    ghost_catches: data[2],
                    cman_score: data[3],
                }))
            }
            OP_ERROR => {
                expect_len(data, ERROR_LEN)?;
                let byte = data[ERROR_LEN - 1];
                ErrorCode::from_byte(byte)
                    .map(ServerMessage::Error)
                    .ok_or(ProtocolError::UnknownErrorCode(byte))
            }
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }
}
