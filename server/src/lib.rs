//! # Cman Game Server Library
//!
//! Authoritative server for a two-role chase game played over UDP. One
//! address plays the Cman, one plays the Ghost, and any number of watchers
//! follow along. The server decides who holds which role, whether a move is
//! allowed to reach the game engine, and where the round is in its
//! lifecycle, then broadcasts a full world snapshot to everyone.
//!
//! ## Core Responsibilities
//!
//! ### Role Arbitration
//! Clients have no session token; the transport address is the only
//! identity. An address joins once, as exactly one role, and a second Join
//! is always refused rather than silently reassigned.
//!
//! ### Round Lifecycle
//! Rounds move through `Pregame → Waiting → Playing ⇄ Start → End`. The phase
//! decides which recipients are frozen: the Cman only before both players
//! are in, the Ghost additionally while waiting for the first move and for
//! one beat after every catch.
//!
//! ### Snapshot Broadcasting
//! Every tick recomputes the whole world (positions, catches, collected
//! points) and sends it to every joined address. Nothing is incremental, so
//! a lost or reordered datagram never leaves a client in a
//! state the next snapshot cannot repair.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Loop
//! [`network::Server`] runs one poll, dispatch, broadcast cycle per tick on
//! a single task. Each datagram is handled to completion before the next is
//! read. Send failures are logged and skipped; only failing to bind the
//! socket is fatal.
//!
//! ### Socket-Free State Machine
//! [`state::GameStateMachine`] owns all round state and never touches the
//! network, so the transitions are tested by feeding it requests directly.
//!
//! ### Pluggable Game Engine
//! Movement, catches, and scoring sit behind the [`game::Game`] trait.
//! [`maze::MazeGame`] is the grid implementation the binary ships with.
//!
//! ## Module Organization
//!
//! - `client_manager`: address to role slots
//! - `config`: runtime settings and timing constants
//! - `game`: the engine boundary and the canonical player identity
//! - `maze`: reference engine over a [`shared::WorldMap`]
//! - `network`: socket loop, datagram dispatch, per-recipient broadcast
//! - `state`: round phases, request validation, freeze flags
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::maze::MazeGame;
//! use server::network::Server;
//! use shared::WorldMap;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let map = WorldMap::load("map.txt")?;
//!     let config = ServerConfig::new("0.0.0.0:1337".parse()?, 20);
//!
//!     let mut server = Server::bind(config, MazeGame::new(map)).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod game;
pub mod maze;
pub mod network;
pub mod state;
