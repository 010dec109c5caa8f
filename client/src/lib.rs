//! # cman Client Library
//!
//! The client is a thin terminal for the authoritative server. It never
//! simulates anything: every frame it drains the datagrams the server sent,
//! rebuilds its copy of the map from the latest snapshot, turns at most one
//! key press into a request, and draws the result.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! [`game::ClientSession`] holds the local map and round status. It decides
//! whether the player may move, keeps the transient message line, and
//! rejects snapshots that would place a player inside a wall.
//!
//! ### Input Module (`input`)
//! Key translation (`wasd` to move, `q` or Escape to leave) and the
//! macroquad keyboard poll.
//!
//! ### Network Module (`network`)
//! A non-blocking UDP [`network::Connection`] that only accepts datagrams
//! from the server it joined, and the [`network::Client`] frame loop.
//!
//! ### Rendering Module (`rendering`)
//! Draws the status lines and the tile grid with macroquad.
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::network::{Client, ClientExit};
//! use shared::{Role, WorldMap};
//!
//! # async fn play() -> Result<(), Box<dyn std::error::Error>> {
//! let map = WorldMap::load("map.txt")?;
//! let mut client = Client::new(Role::Cman, "127.0.0.1:1337".parse()?, map)?;
//!
//! match client.run().await? {
//!     ClientExit::Finished(summary) => println!("{} won", summary.winner),
//!     ClientExit::Rejected(code) => eprintln!("Server refused us: {}", code),
//!     ClientExit::Quit => {}
//! }
//! # Ok(())
//! # }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
