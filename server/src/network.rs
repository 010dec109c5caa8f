//! Server network layer: the single-threaded poll, dispatch, broadcast loop

use crate::config::ServerConfig;
use crate::game::Game;
use crate::state::{GameStateMachine, RoundPhase};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ServerMessage, BUFFER_SIZE};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

/// Decodes one datagram and applies it. Returns the Error reply owed to the
/// sender, if the datagram was malformed or the request was refused.
pub fn dispatch<G: Game>(
    state: &mut GameStateMachine<G>,
    data: &[u8],
    from: SocketAddr,
) -> Option<ServerMessage> {
    let message = match ClientMessage::decode(data) {
        Ok(message) => message,
        Err(e) => {
            warn!("Malformed datagram from {}: {}", from, e);
            return Some(ServerMessage::Error(e.error_code()));
        }
    };

    match state.handle(from, message) {
        Ok(()) => None,
        Err(code) => {
            warn!("Rejected {:?} from {}: {}", message, from, code);
            Some(ServerMessage::Error(code))
        }
    }
}

/// Messages for every joined address this tick: a per-role snapshot while
/// the round runs, the final result once it has ended.
pub fn outbound<G: Game>(state: &GameStateMachine<G>) -> Vec<(SocketAddr, ServerMessage)> {
    let recipients = state.clients().recipients();

    if state.phase() == RoundPhase::End {
        return match state.end_summary() {
            Some(summary) => recipients
                .into_iter()
                .map(|(addr, _)| (addr, ServerMessage::End(summary)))
                .collect(),
            None => Vec::new(),
        };
    }

    recipients
        .into_iter()
        .map(|(addr, role)| (addr, ServerMessage::StateUpdate(state.snapshot_for(role))))
        .collect()
}

/// Authoritative server bound to one UDP socket
pub struct Server<G: Game> {
    socket: UdpSocket,
    state: GameStateMachine<G>,
    config: ServerConfig,
    end_broadcasts: u32,
    tick_count: u64,
}

impl<G: Game> Server<G> {
    pub async fn bind(config: ServerConfig, game: G) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind(config.bind_addr).await?;
        info!("Server listening on {}", socket.local_addr()?);

        Ok(Server {
            socket,
            state: GameStateMachine::new(game),
            config,
            end_broadcasts: 0,
            tick_count: 0,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn state(&self) -> &GameStateMachine<G> {
        &self.state
    }

    async fn send(&self, message: &ServerMessage, addr: SocketAddr) {
        if let Err(e) = self.socket.send_to(&message.encode(), addr).await {
            error!("Failed to send to {}: {}", addr, e);
        }
    }

    /// Waits up to one tick for a single datagram and handles it.
    async fn poll(&mut self) {
        let mut buffer = [0u8; BUFFER_SIZE];

        match timeout(self.config.tick_duration, self.socket.recv_from(&mut buffer)).await {
            Ok(Ok((len, addr))) => {
                if let Some(reply) = dispatch(&mut self.state, &buffer[..len], addr) {
                    self.send(&reply, addr).await;
                }
            }
            Ok(Err(e)) => error!("Error receiving packet: {}", e),
            Err(_) => {}
        }
    }

    async fn broadcast(&self) {
        for (addr, message) in outbound(&self.state) {
            self.send(&message, addr).await;
        }
    }

    /// One loop iteration. While the round runs: read at most one datagram,
    /// then send every client its snapshot. Once it has ended: repeat the
    /// result at a fixed spacing without reading, and reset after the last
    /// repetition. Datagrams sent meanwhile wait in the socket buffer.
    pub async fn tick(&mut self) {
        self.tick_count += 1;

        if self.state.phase() != RoundPhase::End {
            self.poll().await;
        }

        self.broadcast().await;

        if self.state.phase() == RoundPhase::End {
            self.end_broadcasts += 1;
            debug!(
                "End broadcast {}/{}",
                self.end_broadcasts, self.config.end_repeats
            );

            if self.end_broadcasts >= self.config.end_repeats {
                info!("Game ended. New game starting...");
                self.end_broadcasts = 0;
                self.state.reset();
            } else {
                sleep(self.config.end_spacing).await;
            }
        }

        if self.tick_count % 200 == 0 {
            debug!(
                "Tick {}: {} clients, phase {:?}",
                self.tick_count,
                self.state.clients().len(),
                self.state.phase()
            );
        }
    }

    /// Runs ticks until Ctrl+C. The socket is closed when the server drops.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Server started successfully");

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("Failed to listen for Ctrl+C: {}", e);
                    }
                    info!("Server shutting down...");
                    break;
                }
                _ = self.tick() => {}
            }
        }

        Ok(())
    }
}
