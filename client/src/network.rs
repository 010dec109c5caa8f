use crate::game::{ClientSession, SessionEvent};
use crate::input::{self, KeyAction};
use crate::rendering::Renderer;
use log::{debug, error, info, warn};
use macroquad::prelude::{is_quit_requested, next_frame, prevent_quit};
use shared::{ClientMessage, EndSummary, ErrorCode, Role, WorldMap, BUFFER_SIZE};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

/// Non-blocking UDP endpoint talking to a single server.
pub struct Connection {
    socket: UdpSocket,
    server_addr: SocketAddr,
}

impl Connection {
    pub fn open(server_addr: SocketAddr) -> io::Result<Self> {
        let local_ip = match server_addr {
            SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let socket = UdpSocket::bind(SocketAddr::new(local_ip, 0))?;
        // Connected so the kernel reports an unreachable server on receive
        socket.connect(server_addr)?;
        socket.set_nonblocking(true)?;
        debug!("Client socket bound to {}", socket.local_addr()?);

        Ok(Self {
            socket,
            server_addr,
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn send(&self, message: ClientMessage) -> io::Result<()> {
        self.socket.send(&message.encode())?;
        Ok(())
    }

    /// Every datagram waiting in the socket, oldest first. Datagrams from
    /// anyone but the server are dropped. Any receive error other than an
    /// empty socket is returned.
    pub fn drain(&self) -> io::Result<Vec<Vec<u8>>> {
        let mut datagrams = Vec::new();
        let mut buffer = [0u8; BUFFER_SIZE];

        loop {
            match self.socket.recv_from(&mut buffer) {
                Ok((len, from)) if from == self.server_addr => {
                    datagrams.push(buffer[..len].to_vec());
                }
                Ok((_, from)) => debug!("Ignoring datagram from {}", from),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    error!("Error receiving packet: {}", e);
                    return Err(e);
                }
            }
        }

        Ok(datagrams)
    }
}

/// Why the client loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientExit {
    Quit,
    Finished(EndSummary),
    Rejected(ErrorCode),
}

pub struct Client {
    connection: Connection,
    session: ClientSession,
    renderer: Renderer,
}

impl Client {
    pub fn new(role: Role, server_addr: SocketAddr, map: WorldMap) -> io::Result<Self> {
        Ok(Client {
            connection: Connection::open(server_addr)?,
            session: ClientSession::new(role, map),
            renderer: Renderer::new(),
        })
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn join(&mut self) -> io::Result<()> {
        info!(
            "Joining {} as {}",
            self.connection.server_addr(),
            self.session.role()
        );
        self.connection.send(ClientMessage::Join(self.session.role()))?;
        self.session.set_message("Connecting...");
        Ok(())
    }

    /// One frame without drawing: apply everything the server sent, then
    /// act on the key pressed this frame, if any.
    pub fn update(&mut self, key: Option<KeyAction>) -> io::Result<Option<ClientExit>> {
        for datagram in self.connection.drain()? {
            match self.session.apply_datagram(&datagram) {
                SessionEvent::Continue => {}
                SessionEvent::Ended(summary) => return Ok(Some(ClientExit::Finished(summary))),
                SessionEvent::Rejected(code) => return Ok(Some(ClientExit::Rejected(code))),
            }
        }

        match key {
            None => {}
            Some(KeyAction::Quit) => {
                self.quit();
                return Ok(Some(ClientExit::Quit));
            }
            Some(KeyAction::Move(direction)) => {
                if self.session.can_move() {
                    self.connection.send(ClientMessage::Move(direction))?;
                } else {
                    self.session.set_message("Cannot move now.");
                }
            }
            Some(KeyAction::Unknown(c)) => {
                warn!("Ignoring unknown key {:?}", c);
                self.session
                    .set_message(format!("Unknown key {:?}, use w/a/s/d or q", c));
            }
        }

        Ok(None)
    }

    fn quit(&self) {
        info!("Leaving the game");
        if let Err(e) = self.connection.send(ClientMessage::Quit) {
            error!("Failed to send quit: {}", e);
        }
    }

    pub async fn run(&mut self) -> io::Result<ClientExit> {
        prevent_quit();
        self.join()?;

        loop {
            if is_quit_requested() {
                self.quit();
                return Ok(ClientExit::Quit);
            }

            let key = input::poll_key();
            if let Some(exit) = self.update(key)? {
                return Ok(exit);
            }

            self.renderer.render(&self.session);
            next_frame().await;
        }
    }
}
