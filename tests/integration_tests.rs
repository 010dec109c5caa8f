//! Integration tests for the cman server and client
//!
//! A real server is bound to loopback and driven one tick at a time while
//! plain UDP sockets play the clients, so every check below goes through the
//! actual wire format.

use server::config::ServerConfig;
use server::maze::MazeGame;
use server::network::Server;
use server::state::RoundPhase;
use shared::{
    ClientMessage, Coord, Direction, ErrorCode, Role, ServerMessage, WorldMap, BUFFER_SIZE,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

// C . P . S along one corridor: one point, and the players meet in the middle
const CORRIDOR: &str = "WWWWWWW\nWCFPFSW\nWWWWWWW";

async fn start_server() -> (Server<MazeGame>, SocketAddr) {
    let mut config = ServerConfig::new("127.0.0.1:0".parse().unwrap(), 50);
    config.end_repeats = 2;
    config.end_spacing = Duration::ZERO;

    let game = MazeGame::new(WorldMap::parse(CORRIDOR).unwrap());
    let server = Server::bind(config, game).await.unwrap();
    let addr = server.local_addr().unwrap();
    (server, addr)
}

async fn socket() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.unwrap()
}

async fn send(socket: &UdpSocket, server: SocketAddr, message: ClientMessage) {
    socket.send_to(&message.encode(), server).await.unwrap();
}

/// Everything that arrives before the socket goes quiet for a moment.
async fn recv_raw(socket: &UdpSocket) -> Vec<Vec<u8>> {
    let mut datagrams = Vec::new();
    let mut buf = [0u8; BUFFER_SIZE];
    while let Ok(Ok((len, _))) =
        timeout(Duration::from_millis(50), socket.recv_from(&mut buf)).await
    {
        datagrams.push(buf[..len].to_vec());
    }
    datagrams
}

async fn recv_all(socket: &UdpSocket) -> Vec<ServerMessage> {
    recv_raw(socket)
        .await
        .iter()
        .map(|data| ServerMessage::decode(data).unwrap())
        .collect()
}

fn freeze_flags(messages: &[ServerMessage]) -> Vec<bool> {
    messages
        .iter()
        .map(|message| match message {
            ServerMessage::StateUpdate(update) => update.freeze,
            other => panic!("Expected a state update, got {:?}", other),
        })
        .collect()
}

/// Joins cman then ghost, one tick each, and discards the snapshots.
async fn join_players(
    server: &mut Server<MazeGame>,
    addr: SocketAddr,
) -> (UdpSocket, UdpSocket) {
    let cman = socket().await;
    let ghost = socket().await;

    send(&cman, addr, ClientMessage::Join(Role::Cman)).await;
    server.tick().await;
    send(&ghost, addr, ClientMessage::Join(Role::Ghost)).await;
    server.tick().await;

    recv_all(&cman).await;
    recv_all(&ghost).await;
    (cman, ghost)
}

/// ROUND LIFECYCLE TESTS
mod lifecycle_tests {
    use super::*;

    /// The round waits for both players and then freezes only the ghost
    #[tokio::test]
    async fn join_both_players_enters_waiting() {
        let (mut server, addr) = start_server().await;
        let cman = socket().await;
        let ghost = socket().await;

        send(&cman, addr, ClientMessage::Join(Role::Cman)).await;
        server.tick().await;
        assert_eq!(server.state().phase(), RoundPhase::Pregame);
        assert_eq!(freeze_flags(&recv_all(&cman).await), vec![true]);

        send(&ghost, addr, ClientMessage::Join(Role::Ghost)).await;
        server.tick().await;
        assert_eq!(server.state().phase(), RoundPhase::Waiting);
        assert_eq!(freeze_flags(&recv_all(&cman).await), vec![false]);
        assert_eq!(freeze_flags(&recv_all(&ghost).await), vec![true]);
    }

    /// A quitting player forfeits; the result is repeated, then the server resets
    #[tokio::test]
    async fn forfeit_broadcasts_end_then_resets() {
        let (mut server, addr) = start_server().await;
        let (cman, ghost) = join_players(&mut server, addr).await;

        let watcher = socket().await;
        send(&watcher, addr, ClientMessage::Join(Role::Spectator)).await;
        server.tick().await;
        recv_all(&cman).await;
        recv_all(&ghost).await;
        assert_eq!(freeze_flags(&recv_all(&watcher).await), vec![true]);

        send(&cman, addr, ClientMessage::Quit).await;
        server.tick().await;
        assert_eq!(server.state().phase(), RoundPhase::End);
        server.tick().await;
        assert_eq!(server.state().phase(), RoundPhase::Pregame);
        assert!(server.state().clients().is_empty());

        for socket in [&cman, &ghost, &watcher] {
            let messages = recv_all(socket).await;
            assert_eq!(messages.len(), 2);
            for message in messages {
                match message {
                    ServerMessage::End(summary) => {
                        assert_eq!(summary.winner, Role::Ghost);
                        assert_eq!(summary.ghost_catches, 0);
                        assert_eq!(summary.cman_score, 0);
                    }
                    other => panic!("Expected the round result, got {:?}", other),
                }
            }
        }

        // The slots are free again
        send(&ghost, addr, ClientMessage::Join(Role::Cman)).await;
        server.tick().await;
        assert_eq!(server.state().clients().cman(), ghost.local_addr().ok());
    }

    /// Requests sent during the cooldown wait in the socket until the reset
    #[tokio::test]
    async fn cooldown_does_not_read_requests() {
        let (mut server, addr) = start_server().await;
        let (cman, _ghost) = join_players(&mut server, addr).await;

        send(&cman, addr, ClientMessage::Quit).await;
        server.tick().await;
        assert_eq!(server.state().phase(), RoundPhase::End);

        let late = socket().await;
        send(&late, addr, ClientMessage::Join(Role::Cman)).await;
        server.tick().await;
        assert_eq!(server.state().phase(), RoundPhase::Pregame);
        assert!(server.state().clients().is_empty());

        server.tick().await;
        assert_eq!(server.state().clients().cman(), late.local_addr().ok());
    }
}

/// ERROR REPLY TESTS
mod error_tests {
    use super::*;

    /// A refused join is answered to the requester alone
    #[tokio::test]
    async fn taken_slot_error_goes_to_requester_only() {
        let (mut server, addr) = start_server().await;
        let cman = socket().await;
        let intruder = socket().await;

        send(&cman, addr, ClientMessage::Join(Role::Cman)).await;
        server.tick().await;
        recv_all(&cman).await;

        send(&intruder, addr, ClientMessage::Join(Role::Cman)).await;
        server.tick().await;

        assert_eq!(
            recv_all(&intruder).await,
            vec![ServerMessage::Error(ErrorCode::CmanTaken)]
        );
        assert_eq!(freeze_flags(&recv_all(&cman).await), vec![true]);
        assert_eq!(server.state().clients().len(), 1);
    }

    /// Malformed requests get a format error and leave the round untouched
    #[tokio::test]
    async fn malformed_requests_are_reported() {
        let (mut server, addr) = start_server().await;
        let (cman, _ghost) = join_players(&mut server, addr).await;

        cman.send_to(&[0x0F, 0x00], addr).await.unwrap();
        server.tick().await;

        let messages = recv_all(&cman).await;
        assert_eq!(messages[0], ServerMessage::Error(ErrorCode::InvalidQuit));
        assert_eq!(freeze_flags(&messages[1..]), vec![false]);
        assert_eq!(server.state().phase(), RoundPhase::Waiting);

        let stranger = socket().await;
        send(&stranger, addr, ClientMessage::Move(Direction::Up)).await;
        server.tick().await;
        assert_eq!(
            recv_all(&stranger).await,
            vec![ServerMessage::Error(ErrorCode::UnknownClient)]
        );
    }

    /// Moves before the second player arrives are refused
    #[tokio::test]
    async fn move_before_start_is_refused() {
        let (mut server, addr) = start_server().await;
        let cman = socket().await;

        send(&cman, addr, ClientMessage::Join(Role::Cman)).await;
        server.tick().await;
        recv_all(&cman).await;

        send(&cman, addr, ClientMessage::Move(Direction::Right)).await;
        server.tick().await;

        let messages = recv_all(&cman).await;
        assert_eq!(messages[0], ServerMessage::Error(ErrorCode::NotStarted));
        assert_eq!(server.state().phase(), RoundPhase::Pregame);
    }
}

/// GAMEPLAY OVER THE WIRE
mod gameplay_tests {
    use super::*;
    use client::game::{ClientSession, SessionEvent, Status};
    use shared::Tile;

    /// A catch costs a life, resets positions and benches the ghost for a move
    #[tokio::test]
    async fn catch_enters_start_and_freezes_ghost() {
        let (mut server, addr) = start_server().await;
        let (cman, ghost) = join_players(&mut server, addr).await;

        send(&cman, addr, ClientMessage::Move(Direction::Right)).await;
        server.tick().await;
        for _ in 0..3 {
            send(&ghost, addr, ClientMessage::Move(Direction::Left)).await;
            server.tick().await;
        }
        assert_eq!(server.state().phase(), RoundPhase::Start);

        recv_all(&cman).await;
        let messages = recv_all(&ghost).await;
        match messages.last() {
            Some(ServerMessage::StateUpdate(update)) => {
                assert!(update.freeze);
                assert_eq!(update.attempts, 1);
                assert_eq!(update.cman, Coord::new(1, 1));
                assert_eq!(update.ghost, Coord::new(1, 5));
            }
            other => panic!("Expected a state update, got {:?}", other),
        }
    }

    /// The client rebuilds the board from real snapshots and sees the win
    #[tokio::test]
    async fn client_session_follows_the_round() {
        let (mut server, addr) = start_server().await;
        let (cman, _ghost) = join_players(&mut server, addr).await;
        let map = WorldMap::parse(CORRIDOR).unwrap();
        let mut session = ClientSession::new(Role::Cman, map);

        send(&cman, addr, ClientMessage::Move(Direction::Right)).await;
        server.tick().await;
        for datagram in recv_raw(&cman).await {
            assert_eq!(session.apply_datagram(&datagram), SessionEvent::Continue);
        }
        assert_eq!(session.status(), Status::Playing);
        assert!(session.can_move());
        assert_eq!(session.map().tile(Coord::new(1, 2)), Some(Tile::Cman));
        assert_eq!(session.map().tile(Coord::new(1, 1)), Some(Tile::Floor));
        assert_eq!(session.map().tile(Coord::new(1, 3)), Some(Tile::Point));

        // Eating the only point wins the round
        send(&cman, addr, ClientMessage::Move(Direction::Right)).await;
        server.tick().await;
        assert_eq!(server.state().phase(), RoundPhase::End);

        let events: Vec<SessionEvent> = recv_raw(&cman)
            .await
            .iter()
            .map(|datagram| session.apply_datagram(datagram))
            .collect();
        match events.first() {
            Some(SessionEvent::Ended(summary)) => {
                assert_eq!(summary.winner, Role::Cman);
                assert_eq!(summary.cman_score, 1);
                assert_eq!(summary.ghost_catches, 0);
            }
            other => panic!("Expected the round to end, got {:?}", other),
        }
        assert_eq!(session.status(), Status::GameOver);
        assert!(!session.can_move());
    }
}

/// SHIPPED MAP TESTS
mod map_tests {
    use super::*;
    use shared::MAP_PATH;

    /// The default map loads and both players start on open floor
    #[test]
    fn default_map_loads() {
        let map = WorldMap::load(MAP_PATH).unwrap();
        assert!(!map.starting_points().is_empty());
        assert!(map.is_walkable(map.cman_start()));
        assert!(map.is_walkable(map.ghost_start()));
        assert_ne!(map.cman_start(), map.ghost_start());
    }
}
