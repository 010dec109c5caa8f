//! Headless client for poking a running server: joins with a role, sends a
//! scripted list of moves, and prints every datagram it gets back.

use shared::{ClientMessage, Direction, Role, ServerMessage, BUFFER_SIZE, DEFAULT_PORT};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

fn parse_role(arg: Option<String>) -> Role {
    match arg.as_deref() {
        Some("cman") => Role::Cman,
        Some("ghost") => Role::Ghost,
        _ => Role::Spectator,
    }
}

fn parse_moves(arg: Option<String>) -> Vec<Direction> {
    arg.unwrap_or_default()
        .chars()
        .filter_map(|c| match c {
            'w' => Some(Direction::Up),
            'a' => Some(Direction::Left),
            's' => Some(Direction::Down),
            'd' => Some(Direction::Right),
            _ => None,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Usage: test_client [cman|ghost|spectator] [moves, e.g. "wwdd"]
    let mut args = std::env::args().skip(1);
    let role = parse_role(args.next());
    let moves = parse_moves(args.next());

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let server_addr: SocketAddr = format!("127.0.0.1:{}", DEFAULT_PORT).parse()?;

    println!("Joining {} as {}", server_addr, role);
    socket
        .send_to(&ClientMessage::Join(role).encode(), server_addr)
        .await?;

    let mut buf = [0u8; BUFFER_SIZE];
    let mut moves = moves.into_iter();

    for _ in 0..20 {
        match timeout(Duration::from_secs(1), socket.recv_from(&mut buf)).await {
            Ok(Ok((len, addr))) => match ServerMessage::decode(&buf[..len]) {
                Ok(ServerMessage::End(summary)) => {
                    println!("Round over from {}: {:?}", addr, summary);
                    return Ok(());
                }
                Ok(message) => println!("{} -> {:?}", addr, message),
                Err(e) => println!("Undecodable datagram from {}: {}", addr, e),
            },
            Ok(Err(e)) => println!("Error receiving: {}", e),
            Err(_) => println!("No datagram within a second"),
        }

        if let Some(direction) = moves.next() {
            println!("Sending move {:?}", direction);
            socket
                .send_to(&ClientMessage::Move(direction).encode(), server_addr)
                .await?;
        }

        sleep(Duration::from_millis(250)).await;
    }

    println!("Sending quit");
    socket
        .send_to(&ClientMessage::Quit.encode(), server_addr)
        .await?;

    println!("Test client finished");
    Ok(())
}
