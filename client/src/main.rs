use clap::{Parser, ValueEnum};
use client::network::{Client, ClientExit};
use log::{error, info};
use macroquad::prelude::Conf;
use shared::{Role, WorldMap, DEFAULT_PORT, MAP_PATH};
use std::net::{SocketAddr, ToSocketAddrs};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Cman,
    Ghost,
    Spectator,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Cman => Role::Cman,
            RoleArg::Ghost => Role::Ghost,
            RoleArg::Spectator => Role::Spectator,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Role to join the game as
    #[arg(value_enum)]
    role: RoleArg,

    /// Server host name or address
    addr: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Map file, must match the server's
    #[arg(short, long, default_value = MAP_PATH)]
    map: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "cman".to_owned(),
        window_width: 800,
        window_height: 600,
        ..Default::default()
    }
}

fn resolve(addr: &str, port: u16) -> Result<SocketAddr, Box<dyn std::error::Error>> {
    (addr, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| format!("{} did not resolve to any address", addr).into())
}

async fn run(args: Args) -> Result<ClientExit, Box<dyn std::error::Error>> {
    let map = WorldMap::load(&args.map)?;
    let server_addr = resolve(&args.addr, args.port)?;

    info!("Starting client...");
    info!("Controls: W/A/S/D to move, Q or Escape to quit");

    let mut client = Client::new(args.role.into(), server_addr, map)?;
    Ok(client.run().await?)
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    match run(args).await {
        Ok(ClientExit::Finished(summary)) => {
            println!("Game over! {} wins.", summary.winner);
            println!("Cman score: {}", summary.cman_score);
            println!("Ghost catches: {}", summary.ghost_catches);
        }
        Ok(ClientExit::Rejected(code)) => {
            eprintln!("Server Error: {}", code);
            std::process::exit(1);
        }
        Ok(ClientExit::Quit) => info!("Bye"),
        Err(e) => {
            error!("Client failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
