use clap::Parser;
use log::info;
use server::config::{ServerConfig, DEFAULT_HOST, DEFAULT_TICK_RATE};
use server::maze::MazeGame;
use server::network::Server;
use shared::{WorldMap, DEFAULT_PORT, MAP_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port the server should listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Map file, in the W/F/P/S/C legend
    #[arg(short, long, default_value = MAP_PATH)]
    map: String,

    /// Snapshot broadcasts per second
    #[arg(short, long, default_value_t = DEFAULT_TICK_RATE)]
    tick_rate: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let map = WorldMap::load(&args.map)?;
    info!(
        "Loaded map {} with {} points",
        args.map,
        map.starting_points().len()
    );

    let bind_addr = format!("{}:{}", args.host, args.port).parse()?;
    let config = ServerConfig::new(bind_addr, args.tick_rate);

    let mut server = Server::bind(config, MazeGame::new(map)).await?;
    server.run().await?;

    Ok(())
}
