//! slirc - terminal front end for slirc-client.
//!
//! Connects to the first server marked `autoconnect` and runs stdin lines
//! as user input until the server closes the connection or `/quit` is run.

use slirc_client::{Client, Config, StdoutSink};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        servers = config.servers.len(),
        home = %config.client.home.display(),
        "Starting {} {}",
        slirc_client::NAME,
        slirc_client::VERSION
    );

    let mut client = Client::new(&config, Box::new(StdoutSink));

    let Some(index) = client.servers.iter().position(|s| s.autoconnect) else {
        anyhow::bail!("no server with autoconnect in {config_path}");
    };
    let (address, port, ssl) = {
        let server = &client.servers[index];
        (server.address.clone(), server.port, server.ssl)
    };
    if ssl {
        anyhow::bail!("server {address} requires SSL, which this build does not support");
    }

    let stream = TcpStream::connect((address.as_str(), port)).await?;
    stream.set_nodelay(true)?;
    if let Ok(local) = stream.local_addr() {
        info!(local = %local, "connected");
    }
    client.connect(index)?;

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    slirc_client::network::drive(&mut client, index, stream, rx).await?;
    info!("Shutdown complete");
    Ok(())
}
