use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use serde_json::{json, to_string_pretty};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

use nova_modem::{DriverConfig, LogSink, NovaModem, SerialTransport, SocketId};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(
        short = 'c',
        long = "config",
        env = "NOVA_MODEM_CONFIG",
        help = "Path to a JSON driver config"
    )]
    config: Option<PathBuf>,

    #[arg(
        short = 'm',
        long = "modem",
        help = "Path to the modem AT port, overrides the config"
    )]
    modem: Option<PathBuf>,

    #[arg(long = "baud", help = "Baud rate, overrides the config")]
    baud_rate: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the modem description, operator and registration state
    Info,
    /// Request a GNSS/CellLocate fix and print it as JSON
    Location {
        #[arg(long = "wait", help = "Seconds to wait for a fix")]
        wait_secs: Option<u64>,
    },
    /// Open a TCP socket to HOST:PORT and close it again
    Connect { host: String, port: u16 },
    /// Close a socket
    Close {
        #[arg(long = "socket", default_value = "0")]
        socket_id: u8,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut config = match &cli.config {
        Some(path) => DriverConfig::load(path)
            .wrap_err_with(|| format!("failed to load config {}", path.display()))?,
        None => DriverConfig::default(),
    };
    if let Some(modem) = cli.modem {
        config.serial.device = modem;
    }
    if let Some(baud_rate) = cli.baud_rate {
        config.serial.baud_rate = baud_rate;
    }
    if let Command::Location {
        wait_secs: Some(secs),
    } = cli.command
    {
        config.location.wait_timeout = Duration::from_secs(secs);
    }
    debug!(?config, "driver config");

    info!("Initializing modem on {}", config.serial.device.display());
    let transport = SerialTransport::open(&config.serial, &config.timeouts)
        .wrap_err("failed to open modem")?;
    let mut modem = NovaModem::new(transport, LogSink, config);
    modem
        .init_serial_commands()
        .wrap_err("modem did not accept init commands")?;

    match cli.command {
        Command::Info => {
            let info = json!({
                "description": modem.description(),
                "variant": modem.variant(),
                "operator": modem.operator(),
                "registered": modem.is_registered(),
            });
            println!("{}", to_string_pretty(&info)?);
        }
        Command::Location { .. } => {
            let outcome = modem
                .request_location(&CancellationToken::new())
                .wrap_err("location request failed")?;
            println!("{}", to_string_pretty(&outcome)?);
        }
        Command::Connect { host, port } => modem
            .with_connected_socket(&host, port, |_, socket_id| {
                println!("connected socket {socket_id} to {host}:{port}");
            })
            .wrap_err_with(|| format!("failed to connect to {host}:{port}"))?,
        Command::Close { socket_id } => modem.close(Some(SocketId(socket_id))),
    }

    Ok(())
}
