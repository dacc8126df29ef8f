//! Nibbler debugger - serial debugging harness for the Nibbler CPU
//!
//! Entry point that handles CLI argument parsing, opens the serial link
//! and hands the session to the REPL.

use anyhow::Context;
use clap::Parser;
use std::time::Duration;

use nibbler_dbg::app::Session;
use nibbler_dbg::core::{OperatingMode, TransportConfig};
use nibbler_dbg::ui::cli::run_cli;

/// Nibbler debugger: drive a Nibbler CPU over its debug firmware
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial device the firmware is attached to (e.g. /dev/ttyACM0, COM3)
    #[arg(required_unless_present = "list_ports")]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = 115_200)]
    baud: u32,

    /// Operating mode: 0/program runs from ROM, 1/instruction loads from the host
    #[arg(short, long, default_value = "0")]
    mode: OperatingMode,

    /// Per-byte read timeout in milliseconds (0 = non-blocking)
    #[arg(long, default_value_t = 0)]
    read_timeout_ms: u64,

    /// How long to wait for the ready byte and acknowledgement
    #[arg(long, default_value_t = 10_000)]
    handshake_timeout_ms: u64,

    /// How long to wait for the first frame after a command
    #[arg(long, default_value_t = 50)]
    response_window_ms: u64,

    /// List available serial ports and exit
    #[arg(long, default_value_t = false)]
    list_ports: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn list_ports() -> anyhow::Result<()> {
    let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("[*] No serial ports found");
    }
    for port in ports {
        println!("    {}", port.port_name);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // 1. Parse command line arguments
    let args = Args::parse();

    // 2. Initialize logger with verbosity level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    ))
    .init();

    if args.list_ports {
        return list_ports();
    }

    let port = args.port.context("No serial port given")?;
    log::debug!("Port: {}, baud: {}, mode: {}", port, args.baud, args.mode);

    let mut config = TransportConfig::new(port.clone(), args.baud, args.mode);
    config.read_timeout = Duration::from_millis(args.read_timeout_ms);
    config.handshake_timeout = Duration::from_millis(args.handshake_timeout_ms);
    config.response_window = Duration::from_millis(args.response_window_ms);

    // 3. Connect and run the REPL
    println!("[*] Nibbler debugger v{} - waiting for {}", env!("CARGO_PKG_VERSION"), port);
    let session = Session::open(config)
        .with_context(|| format!("Failed to connect to the firmware on {}", port))?;
    log::info!("Connected in {}", session.mode());

    run_cli(session)
}
