//! gridmock - virtual grid-device simulator
//!
//! Receives a control surface's button/pad MIDI and answers with LED sysex
//! like the real device would, so surface-side integrations can be tested
//! without hardware.

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridmock::codec;
use gridmock::device::DeviceState;
use gridmock::midi::format_hex;
use gridmock::surface::{discovery, SurfaceLink};

/// Virtual grid-device simulator - answers a control surface over MIDI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// List available MIDI ports and exit
    #[arg(short, long)]
    list: bool,

    /// Input MIDI port name (from the surface)
    #[arg(short, long, value_name = "NAME")]
    input: Option<String>,

    /// Output MIDI port name (to the surface)
    #[arg(short, long, value_name = "NAME")]
    output: Option<String>,

    /// Log raw bytes of all surface traffic
    #[arg(short, long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.list {
        discovery::print_ports();
        return Ok(());
    }

    let (input, output) = resolve_ports(&args)?;

    let mut surface = SurfaceLink::new();
    surface.connect(&input, &output)?;

    let device = DeviceState::new();

    run_loop(surface, device, args.verbose, shutdown_signal()).await?;

    info!("gridmock shutdown complete");
    Ok(())
}

/// Resolve the port pair from flags, falling back to auto-detection.
fn resolve_ports(args: &Args) -> Result<(String, String)> {
    let detected = if args.input.is_none() || args.output.is_none() {
        discovery::find_surface_ports()
    } else {
        None
    };

    let input = args
        .input
        .clone()
        .or_else(|| detected.as_ref().map(|(i, _)| i.clone()));
    let output = args
        .output
        .clone()
        .or_else(|| detected.as_ref().map(|(_, o)| o.clone()));

    match (input, output) {
        (Some(input), Some(output)) => Ok((input, output)),
        _ => {
            discovery::print_ports();
            Err(anyhow!(
                "could not find surface MIDI ports; pick from the list above with --input/--output"
            ))
        }
    }
}

/// Single-threaded processing loop: drain surface events in arrival order
/// through decode -> state machine -> encode, send each resulting frame, and
/// stop on the shutdown signal. Per-message failures are logged and skipped.
async fn run_loop(
    mut surface: SurfaceLink,
    mut device: DeviceState,
    verbose: bool,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let mut events = surface
        .take_event_receiver()
        .ok_or_else(|| anyhow!("surface event receiver already taken"))?;

    // Push the boot pattern so the surface starts from a known picture.
    let snapshot = device.snapshot();
    if let Some(frame) = codec::encode_led_frame(&snapshot) {
        surface.send_frame(&frame)?;
        info!("Sent initial state: {} LEDs", snapshot.len());
    }

    info!("gridmock running - press Ctrl+C to exit");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if verbose {
                    info!("RX {} | {}", format_hex(&event.raw), event.message);
                }

                let surface_event = match codec::classify(event.message) {
                    Ok(ev) => ev,
                    Err(err) => {
                        debug!("Discarding inbound message: {}", err);
                        continue;
                    }
                };

                let updates = device.apply(&surface_event);
                if let Some(frame) = codec::encode_led_frame(&updates) {
                    match surface.send_frame(&frame) {
                        Ok(()) => debug!("LED update: {} LEDs", updates.len()),
                        Err(err) => warn!("Failed to send LED update: {}", err),
                    }
                }
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    surface.disconnect();
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
