use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use midiloop_midi::{compiled_apis, open_output, output_ports, resolve_api, PortSelector};
use midiloop_player::{cancel_pair, Outcome, Player, Session, Song};

#[derive(Debug, Parser)]
#[command(author, version, about = "Play a MIDI file on a MIDI device")]
struct Cli {
    /// Path to the MIDI file to play. Required unless --list is given.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// MIDI output port to write to (port number or substring of a port
    /// name). If none is given, a virtual output port is created.
    #[arg(short, long)]
    output: Option<PortSelector>,

    /// MIDI API to use. Use default on non-Linux systems.
    #[arg(short, long, value_enum, default_value_t = ApiChoice::Default)]
    api: ApiChoice,

    /// Name of the MIDI client to advertise.
    #[arg(short, long, default_value = "midiloop")]
    client: String,

    /// Loop the playback indefinitely.
    #[arg(long = "loop")]
    loop_playback: bool,

    /// List the available APIs and their MIDI output ports, then exit.
    #[arg(long)]
    list: bool,

    /// Trace every event as it is sent.
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ApiChoice {
    Jack,
    Alsa,
    Default,
}

impl ApiChoice {
    fn as_str(self) -> &'static str {
        match self {
            ApiChoice::Jack => "jack",
            ApiChoice::Alsa => "alsa",
            ApiChoice::Default => "default",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Cancelled) => ExitCode::FAILURE,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> Result<Outcome> {
    resolve_api(cli.api.as_str())?;

    if cli.list {
        list_ports(&cli.client);
        return Ok(Outcome::Completed);
    }

    let file = cli
        .file
        .context("a MIDI file is required unless --list is given; see --help")?;
    let song = Song::load(&file)?;

    let (handle, token) = cancel_pair();
    ctrlc::set_handler(move || handle.cancel()).context("failed to install signal handler")?;

    let output = open_output(&cli.client, cli.output.as_ref())?;
    let mut session = Session::new(output);
    let player = Player::new(cli.loop_playback);
    let outcome = {
        let sink = session
            .sink_mut()
            .context("MIDI output closed before playback")?;
        player.play(&song, sink, &token)?
    };
    session.shutdown();
    Ok(outcome)
}

/// Print the compiled backends and their output ports. A backend whose
/// enumeration fails gets a single coarse error line; the detail only
/// shows up in the log.
fn list_ports(client: &str) {
    println!("Available APIs:");
    for (index, api) in compiled_apis().into_iter().enumerate() {
        println!("{index}: {}", api.display_name());
        match output_ports(client) {
            Ok(ports) if ports.is_empty() => println!("  (no output ports)"),
            Ok(ports) => {
                for (port, name) in ports.iter().enumerate() {
                    println!("  {port}: {name}");
                }
            }
            Err(err) => {
                warn!(api = api.display_name(), error = %err, "port enumeration failed");
                println!("Error while reading from the API.");
            }
        }
    }
}
