use clap::{Parser, Subcommand};
use pairfwd::config;
use pairfwd::dataplane::{self, CoreAssignment, CoreId, Engine, EngineSlot};
use pairfwd::port::AfPacketPorts;
use pairfwd::shutdown::{self, ShutdownToken};
use pairfwd::stats;
use pairfwd::telemetry::init_logging;
use pairfwd::{Error, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Parser)]
#[command(name = "pairfwd")]
#[command(about = "Minimal line-rate L2 forwarder over paired interfaces")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the forwarder
    Run {
        /// Path to the config file
        #[arg(short, long, default_value = "pairfwd.toml")]
        config: PathBuf,
    },
    /// Validate a config file without starting
    Check {
        /// Path to the config file
        #[arg(short, long, default_value = "pairfwd.toml")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run { config }) => cmd_run(&config),
        Some(Commands::Check { config }) => cmd_check(&config),
        None => cmd_run(&PathBuf::from("pairfwd.toml")),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

fn cmd_check(path: &PathBuf) -> Result<()> {
    let config = config::load(path)?;
    let result = config::validate(&config);
    result.print_diagnostics();
    if result.has_errors() {
        return Err(Error::Config("validation failed".into()));
    }
    println!("{} OK: {} ports", path.display(), config.ports.len());
    Ok(())
}

fn cmd_run(path: &PathBuf) -> Result<()> {
    let config = config::load(path)?;
    init_logging(Some(&(&config.log).into()));

    // Fatal before any dataplane state exists.
    let validation = config::validate(&config);
    validation.print_diagnostics();
    if validation.has_errors() {
        return Err(Error::Config("validation failed".into()));
    }

    let interfaces: Vec<String> = config
        .ports
        .iter()
        .map(|p| p.interface.clone())
        .collect();

    info!("binding {} ports: {:?}", interfaces.len(), interfaces);
    let ports = AfPacketPorts::open(&interfaces, config.pool_frames, config.frame_cap)?;

    // Best-effort advisory only; a down port just forwards nothing.
    stats::log_link_state(&ports);

    let token = ShutdownToken::new();

    // Block SIGINT/SIGTERM before spawning so every worker inherits the
    // mask and only the listener thread consumes them.
    shutdown::block_termination_signals();
    shutdown::spawn_signal_listener(token.clone());

    let engine = Engine::new(ports, config.burst, config.mac_swap, token);
    let slot: Arc<EngineSlot<AfPacketPorts>> = Arc::new(Mutex::new(Some(engine)));
    let assignment = CoreAssignment::new(config.forwarder_core);

    let core_count: usize = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    info!(
        cores = core_count,
        forwarder = assignment.forwarder(),
        "launching per-core workers"
    );

    let mut workers = Vec::with_capacity(core_count);
    for core in 0..core_count as CoreId {
        let assignment = assignment.clone();
        let slot = Arc::clone(&slot);
        let handle = std::thread::Builder::new()
            .name(format!("core-{}", core))
            .spawn(move || dataplane::run_on_core(core, &assignment, &slot))
            .map_err(Error::Io)?;
        workers.push(handle);
    }

    for handle in workers {
        let name = handle.thread().name().unwrap_or("core-?").to_string();
        if handle.join().is_err() {
            return Err(Error::WorkerPanic { name });
        }
    }

    info!("all workers joined, exiting");
    Ok(())
}
