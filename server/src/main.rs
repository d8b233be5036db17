//! `rt-server` — binds the transport, drives the fixed-timestep simulation
//! loop and bridges the two (`SPEC_FULL.md` §6, §5). Grounded on
//! `neutronium`'s `World::run`/`run_once` shape and `game/runner/src/main.rs`'s
//! role as the process entry point, generalized from the teacher's plugin
//! registration to this crate's fixed 12-step schedule plus the network
//! bridge the teacher's runner has no equivalent of.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use rt_common::logging::{self, Logger};
use rt_ecs::world::World;
use rt_proto::transport::Transport;
use rt_sim::prelude::*;

const ENV_CONFIG_PATH: &str = "RT_SERVER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "server_config.toml";
const POLL_TIMEOUT: Duration = Duration::from_millis(10);
const SHUTDOWN_FLUSH_DEADLINE: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "rt-server", version, about = "Authoritative R-Type server core")]
struct Cli {
    /// Path to the TOML config file. Overrides RT_SERVER_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error. Overrides RT_LOG_LEVEL.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let level = cli.log_level.and_then(|s| s.parse().ok());
    let log = logging::init(level);

    let config_path = cli
        .config
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config: ServerConfig = rt_common::config::load_or_default(&config_path);
    logging::info!(log, "config loaded"; "path" => %config_path.display(), "tick_rate" => config.tick_rate);

    match run(config, log.clone()) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            logging::error!(log, "fatal startup error"; "error" => %err);
            std::process::exit(1)
        }
    }
}

fn run(config: ServerConfig, log: Logger) -> std::io::Result<()> {
    let tcp_addr = format!("0.0.0.0:{}", config.listen_port).parse().expect("valid tcp bind address");
    let udp_addr = format!("0.0.0.0:{}", config.udp_port).parse().expect("valid udp bind address");
    let mut transport = Transport::bind(tcp_addr, udp_addr, log.clone())?;
    let input_queue = transport.input_queue();

    let mut world = World::new(log.new(logging::o!("subsystem" => "world")));
    world.registry_mut().insert_resource(WorldBounds {
        width: config.world_width,
        height: config.world_height,
        off_screen_margin: 50.0,
    });
    world.registry_mut().insert_resource(PlayerIndex::default());
    world.registry_mut().insert_resource(NetIdIndex::default());
    world.registry_mut().insert_resource(SnapshotRing::new(config.snapshot_history));
    rt_sim::systems::register_all(&mut world, &config);
    world.build();

    let mut bridge = Bridge::new(config.net_id_base, 1, config.udp_port);
    let mut game_loop = GameLoop::new(config.tick_duration(), config.max_catchup_ticks);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)).expect("failed to install signal handler");
    }

    logging::info!(log, "server started"; "tcp_port" => config.listen_port, "udp_port" => config.udp_port);

    let mut last_tick = Instant::now();
    while !shutdown.load(Ordering::SeqCst) {
        transport.poll_once(POLL_TIMEOUT)?;

        let now = Instant::now();
        let real_dt = now.duration_since(last_tick);
        last_tick = now;

        let ticks_run = game_loop.advance(real_dt, &mut world, |world| {
            for event in input_queue.drain() {
                bridge.handle_event(event, world, &mut transport);
            }
        });

        if ticks_run > 0 {
            bridge.broadcast_deltas(&mut world, &mut transport, config.position_delta_threshold);
        }

        bridge.enforce_timeouts(
            config.connect_timeout_s,
            config.ready_timeout_s,
            config.input_silence_grace_ms / 1000,
            &mut transport,
        );

        transport.flush_writes();
    }

    logging::info!(log, "shutdown requested, draining"; "deadline_ms" => SHUTDOWN_FLUSH_DEADLINE.as_millis() as u64);
    bridge.broadcast_shutdown(&mut transport);
    let drain_start = Instant::now();
    while drain_start.elapsed() < SHUTDOWN_FLUSH_DEADLINE {
        transport.flush_writes();
        std::thread::sleep(Duration::from_millis(10));
    }

    logging::info!(log, "server stopped");
    Ok(())
}
