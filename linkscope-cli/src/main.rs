use linkscope_capture::{
    default_interface, get_interface, list_interfaces, CaptureConfig, DatalinkSender,
    PacketCapture,
};
use linkscope_cli::{display, Cli, Commands, LoggingObserver, WatchArgs};
use linkscope_core::{Error, Result};
use linkscope_engine::{
    Broadcaster, CaptureSession, IngestPipeline, NeighborStore, StalenessSweeper,
    SweepThresholds,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{error, info, warn, Level};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Interfaces { all } => show_interfaces(all),
        Commands::Watch(args) => watch(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "linkscope failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn show_interfaces(all: bool) -> Result<()> {
    for iface in list_interfaces()? {
        if !all && !iface.is_capture_capable() {
            continue;
        }

        let desc = &iface.descriptor;
        let addrs: Vec<String> = desc
            .ipv4_addresses
            .iter()
            .map(|ip| ip.to_string())
            .chain(desc.ipv6_addresses.iter().map(|ip| ip.to_string()))
            .collect();

        println!(
            "{:<16} {}  {:<4} {}",
            desc.name,
            desc.mac_address,
            if iface.is_up { "up" } else { "down" },
            addrs.join(", ")
        );
    }
    Ok(())
}

async fn watch(args: WatchArgs) -> Result<()> {
    let info = match &args.interface {
        Some(name) => get_interface(name)?,
        None => default_interface()?,
    };
    let iface = info.descriptor.clone();
    let config = args.discovery_config();

    info!(interface = %iface, "Watching for CDP/LLDP neighbors");

    let store = Arc::new(NeighborStore::with_observer(Arc::new(LoggingObserver)));
    let pipeline = Arc::new(IngestPipeline::new(Arc::clone(&store)).with_local_mac(iface.mac_address));

    let capture = PacketCapture::with_config(
        iface.name.clone(),
        CaptureConfig {
            promiscuous: !args.no_promisc,
            ..Default::default()
        },
    );
    let mut session = CaptureSession::new(capture, Arc::clone(&pipeline));
    session.start()?;

    let broadcaster = if config.broadcasting() {
        let sender = Arc::new(DatalinkSender::open(&iface.name)?);
        let broadcaster = Broadcaster::new(config.clone(), iface.clone(), sender);
        broadcaster.start()?;
        Some(broadcaster)
    } else {
        None
    };

    let sweeper = StalenessSweeper::new(Arc::clone(&store), SweepThresholds::from(&config));
    sweeper.start()?;

    let mut refresh = tokio::time::interval(args.refresh_period());
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    warn!(error = %e, "Ctrl-C handler failed");
                }
                break;
            }
            _ = refresh.tick() => {
                print!("{}", display::format_table(&store.get_all(), SystemTime::now()));
                println!();
                store.clear_new_flags();
            }
        }
    }

    info!("Shutting down");
    if let Some(broadcaster) = &broadcaster {
        broadcaster.stop_and_wait().await;
        let stats = broadcaster.stats();
        info!(
            cdp_sent = stats.cdp_sent,
            lldp_sent = stats.lldp_sent,
            failed = stats.cdp_failed + stats.lldp_failed,
            "Broadcaster totals"
        );
    }
    sweeper.stop().await;

    // Kernel drop counts are only final once the capture thread has exited
    let capture_stats = tokio::task::spawn_blocking(move || {
        session.stop()?;
        Ok::<_, Error>(session.source().stats())
    })
    .await
    .map_err(|e| Error::Capture(format!("Capture shutdown failed: {}", e)))??;

    let stats = pipeline.stats();
    info!(
        received = capture_stats.packets_received,
        dropped = capture_stats.packets_dropped,
        drop_rate = format!("{:.2}%", capture_stats.drop_rate()),
        frames = stats.frames_seen,
        cdp = stats.cdp_decoded,
        lldp = stats.lldp_decoded,
        malformed = stats.malformed,
        neighbors = store.count(),
        "Capture totals"
    );
    Ok(())
}
