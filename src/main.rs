use std::env;

use raydrive::app::App;
use raydrive::config::SimConfig;
use raydrive::error::SimError;
use raydrive::input::InputEvent;
use raydrive::logging;
use raydrive::resources::ReadySignal;
use raydrive::state::SnapshotHub;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::{interval, Duration, Instant};
use tracing::{debug, error, info, warn};

const VIEWPORT: (u32, u32) = (1280, 720);
const REPORT_EVERY: f32 = 1.0; // s

fn load_config() -> Result<SimConfig, SimError> {
    match env::var("RAYDRIVE_CONFIG") {
        Ok(path) => {
            info!(%path, "loading configuration");
            SimConfig::load(path)
        }
        Err(_) => Ok(SimConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), SimError> {
    logging::init();
    info!("starting headless vehicle simulation");

    let config = load_config().inspect_err(|e| error!(error = %e, "configuration rejected"))?;
    let resources = ReadySignal::spawn(config.assets.clone());
    let mut app = App::new(config, resources, VIEWPORT.0, VIEWPORT.1)?;

    // Input: one event per stdin line
    let sender = app.input_sender();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match line.parse::<InputEvent>() {
                    Ok(event) => {
                        if sender.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "ignoring input line"),
                },
                Ok(None) => {
                    debug!("stdin closed");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });

    // Output: JSON snapshots, one per line
    let mut hub = SnapshotHub::new();
    let mut snapshots = hub.subscribe();
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(json) = snapshots.recv().await {
            let line = json + "\n";
            if stdout.write_all(line.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    // ~60 Hz frame ticker
    let mut ticker = interval(Duration::from_millis(16));
    let mut last = Instant::now();
    let mut since_report = 0.0;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f32();
                last = now;

                app.frame(dt);

                since_report += dt;
                if since_report >= REPORT_EVERY {
                    since_report = 0.0;
                    let snapshot = app.snapshot();
                    if let Some(vehicle) = &snapshot.vehicle {
                        debug!(
                            frame = snapshot.frame,
                            position = ?vehicle.position,
                            speed_kmh = vehicle.speed_kmh,
                            "vehicle state"
                        );
                    }
                    if let Err(e) = hub.broadcast(&snapshot) {
                        warn!(error = %e, "snapshot not sent");
                    }
                }
            }
            _ = &mut shutdown => {
                info!(frames = app.frame_count(), "shutting down");
                break;
            }
        }
    }

    Ok(())
}
