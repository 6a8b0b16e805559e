use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::{error, info, warn};
use radio_link_ui::{
    app::{Event, ViewModel},
    config::AppConfig,
    driver::{DriverClient, native::NativeDriverClient, simulated::SimulatedRadio},
    settings::FileSettingsStore,
    surface,
};
use std::{io::Write, sync::Arc};
use tokio::signal::unix::{SignalKind, signal};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    initialize();

    let config = AppConfig::get();
    info!("settings file: {:?}", config.settings_path);

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    let driver: Arc<dyn DriverClient> =
        Arc::new(NativeDriverClient::new(SimulatedRadio::default()));
    let store = FileSettingsStore::new(&config.settings_path);

    let surface = surface::start(driver, Box::new(store), config);
    let mut views = surface.subscribe();
    surface.set_visible(true);

    let mut shell = Shell::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received interrupt");
                break;
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM");
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    warn!("surface stopped publishing");
                    break;
                }

                let view = views.borrow_and_update().clone();
                if shell.report(&view) {
                    surface.send(Event::ShowPairing {
                        width: config.display.width,
                        height: config.display.height,
                    });
                }
            }
        }
    }

    surface.shutdown().await;
    info!("shut down");

    Ok(())
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();

    info!("module version: {}", env!("CARGO_PKG_VERSION"));
}

/// Headless stand-in for the display layer: logs what a screen would show.
#[derive(Default)]
struct Shell {
    last: ViewModel,
    pairing_requested: bool,
}

impl Shell {
    /// Log what changed since the last view. Returns `true` once, when the
    /// pairing image should be requested.
    fn report(&mut self, view: &ViewModel) -> bool {
        if view.status_label != self.last.status_label
            || view.connectivity_label != self.last.connectivity_label
        {
            info!(
                "{} | {} | {}",
                view.lifecycle, view.status_label, view.connectivity_label
            );
        }

        if view.notice.is_some() && view.notice != self.last.notice {
            info!("notice: {}", view.notice.as_deref().unwrap_or_default());
        }

        if let Some(pairing) = view.pairing.as_ref() {
            if self.last.pairing.as_ref() != Some(pairing) {
                info!("pairing payload ({} px): {}", pairing.size, pairing.payload);
            }
        }

        let request_pairing = view.controls_enabled && !self.pairing_requested;
        self.pairing_requested |= request_pairing;
        self.last = view.clone();

        request_pairing
    }
}
