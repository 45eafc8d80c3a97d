/*
 *  main.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Daemon entry point
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use embedded_graphics::prelude::Size;
use env_logger::Env;
use log::{error, info};
use tokio::signal::unix::{signal, SignalKind};

use mpdoled::config::{Cli, Config};
use mpdoled::display::{DisplayDriver, DisplayDriverFactory};
use mpdoled::fonts::MonoFontMetrics;
use mpdoled::layout::LayoutEngine;
use mpdoled::netaddr::{CachedAddress, InterfaceAddressSource};
use mpdoled::poller::{PollerFatal, StatusPoller};
use mpdoled::render_loop::RenderLoop;
use mpdoled::session::MpdSession;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

async fn shutdown_requested() {
    if let Err(e) = signal_handler().await {
        // without handlers the only way out is a kill, so keep rendering
        error!("could not install signal handlers: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let display_config = config.effective_display();
    let panel = DisplayDriverFactory::create_from_config(&display_config)
        .context("display setup failed")?;
    let (width, height) = panel.dimensions();
    info!("Display ........: {} {}x{}", panel.name(), width, height);

    let session = MpdSession::new(config.mpd_host(), config.mpd_port())
        .with_io_timeout(config.mpd_timeout());
    info!("MPD endpoint ...: {}", session.endpoint());

    let mut poller = StatusPoller::new(session, config.mpd_password());
    poller.connect().await?;

    let layout = LayoutEngine::new(MonoFontMetrics, Size::new(width, height))
        .with_idle_text(config.idle_text());
    let address = CachedAddress::new(InterfaceAddressSource, config.tick());

    let mut render = RenderLoop::new(poller, panel, layout, address).with_interval(config.tick());
    render.run(shutdown_requested()).await;
    render.finish().await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mpdoled: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.dump_config {
        return match config.to_yaml() {
            Ok(yaml) => {
                println!("{yaml}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("mpdoled: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} now-playing monitor", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);
    info!("Tick ...........: {:?}", config.tick());

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(fatal) = e.downcast_ref::<PollerFatal>() {
                error!("Fatal poller error: {}", fatal);
            } else {
                error!("{:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
