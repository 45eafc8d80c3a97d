/*
 *  render_loop.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Once-a-second poll, lay out, draw and flush cycle
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

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use chrono::Local;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;
use log::{debug, info, warn};

use crate::constants::DEFAULT_TICK_MS;
use crate::display::{draw_plan, DisplayDriver};
use crate::fonts::FontMetrics;
use crate::layout::{LayoutEngine, LayoutPlan, TitleLayout};
use crate::netaddr::HostAddressSource;
use crate::poller::StatusPoller;
use crate::session::SessionClient;
use crate::snapshot::{IdleInfo, Playback};

/// What one tick put on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Player stopped, idle screen shown.
    Idle,
    Playing(TitleLayout),
    /// Poller gave up this tick, idle screen shown instead.
    Degraded,
}

/// Drives one panel from one session. Nothing survives a tick except the
/// session itself and a failure counter used for logging.
pub struct RenderLoop<C, D, M, A> {
    poller: StatusPoller<C>,
    display: D,
    layout: LayoutEngine<M>,
    address: A,
    interval: Duration,
    ticks: u64,
    consecutive_failures: u32,
}

impl<C, D, M, A> RenderLoop<C, D, M, A>
where
    C: SessionClient,
    D: DisplayDriver + DrawTarget<Color = BinaryColor>,
    D::Error: Debug,
    M: FontMetrics,
    A: HostAddressSource,
{
    /// `poller` is expected to be connected already.
    pub fn new(poller: StatusPoller<C>, display: D, layout: LayoutEngine<M>, address: A) -> Self {
        Self {
            poller,
            display,
            layout,
            address,
            interval: Duration::from_millis(DEFAULT_TICK_MS),
            ticks: 0,
            consecutive_failures: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn poller(&self) -> &StatusPoller<C> {
        &self.poller
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Failed ticks since the last good one.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn idle_plan(&mut self) -> LayoutPlan {
        let idle = IdleInfo::new(Local::now(), self.address.raw_address());
        self.layout.plan_idle(&idle)
    }

    /// clear, poll, lay out, draw, flush
    pub async fn tick(&mut self) -> TickOutcome {
        self.ticks += 1;
        if let Err(e) = DrawTarget::clear(&mut self.display, BinaryColor::Off) {
            warn!("canvas clear failed: {:?}", e);
        }

        let (outcome, plan) = match self.poller.poll().await {
            Ok(polled) => {
                if self.consecutive_failures > 0 {
                    info!("status back after {} failed tick(s)", self.consecutive_failures);
                    self.consecutive_failures = 0;
                }
                match polled.into_playback() {
                    Playback::Playing(snapshot) => {
                        let (layout, plan) = self.layout.plan_playing(&snapshot);
                        (TickOutcome::Playing(layout), plan)
                    }
                    Playback::NothingPlaying => (TickOutcome::Idle, self.idle_plan()),
                }
            }
            Err(fatal) => {
                self.consecutive_failures += 1;
                warn!(
                    "tick {} degraded ({} in a row): {}",
                    self.ticks, self.consecutive_failures, fatal
                );
                (TickOutcome::Degraded, self.idle_plan())
            }
        };

        if let Err(e) = draw_plan(&mut self.display, &plan) {
            warn!("drawing failed: {:?}", e);
        }
        if let Err(e) = self.display.flush() {
            warn!("flush failed: {}", e);
        }

        debug!("tick {}: {:?} ({} lines)", self.ticks, outcome, plan.len());
        outcome
    }

    /// Tick until `shutdown` resolves, sleeping a fixed interval after each
    /// tick.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.tick() => {}
            }
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        info!("render loop stopped after {} tick(s)", self.ticks);
    }

    /// Blank the panel and drop the session.
    pub async fn finish(&mut self) {
        if let Err(e) = DisplayDriver::clear(&mut self.display) {
            warn!("could not blank display: {}", e);
        }
        self.poller.close().await;
    }
}
