// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The scene session: the single entry point a host drives.

use super::lifecycle::{self, LifecycleDispatcher, LifecycleEvent};
use super::{
    FrameReport, HostHooks, LightingAgent, LightingError, OccludingToken, OcclusionMaskSprite,
    RoofSprite, SceneHost,
};
use std::path::Path;
use std::sync::Arc;
use umbra_core::event::EventBus;
use umbra_core::renderer::{GraphicsDevice, RenderTarget, TextureId};
use umbra_core::LightingSettings;
use umbra_lanes::composite_lane::DepthReport;

/// Owns the lighting state of one scene and routes the host's calls into it.
///
/// Lifecycle events arrive either directly through [`SceneSession::handle`]
/// or through the session's event bus, drained by
/// [`SceneSession::pump_events`]. Host operations the overlay takes over go
/// through the [`HostHooks`] chains.
///
/// Closing the session consumes it; nothing can use the lanes afterwards.
pub struct SceneSession {
    agent: LightingAgent,
    hooks: HostHooks,
    dispatcher: LifecycleDispatcher,
    events: EventBus<LifecycleEvent>,
}

impl SceneSession {
    /// Creates a session, registering the occlusion mask and installing the
    /// overlay's strategies and lifecycle listeners.
    ///
    /// # Errors
    ///
    /// Returns [`LightingError::Initialization`] when the device cannot back
    /// the session's resources, or [`LightingError::Intercept`] when the
    /// strategies conflict.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        host: Box<dyn SceneHost>,
        settings: LightingSettings,
    ) -> Result<Self, LightingError> {
        let agent = LightingAgent::new(device, host, settings)?;

        let mut hooks = HostHooks::new();
        hooks.install_core()?;

        let mut dispatcher = LifecycleDispatcher::new();
        lifecycle::install(&mut dispatcher);

        log::info!("Scene session opened");
        Ok(Self {
            agent,
            hooks,
            dispatcher,
            events: EventBus::new(),
        })
    }

    /// Creates a session with settings read from a RON file.
    pub fn with_settings_file(
        device: Arc<dyn GraphicsDevice>,
        host: Box<dyn SceneHost>,
        path: impl AsRef<Path>,
    ) -> Result<Self, LightingError> {
        let settings = LightingSettings::load(path)?;
        Self::new(device, host, settings)
    }

    /// Dispatches one lifecycle event to its listeners.
    ///
    /// # Errors
    ///
    /// Returns the first listener failure. The remaining listeners still run.
    pub fn handle(&mut self, event: LifecycleEvent) -> Result<(), LightingError> {
        let fired = self.dispatcher.dispatch(&mut self.agent, &event)?;
        log::debug!("{event:?} reached {fired} listeners");
        Ok(())
    }

    /// Handles every event queued on the bus, in send order.
    ///
    /// # Returns
    ///
    /// The number of events handled, or the first failure once all queued
    /// events were handled.
    pub fn pump_events(&mut self) -> Result<usize, LightingError> {
        let events = self.events.drain();
        let count = events.len();
        let mut first_error = None;
        for event in events {
            if let Err(e) = self.handle(event) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(count),
        }
    }

    /// A sender the host can queue lifecycle events on.
    pub fn event_sender(&self) -> flume::Sender<LifecycleEvent> {
        self.events.sender()
    }

    /// Runs one lighting refresh and announces it.
    pub fn refresh_lighting(&mut self) -> Result<FrameReport, LightingError> {
        let report = self.hooks.refresh_lighting.invoke(&mut self.agent, ())?;
        self.agent.last_frame = Some(report.clone());
        self.handle(LifecycleEvent::LightingRefreshed)?;
        Ok(report)
    }

    /// Initializes the host's light sources.
    pub fn initialize_light_sources(&mut self) -> Result<(), LightingError> {
        self.hooks
            .initialize_light_sources
            .invoke(&mut self.agent, ())
    }

    /// Asks whether the global light changed.
    pub fn update_global_light(&mut self) -> bool {
        self.hooks.update_global_light.invoke(&mut self.agent, ())
    }

    /// Whether fog exploration is enabled.
    pub fn fog_exploration(&mut self) -> bool {
        self.hooks.fog_exploration.invoke(&mut self.agent, ())
    }

    /// Runs the host's occlusion update.
    pub fn update_occlusion(&mut self) -> Result<(), LightingError> {
        self.hooks.update_occlusion.invoke(&mut self.agent, ())
    }

    /// Draws the occlusion shapes of `tokens`.
    pub fn draw_occlusion_shapes(
        &mut self,
        tokens: Vec<OccludingToken>,
    ) -> Result<(), LightingError> {
        self.hooks
            .draw_occlusion_shapes
            .invoke(&mut self.agent, tokens)
    }

    /// Builds the host's occlusion mask sprite.
    pub fn draw_occlusion_mask(&mut self) -> OcclusionMaskSprite {
        self.hooks.draw_occlusion_mask.invoke(&mut self.agent, ())
    }

    /// Looks up the roof sprite of a tile.
    pub fn roof_sprite(&mut self, tile: impl Into<String>) -> Option<RoofSprite> {
        self.hooks.roof_sprite.invoke(&mut self.agent, tile.into())
    }

    /// Frame boundary: runs every due deferred task.
    ///
    /// # Returns
    ///
    /// The number of tasks that ran.
    pub fn tick(&mut self) -> usize {
        let ran = self.agent.run_due_tasks();
        if ran > 0 {
            log::trace!("Tick ran {ran} deferred tasks");
        }
        ran
    }

    /// Renders region depth into `target`, once the depth pass is installed.
    pub fn render_depth(&mut self, target: &RenderTarget) -> Option<DepthReport> {
        let agent = &mut self.agent;
        let pass = agent.depth_pass.as_mut()?;
        Some(pass.render(&*agent.device, target, agent.regions.regions()))
    }

    /// The occlusion mask texture, rebuilt first if stale.
    pub fn occlusion_texture(&mut self) -> Result<TextureId, LightingError> {
        self.agent.occlusion_texture()
    }

    /// Releases every lighting resource and drops the listeners.
    ///
    /// # Returns
    ///
    /// The host, handed back to the caller.
    pub fn close(mut self) -> Box<dyn SceneHost> {
        self.agent.framebuffer.tear_down();
        self.agent.masks.tear_down();
        self.agent.ticker.clear();
        self.dispatcher.clear();
        log::info!("Scene session closed after {} frames", self.agent.frames);
        self.agent.host
    }

    /// The lighting state.
    pub fn agent(&self) -> &LightingAgent {
        &self.agent
    }

    /// The lighting state, mutably.
    pub fn agent_mut(&mut self) -> &mut LightingAgent {
        &mut self.agent
    }

    /// The intercept chains, for host-side strategies.
    pub fn hooks_mut(&mut self) -> &mut HostHooks {
        &mut self.hooks
    }

    /// The lifecycle table, for host-side listeners.
    pub fn dispatcher_mut(&mut self) -> &mut LifecycleDispatcher {
        &mut self.dispatcher
    }
}

impl std::fmt::Debug for SceneSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSession")
            .field("agent", &self.agent)
            .field("hooks", &self.hooks)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
