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

//! Defines the LightingAgent, the state of one scene session.

use super::occlusion::{self, OcclusionState};
use super::{FrameReport, LightingError, OccludingToken, SceneHost};
use std::fmt;
use std::sync::{Arc, RwLock};
use umbra_core::renderer::{GraphicsDevice, RenderError, TextureId};
use umbra_core::schedule::Ticker;
use umbra_core::LightingSettings;
use umbra_lanes::composite_lane::{DepthPass, IlluminationBackground, LightingFramebuffer};
use umbra_lanes::mask_lane::{MaskCache, MaskHandle};
use umbra_lanes::region_lane::{PerceptionDelta, RegionAggregator};

/// Every piece of state the lighting overlay keeps for one open scene.
///
/// Intercept strategies, lifecycle listeners and deferred tasks all receive
/// the agent mutably, so nothing lives in globals.
pub struct LightingAgent {
    // Shared GPU device used by the mask cache, framebuffer and depth pass.
    pub(crate) device: Arc<dyn GraphicsDevice>,
    pub(crate) settings: LightingSettings,
    pub(crate) regions: RegionAggregator,
    pub(crate) masks: MaskCache,
    pub(crate) framebuffer: LightingFramebuffer,
    // Read by the occlusion mask subscribers, written by the occlusion hooks.
    pub(crate) occlusion: Arc<RwLock<OcclusionState>>,
    pub(crate) occlusion_mask: MaskHandle,
    pub(crate) ticker: Ticker<LightingAgent>,
    pub(crate) host: Box<dyn SceneHost>,
    // Installed by the first `SceneGroupDrawn`.
    pub(crate) depth_pass: Option<DepthPass>,
    // Created by `SceneGroupCreated`.
    pub(crate) illumination_background: Option<IlluminationBackground>,
    // Armed by `SceneReady`, consumed by the next `LightingRefreshed`.
    pub(crate) cullability_armed: bool,
    // Aggregate flags cached by the last frame.
    pub(crate) global_light: bool,
    pub(crate) fog_exploration: bool,
    // Delta of a frame that failed before the host received it.
    pub(crate) undelivered: PerceptionDelta,
    pub(crate) frames: u64,
    pub(crate) last_frame: Option<FrameReport>,
}

impl LightingAgent {
    /// Builds the session state and verifies the occlusion mask can be
    /// allocated on `device`.
    ///
    /// # Errors
    ///
    /// Returns [`LightingError::Initialization`] when the mask cannot be
    /// created or its texture cannot be allocated and cleared.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        host: Box<dyn SceneHost>,
        settings: LightingSettings,
    ) -> Result<Self, LightingError> {
        let scene = host.scene_dimensions();
        let mut masks = MaskCache::new(Arc::clone(&device), scene, settings.mask_resolution);
        let occlusion = Arc::new(RwLock::new(OcclusionState::default()));

        let occlusion_mask =
            occlusion::register(&mut masks, &settings.occlusion_mask_name, Arc::clone(&occlusion))
                .map_err(init_failed)?;
        masks.texture(occlusion_mask).map_err(init_failed)?;

        let framebuffer = LightingFramebuffer::new(
            Arc::clone(&device),
            settings.default_darkness,
            settings.default_background,
        );

        log::info!(
            "Lighting agent ready for a {}x{} scene",
            scene.width,
            scene.height
        );

        Ok(Self {
            device,
            settings,
            regions: RegionAggregator::new(),
            masks,
            framebuffer,
            occlusion,
            occlusion_mask,
            ticker: Ticker::new(),
            host,
            depth_pass: None,
            illumination_background: None,
            cullability_armed: false,
            global_light: false,
            fog_exploration: false,
            undelivered: PerceptionDelta::none(),
            frames: 0,
            last_frame: None,
        })
    }

    /// Runs every deferred task that is due, in priority order.
    ///
    /// # Returns
    ///
    /// The number of tasks that ran.
    pub fn run_due_tasks(&mut self) -> usize {
        let due = self.ticker.take_due();
        let count = due.len();
        for task in due {
            task(self);
        }
        count
    }

    /// The device the session renders with.
    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// The session settings.
    pub fn settings(&self) -> &LightingSettings {
        &self.settings
    }

    /// The region set.
    pub fn regions(&self) -> &RegionAggregator {
        &self.regions
    }

    /// The region set, for the scene layer to write.
    pub fn regions_mut(&mut self) -> &mut RegionAggregator {
        &mut self.regions
    }

    /// The mask cache.
    pub fn masks(&self) -> &MaskCache {
        &self.masks
    }

    /// The mask cache, for registering further masks.
    pub fn masks_mut(&mut self) -> &mut MaskCache {
        &mut self.masks
    }

    /// The lighting framebuffer.
    pub fn framebuffer(&self) -> &LightingFramebuffer {
        &self.framebuffer
    }

    /// The host.
    pub fn host(&self) -> &dyn SceneHost {
        self.host.as_ref()
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut dyn SceneHost {
        self.host.as_mut()
    }

    /// The occlusion mask handle.
    pub fn occlusion_mask(&self) -> MaskHandle {
        self.occlusion_mask
    }

    /// Returns the occlusion mask texture, rebuilding it if dirty.
    ///
    /// The host's foreground tiles are checked again before a rebuild.
    pub fn occlusion_texture(&mut self) -> Result<TextureId, LightingError> {
        if self.masks.is_dirty(self.occlusion_mask)? {
            let tiles = self.host.has_foreground_tiles();
            self.with_occlusion(|s| s.foreground_tiles = tiles)?;
        }
        Ok(self.masks.texture(self.occlusion_mask)?)
    }

    /// A snapshot of the occlusion state.
    pub fn occlusion_state(&self) -> Result<OcclusionState, LightingError> {
        self.occlusion
            .read()
            .map(|s| s.clone())
            .map_err(|_| LightingError::StatePoisoned)
    }

    pub(crate) fn with_occlusion<T>(
        &self,
        f: impl FnOnce(&mut OcclusionState) -> T,
    ) -> Result<T, LightingError> {
        let mut state = self
            .occlusion
            .write()
            .map_err(|_| LightingError::StatePoisoned)?;
        Ok(f(&mut state))
    }

    /// Tokens stored by the last `draw_occlusion_shapes`.
    pub fn occluding_tokens(&self) -> Option<Vec<OccludingToken>> {
        self.occlusion.read().ok().and_then(|s| s.tokens.clone())
    }

    /// Whether the host's occlusion update is running.
    pub fn is_updating_occlusion(&self) -> bool {
        self.occlusion.read().map(|s| s.updating).unwrap_or(false)
    }

    /// Aggregate global light as of the last frame.
    pub fn global_light(&self) -> bool {
        self.global_light
    }

    /// Aggregate fog exploration as of the last frame.
    pub fn fog_exploration(&self) -> bool {
        self.fog_exploration
    }

    /// Returns `true` once the depth pass is installed.
    pub fn depth_pass_installed(&self) -> bool {
        self.depth_pass.is_some()
    }

    /// The illumination background sampler, once created.
    pub fn illumination_background(&self) -> Option<&IlluminationBackground> {
        self.illumination_background.as_ref()
    }

    /// Whether the cullability fix-up waits for the next refresh.
    pub fn cullability_armed(&self) -> bool {
        self.cullability_armed
    }

    /// Number of deferred tasks waiting for the next tick.
    pub fn pending_tasks(&self) -> usize {
        self.ticker.pending()
    }

    /// Perception changes carried over from a failed frame into the next one.
    pub fn undelivered_delta(&self) -> PerceptionDelta {
        self.undelivered
    }

    /// Number of frames driven so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The report of the last driven frame.
    pub fn last_frame(&self) -> Option<&FrameReport> {
        self.last_frame.as_ref()
    }
}

fn init_failed(e: impl fmt::Display) -> LightingError {
    LightingError::Initialization(RenderError::InitializationFailed(e.to_string()))
}

impl fmt::Debug for LightingAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightingAgent")
            .field("regions", &self.regions.len())
            .field("masks", &self.masks)
            .field("framebuffer", &self.framebuffer)
            .field("ticker", &self.ticker)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
