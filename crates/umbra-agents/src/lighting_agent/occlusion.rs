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

//! The radial occlusion mask: circles around occluding tokens, blurred, that
//! reveal what lies under foreground tiles.

use super::OccludingToken;
use std::sync::{Arc, RwLock};
use umbra_core::math::{LinearRgba, Shape};
use umbra_core::renderer::{TextureDataType, TextureFormat};
use umbra_lanes::mask_lane::{MaskCache, MaskDescriptor, MaskError, MaskHandle};

/// State shared between the occlusion hooks and the mask subscribers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcclusionState {
    /// Tokens stored by the last `draw_occlusion_shapes`, if any.
    pub tokens: Option<Vec<OccludingToken>>,
    /// Whether the foreground held tiles, as of the last stored tokens or mask rebuild.
    pub foreground_tiles: bool,
    /// Set while the host's occlusion update runs.
    pub updating: bool,
}

impl OcclusionState {
    /// Forgets the stored tokens and clears the updating flag.
    pub fn reset(&mut self) {
        self.tokens = None;
        self.updating = false;
    }
}

/// The occlusion mask's pixel parameters.
pub(crate) fn descriptor() -> MaskDescriptor {
    MaskDescriptor::new(
        TextureFormat::Red,
        TextureDataType::UnsignedByte,
        LinearRgba::new(1.0, 0.0, 0.0, 0.0),
    )
    .with_group("blur")
}

/// Creates the occlusion mask and subscribes its stage builder and renderer.
pub(crate) fn register(
    masks: &mut MaskCache,
    name: &str,
    state: Arc<RwLock<OcclusionState>>,
) -> Result<MaskHandle, MaskError> {
    let handle = masks.create(name, descriptor())?;

    masks.on_update_stage(handle, move |frame| {
        let state = state
            .read()
            .map_err(|_| "occlusion state is poisoned")?;
        if !state.foreground_tiles {
            return Ok(());
        }
        let Some(tokens) = state.tokens.as_ref() else {
            return Ok(());
        };
        for token in tokens {
            frame.stage_mut().fill(
                Shape::circle(token.center, token.occlusion_radius()),
                LinearRgba::BLACK,
            );
        }
        log::trace!("Staged {} occlusion circles", tokens.len());
        Ok(())
    })?;

    masks.on_update_texture(handle, |frame| {
        frame.render()?;
        frame.stage_mut().clear();
        Ok(())
    })?;

    Ok(handle)
}
