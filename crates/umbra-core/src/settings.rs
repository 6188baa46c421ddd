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

//! Session-wide settings for the lighting pipeline.

use crate::math::LinearRgba;
use crate::schedule::UpdatePriority;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// An error raised while loading [`LightingSettings`].
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The settings file could not be read.
    Io {
        /// The path that failed to load.
        path: PathBuf,
        /// The underlying I/O error message.
        message: String,
    },
    /// The settings text is not valid RON for [`LightingSettings`].
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, message } => {
                write!(f, "Failed to read settings from {}: {message}", path.display())
            }
            SettingsError::Parse(msg) => write!(f, "Invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// A collection of settings that shape how a scene session renders.
///
/// Missing fields fall back to their defaults, so a settings file only needs
/// to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Darkness painted into the lighting framebuffer where no region applies.
    pub default_darkness: f32,
    /// Background color painted where no region applies.
    pub default_background: LinearRgba,
    /// Radius, in scene pixels, of the blur applied to the occlusion mask.
    pub occlusion_blur_radius: f32,
    /// The name the occlusion mask is registered under.
    pub occlusion_mask_name: String,
    /// Mask texels per scene pixel.
    pub mask_resolution: f32,
    /// Priority of the deferred task that restores mesh cullability.
    pub cullable_restore_priority: UpdatePriority,
    /// If `false`, the frame driver skips sorting the effect layers.
    pub depth_sort: bool,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            default_darkness: 0.0,
            default_background: LinearRgba::BLACK,
            occlusion_blur_radius: 8.0,
            occlusion_mask_name: "occlusionRadial".to_string(),
            mask_resolution: 1.0,
            cullable_restore_priority: UpdatePriority::LOW.below(1),
            depth_sort: true,
        }
    }
}

impl LightingSettings {
    /// Parses settings from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, SettingsError> {
        ron::from_str(text).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Reads and parses a RON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_ron_str(&text)?;
        log::info!("Loaded lighting settings from {}", path.display());
        Ok(settings)
    }
}
