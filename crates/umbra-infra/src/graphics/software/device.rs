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

//! The software device: texture bookkeeping and stage rendering.

use super::raster::{self, Canvas};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use umbra_core::math::{Extent2D, LinearRgba};
use umbra_core::renderer::{
    CpuTexture, DrawCommand, GraphicsDevice, RenderTarget, ResourceError, Stage, TextureDataType,
    TextureDescriptor, TextureFormat, TextureId,
};

#[derive(Debug)]
struct SoftwareTextureEntry {
    label: Option<String>,
    size: Extent2D,
    format: TextureFormat,
    data_type: TextureDataType,
    texels: Vec<f32>,
    byte_size: usize,
}

#[derive(Debug)]
struct SoftwareDeviceInternal {
    textures: Mutex<HashMap<TextureId, SoftwareTextureEntry>>,
    next_texture_id: AtomicUsize,
    memory_limit: Option<usize>,

    // Memory tracking
    allocated_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    stages_rendered: AtomicU64,
}

/// A headless [`GraphicsDevice`] that rasterizes on the CPU.
///
/// Cloning the device yields another handle to the same texture storage.
#[derive(Debug, Clone)]
pub struct SoftwareDevice {
    internal: Arc<SoftwareDeviceInternal>,
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareDevice {
    /// Creates a device with unbounded texture memory.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a device that refuses allocations past `bytes` of texture memory.
    pub fn with_memory_limit(bytes: usize) -> Self {
        Self::build(Some(bytes))
    }

    fn build(memory_limit: Option<usize>) -> Self {
        log::debug!("SoftwareDevice: created (memory limit: {memory_limit:?})");
        Self {
            internal: Arc::new(SoftwareDeviceInternal {
                textures: Mutex::new(HashMap::new()),
                next_texture_id: AtomicUsize::new(0),
                memory_limit,
                allocated_bytes: AtomicUsize::new(0),
                peak_bytes: AtomicUsize::new(0),
                stages_rendered: AtomicU64::new(0),
            }),
        }
    }

    fn textures(&self) -> Result<MutexGuard<'_, HashMap<TextureId, SoftwareTextureEntry>>, ResourceError> {
        self.internal
            .textures
            .lock()
            .map_err(|_| ResourceError::Backend("texture table poisoned".to_string()))
    }

    fn generate_texture_id(&self) -> TextureId {
        TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Bytes of texture memory currently allocated.
    pub fn allocated_bytes(&self) -> usize {
        self.internal.allocated_bytes.load(Ordering::Relaxed)
    }

    /// The highest value [`allocated_bytes`](Self::allocated_bytes) has reached.
    pub fn peak_bytes(&self) -> usize {
        self.internal.peak_bytes.load(Ordering::Relaxed)
    }

    /// Number of stages rendered since creation.
    pub fn stages_rendered(&self) -> u64 {
        self.internal.stages_rendered.load(Ordering::Relaxed)
    }

    /// The debug label a texture was created with.
    pub fn texture_label(&self, id: TextureId) -> Option<String> {
        self.textures().ok()?.get(&id)?.label.clone()
    }
}

fn encode(entry: &SoftwareTextureEntry) -> Vec<u8> {
    match entry.data_type {
        TextureDataType::UnsignedByte => entry
            .texels
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect(),
        TextureDataType::Float => bytemuck::cast_slice(&entry.texels[..]).to_vec(),
    }
}

impl GraphicsDevice for SoftwareDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if descriptor.size.is_empty() {
            return Err(ResourceError::EmptyExtent {
                label: descriptor.label.as_deref().map(str::to_string),
            });
        }

        let byte_size = descriptor.byte_size();
        let allocated = self.internal.allocated_bytes.load(Ordering::Relaxed);
        if let Some(limit) = self.internal.memory_limit {
            if allocated + byte_size > limit {
                return Err(ResourceError::OutOfMemory {
                    requested: byte_size,
                });
            }
        }

        let texel_count = descriptor.size.area() * descriptor.format.channel_count();
        let entry = SoftwareTextureEntry {
            label: descriptor.label.as_deref().map(str::to_string),
            size: descriptor.size,
            format: descriptor.format,
            data_type: descriptor.data_type,
            texels: vec![0.0; texel_count],
            byte_size,
        };

        let id = self.generate_texture_id();
        self.textures()?.insert(id, entry);

        let current = self
            .internal
            .allocated_bytes
            .fetch_add(byte_size, Ordering::Relaxed)
            + byte_size;
        self.internal.peak_bytes.fetch_max(current, Ordering::Relaxed);

        log::trace!(
            "SoftwareDevice: Created texture {id:?} '{}' ({byte_size} bytes)",
            descriptor.label.as_deref().unwrap_or("unlabeled")
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let entry = self
            .textures()?
            .remove(&id)
            .ok_or(ResourceError::InvalidTexture(id))?;
        self.internal
            .allocated_bytes
            .fetch_sub(entry.byte_size, Ordering::Relaxed);
        log::trace!("SoftwareDevice: Destroyed texture {id:?}");
        Ok(())
    }

    fn texture_size(&self, id: TextureId) -> Result<Extent2D, ResourceError> {
        self.textures()?
            .get(&id)
            .map(|e| e.size)
            .ok_or(ResourceError::InvalidTexture(id))
    }

    fn render_stage(
        &self,
        target: &RenderTarget,
        stage: &Stage,
        clear: Option<LinearRgba>,
    ) -> Result<(), ResourceError> {
        if target.viewport.is_empty() {
            return Err(ResourceError::Rasterization(format!(
                "empty viewport {:?}",
                target.viewport
            )));
        }
        for command in stage.commands() {
            raster::validate(command)?;
        }

        let mut textures = self.textures()?;
        let entry = textures
            .get_mut(&target.texture)
            .ok_or(ResourceError::InvalidTexture(target.texture))?;

        let texels_per_pixel = entry.size.width as f32 / target.viewport.width;
        let mut canvas = Canvas {
            texels: &mut entry.texels,
            width: entry.size.width as usize,
            height: entry.size.height as usize,
            channels: entry.format.channel_count(),
            quantize: entry.data_type == TextureDataType::UnsignedByte,
        };

        if let Some(color) = clear {
            canvas.clear(color);
        }
        for command in stage.commands() {
            let DrawCommand::Fill { shape, color } = command;
            canvas.fill(target.viewport, shape, *color);
        }
        for filter in stage.filters() {
            let (radius, passes) = raster::blur_radius(filter, texels_per_pixel);
            canvas.blur(radius, passes);
        }

        self.internal.stages_rendered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn read_texture(&self, id: TextureId) -> Result<CpuTexture, ResourceError> {
        let textures = self.textures()?;
        let entry = textures.get(&id).ok_or(ResourceError::InvalidTexture(id))?;
        Ok(CpuTexture {
            pixels: encode(entry),
            size: entry.size,
            format: entry.format,
            data_type: entry.data_type,
        })
    }

    fn live_texture_count(&self) -> usize {
        self.textures().map(|t| t.len()).unwrap_or(0)
    }
}
