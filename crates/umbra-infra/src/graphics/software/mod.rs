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

//! A headless CPU rasterizer implementing [`GraphicsDevice`](umbra_core::renderer::GraphicsDevice).
//!
//! Textures live in host memory as `f32` channels and are encoded to their
//! declared data type when read back. Useful for tests, tooling and servers
//! that need the overlay textures without a GPU.

mod device;
mod raster;

pub use device::SoftwareDevice;
