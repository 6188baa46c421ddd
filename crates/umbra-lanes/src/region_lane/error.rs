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

use super::RegionId;
use thiserror::Error;

/// Errors raised by the [`RegionAggregator`](super::RegionAggregator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// A region with this identifier is already registered.
    #[error("Region '{0}' is already registered")]
    Duplicate(RegionId),

    /// No live region has this identifier.
    #[error("Unknown region '{0}'")]
    Unknown(RegionId),
}
