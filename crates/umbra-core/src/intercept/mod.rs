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

//! Ordered strategy chains for intercepted host operations.
//!
//! An [`InterceptChain`] stands in for one host operation. It holds the
//! host's original behavior, at most one override that replaces it, and any
//! number of wrappers. Wrappers receive a [`Next`] continuation and decide
//! whether (and with which arguments) to call through; the most recently
//! registered wrapper is the outermost.

use std::fmt;

type Base<S, A, R> = Box<dyn FnMut(&mut S, A) -> R + Send>;
type Wrapper<S, A, R> = Box<dyn FnMut(&mut S, A, Next<'_, S, A, R>) -> R + Send>;

/// An error raised while configuring an intercept chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptError {
    /// A second override was registered on a chain that already has one.
    OverrideConflict {
        /// The name of the intercepted operation.
        operation: &'static str,
    },
}

impl fmt::Display for InterceptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterceptError::OverrideConflict { operation } => {
                write!(f, "Operation '{operation}' already has an override")
            }
        }
    }
}

impl std::error::Error for InterceptError {}

/// The continuation handed to a wrapper: the rest of the chain below it.
pub struct Next<'a, S, A, R> {
    rest: &'a mut [Wrapper<S, A, R>],
    base: &'a mut Base<S, A, R>,
}

impl<S, A, R> Next<'_, S, A, R> {
    /// Calls the remainder of the chain and returns its result.
    pub fn call(self, scope: &mut S, args: A) -> R {
        match self.rest.split_last_mut() {
            Some((outer, rest)) => outer(
                scope,
                args,
                Next {
                    rest,
                    base: self.base,
                },
            ),
            None => (self.base)(scope, args),
        }
    }
}

/// A chain of strategies for one intercepted operation.
///
/// `S` is the scope every strategy receives mutably, `A` the operation's
/// arguments and `R` its result.
pub struct InterceptChain<S, A, R> {
    operation: &'static str,
    original: Base<S, A, R>,
    replacement: Option<Base<S, A, R>>,
    wrappers: Vec<Wrapper<S, A, R>>,
}

impl<S, A, R> InterceptChain<S, A, R> {
    /// Creates a chain around the operation's original behavior.
    pub fn new(
        operation: &'static str,
        original: impl FnMut(&mut S, A) -> R + Send + 'static,
    ) -> Self {
        Self {
            operation,
            original: Box::new(original),
            replacement: None,
            wrappers: Vec::new(),
        }
    }

    /// Replaces the original behavior.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError::OverrideConflict`] if an override is already
    /// installed; the existing one is kept.
    pub fn override_with(
        &mut self,
        strategy: impl FnMut(&mut S, A) -> R + Send + 'static,
    ) -> Result<(), InterceptError> {
        if self.replacement.is_some() {
            return Err(InterceptError::OverrideConflict {
                operation: self.operation,
            });
        }
        self.replacement = Some(Box::new(strategy));
        log::debug!("Installed override for '{}'", self.operation);
        Ok(())
    }

    /// Adds a wrapper around everything registered so far.
    pub fn wrap(
        &mut self,
        strategy: impl FnMut(&mut S, A, Next<'_, S, A, R>) -> R + Send + 'static,
    ) {
        self.wrappers.push(Box::new(strategy));
        log::debug!(
            "Installed wrapper #{} for '{}'",
            self.wrappers.len(),
            self.operation
        );
    }

    /// Runs the chain: outermost wrapper first, down to the override or the
    /// original behavior.
    pub fn invoke(&mut self, scope: &mut S, args: A) -> R {
        let base = match self.replacement.as_mut() {
            Some(replacement) => replacement,
            None => &mut self.original,
        };
        Next {
            rest: &mut self.wrappers,
            base,
        }
        .call(scope, args)
    }

    /// Runs the original behavior, bypassing every registered strategy.
    pub fn invoke_original(&mut self, scope: &mut S, args: A) -> R {
        (self.original)(scope, args)
    }

    /// Returns the name of the intercepted operation.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Returns `true` if an override is installed.
    pub fn is_overridden(&self) -> bool {
        self.replacement.is_some()
    }

    /// Returns the number of installed wrappers.
    pub fn wrapper_count(&self) -> usize {
        self.wrappers.len()
    }
}

impl<S, A, R> fmt::Debug for InterceptChain<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptChain")
            .field("operation", &self.operation)
            .field("overridden", &self.replacement.is_some())
            .field("wrappers", &self.wrappers.len())
            .finish()
    }
}
