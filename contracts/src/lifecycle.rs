//! # Lifecycle Guards
//!
//! Two small, symmetric guards that every higher-level module embeds:
//!
//! - [`Initializable`] — a one-shot setup gate. Constructors of composed
//!   modules call `assert_not_initialized()` before running their own
//!   logic, then `initialize()` exactly once.
//! - [`Pausable`] — a binary circuit breaker. Privileged operations flip
//!   it; user-facing operations guard on `when_not_paused()`.
//!
//! Boring on purpose. The interesting property is that the guards are
//! explicit state with explicit errors, not ad-hoc booleans checked
//! inconsistently at call sites.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from lifecycle guard violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// `initialize()` was called on an already-initialized module, or an
    /// `assert_not_initialized` guard failed.
    #[error("module is already initialized")]
    AlreadyInitialized,

    /// An operation requiring initialization ran before `initialize()`.
    #[error("module is not initialized")]
    NotInitialized,

    /// `pause()` was called while already paused.
    #[error("module is already paused")]
    AlreadyPaused,

    /// `unpause()` or a `when_paused` guard ran while not paused.
    #[error("module is not paused")]
    NotPaused,
}

/// One-shot initialization gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Initializable {
    initialized: bool,
}

impl Initializable {
    /// Creates the gate in the uninitialized state.
    pub fn new() -> Self {
        Self { initialized: false }
    }

    /// Marks the module initialized.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::AlreadyInitialized`] on the second and every
    /// later call — initialization is one-shot.
    pub fn initialize(&mut self) -> Result<(), LifecycleError> {
        self.assert_not_initialized()?;
        self.initialized = true;
        Ok(())
    }

    /// Read-only guard: fails unless `initialize()` has run.
    pub fn assert_initialized(&self) -> Result<(), LifecycleError> {
        if self.initialized {
            Ok(())
        } else {
            Err(LifecycleError::NotInitialized)
        }
    }

    /// Read-only guard: fails once `initialize()` has run.
    pub fn assert_not_initialized(&self) -> Result<(), LifecycleError> {
        if self.initialized {
            Err(LifecycleError::AlreadyInitialized)
        } else {
            Ok(())
        }
    }

    /// Current flag value, for state inspection.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Binary circuit breaker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pausable {
    paused: bool,
}

impl Pausable {
    /// Creates the breaker in the unpaused state.
    pub fn new() -> Self {
        Self { paused: false }
    }

    /// Trips the breaker.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::AlreadyPaused`] if already paused — pausing is
    /// a deliberate transition, not an idempotent write.
    pub fn pause(&mut self) -> Result<(), LifecycleError> {
        self.when_not_paused()?;
        self.paused = true;
        Ok(())
    }

    /// Resets the breaker.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotPaused`] if not currently paused.
    pub fn unpause(&mut self) -> Result<(), LifecycleError> {
        self.when_paused()?;
        self.paused = false;
        Ok(())
    }

    /// Read-only guard: fails unless paused.
    pub fn when_paused(&self) -> Result<(), LifecycleError> {
        if self.paused {
            Ok(())
        } else {
            Err(LifecycleError::NotPaused)
        }
    }

    /// Read-only guard: fails while paused.
    pub fn when_not_paused(&self) -> Result<(), LifecycleError> {
        if self.paused {
            Err(LifecycleError::AlreadyPaused)
        } else {
            Ok(())
        }
    }

    /// Current flag value, for state inspection.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
