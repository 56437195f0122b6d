//! Lifecycle of one thread fetch: `Loading → Retry(2) → Retry(3) → {Complete, Error}`.
//!
//! A machine is never resumed after reaching `Complete` or `Error`; a reload starts a new
//! one.

use super::error::EngineError;
use super::presentation::ErrorCategory;
use super::presentation::Presentation;

pub const MAX_FETCH_ATTEMPTS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingState {
    Loading { attempt: u8 },
    Retry { attempt: u8 },
    Complete,
    Error {
        category: ErrorCategory,
        message: Option<String>,
    },
}

impl LoadingState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading { .. } => "loading",
            Self::Retry { .. } => "retry",
            Self::Complete => "complete",
            Self::Error { .. } => "error",
        }
    }
}

/// What the caller must do after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStep {
    Refetch { attempt: u8 },
    GaveUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingStateMachine {
    state: LoadingState,
}

impl Default for LoadingStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingStateMachine {
    pub fn new() -> Self {
        Self {
            state: LoadingState::Loading { attempt: 1 },
        }
    }

    pub fn state(&self) -> &LoadingState {
        &self.state
    }

    pub fn attempt(&self) -> Option<u8> {
        match self.state {
            LoadingState::Loading { attempt } | LoadingState::Retry { attempt } => Some(attempt),
            LoadingState::Complete | LoadingState::Error { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.attempt().is_none()
    }

    pub fn fail_transient(
        &mut self,
        category: ErrorCategory,
        message: Option<String>,
    ) -> Result<LoadingStep, EngineError> {
        let attempt = self.require_active("retry")?;
        if attempt >= MAX_FETCH_ATTEMPTS {
            log::warn!("fetch failed {attempt} times, giving up ({})", category.label());
            self.state = LoadingState::Error { category, message };
            return Ok(LoadingStep::GaveUp);
        }
        let next = attempt + 1;
        log::info!("fetch attempt {attempt} failed ({}), retrying", category.label());
        self.state = LoadingState::Retry { attempt: next };
        Ok(LoadingStep::Refetch { attempt: next })
    }

    pub fn fail_terminal(
        &mut self,
        category: ErrorCategory,
        message: Option<String>,
    ) -> Result<(), EngineError> {
        self.require_active("error")?;
        self.state = LoadingState::Error { category, message };
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), EngineError> {
        self.require_active("complete")?;
        self.state = LoadingState::Complete;
        Ok(())
    }

    pub fn presentation(&self) -> Presentation {
        match &self.state {
            LoadingState::Loading { attempt } => Presentation::Loading(*attempt),
            LoadingState::Retry { attempt } => Presentation::Retry(*attempt),
            LoadingState::Complete => Presentation::Complete,
            LoadingState::Error { category, message } => Presentation::Error {
                category: *category,
                message: message.clone(),
            },
        }
    }

    fn require_active(&self, to: &'static str) -> Result<u8, EngineError> {
        self.attempt()
            .ok_or(EngineError::InvalidLoadingTransition {
                from: self.state.label(),
                to,
            })
    }
}
