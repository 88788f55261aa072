//! The linear phase machine behind one omikuji draw.
//!
//! `Initial -> Shaking -> StickEmerging -> ReadyToUnfold -> Unfolding ->
//! ShowingFortune`, with `reset` returning to `Initial` from anywhere.
//! Animation completion is reported back by the host through
//! [`DrawSequence::emerge_complete`] and [`DrawSequence::unfold_complete`].
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::catalog::FortuneCatalog;
use crate::draw::{Fortune, generate_fortune};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawPhase {
    #[default]
    Initial,
    Shaking,
    StickEmerging,
    ReadyToUnfold,
    Unfolding,
    ShowingFortune,
}

impl DrawPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Shaking => "shaking",
            Self::StickEmerging => "stick_emerging",
            Self::ReadyToUnfold => "ready_to_unfold",
            Self::Unfolding => "unfolding",
            Self::ShowingFortune => "showing_fortune",
        }
    }

    /// Prompt shown to the visitor in this phase.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Initial => "Shake the box to draw your fortune",
            Self::Shaking => "Keep shaking...",
            Self::StickEmerging => "Your fortune is emerging...",
            Self::ReadyToUnfold => "Click to unfold your fortune",
            Self::Unfolding => "Unfolding...",
            Self::ShowingFortune => "",
        }
    }
}

impl fmt::Display for DrawPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot {event} while {phase}")]
pub struct TransitionError {
    pub phase: DrawPhase,
    pub event: &'static str,
}

/// One visitor's walk through a draw.
#[derive(Debug, Clone)]
pub struct DrawSequence<'c> {
    catalog: &'c FortuneCatalog,
    phase: DrawPhase,
    shakes: u32,
    fortune: Option<Fortune>,
}

impl<'c> DrawSequence<'c> {
    #[must_use]
    pub const fn new(catalog: &'c FortuneCatalog) -> Self {
        Self {
            catalog,
            phase: DrawPhase::Initial,
            shakes: 0,
            fortune: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> DrawPhase {
        self.phase
    }

    #[must_use]
    pub const fn shakes(&self) -> u32 {
        self.shakes
    }

    #[must_use]
    pub const fn required_shakes(&self) -> u32 {
        self.catalog.required_shakes
    }

    /// The drawn fortune, available from `StickEmerging` onward.
    #[must_use]
    pub const fn fortune(&self) -> Option<&Fortune> {
        self.fortune.as_ref()
    }

    /// The fortune only once it is on display.
    #[must_use]
    pub fn revealed(&self) -> Option<&Fortune> {
        match self.phase {
            DrawPhase::ShowingFortune => self.fortune.as_ref(),
            _ => None,
        }
    }

    fn set_phase(&mut self, phase: DrawPhase) {
        log::debug!("omikuji phase {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    fn require(&self, allowed: &[DrawPhase], event: &'static str) -> Result<(), TransitionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(TransitionError {
                phase: self.phase,
                event,
            })
        }
    }

    /// Grab the box.
    ///
    /// # Errors
    ///
    /// Fails once the stick has started to emerge.
    pub fn press(&mut self) -> Result<DrawPhase, TransitionError> {
        self.require(&[DrawPhase::Initial, DrawPhase::Shaking], "press")?;
        self.set_phase(DrawPhase::Shaking);
        Ok(self.phase)
    }

    /// Register one shake. The shake that reaches the required count draws
    /// the fortune and moves to `StickEmerging`.
    ///
    /// # Errors
    ///
    /// Fails unless the box is being shaken.
    pub fn shake<R>(&mut self, rng: &mut R, now_millis: u64) -> Result<DrawPhase, TransitionError>
    where
        R: Rng + ?Sized,
    {
        self.require(&[DrawPhase::Shaking], "shake")?;
        self.shakes = self.shakes.saturating_add(1);
        if self.shakes >= self.required_shakes() {
            self.fortune = generate_fortune(self.catalog, rng, now_millis);
            self.set_phase(DrawPhase::StickEmerging);
        }
        Ok(self.phase)
    }

    /// Let go of the box. Too few shakes returns to `Initial`; shakes
    /// already counted are kept. Harmless in any other phase.
    pub fn release(&mut self) -> DrawPhase {
        if self.phase == DrawPhase::Shaking && self.shakes < self.required_shakes() {
            self.set_phase(DrawPhase::Initial);
        }
        self.phase
    }

    /// Keyboard path: shake the full required count in one go.
    ///
    /// # Errors
    ///
    /// Fails once the stick has started to emerge.
    pub fn auto_shake<R>(
        &mut self,
        rng: &mut R,
        now_millis: u64,
    ) -> Result<DrawPhase, TransitionError>
    where
        R: Rng + ?Sized,
    {
        self.press()?;
        while self.phase == DrawPhase::Shaking {
            self.shake(rng, now_millis)?;
        }
        Ok(self.phase)
    }

    /// # Errors
    ///
    /// Fails unless the stick is emerging.
    pub fn emerge_complete(&mut self) -> Result<DrawPhase, TransitionError> {
        self.require(&[DrawPhase::StickEmerging], "finish emerging")?;
        self.set_phase(DrawPhase::ReadyToUnfold);
        Ok(self.phase)
    }

    /// # Errors
    ///
    /// Fails unless the paper is ready to unfold.
    pub fn unfold(&mut self) -> Result<DrawPhase, TransitionError> {
        self.require(&[DrawPhase::ReadyToUnfold], "unfold")?;
        self.set_phase(DrawPhase::Unfolding);
        Ok(self.phase)
    }

    /// # Errors
    ///
    /// Fails unless the paper is unfolding.
    pub fn unfold_complete(&mut self) -> Result<DrawPhase, TransitionError> {
        self.require(&[DrawPhase::Unfolding], "finish unfolding")?;
        self.set_phase(DrawPhase::ShowingFortune);
        Ok(self.phase)
    }

    /// Put the stick back and start over.
    pub fn reset(&mut self) {
        self.fortune = None;
        self.shakes = 0;
        self.set_phase(DrawPhase::Initial);
    }
}
