//! Pause switch. While paused, redemption and direct minting refuse every
//! call. Administrative operations keep working.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{MinterError, MinterResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseState {
    #[default]
    Active,
    Paused,
}

impl fmt::Display for PauseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PauseState::Active => write!(f, "Active"),
            PauseState::Paused => write!(f, "Paused"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitch {
    state: PauseState,
}

impl PauseSwitch {
    pub fn state(&self) -> PauseState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == PauseState::Paused
    }

    pub fn ensure_active(&self) -> MinterResult<()> {
        if self.is_paused() {
            Err(MinterError::ContractPaused)
        } else {
            Ok(())
        }
    }

    pub fn pause(&mut self) -> MinterResult<()> {
        if self.is_paused() {
            return Err(MinterError::AlreadyPaused);
        }
        self.state = PauseState::Paused;
        Ok(())
    }

    pub fn unpause(&mut self) -> MinterResult<()> {
        if !self.is_paused() {
            return Err(MinterError::NotPaused);
        }
        self.state = PauseState::Active;
        Ok(())
    }
}
