//! Pipeline configuration.
//!
//! One JSON file configures every stage: which deck the signal tree
//! enumerates, the rules engine, which effective stacks are enumerated through
//! the full betting tree, and the ICM solver.
//!
//! ```json
//! {
//!   "name": "Royal Rhode Island",
//!   "deck": "royal",
//!   "engine": {
//!     "automations": ["ANTE_POSTING", "BET_COLLECTION", "BLIND_OR_STRADDLE_POSTING",
//!                     "HOLE_CARDS_SHOWING_OR_MUCKING", "HAND_KILLING",
//!                     "CHIPS_PUSHING", "CHIPS_PULLING"],
//!     "betting": { "ante": 1, "bets": [2, 4, 4], "max_completions": 3 }
//!   },
//!   "min_enumerated_stack": 6,
//!   "icm": { "tractable_bound": 155, "rtol": 1e-5, "atol": 1e-8, "max_squarings": 64 },
//!   "progress": true
//! }
//! ```

use crate::cards::DeckKind;
use crate::engine::EngineConfig;
use crate::icm::IcmConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Configuration shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Name of this configuration.
    pub name: String,
    /// Deck the signal tree enumerates.
    pub deck: DeckKind,
    /// Rules-engine configuration.
    pub engine: EngineConfig,
    /// Smallest effective stack enumerated through the full betting tree.
    /// Smaller stacks are bootstrapped.
    pub min_enumerated_stack: u32,
    /// ICM solver settings. Its tractable bound is the largest enumerated stack.
    pub icm: IcmConfig,
    /// Show progress bars.
    pub progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            name: "Royal Rhode Island".to_string(),
            deck: DeckKind::Royal,
            engine: EngineConfig::default(),
            min_enumerated_stack: 6,
            icm: IcmConfig::default(),
            progress: false,
        }
    }
}

impl SolverConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder method: set the deck.
    pub fn with_deck(mut self, deck: DeckKind) -> Self {
        self.deck = deck;
        self
    }

    /// Builder method: set the engine configuration.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Builder method: set the ICM settings.
    pub fn with_icm(mut self, icm: IcmConfig) -> Self {
        self.icm = icm;
        self
    }

    /// Builder method: set the smallest enumerated stack.
    pub fn with_min_enumerated_stack(mut self, stack: u32) -> Self {
        self.min_enumerated_stack = stack;
        self
    }

    /// Builder method: show progress bars.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Effective stacks enumerated through the full betting tree.
    pub fn enumerated_stacks(&self) -> RangeInclusive<u32> {
        self.min_enumerated_stack..=self.icm.tractable_bound
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate().map_err(|e| ConfigError::InvalidValue {
            field: "engine".to_string(),
            message: e.to_string(),
        })?;

        if self.icm.tractable_bound == 0 {
            return Err(ConfigError::InvalidValue {
                field: "icm.tractable_bound".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.min_enumerated_stack == 0 || self.min_enumerated_stack > self.icm.tractable_bound {
            return Err(ConfigError::InvalidValue {
                field: "min_enumerated_stack".to_string(),
                message: format!("must be in 1..={}", self.icm.tractable_bound),
            });
        }
        if !(self.icm.rtol >= 0.0) || !(self.icm.atol >= 0.0) || self.icm.rtol + self.icm.atol == 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "icm.rtol/atol".to_string(),
                message: "tolerances must be non-negative and not both zero".to_string(),
            });
        }
        if self.icm.max_squarings == 0 {
            return Err(ConfigError::InvalidValue {
                field: "icm.max_squarings".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// The file could not be read.
    IoError(String),
    /// The file is not valid configuration JSON.
    ParseError(String),
    /// A field holds an unusable value.
    InvalidValue {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {}", e),
            Self::ParseError(e) => write!(f, "Parse error: {}", e),
            Self::InvalidValue { field, message } => write!(f, "Invalid value for {}: {}", field, message),
        }
    }
}

impl std::error::Error for ConfigError {}
