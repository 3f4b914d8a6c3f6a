use serde::{Deserialize, Serialize};

use super::ids::HomeId;
use crate::config::HomeConfig;
use crate::error::ConfigError;

/// A residential property. Value and rent change only through appreciation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home {
    pub id: HomeId,
    pub prop_val: f64,
    pub rent: f64,
}

impl Home {
    pub fn from_config(id: impl Into<HomeId>, config: &HomeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: id.into(),
            prop_val: config.prop_val,
            rent: config.rent,
        })
    }

    /// Grow value and rent by the same yearly rate
    pub fn appreciate(&mut self, rate: f64) {
        self.prop_val += rate * self.prop_val;
        self.rent += rate * self.rent;
    }
}
