//! `WorldConfig`: everything needed to build a world, loadable from TOML.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```toml
//! factory_size = 120.0
//! agv_count    = 4
//! seed         = 7
//!
//! [radio]
//! handover_margin_db = 6.0
//!
//! [motion]
//! retry_delay_ms = [250, 1000]
//! ```

use std::path::Path;

use ft_mobility::{LinkFloor, MotionParams};
use ft_radio::RadioParams;
use serde::{Deserialize, Serialize};

use crate::{SimError, SimResult};

/// Which environment generator to run on reset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Perimeter and interior walls, workstations, a charger, random boxes.
    #[default]
    Factory,
    /// Bare floor: no walls, sites, or obstacles.
    Open,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side of the square floor, centred on the origin.
    pub factory_size:         f64,
    /// Navigation grid resolution.
    pub cell_size:            f64,
    /// Random boxes to attempt to place.
    pub obstacle_count:       usize,
    pub agv_count:            usize,
    pub station_count:        usize,
    pub wall_height:          f64,
    /// Simulated running time between persisted snapshots.  `0` disables
    /// snapshots.
    pub snapshot_interval_ms: u64,
    /// Master seed.  The same seed and config always build the same world.
    pub seed:                 u64,
    /// Worlds start paused after construction and after every reset.
    pub start_paused:         bool,
    pub layout:               LayoutKind,
    pub radio:                RadioParams,
    pub motion:               MotionParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            factory_size:         250.0,
            cell_size:            2.5,
            obstacle_count:       30,
            agv_count:            10,
            station_count:        4,
            wall_height:          10.0,
            snapshot_interval_ms: 5_000,
            seed:                 42,
            start_paused:         true,
            layout:               LayoutKind::Factory,
            radio:                RadioParams::default(),
            motion:               MotionParams::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_toml_str(s: &str) -> SimResult<Self> {
        let config: WorldConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| SimError::Io { path: path.to_path_buf(), source })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded world config");
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.factory_size > 0.0 && self.factory_size.is_finite()) {
            return Err(SimError::Config(format!("factory_size must be positive, got {}", self.factory_size)));
        }
        if !(self.cell_size > 0.0 && self.cell_size <= self.factory_size) {
            return Err(SimError::Config(format!(
                "cell_size must be in (0, factory_size], got {}",
                self.cell_size
            )));
        }
        if !(self.wall_height > 0.0) {
            return Err(SimError::Config(format!("wall_height must be positive, got {}", self.wall_height)));
        }
        if self.motion.bounds_inset * 2.0 >= self.factory_size {
            return Err(SimError::Config(format!(
                "motion.bounds_inset {} leaves no room on a {} floor",
                self.motion.bounds_inset, self.factory_size
            )));
        }
        self.radio.validate()?;
        self.motion.validate()?;
        Ok(())
    }

    /// What an AGV without a serving station reports.
    pub fn link_floor(&self) -> LinkFloor {
        LinkFloor { rsrp_dbm: self.radio.rsrp_floor_dbm, sinr_db: self.radio.sinr_floor_db }
    }

    /// Half-extent AGVs and targets are clamped to.
    pub fn clamp_bound(&self) -> f64 {
        self.factory_size * 0.5 - self.motion.bounds_inset
    }
}
