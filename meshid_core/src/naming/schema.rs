//! Field-width budgets for generated names

use crate::error::{MeshIdError, MeshIdResult};
use crate::identifier::IdWidth;
use serde::{Deserialize, Serialize};

/// Length of a node type acronym (`RC`, `TS`, ...)
pub const TYPE_ACRONYM_LEN: usize = 2;

/// Length of a companion role acronym or counter suffix (`PRIM`, `MY01`)
pub const COMPANION_SUFFIX_LEN: usize = 4;

/// Named field-width variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingPreset {
    /// 3-5-5 with a city, 3-11 without; 23 characters with long identifiers
    #[default]
    Compact,
    /// 3-5-7 with a city, 3-13 without; 25 characters with long identifiers
    Wide,
}

/// Per-field character limits plus the overall budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSchema {
    pub region_max: usize,
    pub city_max: usize,
    /// Landmark limit when a city is present
    pub landmark_with_city_max: usize,
    /// Landmark limit when it stands alone
    pub landmark_max: usize,
    pub handle_max: usize,
    pub total_max: usize,
}

impl NameSchema {
    pub const fn compact() -> Self {
        Self {
            region_max: 3,
            city_max: 5,
            landmark_with_city_max: 5,
            landmark_max: 11,
            handle_max: 10,
            total_max: 23,
        }
    }

    pub const fn wide() -> Self {
        Self {
            region_max: 3,
            city_max: 5,
            landmark_with_city_max: 7,
            landmark_max: 13,
            handle_max: 10,
            total_max: 25,
        }
    }

    pub const fn from_preset(preset: NamingPreset) -> Self {
        match preset {
            NamingPreset::Compact => Self::compact(),
            NamingPreset::Wide => Self::wide(),
        }
    }

    /// Longest repeater name with a city: `REGION-CITY-LANDMARK-TYPE-ID`
    pub fn worst_case_with_city(&self, width: IdWidth) -> usize {
        self.region_max
            + self.city_max
            + self.landmark_with_city_max
            + TYPE_ACRONYM_LEN
            + width.chars()
            + 4
    }

    /// Longest repeater name without a city: `REGION-LANDMARK-TYPE-ID`
    pub fn worst_case_without_city(&self, width: IdWidth) -> usize {
        self.region_max + self.landmark_max + TYPE_ACRONYM_LEN + width.chars() + 3
    }

    /// Reject budgets that a maximal name under either template would overflow
    pub fn validate(&self, width: IdWidth) -> MeshIdResult<()> {
        let limits = [
            ("region_max", self.region_max),
            ("city_max", self.city_max),
            ("landmark_with_city_max", self.landmark_with_city_max),
            ("landmark_max", self.landmark_max),
            ("handle_max", self.handle_max),
        ];
        if let Some((field, _)) = limits.iter().find(|(_, limit)| *limit == 0) {
            return Err(MeshIdError::config(format!("naming.{} must be positive", field)));
        }

        let with_city = self.worst_case_with_city(width);
        if with_city > self.total_max {
            return Err(MeshIdError::config(format!(
                "repeater names with a city can reach {} characters with {} identifiers, over the {} character budget",
                with_city, width, self.total_max
            )));
        }

        let without_city = self.worst_case_without_city(width);
        if without_city > self.total_max {
            return Err(MeshIdError::config(format!(
                "repeater names without a city can reach {} characters with {} identifiers, over the {} character budget",
                without_city, width, self.total_max
            )));
        }

        if self.handle_max + 1 + COMPANION_SUFFIX_LEN > self.total_max {
            return Err(MeshIdError::config(format!(
                "companion handles of {} characters cannot fit the {} character budget",
                self.handle_max, self.total_max
            )));
        }

        Ok(())
    }
}

impl Default for NameSchema {
    fn default() -> Self {
        Self::compact()
    }
}
