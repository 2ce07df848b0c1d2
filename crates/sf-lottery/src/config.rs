//! Lottery configuration
//!
//! A configuration describes the slot layout, the prize pool, the cover icon
//! set and the filler prize. It can be written as JSON or YAML.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sf_core::{IconId, SfResult, Vec2};

use crate::error::ConfigError;
use crate::prize::{PrizeKind, PrizeSpec, SharedPrize};
use crate::slot::SlotItem;

/// Default label of the synthesized filler prize
pub const DEFAULT_FILLER_NAME: &str = "Lucky Prize";

/// Slot layout entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    /// Host label; slots are indexed in name order
    pub name: String,
    /// Resting position used by the shuffle presentation
    #[serde(default)]
    pub anchor: Vec2,
}

impl SlotSpec {
    pub fn new(name: impl Into<String>, anchor: Vec2) -> Self {
        Self {
            name: name.into(),
            anchor,
        }
    }

    pub fn to_slot(&self) -> SlotItem {
        SlotItem::new(self.name.clone(), self.anchor)
    }
}

/// Filler prize used for slots beyond the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillerSpec {
    #[serde(default = "default_filler_name")]
    pub name: String,
    #[serde(default)]
    pub icon: Option<IconId>,
}

fn default_filler_name() -> String {
    DEFAULT_FILLER_NAME.to_string()
}

impl Default for FillerSpec {
    fn default() -> Self {
        Self {
            name: default_filler_name(),
            icon: None,
        }
    }
}

/// Complete lottery session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryConfig {
    /// Counted clicks per session
    #[serde(default = "default_max_clicks")]
    pub max_clicks: u32,
    #[serde(default)]
    pub slots: Vec<SlotSpec>,
    #[serde(default)]
    pub prizes: Vec<PrizeSpec>,
    #[serde(default)]
    pub cover_icons: Vec<IconId>,
    #[serde(default)]
    pub filler: FillerSpec,
    /// RNG seed (None = entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_clicks() -> u32 {
    1
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            max_clicks: default_max_clicks(),
            slots: Vec::new(),
            prizes: Vec::new(),
            cover_icons: Vec::new(),
            filler: FillerSpec::default(),
            seed: None,
        }
    }
}

impl LotteryConfig {
    /// Demo board: 10 slots in a 5×2 grid, one jackpot and one regular prize
    pub fn demo() -> Self {
        Self {
            max_clicks: 1,
            slots: grid_layout(5, 2, 1.5),
            prizes: vec![
                PrizeSpec::new("Jackpot", PrizeKind::Jackpot).with_icon("prize_jackpot"),
                PrizeSpec::new("PrizeA", PrizeKind::Normal).with_icon("prize_a"),
            ],
            cover_icons: (0..10).map(|i| IconId::new(format!("cover_{:02}", i))).collect(),
            filler: FillerSpec {
                name: DEFAULT_FILLER_NAME.to_string(),
                icon: Some(IconId::new("prize_filler")),
            },
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_clicks(mut self, max_clicks: u32) -> Self {
        self.max_clicks = max_clicks;
        self
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file; format chosen by extension (`.json`, `.yaml`, `.yml`)
    pub fn load(path: impl AsRef<Path>) -> SfResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !matches!(ext.as_str(), "json" | "yaml" | "yml") {
            return Err(ConfigError::UnsupportedFormat(ext).into());
        }

        let text = std::fs::read_to_string(path)?;
        let config = if ext == "json" {
            Self::from_json(&text)?
        } else {
            Self::from_yaml(&text)?
        };
        log::info!(
            "Loaded lottery config {:?}: {} slots, {} prizes",
            path,
            config.slots.len(),
            config.prizes.len()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check structural rules. Missing assets are not errors; the engine
    /// degrades around them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_clicks == 0 {
            return Err(ConfigError::ZeroMaxClicks);
        }

        let jackpots = self
            .prizes
            .iter()
            .filter(|p| p.kind == PrizeKind::Jackpot)
            .count();
        if jackpots > 1 {
            return Err(ConfigError::MultipleJackpots(jackpots));
        }

        let mut names = HashSet::new();
        for slot in &self.slots {
            if !names.insert(slot.name.as_str()) {
                return Err(ConfigError::DuplicateSlotName(slot.name.clone()));
            }
        }

        if self.prizes.len() > self.slots.len() {
            log::warn!(
                "Prize pool ({}) is larger than the slot count ({}); extra prizes are never assigned",
                self.prizes.len(),
                self.slots.len()
            );
        }
        Ok(())
    }

    /// Shared prize records for the pool, in configured order
    pub fn prize_pool(&self) -> Vec<SharedPrize> {
        self.prizes.iter().map(PrizeSpec::to_record).collect()
    }

    pub fn slot_items(&self) -> Vec<SlotItem> {
        self.slots.iter().map(SlotSpec::to_slot).collect()
    }
}

/// Row-major grid of slots named `slot_00`, `slot_01`, …
pub fn grid_layout(columns: usize, rows: usize, spacing: f32) -> Vec<SlotSpec> {
    let width = columns.saturating_sub(1) as f32 * spacing;
    let height = rows.saturating_sub(1) as f32 * spacing;
    (0..columns * rows)
        .map(|i| {
            let col = i % columns.max(1);
            let row = i / columns.max(1);
            let anchor = Vec2::new(
                col as f32 * spacing - width / 2.0,
                height / 2.0 - row as f32 * spacing,
            );
            SlotSpec::new(format!("slot_{:02}", i), anchor)
        })
        .collect()
}
