//! Prize records
//!
//! A prize is an immutable value shared by reference between the pool, the
//! assignment map and the slots. Identity is reference-based: two fillers with
//! identical fields are still distinct records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sf_core::IconId;

/// Shared handle to an immutable prize
pub type SharedPrize = Arc<PrizeRecord>;

/// Kind of prize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeKind {
    /// Regular pool prize
    #[default]
    Normal,
    /// The single high-value prize, only awarded after arming
    Jackpot,
    /// Non-winning consolation prize
    Filler,
}

/// One prize: name, icon and kind
#[derive(Debug, Clone, Serialize)]
pub struct PrizeRecord {
    name: String,
    icon: Option<IconId>,
    kind: PrizeKind,
}

impl PrizeRecord {
    /// Regular prize
    pub fn new(name: impl Into<String>, icon: Option<IconId>) -> Self {
        Self::with_kind(name, icon, PrizeKind::Normal)
    }

    /// Jackpot prize
    pub fn jackpot(name: impl Into<String>, icon: Option<IconId>) -> Self {
        Self::with_kind(name, icon, PrizeKind::Jackpot)
    }

    /// Empty / filler prize
    pub fn filler(name: impl Into<String>, icon: Option<IconId>) -> Self {
        Self::with_kind(name, icon, PrizeKind::Filler)
    }

    pub fn with_kind(name: impl Into<String>, icon: Option<IconId>, kind: PrizeKind) -> Self {
        Self {
            name: name.into(),
            icon,
            kind,
        }
    }

    /// Wrap into a shared handle
    pub fn shared(self) -> SharedPrize {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> Option<&IconId> {
        self.icon.as_ref()
    }

    pub fn kind(&self) -> PrizeKind {
        self.kind
    }

    pub fn is_jackpot(&self) -> bool {
        self.kind == PrizeKind::Jackpot
    }

    pub fn is_filler(&self) -> bool {
        self.kind == PrizeKind::Filler
    }

    /// Reference identity of two shared prizes
    pub fn same(a: &SharedPrize, b: &SharedPrize) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl std::fmt::Display for PrizeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            PrizeKind::Normal => write!(f, "{}", self.name),
            PrizeKind::Jackpot => write!(f, "{} [jackpot]", self.name),
            PrizeKind::Filler => write!(f, "{} [filler]", self.name),
        }
    }
}

/// Prize entry as written in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeSpec {
    pub name: String,
    #[serde(default)]
    pub icon: Option<IconId>,
    #[serde(default)]
    pub kind: PrizeKind,
}

impl PrizeSpec {
    pub fn new(name: impl Into<String>, kind: PrizeKind) -> Self {
        Self {
            name: name.into(),
            icon: None,
            kind,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<IconId>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn to_record(&self) -> SharedPrize {
        PrizeRecord::with_kind(self.name.clone(), self.icon.clone(), self.kind).shared()
    }
}
