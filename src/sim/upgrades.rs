//! Permanent stat upgrades bought with points
//!
//! Each upgrade is a table row of plain functions over `SaveData`. Every
//! purchase goes through `attempt_purchase`, which either deducts the cost
//! and applies the effect together or leaves the record untouched.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{SaveData, SaveStore};

/// Upgrade kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Health,
    Regen,
    DamageZone,
    Damage,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Health,
        UpgradeKind::Regen,
        UpgradeKind::DamageZone,
        UpgradeKind::Damage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Health => "Health",
            UpgradeKind::Regen => "Regen",
            UpgradeKind::DamageZone => "DamageZone",
            UpgradeKind::Damage => "Damage",
        }
    }

    pub fn strategy(&self) -> &'static UpgradeStrategy {
        match self {
            UpgradeKind::Health => &UPGRADES[0],
            UpgradeKind::Regen => &UPGRADES[1],
            UpgradeKind::DamageZone => &UPGRADES[2],
            UpgradeKind::Damage => &UPGRADES[3],
        }
    }
}

/// Cost, precondition and effect of one upgrade
#[derive(Debug, Clone, Copy)]
pub struct UpgradeStrategy {
    pub kind: UpgradeKind,
    pub cost: u32,
    pub can_apply: fn(&SaveData) -> bool,
    pub apply: fn(&mut SaveData),
}

fn always(_: &SaveData) -> bool {
    true
}

fn zone_below_cap(data: &SaveData) -> bool {
    data.damage_zone_size < DAMAGE_ZONE_MAX_SIZE
}

fn add_health(data: &mut SaveData) {
    data.max_health += HEALTH_UPGRADE_AMOUNT;
}

fn add_regen(data: &mut SaveData) {
    data.regen_rate += REGEN_UPGRADE_AMOUNT;
}

fn grow_zone(data: &mut SaveData) {
    data.damage_zone_size = (data.damage_zone_size + DAMAGE_ZONE_UPGRADE_AMOUNT).min(DAMAGE_ZONE_MAX_SIZE);
}

fn add_damage(data: &mut SaveData) {
    data.damage_per_tick += DAMAGE_UPGRADE_AMOUNT;
}

/// All upgrades, indexed in `UpgradeKind::ALL` order
pub static UPGRADES: [UpgradeStrategy; 4] = [
    UpgradeStrategy {
        kind: UpgradeKind::Health,
        cost: HEALTH_UPGRADE_COST,
        can_apply: always,
        apply: add_health,
    },
    UpgradeStrategy {
        kind: UpgradeKind::Regen,
        cost: REGEN_UPGRADE_COST,
        can_apply: always,
        apply: add_regen,
    },
    UpgradeStrategy {
        kind: UpgradeKind::DamageZone,
        cost: DAMAGE_ZONE_UPGRADE_COST,
        can_apply: zone_below_cap,
        apply: grow_zone,
    },
    UpgradeStrategy {
        kind: UpgradeKind::Damage,
        cost: DAMAGE_UPGRADE_COST,
        can_apply: always,
        apply: add_damage,
    },
];

/// Upgradable stats as used by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeStats {
    pub max_health: f32,
    pub regen_rate: f32,
    pub damage_zone_size: f32,
    pub damage_per_tick: f32,
}

impl Default for UpgradeStats {
    fn default() -> Self {
        Self::from(&SaveData::default())
    }
}

impl From<&SaveData> for UpgradeStats {
    fn from(data: &SaveData) -> Self {
        Self {
            max_health: data.max_health,
            regen_rate: data.regen_rate,
            damage_zone_size: data.damage_zone_size.min(DAMAGE_ZONE_MAX_SIZE),
            damage_per_tick: data.damage_per_tick,
        }
    }
}

/// Point-gated upgrade purchases
pub trait UpgradeLedger {
    /// Load cached stats from the store's current record
    fn initialize(&mut self, store: &dyn SaveStore);

    /// Buy one upgrade. Fails without touching the store when points are
    /// short or the upgrade is at its cap.
    fn attempt_purchase(&mut self, strategy: &UpgradeStrategy, store: &mut dyn SaveStore) -> bool;

    fn stats(&self) -> UpgradeStats;

    fn buy(&mut self, kind: UpgradeKind, store: &mut dyn SaveStore) -> bool {
        self.attempt_purchase(kind.strategy(), store)
    }

    fn buy_health(&mut self, store: &mut dyn SaveStore) -> bool {
        self.buy(UpgradeKind::Health, store)
    }

    fn buy_regen(&mut self, store: &mut dyn SaveStore) -> bool {
        self.buy(UpgradeKind::Regen, store)
    }

    fn buy_damage_zone(&mut self, store: &mut dyn SaveStore) -> bool {
        self.buy(UpgradeKind::DamageZone, store)
    }

    fn buy_damage(&mut self, store: &mut dyn SaveStore) -> bool {
        self.buy(UpgradeKind::Damage, store)
    }

    fn cost(&self, kind: UpgradeKind) -> u32 {
        kind.strategy().cost
    }

    fn max_health(&self) -> f32 {
        self.stats().max_health
    }

    fn regen_rate(&self) -> f32 {
        self.stats().regen_rate
    }

    fn damage_zone_size(&self) -> f32 {
        self.stats().damage_zone_size
    }

    fn damage_per_tick(&self) -> f32 {
        self.stats().damage_per_tick
    }
}

#[derive(Debug, Clone, Default)]
pub struct Upgrades {
    stats: UpgradeStats,
}

impl Upgrades {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UpgradeLedger for Upgrades {
    fn initialize(&mut self, store: &dyn SaveStore) {
        self.stats = UpgradeStats::from(&store.current_data());
    }

    fn attempt_purchase(&mut self, strategy: &UpgradeStrategy, store: &mut dyn SaveStore) -> bool {
        let mut data = store.current_data();

        if data.points < strategy.cost {
            log::debug!(
                "Cannot afford {} upgrade: {} < {}",
                strategy.kind.as_str(),
                data.points,
                strategy.cost
            );
            return false;
        }
        if !(strategy.can_apply)(&data) {
            log::debug!("{} upgrade is maxed out", strategy.kind.as_str());
            return false;
        }

        data.points -= strategy.cost;
        (strategy.apply)(&mut data);

        if !store.save_progress(&data) {
            log::warn!("{} upgrade applied but could not be written to disk", strategy.kind.as_str());
        }
        self.stats = UpgradeStats::from(&data);

        log::info!(
            "Bought {} upgrade for {} points ({} left)",
            strategy.kind.as_str(),
            strategy.cost,
            data.points
        );
        true
    }

    fn stats(&self) -> UpgradeStats {
        self.stats
    }
}
