//! Command mode resources.
//!
//! Resources are signed: costs and effects are applied without clamping, so a
//! mission can run into debt (negative budget, negative trust) instead of
//! failing outright.

use serde::{Deserialize, Serialize};

/// The kinds of resource tracked through a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Budget,
    Personnel,
    PublicTrust,
    Time,
}

impl ResourceKind {
    /// All resource kinds
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Budget,
        ResourceKind::Personnel,
        ResourceKind::PublicTrust,
        ResourceKind::Time,
    ];
}

/// A full resource snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub budget: i64,
    pub personnel: i64,
    pub public_trust: i64,
    pub time: i64,
}

impl Resources {
    pub fn new(budget: i64, personnel: i64, public_trust: i64, time: i64) -> Self {
        Self {
            budget,
            personnel,
            public_trust,
            time,
        }
    }

    /// Get a specific resource
    pub fn get(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Budget => self.budget,
            ResourceKind::Personnel => self.personnel,
            ResourceKind::PublicTrust => self.public_trust,
            ResourceKind::Time => self.time,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut i64 {
        match kind {
            ResourceKind::Budget => &mut self.budget,
            ResourceKind::Personnel => &mut self.personnel,
            ResourceKind::PublicTrust => &mut self.public_trust,
            ResourceKind::Time => &mut self.time,
        }
    }

    /// Subtract every field present in `cost`
    pub fn pay(&mut self, cost: &ResourceDelta) {
        for (kind, amount) in cost.entries() {
            *self.slot_mut(kind) -= amount;
        }
    }

    /// Add every field present in `effect`
    pub fn apply(&mut self, effect: &ResourceDelta) {
        for (kind, amount) in effect.entries() {
            *self.slot_mut(kind) += amount;
        }
    }

    /// Sum of all four resources
    pub fn total(&self) -> i64 {
        ResourceKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    /// Whether any resource is in debt
    pub fn any_negative(&self) -> bool {
        ResourceKind::ALL.iter().any(|k| self.get(*k) < 0)
    }
}

/// A partial change to resources; absent fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personnel: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_trust: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

impl ResourceDelta {
    pub fn get(&self, kind: ResourceKind) -> Option<i64> {
        match kind {
            ResourceKind::Budget => self.budget,
            ResourceKind::Personnel => self.personnel,
            ResourceKind::PublicTrust => self.public_trust,
            ResourceKind::Time => self.time,
        }
    }

    /// The fields that are present
    pub fn entries(&self) -> impl Iterator<Item = (ResourceKind, i64)> + '_ {
        ResourceKind::ALL
            .into_iter()
            .filter_map(move |k| self.get(k).map(|v| (k, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}
