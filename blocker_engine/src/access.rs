use std::collections::BTreeMap;

use blocker_formats::Settings;
use thiserror::Error;

use crate::host::{Authorizer, OccupantRegistry, Slot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no connected occupant has steam id {0}")]
    UnknownSteamId(u64),
}

/// Who may drive the editing menus.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    permission: String,
    flag: String,
    /// Slot to the steam id the override was granted to.
    overrides: BTreeMap<Slot, u64>,
}

impl AccessPolicy {
    pub fn new(permission: impl Into<String>, flag: impl Into<String>) -> Self {
        AccessPolicy {
            permission: permission.into(),
            flag: flag.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.access_permission.trim(),
            settings.access_flag.trim(),
        )
    }

    /// Temporary overrides win while their grantee still holds the slot;
    /// otherwise the permission string is checked when configured, then the
    /// flag. With neither, nobody gets in.
    pub fn allows<A>(&self, slot: Slot, host: &A) -> bool
    where
        A: Authorizer + OccupantRegistry + ?Sized,
    {
        let granted = self
            .overrides
            .get(&slot)
            .is_some_and(|steam_id| host.slot_for_steam_id(*steam_id) == Some(slot));
        if granted {
            return true;
        }
        if !self.permission.is_empty() {
            return host.has_permission(slot, &self.permission);
        }
        if !self.flag.is_empty() {
            return host.has_flag(slot, &self.flag);
        }
        false
    }

    pub fn grant(&mut self, slot: Slot, steam_id: u64) {
        self.overrides.insert(slot, steam_id);
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn overrides(&self) -> impl Iterator<Item = Slot> + '_ {
        self.overrides.keys().copied()
    }
}
