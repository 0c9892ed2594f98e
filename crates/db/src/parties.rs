//! Party directory backed by a fixed map.

use std::collections::HashMap;

use bahi_core::tax::{Jurisdiction, PartyDirectory};
use bahi_shared::types::PartyId;

/// Party jurisdictions known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticPartyDirectory {
    parties: HashMap<PartyId, Jurisdiction>,
}

impl StaticPartyDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a party.
    #[must_use]
    pub fn with_party(mut self, party_id: PartyId, jurisdiction: impl AsRef<str>) -> Self {
        self.insert(party_id, jurisdiction);
        self
    }

    /// Adds or replaces a party.
    pub fn insert(&mut self, party_id: PartyId, jurisdiction: impl AsRef<str>) {
        self.parties.insert(party_id, Jurisdiction::new(jurisdiction));
    }
}

impl PartyDirectory for StaticPartyDirectory {
    fn jurisdiction(&self, party_id: PartyId) -> Option<Jurisdiction> {
        self.parties.get(&party_id).cloned()
    }
}

#[cfg(test)]
#[path = "parties_tests.rs"]
mod tests;
