use super::*;
use hg_core::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Running rebuy totals for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    count: u32,
    #[serde(rename = "totalAmount")]
    total: Chips,
}

impl Tally {
    pub fn count(&self) -> u32 {
        self.count
    }
    pub fn total(&self) -> Chips {
        self.total
    }
    /// Tally after one more rebuy, unless a counter would overflow.
    fn with(self, amount: Chips) -> Option<Self> {
        Some(Self {
            count: self.count.checked_add(1)?,
            total: self.total.checked_add(amount)?,
        })
    }
}

/// Append-only rebuy book. Tallies are derived from the history as it
/// grows, so a tally always equals the count and sum of that player's
/// history entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    tallies: BTreeMap<ID<Player>, Tally>,
    history: Vec<Rebuy>,
    total: Chips,
}

impl Ledger {
    pub fn tally(&self, player: ID<Player>) -> Tally {
        self.tallies.get(&player).copied().unwrap_or_default()
    }
    /// Chronological history; insertion order is time order.
    pub fn history(&self) -> &[Rebuy] {
        &self.history
    }
    /// Sum of every rebuy across all players.
    pub fn total(&self) -> Chips {
        self.total
    }
    /// Everything a player has paid in: the buy-in plus their rebuys.
    pub fn money_in(&self, player: ID<Player>, buy_in: Chips) -> Option<Chips> {
        buy_in.checked_add(self.tally(player).total())
    }
    /// Appends an event. Callers check rebuy preconditions first; an
    /// amount that would overflow a running total is refused unrecorded.
    pub(crate) fn record(&mut self, rebuy: Rebuy) -> Result<(), SessionError> {
        let overflow = SessionError::AmountTooLarge(rebuy.amount());
        let total = self.total.checked_add(rebuy.amount()).ok_or(overflow.clone())?;
        let tally = self.tally(rebuy.player()).with(rebuy.amount()).ok_or(overflow)?;
        self.tallies.insert(rebuy.player(), tally);
        self.total = total;
        self.history.push(rebuy);
        Ok(())
    }
}

impl TryFrom<Vec<Rebuy>> for Ledger {
    type Error = SessionError;
    fn try_from(history: Vec<Rebuy>) -> Result<Self, Self::Error> {
        history.into_iter().try_fold(Self::default(), |mut ledger, rebuy| {
            ledger.record(rebuy)?;
            Ok(ledger)
        })
    }
}
