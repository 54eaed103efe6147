//! Percentage split of one requested amount across selected banks.
//!
//! Invariant: a non-empty allocation always sums to exactly 100 and no
//! share is negative. Rounding slack lands on the last entry.

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::Serialize;

pub const FULL_SHARE: u32 = 100;

/// Integer parts of `budget` proportional to `weights`. All but the last
/// part are rounded and clamped to what is left; the last takes the rest.
/// Zero total weight splits evenly, leading entries taking the remainder.
pub fn distribute(weights: &[f64], budget: u32) -> Vec<u32> {
    let count = weights.len();

    if count == 0 {
        return vec![];
    }

    let weights: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();

    if total <= 0.0 || !total.is_finite() {
        return even_split(count, budget);
    }

    let mut remaining = budget;
    let mut parts = Vec::with_capacity(count);

    for weight in &weights[..count - 1] {
        let part = ((weight / total) * f64::from(budget)).round() as u32;
        let part = part.min(remaining);
        remaining -= part;
        parts.push(part);
    }

    parts.push(remaining);
    parts
}

pub fn even_split(count: usize, budget: u32) -> Vec<u32> {
    if count == 0 {
        return vec![];
    }

    let count_u32 = count as u32;
    let base = budget / count_u32;
    let remainder = budget % count_u32;

    (0..count_u32)
        .map(|index| base + u32::from(index < remainder))
        .collect()
}

pub fn balance_shares(weights: &[f64]) -> Vec<u32> {
    distribute(weights, FULL_SHARE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankShare {
    pub bank_id: i64,
    pub share: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShareAllocation {
    entries: Vec<BankShare>,
}

impl ShareAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evenly(bank_ids: &[i64]) -> Self {
        let mut allocation = Self::new();
        for bank_id in bank_ids {
            if !allocation.contains(*bank_id) {
                allocation.entries.push(BankShare {
                    bank_id: *bank_id,
                    share: 0,
                });
            }
        }
        allocation.redistribute_evenly();
        allocation
    }

    pub fn from_weights(weights: &[(i64, f64)]) -> Self {
        let shares =
            balance_shares(&weights.iter().map(|(_, w)| *w).collect::<Vec<_>>());
        let entries = weights
            .iter()
            .zip(shares)
            .map(|((bank_id, _), share)| BankShare {
                bank_id: *bank_id,
                share,
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[BankShare] {
        &self.entries
    }

    pub fn bank_ids(&self) -> Vec<i64> {
        self.entries.iter().map(|e| e.bank_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, bank_id: i64) -> bool {
        self.entries.iter().any(|e| e.bank_id == bank_id)
    }

    pub fn share_of(&self, bank_id: i64) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.bank_id == bank_id)
            .map(|e| e.share)
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|e| e.share).sum()
    }

    /// New banks join with a zero share; the first bank of an empty
    /// selection takes everything.
    pub fn add(&mut self, bank_id: i64) {
        if self.contains(bank_id) {
            return;
        }

        let share = if self.entries.is_empty() { FULL_SHARE } else { 0 };
        self.entries.push(BankShare { bank_id, share });
    }

    /// Drops a bank and spreads its share over the rest in proportion to
    /// their current shares.
    pub fn remove(&mut self, bank_id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.bank_id != bank_id);

        if self.entries.len() == before {
            return false;
        }

        let weights: Vec<f64> =
            self.entries.iter().map(|e| f64::from(e.share)).collect();
        self.assign(&distribute(&weights, FULL_SHARE));

        true
    }

    /// Pins one bank to `share` (capped at 100) and scales the others to
    /// absorb the difference. A lone bank always holds 100.
    pub fn set_share(&mut self, bank_id: i64, share: u32) -> bool {
        let Some(position) = self.entries.iter().position(|e| e.bank_id == bank_id)
        else {
            return false;
        };

        if self.entries.len() == 1 {
            self.entries[0].share = FULL_SHARE;
            return true;
        }

        let share = share.min(FULL_SHARE);
        let others: Vec<f64> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != position)
            .map(|(_, e)| f64::from(e.share))
            .collect();
        let mut parts = distribute(&others, FULL_SHARE - share).into_iter();

        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.share = if index == position {
                share
            } else {
                parts.next().unwrap_or(0)
            };
        }

        true
    }

    pub fn redistribute_evenly(&mut self) {
        let parts = even_split(self.entries.len(), FULL_SHARE);
        self.assign(&parts);
    }

    /// Whole-rouble amount per bank; the last bank receives whatever the
    /// truncation of the others left over, so the parts add up to `total`.
    pub fn split_amount(&self, total: &BigDecimal) -> Vec<(i64, BigDecimal)> {
        let mut rest = total.clone();
        let mut parts = Vec::with_capacity(self.entries.len());
        let hundred = BigDecimal::from(FULL_SHARE);

        for (index, entry) in self.entries.iter().enumerate() {
            let amount = if index + 1 == self.entries.len() {
                rest.clone()
            } else {
                (total * BigDecimal::from(entry.share) / &hundred)
                    .with_scale_round(0, RoundingMode::Down)
            };
            rest -= &amount;
            parts.push((entry.bank_id, amount));
        }

        parts
            .into_iter()
            .map(|(bank_id, amount)| {
                if amount < BigDecimal::zero() {
                    (bank_id, BigDecimal::zero())
                } else {
                    (bank_id, amount)
                }
            })
            .collect()
    }

    fn assign(&mut self, parts: &[u32]) {
        for (entry, part) in self.entries.iter_mut().zip(parts) {
            entry.share = *part;
        }
    }
}
