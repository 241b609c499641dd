//! One side (bids or asks) of an order book: a price-ordered collection of
//! `PriceLevel`s. Only non-empty levels are kept; an emptied level is
//! removed immediately so depth queries never see stale zero-qty rows.

use std::collections::BTreeMap;

use crate::price_level::PriceLevel;
use crate::types::{DepthLevel, Side};

pub struct BookSide {
    side: Side,
    levels: BTreeMap<i64, PriceLevel>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Highest bid / lowest ask, i.e. the best price on this side.
    pub fn best_price(&self) -> Option<i64> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    pub fn level(&self, price: i64) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub fn level_mut(&mut self, price: i64) -> &mut PriceLevel {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
    }

    pub fn remove_level_if_empty(&mut self, price: i64) {
        if matches!(self.levels.get(&price), Some(level) if level.is_empty()) {
            self.levels.remove(&price);
        }
    }

    /// Iterates levels best-price-first: descending for bids, ascending
    /// for asks.
    pub fn iter_best_first(&self) -> Box<dyn Iterator<Item = (&i64, &PriceLevel)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            Side::Sell => Box::new(self.levels.iter()),
        }
    }

    pub fn depth(&self) -> Vec<DepthLevel> {
        self.iter_best_first()
            .map(|(price, level)| DepthLevel {
                price: *price,
                qty: level.total_qty(),
            })
            .collect()
    }

    pub fn total_depth(&self) -> i64 {
        self.levels.values().map(PriceLevel::total_qty).sum()
    }

    /// Number of individual resting orders on this side (not aggregate
    /// quantity) — used for diagnostics only.
    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::len).sum()
    }
}
