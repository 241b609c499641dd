//! Core data model: orders, fills, sides, order types, and the snapshot
//! shapes the order book hands back to its caller.
//!
//! Orders live in exactly one place — `OrderBook::orders` — and are never
//! moved or cloned into the price levels; see `price_level.rs` for why.

use serde::{Deserialize, Serialize};

/// Unique order id within one book, assigned by `OrderBook::place` at
/// acceptance. Strictly increasing in acceptance order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// The four order types the matching algorithm understands.
///
/// `Market` ignores `Order::price` entirely (crossable at any price);
/// `Fok` and `Ioc` still carry a limit price and only cross at or better
/// than it, same as `Limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    Fok,
    Ioc,
}

/// One execution against a counterparty, appended to an order's `fills`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub price: i64,
    pub qty: i64,
    pub ts_ns: u128,
    /// The order on the other side of this trade.
    pub counterparty: OrderId,
}

/// A resting or closed order. Never deleted: cancellation only flips
/// `is_open` and empties the order from its price level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub account: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Ignored for `Market` orders.
    pub price: i64,
    pub original_qty: i64,
    pub qty_open: i64,
    pub is_open: bool,
    pub ts_created: u128,
    pub ts_last_fill: u128,
    pub fills: Vec<Fill>,
}

impl Order {
    pub fn total_filled(&self) -> i64 {
        self.original_qty - self.qty_open
    }

    pub fn to_snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            id: self.id,
            account: self.account.clone(),
            side: self.side,
            order_type: self.order_type,
            price: self.price,
            original_qty: self.original_qty,
            qty_open: self.qty_open,
            total_filled: self.total_filled(),
            is_open: self.is_open,
            ts_created: self.ts_created,
            ts_last_fill: self.ts_last_fill,
            fills: self.fills.clone(),
        }
    }
}

/// Read-only view of an order handed back across the `place`/`cancel`/
/// `status` contract — a copy, never an alias into `OrderBook::orders`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub account: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: i64,
    pub original_qty: i64,
    pub qty_open: i64,
    pub total_filled: i64,
    pub is_open: bool,
    pub ts_created: u128,
    pub ts_last_fill: u128,
    pub fills: Vec<Fill>,
}

/// One aggregated price level as exposed by `orderbook_snapshot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: i64,
    pub qty: i64,
}

/// Best-first depth view of both sides, as returned by `orderbook_snapshot`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
    pub ts_ns: u128,
}

/// Top-of-book view for one side: best price, quantity resting at that
/// price, and total quantity resting on the whole side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSide {
    pub price: i64,
    pub qty_at_price: i64,
    pub total_depth: i64,
}

/// Top-of-book view returned by `quote_snapshot`: best bid, best ask, and
/// the last trade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub bid: Option<QuoteSide>,
    pub ask: Option<QuoteSide>,
    pub last_trade_price: Option<i64>,
    pub last_trade_qty: Option<i64>,
    pub last_trade_ts: Option<u128>,
    pub ts_ns: u128,
}

/// Per-account cash/shares accumulator, updated on every fill.
/// 64-bit so a single large fill cannot overflow the cash side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPosition {
    pub cash_delta: i64,
    pub shares: i64,
}
