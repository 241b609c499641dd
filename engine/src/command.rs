//! The engine's internal method surface (C3).
//!
//! Each variant corresponds 1:1 to a command of the original textual line
//! protocol (`ORDER`, `ORDERBOOK`, `QUOTE`, `STATUS`, `CANCEL`,
//! `__ACC_FROM_ID__`, `__DEBUG_MEMORY__`). No text is parsed at runtime: the
//! `END`-terminated line protocol is replaced by this typed enum sent over a
//! channel to the book's actor task, with each variant's doc comment keeping
//! the textual command it replaces for traceability.

use orderbook::{AccountPosition, BookError, DepthSnapshot, OrderId, OrderSnapshot, OrderType, QuoteSnapshot, Side};
use serde::Serialize;
use tokio::sync::oneshot;

/// Diagnostic counters, only reachable when the front end's `extra` flag is
/// enabled (`__DEBUG_MEMORY__`).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DebugMemory {
    pub total_orders: usize,
    pub resting_orders: usize,
    pub trade_count: u64,
}

pub enum Command {
    /// `ORDER account account_id qty price dir_int type_int`
    PlaceOrder {
        account: String,
        side: Side,
        order_type: OrderType,
        price: i64,
        qty: i64,
        reply: oneshot::Sender<OrderSnapshot>,
    },
    /// `ORDERBOOK`
    OrderBookSnapshot { reply: oneshot::Sender<DepthSnapshot> },
    /// `QUOTE`
    Quote { reply: oneshot::Sender<QuoteSnapshot> },
    /// `STATUS order_id`
    Status {
        id: OrderId,
        reply: oneshot::Sender<Result<OrderSnapshot, BookError>>,
    },
    /// `CANCEL order_id`
    Cancel {
        id: OrderId,
        reply: oneshot::Sender<Result<OrderSnapshot, BookError>>,
    },
    /// `__ACC_FROM_ID__ order_id`
    AccountOf {
        id: OrderId,
        reply: oneshot::Sender<Result<String, BookError>>,
    },
    /// Not part of the original line protocol: cash/shares bookkeeping
    /// for the account-position endpoint.
    AccountPosition {
        account: String,
        reply: oneshot::Sender<AccountPosition>,
    },
    /// `__DEBUG_MEMORY__`
    DebugMemory { reply: oneshot::Sender<DebugMemory> },
}
