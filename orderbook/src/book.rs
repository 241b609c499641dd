//! The order book (C2): two price-ordered sides, the matching algorithm,
//! the order/fill registry, and quote/depth snapshots.
//!
//! Orders are kept in a single arena (`orders`); price levels hold only
//! `OrderId`s. This is the arena+index pattern called for by the crate's
//! design notes in place of cyclic `Order <-> Fill <-> counterparty`
//! references: a `Fill` carries the counterparty's id, never a pointer to
//! it, and a level never needs to be kept in sync with a cloned `Order`.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::price_level::PriceLevel;
use crate::side::BookSide;
use crate::types::{
    AccountPosition, DepthSnapshot, Fill, Order, OrderId, OrderSnapshot, OrderType, QuoteSide,
    QuoteSnapshot, Side,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    #[error("no such order {0:?}")]
    NotFound(OrderId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastTrade {
    price: i64,
    qty: i64,
    ts_ns: u128,
}

/// A single-symbol matching engine's in-memory book.
///
/// Not thread-safe by design: the engine loop that owns one
/// `OrderBook` processes one command to completion before the next, so the
/// book itself needs no internal synchronization.
pub struct OrderBook {
    bids: BookSide,
    asks: BookSide,
    orders: HashMap<OrderId, Order>,
    accounts: HashMap<String, AccountPosition>,
    next_order_id: u64,
    trade_count: u64,
    last_trade: Option<LastTrade>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            orders: HashMap::new(),
            accounts: HashMap::new(),
            next_order_id: 0,
            trade_count: 0,
            last_trade: None,
        }
    }

    /// Accepts a new order, runs the matching algorithm, and returns a
    /// snapshot of the resulting order. Single entry point for the
    /// FOK pre-check / crossing walk / rest-or-discard sequence below.
    pub fn place(
        &mut self,
        account: impl Into<String>,
        side: Side,
        order_type: OrderType,
        price: i64,
        qty: i64,
    ) -> OrderSnapshot {
        let now = now_ns();
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;

        let mut order = Order {
            id,
            account: account.into(),
            side,
            order_type,
            price,
            original_qty: qty,
            qty_open: qty,
            is_open: false,
            ts_created: now,
            ts_last_fill: 0,
            fills: Vec::new(),
        };

        // Step 1: FOK is all-or-nothing, checked before any fill happens.
        if order_type == OrderType::Fok {
            let available = self.crossable_qty(order.side, order.price, order.order_type);
            if available < qty {
                self.orders.insert(id, order.clone());
                return order.to_snapshot();
            }
        }

        // Step 2: walk the opposing side best-price-first.
        self.match_order(&mut order, now);

        // Step 3: rest, discard, or close.
        if order_type == OrderType::Limit && order.qty_open > 0 {
            order.is_open = true;
            let (side, price, qty_open) = (order.side, order.price, order.qty_open);
            self.side_mut(side).level_mut(price).append(id, qty_open);
        } else {
            if order.qty_open > 0 {
                // Market/IOC swept what was available; FOK only reaches
                // here fully filled. The unmatched remainder is discarded,
                // not parked — distinct from a cancel, which preserves it.
                order.qty_open = 0;
            }
            order.is_open = false;
        }

        self.orders.insert(id, order.clone());
        order.to_snapshot()
    }

    /// Cancels a resting order. Unknown ids return `BookError::NotFound`;
    /// cancelling an already-closed order is a no-op returning its current
    /// snapshot (idempotent).
    pub fn cancel(&mut self, id: OrderId) -> Result<OrderSnapshot, BookError> {
        let is_open = self.orders.get(&id).ok_or(BookError::NotFound(id))?.is_open;
        if !is_open {
            return Ok(self.orders[&id].to_snapshot());
        }

        let (side, price, qty_open) = {
            let order = &self.orders[&id];
            (order.side, order.price, order.qty_open)
        };
        let book_side = self.side_mut(side);
        let level = book_side.level_mut(price);
        if level.remove(id) {
            level.reduce_qty(qty_open);
        }
        book_side.remove_level_if_empty(price);

        let order = self.orders.get_mut(&id).unwrap();
        order.is_open = false;
        Ok(order.to_snapshot())
    }

    pub fn status(&self, id: OrderId) -> Result<OrderSnapshot, BookError> {
        self.orders
            .get(&id)
            .map(Order::to_snapshot)
            .ok_or(BookError::NotFound(id))
    }

    pub fn account_of(&self, id: OrderId) -> Result<String, BookError> {
        self.orders
            .get(&id)
            .map(|o| o.account.clone())
            .ok_or(BookError::NotFound(id))
    }

    pub fn orderbook_snapshot(&self) -> DepthSnapshot {
        DepthSnapshot {
            bids: self.bids.depth(),
            asks: self.asks.depth(),
            ts_ns: now_ns(),
        }
    }

    pub fn quote_snapshot(&self) -> QuoteSnapshot {
        let bid = self.bids.best_price().map(|price| QuoteSide {
            price,
            qty_at_price: self.bids.level(price).map(PriceLevel::total_qty).unwrap_or(0),
            total_depth: self.bids.total_depth(),
        });
        let ask = self.asks.best_price().map(|price| QuoteSide {
            price,
            qty_at_price: self.asks.level(price).map(PriceLevel::total_qty).unwrap_or(0),
            total_depth: self.asks.total_depth(),
        });
        let (last_trade_price, last_trade_qty, last_trade_ts) = match self.last_trade {
            Some(lt) => (Some(lt.price), Some(lt.qty), Some(lt.ts_ns)),
            None => (None, None, None),
        };
        QuoteSnapshot {
            bid,
            ask,
            last_trade_price,
            last_trade_qty,
            last_trade_ts,
            ts_ns: now_ns(),
        }
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    pub fn account_position(&self, account: &str) -> AccountPosition {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    /// Total orders ever accepted by this book (open, filled, or cancelled).
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Orders currently resting on either side.
    pub fn resting_order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn side_ref(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// True if a resting level at `level_price` would cross an aggressor
    /// of the given side/type/price. `Market` crosses anything.
    fn crosses(side: Side, order_type: OrderType, order_price: i64, level_price: i64) -> bool {
        if order_type == OrderType::Market {
            return true;
        }
        match side {
            Side::Buy => level_price <= order_price,
            Side::Sell => level_price >= order_price,
        }
    }

    /// Total quantity resting on the opposing side at prices that would
    /// cross this (side, price, type) — used for the FOK pre-check.
    fn crossable_qty(&self, side: Side, price: i64, order_type: OrderType) -> i64 {
        let opposing = self.side_ref(side.opposite());
        let mut total = 0i64;
        for (level_price, level) in opposing.iter_best_first() {
            if !Self::crosses(side, order_type, price, *level_price) {
                break;
            }
            total += level.total_qty();
        }
        total
    }

    /// Walks the opposing side best-price-first, filling `order` against
    /// resting orders in strict FIFO order within each level, until either
    /// `order` is filled or the book no longer crosses it.
    fn match_order(&mut self, order: &mut Order, now: u128) {
        let opposing_side = order.side.opposite();

        while order.qty_open > 0 {
            let Some(level_price) = self.side_ref(opposing_side).best_price() else {
                break;
            };
            if !Self::crosses(order.side, order.order_type, order.price, level_price) {
                break;
            }

            let Some(maker_id) = self.side_ref(opposing_side).level(level_price).and_then(PriceLevel::peek_front) else {
                // Invariant violation guard: an empty level should already
                // have been removed. Drop it defensively and keep walking.
                self.side_mut(opposing_side).remove_level_if_empty(level_price);
                continue;
            };

            let fill_qty = order.qty_open.min(self.orders[&maker_id].qty_open);
            let trade_price = level_price; // resting side sets the trade price

            {
                let maker = self.orders.get_mut(&maker_id).unwrap();
                maker.qty_open -= fill_qty;
                maker.ts_last_fill = now;
                maker.fills.push(Fill {
                    price: trade_price,
                    qty: fill_qty,
                    ts_ns: now,
                    counterparty: order.id,
                });
            }
            order.qty_open -= fill_qty;
            order.ts_last_fill = now;
            order.fills.push(Fill {
                price: trade_price,
                qty: fill_qty,
                ts_ns: now,
                counterparty: maker_id,
            });

            self.settle_trade(order.side, &order.account, &maker_id, trade_price, fill_qty);
            self.last_trade = Some(LastTrade {
                price: trade_price,
                qty: fill_qty,
                ts_ns: now,
            });
            self.trade_count += 1;

            let maker_exhausted = self.orders[&maker_id].qty_open == 0;
            let opposing = self.side_mut(opposing_side);
            let level = opposing.level_mut(level_price);
            level.reduce_qty(fill_qty);
            if maker_exhausted {
                level.pop_front();
                self.orders.get_mut(&maker_id).unwrap().is_open = false;
            }
            if level.is_empty() {
                opposing.remove_level_if_empty(level_price);
            }
        }
    }

    /// Updates both counterparties' cash/shares for one trade. Self-cross
    /// (same account on both sides) is permitted and nets to a no-op; this
    /// simulator does not police self-trading.
    fn settle_trade(
        &mut self,
        aggressor_side: Side,
        aggressor_account: &str,
        maker_id: &OrderId,
        price: i64,
        qty: i64,
    ) {
        let maker_account = self.orders[maker_id].account.clone();
        let (buyer, seller) = match aggressor_side {
            Side::Buy => (aggressor_account.to_string(), maker_account),
            Side::Sell => (maker_account, aggressor_account.to_string()),
        };
        let notional = price * qty; // fits i64: both price and qty are bounded by 2^31-1

        let buyer_pos = self.accounts.entry(buyer).or_default();
        buyer_pos.cash_delta -= notional;
        buyer_pos.shares += qty;

        let seller_pos = self.accounts.entry(seller).or_default();
        seller_pos.cash_delta += notional;
        seller_pos.shares -= qty;
    }
}

fn now_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty_on_side(book: &OrderBook, side: Side) -> i64 {
        match side {
            Side::Buy => book.bids.total_depth(),
            Side::Sell => book.asks.total_depth(),
        }
    }

    /// I1: best bid must always be below best ask.
    fn assert_not_crossed(book: &OrderBook) {
        if let (Some(bid), Some(ask)) = (book.bids.best_price(), book.asks.best_price()) {
            assert!(bid < ask, "book crossed: bid {bid} >= ask {ask}");
        }
    }

    /// I2: fills + qty_open == original_qty, for orders that are open or
    /// fully filled. FOK/IOC/MARKET orders that close with an undelivered
    /// remainder zero `qty_open` instead of retaining it (see DESIGN.md's
    /// Open Question (5)), so this check is skipped for those.
    fn assert_fill_accounting(snap: &OrderSnapshot) {
        let filled: i64 = snap.fills.iter().map(|f| f.qty).sum();
        if snap.is_open || snap.total_filled == snap.original_qty {
            assert_eq!(filled + snap.qty_open, snap.original_qty);
        }
    }

    #[test]
    fn scenario_1_rest_then_match() {
        let mut book = OrderBook::new();
        let a = book.place("A", Side::Sell, OrderType::Limit, 50, 100);
        assert!(a.is_open);
        assert_eq!(a.fills.len(), 0);

        let b = book.place("B", Side::Buy, OrderType::Limit, 50, 40);
        assert_eq!(b.qty_open, 0);
        assert!(!b.is_open);
        assert_eq!(b.fills.len(), 1);
        assert_eq!(b.fills[0].price, 50);
        assert_eq!(b.fills[0].qty, 40);

        let a_status = book.status(a.id).unwrap();
        assert_eq!(a_status.qty_open, 60);
        assert!(a_status.is_open);

        let quote = book.quote_snapshot();
        assert!(quote.bid.is_none());
        assert_eq!(quote.ask.unwrap().qty_at_price, 60);
        assert_eq!(quote.last_trade_price, Some(50));
        assert_eq!(quote.last_trade_qty, Some(40));

        assert_not_crossed(&book);
        assert_fill_accounting(&a_status);
        assert_fill_accounting(&b);
    }

    #[test]
    fn scenario_2_fok_unfilled() {
        let mut book = OrderBook::new();
        book.place("A", Side::Sell, OrderType::Limit, 50, 100);

        let b = book.place("B", Side::Buy, OrderType::Fok, 50, 200);
        assert_eq!(b.fills.len(), 0);
        assert!(!b.is_open);

        let quote = book.quote_snapshot();
        assert_eq!(quote.ask.unwrap().qty_at_price, 100);
        assert_not_crossed(&book);
    }

    #[test]
    fn scenario_3_ioc_partial() {
        let mut book = OrderBook::new();
        book.place("A", Side::Sell, OrderType::Limit, 50, 30);

        let b = book.place("B", Side::Buy, OrderType::Ioc, 50, 100);
        assert_eq!(b.fills.iter().map(|f| f.qty).sum::<i64>(), 30);
        assert_eq!(b.qty_open, 0);
        assert!(!b.is_open);
        assert_not_crossed(&book);
    }

    #[test]
    fn scenario_4_market_sweeps_levels() {
        let mut book = OrderBook::new();
        book.place("A", Side::Sell, OrderType::Limit, 50, 10);
        book.place("A", Side::Sell, OrderType::Limit, 51, 10);
        book.place("A", Side::Sell, OrderType::Limit, 52, 10);

        let b = book.place("B", Side::Buy, OrderType::Market, 0, 25);
        assert_eq!(b.fills.len(), 3);
        assert_eq!(b.fills[0].price, 50);
        assert_eq!(b.fills[0].qty, 10);
        assert_eq!(b.fills[1].price, 51);
        assert_eq!(b.fills[1].qty, 10);
        assert_eq!(b.fills[2].price, 52);
        assert_eq!(b.fills[2].qty, 5);
        assert!(!b.is_open);
        assert_eq!(b.qty_open, 0);

        let quote = book.quote_snapshot();
        assert_eq!(quote.ask.unwrap().price, 52);
        assert_eq!(quote.ask.unwrap().qty_at_price, 5);
    }

    #[test]
    fn scenario_5_cancel_preserves_fills() {
        let mut book = OrderBook::new();
        let a = book.place("A", Side::Sell, OrderType::Limit, 50, 100);
        book.place("B", Side::Buy, OrderType::Limit, 50, 40);

        let cancelled = book.cancel(a.id).unwrap();
        assert!(!cancelled.is_open);
        assert_eq!(cancelled.qty_open, 60);
        assert_eq!(cancelled.fills.len(), 1);
        assert_eq!(cancelled.fills[0].qty, 40);
        assert_eq!(cancelled.fills[0].price, 50);

        // Idempotent: cancelling again returns the same snapshot.
        let cancelled_again = book.cancel(a.id).unwrap();
        assert_eq!(cancelled, cancelled_again);
    }

    #[test]
    fn scenario_6_cross_at_aggressor_limit() {
        let mut book = OrderBook::new();
        book.place("A", Side::Sell, OrderType::Limit, 50, 10);

        let b = book.place("B", Side::Buy, OrderType::Limit, 60, 10);
        assert_eq!(b.fills.len(), 1);
        assert_eq!(b.fills[0].price, 50); // resting side's price, not 60
    }

    #[test]
    fn fifo_within_a_level() {
        let mut book = OrderBook::new();
        let first = book.place("A1", Side::Sell, OrderType::Limit, 50, 10);
        let second = book.place("A2", Side::Sell, OrderType::Limit, 50, 10);

        let aggressor = book.place("B", Side::Buy, OrderType::Limit, 50, 15);
        assert_eq!(aggressor.fills.len(), 2);
        assert_eq!(aggressor.fills[0].counterparty, first.id);
        assert_eq!(aggressor.fills[0].qty, 10);
        assert_eq!(aggressor.fills[1].counterparty, second.id);
        assert_eq!(aggressor.fills[1].qty, 5);

        let second_status = book.status(second.id).unwrap();
        assert_eq!(second_status.qty_open, 5);
        assert!(second_status.is_open);
    }

    #[test]
    fn market_against_empty_side_closes_with_no_fills() {
        let mut book = OrderBook::new();
        let order = book.place("B", Side::Buy, OrderType::Market, 0, 100);
        assert!(order.fills.is_empty());
        assert!(!order.is_open);
        assert_eq!(order.qty_open, 0);
    }

    #[test]
    fn self_cross_nets_to_zero_position() {
        let mut book = OrderBook::new();
        book.place("A", Side::Sell, OrderType::Limit, 50, 10);
        book.place("A", Side::Buy, OrderType::Limit, 50, 10);

        let position = book.account_position("A");
        assert_eq!(position.cash_delta, 0);
        assert_eq!(position.shares, 0);
    }

    #[test]
    fn cancel_of_partially_filled_order_corrects_depth() {
        let mut book = OrderBook::new();
        let a = book.place("A", Side::Sell, OrderType::Limit, 50, 100);
        book.place("B", Side::Buy, OrderType::Limit, 50, 40);
        assert_eq!(book.quote_snapshot().ask.unwrap().qty_at_price, 60);

        book.cancel(a.id).unwrap();
        // The level is now empty and should have been dropped entirely,
        // not merely left with a stale nonzero qty.
        assert!(book.quote_snapshot().ask.is_none());
    }

    #[test]
    fn order_ids_are_dense_and_increasing() {
        let mut book = OrderBook::new();
        let a = book.place("A", Side::Sell, OrderType::Limit, 50, 10);
        let b = book.place("B", Side::Buy, OrderType::Limit, 40, 10);
        let c = book.place("C", Side::Sell, OrderType::Limit, 60, 10);
        assert_eq!(a.id, OrderId(0));
        assert_eq!(b.id, OrderId(1));
        assert_eq!(c.id, OrderId(2));
    }

    #[test]
    fn cancel_unknown_order_is_not_found() {
        let mut book = OrderBook::new();
        assert_eq!(book.cancel(OrderId(42)), Err(BookError::NotFound(OrderId(42))));
    }

    #[test]
    fn status_unknown_order_is_not_found() {
        let book = OrderBook::new();
        assert_eq!(book.status(OrderId(0)), Err(BookError::NotFound(OrderId(0))));
    }

    #[test]
    fn conservation_of_shares_and_cash_across_trades() {
        let mut book = OrderBook::new();
        book.place("A", Side::Sell, OrderType::Limit, 50, 100);
        book.place("B", Side::Buy, OrderType::Limit, 50, 40);
        book.place("C", Side::Buy, OrderType::Limit, 55, 60);

        let a = book.account_position("A");
        let b = book.account_position("B");
        let c = book.account_position("C");

        assert_eq!(a.shares + b.shares + c.shares, 0);
        assert_eq!(a.cash_delta + b.cash_delta + c.cash_delta, 0);
    }

    #[test]
    fn zero_price_market_order_is_ignored_but_limit_is_legal() {
        let mut book = OrderBook::new();
        // A zero-price limit sell is legal (if unmatchable against any buy).
        let resting = book.place("A", Side::Sell, OrderType::Limit, 0, 10);
        assert!(resting.is_open);

        // A market buy crosses it regardless of the aggressor having no price.
        let filled = book.place("B", Side::Buy, OrderType::Market, 0, 10);
        assert_eq!(filled.fills.len(), 1);
        assert_eq!(filled.fills[0].price, 0);
    }
}
