//! HTTP request/response bodies for the Stockfighter-compatible surface.
//!
//! Includes the `stock`/`symbol` and `orderType`/`ordertype` field-name
//! fallbacks that real Stockfighter clients rely on.

use orderbook::{AccountPosition, DepthSnapshot, Fill, OrderId, OrderSnapshot, OrderType, QuoteSnapshot, Side};
use serde::{Deserialize, Serialize};

fn direction_str(side: Side) -> &'static str {
    match side {
        Side::Buy => "buy",
        Side::Sell => "sell",
    }
}

fn order_type_str(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Limit => "limit",
        OrderType::Market => "market",
        OrderType::Fok => "fill-or-kill",
        OrderType::Ioc => "immediate-or-cancel",
    }
}

/// Body of `POST /ob/api/venues/{venue}/stocks/{symbol}/orders`.
///
/// `venue`/`stock`/`symbol` are optional: when absent, the URL's venue and
/// symbol are used instead (official Stockfighter clients often omit
/// them); when present, they must agree with the URL or the request is
/// rejected with `URL_MISMATCH`.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub account: Option<String>,
    pub venue: Option<String>,
    pub stock: Option<String>,
    pub symbol: Option<String>,
    pub price: Option<serde_json::Value>,
    pub qty: Option<serde_json::Value>,
    #[serde(rename = "orderType")]
    pub order_type: Option<serde_json::Value>,
    pub ordertype: Option<serde_json::Value>,
    pub direction: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct Heartbeat {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct VenuesResponse {
    pub ok: bool,
    pub venues: Vec<VenueEntry>,
}

#[derive(Debug, Serialize)]
pub struct VenueEntry {
    pub name: String,
    pub venue: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct VenueHeartbeat {
    pub ok: bool,
    pub venue: String,
}

#[derive(Debug, Serialize)]
pub struct StocksResponse {
    pub ok: bool,
    pub symbols: Vec<StockEntry>,
}

#[derive(Debug, Serialize)]
pub struct StockEntry {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub ok: bool,
    pub venue: String,
    pub symbol: String,
    pub id: u64,
    pub account: String,
    pub price: i64,
    #[serde(rename = "originalQty")]
    pub original_qty: i64,
    pub qty: i64,
    pub direction: String,
    #[serde(rename = "orderType")]
    pub order_type: String,
    pub ts: u128,
    pub fills: Vec<FillResponse>,
    #[serde(rename = "totalFilled")]
    pub total_filled: i64,
    pub open: bool,
}

#[derive(Debug, Serialize)]
pub struct FillResponse {
    pub price: i64,
    pub qty: i64,
    pub ts: u128,
}

impl OrderResponse {
    pub fn from_snapshot(venue: &str, symbol: &str, snap: OrderSnapshot) -> Self {
        OrderResponse {
            ok: true,
            venue: venue.to_string(),
            symbol: symbol.to_string(),
            id: snap.id.0,
            account: snap.account,
            price: snap.price,
            original_qty: snap.original_qty,
            qty: snap.qty_open,
            direction: direction_str(snap.side).to_string(),
            order_type: order_type_str(snap.order_type).to_string(),
            ts: snap.ts_created,
            fills: snap.fills.into_iter().map(FillResponse::from_fill).collect(),
            total_filled: snap.total_filled,
            open: snap.is_open,
        }
    }
}

impl FillResponse {
    fn from_fill(fill: Fill) -> Self {
        FillResponse {
            price: fill.price,
            qty: fill.qty,
            ts: fill.ts_ns,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderBookResponse {
    pub ok: bool,
    pub venue: String,
    pub symbol: String,
    pub bids: Vec<DepthLevelResponse>,
    pub asks: Vec<DepthLevelResponse>,
    pub ts: u128,
}

#[derive(Debug, Serialize)]
pub struct DepthLevelResponse {
    pub price: i64,
    pub qty: i64,
    #[serde(rename = "isBuy")]
    pub is_buy: bool,
}

impl OrderBookResponse {
    pub fn from_snapshot(venue: &str, symbol: &str, snap: DepthSnapshot) -> Self {
        OrderBookResponse {
            ok: true,
            venue: venue.to_string(),
            symbol: symbol.to_string(),
            bids: snap
                .bids
                .into_iter()
                .map(|l| DepthLevelResponse {
                    price: l.price,
                    qty: l.qty,
                    is_buy: true,
                })
                .collect(),
            asks: snap
                .asks
                .into_iter()
                .map(|l| DepthLevelResponse {
                    price: l.price,
                    qty: l.qty,
                    is_buy: false,
                })
                .collect(),
            ts: snap.ts_ns,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub ok: bool,
    pub venue: String,
    pub symbol: String,
    pub bid: Option<i64>,
    #[serde(rename = "bidSize")]
    pub bid_size: i64,
    #[serde(rename = "bidDepth")]
    pub bid_depth: i64,
    pub ask: Option<i64>,
    #[serde(rename = "askSize")]
    pub ask_size: i64,
    #[serde(rename = "askDepth")]
    pub ask_depth: i64,
    pub last: Option<i64>,
    #[serde(rename = "lastSize")]
    pub last_size: Option<i64>,
    #[serde(rename = "quoteTime")]
    pub quote_time: u128,
}

impl QuoteResponse {
    pub fn from_snapshot(venue: &str, symbol: &str, snap: QuoteSnapshot) -> Self {
        QuoteResponse {
            ok: true,
            venue: venue.to_string(),
            symbol: symbol.to_string(),
            bid: snap.bid.as_ref().map(|s| s.price),
            bid_size: snap.bid.as_ref().map(|s| s.qty_at_price).unwrap_or(0),
            bid_depth: snap.bid.as_ref().map(|s| s.total_depth).unwrap_or(0),
            ask: snap.ask.as_ref().map(|s| s.price),
            ask_size: snap.ask.as_ref().map(|s| s.qty_at_price).unwrap_or(0),
            ask_depth: snap.ask.as_ref().map(|s| s.total_depth).unwrap_or(0),
            last: snap.last_trade_price,
            last_size: snap.last_trade_qty,
            quote_time: snap.ts_ns,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountPositionResponse {
    pub ok: bool,
    pub account: String,
    #[serde(rename = "cashDelta")]
    pub cash_delta: i64,
    pub shares: i64,
}

impl AccountPositionResponse {
    pub fn from_position(account: &str, position: AccountPosition) -> Self {
        AccountPositionResponse {
            ok: true,
            account: account.to_string(),
            cash_delta: position.cash_delta,
            shares: position.shares,
        }
    }
}

/// Diagnostic response for `__DEBUG_MEMORY__`, gated on `--extra`.
#[derive(Debug, Serialize)]
pub struct DebugMemoryResponse {
    pub ok: bool,
    #[serde(rename = "totalOrders")]
    pub total_orders: usize,
    #[serde(rename = "restingOrders")]
    pub resting_orders: usize,
    #[serde(rename = "tradeCount")]
    pub trade_count: u64,
}

/// `OrderId`s submitted in a URL path parameter, parsed and range-checked
/// against the same `0 <= id < MAXORDERS` bound the engine itself enforces.
pub fn parse_order_id(raw: &str) -> Option<OrderId> {
    const MAXORDERS: u64 = 2_000_000_000;
    let id: u64 = raw.parse().ok()?;
    if id < MAXORDERS {
        Some(OrderId(id))
    } else {
        None
    }
}
