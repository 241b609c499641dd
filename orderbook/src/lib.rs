//! Matching engine and order book (components C1/C2): the in-memory
//! price-ordered book, the four-order-type matching algorithm, and the
//! order/fill registry.
//!
//! The engine loop and HTTP front end that sit on top of this crate live in
//! the `engine` and `exchange-service` crates respectively; this crate knows
//! nothing about venues, accounts-as-HTTP-identities, or wire formats — it
//! only implements price-time priority matching for a single (venue,
//! symbol) book.

pub mod book;
pub mod price_level;
pub mod side;
pub mod types;

pub use book::{BookError, OrderBook};
pub use price_level::PriceLevel;
pub use types::{
    AccountPosition, DepthLevel, DepthSnapshot, Fill, Order, OrderId, OrderSnapshot, OrderType,
    QuoteSide, QuoteSnapshot, Side,
};
