//! Per-book engine loop (C3): turns the synchronous `orderbook::OrderBook`
//! into an actor reachable concurrently from many callers while keeping
//! all mutation confined to a single task.

pub mod actor;
pub mod command;

pub use actor::{spawn, BookHandle, EngineError};
pub use command::{Command, DebugMemory};
