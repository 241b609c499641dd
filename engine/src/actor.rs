//! The engine loop (C3): one task owning exactly one `OrderBook`, reached
//! through a cloneable `BookHandle`.
//!
//! Spec §4.3/§5 require that commands against one book are processed to a
//! total order, one fully completing before the next starts. Here that
//! falls out of ownership rather than a lock: the spawned task is the sole
//! owner of its `OrderBook` and drains its `mpsc::Receiver<Command>` one
//! message at a time — nothing else can ever touch the book.

use orderbook::OrderBook;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::command::{Command, DebugMemory};

/// Backpressure limit on outstanding commands per book. Generous relative
/// to expected per-book request rates; a full channel means the caller's
/// `send` awaits rather than erroring, so this is a memory bound, not a
/// correctness one.
const COMMAND_CHANNEL_CAPACITY: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("book engine task is not running")]
    Closed,
}

/// A cheaply-cloneable reference to one book's engine task. Holding a
/// `BookHandle` does not grant access to the `OrderBook` itself — only the
/// owning task ever touches it.
#[derive(Clone)]
pub struct BookHandle {
    tx: mpsc::Sender<Command>,
}

impl BookHandle {
    pub async fn place_order(
        &self,
        account: String,
        side: orderbook::Side,
        order_type: orderbook::OrderType,
        price: i64,
        qty: i64,
    ) -> Result<orderbook::OrderSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::PlaceOrder {
            account,
            side,
            order_type,
            price,
            qty,
            reply,
        })
        .await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn orderbook_snapshot(&self) -> Result<orderbook::DepthSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::OrderBookSnapshot { reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn quote(&self) -> Result<orderbook::QuoteSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Quote { reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn status(
        &self,
        id: orderbook::OrderId,
    ) -> Result<Result<orderbook::OrderSnapshot, orderbook::BookError>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Status { id, reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn cancel(
        &self,
        id: orderbook::OrderId,
    ) -> Result<Result<orderbook::OrderSnapshot, orderbook::BookError>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Cancel { id, reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn account_of(
        &self,
        id: orderbook::OrderId,
    ) -> Result<Result<String, orderbook::BookError>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::AccountOf { id, reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn account_position(
        &self,
        account: String,
    ) -> Result<orderbook::AccountPosition, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::AccountPosition { account, reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn debug_memory(&self) -> Result<DebugMemory, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::DebugMemory { reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    async fn send(&self, command: Command) -> Result<(), EngineError> {
        self.tx.send(command).await.map_err(|_| EngineError::Closed)
    }
}

/// Spawns a fresh book's engine task and returns a handle to it. One call
/// per (venue, symbol) — see `exchange-service::registry`.
pub fn spawn() -> BookHandle {
    let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    tokio::spawn(run(rx));
    BookHandle { tx }
}

async fn run(mut rx: mpsc::Receiver<Command>) {
    let mut book = OrderBook::new();

    while let Some(command) = rx.recv().await {
        match command {
            Command::PlaceOrder {
                account,
                side,
                order_type,
                price,
                qty,
                reply,
            } => {
                let snapshot = book.place(account, side, order_type, price, qty);
                let _ = reply.send(snapshot);
            }
            Command::OrderBookSnapshot { reply } => {
                let _ = reply.send(book.orderbook_snapshot());
            }
            Command::Quote { reply } => {
                let _ = reply.send(book.quote_snapshot());
            }
            Command::Status { id, reply } => {
                let _ = reply.send(book.status(id));
            }
            Command::Cancel { id, reply } => {
                let _ = reply.send(book.cancel(id));
            }
            Command::AccountOf { id, reply } => {
                let _ = reply.send(book.account_of(id));
            }
            Command::AccountPosition { account, reply } => {
                let _ = reply.send(book.account_position(&account));
            }
            Command::DebugMemory { reply } => {
                let _ = reply.send(DebugMemory {
                    total_orders: book.order_count(),
                    resting_orders: book.resting_order_count(),
                    trade_count: book.trade_count(),
                });
            }
        }
    }

    debug!("book engine task shutting down: all handles dropped");
}
