//! Ambient, non-required WebSocket market-data streams (trades and depth)
//! for a single (venue, symbol) book.
//!
//! Optional tooling layered on top of the engine's existing read-only
//! queries, not a guaranteed part of the matching simulator itself. Polls
//! the book rather than subscribing to a trade feed, since the engine has
//! no internal trade broadcaster — there is exactly one writer (the actor
//! task) and no fan-out channel to subscribe to.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Serialize;
use tokio::time::interval;
use tracing::{error, info};

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum StreamMessage {
    #[serde(rename = "quote")]
    Quote {
        venue: String,
        symbol: String,
        bid: Option<i64>,
        ask: Option<i64>,
        #[serde(rename = "lastTrade")]
        last_trade: Option<i64>,
        ts: u128,
    },
    #[serde(rename = "depth")]
    Depth {
        venue: String,
        symbol: String,
        bids: Vec<orderbook::DepthLevel>,
        asks: Vec<orderbook::DepthLevel>,
        ts: u128,
    },
}

pub async fn trade_stream(
    Path((venue, symbol)): Path<(String, String)>,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| stream_quotes(socket, venue, symbol, state))
}

pub async fn depth_stream(
    Path((venue, symbol)): Path<(String, String)>,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| stream_depth(socket, venue, symbol, state))
}

async fn stream_quotes(socket: WebSocket, venue: String, symbol: String, state: Arc<AppState>) {
    info!("new quote stream connection for {venue}/{symbol}");
    let (mut sender, mut receiver) = socket.split();
    let mut ticks = interval(Duration::from_millis(200));
    let mut last: Option<(Option<i64>, Option<i64>)> = None;

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => { error!("quote stream error for {venue}/{symbol}: {e}"); break; }
                _ => {}
            },
            _ = ticks.tick() => {
                let Some(handle) = state.registry.get(&venue, &symbol) else { continue };
                let Ok(quote) = handle.quote().await else { break };
                let current = (quote.bid.map(|b| b.price), quote.ask.map(|a| a.price));
                if last == Some(current) {
                    continue;
                }
                last = Some(current);

                let msg = StreamMessage::Quote {
                    venue: venue.clone(),
                    symbol: symbol.clone(),
                    bid: current.0,
                    ask: current.1,
                    last_trade: quote.last_trade_price,
                    ts: quote.ts_ns,
                };
                if let Ok(json) = serde_json::to_string(&msg) {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    info!("quote stream handler ended for {venue}/{symbol}");
}

async fn stream_depth(socket: WebSocket, venue: String, symbol: String, state: Arc<AppState>) {
    info!("new depth stream connection for {venue}/{symbol}");
    let (mut sender, mut receiver) = socket.split();
    let mut ticks = interval(Duration::from_millis(200));

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => { error!("depth stream error for {venue}/{symbol}: {e}"); break; }
                _ => {}
            },
            _ = ticks.tick() => {
                let Some(handle) = state.registry.get(&venue, &symbol) else { continue };
                let Ok(depth) = handle.orderbook_snapshot().await else { break };

                let msg = StreamMessage::Depth {
                    venue: venue.clone(),
                    symbol: symbol.clone(),
                    bids: depth.bids,
                    asks: depth.asks,
                    ts: depth.ts_ns,
                };
                if let Ok(json) = serde_json::to_string(&msg) {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    info!("depth stream handler ended for {venue}/{symbol}");
}
