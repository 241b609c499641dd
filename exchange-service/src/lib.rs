//! HTTP front end (C5): a Stockfighter-compatible REST API over the
//! in-process matching engine.
//!
//! Split into a library so integration tests can build the router directly
//! instead of shelling out to a bound socket.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;
pub mod websocket;

use auth::{AccountIndex, AuthStore};
pub use config::Config;
use error::ApiError;
use registry::BookRegistry;
use types::*;

const MAX_TOKEN_SIZE: usize = 20;
const INT_MAX: i64 = 2_147_483_647;

#[derive(Clone)]
pub struct AppState {
    registry: BookRegistry,
    accounts: AccountIndex,
    auth: AuthStore,
    extra: bool,
}

/// Builds the router for the given configuration, creating the default
/// venue/symbol book eagerly so it exists before the first connection is
/// ever accepted. Also returns whether auth is enabled, since `main` wants
/// to log that after `state` has already been consumed into the router.
pub async fn build_app(config: &Config) -> (Router, bool) {
    let auth_store = match &config.accounts_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path).expect("failed to read accounts file");
            AuthStore::from_json(&raw).expect("accounts file was not valid JSON")
        }
        None => AuthStore::empty(),
    };
    let auth_enabled = auth_store.is_enabled();

    let state = Arc::new(AppState {
        registry: BookRegistry::new(config.max_books),
        accounts: AccountIndex::new(),
        auth: auth_store,
        extra: config.extra,
    });

    state
        .registry
        .get_or_create(&config.venue, &config.symbol)
        .await
        .expect("default book must always be creatable");

    (build_router(state), auth_enabled)
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ob/api/heartbeat", get(heartbeat))
        .route("/ob/api/venues", get(venue_list))
        .route("/ob/api/venues/:venue/heartbeat", get(venue_heartbeat))
        .route("/ob/api/venues/:venue", get(stocklist))
        .route("/ob/api/venues/:venue/stocks", get(stocklist))
        .route("/ob/api/venues/:venue/stocks/:symbol/orders", post(make_order))
        .route("/ob/api/venues/:venue/stocks/:symbol", get(orderbook))
        .route("/ob/api/venues/:venue/stocks/:symbol/quote", get(quote))
        .route("/ob/api/venues/:venue/stocks/:symbol/orders/:id", get(status))
        .route("/ob/api/venues/:venue/stocks/:symbol/orders/:id", delete(cancel))
        .route("/ob/api/venues/:venue/stocks/:symbol/orders/:id/cancel", post(cancel))
        .route("/ob/api/venues/:venue/stocks/:symbol/accounts/:account", get(account_position))
        .route("/ob/api/debug/memory/:venue/:symbol", get(debug_memory))
        .route("/ob/api/ws/:venue/:symbol/trades", get(websocket::trade_stream))
        .route("/ob/api/ws/:venue/:symbol/depth", get(websocket::depth_stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn validate_names(account: Option<&str>, venue: Option<&str>, symbol: Option<&str>) -> Result<(), ApiError> {
    for value in [account, venue, symbol].into_iter().flatten() {
        if value.is_empty() || value.len() >= MAX_TOKEN_SIZE {
            return Err(ApiError::BadName);
        }
    }
    Ok(())
}

async fn heartbeat() -> Json<Heartbeat> {
    Json(Heartbeat {
        ok: true,
        error: String::new(),
    })
}

async fn venue_list(State(state): State<Arc<AppState>>) -> Json<VenuesResponse> {
    let venues = state
        .registry
        .venues()
        .into_iter()
        .map(|venue| VenueEntry {
            name: format!("{venue} Exchange"),
            venue,
            state: "open".to_string(),
        })
        .collect();
    Json(VenuesResponse { ok: true, venues })
}

async fn venue_heartbeat(
    State(state): State<Arc<AppState>>,
    Path(venue): Path<String>,
) -> Result<Json<VenueHeartbeat>, ApiError> {
    if state.registry.venue_exists(&venue) {
        Ok(Json(VenueHeartbeat { ok: true, venue }))
    } else {
        Err(ApiError::NoSuchVenue(venue))
    }
}

async fn stocklist(
    State(state): State<Arc<AppState>>,
    Path(venue): Path<String>,
) -> Result<Json<StocksResponse>, ApiError> {
    if !state.registry.venue_exists(&venue) {
        return Err(ApiError::NoSuchVenue(venue));
    }
    let symbols = state
        .registry
        .stocks(&venue)
        .into_iter()
        .map(|symbol| StockEntry {
            name: format!("{symbol} Inc"),
            symbol,
        })
        .collect();
    Ok(Json(StocksResponse { ok: true, symbols }))
}

/// Extracts a bounded `i64` from a loosely-typed JSON value, matching the
/// original's `int(data["price"])`/`int(data["qty"])` coercions: numbers
/// and numeric strings both succeed, everything else is `BAD_TYPE`.
fn coerce_i64(value: &serde_json::Value) -> Result<i64, ApiError> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().ok_or(ApiError::BadType),
        serde_json::Value::String(s) => s.parse().map_err(|_| ApiError::BadType),
        _ => Err(ApiError::BadType),
    }
}

async fn make_order(
    State(state): State<Arc<AppState>>,
    Path((venue, symbol)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Json<OrderRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::BadJson)?;

    let symbol_in_data = request.stock.or(request.symbol).unwrap_or_else(|| symbol.clone());
    let venue_in_data = request.venue.unwrap_or_else(|| venue.clone());
    if venue_in_data != venue || symbol_in_data != symbol {
        return Err(ApiError::UrlMismatch);
    }

    // Fields are extracted and coerced in the original's declared order
    // (account, price, qty, orderType, direction) rather than all at once,
    // so a wrong-typed earlier field wins over a missing later one, exactly
    // as the original's single sequential extraction does.
    let account = request.account.ok_or(ApiError::MissingField)?;
    let price_value = request.price.ok_or(ApiError::MissingField)?;
    let price = coerce_i64(&price_value)?;
    let qty_value = request.qty.ok_or(ApiError::MissingField)?;
    let qty = coerce_i64(&qty_value)?;
    let order_type_value = request
        .order_type
        .or(request.ordertype)
        .ok_or(ApiError::MissingField)?;
    let direction_value = request.direction.ok_or(ApiError::MissingField)?;

    validate_names(Some(&account), Some(&venue), Some(&symbol))?;

    if !(0..=INT_MAX).contains(&price) {
        return Err(ApiError::BadValue);
    }
    if !(1..=INT_MAX).contains(&qty) {
        return Err(ApiError::BadValue);
    }
    // direction/orderType are never type-coerced, only membership-tested
    // against the recognized strings — a non-string value is simply not a
    // member, same as an unrecognized string, and falls through to BAD_VALUE
    // rather than a type error.
    let side = match direction_value.as_str() {
        Some("buy") => orderbook::Side::Buy,
        Some("sell") => orderbook::Side::Sell,
        _ => return Err(ApiError::BadValue),
    };
    let order_type = match order_type_value.as_str() {
        Some("limit") => orderbook::OrderType::Limit,
        Some("market") => orderbook::OrderType::Market,
        Some("fill-or-kill") | Some("fok") => orderbook::OrderType::Fok,
        Some("immediate-or-cancel") | Some("ioc") => orderbook::OrderType::Ioc,
        _ => return Err(ApiError::BadValue),
    };

    let handle = state.registry.get_or_create(&venue, &symbol).await?;

    state.auth.check(&account, &headers, false)?;
    state.accounts.index_of(&account)?;

    let snapshot = handle
        .place_order(account, side, order_type, price, qty)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(OrderResponse::from_snapshot(&venue, &symbol, snapshot)))
}

async fn orderbook(
    State(state): State<Arc<AppState>>,
    Path((venue, symbol)): Path<(String, String)>,
) -> Result<Json<OrderBookResponse>, ApiError> {
    validate_names(None, Some(&venue), Some(&symbol))?;
    let handle = state.registry.get_or_create(&venue, &symbol).await?;
    let snapshot = handle.orderbook_snapshot().await.map_err(ApiError::from)?;
    Ok(Json(OrderBookResponse::from_snapshot(&venue, &symbol, snapshot)))
}

async fn quote(
    State(state): State<Arc<AppState>>,
    Path((venue, symbol)): Path<(String, String)>,
) -> Result<Json<QuoteResponse>, ApiError> {
    validate_names(None, Some(&venue), Some(&symbol))?;
    let handle = state.registry.get_or_create(&venue, &symbol).await?;
    let snapshot = handle.quote().await.map_err(ApiError::from)?;
    Ok(Json(QuoteResponse::from_snapshot(&venue, &symbol, snapshot)))
}

/// Shared STATUS/CANCEL authentication dance: look the order's account up
/// through the engine first (`__ACC_FROM_ID__`), then authenticate against
/// that account rather than one supplied by the caller.
async fn authenticate_against_order(
    state: &AppState,
    handle: &engine::BookHandle,
    id: orderbook::OrderId,
    headers: &HeaderMap,
) -> Result<(), ApiError> {
    let account = handle
        .account_of(id)
        .await
        .map_err(ApiError::from)?
        .map_err(|_| ApiError::NoSuchOrder)?;
    state.auth.check(&account, headers, true)
}

async fn status(
    State(state): State<Arc<AppState>>,
    Path((venue, symbol, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    validate_names(None, Some(&venue), Some(&symbol))?;
    let id = parse_order_id(&id).ok_or(ApiError::BadValue)?;
    let handle = state.registry.get_or_create(&venue, &symbol).await?;

    authenticate_against_order(&state, &handle, id, &headers).await?;

    let snapshot = handle
        .status(id)
        .await
        .map_err(ApiError::from)?
        .map_err(|_| ApiError::NoSuchOrder)?;
    Ok(Json(OrderResponse::from_snapshot(&venue, &symbol, snapshot)))
}

async fn cancel(
    State(state): State<Arc<AppState>>,
    Path((venue, symbol, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    validate_names(None, Some(&venue), Some(&symbol))?;
    let id = parse_order_id(&id).ok_or(ApiError::BadValue)?;
    let handle = state.registry.get_or_create(&venue, &symbol).await?;

    authenticate_against_order(&state, &handle, id, &headers).await?;

    let snapshot = handle
        .cancel(id)
        .await
        .map_err(ApiError::from)?
        .map_err(|_| ApiError::NoSuchOrder)?;
    Ok(Json(OrderResponse::from_snapshot(&venue, &symbol, snapshot)))
}

async fn account_position(
    State(state): State<Arc<AppState>>,
    Path((venue, symbol, account)): Path<(String, String, String)>,
) -> Result<Json<AccountPositionResponse>, ApiError> {
    validate_names(Some(&account), Some(&venue), Some(&symbol))?;
    let handle = state.registry.get_or_create(&venue, &symbol).await?;
    let position = handle
        .account_position(account.clone())
        .await
        .map_err(ApiError::from)?;
    Ok(Json(AccountPositionResponse::from_position(&account, position)))
}

async fn debug_memory(
    State(state): State<Arc<AppState>>,
    Path((venue, symbol)): Path<(String, String)>,
) -> Result<Json<DebugMemoryResponse>, ApiError> {
    if !state.extra {
        return Err(ApiError::Disabled);
    }
    let handle = state.registry.get_or_create(&venue, &symbol).await?;
    let debug = handle.debug_memory().await.map_err(ApiError::from)?;
    Ok(Json(DebugMemoryResponse {
        ok: true,
        total_orders: debug.total_orders,
        resting_orders: debug.resting_orders,
        trade_count: debug.trade_count,
    }))
}
