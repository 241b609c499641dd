//! Command-line client for the exchange service's Stockfighter-compatible
//! HTTP API. Ambient developer tooling, not part of the simulator itself.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "exchange-cli")]
#[command(about = "Command line client for the exchange simulator")]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    server: String,
    #[arg(short, long, default_value = "TESTEX")]
    venue: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new order.
    Submit {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        account: String,
        #[arg(short, long, value_parser = parse_direction)]
        direction: String,
        #[arg(short, long, default_value = "limit")]
        order_type: String,
        #[arg(short, long)]
        price: i64,
        #[arg(short, long)]
        qty: i64,
    },
    /// Look up an order by id.
    Status {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        order_id: u64,
    },
    /// Cancel an order by id.
    Cancel {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        order_id: u64,
    },
    /// Print the service heartbeat.
    Heartbeat,
    /// List venues known to the service.
    Venues,
    /// List symbols traded on a venue.
    Stocks,
    /// Fetch full order book depth for a symbol.
    Orderbook {
        #[arg(short, long)]
        symbol: String,
    },
    /// Fetch the top-of-book quote for a symbol.
    Quote {
        #[arg(short, long)]
        symbol: String,
    },
}

#[derive(Serialize)]
struct OrderRequest {
    account: String,
    venue: String,
    stock: String,
    price: i64,
    qty: i64,
    #[serde(rename = "orderType")]
    order_type: String,
    direction: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    ok: bool,
    error: Option<String>,
    id: Option<u64>,
    qty: Option<i64>,
    #[serde(rename = "totalFilled")]
    total_filled: Option<i64>,
    open: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct VenuesResponse {
    venues: Vec<VenueEntry>,
}

#[derive(Debug, Deserialize)]
struct VenueEntry {
    venue: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct StocksResponse {
    symbols: Vec<StockEntry>,
}

#[derive(Debug, Deserialize)]
struct StockEntry {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    bid: Option<i64>,
    ask: Option<i64>,
    last: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    bids: Vec<DepthLevel>,
    asks: Vec<DepthLevel>,
}

#[derive(Debug, Deserialize)]
struct DepthLevel {
    price: i64,
    qty: i64,
}

fn parse_direction(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "buy" | "sell" => Ok(s.to_lowercase()),
        _ => Err(format!("Invalid direction: {s}. Use 'buy' or 'sell'")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Submit {
            symbol,
            account,
            direction,
            order_type,
            price,
            qty,
        } => {
            let request = OrderRequest {
                account,
                venue: cli.venue.clone(),
                stock: symbol.clone(),
                price,
                qty,
                order_type,
                direction,
            };

            let response = client
                .post(format!(
                    "{}/ob/api/venues/{}/stocks/{}/orders",
                    cli.server, cli.venue, symbol
                ))
                .json(&request)
                .send()
                .await?;

            print_order(response).await?;
        }

        Commands::Status { symbol, order_id } => {
            let response = client
                .get(format!(
                    "{}/ob/api/venues/{}/stocks/{}/orders/{}",
                    cli.server, cli.venue, symbol, order_id
                ))
                .send()
                .await?;
            print_order(response).await?;
        }

        Commands::Cancel { symbol, order_id } => {
            let response = client
                .delete(format!(
                    "{}/ob/api/venues/{}/stocks/{}/orders/{}",
                    cli.server, cli.venue, symbol, order_id
                ))
                .send()
                .await?;
            print_order(response).await?;
        }

        Commands::Heartbeat => {
            let response = client.get(format!("{}/ob/api/heartbeat", cli.server)).send().await?;
            println!("{}", response.text().await?);
        }

        Commands::Venues => {
            let response = client.get(format!("{}/ob/api/venues", cli.server)).send().await?;
            let venues: VenuesResponse = response.json().await?;
            for v in venues.venues {
                println!("{} ({})", v.venue, v.name);
            }
        }

        Commands::Stocks => {
            let response = client
                .get(format!("{}/ob/api/venues/{}/stocks", cli.server, cli.venue))
                .send()
                .await?;
            let stocks: StocksResponse = response.json().await?;
            for s in stocks.symbols {
                println!("{}", s.symbol);
            }
        }

        Commands::Orderbook { symbol } => {
            let response = client
                .get(format!(
                    "{}/ob/api/venues/{}/stocks/{}",
                    cli.server, cli.venue, symbol
                ))
                .send()
                .await?;
            let book: OrderBookResponse = response.json().await?;
            println!("Asks:");
            for level in book.asks.iter().rev() {
                println!("  {} @ {}", level.qty, level.price);
            }
            println!("Bids:");
            for level in &book.bids {
                println!("  {} @ {}", level.qty, level.price);
            }
        }

        Commands::Quote { symbol } => {
            let response = client
                .get(format!(
                    "{}/ob/api/venues/{}/stocks/{}/quote",
                    cli.server, cli.venue, symbol
                ))
                .send()
                .await?;
            let quote: QuoteResponse = response.json().await?;
            println!("bid={:?} ask={:?} last={:?}", quote.bid, quote.ask, quote.last);
        }
    }

    Ok(())
}

async fn print_order(response: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = response.status();
    let order: OrderResponse = response.json().await?;
    if !status.is_success() || !order.ok {
        println!("Error: {}", order.error.unwrap_or_default());
        return Ok(());
    }
    println!(
        "id={:?} qty_open={:?} total_filled={:?} open={:?}",
        order.id, order.qty, order.total_filled, order.open
    );
    Ok(())
}
