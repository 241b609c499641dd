//! Demo binary: runs the latency/throughput checks, then walks through the
//! matching engine's six canonical scenarios against an in-process
//! `OrderBook`, with no HTTP involved.

use orderbook::{OrderBook, OrderType, Side};

mod latency_test;

fn main() {
    println!("=== Order Book Performance Checks ===");
    latency_test::run_latency_tests();
    latency_test::run_throughput_test(std::time::Duration::from_secs(2));

    println!("\n=== Scenario Walkthrough ===");
    scenario_1_rest_then_match();
    scenario_2_fok_unfilled();
    scenario_3_ioc_partial();
    scenario_4_market_sweeps_levels();
    scenario_5_cancel_preserves_fills();
    scenario_6_cross_at_aggressor_limit();
}

fn scenario_1_rest_then_match() {
    println!("\n-- Scenario 1: rest then match --");
    let mut book = OrderBook::new();
    let resting = book.place("A", Side::Sell, OrderType::Limit, 50, 100);
    println!("A rests: sell 100 @ 50 (open={})", resting.is_open);

    let taker = book.place("B", Side::Buy, OrderType::Limit, 50, 40);
    println!(
        "B buys 40 @ 50: filled={}, qty_open={}",
        taker.fills.len(),
        taker.qty_open
    );
    let a_status = book.status(resting.id).unwrap();
    println!("A's remaining resting qty: {}", a_status.qty_open);
}

fn scenario_2_fok_unfilled() {
    println!("\n-- Scenario 2: FOK can't fill, dies untouched --");
    let mut book = OrderBook::new();
    book.place("A", Side::Sell, OrderType::Limit, 50, 100);

    let fok = book.place("B", Side::Buy, OrderType::Fok, 50, 200);
    println!("FOK for 200 against 100 resting: fills={}, open={}", fok.fills.len(), fok.is_open);
}

fn scenario_3_ioc_partial() {
    println!("\n-- Scenario 3: IOC takes what it can, discards the rest --");
    let mut book = OrderBook::new();
    book.place("A", Side::Sell, OrderType::Limit, 50, 30);

    let ioc = book.place("B", Side::Buy, OrderType::Ioc, 50, 100);
    println!(
        "IOC for 100 against 30 resting: filled={}, qty_open={} (discarded, not resting)",
        ioc.fills.iter().map(|f| f.qty).sum::<i64>(),
        ioc.qty_open
    );
}

fn scenario_4_market_sweeps_levels() {
    println!("\n-- Scenario 4: market order sweeps multiple price levels --");
    let mut book = OrderBook::new();
    book.place("A", Side::Sell, OrderType::Limit, 50, 10);
    book.place("A", Side::Sell, OrderType::Limit, 51, 10);
    book.place("A", Side::Sell, OrderType::Limit, 52, 10);

    let market = book.place("B", Side::Buy, OrderType::Market, 0, 25);
    for fill in &market.fills {
        println!("  fill {} @ {}", fill.qty, fill.price);
    }
}

fn scenario_5_cancel_preserves_fills() {
    println!("\n-- Scenario 5: cancel preserves qty_open and fill history --");
    let mut book = OrderBook::new();
    let resting = book.place("A", Side::Sell, OrderType::Limit, 50, 100);
    book.place("B", Side::Buy, OrderType::Limit, 50, 40);

    let cancelled = book.cancel(resting.id).unwrap();
    println!(
        "cancelled: qty_open={}, fills={} (40 already filled, 60 remains as the cancelled amount)",
        cancelled.qty_open,
        cancelled.fills.len()
    );
}

fn scenario_6_cross_at_aggressor_limit() {
    println!("\n-- Scenario 6: aggressive limit crosses at the resting price --");
    let mut book = OrderBook::new();
    book.place("A", Side::Sell, OrderType::Limit, 50, 10);

    let taker = book.place("B", Side::Buy, OrderType::Limit, 60, 10);
    println!(
        "B bids 60, fills at {} (the resting order's price, not 60)",
        taker.fills[0].price
    );
}
