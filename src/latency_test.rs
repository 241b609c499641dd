//! Latency and throughput measurements for the order book, run as part of
//! the demo binary rather than as `criterion` benchmarks (see
//! `orderbook/benches/orderbook_bench.rs` for the tracked benchmark suite;
//! this is a quick human-readable sanity check, not a regression gate).

use orderbook::{OrderBook, OrderType, Side};
use std::time::Instant;

pub fn run_latency_tests() {
    println!("Order Book Latency Tests\n");

    test_market_data_latency();
    test_order_submission_latency();
    test_order_matching_latency();
    test_cancellation_latency();
}

fn test_market_data_latency() {
    println!("Market Data Latency Test");

    let mut book = OrderBook::new();
    for i in 0..100 {
        book.place("maker", Side::Sell, OrderType::Limit, 10000 + i, 100);
        book.place("maker", Side::Buy, OrderType::Limit, 9999 - i, 100);
    }

    let iterations = 1_000_000;

    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(book.quote_snapshot());
    }
    let quote_duration = start.elapsed();

    println!(
        "  quote_snapshot: {:.2} ns/call\n",
        quote_duration.as_nanos() as f64 / iterations as f64
    );
}

fn test_order_submission_latency() {
    println!("Order Submission Latency Test");

    let iterations = 10_000;
    let mut total_time = 0u128;

    for i in 0..iterations {
        let mut book = OrderBook::new();
        let start = Instant::now();
        book.place("maker", Side::Buy, OrderType::Limit, 10000 - i, 100);
        total_time += start.elapsed().as_nanos();
    }

    let avg_latency = total_time as f64 / iterations as f64;
    println!("  Average non-crossing submission: {avg_latency:.2} ns");
    println!("  Throughput: {:.0} orders/second\n", 1_000_000_000.0 / avg_latency);
}

fn test_order_matching_latency() {
    println!("Order Matching Latency Test");

    let iterations = 1_000;
    let mut total_match_time = 0u128;

    for i in 0..iterations {
        let mut book = OrderBook::new();
        for j in 0..10 {
            book.place("maker", Side::Sell, OrderType::Limit, 10000 + j, 100);
        }

        let start = Instant::now();
        let filled = book.place("taker", Side::Buy, OrderType::Limit, 10005 + i % 5, 500);
        total_match_time += start.elapsed().as_nanos();
        std::hint::black_box(filled);
    }

    println!(
        "  Crossing order (sweeps up to 5 levels): {:.2} ns\n",
        total_match_time as f64 / iterations as f64
    );
}

fn test_cancellation_latency() {
    println!("Cancellation Latency Test");

    let iterations = 1_000;
    let orders_per_test = 100;
    let mut total_time = 0u128;

    for _ in 0..iterations {
        let mut book = OrderBook::new();
        let mut ids = Vec::with_capacity(orders_per_test);
        for _ in 0..orders_per_test {
            let snap = book.place("maker", Side::Buy, OrderType::Limit, 10000, 100);
            ids.push(snap.id);
        }

        let start = Instant::now();
        for id in &ids {
            book.cancel(*id).unwrap();
        }
        total_time += start.elapsed().as_nanos();
    }

    println!(
        "  Cancel: {:.2} ns per order\n",
        total_time as f64 / (iterations * orders_per_test) as f64
    );
}

/// Mixed-workload throughput test: 25% each of non-crossing bid/ask and
/// crossing bid/ask, with periodic quote reads.
pub fn run_throughput_test(duration: std::time::Duration) {
    println!("Sustained Throughput Test ({:.0}s)", duration.as_secs_f64());

    let mut book = OrderBook::new();
    let mut orders_processed = 0u64;
    let mut trades_executed = 0u64;

    let start_time = Instant::now();
    while start_time.elapsed() < duration {
        let snap = match orders_processed % 4 {
            0 => book.place(
                "maker",
                Side::Buy,
                OrderType::Limit,
                9999 - (orders_processed % 100) as i64,
                100,
            ),
            1 => book.place(
                "maker",
                Side::Sell,
                OrderType::Limit,
                10001 + (orders_processed % 100) as i64,
                100,
            ),
            2 => book.place("taker", Side::Buy, OrderType::Limit, 10001, 50),
            3 => book.place("taker", Side::Sell, OrderType::Limit, 9999, 50),
            _ => unreachable!(),
        };
        trades_executed += snap.fills.len() as u64;
        orders_processed += 1;

        if orders_processed % 100 == 0 {
            std::hint::black_box(book.quote_snapshot());
        }
    }

    let elapsed = start_time.elapsed();
    println!("  Duration: {:.1} seconds", elapsed.as_secs_f64());
    println!("  Orders processed: {orders_processed}");
    println!("  Trades executed: {trades_executed}");
    println!(
        "  Order throughput: {:.0} orders/second",
        orders_processed as f64 / elapsed.as_secs_f64()
    );
    println!(
        "  Trade throughput: {:.0} trades/second",
        trades_executed as f64 / elapsed.as_secs_f64()
    );
}
