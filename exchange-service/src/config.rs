//! Process configuration, ported option-for-option from the reference
//! front end's `optparse` flags.

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "exchange-service", about = "Stockfighter-compatible exchange simulator")]
pub struct Config {
    /// Maximum number of books (venue/symbol combos). 0 disables the cap.
    #[arg(short = 'b', long = "max-books", default_value_t = 100)]
    pub max_books: usize,

    /// Default venue; always exists.
    #[arg(short = 'v', long = "venue", default_value = "TESTEX")]
    pub venue: String,

    /// Default symbol; always exists on the default venue.
    #[arg(short = 's', long = "symbol", visible_alias = "stock", default_value = "FOOBAR")]
    pub symbol: String,

    /// File containing a JSON dict of account names mapped to API keys.
    #[arg(short = 'a', long = "accounts")]
    pub accounts_file: Option<String>,

    /// Listen port.
    #[arg(short = 'p', long = "port", default_value_t = 8000)]
    pub port: u16,

    /// Enable commands that can return excessive responses (e.g. debug memory).
    #[arg(short = 'e', long = "extra")]
    pub extra: bool,
}
