//! Watchlist persistence port trait.

use crate::domain::error::StockwatchError;
use crate::domain::watchlist::WatchlistEntry;

pub trait WatchlistPort {
    /// All entries, in sheet order, tickers upper-cased and unique.
    fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, StockwatchError>;
}
