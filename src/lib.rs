//! stockwatch: indicator engine for a stock watchlist.
//!
//! Hexagonal architecture: the indicator engine and scan logic live in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
