//! Market data adapters.
//!
//! | Adapter | Source |
//! |---------|--------|
//! | [`YahooAdapter`] | Yahoo Finance chart endpoint over HTTP |
//! | [`FixtureAdapter`] | In-memory data and a deterministic demo generator |

mod fixture;
mod yahoo;

pub use fixture::FixtureAdapter;
pub use yahoo::{YahooAdapter, YAHOO_COOKIE_ENV};
