//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{song_play, TestDataset, TS_1};
//!
//! #[test]
//! fn test_load() {
//!     let dataset = TestDataset::with_song_1();
//!     dataset.write_log("2018/11/2018-11-01-events.json", &[song_play(TS_1)]);
//!     songplay_etl::run(&dataset.config()).unwrap();
//! }
//! ```

mod constants;
mod fixtures;

#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{home_visit, song_play, TestDataset};
