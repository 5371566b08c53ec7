//! searchbar-core: the debounced incremental search controller.
//!
//! A query typed by the user is debounced, sent to a [`SearchProvider`], merged
//! with a filtered list of popular searches, and exposed as a keyboard-navigable
//! suggestion list. Responses to superseded requests are never applied.
//!
//! # Modules
//!
//! - [`types`]: Articles, popular searches, and the suggestion enum
//! - [`suggest`]: Popular-search filtering and suggestion list assembly
//! - [`state`]: Synchronous search state machine (no I/O, no timers)
//! - [`controller`]: Async controller task: debounce timer, fetches, snapshots
//! - [`provider`]: The provider trait the controller fetches through
//! - [`cache`]: In-memory response cache wrapping any provider
//! - [`config`]: `.searchbar.toml` loading and validation
//! - [`error`]: Error types

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod provider;
pub mod state;
pub mod suggest;
pub mod types;

pub use cache::{CachedProvider, DEFAULT_CACHE_CAPACITY};
pub use config::{load_config, load_config_file, SearchConfig, Transport};
pub use controller::{ControllerOptions, SearchController, SearchHandle};
pub use error::{ConfigError, SearchError};
pub use provider::SearchProvider;
pub use state::{DebounceTicket, FetchPlan, FetchTicket, SearchState};
pub use types::{
    Article, Direction, PopularSearch, SearchSnapshot, Suggestion, SuggestionKind, SuggestionView,
};
