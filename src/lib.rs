//! Find files and folders by name.
//!
//! The search itself lives in [`app::scanner`]; [`app::config`] turns raw
//! parameters plus the persisted defaults into a [`app::models::SearchConfig`].

pub mod app;

pub use app::error::{SearchError, SearchResult};
pub use app::models::{EntryKind, ExtensionFilter, MatchRecord, Query, Scope, SearchConfig};
pub use app::{go_search, search, SearchOutcome};
