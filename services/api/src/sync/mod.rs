//! Import/export synchronization engine
//!
//! Pulls the user's library from the remote platform into the record store
//! ([`import`]), replays selected records back out through platform
//! mutations ([`export`]), and renders selections as a downloadable
//! document ([`download`]). Selections arrive as suffix-tagged form keys
//! and are parsed once, at the boundary ([`selection`]).

pub mod download;
pub mod export;
pub mod import;
pub mod selection;

pub use download::{ExportDocument, build_export_document};
pub use export::{ExportReport, export_selection};
pub use import::{ImportSummary, import_liked_videos, import_playlists, import_subscriptions};
pub use selection::{FailurePolicy, SelectionKey, SelectionKind, parse_selection};
