//! Card identifier migration for language-learning flashcards.
//!
//! Provides:
//! - Corpus loader for ranked frequency lists
//! - Identifier reconciliation from rank-based to row-based identifiers
//! - Line-preserving rewriter for record and group files
//! - Consistency check between group memberships and records

pub mod corpus;
pub mod error;
pub mod identifier;
pub mod migration;
pub mod reconcile;
pub mod rewrite;
pub mod types;
pub mod verify;

pub use corpus::{load_entries, order_entries, parse_entries, AcceptAll, RowFilter, SourceRow};
pub use error::{CorpusError, MigrateError, Result, RewriteWarning};
pub use identifier::IdScheme;
pub use migration::{plan, run, MigrationReport};
pub use reconcile::{reconcile, Assignment, IdMapping, Positional, PositionalCursor};
pub use rewrite::{Collection, CollectionReport, FileReport, FileStatus, Rewriter};
pub use types::{
    Collision, ColumnFilter, Entry, GroupSettings, IdPair, MigrationConfig, RecordSettings,
    SourceSettings,
};
pub use verify::{verify, ConsistencyReport, Inconsistency};
