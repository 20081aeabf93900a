//! Migration System
//!
//! Change-set discovery, the apply/revert state machine and batch
//! bookkeeping.

pub mod definitions;
pub mod repository;
pub mod rollback;
pub mod runner;

pub use definitions::*;
pub use repository::{ChangeSetRepository, FsChangeSetRepository};
pub use runner::{MigrationRunner, MAX_NAME_LEN};
