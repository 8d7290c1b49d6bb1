//! Git queries: diff collection, binary detection and commit creation.

pub mod binary;
pub mod collect;
pub mod command;
pub mod commit;
pub mod diff_split;
pub mod error;
pub mod truncate;

pub use binary::BinaryFile;
pub use collect::{collect_diff, DiffResult, Scope};
pub use command::repo_root;
pub use diff_split::{split_by_file, DiffChunk};
pub use error::GitError;
