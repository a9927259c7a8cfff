//! # novx-file
//!
//! Reader and writer for the `.novx` XML project format.
//!
//! Load path: file → version gate → XML read → entity model and ordering
//! tree → back-reference rebuild → ledger parse. Save path: consistency
//! passes → XML write → backup-rename-write-restore file replacement.
//!
//! [`NovxFile`] is the entry point; everything else supports it:
//! - [`version`] — supported schema version and the version gate
//! - [`progress`] — the date-keyed word-count ledger
//! - the read/write halves of the codec (private)

pub mod novx;
pub mod progress;
pub mod version;

mod read;
mod write;
mod xml;

pub use novx::{Healing, NovxFile};
pub use progress::{ProgressLog, WordCountEntry};
pub use version::{check_version, MAJOR_VERSION, MINOR_VERSION, XML_HEADER};
