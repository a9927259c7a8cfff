//! # novx-core
//!
//! Entity model and ordering tree for novx writing projects.
//!
//! This crate defines the types the file codec and any editing front end
//! share:
//! - [`Project`] — settings, entity maps, and the consistency passes
//! - Entities ([`Chapter`], [`Section`], [`Character`], [`WorldElement`],
//!   [`PlotLine`], [`PlotPoint`], [`ProjectNote`])
//! - [`ProjectTree`] — the presentation-order index ([`Parent`],
//!   [`RootBucket`])
//! - [`ChangeHook`] — change notification injected into every entity
//! - Identifier generation ([`ids`])
//! - Error hierarchy ([`NovxError`])

pub mod chapter;
pub mod character;
pub mod element;
pub mod error;
pub mod ids;
pub mod observer;
pub mod plot;
pub mod project;
pub mod section;
pub mod tree;
pub mod world;

pub use chapter::{Chapter, ChapterLevel, ChapterType};
pub use character::Character;
pub use element::{Element, ElementBase, Link, Noted, ProjectNote, Tagged};
pub use error::{NovxError, Result};
pub use observer::ChangeHook;
pub use plot::{PlotLine, PlotPoint};
pub use project::Project;
pub use section::{Pacing, Section, SectionType, Status};
pub use tree::{Parent, ProjectTree, RootBucket};
pub use world::WorldElement;
