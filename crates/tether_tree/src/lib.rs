//! Element trees over virtual files.
//!
//! A [`Workspace`] owns the virtual file system, one [`Document`] per source
//! file and the committed element trees parsed from them. Editing a document
//! leaves the tree stale until the file is committed; the commit reparses and
//! invalidates every element of the previous tree, which is exactly the event
//! smart pointers have to survive.
//!
//! [`Document`]: tether_text::Document

#![warn(missing_docs)]

pub mod element;
pub mod error;
pub mod injection;
pub mod parser;
pub mod search;
pub mod stub;
pub mod workspace;

pub use element::{Element, ElementId, ElementOrigin, ElementType, StubPath};
pub use error::TreeError;
pub use injection::{InjectionManager, InjectionRule};
pub use parser::{NodeSpec, Parser, SexprParser, TreeBuilder};
pub use search::find_element;
pub use stub::StubNode;
pub use workspace::{FileView, Workspace};
