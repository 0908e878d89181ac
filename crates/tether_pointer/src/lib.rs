//! Smart element pointers.
//!
//! A [`SmartPointer`] names an element in a way that survives the element
//! being thrown away: when its file is reparsed the pointer re-finds the
//! equivalent element of the new tree, and when that is impossible it
//! resolves to `None`. How an element is remembered depends on what it is;
//! [`create_element_info`] picks one [`ElementInfo`] strategy per pointer.
//!
//! [`SmartPointerManager`] hands out one pointer per live element and
//! brackets document edits with the belt operations that keep tracked
//! ranges in step with the text.

#![warn(missing_docs)]

pub mod factory;
pub mod info;
pub mod manager;
pub mod pointer;

pub use factory::{create_element_info, ElementInfoFactory};
pub use info::{
    DirectoryElementInfo, ElementInfo, ElementInfoKind, FileElementInfo, HardElementInfo,
    InjectedElementInfo, RangeElementInfo, StubElementInfo,
};
pub use manager::SmartPointerManager;
pub use pointer::SmartPointer;
