//! Secondary-language fragments embedded in host elements.

use std::sync::Arc;

use tether_common::Ident;
use tether_text::VirtualFileId;

use crate::element::Element;

/// Locates the host element of an injected file view.
pub trait InjectionManager {
    /// Returns the live host element whose text the injected file `file`
    /// re-parses, or `None` when `file` is not injected or its host is gone.
    fn injection_host(&self, file: VirtualFileId) -> Option<Arc<Element>>;
}

/// Re-parses the text of every `host_kind` node in a file as `language`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InjectionRule {
    /// File whose nodes host injections.
    pub file: VirtualFileId,
    /// Kind of the host nodes.
    pub host_kind: Ident,
    /// Language of the injected fragment.
    pub language: Ident,
}
