//! Choosing the strategy a new pointer uses.

use std::sync::Arc;

use tether_text::VirtualFileId;
use tether_tree::{Element, InjectionManager, Workspace};

use crate::info::{
    DirectoryElementInfo, ElementInfo, FileElementInfo, HardElementInfo, InjectedElementInfo,
    RangeElementInfo, StubElementInfo, TrackedRange,
};

/// Supplies custom strategies for elements the built-in ones handle poorly.
///
/// Factories are consulted in registration order after compiled, non-physical
/// and directory elements were ruled out; the first `Some` wins.
pub trait ElementInfoFactory: Send + Sync {
    /// Returns a strategy for `element`, or `None` to pass.
    fn create_element_info(
        &self,
        ws: &Workspace,
        element: &Arc<Element>,
    ) -> Option<Box<dyn ElementInfo>>;
}

/// Picks the strategy for `element`. First match wins:
///
/// 1. compiled elements: stub path if indexed, otherwise hard;
/// 2. non-physical elements, elements without a containing file (directories
///    excepted) and elements of non-physical files: hard;
/// 3. directories;
/// 4. registered factories;
/// 5. elements of injected views: tracked through their host;
/// 6. file roots;
/// 7. anything else: tracked range, in the element's own root when that is
///    not the primary root of a multi-root file.
pub fn create_element_info(
    ws: &Workspace,
    element: &Arc<Element>,
    factories: &[Arc<dyn ElementInfoFactory>],
) -> Box<dyn ElementInfo> {
    let info = select(ws, element, factories);
    tracing::debug!(element = ?element.id(), strategy = ?info.kind(), "pointer strategy chosen");
    info
}

fn select(
    ws: &Workspace,
    element: &Arc<Element>,
    factories: &[Arc<dyn ElementInfoFactory>],
) -> Box<dyn ElementInfo> {
    let hard = || Box::new(HardElementInfo::new(Arc::clone(element))) as Box<dyn ElementInfo>;

    if element.is_compiled() {
        return match (element.stub_path(), element.virtual_file()) {
            (Some(path), Some(file)) => Box::new(StubElementInfo::new(
                file,
                path.to_vec(),
                element.element_type(),
            )),
            _ => hard(),
        };
    }

    let file = element.containing_file();
    if !element.is_physical()
        || (file.is_none() && !element.is_directory())
        || file.is_some_and(|f| !ws.is_physical_file(f))
    {
        return hard();
    }

    if element.is_directory() {
        return match element.virtual_file() {
            Some(dir) => Box::new(DirectoryElementInfo::new(dir)),
            None => hard(),
        };
    }

    for factory in factories {
        if let Some(info) = factory.create_element_info(ws, element) {
            return info;
        }
    }

    // Checked above: non-directory elements reaching this point have a file.
    let Some(file) = file else {
        return hard();
    };

    if ws.is_injected(file) {
        if let Some(info) = injected_info(ws, element, factories) {
            return info;
        }
    }

    if element.is_file() {
        return Box::new(FileElementInfo::new(file, element.language()));
    }

    range_info(ws, element, file).unwrap_or_else(hard)
}

fn injected_info(
    ws: &Workspace,
    element: &Arc<Element>,
    factories: &[Arc<dyn ElementInfoFactory>],
) -> Option<Box<dyn ElementInfo>> {
    let file = element.containing_file()?;
    let host = ws.injection_host(file)?;
    let host_file = host.containing_file()?;
    let host_start = host.range()?.start();
    let absolute = element.range()?.translate(i64::from(host_start));
    let tracked = match ws.current_range(host_file, absolute) {
        Some(current) => TrackedRange::new(ws, host_file, current)?,
        None => TrackedRange::lost(host_file),
    };
    let host_info = create_element_info(ws, &host, factories);
    Some(Box::new(InjectedElementInfo::new(
        host_info,
        tracked,
        element.element_type(),
    )))
}

fn range_info(
    ws: &Workspace,
    element: &Arc<Element>,
    file: VirtualFileId,
) -> Option<Box<dyn ElementInfo>> {
    let range = element.range()?;
    let view = ws.current_view(file)?;
    let root_language = (view.is_multi_root()
        && element.language() != view.primary_root().language())
    .then_some(element.language());
    // The element comes from the committed tree; edits made since then are
    // replayed so the marker covers the same text in the current document.
    let tracked = match ws.current_range(file, range) {
        Some(current) => TrackedRange::new(ws, file, current)?,
        None => TrackedRange::lost(file),
    };
    Some(Box::new(RangeElementInfo::new(
        tracked,
        element.element_type(),
        root_language,
    )))
}
