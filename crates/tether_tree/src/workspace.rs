//! The workspace: virtual files, their documents and their committed trees.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tether_common::{Ident, Interner};
use tether_text::{
    shift_range, Document, TextEdit, TextRange, VirtualFileId, VirtualFileSystem,
};

use crate::element::{Element, ElementId, ElementOrigin, ElementSeed, ElementType, StubPath};
use crate::error::TreeError;
use crate::injection::{InjectionManager, InjectionRule};
use crate::parser::{NodeSpec, Parser, TreeBuilder};
use crate::stub::StubNode;

/// The committed trees of one file: one root per language.
#[derive(Debug)]
pub struct FileView {
    file: VirtualFileId,
    stamp: u64,
    text: Arc<str>,
    roots: Vec<Arc<Element>>,
}

impl FileView {
    /// The file this view belongs to.
    pub fn file(&self) -> VirtualFileId {
        self.file
    }

    /// Document stamp the view was parsed at.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Text the view was parsed from. Empty for compiled files.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All roots, primary language first.
    pub fn roots(&self) -> &[Arc<Element>] {
        &self.roots
    }

    /// Root of the primary language.
    pub fn primary_root(&self) -> &Arc<Element> {
        &self.roots[0]
    }

    /// Root of `language`, if the file has one.
    pub fn root(&self, language: Ident) -> Option<&Arc<Element>> {
        self.roots.iter().find(|r| r.language() == language)
    }

    /// Returns `true` if the file has more than one language root.
    pub fn is_multi_root(&self) -> bool {
        self.roots.len() > 1
    }

    fn invalidate(&self) {
        for root in &self.roots {
            root.invalidate();
        }
    }
}

enum FileContent {
    Source {
        document: Arc<Document>,
        view: Arc<FileView>,
        /// Edits applied to the document since `view` was parsed.
        pending: Vec<TextEdit>,
    },
    Compiled {
        view: Arc<FileView>,
    },
}

struct FileEntry {
    languages: Vec<Ident>,
    physical: bool,
    content: FileContent,
}

impl FileEntry {
    fn view(&self) -> &Arc<FileView> {
        match &self.content {
            FileContent::Source { view, .. } | FileContent::Compiled { view } => view,
        }
    }
}

struct InjectedEntry {
    host: Weak<Element>,
    host_file: VirtualFileId,
    file: VirtualFileId,
    view: Arc<FileView>,
}

/// Owns every virtual file, its document and its committed element trees.
///
/// Edits go to the document and are recorded as pending; trees are rebuilt on
/// [`commit`](Self::commit), which invalidates every element of the previous
/// tree. All methods take `&self`.
pub struct Workspace {
    interner: Interner,
    any_language: Ident,
    vfs: RwLock<VirtualFileSystem>,
    parsers: RwLock<HashMap<Ident, Arc<dyn Parser>>>,
    files: RwLock<HashMap<VirtualFileId, FileEntry>>,
    directories: RwLock<HashMap<VirtualFileId, Arc<Element>>>,
    rules: RwLock<Vec<InjectionRule>>,
    injected: RwLock<HashMap<ElementId, InjectedEntry>>,
    injected_files: RwLock<HashMap<VirtualFileId, ElementId>>,
    next_id: AtomicU64,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Creates an empty workspace with no parsers registered.
    pub fn new() -> Self {
        let interner = Interner::new();
        let any_language = interner.get_or_intern("any");
        Self {
            interner,
            any_language,
            vfs: RwLock::new(VirtualFileSystem::new()),
            parsers: RwLock::new(HashMap::new()),
            files: RwLock::new(HashMap::new()),
            directories: RwLock::new(HashMap::new()),
            rules: RwLock::new(Vec::new()),
            injected: RwLock::new(HashMap::new()),
            injected_files: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// The interner for element kinds and languages.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Interns `s`.
    pub fn intern(&self, s: &str) -> Ident {
        self.interner.get_or_intern(s)
    }

    /// The element type of nodes of `kind`.
    pub fn node_type(&self, kind: &str) -> ElementType {
        ElementType::Node(self.intern(kind))
    }

    /// Language of directories and light elements.
    pub fn any_language(&self) -> Ident {
        self.any_language
    }

    /// Registers the parser for `language`, replacing any previous one.
    pub fn register_parser(&self, language: &str, parser: impl Parser + 'static) {
        let language = self.intern(language);
        self.parsers
            .write()
            .unwrap()
            .insert(language, Arc::new(parser));
    }

    fn parser(&self, language: Ident) -> Result<Arc<dyn Parser>, TreeError> {
        self.parsers
            .read()
            .unwrap()
            .get(&language)
            .cloned()
            .ok_or_else(|| TreeError::UnknownLanguage(self.interner.resolve(language).to_string()))
    }

    fn next_id(&self) -> ElementId {
        ElementId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // ---- files ----

    /// Adds a physical source file parsed as `language`.
    pub fn add_file(
        &self,
        path: impl Into<PathBuf>,
        language: &str,
        text: &str,
    ) -> Result<VirtualFileId, TreeError> {
        self.add_source(path.into(), &[language], text, true)
    }

    /// Adds a source file parsed once per language, primary language first.
    pub fn add_multi_root_file(
        &self,
        path: impl Into<PathBuf>,
        languages: &[&str],
        text: &str,
    ) -> Result<VirtualFileId, TreeError> {
        self.add_source(path.into(), languages, text, true)
    }

    /// Adds an in-memory file that is not backed by the disk. Its elements
    /// are not physical.
    pub fn add_light_file(
        &self,
        path: impl Into<PathBuf>,
        language: &str,
        text: &str,
    ) -> Result<VirtualFileId, TreeError> {
        self.add_source(path.into(), &[language], text, false)
    }

    fn add_source(
        &self,
        path: PathBuf,
        languages: &[&str],
        text: &str,
        physical: bool,
    ) -> Result<VirtualFileId, TreeError> {
        if languages.is_empty() {
            return Err(TreeError::UnknownLanguage(String::new()));
        }
        let languages: Vec<Ident> = languages.iter().map(|l| self.intern(l)).collect();
        for &language in &languages {
            self.parser(language)?;
        }
        let file = self.vfs.write().unwrap().add_file(path)?;
        let document = Arc::new(Document::new(text));
        let view = self.parse_view(file, &languages, physical, Arc::from(text), 0)?;
        tracing::debug!(%file, roots = view.roots.len(), "source file added");
        self.files.write().unwrap().insert(
            file,
            FileEntry {
                languages,
                physical,
                content: FileContent::Source {
                    document,
                    view,
                    pending: Vec::new(),
                },
            },
        );
        Ok(file)
    }

    /// Adds a compiled file whose structure is given by `stubs`.
    pub fn add_compiled_file(
        &self,
        path: impl Into<PathBuf>,
        language: &str,
        stubs: Vec<StubNode>,
    ) -> Result<VirtualFileId, TreeError> {
        let language = self.intern(language);
        let file = self.vfs.write().unwrap().add_file(path.into())?;
        let view = self.stub_view(file, language, &stubs, 0);
        self.files.write().unwrap().insert(
            file,
            FileEntry {
                languages: vec![language],
                physical: true,
                content: FileContent::Compiled { view },
            },
        );
        Ok(file)
    }

    /// Replaces the structure of a compiled file, invalidating its old tree.
    pub fn reload_compiled_file(
        &self,
        file: VirtualFileId,
        stubs: Vec<StubNode>,
    ) -> Result<(), TreeError> {
        let mut files = self.files.write().unwrap();
        let entry = files.get_mut(&file).ok_or(TreeError::UnknownFile(file))?;
        let language = entry.languages[0];
        let FileContent::Compiled { view } = &mut entry.content else {
            return Err(TreeError::NotCompiled(file));
        };
        let fresh = self.stub_view(file, language, &stubs, view.stamp + 1);
        let stale = std::mem::replace(view, fresh);
        stale.invalidate();
        tracing::debug!(%file, "compiled file reloaded");
        Ok(())
    }

    /// Adds a directory.
    pub fn add_directory(&self, path: impl Into<PathBuf>) -> Result<VirtualFileId, TreeError> {
        let dir = self.vfs.write().unwrap().add_directory(path.into())?;
        let element = ElementSeed {
            element_type: ElementType::Directory,
            language: self.any_language,
            virtual_file: Some(dir),
            range: None,
            name: None,
            physical: true,
            origin: ElementOrigin::Source,
        }
        .build(self.next_id(), Vec::new());
        self.directories.write().unwrap().insert(dir, element);
        Ok(dir)
    }

    /// Creates an in-memory element that belongs to no file.
    pub fn create_light_element(&self, kind: &str, name: Option<&str>) -> Arc<Element> {
        ElementSeed {
            element_type: self.node_type(kind),
            language: self.any_language,
            virtual_file: None,
            range: None,
            name: name.map(str::to_string),
            physical: false,
            origin: ElementOrigin::Light,
        }
        .build(self.next_id(), Vec::new())
    }

    /// Deletes a file or directory. Every element in it becomes invalid.
    pub fn delete_file(&self, file: VirtualFileId) -> Result<(), TreeError> {
        self.vfs.write().unwrap().delete(file)?;
        if let Some(entry) = self.files.write().unwrap().remove(&file) {
            entry.view().invalidate();
        }
        if let Some(dir) = self.directories.write().unwrap().remove(&file) {
            dir.invalidate();
        }
        self.rules.write().unwrap().retain(|r| r.file != file);
        self.drop_injections_of(file);
        tracing::debug!(%file, "file deleted");
        Ok(())
    }

    // ---- lookups ----

    /// Path of a file, directory or injected buffer.
    pub fn path(&self, file: VirtualFileId) -> Option<PathBuf> {
        self.vfs.read().unwrap().get(file).map(|f| f.path.clone())
    }

    /// Finds the live file or directory at `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<VirtualFileId> {
        self.vfs.read().unwrap().find_by_path(path)
    }

    /// Returns `true` while `file` has not been deleted.
    pub fn is_valid_file(&self, file: VirtualFileId) -> bool {
        self.vfs.read().unwrap().is_valid(file)
    }

    /// Returns `true` if `file` is an injected view inside a host file.
    pub fn is_injected(&self, file: VirtualFileId) -> bool {
        self.vfs
            .read()
            .unwrap()
            .get(file)
            .is_some_and(|f| f.is_injected())
    }

    /// Returns `true` if `file` is backed by the disk. Injected views inherit
    /// this from their host file.
    pub fn is_physical_file(&self, file: VirtualFileId) -> bool {
        if let Some(entry) = self.files.read().unwrap().get(&file) {
            return entry.physical;
        }
        if self.directories.read().unwrap().contains_key(&file) {
            return true;
        }
        let host_file = self
            .injected_host_id(file)
            .and_then(|host| self.injected.read().unwrap().get(&host).map(|e| e.host_file));
        host_file.is_some_and(|host| self.is_physical_file(host))
    }

    /// Languages of a source or compiled file, primary first.
    pub fn languages(&self, file: VirtualFileId) -> Vec<Ident> {
        self.files
            .read()
            .unwrap()
            .get(&file)
            .map(|e| e.languages.clone())
            .unwrap_or_default()
    }

    /// The document of a source file.
    pub fn document(&self, file: VirtualFileId) -> Option<Arc<Document>> {
        match &self.files.read().unwrap().get(&file)?.content {
            FileContent::Source { document, .. } => Some(Arc::clone(document)),
            FileContent::Compiled { .. } => None,
        }
    }

    /// The committed view of `file` without committing pending edits.
    pub fn current_view(&self, file: VirtualFileId) -> Option<Arc<FileView>> {
        if let Some(entry) = self.files.read().unwrap().get(&file) {
            return Some(Arc::clone(entry.view()));
        }
        let host = self.injected_host_id(file)?;
        let injected = self.injected.read().unwrap();
        let entry = injected.get(&host)?;
        let alive = entry.host.upgrade().is_some_and(|h| h.is_valid());
        alive.then(|| Arc::clone(&entry.view))
    }

    /// Commits `file` and returns its view.
    ///
    /// Injected views are returned as long as their host is alive.
    pub fn view(&self, file: VirtualFileId) -> Option<Arc<FileView>> {
        if self.is_injected(file) {
            return self.current_view(file);
        }
        self.commit(file).ok()
    }

    /// Commits `file` and returns the root of its primary language.
    pub fn find_file(&self, file: VirtualFileId) -> Option<Arc<Element>> {
        self.view(file).map(|v| Arc::clone(v.primary_root()))
    }

    /// Commits `file` and returns the root of `language`.
    pub fn file_root(&self, file: VirtualFileId, language: Ident) -> Option<Arc<Element>> {
        self.view(file).and_then(|v| v.root(language).cloned())
    }

    /// Returns the live directory element for `dir`.
    pub fn find_directory(&self, dir: VirtualFileId) -> Option<Arc<Element>> {
        self.directories
            .read()
            .unwrap()
            .get(&dir)
            .filter(|d| d.is_valid())
            .cloned()
    }

    /// Walks the current stub tree of a compiled file along `path`.
    pub fn stub_element(&self, file: VirtualFileId, path: &[u32]) -> Option<Arc<Element>> {
        let mut current = self.find_file(file)?;
        if !current.is_compiled() {
            return None;
        }
        for &index in path {
            current = current.children().get(index as usize)?.clone();
        }
        (current.stub_path() == Some(path)).then_some(current)
    }

    /// Text of a live element, as of its tree's parse.
    ///
    /// Returns `Ok(None)` for elements without text (directories, compiled and
    /// light elements) and an error for elements of a replaced tree.
    pub fn element_text(&self, element: &Element) -> Result<Option<String>, TreeError> {
        element.ensure_valid()?;
        let (Some(file), Some(range)) = (element.containing_file(), element.range()) else {
            return Ok(None);
        };
        let Some(view) = self.current_view(file) else {
            return Ok(None);
        };
        Ok(view
            .text()
            .get(range.start() as usize..range.end() as usize)
            .map(str::to_string))
    }

    // ---- editing ----

    /// Applies `edit` to the document of `file` without reparsing.
    pub fn edit(&self, file: VirtualFileId, edit: TextEdit) -> Result<(), TreeError> {
        let mut files = self.files.write().unwrap();
        let entry = files.get_mut(&file).ok_or(TreeError::UnknownFile(file))?;
        match &mut entry.content {
            FileContent::Source {
                document, pending, ..
            } => {
                document.replace(&edit)?;
                pending.push(edit);
                Ok(())
            }
            FileContent::Compiled { .. } => Err(TreeError::NotASourceFile(file)),
        }
    }

    /// Returns `true` if the tree of `file` reflects its document.
    pub fn is_committed(&self, file: VirtualFileId) -> bool {
        match self.files.read().unwrap().get(&file).map(|e| &e.content) {
            Some(FileContent::Source { pending, .. }) => pending.is_empty(),
            _ => true,
        }
    }

    /// Maps `range`, taken from the committed tree of `file`, to the current
    /// document text by replaying the uncommitted edits.
    ///
    /// Returns `None` if an edit deleted the range or the file is unknown.
    pub fn current_range(&self, file: VirtualFileId, range: TextRange) -> Option<TextRange> {
        match &self.files.read().unwrap().get(&file)?.content {
            FileContent::Source { pending, .. } => {
                pending.iter().try_fold(range, |r, edit| shift_range(r, edit))
            }
            FileContent::Compiled { .. } => Some(range),
        }
    }

    /// Reparses `file` if its document changed since the last commit.
    ///
    /// The previous tree and every injection hosted in it are invalidated.
    pub fn commit(&self, file: VirtualFileId) -> Result<Arc<FileView>, TreeError> {
        let (fresh, stale) = {
            let mut files = self.files.write().unwrap();
            let entry = files.get_mut(&file).ok_or(TreeError::UnknownFile(file))?;
            let (document, view, pending) = match &mut entry.content {
                FileContent::Source {
                    document,
                    view,
                    pending,
                } => (document, view, pending),
                FileContent::Compiled { view } => return Ok(Arc::clone(view)),
            };
            let stamp = document.stamp();
            if view.stamp == stamp {
                return Ok(Arc::clone(view));
            }
            let text: Arc<str> = Arc::from(document.text());
            let fresh = self.parse_view(file, &entry.languages, entry.physical, text, stamp)?;
            pending.clear();
            let stale = std::mem::replace(view, Arc::clone(&fresh));
            (fresh, stale)
        };
        stale.invalidate();
        self.drop_injections_of(file);
        tracing::debug!(%file, stamp = fresh.stamp, "file reparsed");
        Ok(fresh)
    }

    /// Commits every source file with pending edits.
    pub fn commit_all(&self) -> Result<(), TreeError> {
        let dirty: Vec<VirtualFileId> = self
            .files
            .read()
            .unwrap()
            .iter()
            .filter(|(_, e)| {
                matches!(&e.content, FileContent::Source { pending, .. } if !pending.is_empty())
            })
            .map(|(&f, _)| f)
            .collect();
        for file in dirty {
            self.commit(file)?;
        }
        Ok(())
    }

    // ---- injections ----

    /// Re-parses the text of every `host_kind` node of `file` as `language`.
    pub fn inject(
        &self,
        file: VirtualFileId,
        host_kind: &str,
        language: &str,
    ) -> Result<(), TreeError> {
        if !self.files.read().unwrap().contains_key(&file) {
            return Err(TreeError::UnknownFile(file));
        }
        let language = self.intern(language);
        self.parser(language)?;
        self.rules.write().unwrap().push(InjectionRule {
            file,
            host_kind: self.intern(host_kind),
            language,
        });
        Ok(())
    }

    /// Returns the root of the fragment injected into `host`, materializing it
    /// on first access.
    pub fn injected_root(&self, host: &Arc<Element>) -> Option<Arc<Element>> {
        if !host.is_valid() {
            return None;
        }
        if let Some(entry) = self.injected.read().unwrap().get(&host.id()) {
            return Some(Arc::clone(entry.view.primary_root()));
        }
        let host_file = host.containing_file()?;
        let rule = self
            .rules
            .read()
            .unwrap()
            .iter()
            .find(|r| r.file == host_file && ElementType::Node(r.host_kind) == host.element_type())
            .copied()?;
        let text = self.element_text(host).ok()??;
        let file = self.vfs.write().unwrap().add_injected(host_file).ok()?;
        let view = self
            .parse_view(file, &[rule.language], host.is_physical(), Arc::from(text), 0)
            .ok()?;

        let mut injected = self.injected.write().unwrap();
        let entry = injected.entry(host.id()).or_insert_with(|| InjectedEntry {
            host: Arc::downgrade(host),
            host_file,
            file,
            view,
        });
        self.injected_files
            .write()
            .unwrap()
            .insert(entry.file, host.id());
        tracing::trace!(host = ?host.id(), injected = %entry.file, "injection materialized");
        Some(Arc::clone(entry.view.primary_root()))
    }

    /// Materializes every injection hosted in `file` and returns their roots.
    pub fn injected_roots(&self, file: VirtualFileId) -> Vec<Arc<Element>> {
        let hosts: Vec<Ident> = self
            .rules
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.file == file)
            .map(|r| r.host_kind)
            .collect();
        let Some(view) = self.view(file) else {
            return Vec::new();
        };
        view.roots()
            .iter()
            .flat_map(|root| root.descendants())
            .filter(|e| {
                matches!(e.element_type(), ElementType::Node(kind) if hosts.contains(&kind))
            })
            .filter_map(|host| self.injected_root(&host))
            .collect()
    }

    fn injected_host_id(&self, file: VirtualFileId) -> Option<ElementId> {
        self.injected_files.read().unwrap().get(&file).copied()
    }

    fn drop_injections_of(&self, host_file: VirtualFileId) {
        let mut injected = self.injected.write().unwrap();
        let mut injected_files = self.injected_files.write().unwrap();
        let mut vfs = self.vfs.write().unwrap();
        injected.retain(|_, entry| {
            if entry.host_file != host_file {
                return true;
            }
            entry.view.invalidate();
            injected_files.remove(&entry.file);
            // The injected buffer is always registered, so deletion cannot fail.
            let _ = vfs.delete(entry.file);
            false
        });
    }

    // ---- tree construction ----

    fn parse_view(
        &self,
        file: VirtualFileId,
        languages: &[Ident],
        physical: bool,
        text: Arc<str>,
        stamp: u64,
    ) -> Result<Arc<FileView>, TreeError> {
        let len = text.len() as u32;
        let mut roots = Vec::with_capacity(languages.len());
        for &language in languages {
            let parser = self.parser(language)?;
            let mut builder = TreeBuilder::new(len);
            parser.parse(&text, &mut builder);
            let root_id = self.next_id();
            let children = builder
                .finish()
                .into_iter()
                .map(|spec| self.materialize(file, language, physical, spec))
                .collect();
            roots.push(
                ElementSeed {
                    element_type: ElementType::File,
                    language,
                    virtual_file: Some(file),
                    range: Some(TextRange::new(0, len)),
                    name: None,
                    physical,
                    origin: ElementOrigin::Source,
                }
                .build(root_id, children),
            );
        }
        Ok(Arc::new(FileView {
            file,
            stamp,
            text,
            roots,
        }))
    }

    fn materialize(
        &self,
        file: VirtualFileId,
        language: Ident,
        physical: bool,
        spec: NodeSpec,
    ) -> Arc<Element> {
        let id = self.next_id();
        let children = spec
            .children
            .into_iter()
            .map(|child| self.materialize(file, language, physical, child))
            .collect();
        ElementSeed {
            element_type: self.node_type(&spec.kind),
            language,
            virtual_file: Some(file),
            range: Some(spec.range),
            name: spec.name,
            physical,
            origin: ElementOrigin::Source,
        }
        .build(id, children)
    }

    fn stub_view(
        &self,
        file: VirtualFileId,
        language: Ident,
        stubs: &[StubNode],
        stamp: u64,
    ) -> Arc<FileView> {
        let root_id = self.next_id();
        let children = stubs
            .iter()
            .enumerate()
            .map(|(i, stub)| self.materialize_stub(file, language, stub, Some(vec![i as u32])))
            .collect();
        let root = ElementSeed {
            element_type: ElementType::File,
            language,
            virtual_file: Some(file),
            range: None,
            name: None,
            physical: true,
            origin: ElementOrigin::Compiled {
                stub_path: Some(Vec::new()),
            },
        }
        .build(root_id, children);
        Arc::new(FileView {
            file,
            stamp,
            text: Arc::from(""),
            roots: vec![root],
        })
    }

    fn materialize_stub(
        &self,
        file: VirtualFileId,
        language: Ident,
        stub: &StubNode,
        path: Option<StubPath>,
    ) -> Arc<Element> {
        let id = self.next_id();
        let path = if stub.indexed { path } else { None };
        let children = stub
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let child_path = path.as_ref().map(|p| {
                    let mut p = p.clone();
                    p.push(i as u32);
                    p
                });
                self.materialize_stub(file, language, child, child_path)
            })
            .collect();
        ElementSeed {
            element_type: self.node_type(&stub.kind),
            language,
            virtual_file: Some(file),
            range: None,
            name: stub.name.clone(),
            physical: true,
            origin: ElementOrigin::Compiled { stub_path: path },
        }
        .build(id, children)
    }
}

impl InjectionManager for Workspace {
    fn injection_host(&self, file: VirtualFileId) -> Option<Arc<Element>> {
        let host = self.injected_host_id(file)?;
        let injected = self.injected.read().unwrap();
        injected
            .get(&host)?
            .host
            .upgrade()
            .filter(|h| h.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SexprParser;
    use crate::search::find_element;

    fn workspace() -> Workspace {
        let ws = Workspace::new();
        ws.register_parser("sx", SexprParser);
        ws.register_parser("alt", SexprParser);
        ws
    }

    #[test]
    fn add_file_parses_tree() {
        let ws = workspace();
        let file = ws.add_file("Main.sx", "sx", "(class Main (method run))").unwrap();
        let root = ws.find_file(file).unwrap();
        assert!(root.is_file());
        assert_eq!(root.children().len(), 1);
        let class = &root.children()[0];
        assert_eq!(class.element_type(), ws.node_type("class"));
        assert_eq!(class.name(), Some("Main"));
        assert_eq!(
            ws.element_text(&class.children()[0]).unwrap().as_deref(),
            Some("(method run)")
        );
    }

    #[test]
    fn unknown_language_rejected() {
        let ws = workspace();
        let err = ws.add_file("a.kt", "kotlin", "").unwrap_err();
        assert!(matches!(err, TreeError::UnknownLanguage(l) if l == "kotlin"));
        assert!(ws.find_by_path(Path::new("a.kt")).is_none());
    }

    #[test]
    fn edit_then_commit_reparses() {
        let ws = workspace();
        let file = ws.add_file("a.sx", "sx", "(class A)").unwrap();
        let old = ws.find_file(file).unwrap();
        ws.edit(file, TextEdit::insert(0, "(field f) ")).unwrap();
        assert!(!ws.is_committed(file));
        // Uncommitted: still the old tree through current_view.
        assert!(Arc::ptr_eq(ws.current_view(file).unwrap().primary_root(), &old));

        let fresh = ws.find_file(file).unwrap();
        assert!(ws.is_committed(file));
        assert!(!old.is_valid());
        assert!(fresh.is_valid());
        assert_eq!(fresh.children().len(), 2);
        assert!(ws.element_text(&old).is_err());
    }

    #[test]
    fn commit_without_changes_keeps_tree() {
        let ws = workspace();
        let file = ws.add_file("a.sx", "sx", "(class A)").unwrap();
        let first = ws.find_file(file).unwrap();
        let second = ws.find_file(file).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn current_range_replays_pending_edits() {
        let ws = workspace();
        let file = ws.add_file("a.sx", "sx", "(class A (method m))").unwrap();
        ws.edit(file, TextEdit::insert(0, "   ")).unwrap();
        ws.edit(file, TextEdit::insert(0, "x")).unwrap();
        assert_eq!(
            ws.current_range(file, TextRange::new(9, 19)),
            Some(TextRange::new(13, 23))
        );
        ws.edit(file, TextEdit::delete(TextRange::new(10, 24))).unwrap();
        assert_eq!(ws.current_range(file, TextRange::new(9, 19)), None);
    }

    #[test]
    fn multi_root_files() {
        let ws = workspace();
        let file = ws
            .add_multi_root_file("page.sx", &["sx", "alt"], "(tag a)")
            .unwrap();
        let view = ws.view(file).unwrap();
        assert!(view.is_multi_root());
        assert_eq!(view.primary_root().language(), ws.intern("sx"));
        assert!(view.root(ws.intern("alt")).is_some());
    }

    #[test]
    fn compiled_stub_paths() {
        let ws = workspace();
        let stubs = vec![StubNode::new("class")
            .named("Main")
            .child(StubNode::new("method").named("run"))
            .child(StubNode::new("code").opaque().child(StubNode::new("insn")))];
        let file = ws.add_compiled_file("Main.class", "jvm", stubs.clone()).unwrap();
        let method = ws.stub_element(file, &[0, 0]).unwrap();
        assert_eq!(method.name(), Some("run"));
        assert!(ws.stub_element(file, &[0, 1]).is_none());
        let file_node = ws.find_file(file).unwrap();
        let code = &file_node.children()[0].children()[1];
        assert_eq!(code.stub_path(), None);
        assert_eq!(code.children()[0].stub_path(), None);

        ws.reload_compiled_file(file, stubs).unwrap();
        assert!(!method.is_valid());
        let reloaded = ws.stub_element(file, &[0, 0]).unwrap();
        assert_ne!(reloaded.id(), method.id());
    }

    #[test]
    fn directories_and_light_elements() {
        let ws = workspace();
        let dir = ws.add_directory("src").unwrap();
        let element = ws.find_directory(dir).unwrap();
        assert!(element.is_directory());
        assert_eq!(element.containing_file(), None);

        let light = ws.create_light_element("method", Some("synthetic"));
        assert!(!light.is_physical());
        assert_eq!(light.virtual_file(), None);

        ws.delete_file(dir).unwrap();
        assert!(!element.is_valid());
        assert!(ws.find_directory(dir).is_none());
    }

    #[test]
    fn light_files_are_not_physical() {
        let ws = workspace();
        let file = ws.add_light_file("scratch.sx", "sx", "(a)").unwrap();
        assert!(!ws.is_physical_file(file));
        assert!(!ws.find_file(file).unwrap().is_physical());
    }

    #[test]
    fn delete_invalidates_tree() {
        let ws = workspace();
        let file = ws.add_file("a.sx", "sx", "(class A)").unwrap();
        let root = ws.find_file(file).unwrap();
        ws.delete_file(file).unwrap();
        assert!(!root.is_valid());
        assert!(ws.find_file(file).is_none());
        assert!(!ws.is_valid_file(file));
    }

    #[test]
    fn injections_materialize_per_host() {
        let ws = workspace();
        let file = ws
            .add_file("page.sx", "sx", "(page (script (call f) (call g)))")
            .unwrap();
        ws.inject(file, "script", "alt").unwrap();
        let root = ws.find_file(file).unwrap();
        let host = root.children()[0].children()[0].clone();
        let injected = ws.injected_root(&host).unwrap();
        let injected_file = injected.virtual_file().unwrap();
        assert!(ws.is_injected(injected_file));
        assert_eq!(injected.language(), ws.intern("alt"));
        assert_eq!(ws.injection_host(injected_file).unwrap().id(), host.id());
        assert!(ws.is_physical_file(injected_file));

        // Ranges inside the injected view are host-relative.
        let call = find_element(&injected, TextRange::new(8, 16), ws.node_type("call"));
        assert_eq!(call.unwrap().name(), Some("f"));

        // Same root on second access.
        assert!(Arc::ptr_eq(&injected, &ws.injected_root(&host).unwrap()));
        assert_eq!(ws.injected_roots(file).len(), 1);
    }

    #[test]
    fn commit_drops_injections() {
        let ws = workspace();
        let file = ws.add_file("page.sx", "sx", "(page (script (call f)))").unwrap();
        ws.inject(file, "script", "alt").unwrap();
        let host = ws.find_file(file).unwrap().children()[0].children()[0].clone();
        let injected = ws.injected_root(&host).unwrap();
        let injected_file = injected.virtual_file().unwrap();

        ws.edit(file, TextEdit::insert(0, " ")).unwrap();
        ws.commit(file).unwrap();
        assert!(!injected.is_valid());
        assert!(ws.injection_host(injected_file).is_none());
        assert!(ws.view(injected_file).is_none());
    }
}
