//! Public query surface and the caches behind it.
//!
//! An [`Engine`] owns the compiled-selector cache, the resolver cache,
//! the sibling-position cache, and the active document context. Queries
//! take `&self`; interior mutability keeps the caches warm across calls
//! while leaving the engine single-threaded by construction.

use core::cell::RefCell;
use core::ptr;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ElementAdapter;
use crate::ast::SelectorList;
use crate::collect::{self, FastPath};
use crate::error::{Error, Result};
use crate::lexer;
use crate::matcher::{self, MatchContext};
use crate::nth::NthCache;
use crate::parser;
use crate::registry::{CombinatorResolver, OperatorEval, Registry, SelectorEval};

/// Per-match callback, invoked once for every element a query accepts.
pub type MatchCallback<'a, H> = &'a dyn Fn(H);

/// Engine behavior switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Treat ids as non-unique: id fast paths aggregate every element
    /// sharing an id instead of stopping at the first.
    pub ids_dupes: bool,
    /// Log errors that verbosity suppressed.
    pub log_errors: bool,
    /// Return errors to the caller. When off, failing calls yield the
    /// neutral value (`false`, `None`, or an empty vec) instead.
    pub verbosity: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ids_dupes: false,
            log_errors: true,
            verbosity: true,
        }
    }
}

/// Partial configuration update; `None` fields keep their current value.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigOptions {
    /// New value for [`Config::ids_dupes`].
    pub ids_dupes: Option<bool>,
    /// New value for [`Config::log_errors`].
    pub log_errors: Option<bool>,
    /// New value for [`Config::verbosity`].
    pub verbosity: Option<bool>,
}

/// Compiled plan for one selector-list string: the parsed expressions and
/// the fast-path strategy chosen for each. Result nodes are never cached,
/// so re-running after a tree mutation self-corrects.
struct ResolverEntry<H> {
    list: Rc<SelectorList>,
    fast_paths: Rc<Vec<FastPath>>,
    context: H,
    callback: usize,
}

/// The document a query currently runs against.
#[derive(Clone, Copy)]
struct ActiveContext<H> {
    root: H,
    is_html: bool,
    quirks: bool,
}

/// A selector engine instance with its own caches, configuration, and
/// extensibility registry. Independent instances never interfere.
pub struct Engine<A: ElementAdapter> {
    config: Config,
    registry: Registry<A>,
    compiled: RefCell<FxHashMap<String, Rc<SelectorList>>>,
    resolver: RefCell<FxHashMap<String, ResolverEntry<A::Handle>>>,
    nth: RefCell<NthCache<A::Handle>>,
    active: RefCell<Option<ActiveContext<A::Handle>>>,
}

impl<A: ElementAdapter> Default for Engine<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ElementAdapter> Engine<A> {
    /// A fresh engine with default configuration and empty caches.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            registry: Registry::default(),
            compiled: RefCell::new(FxHashMap::default()),
            resolver: RefCell::new(FxHashMap::default()),
            nth: RefCell::new(NthCache::default()),
            active: RefCell::new(None),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Apply a partial configuration update, optionally dropping all
    /// caches, and return the resulting configuration.
    pub fn configure(&mut self, options: ConfigOptions, clear_caches: bool) -> Config {
        if let Some(ids_dupes) = options.ids_dupes {
            self.config.ids_dupes = ids_dupes;
        }
        if let Some(log_errors) = options.log_errors {
            self.config.log_errors = log_errors;
        }
        if let Some(verbosity) = options.verbosity {
            self.config.verbosity = verbosity;
        }
        if clear_caches {
            self.clear_caches();
        }
        self.config
    }

    /// Drop every cache. Matching behavior is unaffected, only warm-up
    /// cost returns.
    pub fn clear_caches(&mut self) {
        self.compiled.borrow_mut().clear();
        self.resolver.borrow_mut().clear();
        self.nth.borrow_mut().reset();
        *self.active.borrow_mut() = None;
    }

    /// Register a custom combinator. See [`Registry::register_combinator`].
    pub fn register_combinator(&mut self, symbol: char, resolve: CombinatorResolver<A>) -> bool {
        self.registry.register_combinator(symbol, resolve)
    }

    /// Register a custom attribute operator. See
    /// [`Registry::register_operator`].
    pub fn register_operator(&mut self, symbol: &str, eval: OperatorEval) -> bool {
        self.registry.register_operator(symbol, eval)
    }

    /// Register a custom pseudo-class. See [`Registry::register_selector`].
    pub fn register_selector(
        &mut self,
        name: &str,
        takes_argument: bool,
        eval: SelectorEval<A>,
    ) -> bool {
        self.registry.register_selector(name, takes_argument, eval)
    }

    /// Whether `element` matches any expression of the selector list.
    pub fn matches(
        &self,
        adapter: &A,
        selectors: &str,
        element: A::Handle,
        callback: Option<MatchCallback<'_, A::Handle>>,
    ) -> Result<bool> {
        match self.try_matches(adapter, selectors, element, callback) {
            Ok(matched) => Ok(matched),
            Err(error) => self.settle(error, false),
        }
    }

    /// The first match in document order within `context` (the whole
    /// document when `None`).
    pub fn first(
        &self,
        adapter: &A,
        selectors: &str,
        context: Option<A::Handle>,
        callback: Option<MatchCallback<'_, A::Handle>>,
    ) -> Result<Option<A::Handle>> {
        match self.try_select(adapter, selectors, context, callback) {
            Ok(results) => Ok(results.into_iter().next()),
            Err(error) => self.settle(error, None),
        }
    }

    /// All matches within `context` (the whole document when `None`),
    /// in document order and without duplicates.
    pub fn select(
        &self,
        adapter: &A,
        selectors: &str,
        context: Option<A::Handle>,
        callback: Option<MatchCallback<'_, A::Handle>>,
    ) -> Result<Vec<A::Handle>> {
        match self.try_select(adapter, selectors, context, callback) {
            Ok(results) => Ok(results),
            Err(error) => self.settle(error, Vec::new()),
        }
    }

    /// The nearest ancestor-or-self of `element` matching the selector
    /// list.
    pub fn closest(
        &self,
        adapter: &A,
        selectors: &str,
        element: A::Handle,
        callback: Option<MatchCallback<'_, A::Handle>>,
    ) -> Result<Option<A::Handle>> {
        match self.try_closest(adapter, selectors, element, callback) {
            Ok(found) => Ok(found),
            Err(error) => self.settle(error, None),
        }
    }

    fn try_matches(
        &self,
        adapter: &A,
        selectors: &str,
        element: A::Handle,
        callback: Option<MatchCallback<'_, A::Handle>>,
    ) -> Result<bool> {
        let active = self.ensure_context(adapter, element);
        let text = rewrite_scope(adapter, selectors, element);
        let list = self.compile(&text)?;

        self.nth.borrow_mut().reset();
        let context = self.match_context(adapter, active);
        let matched = matcher::matches_selector_list(&context, &list, element);
        if matched && let Some(callback) = callback {
            callback(element);
        }
        Ok(matched)
    }

    fn try_select(
        &self,
        adapter: &A,
        selectors: &str,
        scope: Option<A::Handle>,
        callback: Option<MatchCallback<'_, A::Handle>>,
    ) -> Result<Vec<A::Handle>> {
        let scope_element = scope.unwrap_or_else(|| adapter.root());
        let active = self.ensure_context(adapter, scope_element);
        let text = rewrite_scope(adapter, selectors, scope_element);
        let (list, fast_paths) = self.resolve(&text, scope_element, callback)?;

        self.nth.borrow_mut().reset();
        let context = self.match_context(adapter, active);
        // A query scoped to an element only searches below it; a
        // document-wide query may match the root itself.
        let include_scope = scope.is_none();

        let mut results = Vec::new();
        for (complex, fast_path) in list.selectors.iter().zip(fast_paths.iter()) {
            let candidates = collect::collect_candidates(
                adapter,
                fast_path,
                scope_element,
                include_scope,
                self.config.ids_dupes,
                active.is_html,
                active.quirks,
            );
            for candidate in candidates {
                if matcher::matches_complex(&context, complex, candidate) {
                    if let Some(callback) = callback {
                        callback(candidate);
                    }
                    results.push(candidate);
                }
            }
        }

        if list.selectors.len() > 1 && results.len() > 1 {
            collect::sort_document_order(adapter, &mut results);
        }
        Ok(results)
    }

    fn try_closest(
        &self,
        adapter: &A,
        selectors: &str,
        element: A::Handle,
        callback: Option<MatchCallback<'_, A::Handle>>,
    ) -> Result<Option<A::Handle>> {
        let active = self.ensure_context(adapter, element);
        let text = rewrite_scope(adapter, selectors, element);
        let list = self.compile(&text)?;

        self.nth.borrow_mut().reset();
        let context = self.match_context(adapter, active);
        let mut cursor = Some(element);
        while let Some(current) = cursor {
            if matcher::matches_selector_list(&context, &list, current) {
                if let Some(callback) = callback {
                    callback(current);
                }
                return Ok(Some(current));
            }
            cursor = adapter.parent(current);
        }
        Ok(None)
    }

    /// Compile a normalized selector list, memoized by exact text.
    fn compile(&self, selectors: &str) -> Result<Rc<SelectorList>> {
        let normalized = lexer::normalize(selectors);
        if let Some(cached) = self.compiled.borrow().get(&normalized) {
            return Ok(Rc::clone(cached));
        }
        let list = Rc::new(parser::parse_selector_list(
            &normalized,
            self.registry.grammar(),
        )?);
        self.compiled
            .borrow_mut()
            .insert(normalized, Rc::clone(&list));
        Ok(list)
    }

    /// Look up or build the query plan for a selector list. A cached
    /// entry is only reused when the context element and the callback
    /// identity both match what produced it.
    fn resolve(
        &self,
        selectors: &str,
        scope: A::Handle,
        callback: Option<MatchCallback<'_, A::Handle>>,
    ) -> Result<(Rc<SelectorList>, Rc<Vec<FastPath>>)> {
        let normalized = lexer::normalize(selectors);
        let callback = callback_identity(callback);

        if let Some(entry) = self.resolver.borrow().get(&normalized)
            && entry.context == scope
            && entry.callback == callback
        {
            return Ok((Rc::clone(&entry.list), Rc::clone(&entry.fast_paths)));
        }

        let list = self.compile(&normalized)?;
        let fast_paths = Rc::new(
            list.selectors
                .iter()
                .map(|complex| collect::choose_fast_path(complex.rightmost()))
                .collect::<Vec<_>>(),
        );
        self.resolver.borrow_mut().insert(
            normalized,
            ResolverEntry {
                list: Rc::clone(&list),
                fast_paths: Rc::clone(&fast_paths),
                context: scope,
                callback,
            },
        );
        Ok((list, fast_paths))
    }

    /// Refresh the active document context when the queried node belongs
    /// to a different tree than the last query. Resolver entries are tied
    /// to the old tree and are dropped.
    fn ensure_context(&self, adapter: &A, node: A::Handle) -> ActiveContext<A::Handle> {
        let root = tree_root(adapter, node);
        let mut active = self.active.borrow_mut();
        if let Some(current) = active.as_ref()
            && current.root != root
        {
            log::debug!("switching active document context, dropping resolver cache");
            self.resolver.borrow_mut().clear();
        }
        // Document flags are cheap; re-reading them every call keeps the
        // engine honest when the host flips quirks mode in place.
        let context = ActiveContext {
            root,
            is_html: adapter.is_html_document(),
            quirks: adapter.is_quirks_mode(),
        };
        *active = Some(context);
        context
    }

    fn match_context<'a>(
        &'a self,
        adapter: &'a A,
        active: ActiveContext<A::Handle>,
    ) -> MatchContext<'a, A> {
        MatchContext {
            adapter,
            registry: &self.registry,
            nth: &self.nth,
            is_html: active.is_html,
            quirks: active.quirks,
        }
    }

    /// Resolve the verbosity contract for a failed call.
    fn settle<T>(&self, error: Error, neutral: T) -> Result<T> {
        if self.config.verbosity {
            return Err(error);
        }
        if self.config.log_errors {
            log::error!("suppressed selector error: {error}");
        }
        Ok(neutral)
    }
}

/// Topmost element of the tree containing `node`.
fn tree_root<A: ElementAdapter>(adapter: &A, node: A::Handle) -> A::Handle {
    let mut current = node;
    while let Some(parent) = adapter.parent(current) {
        current = parent;
    }
    current
}

/// Replace `:scope` with a concrete reference to the context element
/// before validation, keeping the grammar free of a scope production.
fn rewrite_scope<A: ElementAdapter>(adapter: &A, text: &str, scope: A::Handle) -> String {
    if !text.contains(":scope") {
        return text.to_owned();
    }
    let mut replacement = adapter.tag_name(scope).to_owned();
    if let Some(id) = adapter.attribute(scope, "id") {
        replacement.push('#');
        replacement.push_str(id);
    } else if let Some(class) = adapter
        .attribute(scope, "class")
        .and_then(|value| value.split_ascii_whitespace().next())
    {
        replacement.push('.');
        replacement.push_str(class);
    }
    text.replace(":scope", &replacement)
}

/// Stable identity for the callback slot of a resolver entry; `0` means
/// no callback.
fn callback_identity<H>(callback: Option<MatchCallback<'_, H>>) -> usize {
    callback.map_or(0, |inner| ptr::from_ref(inner).cast::<()>().addr())
}
