//! Runtime extensibility for combinators, attribute operators, and
//! pseudo-class selectors.
//!
//! Registration immediately extends the grammar consulted by the parser,
//! so selectors compiled afterwards recognize the new tokens. Duplicate
//! registration of an existing symbol warns and is a no-op: it must
//! neither fail nor corrupt the grammar.

use rustc_hash::FxHashMap;

use crate::ElementAdapter;
use crate::parser;

/// Resolver for a custom combinator: given the element on the right-hand
/// side, produce the candidate elements on the left-hand side.
pub type CombinatorResolver<A> =
    Box<dyn Fn(&A, <A as ElementAdapter>::Handle) -> Vec<<A as ElementAdapter>::Handle>>;

/// Evaluator for a custom attribute operator: receives the attribute
/// value, the selector value, and whether comparison is case-insensitive.
pub type OperatorEval = Box<dyn Fn(&str, &str, bool) -> bool>;

/// Evaluator for a custom pseudo-class: receives the adapter, the element
/// under test, and the raw argument text, if any.
pub type SelectorEval<A> =
    Box<dyn Fn(&A, <A as ElementAdapter>::Handle, Option<&str>) -> bool>;

const BUILTIN_COMBINATORS: [char; 3] = ['>', '+', '~'];
const BUILTIN_OPERATORS: [&str; 6] = ["=", "~=", "|=", "^=", "$=", "*="];

/// The token shapes the parser must recognize. Kept separate from the
/// evaluation callbacks so the parser stays independent of the adapter
/// type.
#[derive(Clone, Debug, Default)]
pub(crate) struct Grammar {
    /// Registered combinator symbols.
    pub(crate) combinator_symbols: Vec<char>,
    /// Registered operator symbols, longest first so the attribute parser
    /// can match greedily.
    pub(crate) operator_symbols: Vec<String>,
    /// Registered pseudo-class names mapped to whether they take an
    /// argument.
    pub(crate) pseudo_names: FxHashMap<String, bool>,
}

/// Registered custom selector productions and their evaluators.
pub struct Registry<A: ElementAdapter> {
    grammar: Grammar,
    combinators: FxHashMap<char, CombinatorResolver<A>>,
    operators: FxHashMap<String, OperatorEval>,
    selectors: FxHashMap<String, SelectorEval<A>>,
}

impl<A: ElementAdapter> Default for Registry<A> {
    fn default() -> Self {
        Self {
            grammar: Grammar::default(),
            combinators: FxHashMap::default(),
            operators: FxHashMap::default(),
            selectors: FxHashMap::default(),
        }
    }
}

impl<A: ElementAdapter> Registry<A> {
    /// The grammar view consulted by the parser.
    pub(crate) fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Register a custom combinator symbol. Returns `false` (after
    /// warning) when the symbol is already taken.
    pub fn register_combinator(&mut self, symbol: char, resolve: CombinatorResolver<A>) -> bool {
        if BUILTIN_COMBINATORS.contains(&symbol) || self.combinators.contains_key(&symbol) {
            log::warn!("combinator '{symbol}' is already registered, ignoring");
            return false;
        }
        self.grammar.combinator_symbols.push(symbol);
        self.combinators.insert(symbol, resolve);
        true
    }

    /// Register a custom attribute operator symbol (e.g. `!=`). Returns
    /// `false` (after warning) when the symbol is already taken.
    pub fn register_operator(&mut self, symbol: &str, eval: OperatorEval) -> bool {
        if symbol.is_empty()
            || BUILTIN_OPERATORS.contains(&symbol)
            || self.operators.contains_key(symbol)
        {
            log::warn!("attribute operator {symbol:?} is already registered, ignoring");
            return false;
        }
        self.grammar.operator_symbols.push(symbol.to_owned());
        // Longest symbols first so "!==" wins over "!=" during parsing.
        self.grammar
            .operator_symbols
            .sort_by(|left, right| right.len().cmp(&left.len()));
        self.operators.insert(symbol.to_owned(), eval);
        true
    }

    /// Register a custom pseudo-class selector. Returns `false` (after
    /// warning) when the name collides with a built-in or an earlier
    /// registration.
    pub fn register_selector(
        &mut self,
        name: &str,
        takes_argument: bool,
        eval: SelectorEval<A>,
    ) -> bool {
        let lowered = name.to_ascii_lowercase();
        if lowered.is_empty()
            || parser::is_builtin_pseudo_name(&lowered)
            || self.selectors.contains_key(&lowered)
        {
            log::warn!("pseudo-class :{lowered} is already registered, ignoring");
            return false;
        }
        self.grammar.pseudo_names.insert(lowered.clone(), takes_argument);
        self.selectors.insert(lowered, eval);
        true
    }

    /// Look up a custom combinator resolver.
    pub(crate) fn combinator(&self, symbol: char) -> Option<&CombinatorResolver<A>> {
        self.combinators.get(&symbol)
    }

    /// Look up a custom attribute operator evaluator.
    pub(crate) fn operator(&self, symbol: &str) -> Option<&OperatorEval> {
        self.operators.get(symbol)
    }

    /// Look up a custom pseudo-class evaluator.
    pub(crate) fn selector(&self, name: &str) -> Option<&SelectorEval<A>> {
        self.selectors.get(name)
    }
}
