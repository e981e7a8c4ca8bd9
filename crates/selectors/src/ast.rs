//! Parsed selector representation.
//!
//! The parser compiles selector text into this tree once per distinct
//! selector string; matching interprets the tree against a host adapter.
//! This replaces runtime string-code generation with a compile-once,
//! interpret-many design while keeping the same selector semantics.

use smallvec::SmallVec;

/// A comma-separated group of selectors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorList {
    /// The individual comma-free selector expressions.
    pub selectors: Vec<ComplexSelector>,
}

/// One comma-free selector expression: a leftmost compound selector plus
/// combinator-linked compounds to its right.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The leftmost compound selector.
    pub first: CompoundSelector,
    /// Each following compound, paired with the combinator that links it
    /// to the compound on its left.
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// Number of compound selectors in this expression.
    pub fn compound_count(&self) -> usize {
        self.rest.len().saturating_add(1)
    }

    /// The compound selector at `index` (0 = leftmost).
    pub fn compound(&self, index: usize) -> &CompoundSelector {
        if index == 0 {
            &self.first
        } else {
            &self.rest[index.saturating_sub(1)].1
        }
    }

    /// The combinator linking compound `index - 1` to compound `index`.
    pub fn combinator(&self, index: usize) -> &Combinator {
        &self.rest[index.saturating_sub(1)].0
    }

    /// The rightmost compound selector, which candidate nodes must match
    /// directly.
    pub fn rightmost(&self) -> &CompoundSelector {
        self.rest.last().map_or(&self.first, |pair| &pair.1)
    }
}

/// A sequence of simple selectors with no combinators between them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors, all of which must match the same element.
    pub simples: SmallVec<SimpleSelector, 4>,
}

/// Combinators between compound selectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: an ancestor at any depth.
    Descendant,
    /// `>`: the parent element.
    Child,
    /// `+`: the immediately preceding element sibling.
    AdjacentSibling,
    /// `~`: any preceding element sibling.
    GeneralSibling,
    /// A runtime-registered combinator symbol.
    Custom(char),
}

/// Namespace qualification on type, universal, and attribute selectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamespacePrefix {
    /// No prefix written: matches any namespace.
    Unprefixed,
    /// `*|`: explicitly any namespace.
    AnyNamespace,
    /// `|name`: only elements without a namespace.
    NoNamespace,
    /// `ns|name`: the named namespace.
    Named(String),
}

/// A single simple selector inside a compound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    /// `*`, optionally namespace-qualified.
    Universal(NamespacePrefix),
    /// A type (tag name) selector, optionally namespace-qualified.
    Type {
        /// Namespace qualification.
        prefix: NamespacePrefix,
        /// The tag name as written.
        name: String,
    },
    /// `#id`.
    Id(String),
    /// `.class`.
    Class(String),
    /// `[name]`, `[name op value]` and friends.
    Attribute(AttributeSelector),
    /// `:name` productions.
    PseudoClass(PseudoClass),
    /// Legacy single- or double-colon pseudo-elements. Pass-through for
    /// matching purposes: they never reject an element.
    PseudoElement(String),
}

/// An attribute selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Namespace qualification of the attribute name.
    pub prefix: NamespacePrefix,
    /// Attribute name as written.
    pub name: String,
    /// The comparison to perform; `None` is a bare existence test.
    pub operation: Option<AttributeOperation>,
    /// Explicit `i`/`s` flag, if one was written.
    pub case_sensitivity: CaseSensitivity,
}

/// Case-sensitivity of an attribute value comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseSensitivity {
    /// No flag written: sensitive, unless the legacy HTML attribute
    /// table applies in an HTML document.
    #[default]
    Auto,
    /// Explicit `i` flag: always case-insensitive.
    Insensitive,
    /// Explicit `s` flag: always case-sensitive, overriding the legacy
    /// table.
    Sensitive,
}

/// Operator and expected value of a comparing attribute selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeOperation {
    /// The comparison operator.
    pub operator: AttributeOperator,
    /// The right-hand value.
    pub value: String,
}

/// Attribute comparison operators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `=`: exact match.
    Equals,
    /// `~=`: whitespace-delimited token membership.
    Includes,
    /// `|=`: exact match or exact match followed by a hyphen.
    DashMatch,
    /// `^=`: prefix match.
    Prefix,
    /// `$=`: suffix match.
    Suffix,
    /// `*=`: substring match.
    Substring,
    /// A runtime-registered operator symbol.
    Custom(String),
}

/// `An+B` coefficients of the tree-positional pseudo-classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nth {
    /// The step `A`.
    pub step: i32,
    /// The offset `B`.
    pub offset: i32,
}

impl Nth {
    /// Whether a 1-based `position` satisfies `position = A*k + B` for some
    /// non-negative integer `k`.
    pub fn matches(self, position: usize) -> bool {
        let position = position as i64;
        let step = i64::from(self.step);
        let offset = i64::from(self.offset);
        let difference = position - offset;
        if step == 0 {
            return difference == 0;
        }
        difference % step == 0 && difference / step >= 0
    }
}

/// Pseudo-class selectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PseudoClass {
    // Structural
    /// `:root`
    Root,
    /// `:empty`
    Empty,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,

    // Tree-positional
    /// `:nth-child(An+B)`
    NthChild(Nth),
    /// `:nth-last-child(An+B)`
    NthLastChild(Nth),
    /// `:nth-of-type(An+B)`
    NthOfType(Nth),
    /// `:nth-last-of-type(An+B)`
    NthLastOfType(Nth),

    // Logical combinators
    /// `:is(list)` / `:matches(list)`
    Is(SelectorList),
    /// `:where(list)`
    Where(SelectorList),
    /// `:not(list)`
    Not(SelectorList),
    /// `:has(list)`: a relative existence test over descendants.
    Has(SelectorList),

    // Linguistic
    /// `:lang(code)`
    Lang(String),
    /// `:dir(ltr|rtl)`
    Dir(String),

    // Location
    /// `:link`
    Link,
    /// `:visited`
    Visited,
    /// `:any-link`
    AnyLink,
    /// `:target`
    Target,

    // User action
    /// `:hover`
    Hover,
    /// `:active`
    Active,
    /// `:focus`
    Focus,
    /// `:focus-within`
    FocusWithin,
    /// `:focus-visible`
    FocusVisible,

    // Input state
    /// `:enabled`
    Enabled,
    /// `:disabled`
    Disabled,
    /// `:read-only`
    ReadOnly,
    /// `:read-write`
    ReadWrite,
    /// `:placeholder-shown`
    PlaceholderShown,
    /// `:default`
    Default,

    // Input value
    /// `:checked`
    Checked,
    /// `:indeterminate`
    Indeterminate,
    /// `:required`
    Required,
    /// `:optional`
    Optional,
    /// `:valid`
    Valid,
    /// `:invalid`
    Invalid,
    /// `:in-range`
    InRange,
    /// `:out-of-range`
    OutOfRange,

    /// A runtime-registered pseudo-class with its raw argument text.
    Custom {
        /// Registered name.
        name: String,
        /// Raw argument text between parentheses, if any.
        argument: Option<String>,
    },
}
