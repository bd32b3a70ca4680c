//! Rule and Filter types for tree normalization.

use crate::node::{Element, Node};
use crate::normalize::EmbedResolver;
use crate::options::TranscodeOptions;

/// What the rule pass does with a matched element after the rule ran.
#[derive(Debug)]
pub enum Outcome {
    /// Keep the (possibly modified) element in place
    Keep,
    /// Put these nodes where the element was
    Replace(Vec<Node>),
    /// Drop the element
    Remove,
}

/// Everything a rule may consult besides the element itself.
pub struct Context<'a> {
    pub options: &'a TranscodeOptions,
    pub resolver: &'a dyn EmbedResolver,
}

/// Type alias for rule bodies
pub type ApplyFn = Box<dyn Fn(&mut Element, &Context<'_>) -> Outcome + Send + Sync>;

/// Type alias for filter predicates
pub type PredicateFn = Box<dyn Fn(&str, &Element, &TranscodeOptions) -> bool + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate function
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &Element, &TranscodeOptions) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches an element
    pub fn matches(&self, element: &Element, options: &TranscodeOptions) -> bool {
        match self {
            Filter::TagName(t) => element.tag == *t,
            Filter::TagNames(tags) => tags.contains(&element.tag),
            Filter::Predicate(f) => f(&element.tag, element, options),
        }
    }
}

/// A rule rewrites every element its filter matches
pub struct Rule {
    /// Name used in logs
    pub name: String,
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Rewrite applied to each matched element
    pub apply: ApplyFn,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(name: &str, filter: Filter, apply: F) -> Self
    where
        F: Fn(&mut Element, &Context<'_>) -> Outcome + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            filter,
            apply: Box::new(apply),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, apply: F) -> Self
    where
        F: Fn(&mut Element, &Context<'_>) -> Outcome + Send + Sync + 'static,
    {
        Self::new(tag, Filter::tag(tag), apply)
    }

    /// Apply this rule to a matched element
    pub fn run(&self, element: &mut Element, cx: &Context<'_>) -> Outcome {
        (self.apply)(element, cx)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}
