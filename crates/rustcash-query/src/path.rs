//! A small path language over trees.
//!
//! Paths are `/`-separated steps, each a selector optionally followed by
//! `[...]` filters:
//!
//! | step | selects |
//! |---|---|
//! | `.` | the node itself |
//! | `..` | the parent |
//! | `*` | all children |
//! | (empty, as in `a//b`) | the node and all its descendants, breadth first |
//! | `tag` | children matching `tag` |
//!
//! | filter | keeps |
//! |---|---|
//! | `[n]` | the n-th candidate (1-based; negative counts from the end) |
//! | `[@attr]` | candidates with the attribute |
//! | `[@attr='v']` | candidates whose attribute equals `v` |
//! | `[tag]` | candidates with a child matching `tag` |
//! | `[tag='v']` | candidates with a child matching `tag` whose text is `v` |
//!
//! A leading `/` evaluates from the topmost ancestor of the context node and
//! a trailing `//` selects every descendant. What "matching" means is up to
//! the [`PathNode`] implementation.
//!
//! ```
//! use rustcash_query::CompiledPath;
//!
//! let path: CompiledPath = ".//Fuel".parse().unwrap();
//! assert_eq!(path.as_str(), ".//Fuel");
//! assert!("Expenses[0]".parse::<CompiledPath>().is_err());
//! ```

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::{PathError, PathErrorKind};

/// A tree node a [`CompiledPath`] can be evaluated against.
pub trait PathNode: Clone + Eq + Hash {
    /// Children in stored order.
    fn children(&self) -> Vec<Self>;
    /// The parent, absent at the top.
    fn parent(&self) -> Option<Self>;
    /// Whether the node matches a tag step.
    fn match_tag(&self, tag: &str) -> bool;
    /// Whether the node matches `tag` and its text equals `text`.
    fn match_tag_text(&self, tag: &str, text: &str) -> bool;
    /// Whether the node has the attribute.
    fn match_attr(&self, attr: &str) -> bool;
    /// Whether the node's attribute equals `text`.
    fn match_attr_text(&self, attr: &str, text: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    SelfNode,
    Parent,
    Children,
    Descendants,
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    Position(i64),
    Attr(String),
    AttrText(String, String),
    Child(String),
    ChildText(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    selector: Selector,
    filters: Vec<Filter>,
}

/// A path expression compiled once and evaluated any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    source: String,
    absolute: bool,
    segments: Vec<Segment>,
}

impl CompiledPath {
    /// Compile a path expression.
    pub fn compile(path: &str) -> Result<Self, PathError> {
        Self::parse(path).map_err(|kind| PathError::new(path, kind))
    }

    fn parse(path: &str) -> Result<Self, PathErrorKind> {
        if path.is_empty() {
            return Err(PathErrorKind::Empty);
        }
        let mut body = path.to_string();
        if body.ends_with("//") {
            body.push('*');
        }
        let (absolute, body) = match body.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, body.as_str()),
        };
        let segments = if body.is_empty() {
            Vec::new()
        } else {
            split_steps(body)?
                .into_iter()
                .map(parse_segment)
                .collect::<Result<_, _>>()?
        };
        Ok(Self {
            source: path.to_string(),
            absolute,
            segments,
        })
    }

    /// The expression as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate from `context`.
    ///
    /// Each step is applied to the de-duplicated node set produced by the
    /// previous one. Nodes keep the order they are first reached in.
    pub fn find<N: PathNode>(&self, context: &N) -> Vec<N> {
        let start = if self.absolute {
            topmost(context)
        } else {
            context.clone()
        };

        let mut frontier = vec![start];
        for segment in &self.segments {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for node in &frontier {
                for candidate in segment.apply(node) {
                    if seen.insert(candidate.clone()) {
                        next.push(candidate);
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            frontier = next;
        }
        frontier
    }
}

impl FromStr for CompiledPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn topmost<N: PathNode>(node: &N) -> N {
    let mut top = node.clone();
    while let Some(parent) = top.parent() {
        top = parent;
    }
    top
}

/// Breadth-first, the node itself first.
fn descendants<N: PathNode>(node: &N) -> Vec<N> {
    let mut out = Vec::new();
    let mut queue = VecDeque::from([node.clone()]);
    while let Some(n) = queue.pop_front() {
        queue.extend(n.children());
        out.push(n);
    }
    out
}

impl Segment {
    fn apply<N: PathNode>(&self, node: &N) -> Vec<N> {
        let mut candidates = match &self.selector {
            Selector::SelfNode => vec![node.clone()],
            Selector::Parent => node.parent().into_iter().collect(),
            Selector::Children => node.children(),
            Selector::Descendants => descendants(node),
            Selector::Tag(tag) => node
                .children()
                .into_iter()
                .filter(|c| c.match_tag(tag))
                .collect(),
        };
        for filter in &self.filters {
            candidates = filter.apply(candidates);
        }
        candidates
    }
}

impl Filter {
    fn apply<N: PathNode>(&self, mut candidates: Vec<N>) -> Vec<N> {
        match self {
            Self::Position(pos) => {
                let len = candidates.len() as i64;
                let index = if *pos > 0 { pos - 1 } else { len + pos };
                if (0..len).contains(&index) {
                    vec![candidates.swap_remove(index as usize)]
                } else {
                    Vec::new()
                }
            }
            Self::Attr(attr) => {
                candidates.retain(|c| c.match_attr(attr));
                candidates
            }
            Self::AttrText(attr, text) => {
                candidates.retain(|c| c.match_attr_text(attr, text));
                candidates
            }
            Self::Child(tag) => {
                candidates.retain(|c| c.children().iter().any(|g| g.match_tag(tag)));
                candidates
            }
            Self::ChildText(tag, text) => {
                candidates.retain(|c| c.children().iter().any(|g| g.match_tag_text(tag, text)));
                candidates
            }
        }
    }
}

/// Split on `/` outside quotes and brackets.
fn split_steps(path: &str) -> Result<Vec<&str>, PathErrorKind> {
    let mut steps = Vec::new();
    let mut quote = None;
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in path.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(PathErrorKind::UnbalancedBrackets)?;
            }
            (None, '/') if depth == 0 => {
                steps.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(PathErrorKind::UnterminatedQuote);
    }
    if depth != 0 {
        return Err(PathErrorKind::UnbalancedBrackets);
    }
    steps.push(&path[start..]);
    Ok(steps)
}

fn parse_segment(step: &str) -> Result<Segment, PathErrorKind> {
    let (selector, mut rest) = step.split_at(step.find('[').unwrap_or(step.len()));
    let selector = match selector {
        "." => Selector::SelfNode,
        ".." => Selector::Parent,
        "*" => Selector::Children,
        "" => Selector::Descendants,
        tag => Selector::Tag(tag.to_string()),
    };

    let mut filters = Vec::new();
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(PathErrorKind::UnbalancedBrackets);
        }
        let close = find_unquoted(rest, ']').ok_or(PathErrorKind::UnbalancedBrackets)?;
        filters.push(parse_filter(&rest[1..close])?);
        rest = &rest[close + 1..];
    }
    Ok(Segment { selector, filters })
}

fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut quote = None;
    for (i, ch) in s.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch == target => return Some(i),
            None => {}
        }
    }
    None
}

fn unquote(value: &str) -> Option<&str> {
    let first = value.chars().next()?;
    if value.len() >= 2 && (first == '\'' || first == '"') && value.ends_with(first) {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

fn parse_filter(filter: &str) -> Result<Filter, PathErrorKind> {
    let f = filter.trim();
    if f.is_empty() {
        return Err(PathErrorKind::EmptyFilter);
    }
    let invalid = || PathErrorKind::InvalidFilter(f.to_string());

    if let Some(eq) = find_unquoted(f, '=') {
        let key = f[..eq].trim();
        let value = unquote(f[eq + 1..].trim()).ok_or_else(invalid)?.to_string();
        return match key.strip_prefix('@') {
            Some("") => Err(invalid()),
            Some(attr) => Ok(Filter::AttrText(attr.to_string(), value)),
            None if key.ends_with("()") => Err(PathErrorKind::UnsupportedFunction(key.to_string())),
            None if key.is_empty() => Err(invalid()),
            None => Ok(Filter::ChildText(key.to_string(), value)),
        };
    }

    if let Some(attr) = f.strip_prefix('@') {
        return if attr.is_empty() {
            Err(invalid())
        } else {
            Ok(Filter::Attr(attr.to_string()))
        };
    }
    if f.ends_with("()") {
        return Err(PathErrorKind::UnsupportedFunction(f.to_string()));
    }
    if let Ok(pos) = f.parse::<i64>() {
        return if pos == 0 {
            Err(PathErrorKind::ZeroPosition)
        } else {
            Ok(Filter::Position(pos))
        };
    }
    if f.starts_with(['\'', '"']) {
        return Err(invalid());
    }
    Ok(Filter::Child(f.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// library
    ///   shelf (lang=en)
    ///     book "Dune"
    ///     book "Emma"
    ///   shelf (lang=fr)
    ///     book "Candide"
    ///     magazine
    struct Tree {
        tags: Vec<&'static str>,
        texts: Vec<&'static str>,
        parents: Vec<Option<usize>>,
        attrs: Vec<HashMap<&'static str, &'static str>>,
    }

    #[derive(Clone, Copy)]
    struct Node<'a> {
        tree: &'a Tree,
        id: usize,
    }

    impl PartialEq for Node<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    impl Eq for Node<'_> {}

    impl Hash for Node<'_> {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl PathNode for Node<'_> {
        fn children(&self) -> Vec<Self> {
            (0..self.tree.tags.len())
                .filter(|i| self.tree.parents[*i] == Some(self.id))
                .map(|id| Node { tree: self.tree, id })
                .collect()
        }

        fn parent(&self) -> Option<Self> {
            self.tree.parents[self.id].map(|id| Node { tree: self.tree, id })
        }

        fn match_tag(&self, tag: &str) -> bool {
            self.tree.tags[self.id] == tag
        }

        fn match_tag_text(&self, tag: &str, text: &str) -> bool {
            self.match_tag(tag) && self.tree.texts[self.id] == text
        }

        fn match_attr(&self, attr: &str) -> bool {
            self.tree.attrs[self.id].contains_key(attr)
        }

        fn match_attr_text(&self, attr: &str, text: &str) -> bool {
            self.tree.attrs[self.id].get(attr) == Some(&text)
        }
    }

    fn tree() -> Tree {
        Tree {
            tags: vec!["library", "shelf", "shelf", "book", "book", "book", "magazine"],
            texts: vec!["", "", "", "Dune", "Emma", "Candide", ""],
            parents: vec![None, Some(0), Some(0), Some(1), Some(1), Some(2), Some(2)],
            attrs: vec![
                HashMap::new(),
                HashMap::from([("lang", "en")]),
                HashMap::from([("lang", "fr")]),
                HashMap::new(),
                HashMap::new(),
                HashMap::new(),
                HashMap::new(),
            ],
        }
    }

    fn find(tree: &Tree, from: usize, path: &str) -> Vec<usize> {
        CompiledPath::compile(path)
            .unwrap()
            .find(&Node { tree, id: from })
            .into_iter()
            .map(|n| n.id)
            .collect()
    }

    fn kind(path: &str) -> PathErrorKind {
        CompiledPath::compile(path).unwrap_err().kind
    }

    #[test]
    fn test_children_by_tag() {
        let t = tree();
        assert_eq!(find(&t, 0, "shelf"), [1, 2]);
        assert_eq!(find(&t, 0, "shelf/book"), [3, 4, 5]);
        assert_eq!(find(&t, 0, "*/*"), [3, 4, 5, 6]);
        assert!(find(&t, 0, "book").is_empty());
    }

    #[test]
    fn test_self_and_parent() {
        let t = tree();
        assert_eq!(find(&t, 0, "."), [0]);
        assert!(find(&t, 0, "..").is_empty());
        assert_eq!(find(&t, 3, ".."), [1]);
        assert_eq!(find(&t, 0, "shelf/book/.."), [1, 2]);
    }

    #[test]
    fn test_descendants() {
        let t = tree();
        assert_eq!(find(&t, 0, ".//book"), [3, 4, 5]);
        assert_eq!(find(&t, 0, "shelf//"), [3, 4, 5, 6]);
        assert_eq!(find(&t, 1, ".//"), [3, 4]);
    }

    #[test]
    fn test_absolute() {
        let t = tree();
        assert_eq!(find(&t, 5, "/"), [0]);
        assert_eq!(find(&t, 5, "//book"), [3, 4, 5]);
        assert_eq!(find(&t, 6, "/shelf"), [1, 2]);
    }

    #[test]
    fn test_repeated_up_and_down_stays_linear() {
        // A root with 40 leaves: every `*/..` would multiply the work by 40
        // if intermediate node sets kept duplicates.
        let width = 40;
        let t = Tree {
            tags: std::iter::once("root")
                .chain(std::iter::repeat("leaf").take(width))
                .collect(),
            texts: vec![""; width + 1],
            parents: std::iter::once(None)
                .chain(std::iter::repeat(Some(0)).take(width))
                .collect(),
            attrs: vec![HashMap::new(); width + 1],
        };
        let path = vec!["*/.."; 8].join("/");
        assert_eq!(find(&t, 0, &path), [0]);
        assert_eq!(find(&t, 0, &format!("{path}/*")).len(), width);
    }

    #[test]
    fn test_position_filters() {
        let t = tree();
        assert_eq!(find(&t, 0, "shelf/book[1]"), [3, 5]);
        assert_eq!(find(&t, 0, "shelf/book[-1]"), [4, 5]);
        assert_eq!(find(&t, 0, "shelf/book[2]"), [4]);
        assert!(find(&t, 0, "shelf[3]").is_empty());
    }

    #[test]
    fn test_attribute_filters() {
        let t = tree();
        assert_eq!(find(&t, 0, "shelf[@lang]"), [1, 2]);
        assert_eq!(find(&t, 0, "shelf[@lang='fr']/book"), [5]);
        assert_eq!(find(&t, 0, "shelf[@lang=\"en\"]/book"), [3, 4]);
        assert!(find(&t, 0, "shelf[@color]").is_empty());
    }

    #[test]
    fn test_child_filters() {
        let t = tree();
        assert_eq!(find(&t, 0, "shelf[magazine]"), [2]);
        assert_eq!(find(&t, 0, "shelf[book='Emma']"), [1]);
        assert_eq!(find(&t, 0, "shelf[book][@lang='fr'][1]"), [2]);
    }

    #[test]
    fn test_quoted_slash_is_not_a_separator() {
        let t = tree();
        assert!(find(&t, 0, "shelf[book='a/b']").is_empty());
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(kind(""), PathErrorKind::Empty);
        assert_eq!(kind("shelf[1"), PathErrorKind::UnbalancedBrackets);
        assert_eq!(kind("shelf]"), PathErrorKind::UnbalancedBrackets);
        assert_eq!(kind("shelf[1]x"), PathErrorKind::UnbalancedBrackets);
        assert_eq!(kind("shelf[@lang='fr]"), PathErrorKind::UnterminatedQuote);
        assert_eq!(kind("shelf[]"), PathErrorKind::EmptyFilter);
        assert_eq!(kind("shelf[0]"), PathErrorKind::ZeroPosition);
        assert_eq!(
            kind("shelf[text()]"),
            PathErrorKind::UnsupportedFunction("text()".to_string())
        );
        assert_eq!(
            kind("shelf[text()='x']"),
            PathErrorKind::UnsupportedFunction("text()".to_string())
        );
        assert_eq!(kind("shelf[@]"), PathErrorKind::InvalidFilter("@".to_string()));
        assert_eq!(
            kind("shelf[@lang=fr]"),
            PathErrorKind::InvalidFilter("@lang=fr".to_string())
        );
    }

    #[test]
    fn test_error_carries_path() {
        let err = CompiledPath::compile("a[0]").unwrap_err();
        assert_eq!(err.path, "a[0]");
        assert_eq!(err.to_string(), "invalid path \"a[0]\": position filters start at 1");
    }
}
