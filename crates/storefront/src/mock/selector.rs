//! Selector engine for the in-memory DOM.
//!
//! Supported forms:
//!
//! - CSS: compound selectors (`tag`, `*`, `#id`, `.class`, `[attr]`,
//!   `[attr="v"]`, `[attr^="v"]`, `[attr$="v"]`, `[attr*="v"]`,
//!   `[attr~="v"]`) joined by descendant or `>` combinators, comma lists.
//! - XPath: `/` and `//` steps with a tag or `*` node test and
//!   `[@attr]`, `[@attr="v"]`, `[text()="v"]` predicates; a leading `.` is
//!   allowed and every expression is evaluated relative to its scope.
//! - Role: implicit ARIA roles of the elements the storefront renders, with
//!   Playwright's default name matching (case-insensitive substring).
//!   Hidden elements never match a role.
//! - Nth: picks one match of the chain so far.

use regex::Regex;
use std::sync::OnceLock;

use super::dom::{Dom, NodeId};
use crate::locator::{LocatorPath, Selector};

/// Resolve a chain to matching node ids in document order
pub fn resolve(dom: &Dom, path: &LocatorPath) -> Result<Vec<NodeId>, String> {
    let mut scopes = vec![Dom::ROOT];
    for step in path.steps() {
        scopes = match step {
            Selector::Nth { index } => scopes.get(*index).copied().into_iter().collect(),
            Selector::Css { value } => {
                let list = parse_css(value)?;
                matching(dom, &scopes, |node| list.iter().any(|c| c.matches(dom, node)))
            }
            Selector::XPath { value } => {
                let steps = parse_xpath(value)?;
                let mut found: Vec<NodeId> = scopes
                    .iter()
                    .flat_map(|&scope| eval_xpath(dom, scope, &steps))
                    .collect();
                found.sort_unstable();
                found.dedup();
                found
            }
            Selector::Role { role, name } => matching(dom, &scopes, |node| {
                dom.is_visible(node)
                    && implicit_role(dom, node) == Some(role.as_str())
                    && name
                        .as_deref()
                        .map_or(true, |name| name_matches(&accessible_name(dom, node), name))
            }),
        };
    }
    Ok(scopes)
}

/// Descendants of any scope satisfying `pred`, deduplicated, in document order
fn matching<F>(dom: &Dom, scopes: &[NodeId], pred: F) -> Vec<NodeId>
where
    F: Fn(NodeId) -> bool,
{
    let mut found: Vec<NodeId> = scopes
        .iter()
        .flat_map(|&scope| dom.descendants(scope))
        .filter(|&node| pred(node))
        .collect();
    found.sort_unstable();
    found.dedup();
    found
}

// CSS

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    Word(String),
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrOp)>,
}

impl Compound {
    fn matches(&self, dom: &Dom, id: NodeId) -> bool {
        let node = dom.node(id);
        if id == Dom::ROOT {
            return false;
        }
        if let Some(tag) = &self.tag {
            if tag != "*" && tag != node.tag() {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if node.attr("id") != Some(want.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| node.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, op)| {
            let Some(value) = node.attr(name) else {
                return false;
            };
            match op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => value == v,
                AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
                AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
                AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
                AttrOp::Word(v) => value.split_whitespace().any(|w| w == v),
            }
        })
    }
}

#[derive(Debug, Clone)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches(&self, dom: &Dom, id: NodeId) -> bool {
        self.matches_at(dom, id, self.parts.len() - 1)
    }

    fn matches_at(&self, dom: &Dom, id: NodeId, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(dom, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => dom
                .node(id)
                .parent()
                .is_some_and(|p| self.matches_at(dom, p, index - 1)),
            Combinator::Descendant => dom
                .ancestors(id)
                .any(|a| self.matches_at(dom, a, index - 1)),
        }
    }
}

fn css_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(
            r#"^(?:(\*|[A-Za-z][\w-]*)|#([\w-]+)|\.([\w-]+)|\[\s*([\w-]+)\s*(?:([\^$*~]?=)\s*(?:"([^"]*)"|'([^']*)'|([^\]\s"']+)))?\s*\])"#,
        )
        .unwrap_or_else(|e| unreachable!("css token pattern: {e}"))
    })
}

fn parse_css(text: &str) -> Result<Vec<Complex>, String> {
    split_top_level(text)
        .into_iter()
        .map(|part| parse_complex(part).map_err(|e| format!("invalid CSS {text:?}: {e}")))
        .collect()
}

/// Split on commas outside brackets and quotes
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let (mut depth, mut quote, mut start) = (0usize, None, 0usize);
    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_complex(text: &str) -> Result<Complex, String> {
    let mut parts = Vec::new();
    let mut rest = text.trim();
    let mut combinator = Combinator::Descendant;
    if rest.is_empty() {
        return Err("empty selector".to_string());
    }
    loop {
        let (compound, tail) = parse_compound(rest)?;
        parts.push((combinator, compound));
        let trimmed = tail.trim_start();
        if trimmed.is_empty() {
            break;
        }
        if let Some(after) = trimmed.strip_prefix('>') {
            combinator = Combinator::Child;
            rest = after.trim_start();
        } else if trimmed.len() < tail.len() {
            combinator = Combinator::Descendant;
            rest = trimmed;
        } else {
            return Err(format!("unexpected {trimmed:?}"));
        }
    }
    Ok(Complex { parts })
}

fn parse_compound(text: &str) -> Result<(Compound, &str), String> {
    let mut compound = Compound::default();
    let mut rest = text;
    let mut consumed = false;
    while let Some(caps) = css_token().captures(rest) {
        if let Some(tag) = caps.get(1) {
            if consumed {
                return Err(format!("misplaced type selector {:?}", tag.as_str()));
            }
            compound.tag = Some(tag.as_str().to_ascii_lowercase());
        } else if let Some(id) = caps.get(2) {
            compound.id = Some(id.as_str().to_string());
        } else if let Some(class) = caps.get(3) {
            compound.classes.push(class.as_str().to_string());
        } else if let Some(name) = caps.get(4) {
            let value = caps
                .get(6)
                .or_else(|| caps.get(7))
                .or_else(|| caps.get(8))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            let op = match caps.get(5).map(|m| m.as_str()) {
                None => AttrOp::Exists,
                Some("=") => AttrOp::Equals(value),
                Some("^=") => AttrOp::Prefix(value),
                Some("$=") => AttrOp::Suffix(value),
                Some("*=") => AttrOp::Contains(value),
                Some(_) => AttrOp::Word(value),
            };
            compound.attrs.push((name.as_str().to_string(), op));
        }
        let len = caps.get(0).map_or(0, |m| m.end());
        rest = &rest[len..];
        consumed = true;
    }
    if consumed {
        Ok((compound, rest))
    } else {
        Err(format!("cannot parse {rest:?}"))
    }
}

// XPath

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    HasAttr(String),
    AttrEquals(String, String),
    TextEquals(String),
}

#[derive(Debug, Clone)]
struct XPathStep {
    descendant: bool,
    tag: String,
    predicates: Vec<Predicate>,
}

fn xpath_step() -> &'static Regex {
    static STEP: OnceLock<Regex> = OnceLock::new();
    STEP.get_or_init(|| {
        Regex::new(r"^(//|/)(\*|[A-Za-z][\w-]*)((?:\[[^\]]*\])*)")
            .unwrap_or_else(|e| unreachable!("xpath step pattern: {e}"))
    })
}

fn xpath_predicate() -> &'static Regex {
    static PREDICATE: OnceLock<Regex> = OnceLock::new();
    PREDICATE.get_or_init(|| {
        Regex::new(
            r#"\[\s*(?:@([\w-]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'))?|text\(\)\s*=\s*(?:"([^"]*)"|'([^']*)'))\s*\]"#,
        )
        .unwrap_or_else(|e| unreachable!("xpath predicate pattern: {e}"))
    })
}

fn parse_xpath(text: &str) -> Result<Vec<XPathStep>, String> {
    let invalid = |why: &str| format!("unsupported XPath {text:?}: {why}");
    let mut rest = text.trim();
    rest = rest.strip_prefix('.').unwrap_or(rest);
    let mut steps = Vec::new();
    while !rest.is_empty() {
        let caps = xpath_step()
            .captures(rest)
            .ok_or_else(|| invalid(rest))?;
        let predicates_text = caps.get(3).map_or("", |m| m.as_str());
        let mut predicates = Vec::new();
        let mut matched_len = 0;
        for pred in xpath_predicate().captures_iter(predicates_text) {
            matched_len += pred.get(0).map_or(0, |m| m.len());
            let quoted = |a: usize, b: usize| {
                pred.get(a)
                    .or_else(|| pred.get(b))
                    .map(|m| m.as_str().to_string())
            };
            if let Some(attr) = pred.get(1) {
                predicates.push(match quoted(2, 3) {
                    Some(value) => Predicate::AttrEquals(attr.as_str().to_string(), value),
                    None => Predicate::HasAttr(attr.as_str().to_string()),
                });
            } else if let Some(value) = quoted(4, 5) {
                predicates.push(Predicate::TextEquals(value));
            }
        }
        if matched_len != predicates_text.len() {
            return Err(invalid(predicates_text));
        }
        steps.push(XPathStep {
            descendant: caps.get(1).is_some_and(|m| m.as_str() == "//"),
            tag: caps
                .get(2)
                .map_or_else(|| "*".to_string(), |m| m.as_str().to_ascii_lowercase()),
            predicates,
        });
        let len = caps.get(0).map_or(0, |m| m.end());
        rest = &rest[len..];
    }
    if steps.is_empty() {
        return Err(invalid("empty expression"));
    }
    Ok(steps)
}

fn eval_xpath(dom: &Dom, scope: NodeId, steps: &[XPathStep]) -> Vec<NodeId> {
    let mut context = vec![scope];
    for step in steps {
        let mut next: Vec<NodeId> = Vec::new();
        for &node in &context {
            let candidates: Vec<NodeId> = if step.descendant {
                dom.descendants(node).collect()
            } else {
                dom.children(node).collect()
            };
            next.extend(candidates.into_iter().filter(|&c| xpath_test(dom, c, step)));
        }
        next.sort_unstable();
        next.dedup();
        context = next;
    }
    context
}

fn xpath_test(dom: &Dom, id: NodeId, step: &XPathStep) -> bool {
    let node = dom.node(id);
    (step.tag == "*" || step.tag == node.tag())
        && step.predicates.iter().all(|p| match p {
            Predicate::HasAttr(name) => node.attr(name).is_some(),
            Predicate::AttrEquals(name, value) => node.attr(name) == Some(value.as_str()),
            Predicate::TextEquals(value) => node.own_text() == value,
        })
}

// Roles

fn implicit_role(dom: &Dom, id: NodeId) -> Option<&str> {
    let node = dom.node(id);
    if let Some(role) = node.attr("role") {
        return Some(role);
    }
    match node.tag() {
        "button" => Some("button"),
        "a" if node.attr("href").is_some() => Some("link"),
        "select" => Some("combobox"),
        "option" => Some("option"),
        "img" => Some("img"),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some("heading"),
        "input" => match node.attr("type").unwrap_or("text") {
            "submit" | "button" | "reset" => Some("button"),
            "checkbox" => Some("checkbox"),
            "text" | "email" | "search" | "tel" | "url" => Some("textbox"),
            _ => None,
        },
        _ => None,
    }
}

fn accessible_name(dom: &Dom, id: NodeId) -> String {
    let node = dom.node(id);
    let raw = node
        .attr("aria-label")
        .map(str::to_string)
        .or_else(|| match node.tag() {
            "input" => node.attr("value").map(str::to_string),
            "img" => node.attr("alt").map(str::to_string),
            _ => None,
        })
        .unwrap_or_else(|| dom.text_content(id));
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn name_matches(actual: &str, wanted: &str) -> bool {
    let wanted = wanted.split_whitespace().collect::<Vec<_>>().join(" ");
    actual.to_lowercase().contains(&wanted.to_lowercase())
}
