//! The selector subset the page behaviors and tests use: type, universal,
//! `#id`, `.class`, `[attr]` and `[attr=value]` compounds joined by descendant
//! or child combinators, in comma-separated groups.

use std::collections::HashMap;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

impl SelectorAttrCondition {
    pub(crate) fn matches(&self, attrs: &HashMap<String, String>) -> bool {
        match self {
            Self::Exists { key } => attrs.contains_key(key),
            // `type` is an enumerated attribute and compares ASCII case-insensitively.
            Self::Eq { key, value } if key == "type" => attrs
                .get(key)
                .is_some_and(|actual| actual.eq_ignore_ascii_case(value)),
            Self::Eq { key, value } => attrs.get(key) == Some(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
}

impl SelectorStep {
    pub(crate) fn id_only(&self) -> Option<&str> {
        if !self.universal && self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to previous (left) selector part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    tokenize_selector_list(selector)?
        .into_iter()
        .map(|tokens| parse_selector_chain(tokens, selector))
        .collect()
}

fn parse_selector_chain(tokens: Vec<String>, selector: &str) -> Result<Vec<SelectorPart>> {
    let mut steps = Vec::new();
    let mut pending_combinator: Option<SelectorCombinator> = None;

    for token in tokens {
        if token == ">" {
            if pending_combinator.is_some() || steps.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(SelectorCombinator::Child);
            continue;
        }

        let step = parse_selector_step(&token)?;
        let combinator = if steps.is_empty() {
            None
        } else {
            Some(
                pending_combinator
                    .take()
                    .unwrap_or(SelectorCombinator::Descendant),
            )
        };
        steps.push(SelectorPart { step, combinator });
    }

    if steps.is_empty() || pending_combinator.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    Ok(steps)
}

/// Splits a selector list into comma-separated groups of compound tokens.
/// The child combinator is kept as its own `>` token; brackets are opaque.
fn tokenize_selector_list(selector: &str) -> Result<Vec<Vec<String>>> {
    let unsupported = || Error::UnsupportedSelector(selector.into());
    let mut groups: Vec<Vec<String>> = vec![Vec::new()];
    let mut compound = String::new();
    let mut in_brackets = false;

    for ch in selector.chars() {
        if in_brackets {
            compound.push(ch);
            in_brackets = ch != ']';
            continue;
        }
        match ch {
            '[' => {
                in_brackets = true;
                compound.push(ch);
            }
            ']' | '+' | '~' => return Err(unsupported()),
            ',' | '>' => {
                let group = groups.last_mut().ok_or_else(unsupported)?;
                flush_compound(&mut compound, group);
                if ch == ',' {
                    groups.push(Vec::new());
                } else {
                    group.push(">".into());
                }
            }
            ch if ch.is_ascii_whitespace() => {
                let group = groups.last_mut().ok_or_else(unsupported)?;
                flush_compound(&mut compound, group);
            }
            _ => compound.push(ch),
        }
    }
    if in_brackets {
        return Err(unsupported());
    }
    let group = groups.last_mut().ok_or_else(unsupported)?;
    flush_compound(&mut compound, group);

    if groups.iter().any(Vec::is_empty) {
        return Err(unsupported());
    }
    Ok(groups)
}

fn flush_compound(compound: &mut String, group: &mut Vec<String>) {
    if !compound.is_empty() {
        group.push(std::mem::take(compound));
    }
}

fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let part = part.trim();
    if part.is_empty() {
        return Err(Error::UnsupportedSelector(part.into()));
    }

    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                i += 1;
                let Some((id, next)) = parse_selector_ident(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                if step.id.replace(id).is_some() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                i = next;
            }
            b'.' => {
                i += 1;
                let Some((class_name, next)) = parse_selector_ident(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (attr, next) = parse_selector_attr_condition(part, i)?;
                step.attrs.push(attr);
                i = next;
            }
            _ => {
                if step.tag.is_some()
                    || step.id.is_some()
                    || !step.classes.is_empty()
                    || !step.attrs.is_empty()
                    || step.universal
                {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                let Some((tag, next)) = parse_selector_ident(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    Ok(step)
}

fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() || !is_selector_ident_char(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_selector_ident_char(bytes[end]) {
        end += 1;
    }
    Some((src.get(start..end)?.to_string(), end))
}

fn is_selector_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn parse_selector_attr_condition(
    src: &str,
    open_bracket: usize,
) -> Result<(SelectorAttrCondition, usize)> {
    let bytes = src.as_bytes();
    let mut i = open_bracket + 1;
    let mut quote: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        if b == b'\'' || b == b'"' {
            quote = Some(b);
            i += 1;
            continue;
        }

        if b == b']' {
            let Some(body) = src.get(open_bracket + 1..i) else {
                return Err(Error::UnsupportedSelector(src.into()));
            };
            let body = body.trim();
            if body.is_empty() {
                return Err(Error::UnsupportedSelector(src.into()));
            }
            let cond = if let Some((key, value)) = body.split_once('=') {
                let key = key.trim().to_ascii_lowercase();
                if key.is_empty() {
                    return Err(Error::UnsupportedSelector(src.into()));
                }
                let value = value.trim();
                let value = if value.len() >= 2
                    && ((value.starts_with('"') && value.ends_with('"'))
                        || (value.starts_with('\'') && value.ends_with('\'')))
                {
                    value[1..value.len() - 1].to_string()
                } else {
                    value.to_string()
                };
                SelectorAttrCondition::Eq { key, value }
            } else {
                SelectorAttrCondition::Exists {
                    key: body.to_ascii_lowercase(),
                }
            };
            return Ok((cond, i + 1));
        }

        i += 1;
    }

    Err(Error::UnsupportedSelector(src.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attribute_compound() -> Result<()> {
        let groups = parse_selector_groups("input[type=\"tel\"]")?;
        assert_eq!(groups.len(), 1);
        let step = &groups[0][0].step;
        assert_eq!(step.tag.as_deref(), Some("input"));
        assert_eq!(
            step.attrs,
            vec![SelectorAttrCondition::Eq {
                key: "type".into(),
                value: "tel".into(),
            }]
        );
        Ok(())
    }

    #[test]
    fn parses_combinators_and_groups() -> Result<()> {
        let groups = parse_selector_groups(".doctor-card h4, #doctor-fields > input")?;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][1].combinator, Some(SelectorCombinator::Descendant));
        assert_eq!(groups[1][1].combinator, Some(SelectorCombinator::Child));
        assert_eq!(groups[1][0].step.id_only(), Some("doctor-fields"));
        Ok(())
    }

    #[test]
    fn type_values_match_case_insensitively() -> Result<()> {
        let groups = parse_selector_groups("input[type=\"tel\"][name=\"phone\"]")?;
        let conds = &groups[0][0].step.attrs;
        let attrs = |ty: &str, name: &str| {
            HashMap::from([
                ("type".to_string(), ty.to_string()),
                ("name".to_string(), name.to_string()),
            ])
        };
        assert!(conds.iter().all(|cond| cond.matches(&attrs("TEL", "phone"))));
        assert!(!conds.iter().all(|cond| cond.matches(&attrs("tel", "PHONE"))));
        assert!(!conds.iter().all(|cond| cond.matches(&attrs("text", "phone"))));
        Ok(())
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for selector in ["", "a + b", "li ~ li", "div >", "[", ".", "a,,b"] {
            assert!(
                matches!(
                    parse_selector_groups(selector),
                    Err(Error::UnsupportedSelector(_))
                ),
                "{selector:?} should be rejected"
            );
        }
    }
}
