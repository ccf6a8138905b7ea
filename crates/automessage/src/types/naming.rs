// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical type-name helpers.
//!
//! Names follow a small grammar:
//!
//! ```text
//! name     := base args? "[]"*
//! base     := path segments joined by "::" (or ".")
//! args     := "<" name ("," name)* ">"
//! ```

use crate::config::ARRAY_SUFFIX;

/// Marker prefix for unbound generic parameters (`$0`, `$1`, ...).
pub const PARAMETER_PREFIX: char = '$';

pub fn array_name(element: &str) -> String {
    let mut name = String::with_capacity(element.len() + ARRAY_SUFFIX.len());
    name.push_str(element);
    name.push_str(ARRAY_SUFFIX);
    name
}

pub fn parameter_name(index: usize) -> String {
    format!("{}{}", PARAMETER_PREFIX, index)
}

/// Split `text` on `delimiter`, ignoring delimiters nested between `open`
/// and `close`. Pieces are trimmed; empty pieces are dropped when
/// `remove_empty` is set.
pub fn split_nested(
    text: &str,
    delimiter: &str,
    open: char,
    close: char,
    remove_empty: bool,
) -> Vec<String> {
    let mut pieces = Vec::new();
    if delimiter.is_empty() {
        pieces.push(text.trim().to_string());
        return pieces;
    }

    let mut depth = 0usize;
    let mut start = 0usize;
    let mut index = 0usize;
    while index < text.len() {
        let rest = &text[index..];
        if depth == 0 && rest.starts_with(delimiter) {
            pieces.push(text[start..index].trim().to_string());
            index += delimiter.len();
            start = index;
            continue;
        }
        // Only advance on char boundaries.
        let Some(ch) = rest.chars().next() else {
            break;
        };
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.saturating_sub(1);
        }
        index += ch.len_utf8();
    }
    pieces.push(text[start..].trim().to_string());

    if remove_empty {
        pieces.retain(|piece| !piece.is_empty());
    }
    pieces
}

/// Split trailing `[]` suffixes off a name: `Foo<Int32[]>[][]` gives
/// `("Foo<Int32[]>", 2)`.
pub fn split_array_suffix(name: &str) -> (String, usize) {
    let mut tokens = split_nested(name, ARRAY_SUFFIX, '<', '>', false);
    let depth = tokens.len().saturating_sub(1);
    let base = if tokens.is_empty() {
        String::new()
    } else {
        tokens.swap_remove(0)
    };
    (base, depth)
}

pub fn generic_name(base: &str, args: &[String]) -> String {
    format!("{}<{}>", base, args.join(", "))
}

/// Parse `base<arg, arg>` into its base and top-level arguments.
pub fn parse_generic(name: &str) -> Option<(String, Vec<String>)> {
    let open = name.find('<')?;
    let inner = name[open + 1..].strip_suffix('>')?;
    let args = split_nested(inner, ",", '<', '>', true);
    if args.is_empty() {
        return None;
    }
    Some((name[..open].trim().to_string(), args))
}

/// Unqualified name: generic arguments stripped, last path segment kept.
pub fn short_name(name: &str) -> String {
    let (base, depth) = split_array_suffix(name);
    let base = match base.find('<') {
        Some(open) => &base[..open],
        None => base.as_str(),
    };
    let segment = base
        .rsplit("::")
        .next()
        .and_then(|s| s.rsplit('.').next())
        .unwrap_or(base);
    let mut short = segment.to_string();
    for _ in 0..depth {
        short.push_str(ARRAY_SUFFIX);
    }
    short
}

/// Replace `$N` placeholders with the given argument names.
pub fn substitute_parameters(name: &str, args: &[String]) -> String {
    let mut out = name.to_string();
    // Highest index first so that `$1` never eats the prefix of `$10`.
    for (index, arg) in args.iter().enumerate().rev() {
        out = out.replace(&parameter_name(index), arg);
    }
    out
}

pub fn has_parameters(name: &str) -> bool {
    name.contains(PARAMETER_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_nested_respects_brackets() {
        assert_eq!(
            split_nested("Int32, Pair<Int32, String>, Boolean", ",", '<', '>', true),
            vec!["Int32", "Pair<Int32, String>", "Boolean"]
        );
    }

    #[test]
    fn test_split_nested_keeps_or_drops_empty() {
        assert_eq!(split_nested("Int32[][]", "[]", '<', '>', false), vec!["Int32", "", ""]);
        assert_eq!(split_nested("Int32[][]", "[]", '<', '>', true), vec!["Int32"]);
        assert_eq!(split_nested("", ",", '<', '>', true), Vec::<String>::new());
    }

    #[test]
    fn test_split_array_suffix() {
        assert_eq!(split_array_suffix("Int32"), ("Int32".to_string(), 0));
        assert_eq!(split_array_suffix("Int32[][]"), ("Int32".to_string(), 2));
        assert_eq!(
            split_array_suffix("app::Pair<Int32[], String>[]"),
            ("app::Pair<Int32[], String>".to_string(), 1)
        );
    }

    #[test]
    fn test_parse_generic() {
        let (base, args) = parse_generic("app::Pair<Int32, app::Box<String>>").expect("generic");
        assert_eq!(base, "app::Pair");
        assert_eq!(args, vec!["Int32", "app::Box<String>"]);
        assert!(parse_generic("app::Point").is_none());
        assert!(parse_generic("app::Empty<>").is_none());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("app::geo::Point"), "Point");
        assert_eq!(short_name("App.Geo.Point"), "Point");
        assert_eq!(short_name("app::Pair<Int32, String>"), "Pair");
        assert_eq!(short_name("app::Point[]"), "Point[]");
        assert_eq!(short_name("Int32"), "Int32");
    }

    #[test]
    fn test_substitute_parameters() {
        let args: Vec<String> = (0..11).map(|i| format!("T{}", i)).collect();
        assert_eq!(substitute_parameters("app::Pair<$1, $10>", &args), "app::Pair<T1, T10>");
        assert!(has_parameters("$0[]"));
        assert!(!has_parameters("Int32[]"));
    }
}
