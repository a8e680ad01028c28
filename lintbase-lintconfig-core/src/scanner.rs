//! Minimal JavaScript-aware scanner. Everything here skips over strings and
//! comments; nothing is evaluated.

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str(u8),
    LineComment,
    BlockComment,
}

/// One flag per byte of `src`: `true` when the byte is code, `false` inside
/// a string body, its closing quote, or a comment. Opening quotes count as code.
pub(crate) fn code_mask(src: &str) -> Vec<bool> {
    let bytes = src.as_bytes();
    let mut mask = vec![false; bytes.len()];
    let mut state = State::Code;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match b {
                b'"' | b'\'' | b'`' => {
                    mask[i] = true;
                    state = State::Str(b);
                }
                b'/' if next == Some(b'/') => {
                    state = State::LineComment;
                    i += 1;
                }
                b'/' if next == Some(b'*') => {
                    state = State::BlockComment;
                    i += 1;
                }
                _ => mask[i] = true,
            },
            State::Str(quote) => {
                if b == b'\\' {
                    i += 1;
                } else if b == quote {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Code;
                    i += 1;
                }
            }
        }
        i += 1;
    }
    mask
}

/// The balanced object literal that opens at byte `open` (which must be `{`).
pub(crate) fn balanced_object(src: &str, open: usize) -> Option<&str> {
    if src.as_bytes().get(open) != Some(&b'{') {
        return None;
    }

    let tail = &src[open..];
    let mask = code_mask(tail);
    let mut depth = 0usize;
    for (i, b) in tail.bytes().enumerate() {
        if !mask[i] {
            continue;
        }
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&tail[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Top-level `key: value` entries of an object literal (`{ ... }`), with the
/// raw, trimmed value text. Spreads, shorthand properties and methods have no
/// top-level `:` and are left out.
pub(crate) fn object_entries(literal: &str) -> Vec<(String, &str)> {
    let bytes = literal.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'{' || bytes[bytes.len() - 1] != b'}' {
        return Vec::new();
    }

    let mask = code_mask(literal);
    let last = bytes.len() - 1;
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 1;
    let mut colon = None;
    for i in 1..=last {
        if !mask[i] {
            continue;
        }
        match bytes[i] {
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' if depth > 0 => depth -= 1,
            b':' if depth == 0 && colon.is_none() => colon = Some(i),
            b',' | b'}' if depth == 0 => {
                if let Some(colon) = colon {
                    if let Some(key) = property_key(&literal[start..colon]) {
                        entries.push((key, literal[colon + 1..i].trim()));
                    }
                }
                start = i + 1;
                colon = None;
            }
            _ => {}
        }
    }
    entries
}

/// `name`, `'name'` or `"name"`; anything else (computed keys, spreads) is rejected.
fn property_key(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let quoted = raw
        .strip_prefix('\'')
        .and_then(|r| r.strip_suffix('\''))
        .or_else(|| raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')));
    if let Some(inner) = quoted {
        return Some(inner.to_string());
    }
    let is_ident = !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$');
    is_ident.then(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_braces_in_strings_and_comments() {
        let src = r#"x = { a: "}", /* } */ b: '{', // }
            c: { d: `}` } } trailing"#;
        let open = src.find('{').unwrap();
        let object = balanced_object(src, open).unwrap();
        assert!(object.ends_with("} }"));
        assert!(!object.contains("trailing"));
    }

    #[test]
    fn unbalanced_input_returns_none() {
        assert_eq!(balanced_object("{ a: { b: 1 }", 0), None);
        assert_eq!(balanced_object("a", 0), None);
    }

    #[test]
    fn mask_excludes_comments_and_string_bodies() {
        let src = "a // b\n'c' /* d */ e";
        let code: String = src
            .chars()
            .zip(code_mask(src))
            .filter_map(|(c, is_code)| is_code.then_some(c))
            .collect();
        assert_eq!(code, "a '  e");
    }

    #[test]
    fn entries_split_on_top_level_commas_only() {
        let literal = r#"{
            root: true,
            ...require('./base'),
            parserOptions: { tsconfigRootDir: __dirname, project: ['a', 'b'] },
            'react/jsx-key': ['warn', { checkFragmentShorthand: true }],
            "quoted": cond ? 'a' : 'b', // note: trailing
            method() { return 1; },
        }"#;
        let entries = object_entries(literal);
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["root", "parserOptions", "react/jsx-key", "quoted"]);
        assert_eq!(entries[0].1, "true");
        assert_eq!(entries[2].1, "['warn', { checkFragmentShorthand: true }]");
        assert_eq!(entries[3].1, "cond ? 'a' : 'b'");
    }
}
