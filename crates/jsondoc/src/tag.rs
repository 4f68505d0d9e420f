//! Field-name resolution from struct tags
//!
//! Computes the JSON key a member is encoded under, following the rules of
//! Go's `encoding/json`:
//!
//! - unexported members are never encoded
//! - `json:"-"` hides a member
//! - `json:"name"` renames it, an empty name keeps the Go name
//! - `json:",omitempty"` marks it optional

use crate::diagnostics::{JsonDocError, JsonDocResult};
use crate::types::is_exported;

/// Tag key holding the JSON options
pub const JSON_TAG_KEY: &str = "json";

/// Result of resolving a member name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldName {
    /// Member appears in JSON under this key
    Visible(JsonKey),
    /// Member is not encoded
    Suppressed,
}

/// Externally visible key of a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonKey {
    /// Key without quotes
    pub name: String,
    /// Set by `omitempty`
    pub optional: bool,
}

impl JsonKey {
    /// Key as a quoted JSON string, e.g. `"request_id"`
    pub fn quoted(&self) -> JsonDocResult<String> {
        Ok(serde_json::to_string(&self.name)?)
    }
}

/// Resolve the JSON key of a named member.
///
/// Visibility is checked first: an unexported member is suppressed whatever
/// its tag says.
pub fn resolve_field_name(name: &str, tag: Option<&str>) -> JsonDocResult<FieldName> {
    if !is_exported(name) {
        return Ok(FieldName::Suppressed);
    }
    let options = match tag {
        Some(tag) => lookup_tag(tag, JSON_TAG_KEY).map_err(|reason| {
            JsonDocError::MalformedAnnotation {
                member: name.to_string(),
                tag: tag.to_string(),
                reason,
            }
        })?,
        None => None,
    };
    Ok(match options {
        Some(value) => match parse_json_options(&value) {
            Some(key) => FieldName::Visible(JsonKey {
                name: if key.name.is_empty() {
                    name.to_string()
                } else {
                    key.name
                },
                optional: key.optional,
            }),
            None => FieldName::Suppressed,
        },
        None => FieldName::Visible(JsonKey {
            name: name.to_string(),
            optional: false,
        }),
    })
}

/// How an embedded member contributes to the enclosing object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedRule {
    /// Promote the embedded struct's fields
    Flatten,
    /// Tag gives it a name; encoded as a regular field
    Named(JsonKey),
    /// `json:"-"`
    Suppressed,
}

/// Resolve how an embedded member is encoded.
///
/// Embedded members are flattened even when their type is unexported, which
/// is what `encoding/json` does for embedded structs.
pub fn resolve_embedded(type_name: &str, tag: Option<&str>) -> JsonDocResult<EmbeddedRule> {
    let options = match tag {
        Some(tag) => lookup_tag(tag, JSON_TAG_KEY).map_err(|reason| {
            JsonDocError::MalformedAnnotation {
                member: type_name.to_string(),
                tag: tag.to_string(),
                reason,
            }
        })?,
        None => None,
    };
    Ok(match options.as_deref().map(parse_json_options) {
        None => EmbeddedRule::Flatten,
        Some(None) => EmbeddedRule::Suppressed,
        Some(Some(key)) if key.name.is_empty() => EmbeddedRule::Flatten,
        Some(Some(key)) => EmbeddedRule::Named(key),
    })
}

/// Split a `json` tag value into key and options; `None` means hidden
fn parse_json_options(value: &str) -> Option<JsonKey> {
    if value == "-" {
        return None;
    }
    let mut parts = value.split(',');
    let name = parts.next().unwrap_or_default().to_string();
    let optional = parts.any(|opt| opt == "omitempty");
    Some(JsonKey { name, optional })
}

/// Find `key` in a conventional struct tag (`key:"value" other:"value"`).
///
/// Returns the unquoted value, `Ok(None)` when the key is absent, or a
/// description of the syntax problem.
pub fn lookup_tag(tag: &str, key: &str) -> Result<Option<String>, String> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return Ok(None);
        }

        let colon = rest
            .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
            .unwrap_or(rest.len());
        if colon == 0 || !rest[colon..].starts_with(":\"") {
            return Err(format!("expected key:\"value\" at {:?}", rest));
        }
        let name = &rest[..colon];
        rest = &rest[colon + 1..];

        let end = closing_quote(rest).ok_or_else(|| format!("unterminated value for key {}", name))?;
        let quoted = &rest[..=end];
        rest = &rest[end + 1..];

        if name == key {
            return unquote(quoted).map(Some);
        }
    }
}

/// Byte index of the quote closing the string that starts at `s[0]`
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Unquote a double-quoted Go string literal
pub fn unquote(quoted: &str) -> Result<String, String> {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("not a quoted string: {}", quoted))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars
            .next()
            .ok_or_else(|| "trailing backslash".to_string())?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            other => return Err(format!("invalid escape \\{}", other)),
        }
    }
    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, String> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits {
        return Err(format!("short hex escape {:?}", hex));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid hex escape {:?}", hex))
}
