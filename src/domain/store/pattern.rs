//! Redis-style glob patterns for key scans

use regex::Regex;

use crate::domain::DomainError;

/// A compiled glob pattern with Redis `KEYS`/`SCAN MATCH` semantics
///
/// Supported syntax: `*` (any run), `?` (any single char), `[abc]`,
/// `[a-z]`, `[^a]` and `\x` to match `x` literally. The pattern must
/// match the whole key.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, DomainError> {
        let raw = pattern.into();
        let translated = translate(&raw)?;
        let regex = Regex::new(&translated)
            .map_err(|e| DomainError::validation(format!("Invalid pattern '{}': {}", raw, e)))?;

        Ok(Self { raw, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

/// Escapes glob metacharacters so `literal` only matches itself
pub fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());

    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

fn translate(glob: &str) -> Result<String, DomainError> {
    let mut out = String::from("(?s)^");
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => match chars.next() {
                Some(next) => out.push_str(&regex::escape(&next.to_string())),
                None => out.push_str(r"\\"),
            },
            '[' => {
                let mut class = String::from("[");

                if chars.peek() == Some(&'^') {
                    chars.next();
                    class.push('^');
                }

                let mut members = 0usize;
                let mut closed = false;

                while let Some(m) = chars.next() {
                    match m {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            let Some(next) = chars.next() else { break };
                            class.push_str(&regex::escape(&next.to_string()));
                        }
                        '-' if members > 0 && chars.peek().is_some_and(|p| *p != ']') => {
                            class.push('-');
                        }
                        other => class.push_str(&regex::escape(&other.to_string())),
                    }
                    members += 1;
                }

                if !closed || members == 0 {
                    return Err(DomainError::validation(format!(
                        "Invalid pattern '{}': unterminated or empty character class",
                        glob
                    )));
                }

                class.push(']');
                out.push_str(&class);
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    Ok(out)
}
