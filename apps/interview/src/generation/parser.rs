//! Response Parser — turns raw model text into the key→text Result Mapping.
//!
//! The prompt instructs the model to emit a flat mapping literal of quoted
//! strings. This module parses exactly that grammar and nothing more; model
//! output is untrusted, so there is no generic evaluation of any kind. A
//! response that violates the grammar degrades into a single fallback entry
//! holding the raw text — parsing never fails a round.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::warn;

/// The accumulated key→text mapping for one generation session.
/// BTreeMap keeps artifact serialization deterministic.
pub type ResultMapping = BTreeMap<String, String>;

/// Prefix of the synthetic key produced when a response cannot be parsed.
pub const UNPARSED_PAYLOAD_PREFIX: &str = "UnparsedPayload";

/// Parses one round's response text.
///
/// On any grammar violation the full raw text is preserved under a
/// `UnparsedPayload<timestamp>` key so a human can salvage it from the cached
/// round artifact. The returned mapping is structurally valid either way; no
/// semantic validation (Q/A pairing, key grammar) happens here.
pub fn parse_response(response_text: &str) -> ResultMapping {
    match parse_mapping_literal(strip_code_fences(response_text)) {
        Ok(mapping) => mapping,
        Err(reason) => {
            warn!(%reason, "response did not match the mapping grammar, keeping raw payload");
            let key = format!(
                "{UNPARSED_PAYLOAD_PREFIX}{}",
                Utc::now().format("%Y%m%d%H%M%S%6f")
            );
            ResultMapping::from([(key, response_text.to_string())])
        }
    }
}

/// Strips ```json ... ``` / ``` ... ``` fences some models wrap output in.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag on the opening fence line, if any.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").map(str::trim).unwrap_or(text)
}

/// Strict scanner for `{ "key": "value", ... }`. Both single- and
/// double-quoted strings are accepted (models emit either), along with a
/// trailing comma. Anything else is a grammar violation.
fn parse_mapping_literal(text: &str) -> Result<ResultMapping, String> {
    let mut scanner = Scanner::new(text);
    let mut mapping = ResultMapping::new();

    scanner.skip_whitespace();
    scanner.expect('{')?;

    loop {
        scanner.skip_whitespace();
        if scanner.consume('}') {
            break;
        }
        let key = scanner.parse_string()?;
        scanner.skip_whitespace();
        scanner.expect(':')?;
        scanner.skip_whitespace();
        let value = scanner.parse_string()?;
        mapping.insert(key, value);

        scanner.skip_whitespace();
        if scanner.consume(',') {
            continue;
        }
        scanner.expect('}')?;
        break;
    }

    scanner.skip_whitespace();
    if !scanner.at_end() {
        return Err("trailing content after closing brace".to_string());
    }
    Ok(mapping)
}

struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Scanner {
            chars: text.chars().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn consume(&mut self, expected: char) -> bool {
        self.chars.next_if_eq(&expected).is_some()
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected '{expected}', found '{c}'")),
            None => Err(format!("expected '{expected}', found end of input")),
        }
    }

    /// Parses one quoted string, honoring the escapes models actually emit.
    fn parse_string(&mut self) -> Result<String, String> {
        let quote = match self.chars.next() {
            Some(c @ ('"' | '\'')) => c,
            Some(c) => return Err(format!("expected a quoted string, found '{c}'")),
            None => return Err("expected a quoted string, found end of input".to_string()),
        };

        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => value.push(self.parse_escape()?),
                Some(c) => value.push(c),
                None => return Err("unterminated string".to_string()),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, String> {
        match self.chars.next() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .chars
                        .next()
                        .and_then(|c| c.to_digit(16))
                        .ok_or_else(|| "invalid \\u escape".to_string())?;
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or_else(|| "invalid \\u escape".to_string())
            }
            Some(c @ ('\\' | '\'' | '"' | '/')) => Ok(c),
            Some(c) => Err(format!("unsupported escape '\\{c}'")),
            None => Err("dangling escape at end of input".to_string()),
        }
    }
}
