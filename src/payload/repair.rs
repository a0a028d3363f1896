//! Best-effort recovery of string-escaped JSON bodies.
//!
//! Some callers serialize their message payload twice, so the proxy receives
//! `"{\"text\":\"hi\"}"` or `{\"text\":\"hi\"}` instead of `{"text":"hi"}`.
//! Repair undoes exactly one level of that:
//!
//! 1. decode backslash escapes once,
//! 2. strip one optional pair of surrounding double quotes,
//! 3. strict JSON parse.
//!
//! Everything here is pure; the HTTP layer only decides when to call it.

use serde_json::Value;

/// Why a body could not be recovered.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("invalid escape sequence at offset {0}")]
    Escape(usize),
    #[error("still not JSON after unescaping: {0}")]
    Json(#[from] serde_json::Error),
}

/// Attempt to recover a JSON document from a one-level escaped body.
pub fn attempt_repair(raw: &str) -> Result<Value, RepairError> {
    let unescaped = unescape(raw)?;
    let candidate = strip_quotes(&unescaped);
    Ok(serde_json::from_str(candidate)?)
}

/// Strip one leading and one trailing `"` when both are present.
pub fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

/// Decode one level of backslash escapes.
///
/// Recognizes the usual single-character escapes, octal `\ooo`, `\xHH`,
/// `\uHHHH` (surrogate pairs joined) and `\UHHHHHHHH`. Unknown escapes are
/// kept verbatim. Truncated, out-of-range or lone-surrogate numeric escapes
/// are an error.
pub fn unescape(raw: &str) -> Result<String, RepairError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some((_, escape)) = chars.next() else {
            // Trailing lone backslash.
            return Err(RepairError::Escape(offset));
        };

        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut code = escape.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|(_, d)| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or(RepairError::Escape(offset))?);
            }
            'x' => out.push(to_char(read_hex(&mut chars, 2, offset)?, offset)?),
            'u' => {
                let code = read_hex(&mut chars, 4, offset)?;
                out.push(to_char(combine_surrogates(&mut chars, code, offset)?, offset)?);
            }
            'U' => out.push(to_char(read_hex(&mut chars, 8, offset)?, offset)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn read_hex(chars: &mut Chars<'_>, digits: usize, offset: usize) -> Result<u32, RepairError> {
    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|(_, d)| d.to_digit(16))
            .ok_or(RepairError::Escape(offset))?;
        code = code * 16 + digit;
    }
    Ok(code)
}

/// Join a `\uD8xx` high surrogate with an immediately following `\uDCxx`.
///
/// Anything else is returned unchanged; a lone surrogate then fails in
/// [`to_char`].
fn combine_surrogates(chars: &mut Chars<'_>, high: u32, offset: usize) -> Result<u32, RepairError> {
    if !(0xD800..=0xDBFF).contains(&high) {
        return Ok(high);
    }

    let mut lookahead = chars.clone();
    let introduces_escape = matches!(lookahead.next(), Some((_, '\\')))
        && matches!(lookahead.next(), Some((_, 'u')));
    if !introduces_escape {
        return Ok(high);
    }
    let low = read_hex(&mut lookahead, 4, offset)?;
    if !(0xDC00..=0xDFFF).contains(&low) {
        return Ok(high);
    }

    *chars = lookahead;
    Ok(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

fn to_char(code: u32, offset: usize) -> Result<char, RepairError> {
    char::from_u32(code).ok_or(RepairError::Escape(offset))
}
