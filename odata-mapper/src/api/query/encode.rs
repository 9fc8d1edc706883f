//! URL encoding that keeps OData literal syntax intact

const LITERAL_PREFIXES: [&str; 2] = ["datetime", "guid"];

/// Percent-encode everything except ASCII alphanumerics and `. - * _`
pub fn encode_all(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        match ch {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '*' | '_') => out.push(c),
            '~' => out.push_str("%7E"),
            c => out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf))),
        }
    }
    out
}

/// Encode a key or parameter value for use in a URL.
///
/// A leading `$`, enclosing `'...'` quotes and the `datetime'...'` / `guid'...'`
/// literal wrappers are kept; only the text inside is encoded.
///
/// ```
/// use odata_mapper::api::query::encode;
///
/// assert_eq!(encode("'Hello World!'"), "'Hello%20World%21'");
/// assert_eq!(encode("$variable$"), "$variable%24");
/// ```
pub fn encode(text: &str) -> String {
    let (lead, rest) = match text.strip_prefix('$') {
        Some(rest) => ("$", rest),
        None => ("", text),
    };
    match split_literal(rest) {
        Some((prefix, inner)) => format!("{}{}'{}'", lead, prefix, encode_all(inner)),
        None => format!("{}{}", lead, encode_all(rest)),
    }
}

/// `(prefix, inner)` for `'inner'`, `datetime'inner'` or `guid'inner'`
fn split_literal(text: &str) -> Option<(&str, &str)> {
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return Some(("", &text[1..text.len() - 1]));
    }
    LITERAL_PREFIXES.iter().find_map(|prefix| {
        let head = text.get(..prefix.len())?;
        let quoted = text.get(prefix.len()..)?;
        if head.eq_ignore_ascii_case(prefix)
            && quoted.len() >= 2
            && quoted.starts_with('\'')
            && quoted.ends_with('\'')
        {
            Some((head, &quoted[1..quoted.len() - 1]))
        } else {
            None
        }
    })
}
