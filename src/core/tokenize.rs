//! core::tokenize
//!
//! Splits a command line into tokens.
//!
//! # Rules
//!
//! - Whitespace outside quotes separates tokens
//! - `"` or `'` opens a quoted span that ends at the same quote character
//! - Inside quotes, a backslash takes the next character literally
//! - A quoted span may sit inside a token: `--Name="Le Monde"` is one token
//! - An empty quoted span is a zero-length token, not a dropped one
//! - An unterminated quote runs to the end of the input
//!
//! Tokenizing never fails.

/// Split `line` into tokens.
///
/// # Example
///
/// ```
/// use seedline::core::tokenize::tokenize;
///
/// assert_eq!(tokenize("add language en English"), ["add", "language", "en", "English"]);
/// assert_eq!(tokenize(r#"add book b1 "War and Peace""#), ["add", "book", "b1", "War and Peace"]);
/// assert_eq!(tokenize(r#"set '' "it's""#), ["set", "", "it's"]);
/// assert_eq!(tokenize(r#"--Title="Le Monde""#), ["--Title=Le Monde"]);
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted span makes a token even when it adds no characters.
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) if c == '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    tracing::trace!(line, count = tokens.len(), "tokenized command line");
    tokens
}

/// Quote `text` so that [`tokenize`] reads it back as a single token.
///
/// Text without whitespace or quote characters is returned unchanged.
///
/// # Example
///
/// ```
/// use seedline::core::tokenize::{quote, tokenize};
///
/// assert_eq!(quote("English"), "English");
/// assert_eq!(quote("War and Peace"), "\"War and Peace\"");
/// assert_eq!(quote(""), "\"\"");
/// assert_eq!(tokenize(&quote(r#"say "hi""#)), [r#"say "hi""#]);
/// ```
pub fn quote(text: &str) -> String {
    if !needs_quoting(text) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Whether `text` must be quoted to survive tokenizing as one token.
pub fn needs_quoting(text: &str) -> bool {
    text.is_empty() || text.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_lines() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn trailing_whitespace_adds_no_token() {
        assert_eq!(tokenize("add language  en   "), ["add", "language", "en"]);
    }

    #[test]
    fn quotes_are_not_interchangeable() {
        assert_eq!(tokenize(r#""it's here""#), ["it's here"]);
        assert_eq!(tokenize(r#"'say "hi"'"#), [r#"say "hi""#]);
    }

    #[test]
    fn backslash_escapes_inside_quotes_only() {
        assert_eq!(tokenize(r#""a\"b""#), [r#"a"b"#]);
        assert_eq!(tokenize(r"C:\path"), [r"C:\path"]);
        assert_eq!(tokenize(r#""C:\\path""#), [r"C:\path"]);
    }

    #[test]
    fn empty_quoted_span_is_kept() {
        assert_eq!(tokenize(r#"a "" b"#), ["a", "", "b"]);
        assert_eq!(tokenize("''"), [""]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(tokenize(r#"add "War and"#), ["add", "War and"]);
    }

    #[test]
    fn adjacent_spans_join() {
        assert_eq!(tokenize(r#"ab"c d"'e'"#), ["abc de"]);
    }

    #[test]
    fn quote_escapes_backslashes() {
        let text = r#"a \ "b""#;
        assert_eq!(tokenize(&quote(text)), [text]);
    }
}
