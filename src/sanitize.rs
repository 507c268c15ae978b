//! Client-side text sanitization.
//!
//! `escape_html` is the routine every piece of server or error text passes
//! through before it is embedded in markup. `strip_dangerous` is a
//! best-effort filter applied to free-text inputs on every keystroke; it is
//! a blocklist and therefore incomplete, so nothing relies on it for safety.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^<]*(?:<[^<]*)*?</script>").expect("script pattern is valid")
});

static JS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("scheme pattern is valid"));

static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+=").expect("handler pattern is valid"));

/// Escape text for embedding in HTML element content or a quoted attribute.
///
/// # Arguments
/// * `input` - Untrusted text
///
/// # Returns
/// * `String` - Text with `&`, `<`, `>`, `"` and `'` replaced by entities
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Remove obvious script, `javascript:` and inline event-handler patterns
/// from a free-text input value.
///
/// # Arguments
/// * `input` - Current value of the text field
///
/// # Returns
/// * `String` - Value with the matched patterns removed
pub fn strip_dangerous(input: &str) -> String {
    let value = SCRIPT_BLOCK.replace_all(input, "");
    let value = JS_SCHEME.replace_all(&value, "");
    EVENT_HANDLER.replace_all(&value, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_script() {
        assert_eq!(
            escape_html("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_escape_html_quotes_and_ampersand() {
        assert_eq!(
            escape_html(r#"Tom & "Jerry" 'Co'"#),
            "Tom &amp; &quot;Jerry&quot; &#39;Co&#39;"
        );
        assert_eq!(escape_html("Иванов Пётр"), "Иванов Пётр");
    }

    #[test]
    fn test_strip_script_block() {
        assert_eq!(strip_dangerous("Ivan<script>alert(1)</script>ov"), "Ivanov");
        assert_eq!(strip_dangerous("<SCRIPT src=x>a</SCRIPT>b"), "b");
    }

    #[test]
    fn test_strip_scheme_and_handlers() {
        assert_eq!(strip_dangerous("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(strip_dangerous("<img onerror=x>"), "<img x>");
    }

    #[test]
    fn test_strip_leaves_plain_text() {
        assert_eq!(strip_dangerous("Petrov 5/2"), "Petrov 5/2");
        assert_eq!(strip_dangerous(""), "");
    }
}
