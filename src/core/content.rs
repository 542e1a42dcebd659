use std::collections::{HashMap, HashSet};

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::Options;

/// Converts user markdown into HTML.
pub trait MarkdownRenderer: Send + Sync {
    fn render_markdown(&self, markdown: &str) -> String;
}

/// Makes user-controlled strings safe to embed in the document.
pub trait Sanitizer: Send + Sync {
    /// Escapes `text` so no character can be read as markup.
    fn sanitize(&self, text: &str) -> String;

    /// Strips dangerous elements and attributes from already rendered HTML.
    fn clean(&self, html: &str) -> String;

    /// Makes a value safe to place inside a declaration of the `<style>` block.
    fn sanitize_style(&self, value: &str) -> String;
}

/// Replaces emoji in text nodes with image references.
pub trait Emojifier: Send + Sync {
    fn emojify(&self, html: &str) -> String;
}

pub struct ComrakMarkdown {
    options: Options<'static>,
}

impl Default for ComrakMarkdown {
    fn default() -> Self {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        Self { options }
    }
}

impl MarkdownRenderer for ComrakMarkdown {
    fn render_markdown(&self, markdown: &str) -> String {
        comrak::markdown_to_html(markdown, &self.options)
    }
}

pub struct AmmoniaSanitizer {
    builder: AmmoniaBuilder<'static>,
}

impl Default for AmmoniaSanitizer {
    fn default() -> Self {
        let mut builder = AmmoniaBuilder::default();
        builder.tags(HashSet::from([
            "a",
            "blockquote",
            "br",
            "code",
            "del",
            "em",
            "h1",
            "h2",
            "h3",
            "h4",
            "h5",
            "h6",
            "hr",
            "li",
            "ol",
            "p",
            "pre",
            "strong",
            "ul",
        ]));
        builder.generic_attributes(HashSet::new());
        builder.tag_attributes(HashMap::from([("a", HashSet::from(["href"]))]));
        Self { builder }
    }
}

impl Sanitizer for AmmoniaSanitizer {
    fn sanitize(&self, text: &str) -> String {
        escape_text(text)
    }

    fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }

    fn sanitize_style(&self, value: &str) -> String {
        css_value(value)
    }
}

/// `&name;`, `&#123;` or `&#x1F;` at the start of `s` (which begins with `&`).
fn starts_with_reference(s: &str) -> bool {
    let Some(end) = s[1..].find(';') else {
        return false;
    };
    let body = &s[1..1 + end];
    if let Some(number) = body.strip_prefix('#') {
        match number.strip_prefix(['x', 'X']) {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()),
        }
    } else {
        body.starts_with(|c: char| c.is_ascii_alphabetic())
            && body.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

/// HTML-escapes `text`. Existing character references are kept as they are, so escaping twice
/// gives the same result as escaping once.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '&' if !starts_with_reference(&text[i..]) => out.push_str("&amp;"),
            c => out.push(c),
        }
    }
    out
}

/// Drops every character that could end the string, declaration, rule or `<style>` element a
/// value is written into, and `*` so no comment can swallow the rules that follow. Character
/// references are not decoded inside `<style>`, so nothing is escaped.
pub fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | ';' | '{' | '}' | '\\' | '*') && !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_markup() {
        assert_eq!(
            escape_text("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_text(r#"a "b" & c"#), "a &quot;b&quot; &amp; c");
        assert_eq!(escape_text("Hello World"), "Hello World");
    }

    #[test]
    fn test_escape_text_keeps_references() {
        assert_eq!(escape_text("&amp; &#39; &#x1F600; &copy;"), "&amp; &#39; &#x1F600; &copy;");
        assert_eq!(escape_text("&; &#; &#x; &1a; & b;"), "&amp;; &amp;#; &amp;#x; &amp;1a; &amp; b;");
    }

    #[test]
    fn test_escape_text_is_idempotent() {
        for input in [
            "",
            "plain",
            "<b>bold</b>",
            "Tom & Jerry",
            "&&&",
            "\"quoted\" 'single'",
            "a &lt; b",
            "日本語 😀 <",
            "&#",
        ] {
            let once = escape_text(input);
            assert_eq!(escape_text(&once), once, "{input}");
        }
    }

    #[test]
    fn test_css_value_strips_breakouts() {
        assert_eq!(css_value("96px; } body { color: red"), "96px  body  color: red");
        assert_eq!(css_value("#fff\n"), "#fff");
        assert_eq!(css_value("rgb(1, 2, 3)"), "rgb(1, 2, 3)");
        assert_eq!(
            css_value(r#"x");</style><script>"#),
            "x)/stylescript"
        );
        assert_eq!(css_value("red /*"), "red /");
        assert_eq!(css_value("*/ red /* x */"), "/ red / x /");
        assert_eq!(
            css_value("https://example.com/o.png?a=1&b=2"),
            "https://example.com/o.png?a=1&b=2"
        );
    }

    #[test]
    fn test_css_value_is_idempotent() {
        for input in ["96px", "#fff;}", "<'\"\\>", "url(a&b)", "a/**/b"] {
            let once = css_value(input);
            assert_eq!(css_value(&once), once);
        }
    }

    #[test]
    fn test_markdown_structures() {
        let html = ComrakMarkdown::default().render_markdown(
            "**bold** _em_ `code`\n\n> quote\n\n- item\n\n```\nfenced\n```\n\n[link](https://example.com)",
        );
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>em</em>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<li>item</li>"));
        assert!(html.contains("<pre><code>fenced\n</code></pre>"));
        assert!(html.contains(r#"<a href="https://example.com">link</a>"#));
    }

    #[test]
    fn test_markdown_omits_raw_html() {
        let html = ComrakMarkdown::default().render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_clean_strips_dangerous_markup() {
        let sanitizer = AmmoniaSanitizer::default();
        let cleaned = sanitizer.clean(
            r#"<p onclick="x()">hi <strong>there</strong><script>alert(1)</script><a href="javascript:x()">j</a></p>"#,
        );
        assert!(!cleaned.contains("<script"));
        assert!(!cleaned.contains("onclick"));
        assert!(!cleaned.contains("javascript:"));
        assert!(cleaned.contains("<strong>there</strong>"));
    }
}
