use std::sync::Arc;

use super::assets::FontAssets;
use super::content::{AmmoniaSanitizer, ComrakMarkdown, Emojifier, MarkdownRenderer, Sanitizer};
use super::emoji::Twemoji;
use super::request::RenderRequest;
use super::style::{StyleValues, build_css};

/// Compiles a [`RenderRequest`] into a standalone HTML document.
///
/// Holds only read-only state, so one instance can serve any number of requests at once.
pub struct DocumentCompiler {
    fonts: Arc<FontAssets>,
    markdown: Box<dyn MarkdownRenderer>,
    sanitizer: Box<dyn Sanitizer>,
    emoji: Box<dyn Emojifier>,
}

impl DocumentCompiler {
    /// Comrak, ammonia and twemoji backed compiler.
    pub fn new(fonts: Arc<FontAssets>, emoji_base_url: &str) -> Self {
        Self::with_capabilities(
            fonts,
            Box::new(ComrakMarkdown::default()),
            Box::new(AmmoniaSanitizer::default()),
            Box::new(Twemoji::new(emoji_base_url)),
        )
    }

    pub fn with_capabilities(
        fonts: Arc<FontAssets>,
        markdown: Box<dyn MarkdownRenderer>,
        sanitizer: Box<dyn Sanitizer>,
        emoji: Box<dyn Emojifier>,
    ) -> Self {
        Self {
            fonts,
            markdown,
            sanitizer,
            emoji,
        }
    }

    fn render_content(&self, request: &RenderRequest) -> String {
        let html = if request.md {
            let rendered = self.markdown.render_markdown(&request.text);
            self.sanitizer.clean(&rendered)
        } else {
            self.sanitizer.sanitize(&request.text)
        };
        self.emoji.emojify(&html)
    }

    pub fn compile(&self, request: &RenderRequest) -> String {
        let content = self.render_content(request);

        let font_size = self.sanitizer.sanitize_style(&request.font_size);
        let text_color = self.sanitizer.sanitize_style(&request.text_color);
        let text_strong_color = self.sanitizer.sanitize_style(&request.text_strong_color);
        let overlay = self.sanitizer.sanitize_style(&request.overlay);

        let css = build_css(
            &self.fonts,
            request.pattern,
            &StyleValues {
                font_size: &font_size,
                text_color: &text_color,
                text_strong_color: &text_strong_color,
                overlay: &overlay,
            },
        );

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Generated Image</title>
    <style>
        {}
    </style>
</head>
<body class="{}">
    <div class="overlay">
        <div class="heading">{}</div>
    </div>
</body>
</html>"#,
            css,
            request.pattern.as_str(),
            content
        )
    }
}
