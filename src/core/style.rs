use super::assets::FontAssets;
use super::request::Pattern;

pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 630;

/// Style values that already went through sanitization.
pub struct StyleValues<'a> {
    pub font_size: &'a str,
    pub text_color: &'a str,
    pub text_strong_color: &'a str,
    pub overlay: &'a str,
}

fn font_faces(fonts: &FontAssets) -> String {
    format!(
        r#"
    @import url('https://fonts.googleapis.com/css?family=M+PLUS+1p');

    @font-face {{
        font-family: 'Inter';
        font-style: normal;
        font-weight: normal;
        src: url(data:font/woff2;charset=utf-8;base64,{}) format('woff2');
    }}

    @font-face {{
        font-family: 'Inter';
        font-style: normal;
        font-weight: bold;
        src: url(data:font/woff2;charset=utf-8;base64,{}) format('woff2');
    }}

    @font-face {{
        font-family: 'Vera';
        font-style: normal;
        font-weight: normal;
        src: url(data:font/woff2;charset=utf-8;base64,{}) format('woff2');
    }}
"#,
        fonts.regular, fonts.bold, fonts.mono
    )
}

fn background(pattern: Pattern) -> &'static str {
    match pattern {
        Pattern::None => {
            r#"
    body.none {
        background-color: #ffffff;
    }
"#
        }
        Pattern::Cross => {
            r#"
    body.cross {
        background-color: #ffffff;
        background: radial-gradient(circle, transparent 20%, #ffffff 20%, #ffffff 80%, transparent 80%, transparent), radial-gradient(circle, transparent 20%, #ffffff 20%, #ffffff 80%, transparent 80%, transparent) 40px 40px, linear-gradient(#dbdbdb 3.2px, transparent 3.2px) 0 -1.6px, linear-gradient(90deg, #dbdbdb 3.2px, #ffffff 3.2px) -1.6px 0;
        background-size: 80px 80px, 80px 80px, 40px 40px, 40px 40px;
    }
"#
        }
        Pattern::Polka => {
            r#"
    body.polka {
        background-color: #ffffff;
        background-image: radial-gradient(#dbdbdb 0.8px, transparent 0.8px), radial-gradient(#dbdbdb 0.8px, #ffffff 0.8px);
        background-size: 32px 32px;
        background-position: 0 0, 16px 16px;
    }
"#
        }
    }
}

fn overlay_rule(overlay: &str) -> String {
    let image = if overlay.is_empty() {
        String::new()
    } else {
        format!(
            "\n        background-image: url(\"{}\");\n        background-size: cover;\n        background-position: center;\n        background-repeat: no-repeat;",
            overlay
        )
    };
    format!(
        r#"
    .overlay {{
        position: absolute;
        top: 0;
        left: 0;
        width: {}px;
        height: {}px;
        display: flex;
        align-items: center;
        justify-content: center;{}
    }}
"#,
        CANVAS_WIDTH, CANVAS_HEIGHT, image
    )
}

/// Builds the contents of the document's `<style>` block.
pub fn build_css(fonts: &FontAssets, pattern: Pattern, values: &StyleValues<'_>) -> String {
    let mut css = font_faces(fonts);

    css.push_str(
        r#"
    * {
        margin: 0;
        padding: 0;
        box-sizing: border-box;
    }

    body {
        width: 1200px;
        height: 630px;
        overflow: hidden;
        display: flex;
        text-align: center;
        align-items: center;
        justify-content: center;
    }
"#,
    );

    css.push_str(background(pattern));

    css.push_str(&format!(
        r#"
    strong {{
        color: {};
    }}

    code {{
        color: #D400FF;
        font-family: 'Vera';
        white-space: pre-wrap;
        letter-spacing: -5px;
    }}

    code:before, code:after {{
        content: '`';
    }}

    pre code:before, pre code:after {{
        content: none;
    }}

    .emoji {{
        height: 1em;
        width: 1em;
        margin: 0 .05em 0 .1em;
        vertical-align: -0.1em;
    }}
"#,
        values.text_strong_color
    ));

    css.push_str(&overlay_rule(values.overlay));

    css.push_str(&format!(
        r#"
    .heading {{
        font-family: 'M PLUS 1p', 'Inter', sans-serif;
        font-size: {};
        font-style: normal;
        color: {};
        line-height: 1.8;
        max-width: {}px;
        padding: 0 80px;
        display: flex;
        flex-direction: column;
        align-items: center;
        justify-content: center;
    }}
"#,
        values.font_size, values.text_color, CANVAS_WIDTH
    ));

    css
}
