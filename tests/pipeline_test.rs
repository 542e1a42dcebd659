use std::sync::Arc;

use og_image_engine::core::assets::FontAssets;
use og_image_engine::core::content::escape_text;
use og_image_engine::core::request::{
    FileType, ParseError, Pattern, RawQuery, RenderRequest, RequestDefaults, parse_request,
};
use og_image_engine::core::template::DocumentCompiler;

fn compiler() -> DocumentCompiler {
    DocumentCompiler::new(
        Arc::new(FontAssets::from_bytes(b"regular", b"bold", b"mono")),
        "https://emoji.test/",
    )
}

fn parse(path: &str, query: &str) -> Result<RenderRequest, ParseError> {
    parse_request(
        path,
        &RawQuery::from_query_string(query),
        &RequestDefaults::default(),
    )
}

fn heading(html: &str) -> &str {
    let start = html.find(r#"<div class="heading">"#).expect("heading present");
    let rest = &html[start..];
    &rest[..rest.find("</div>").expect("heading closed")]
}

fn overlay_rule(html: &str) -> &str {
    let start = html.find(".overlay {").expect("overlay rule present");
    let rest = &html[start..];
    &rest[..rest.find('}').expect("overlay rule closed")]
}

#[test]
fn test_plain_text_request() {
    let req = parse("/Hello%20World.png", "").unwrap();
    assert_eq!(req.text, "Hello World");
    assert_eq!(req.file_type, FileType::Png);
    assert_eq!(req.pattern, Pattern::Cross);
    assert!(!req.md);

    let html = compiler().compile(&req);
    let heading = heading(&html);
    assert!(heading.contains("Hello World"));
    assert!(!heading["<div class=\"heading\">".len()..].contains('<'));
    assert!(!html.contains("<script"));
}

#[test]
fn test_dotted_text_with_markdown() {
    let req = parse("/a.b.c", "pattern=polka&md=1").unwrap();
    assert_eq!(req.text, "a.b");
    assert_eq!(req.file_type, FileType::Png);
    assert_eq!(req.pattern, Pattern::Polka);
    assert!(req.md);

    let html = compiler().compile(&req);
    assert!(html.contains(r#"<body class="polka">"#));
    assert!(heading(&html).contains("<p>a.b</p>"));
}

#[test]
fn test_repeated_pattern_is_malformed() {
    let err = parse("/x.png", "pattern=cross&pattern=polka").unwrap_err();
    assert_eq!(
        err,
        ParseError::MalformedRequest {
            key: "pattern".to_string()
        }
    );
}

#[test]
fn test_single_pattern_never_fails() {
    for value in ["", "none", "cross", "polka", "zigzag", "%3Cb%3E"] {
        assert!(parse("/x", &format!("pattern={value}")).is_ok(), "{value}");
    }
}

#[test]
fn test_script_in_plain_text_is_escaped() {
    let req = parse("/%3Cscript%3Ealert(1)%3C%2Fscript%3E.png", "").unwrap();
    assert_eq!(req.text, "<script>alert(1)</script>");

    let html = compiler().compile(&req);
    assert!(!html.contains("<script>"));
    assert!(heading(&html).contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[test]
fn test_script_in_markdown_is_removed() {
    let req = parse("/%3Cscript%3Ealert(1)%3C%2Fscript%3E", "md=true").unwrap();
    let html = compiler().compile(&req);
    assert!(!html.contains("<script"));
    assert!(!html.contains("alert(1)</script>"));
}

#[test]
fn test_overlay_rule_follows_overlay_value() {
    let empty = compiler().compile(&parse("/x", "overlay=").unwrap());
    assert!(!overlay_rule(&empty).contains("background-image"));

    let url = "https://example.com/overlay.svg";
    let with_image = compiler().compile(&parse("/x", &format!("overlay={url}")).unwrap());
    assert!(overlay_rule(&with_image).contains(&format!("background-image: url(\"{url}\");")));
}

#[test]
fn test_overlay_cannot_break_out_of_style() {
    let req = parse(
        "/x",
        "overlay=x%22);}%3C%2Fstyle%3E%3Cscript%3Ealert(1)%3C%2Fscript%3E",
    )
    .unwrap();
    let html = compiler().compile(&req);
    assert!(!html.contains("<script>"));
    assert!(!html.contains("</style><"));
    assert_eq!(html.matches("</style>").count(), 1);
}

#[test]
fn test_style_value_cannot_open_a_comment() {
    let req = parse("/x", "textStrongColor=red%20/*&textColor=%2523111%20/*&fontSize=1px/*").unwrap();
    let html = compiler().compile(&req);
    assert!(!html.contains("/*"));

    let start = html.find(".heading {").expect("heading rule present");
    let rule = &html[start..];
    let rule = &rule[..rule.find('}').expect("heading rule closed")];
    assert!(rule.contains("font-size: 1px/;"));
    assert!(rule.contains("color: #111 /;"));
    assert!(rule.contains("display: flex;"));
    assert!(overlay_rule(&html).contains("width: 1200px"));
}

#[test]
fn test_jpeg_only_for_literal_extension() {
    assert_eq!(parse("/x.jpeg", "").unwrap().file_type, FileType::Jpeg);
    assert_eq!(parse("/x.JPEG", "").unwrap().file_type, FileType::Png);
    assert_eq!(parse("/x.jpg", "").unwrap().file_type, FileType::Png);
}

#[test]
fn test_emoji_replaced_in_heading() {
    let req = parse("/Ship%20it%20%F0%9F%9A%80", "md=1").unwrap();
    let html = compiler().compile(&req);
    assert!(heading(&html).contains(r#"src="https://emoji.test/1f680.svg""#));
}

#[test]
fn test_markdown_strong_uses_strong_color() {
    let req = parse("/**Rust**", "md=1&textStrongColor=%2523ff0000").unwrap();
    let html = compiler().compile(&req);
    assert!(html.contains("<strong>Rust</strong>"));
    assert!(html.contains("color: #ff0000;"));
}

#[test]
fn test_sanitize_is_idempotent() {
    for input in ["<b>", "a & b", "\"'", "&lt;already&gt;", "😀 & <>"] {
        let once = escape_text(input);
        assert_eq!(escape_text(&once), once);
    }
}

#[test]
fn test_concurrent_compiles_do_not_interfere() {
    let compiler = Arc::new(compiler());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let compiler = compiler.clone();
            std::thread::spawn(move || {
                let req = parse(&format!("/request-{i}.png"), "").unwrap();
                (i, compiler.compile(&req))
            })
        })
        .collect();

    for handle in handles {
        let (i, html) = handle.join().unwrap();
        assert!(heading(&html).contains(&format!("request-{i}")));
        for other in (0..8).filter(|other| *other != i) {
            assert!(!html.contains(&format!("request-{other}<")));
        }
    }
}
