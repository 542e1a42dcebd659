//! Twemoji-style emoji substitution.
//!
//! Emoji sequences in text nodes are swapped for `<img class="emoji">` tags that point at one
//! image per codepoint sequence. Markup between `<` and `>` is copied through untouched.

use super::content::Emojifier;

pub const DEFAULT_EMOJI_BASE_URL: &str = "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/svg/";
pub const DEFAULT_EMOJI_EXTENSION: &str = ".svg";

const ZWJ: char = '\u{200D}';
const VS16: char = '\u{FE0F}';
const KEYCAP: char = '\u{20E3}';

/// BMP symbols that render as emoji without a variation selector.
const BMP_EMOJI_PRESENTATION: &[char] = &[
    '\u{231A}', '\u{231B}', '\u{23E9}', '\u{23EA}', '\u{23EB}', '\u{23EC}', '\u{23F0}', '\u{23F3}',
    '\u{25FD}', '\u{25FE}', '\u{2614}', '\u{2615}', '\u{2648}', '\u{2649}', '\u{264A}', '\u{264B}',
    '\u{264C}', '\u{264D}', '\u{264E}', '\u{264F}', '\u{2650}', '\u{2651}', '\u{2652}', '\u{2653}',
    '\u{267F}', '\u{2693}', '\u{26A1}', '\u{26AA}', '\u{26AB}', '\u{26BD}', '\u{26BE}', '\u{26C4}',
    '\u{26C5}', '\u{26CE}', '\u{26D4}', '\u{26EA}', '\u{26F2}', '\u{26F3}', '\u{26F5}', '\u{26FA}',
    '\u{26FD}', '\u{2705}', '\u{270A}', '\u{270B}', '\u{2728}', '\u{274C}', '\u{274E}', '\u{2753}',
    '\u{2754}', '\u{2755}', '\u{2757}', '\u{2795}', '\u{2796}', '\u{2797}', '\u{27B0}', '\u{27BF}',
    '\u{2B1B}', '\u{2B1C}', '\u{2B50}', '\u{2B55}',
];

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

fn is_tag(c: char) -> bool {
    ('\u{E0020}'..='\u{E007F}').contains(&c)
}

fn is_emoji_presentation(c: char) -> bool {
    ('\u{1F000}'..='\u{1FAFF}').contains(&c) || BMP_EMOJI_PRESENTATION.contains(&c)
}

/// Symbols that only become emoji when followed by U+FE0F.
fn is_text_presentation(c: char) -> bool {
    matches!(
        c,
        '\u{00A9}'
            | '\u{00AE}'
            | '\u{203C}'
            | '\u{2049}'
            | '\u{2122}'
            | '\u{2139}'
            | '\u{2194}'..='\u{21AA}'
            | '\u{2300}'..='\u{23FF}'
            | '\u{24C2}'
            | '\u{25AA}'..='\u{25FE}'
            | '\u{2600}'..='\u{27BF}'
            | '\u{2934}'
            | '\u{2935}'
            | '\u{2B05}'..='\u{2B55}'
            | '\u{3030}'
            | '\u{303D}'
            | '\u{3297}'
            | '\u{3299}'
    )
}

/// Returns the end (exclusive) of the single emoji element starting at `i`.
fn scan_element(chars: &[char], i: usize) -> Option<usize> {
    let c = *chars.get(i)?;

    if matches!(c, '0'..='9' | '#' | '*') {
        let mut j = i + 1;
        if chars.get(j) == Some(&VS16) {
            j += 1;
        }
        return (chars.get(j) == Some(&KEYCAP)).then_some(j + 1);
    }

    if is_regional_indicator(c) {
        return match chars.get(i + 1) {
            Some(&next) if is_regional_indicator(next) => Some(i + 2),
            _ => None,
        };
    }

    let mut j = i + 1;
    let selected = chars.get(j) == Some(&VS16);
    if !is_emoji_presentation(c) && !(selected && is_text_presentation(c)) {
        return None;
    }
    if selected {
        j += 1;
    }
    if chars.get(j).is_some_and(|&m| is_skin_tone(m)) {
        j += 1;
    }
    while chars.get(j).is_some_and(|&t| is_tag(t)) {
        j += 1;
    }
    Some(j)
}

/// Returns the end (exclusive) of the full emoji sequence, following ZWJ joins.
fn scan_sequence(chars: &[char], start: usize) -> Option<usize> {
    let mut end = scan_element(chars, start)?;
    while chars.get(end) == Some(&ZWJ) {
        match scan_element(chars, end + 1) {
            Some(next) => end = next,
            None => break,
        }
    }
    Some(end)
}

/// Lower-case hex codepoints joined by `-`. U+FE0F is dropped unless the sequence has a ZWJ.
pub fn codepoints(sequence: &[char]) -> String {
    let keep_selector = sequence.contains(&ZWJ);
    sequence
        .iter()
        .filter(|&&c| keep_selector || c != VS16)
        .map(|&c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone)]
pub struct Twemoji {
    base_url: String,
    extension: String,
}

impl Default for Twemoji {
    fn default() -> Self {
        Self::new(DEFAULT_EMOJI_BASE_URL)
    }
}

impl Twemoji {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            extension: DEFAULT_EMOJI_EXTENSION.to_string(),
        }
    }

    fn push_image(&self, out: &mut String, sequence: &[char]) {
        let alt: String = sequence.iter().collect();
        out.push_str(&format!(
            r#"<img class="emoji" draggable="false" alt="{}" src="{}{}{}">"#,
            alt,
            self.base_url,
            codepoints(sequence),
            self.extension
        ));
    }

    fn replace_text(&self, text: &[char], out: &mut String) {
        let mut i = 0;
        while i < text.len() {
            match scan_sequence(text, i) {
                Some(end) => {
                    self.push_image(out, &text[i..end]);
                    i = end;
                }
                None => {
                    out.push(text[i]);
                    i += 1;
                }
            }
        }
    }
}

impl Emojifier for Twemoji {
    fn emojify(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut text: Vec<char> = Vec::new();
        let mut in_tag = false;
        let mut quote: Option<char> = None;

        for c in html.chars() {
            if in_tag {
                out.push(c);
                match (quote, c) {
                    (Some(q), c) if c == q => quote = None,
                    (Some(_), _) => {}
                    (None, '"' | '\'') => quote = Some(c),
                    (None, '>') => in_tag = false,
                    _ => {}
                }
            } else if c == '<' {
                self.replace_text(&text, &mut out);
                text.clear();
                out.push(c);
                in_tag = true;
            } else {
                text.push(c);
            }
        }
        self.replace_text(&text, &mut out);
        out
    }
}
