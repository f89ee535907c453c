//! Markup rendering.
//!
//! Cells produced by `plume-core` carry inline style tags such as
//! `[dim]-[/]` or `[bold cyan]src[/]`. This module turns them into
//! terminal escape sequences with crossterm, or strips them for plain
//! output and width measurement.

use crossterm::style::{Attribute, Color, ContentStyle};
use unicode_width::UnicodeWidthStr;

/// A run of text with the style in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: ContentStyle,
}

/// One open tag: its source text and what it sets.
#[derive(Debug, Clone)]
struct Tag {
    source: String,
    foreground: Option<Color>,
    background: Option<Color>,
    attributes: Vec<Attribute>,
}

/// Split markup into styled spans.
///
/// `\[` and `\\` stand for a literal `[` and `\`. Tags that do not parse
/// are kept as text.
pub fn parse(markup: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut stack: Vec<Tag> = Vec::new();
    let mut text = String::new();
    let mut rest = markup;

    while let Some(at) = rest.find(['[', '\\']) {
        text.push_str(&rest[..at]);
        let after = &rest[at + 1..];

        if rest[at..].starts_with('\\') {
            match after.chars().next() {
                Some(ch @ ('[' | '\\')) => {
                    text.push(ch);
                    rest = &after[1..];
                }
                _ => {
                    text.push('\\');
                    rest = after;
                }
            }
            continue;
        }

        let Some(close) = after.find(']') else {
            text.push_str(&rest[at..]);
            rest = "";
            break;
        };
        let source = &after[..close];

        let handled = if let Some(name) = source.strip_prefix('/') {
            match open_index(&stack, name) {
                Some(index) => {
                    push_span(&mut spans, &mut text, &stack);
                    stack.remove(index);
                    true
                }
                None => false,
            }
        } else if let Some(tag) = parse_tag(source) {
            push_span(&mut spans, &mut text, &stack);
            stack.push(tag);
            true
        } else {
            false
        };

        if handled {
            rest = &after[close + 1..];
        } else {
            text.push('[');
            rest = after;
        }
    }
    text.push_str(rest);
    push_span(&mut spans, &mut text, &stack);
    spans
}

/// Tag closed by `[/]` (innermost) or `[/name]` (innermost with that source).
fn open_index(stack: &[Tag], name: &str) -> Option<usize> {
    if name.is_empty() {
        stack.len().checked_sub(1)
    } else {
        stack.iter().rposition(|tag| tag.source == name)
    }
}

fn push_span(spans: &mut Vec<Span>, text: &mut String, stack: &[Tag]) {
    if text.is_empty() {
        return;
    }
    spans.push(Span {
        text: std::mem::take(text),
        style: compose(stack),
    });
}

fn compose(stack: &[Tag]) -> ContentStyle {
    let mut style = ContentStyle::new();
    for tag in stack {
        if tag.foreground.is_some() {
            style.foreground_color = tag.foreground;
        }
        if tag.background.is_some() {
            style.background_color = tag.background;
        }
        for attribute in &tag.attributes {
            style.attributes.set(*attribute);
        }
    }
    style
}

/// Parse the inside of an opening tag, e.g. `bold red on black`.
///
/// A tag starts with a letter or `#`.
fn parse_tag(source: &str) -> Option<Tag> {
    let first = source.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '#') {
        return None;
    }
    let mut tag = Tag {
        source: source.to_string(),
        foreground: None,
        background: None,
        attributes: Vec::new(),
    };
    let mut words = source.split_whitespace().peekable();
    words.peek()?;

    while let Some(word) = words.next() {
        if word == "on" {
            tag.background = Some(parse_color(words.next()?)?);
        } else if let Some(attribute) = parse_attribute(word) {
            tag.attributes.push(attribute);
        } else {
            tag.foreground = Some(parse_color(word)?);
        }
    }
    Some(tag)
}

fn parse_attribute(word: &str) -> Option<Attribute> {
    let attribute = match word {
        "bold" => Attribute::Bold,
        "dim" => Attribute::Dim,
        "italic" => Attribute::Italic,
        "underline" => Attribute::Underlined,
        "reverse" => Attribute::Reverse,
        "strike" => Attribute::CrossedOut,
        "blink" => Attribute::SlowBlink,
        _ => return None,
    };
    Some(attribute)
}

/// Named ANSI colours, `bright_*` variants, `#rrggbb` and `color(N)` palette indices.
pub fn parse_color(word: &str) -> Option<Color> {
    if let Some(hex) = word.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        return Some(Color::Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        });
    }
    if let Some(index) = word
        .strip_prefix("color(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return index.parse().ok().map(Color::AnsiValue);
    }

    let color = match word {
        "default" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "white" => Color::Grey,
        "grey" | "gray" | "bright_black" => Color::DarkGrey,
        "bright_red" => Color::Red,
        "bright_green" => Color::Green,
        "bright_yellow" => Color::Yellow,
        "bright_blue" => Color::Blue,
        "bright_magenta" => Color::Magenta,
        "bright_cyan" => Color::Cyan,
        "bright_white" => Color::White,
        _ => return None,
    };
    Some(color)
}

/// Markup with all recognised tags removed.
pub fn strip(markup: &str) -> String {
    parse(markup).into_iter().map(|span| span.text).collect()
}

/// Display width of the text a markup string renders to.
pub fn width(markup: &str) -> usize {
    strip(markup).width()
}

/// Render markup with ANSI styles, or as plain text when `ansi` is false.
pub fn render(markup: &str, ansi: bool) -> String {
    if !ansi {
        return strip(markup);
    }
    parse(markup)
        .into_iter()
        .map(|span| {
            if span.style == ContentStyle::new() {
                span.text
            } else {
                span.style.apply(span.text).to_string()
            }
        })
        .collect()
}
