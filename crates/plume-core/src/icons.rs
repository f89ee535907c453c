//! Symbolic icon name to glyph lookup.

use std::collections::HashMap;

use compact_str::CompactString;

use crate::config::IconStyle;

/// Glyph tables for each icon style.
#[derive(Debug, Clone, Default)]
pub struct IconTable {
    emoji: HashMap<CompactString, CompactString>,
    nerd: HashMap<CompactString, CompactString>,
}

const BUILTIN: &[(&str, &str, &str)] = &[
    // (name, emoji, nerd font)
    ("folder", "📁", "\u{f07b}"),
    ("file", "📄", "\u{f15b}"),
    ("config", "⚙️", "\u{e615}"),
    ("git", "🌱", "\u{e702}"),
    ("image", "🖼️", "\u{f1c5}"),
    ("json", "🧾", "\u{e60b}"),
    ("lock", "🔒", "\u{f023}"),
    ("markdown", "📝", "\u{e609}"),
    ("python", "🐍", "\u{e606}"),
    ("rust", "🦀", "\u{e7a8}"),
    ("shell", "🐚", "\u{f489}"),
    ("text", "📃", "\u{f15c}"),
    ("archive", "📦", "\u{f410}"),
    ("license", "⚖️", "\u{f718}"),
];

impl IconTable {
    /// Tables shipped with plume.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (name, emoji, nerd) in BUILTIN {
            table.insert(IconStyle::Emoji, *name, *emoji);
            table.insert(IconStyle::Nerd, *name, *nerd);
        }
        table
    }

    /// Add or replace a glyph. Inserting for [`IconStyle::None`] is a no-op.
    pub fn insert(
        &mut self,
        style: IconStyle,
        name: impl Into<CompactString>,
        glyph: impl Into<CompactString>,
    ) {
        match style {
            IconStyle::None => {}
            IconStyle::Emoji => {
                self.emoji.insert(name.into(), glyph.into());
            }
            IconStyle::Nerd => {
                self.nerd.insert(name.into(), glyph.into());
            }
        }
    }

    pub fn get(&self, style: IconStyle, name: &str) -> Option<&str> {
        let table = match style {
            IconStyle::None => return None,
            IconStyle::Emoji => &self.emoji,
            IconStyle::Nerd => &self.nerd,
        };
        table.get(name).map(|glyph| glyph.as_str())
    }
}
