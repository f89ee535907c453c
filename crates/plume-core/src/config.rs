//! Presentation options for a listing.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::ListError;

/// Kind of icon shown beside each node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IconStyle {
    /// No icons.
    None,
    /// Emoji glyphs.
    Emoji,
    /// Nerd Font glyphs.
    #[default]
    Nerd,
}

/// Unit system used when printing file sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[derive(Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Powers of 1024 (KiB, MiB, ...).
    #[default]
    Binary,
    /// Powers of 1000 (kB, MB, ...).
    Decimal,
    /// Raw byte counts.
    None,
}

/// Detail columns that can be requested in addition to the name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DetailColumn {
    Inode,
    Links,
    Type,
    Perms,
    User,
    Group,
    Size,
    Ctime,
    Mtime,
    Atime,
    Git,
}

impl DetailColumn {
    /// Column key used in table rows.
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Columns selected by a bare `--details` flag.
    pub fn defaults() -> BTreeSet<DetailColumn> {
        BTreeSet::from([DetailColumn::Type, DetailColumn::Perms])
    }
}

/// Groups of detail columns, in display order. A spacer separates groups.
const COLUMN_GROUPS: &[&[DetailColumn]] = &[
    &[DetailColumn::Inode],
    &[DetailColumn::Links, DetailColumn::Type, DetailColumn::Perms],
    &[DetailColumn::User, DetailColumn::Group],
    &[DetailColumn::Size],
    &[DetailColumn::Ctime, DetailColumn::Mtime, DetailColumn::Atime],
    &[DetailColumn::Git],
];

/// Set of requested detail columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailSet {
    /// Every detail column.
    All,
    /// An explicit selection.
    Columns(BTreeSet<DetailColumn>),
}

impl DetailSet {
    /// Check if a column was requested.
    pub fn contains(&self, column: DetailColumn) -> bool {
        match self {
            DetailSet::All => true,
            DetailSet::Columns(columns) => columns.contains(&column),
        }
    }

    /// Iterate over requested columns in display order.
    pub fn iter(&self) -> impl Iterator<Item = DetailColumn> + '_ {
        DetailColumn::iter().filter(|column| self.contains(*column))
    }
}

/// Fields nodes can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Ext,
    Inode,
    Links,
    Type,
    Size,
    Ctime,
    Mtime,
    Atime,
}

/// Sort field plus direction. Parsed from strings such as `name` or `size-`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    #[serde(default)]
    pub reverse: bool,
}

impl SortKey {
    pub fn new(field: SortField, reverse: bool) -> Self {
        Self { field, reverse }
    }
}

impl FromStr for SortKey {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix('-') {
            Some(field) => Ok(Self::new(field.parse()?, true)),
            None => Ok(Self::new(s.parse()?, false)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if self.reverse {
            write!(f, "-")?;
        }
        Ok(())
    }
}

pub const DEFAULT_TIME_FMT: &str = "[dim]%Y-[/]%m-%d %H:%M[dim]:%S ";

/// Presentation options shared, read-only, by every node of a listing.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate", error = "ListError"))]
pub struct ListOptions {
    /// Icon style.
    #[builder(default)]
    #[serde(default)]
    pub icon: IconStyle,

    /// Pad names so leading dots hang in their own column.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub align: bool,

    /// Requested detail columns (None = name and icon only).
    #[builder(default)]
    #[serde(default)]
    pub details: Option<DetailSet>,

    /// Show every node, including hidden ones.
    #[builder(default = "false")]
    #[serde(default)]
    pub show_all: bool,

    /// Field and direction to sort by.
    #[builder(default)]
    #[serde(default)]
    pub sort: SortKey,

    /// Group directories before everything else.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub dirs_first: bool,

    /// Hide directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub no_dirs: bool,

    /// Hide everything that is not a directory.
    #[builder(default = "false")]
    #[serde(default)]
    pub no_files: bool,

    /// Units for the size column.
    #[builder(default)]
    #[serde(default)]
    pub units: UnitSystem,

    /// strftime template for timestamp columns. May contain markup.
    #[builder(default = "DEFAULT_TIME_FMT.to_string()")]
    #[serde(default = "default_time_fmt")]
    pub time_fmt: String,

    /// How many directory levels to climb when looking for spec files.
    #[builder(default = "4")]
    #[serde(default = "default_depth")]
    pub depth: usize,
}

fn default_true() -> bool {
    true
}

fn default_time_fmt() -> String {
    DEFAULT_TIME_FMT.to_string()
}

fn default_depth() -> usize {
    4
}

impl ListOptionsBuilder {
    fn validate(&self) -> Result<(), ListError> {
        if let Some(ref fmt) = self.time_fmt {
            if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
                return Err(ListError::invalid_config(format!("Invalid time format: {fmt}")));
            }
        }
        if self.no_dirs == Some(true) && self.no_files == Some(true) {
            return Err(ListError::invalid_config(
                "Cannot hide both directories and files",
            ));
        }
        Ok(())
    }
}

impl ListOptions {
    /// Create a new options builder.
    pub fn builder() -> ListOptionsBuilder {
        ListOptionsBuilder::default()
    }

    /// Check if a detail column was requested.
    pub fn wants(&self, column: DetailColumn) -> bool {
        self.details.as_ref().is_some_and(|d| d.contains(column))
    }

    /// Ordered column keys for the table, with `spacer` between non-empty groups.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut groups: Vec<Vec<&'static str>> = Vec::new();
        if self.details.is_some() {
            for group in COLUMN_GROUPS {
                groups.push(
                    group
                        .iter()
                        .filter(|column| self.wants(**column))
                        .map(|column| column.key())
                        .collect(),
                );
            }
        }

        let mut name_group = vec!["name"];
        if self.icon != IconStyle::None {
            name_group.insert(0, "icon");
        }
        groups.push(name_group);

        let last = groups.len() - 1;
        let mut columns = Vec::new();
        for (index, group) in groups.into_iter().enumerate() {
            if group.is_empty() {
                continue;
            }
            columns.extend(group);
            if index != last {
                columns.push("spacer");
            }
        }
        columns
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            icon: IconStyle::default(),
            align: true,
            details: None,
            show_all: false,
            sort: SortKey::default(),
            dirs_first: true,
            no_dirs: false,
            no_files: false,
            units: UnitSystem::default(),
            time_fmt: default_time_fmt(),
            depth: default_depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ListOptions::builder()
            .show_all(true)
            .icon(IconStyle::Emoji)
            .sort("size-".parse::<SortKey>().unwrap())
            .build()
            .unwrap();

        assert!(options.show_all);
        assert!(options.align);
        assert_eq!(options.icon, IconStyle::Emoji);
        assert_eq!(options.sort, SortKey::new(SortField::Size, true));
    }

    #[test]
    fn test_builder_rejects_bad_time_fmt() {
        let result = ListOptions::builder().time_fmt("%Y-%Q").build();
        assert!(matches!(result, Err(ListError::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_rejects_hiding_everything() {
        let result = ListOptions::builder().no_dirs(true).no_files(true).build();
        let err = result.unwrap_err();
        assert!(matches!(err, ListError::InvalidConfig { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Cannot hide both directories and files"
        );
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::default());
        assert_eq!(
            "mtime-".parse::<SortKey>().unwrap(),
            SortKey::new(SortField::Mtime, true)
        );
        assert!("perms".parse::<SortKey>().is_err());
        assert_eq!(SortKey::new(SortField::Ext, true).to_string(), "ext-");
    }

    #[test]
    fn test_columns_without_details() {
        let options = ListOptions::default();
        assert_eq!(options.columns(), vec!["icon", "name"]);

        let options = ListOptions::builder().icon(IconStyle::None).build().unwrap();
        assert_eq!(options.columns(), vec!["name"]);
    }

    #[test]
    fn test_columns_with_details() {
        let options = ListOptions::builder()
            .details(Some(DetailSet::Columns(DetailColumn::defaults())))
            .build()
            .unwrap();
        assert_eq!(
            options.columns(),
            vec!["type", "perms", "spacer", "icon", "name"]
        );

        let options = ListOptions::builder()
            .details(Some(DetailSet::All))
            .icon(IconStyle::None)
            .build()
            .unwrap();
        let columns = options.columns();
        assert_eq!(columns.first(), Some(&"inode"));
        assert_eq!(columns.last(), Some(&"name"));
        assert_eq!(columns.iter().filter(|c| **c == "spacer").count(), 6);
    }

    #[test]
    fn test_detail_set_iter_order() {
        let set = DetailSet::Columns(BTreeSet::from([DetailColumn::Size, DetailColumn::Inode]));
        let columns: Vec<_> = set.iter().collect();
        assert_eq!(columns, vec![DetailColumn::Inode, DetailColumn::Size]);
        assert_eq!(DetailColumn::Mtime.key(), "mtime");
    }
}
