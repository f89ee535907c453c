//! File system nodes and their derived presentation views.

use std::cell::OnceCell;
use std::fmt;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use compact_str::CompactString;
use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::config::{DetailColumn, IconStyle, SortField};
use crate::context::ListContext;
use crate::git::{CLEAN_STATUS, formatted_status};
use crate::markup::escape_markup;
use crate::node_type::NodeType;
use crate::spec::{HIDDEN_IMPORTANCE, MatchedSpecs, NodeSpec, SPEC_FILE_NAME};
use crate::stats;
use crate::symlink::{self, Destination};

/// Column key to pre-rendered markup.
pub type TableRow = IndexMap<&'static str, String>;

/// Comparable value of a sort field.
///
/// `Missing` sorts before everything else; it stands in for stat-derived
/// fields of nodes that do not exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Missing,
    Int(u64),
    Time(SystemTime),
    Text(String),
}

/// Type and symlink destination, computed together exactly once.
#[derive(Debug)]
struct Resolution {
    node_type: NodeType,
    dest: Option<Destination>,
}

#[derive(Debug)]
struct GitFacts {
    /// Path relative to the work tree root.
    path: PathBuf,
    status: CompactString,
}

/// A single file system entry.
///
/// Construction only performs an `lstat`. Type, symlink destination and all
/// presentation views are computed on first access and cached for the life of
/// the node.
pub struct Node {
    name: CompactString,
    path: PathBuf,
    ctx: Arc<ListContext>,
    stat: Option<Metadata>,
    git: Option<GitFacts>,
    specs: MatchedSpecs,

    resolution: OnceCell<Resolution>,
    pure_name: OnceCell<String>,
    format_pair: OnceCell<(String, String)>,
    formatted_suffix: OnceCell<String>,
    formatted_name: OnceCell<String>,
    formatted_icon: OnceCell<String>,
    is_visible: OnceCell<bool>,
    table_row: OnceCell<Option<TableRow>>,
}

impl Node {
    /// Create a node for the entry `name` at absolute `path`.
    ///
    /// A path that cannot be stated yields a node with `exists() == false`.
    pub fn new(
        name: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        ctx: Arc<ListContext>,
    ) -> Self {
        let name = name.into();
        let path = path.into();

        let stat = match fs::symlink_metadata(&path) {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                trace!(path = %path.display(), error = %err, "entry could not be stated");
                None
            }
        };

        let git = ctx.git.relative(&path).map(|relative| GitFacts {
            status: ctx.git.status_of(relative).into(),
            path: relative.to_path_buf(),
        });

        Self {
            name,
            path,
            ctx,
            stat,
            git,
            specs: MatchedSpecs::default(),
            resolution: OnceCell::new(),
            pure_name: OnceCell::new(),
            format_pair: OnceCell::new(),
            formatted_suffix: OnceCell::new(),
            formatted_name: OnceCell::new(),
            formatted_icon: OnceCell::new(),
            is_visible: OnceCell::new(),
            table_row: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn context(&self) -> &Arc<ListContext> {
        &self.ctx
    }

    /// Metadata from `lstat`, if the entry could be stated.
    pub fn stat(&self) -> Option<&Metadata> {
        self.stat.as_ref()
    }

    pub fn exists(&self) -> bool {
        self.stat.is_some()
    }

    pub fn is_git_managed(&self) -> bool {
        self.git.is_some()
    }

    pub fn path_wrt_git(&self) -> Option<&Path> {
        self.git.as_ref().map(|git| git.path.as_path())
    }

    pub fn git_status(&self) -> &str {
        self.git
            .as_ref()
            .map(|git| git.status.as_str())
            .unwrap_or(CLEAN_STATUS)
    }

    /// Store every spec matching this node's name, keeping their order.
    ///
    /// Meant to be called once after construction; calling again replaces the
    /// previous match and drops views derived from it.
    pub fn match_specs(&mut self, specs: &[Arc<NodeSpec>]) {
        self.specs = MatchedSpecs::match_all(&self.name, specs);
        self.format_pair.take();
        self.formatted_name.take();
        self.formatted_icon.take();
        self.is_visible.take();
        self.table_row.take();
    }

    pub fn specs(&self) -> &MatchedSpecs {
        &self.specs
    }

    fn resolution(&self) -> &Resolution {
        self.resolution.get_or_init(|| self.classify())
    }

    fn classify(&self) -> Resolution {
        let Some(stat) = &self.stat else {
            return Resolution {
                node_type: NodeType::Unknown,
                dest: None,
            };
        };

        let node_type = NodeType::from_file_type(&stat.file_type());
        if node_type != NodeType::Symlink {
            return Resolution {
                node_type,
                dest: None,
            };
        }

        match symlink::resolve(&self.path, &self.ctx) {
            Ok(dest) => Resolution {
                node_type,
                dest: Some(dest),
            },
            Err(err) => {
                // The link changed between lstat and readlink.
                warn!(path = %self.path.display(), error = %err, "could not read symlink");
                Resolution {
                    node_type: NodeType::Unknown,
                    dest: None,
                }
            }
        }
    }

    /// Whether the node is a file, directory, symlink, FIFO etc.
    pub fn node_type(&self) -> NodeType {
        self.resolution().node_type
    }

    /// Symlink destination. Populated exactly when the type is [`NodeType::Symlink`].
    pub fn dest(&self) -> Option<&Destination> {
        self.resolution().dest.as_ref()
    }

    /// Node for the next hop of a non-looping symlink.
    pub fn dest_node(&self) -> Option<&Node> {
        self.dest().and_then(Destination::node)
    }

    /// Only true for cyclic symlinks.
    pub fn is_loop(&self) -> bool {
        self.dest().is_some_and(Destination::is_loop)
    }

    pub fn is_dir(&self) -> bool {
        self.node_type() == NodeType::Dir
    }

    pub fn type_char(&self) -> char {
        self.node_type().type_char()
    }

    /// Lower-cased name with leading dots stripped.
    pub fn pure_name(&self) -> &str {
        self.pure_name
            .get_or_init(|| self.name.trim_start_matches('.').to_lowercase())
    }

    /// Portion of the name after the last dot, or empty.
    pub fn ext(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("")
    }

    /// Opening and closing markup tags for this node.
    pub fn format_pair(&self) -> (&str, &str) {
        let (left, right) = self.format_pair.get_or_init(|| {
            let mut rules: Vec<&str> = Vec::new();

            // colour
            if !self.exists() {
                rules.push("red");
            } else if let Some(color) = self.specs.color() {
                rules.push(color);
            } else if self.is_dir() {
                rules.push("cyan");
            }

            // weight
            match self.specs.importance() {
                Some(2) => rules.push("underline"),
                Some(1) => rules.push("bold"),
                Some(-1) => rules.push("dim"),
                Some(_) => {}
                None => {
                    if self.git_status() == "!!" {
                        rules.push("dim");
                    }
                }
            }

            if self.name == SPEC_FILE_NAME {
                rules.push("italic");
            }

            if rules.is_empty() {
                (String::new(), String::new())
            } else {
                (format!("[{}]", rules.join(" ")), "[/]".to_string())
            }
        });
        (left.as_str(), right.as_str())
    }

    /// Marker after the name describing the node type.
    pub fn formatted_suffix(&self) -> &str {
        self.formatted_suffix.get_or_init(|| {
            if !self.exists() {
                return "⚠".to_string();
            }
            match (self.node_type(), self.dest()) {
                (NodeType::Symlink, Some(Destination::Loop(target))) => {
                    format!("[dim]@ ↺[/] [red]{}[/red]", escape_markup(target))
                }
                (NodeType::Symlink, Some(Destination::Node(dest))) => {
                    format!("[dim]@ →[/] {}", dest.formatted_name())
                }
                (NodeType::Dir, _) => "[dim]/[/]".to_string(),
                (NodeType::Socket, _) => "[dim]=[/]".to_string(),
                (NodeType::Fifo, _) => "[dim]|[/]".to_string(),
                _ => String::new(),
            }
        })
    }

    /// Name with suffix, wrapped in this node's markup.
    pub fn formatted_name(&self) -> &str {
        self.formatted_name.get_or_init(|| {
            let mut name = format!("{}{}", escape_markup(&self.name), self.formatted_suffix());
            if name.starts_with('.') && self.ctx.options.align {
                name = name.replacen('.', "[dim].[/dim]", 1);
            }
            let (left, right) = self.format_pair();
            format!("{left}{name}{right}")
        })
    }

    /// Icon glyph in the active style, wrapped in this node's markup.
    pub fn formatted_icon(&self) -> &str {
        self.formatted_icon.get_or_init(|| {
            let style = self.ctx.options.icon;
            if style == IconStyle::None {
                return String::new();
            }

            let icon_name = match self.specs.icon() {
                Some(icon) => Some(icon),
                None if self.is_dir() => Some("folder"),
                None => None,
            };

            match icon_name.and_then(|name| self.ctx.icons.get(style, name)) {
                Some(glyph) => {
                    let (left, right) = self.format_pair();
                    format!("{left}{glyph}{right}")
                }
                None => String::new(),
            }
        })
    }

    pub fn formatted_git_status(&self) -> String {
        formatted_status(self.git_status())
    }

    /// Whether the node deserves to be rendered.
    pub fn is_visible(&self) -> bool {
        *self.is_visible.get_or_init(|| {
            if self.ctx.options.show_all {
                return true;
            }
            // A matching spec exempts dotfiles from hiding, whatever it sets.
            if self.specs.is_empty() && self.name.starts_with('.') {
                return false;
            }
            self.specs.importance() != Some(HIDDEN_IMPORTANCE)
        })
    }

    /// Cells for the table, or `None` for nodes that are missing or hidden.
    pub fn table_row(&self) -> Option<&TableRow> {
        self.table_row
            .get_or_init(|| {
                if !(self.exists() && self.is_visible()) {
                    return None;
                }
                let stat = self.stat.as_ref()?;
                let options = &self.ctx.options;

                let mut cells = TableRow::new();

                let mut name = self.formatted_name().to_string();
                if !self.name.starts_with('.') && options.align {
                    name.insert(0, ' ');
                }
                cells.insert("name", name);
                cells.insert("icon", self.formatted_icon().to_string());

                let Some(details) = &options.details else {
                    return Some(cells);
                };
                for column in details.iter() {
                    if let Some(value) = self.detail_cell(column, stat) {
                        cells.insert(column.key(), value);
                    }
                }
                Some(cells)
            })
            .as_ref()
    }

    fn detail_cell(&self, column: DetailColumn, stat: &Metadata) -> Option<String> {
        let options = &self.ctx.options;
        let value = match column {
            DetailColumn::Inode => stats::get_ino(stat).to_string(),
            DetailColumn::Links => stats::formatted_links(stat),
            DetailColumn::Type => self.type_char().to_string(),
            DetailColumn::Perms => stats::formatted_perms(stat),
            DetailColumn::User => stats::formatted_user(stat),
            DetailColumn::Group => stats::formatted_group(stat),
            DetailColumn::Size => stats::formatted_size(stat, options.units),
            DetailColumn::Ctime => stats::formatted_time(stats::get_ctime(stat), &options.time_fmt),
            DetailColumn::Mtime => stats::formatted_time(stats::get_mtime(stat), &options.time_fmt),
            DetailColumn::Atime => stats::formatted_time(stats::get_atime(stat), &options.time_fmt),
            DetailColumn::Git => {
                if !self.is_git_managed() {
                    return None;
                }
                self.formatted_git_status()
            }
        };
        Some(value)
    }

    /// Value of `field` for sorting.
    ///
    /// Stat-derived fields are [`SortValue::Missing`] when the node does not exist.
    pub fn sort_key(&self, field: SortField) -> SortValue {
        let Some(stat) = &self.stat else {
            return match field {
                SortField::Name => SortValue::Text(self.pure_name().to_string()),
                SortField::Ext => SortValue::Text(self.ext().to_string()),
                _ => SortValue::Missing,
            };
        };
        let time = |time: Option<SystemTime>| time.map_or(SortValue::Missing, SortValue::Time);
        match field {
            SortField::Name => SortValue::Text(self.pure_name().to_string()),
            SortField::Ext => SortValue::Text(self.ext().to_string()),
            SortField::Inode => SortValue::Int(stats::get_ino(stat)),
            SortField::Links => SortValue::Int(stats::get_nlink(stat)),
            SortField::Type => SortValue::Text(self.type_char().to_string()),
            SortField::Size => SortValue::Int(stat.len()),
            SortField::Ctime => time(stats::get_ctime(stat)),
            SortField::Mtime => time(stats::get_mtime(stat)),
            SortField::Atime => time(stats::get_atime(stat)),
        }
    }

    /// Absolute path with symlinks resolved as far as possible.
    pub fn canonical_path(&self) -> PathBuf {
        if let Ok(path) = fs::canonicalize(&self.path) {
            return path;
        }
        match (self.path.parent(), self.path.file_name()) {
            (Some(parent), Some(file_name)) => fs::canonicalize(parent)
                .map(|parent| parent.join(file_name))
                .unwrap_or_else(|_| self.path.clone()),
            _ => self.path.clone(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_path() == other.canonical_path()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.name, self.path.display())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("exists", &self.exists())
            .field("specs", &self.specs.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::config::{DetailSet, ListOptions};
    use crate::git::GitContext;
    use crate::spec::SpecPattern;
    use tempfile::TempDir;

    fn ctx(options: ListOptions) -> Arc<ListContext> {
        Arc::new(ListContext::new(options))
    }

    fn node_in(dir: &Path, name: &str, ctx: &Arc<ListContext>) -> Node {
        Node::new(name, dir.join(name), Arc::clone(ctx))
    }

    #[test]
    fn test_missing_entry() {
        let temp = TempDir::new().unwrap();
        let node = node_in(temp.path(), "ghost", &ctx(ListOptions::default()));

        assert!(!node.exists());
        assert_eq!(node.node_type(), NodeType::Unknown);
        assert!(node.dest().is_none());
        assert_eq!(node.formatted_suffix(), "⚠");
        assert!(node.table_row().is_none());
        assert_eq!(node.sort_key(SortField::Size), SortValue::Missing);
    }

    #[test]
    fn test_pure_name_and_ext() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(ListOptions::default());
        let node = node_in(temp.path(), "..Hidden.Tar.GZ", &ctx);
        assert_eq!(node.pure_name(), "hidden.tar.gz");
        assert_eq!(node.ext(), "GZ");

        let node = node_in(temp.path(), "Makefile", &ctx);
        assert_eq!(node.ext(), "");
    }

    #[test]
    fn test_directory_presentation() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        let options = ListOptions::builder()
            .icon(IconStyle::Emoji)
            .build()
            .unwrap();
        let node = node_in(temp.path(), "src", &ctx(options));

        assert!(node.is_dir());
        assert_eq!(node.format_pair(), ("[cyan]", "[/]"));
        assert_eq!(node.formatted_name(), "[cyan]src[dim]/[/][/]");
        assert_eq!(node.formatted_icon(), "[cyan]📁[/]");
    }

    #[test]
    fn test_importance_weights() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "hi").unwrap();
        let ctx = ctx(ListOptions::default());

        let mut node = node_in(temp.path(), "README.md", &ctx);
        let specs = vec![Arc::new(
            NodeSpec::new(SpecPattern::Name("README.md".into()))
                .with_importance(2)
                .with_color("yellow"),
        )];
        node.match_specs(&specs);
        assert_eq!(node.format_pair(), ("[yellow underline]", "[/]"));
    }

    #[test]
    fn test_zero_importance_keeps_ignored_dim() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("debug.log"), "").unwrap();
        let statuses = HashMap::from([(PathBuf::from("debug.log"), CompactString::from("!!"))]);
        let ctx = Arc::new(
            ListContext::new(ListOptions::default())
                .with_git(GitContext::managed(temp.path(), statuses)),
        );

        let mut node = node_in(temp.path(), "debug.log", &ctx);
        let specs = vec![
            Arc::new(NodeSpec::new(SpecPattern::Extension("log".into())).with_importance(0)),
            Arc::new(NodeSpec::new(SpecPattern::Extension("log".into())).with_color("green")),
        ];
        node.match_specs(&specs);

        assert_eq!(node.git_status(), "!!");
        assert_eq!(node.format_pair(), ("[green dim]", "[/]"));
        assert!(node.is_visible());
    }

    #[test]
    fn test_zero_importance_does_not_mask_hiding() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("debug.log"), "").unwrap();
        let mut node = node_in(temp.path(), "debug.log", &ctx(ListOptions::default()));

        let specs = vec![
            Arc::new(NodeSpec::new(SpecPattern::Extension("log".into())).with_importance(0)),
            Arc::new(
                NodeSpec::new(SpecPattern::Extension("log".into()))
                    .with_importance(HIDDEN_IMPORTANCE),
            ),
        ];
        node.match_specs(&specs);
        assert!(!node.is_visible());
    }

    #[test]
    fn test_rematch_resets_views() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        let ctx = ctx(ListOptions::default());

        let mut node = node_in(temp.path(), "notes.txt", &ctx);
        assert!(node.is_visible());

        let specs = vec![Arc::new(
            NodeSpec::new(SpecPattern::Extension("txt".into())).with_importance(HIDDEN_IMPORTANCE),
        )];
        node.match_specs(&specs);
        assert!(!node.is_visible());
    }

    #[test]
    fn test_table_row_columns() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("data.bin"), vec![0u8; 10]).unwrap();
        let options = ListOptions::builder()
            .details(Some(DetailSet::Columns(
                [DetailColumn::Size, DetailColumn::Type, DetailColumn::Git].into(),
            )))
            .units(crate::config::UnitSystem::None)
            .build()
            .unwrap();
        let node = node_in(temp.path(), "data.bin", &ctx(options));

        let row = node.table_row().unwrap();
        let keys: Vec<_> = row.keys().copied().collect();
        // git is requested but the node is not under version control
        assert_eq!(keys, vec!["name", "icon", "type", "size"]);
        assert_eq!(row["name"], " data.bin");
        assert_eq!(row["type"], "-");
        assert_eq!(row["size"], "10");
    }

    #[test]
    fn test_leading_dot_alignment() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "").unwrap();

        let node = node_in(temp.path(), ".env", &ctx(ListOptions::default()));
        assert_eq!(node.formatted_name(), "[dim].[/dim]env");

        let options = ListOptions::builder().align(false).build().unwrap();
        let node = node_in(temp.path(), ".env", &ctx(options));
        assert_eq!(node.formatted_name(), ".env");
    }

    #[test]
    fn test_bracketed_name_is_escaped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes[1].txt"), "").unwrap();
        fs::write(temp.path().join("draft[b].md"), "").unwrap();
        let ctx = ctx(ListOptions::default());

        let node = node_in(temp.path(), "notes[1].txt", &ctx);
        assert_eq!(node.formatted_name(), "notes\\[1].txt");
        let node = node_in(temp.path(), "draft[b].md", &ctx);
        assert_eq!(node.formatted_name(), "draft\\[b].md");
    }

    #[cfg(unix)]
    #[test]
    fn test_loop_target_is_escaped() {
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink("[x]", temp.path().join("[x]")).unwrap();

        let node = node_in(temp.path(), "[x]", &ctx(ListOptions::default()));
        assert!(matches!(node.dest(), Some(Destination::Loop(_))));
        assert!(node.formatted_name().starts_with("\\[x]"));
        assert!(node.formatted_suffix().ends_with("[red]\\[x][/red]"));
    }

    #[test]
    fn test_display() {
        let node = Node::new("a", "/tmp/a", ctx(ListOptions::default()));
        assert_eq!(node.to_string(), "a @ /tmp/a");
    }
}
