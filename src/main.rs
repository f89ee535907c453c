//! plume - a directory lister with spec-driven styling.
//!
//! Usage:
//!   plume [DIRECTORY]            List a directory
//!   plume -d                     Add type and permission columns
//!   plume -d size -d mtime       Pick detail columns
//!   plume -d +                   Show every detail column
//!   plume -s size-               Sort by size, largest first
//!   plume -e listing.json        Export rows to JSON
//!   plume --help                 Show help

mod render;
mod table;

use std::collections::BTreeSet;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Context, Result, bail};
use indexmap::IndexMap;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use plume_list::{
    DEFAULT_TIME_FMT, DetailColumn, DetailSet, IconStyle, ListOptions, Lister, Listing, SortKey,
    UnitSystem, load_specs,
};

use crate::table::{SPACER, Table};

#[derive(Parser)]
#[command(
    name = "plume",
    version,
    about = "List a directory with icons, details and git status",
    long_about = "plume lists the entries of a directory.\n\n\
                  Styling, icons and visibility come from `.plume.toml` spec files found \
                  in the listed directory and its ancestors, the user config file, and \
                  the built-in specs."
)]
struct Cli {
    /// Directory to list (defaults to current directory)
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Icon style: none, emoji or nerd
    #[arg(short, long, default_value_t = IconStyle::Nerd)]
    icon: IconStyle,

    /// Do not pad names to align leading dots
    #[arg(long)]
    no_align: bool,

    /// Show detail columns; repeat to pick several, `+` for all
    #[arg(short, long, num_args = 0..=1, value_parser = parse_detail)]
    details: Option<Vec<DetailArg>>,

    /// Units for file sizes: binary, decimal or none
    #[arg(short, long, default_value_t = UnitSystem::Binary)]
    units: UnitSystem,

    /// strftime template for timestamps (may contain markup)
    #[arg(short, long, default_value = DEFAULT_TIME_FMT)]
    time_fmt: String,

    /// Sort field: name, ext, inode, links, type, size, ctime, mtime, atime;
    /// a trailing `-` reverses the order
    #[arg(short, long, default_value_t = SortKey::default())]
    sort: SortKey,

    /// Mix directories in with everything else
    #[arg(long)]
    no_dirs_first: bool,

    /// Show hidden entries
    #[arg(short, long)]
    all: bool,

    /// Hide directories
    #[arg(long, conflicts_with = "no_files")]
    no_dirs: bool,

    /// Hide everything that is not a directory
    #[arg(long)]
    no_files: bool,

    /// Ancestor levels searched for spec files
    #[arg(long, default_value_t = 4)]
    depth: usize,

    /// Write rows to this JSON file instead of printing a table
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log level for diagnostics on stderr (RUST_LOG takes priority)
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

/// One `--details` value.
#[derive(Debug, Clone, Copy)]
enum DetailArg {
    All,
    Column(DetailColumn),
}

fn parse_detail(value: &str) -> Result<DetailArg, String> {
    if value == "+" {
        return Ok(DetailArg::All);
    }
    value
        .parse()
        .map(DetailArg::Column)
        .map_err(|_| format!("unknown column `{value}`"))
}

/// Fold repeated `--details` values into a column selection.
fn detail_set(args: &[DetailArg]) -> DetailSet {
    if args.is_empty() {
        return DetailSet::Columns(DetailColumn::defaults());
    }
    let mut columns = BTreeSet::new();
    for arg in args {
        match arg {
            DetailArg::All => return DetailSet::All,
            DetailArg::Column(column) => {
                columns.insert(*column);
            }
        }
    }
    DetailSet::Columns(columns)
}

impl Cli {
    fn options(&self) -> Result<ListOptions> {
        let options = ListOptions::builder()
            .icon(self.icon)
            .align(!self.no_align)
            .details(self.details.as_deref().map(detail_set))
            .show_all(self.all)
            .sort(self.sort)
            .dirs_first(!self.no_dirs_first)
            .no_dirs(self.no_dirs)
            .no_files(self.no_files)
            .units(self.units)
            .time_fmt(self.time_fmt.clone())
            .depth(self.depth)
            .build()
            .context("Invalid options")?;
        Ok(options)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    let directory = cli.directory.canonicalize().context("Invalid path")?;
    if !directory.is_dir() {
        bail!("{} is not a directory", directory.display());
    }

    let options = cli.options()?;
    let specs = load_specs(&directory, options.depth).context("Could not load spec files")?;
    let listing = Lister::new(options)
        .with_specs(specs)
        .list(&directory)
        .context("Listing failed")?;

    for warning in &listing.warnings {
        eprintln!("warning: {}: {}", warning.path.display(), warning.message);
    }

    match &cli.export {
        Some(path) => run_export(&listing, path),
        None => run_table(&listing),
    }
}

fn init_logging(level: Level) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env()
        .context("Invalid RUST_LOG")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
    Ok(())
}

/// Print the listing as a table on stdout.
fn run_table(listing: &Listing) -> Result<()> {
    let headers = listing.options().details.is_some();
    let table = Table::new(&listing.columns(), listing.rows().collect(), headers);

    let ansi = io::stdout().is_terminal();
    let mut out = io::stdout().lock();
    for line in table.lines() {
        writeln!(out, "{}", render::render(&line, ansi))?;
    }
    out.flush()?;
    Ok(())
}

/// Write the rows, markup stripped, as a JSON array.
fn run_export(listing: &Listing, path: &Path) -> Result<()> {
    let table = Table::new(&listing.columns(), listing.rows().collect(), false);
    let rows: Vec<IndexMap<&str, String>> = listing
        .rows()
        .map(|row| {
            table
                .columns()
                .iter()
                .filter(|column| **column != SPACER)
                .filter_map(|column| {
                    let value = row.get(column)?;
                    Some((*column, render::strip(value).trim().to_string()))
                })
                .collect()
        })
        .collect();

    let json = serde_json::to_string_pretty(&rows)?;
    std::fs::write(path, json).with_context(|| format!("Could not write {}", path.display()))?;
    eprintln!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_set_defaults() {
        assert_eq!(detail_set(&[]), DetailSet::Columns(DetailColumn::defaults()));
    }

    #[test]
    fn test_detail_set_all_wins() {
        let args = [DetailArg::Column(DetailColumn::Size), DetailArg::All];
        assert_eq!(detail_set(&args), DetailSet::All);
    }

    #[test]
    fn test_detail_set_columns() {
        let args = [
            DetailArg::Column(DetailColumn::Mtime),
            DetailArg::Column(DetailColumn::Size),
        ];
        assert_eq!(
            detail_set(&args),
            DetailSet::Columns(BTreeSet::from([DetailColumn::Size, DetailColumn::Mtime]))
        );
    }

    #[test]
    fn test_parse_detail() {
        assert!(matches!(parse_detail("+"), Ok(DetailArg::All)));
        assert!(matches!(
            parse_detail("git"),
            Ok(DetailArg::Column(DetailColumn::Git))
        ));
        assert!(parse_detail("colour").is_err());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from(["plume", "-d", "-d", "size", "-s", "mtime-", "--no-align"]);
        let options = cli.options().unwrap();

        assert!(!options.align);
        assert!(options.sort.reverse);
        assert!(options.wants(DetailColumn::Size));
        assert!(!options.wants(DetailColumn::Perms));
    }

    #[test]
    fn test_cli_bare_details() {
        let cli = Cli::parse_from(["plume", "-d"]);
        let options = cli.options().unwrap();
        assert!(options.wants(DetailColumn::Type));
        assert!(options.wants(DetailColumn::Perms));
    }

    #[test]
    fn test_cli_rejects_both_filters() {
        assert!(Cli::try_parse_from(["plume", "--no-dirs", "--no-files"]).is_err());
    }
}
