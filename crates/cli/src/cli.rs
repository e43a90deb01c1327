//! Command-line arguments.
//!
//! ```bash
//! magnetize ubuntu 24.04
//! magnetize -c movies -p 1337x -r 10 big buck bunny
//! magnetize --all-providers --copy --show-details=false debian
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use magnetize_core::{Category, Overrides};

#[derive(Parser, Clone, Debug)]
#[command(name = "magnetize")]
#[command(version)]
#[command(about = "Search torrent providers and open the magnet link you pick", long_about = None)]
pub struct Cli {
    /// Search query; multiple words are joined with spaces
    #[arg(value_name = "SEARCH")]
    pub search: Vec<String>,

    /// Category to search in
    #[arg(short = 'c', long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Provider to search first (one of the configured providers)
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Number of rows to list
    #[arg(short = 'r', long, value_parser = parse_positive)]
    pub rows: Option<usize>,

    /// Title width before truncation
    #[arg(short = 't', long, value_parser = parse_positive)]
    pub truncate: Option<usize>,

    /// Copy the magnet link to the clipboard
    #[arg(short = 'b', long, visible_alias = "copy")]
    pub clipboard: bool,

    /// Open the magnet link with the default application
    #[arg(short = 'o', long = "open-default", visible_alias = "default")]
    pub open_default: bool,

    /// Open the magnet link with this application
    #[arg(short = 'a', long = "open-app", visible_alias = "app", value_name = "APP")]
    pub open_app: Option<String>,

    /// Show torrent details before downloading
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub show_details: Option<bool>,

    /// Show progress bars
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub show_progress: Option<bool>,

    /// Query every provider at once instead of one after another
    #[arg(short = 'A', long)]
    pub all_providers: bool,

    /// Path to the configuration file
    #[arg(long, value_name = "FILE", env = "MAGNETIZE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// The query typed on the command line, if any.
    pub fn query(&self) -> Option<String> {
        let query = self.search.join(" ");
        if query.trim().is_empty() {
            None
        } else {
            Some(query)
        }
    }

    /// Configuration values the flags replace. Absent flags keep the
    /// configured value.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            rows: self.rows,
            truncate: self.truncate,
            category: self.category.map(Category::from),
            search_all: self.all_providers.then_some(true),
            show_details: self.show_details,
            show_progress: self.show_progress,
            clipboard: self.clipboard.then_some(true),
            open_default: self.open_default.then_some(true),
            open_app: self.open_app.clone(),
        }
    }
}

/// Search categories accepted by `--category`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryArg {
    All,
    Movies,
    Tv,
    Music,
    Games,
    Apps,
    Books,
    #[value(name = "top100", alias = "top-100")]
    Top100,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::All => Category::All,
            CategoryArg::Movies => Category::Movies,
            CategoryArg::Tv => Category::Tv,
            CategoryArg::Music => Category::Music,
            CategoryArg::Games => Category::Games,
            CategoryArg::Apps => Category::Apps,
            CategoryArg::Books => Category::Books,
            CategoryArg::Top100 => Category::Top100,
        }
    }
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
