use crate::app::models::{OutputFormat, RawSearchArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find files and folders whose names match a string or pattern"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Root path to search, defaults to the current directory
    #[arg(short = 'p', long)]
    pub path: Option<PathBuf>,

    /// The string (or regular expression with -r) to look for
    #[arg(short = 's', long = "stringsearch")]
    pub string_search: Option<String>,

    /// Case-insensitive matching
    #[arg(short = 'i', long = "ignorecase")]
    pub ignore_case: bool,

    /// Ignore accents while matching
    #[arg(short = 'c', long = "ignoreaccents")]
    pub ignore_accents: bool,

    /// Treat the search string as a regular expression
    #[arg(short = 'r', long = "regexp")]
    pub regex: bool,

    /// Only files with these extensions (e.g. 'md' '.csv')
    #[arg(short = 'e', long = "ext", num_args = 1..)]
    pub ext: Option<Vec<String>>,

    /// Search every folder, ignoring the configured folder exclusions
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Search only for files
    #[arg(short = 'f', long = "onlyfiles")]
    pub only_files: bool,

    /// Search only for directories
    #[arg(short = 'd', long = "onlydirs")]
    pub only_dirs: bool,

    /// Separator used when printing result paths
    #[arg(long = "directoryseparator", value_parser = ["/", "\\"], default_value = "/")]
    pub directory_separator: String,

    /// Where results go
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Console)]
    pub output: OutputFormat,

    /// Delimiter for txt/csv exports
    #[arg(long, default_value = "\t")]
    pub delimiter: char,

    /// Directory for exported results
    #[arg(short = 'm', long = "outputpath")]
    pub output_path: Option<PathBuf>,

    /// Exported results filename, without extension
    #[arg(short = 'n', long = "outputfilename")]
    pub output_filename: Option<String>,

    /// Defaults file to use instead of ~/.config/findhelp/config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the persisted exclusion lists
    Ignore {
        #[command(subcommand)]
        action: IgnoreAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum IgnoreAction {
    /// Set folder names never descended into (no names restores the built-in list)
    Folders { names: Vec<String> },
    /// Set extensions excluded from file results (no extensions clears the list)
    Extensions { extensions: Vec<String> },
    /// Print the current lists
    Show,
}

impl Cli {
    pub fn search_args(&self) -> RawSearchArgs {
        RawSearchArgs {
            path: self.path.clone(),
            query: self.string_search.clone(),
            ignore_case: self.ignore_case,
            ignore_accents: self.ignore_accents,
            regex: self.regex,
            extensions: self.ext.clone(),
            all: self.all,
            only_files: self.only_files,
            only_dirs: self.only_dirs,
            separator: self.directory_separator.chars().next(),
            output: self.output,
            delimiter: Some(self.delimiter),
            output_path: self.output_path.clone(),
            output_filename: self.output_filename.clone(),
        }
    }
}
