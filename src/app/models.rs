use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// What the user is looking for, resolved once when the config is built.
#[derive(Debug, Clone)]
pub enum Query {
    Literal(String),
    Pattern(Regex),
}

impl Query {
    pub fn as_str(&self) -> &str {
        match self {
            Query::Literal(s) => s,
            Query::Pattern(re) => re.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    FilesOnly,
    DirsOnly,
    Both,
}

impl Scope {
    pub fn includes_files(self) -> bool {
        matches!(self, Scope::FilesOnly | Scope::Both)
    }

    pub fn includes_dirs(self) -> bool {
        matches!(self, Scope::DirsOnly | Scope::Both)
    }
}

/// Lowercase, dot-prefixed extensions. Inclusion and exclusion never coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionFilter {
    Include(HashSet<String>),
    Exclude(HashSet<String>),
}

impl ExtensionFilter {
    /// `ext` is the lowercased extension of a file, `""` when it has none.
    pub fn allows(&self, ext: &str) -> bool {
        match self {
            ExtensionFilter::Include(set) => set.contains(ext),
            ExtensionFilter::Exclude(set) => !set.contains(ext),
        }
    }
}

/// Immutable input of a single search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub root: PathBuf,
    pub query: Query,
    pub case_sensitive: bool,
    pub fold_accents: bool,
    pub scope: Scope,
    pub extension_filter: Option<ExtensionFilter>,
    pub excluded_folder_names: HashSet<String>,
    pub path_separator: char,
}

impl SearchConfig {
    /// A literal, case-sensitive search over files and folders with no exclusions.
    pub fn new(root: impl Into<PathBuf>, query: Query) -> Self {
        Self {
            root: root.into(),
            query,
            case_sensitive: true,
            fold_accents: false,
            scope: Scope::Both,
            extension_filter: None,
            excluded_folder_names: HashSet::new(),
            path_separator: '/',
        }
    }

    /// With both scopes, an extension inclusion set turns folder matching
    /// off: such a search is about files only. A folders-only search never
    /// looks at extensions.
    pub fn matches_dirs(&self) -> bool {
        match self.scope {
            Scope::DirsOnly => true,
            Scope::FilesOnly => false,
            Scope::Both => !matches!(self.extension_filter, Some(ExtensionFilter::Include(_))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    #[serde(rename = "folder")]
    Directory,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "folder",
        }
    }
}

/// One match. `full_path` is always the directory the match was found in,
/// split into `parent_path` and `parent_name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MatchRecord {
    #[serde(rename = "fullpath")]
    pub full_path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(rename = "folder_parent")]
    pub parent_path: String,
    #[serde(rename = "folder_name")]
    pub parent_name: String,
    #[serde(rename = "file_name")]
    pub name: Option<String>,
    #[serde(rename = "ext")]
    pub extension: Option<String>,
    /// Name of the matched sub-directory, only set on directory records.
    pub directory: Option<String>,
}

impl MatchRecord {
    pub const HEADER: [&'static str; 7] = [
        "fullpath",
        "type",
        "folder_parent",
        "folder_name",
        "file_name",
        "ext",
        "directory",
    ];

    /// Cells in `HEADER` order, `None` rendered as empty.
    pub fn cells(&self) -> [&str; 7] {
        [
            &self.full_path,
            self.kind.label(),
            &self.parent_path,
            &self.parent_name,
            self.name.as_deref().unwrap_or(""),
            self.extension.as_deref().unwrap_or(""),
            self.directory.as_deref().unwrap_or(""),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Console,
    Txt,
    Csv,
    Json,
    List,
}

impl OutputFormat {
    pub fn file_extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::Txt => Some("txt"),
            OutputFormat::Csv => Some("csv"),
            OutputFormat::Json => Some("json"),
            OutputFormat::Console | OutputFormat::List => None,
        }
    }
}

/// Where and how results leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub format: OutputFormat,
    pub delimiter: char,
    pub dir: PathBuf,
    pub filename: String,
}

impl OutputTarget {
    /// Destination file for file-based formats.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.format
            .file_extension()
            .map(|ext| self.dir.join(format!("{}.{}", self.filename, ext)))
    }
}

/// Caller-supplied parameters before validation. Every field has a default.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawSearchArgs {
    pub path: Option<PathBuf>,
    pub query: Option<String>,
    pub ignore_case: bool,
    pub ignore_accents: bool,
    pub regex: bool,
    pub extensions: Option<Vec<String>>,
    pub all: bool,
    pub only_files: bool,
    pub only_dirs: bool,
    pub separator: Option<char>,
    pub output: OutputFormat,
    pub delimiter: Option<char>,
    pub output_path: Option<PathBuf>,
    pub output_filename: Option<String>,
}
