use crate::app::error::{SearchError, SearchResult};
use crate::app::matcher::{fold_accents, normalize_extension};
use crate::app::models::{
    ExtensionFilter, OutputTarget, Query, RawSearchArgs, Scope, SearchConfig,
};
use crate::app::scanner::resolve_root;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_IGNORE_FOLDERS: [&str; 6] = [
    "site-packages",
    ".git",
    "$RECYCLE.BIN",
    "node_modules",
    "__pycache__",
    ".vscode",
];

/// Persisted defaults shared by every search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Defaults {
    pub ignore_folders: Vec<String>,
    pub ignore_extensions: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            ignore_folders: DEFAULT_IGNORE_FOLDERS.iter().map(|s| s.to_string()).collect(),
            ignore_extensions: Vec::new(),
        }
    }
}

impl Defaults {
    /// Extensions with a single leading dot, lowercased.
    pub fn normalized_extensions(&self) -> HashSet<String> {
        self.ignore_extensions
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| normalize_extension(e))
            .collect()
    }
}

/// Reads and writes the defaults file. Searches only ever read it.
#[derive(Debug, Clone)]
pub struct DefaultsStore {
    path: PathBuf,
}

impl DefaultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/findhelp/config.toml`
    pub fn user() -> SearchResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| SearchError::ConfigFile("Could not determine home directory".into()))?;
        Ok(Self::new(
            home.join(".config").join("findhelp").join("config.toml"),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Built-in defaults when the file does not exist yet.
    pub fn load(&self) -> SearchResult<Defaults> {
        if !self.path.exists() {
            return Ok(Defaults::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| SearchError::io(&self.path, e))?;
        toml::from_str(&content).map_err(|e| {
            SearchError::ConfigFile(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    pub fn save(&self, defaults: &Defaults) -> SearchResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SearchError::io(parent, e))?;
        }
        let content = toml::to_string_pretty(defaults)
            .map_err(|e| SearchError::ConfigFile(format!("Failed to serialize defaults: {}", e)))?;
        fs::write(&self.path, content).map_err(|e| SearchError::io(&self.path, e))
    }

    /// `None` (or an empty list) restores the built-in folder list.
    pub fn set_ignore_folders(&self, folders: Option<Vec<String>>) -> SearchResult<Defaults> {
        let mut defaults = self.load()?;
        defaults.ignore_folders = match folders {
            Some(list) if !list.is_empty() => list,
            _ => Defaults::default().ignore_folders,
        };
        self.save(&defaults)?;
        Ok(defaults)
    }

    /// `None` (or an empty list) clears the excluded extensions.
    pub fn set_ignore_extensions(&self, extensions: Option<Vec<String>>) -> SearchResult<Defaults> {
        let mut defaults = self.load()?;
        defaults.ignore_extensions = extensions.unwrap_or_default();
        self.save(&defaults)?;
        Ok(defaults)
    }
}

/// Validates raw parameters into a search and its output target.
///
/// `default_filename` is used when no output filename was given.
pub fn resolve_config(
    args: &RawSearchArgs,
    defaults: &Defaults,
    default_filename: &str,
) -> SearchResult<(SearchConfig, OutputTarget)> {
    let output_dir = args.output_path.clone().unwrap_or_else(|| PathBuf::from("."));
    if !output_dir.is_dir() {
        return Err(SearchError::OutputTarget(format!(
            "{} is not a valid directory",
            output_dir.display()
        )));
    }

    let filename = match args.output_filename.as_deref() {
        Some("") => {
            return Err(SearchError::OutputTarget(
                "Filename can't be empty if passed as argument".into(),
            ))
        }
        Some(name) => sanitize_filename(name),
        None => default_filename.to_string(),
    };

    if args.only_files && args.only_dirs {
        return Err(SearchError::InvalidConfiguration(
            "only files and only directories can't be combined".into(),
        ));
    }

    let query = args.query.clone().unwrap_or_default();
    let has_extensions = args.extensions.as_ref().is_some_and(|e| !e.is_empty());
    if query.is_empty() && !has_extensions && !args.only_dirs && !args.only_files {
        return Err(SearchError::InvalidConfiguration(
            "an empty search string requires only directories, only files or extensions".into(),
        ));
    }

    let root = resolve_root(args.path.as_deref().unwrap_or(Path::new(".")))?;

    let query = if args.ignore_accents {
        fold_accents(&query)
    } else {
        query
    };
    let query = if args.regex {
        Query::Pattern(
            RegexBuilder::new(&query)
                .case_insensitive(args.ignore_case)
                .build()?,
        )
    } else {
        Query::Literal(query)
    };

    let scope = if args.only_dirs {
        Scope::DirsOnly
    } else if args.only_files {
        Scope::FilesOnly
    } else {
        Scope::Both
    };

    let extension_filter = if scope == Scope::DirsOnly {
        None
    } else if has_extensions {
        let include = args
            .extensions
            .iter()
            .flatten()
            .map(|e| normalize_extension(e))
            .collect();
        Some(ExtensionFilter::Include(include))
    } else {
        let exclude = defaults.normalized_extensions();
        (!exclude.is_empty()).then_some(ExtensionFilter::Exclude(exclude))
    };

    let excluded_folder_names = if args.all {
        HashSet::new()
    } else {
        defaults.ignore_folders.iter().cloned().collect()
    };

    let config = SearchConfig {
        root,
        query,
        case_sensitive: !args.ignore_case,
        fold_accents: args.ignore_accents,
        scope,
        extension_filter,
        excluded_folder_names,
        path_separator: args.separator.unwrap_or('/'),
    };

    let target = OutputTarget {
        format: args.output,
        delimiter: args.delimiter.unwrap_or('\t'),
        dir: output_dir,
        filename,
    };

    Ok((config, target))
}

/// `args` with every default filled in from the resolved search and target.
pub fn resolved_args(
    args: &RawSearchArgs,
    config: &SearchConfig,
    target: &OutputTarget,
) -> RawSearchArgs {
    RawSearchArgs {
        path: Some(config.root.clone()),
        query: Some(args.query.clone().unwrap_or_default()),
        separator: Some(config.path_separator),
        delimiter: Some(target.delimiter),
        output_path: Some(target.dir.clone()),
        output_filename: Some(target.filename.clone()),
        ..args.clone()
    }
}

/// Keeps word characters, dots, parentheses, spaces and hyphens.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '(' | ')' | ' ' | '-'))
        .collect()
}
