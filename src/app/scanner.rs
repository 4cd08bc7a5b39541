use crate::app::error::{SearchError, SearchResult};
use crate::app::matcher::{force_separator, Matcher};
use crate::app::models::{EntryKind, MatchRecord, SearchConfig};
use ignore::{DirEntry, WalkBuilder};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Walks a directory tree top-down and collects the entries whose names match.
///
/// Directories are visited pre-order with siblings sorted by file name. The
/// matches of one directory (folders first, then files) come before anything
/// found in its subtree. Excluded folders are pruned before they are opened.
/// Any read error aborts the whole scan.
pub struct Scanner<'a> {
    root: PathBuf,
    config: &'a SearchConfig,
}

/// Matches found among the immediate children of one visited directory.
#[derive(Default)]
struct Level {
    dirs: Vec<MatchRecord>,
    files: Vec<MatchRecord>,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a SearchConfig) -> SearchResult<Self> {
        let root = resolve_root(&config.root)?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> SearchResult<Vec<MatchRecord>> {
        self.scan_with(|_| {})
    }

    /// Same as [`scan`](Self::scan), calling `on_dir` for every directory
    /// that gets listed.
    pub fn scan_with<F>(&self, mut on_dir: F) -> SearchResult<Vec<MatchRecord>>
    where
        F: FnMut(&Path),
    {
        if self.is_excluded(&self.root) {
            log::debug!("Root {} is an excluded folder", self.root.display());
            return Ok(Vec::new());
        }

        let matcher = Matcher::new(
            &self.config.query,
            self.config.case_sensitive,
            self.config.fold_accents,
        );

        let mut levels: Vec<Level> = Vec::new();
        let mut slots: HashMap<PathBuf, usize> = HashMap::new();
        let mut slot_of = |dir: &Path, levels: &mut Vec<Level>| -> usize {
            *slots.entry(dir.to_path_buf()).or_insert_with(|| {
                levels.push(Level::default());
                levels.len() - 1
            })
        };

        for result in self.walker() {
            let entry = result?;

            if entry.depth() == 0 {
                on_dir(entry.path());
                slot_of(entry.path(), &mut levels);
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let Some(dir) = entry.path().parent() else {
                continue;
            };

            match classify(&entry) {
                EntryKind::Directory => {
                    if is_real_dir(&entry) {
                        on_dir(entry.path());
                        slot_of(entry.path(), &mut levels);
                    }
                    if self.config.matches_dirs()
                        && matcher.is_match(&name)
                        && !self
                            .config
                            .excluded_folder_names
                            .contains(&name.to_lowercase())
                    {
                        let slot = slot_of(dir, &mut levels);
                        levels[slot].dirs.push(self.directory_record(dir, &name));
                    }
                }
                EntryKind::File => {
                    if !self.config.scope.includes_files() || !matcher.is_match(&name) {
                        continue;
                    }
                    let ext = extension_of(&name);
                    let allowed = self
                        .config
                        .extension_filter
                        .as_ref()
                        .map_or(true, |filter| filter.allows(&ext));
                    if allowed {
                        let slot = slot_of(dir, &mut levels);
                        levels[slot].files.push(self.file_record(dir, &name, ext));
                    }
                }
            }
        }

        Ok(levels
            .into_iter()
            .flat_map(|level| level.dirs.into_iter().chain(level.files))
            .collect())
    }

    fn walker(&self) -> ignore::Walk {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        if !self.config.excluded_folder_names.is_empty() {
            let excluded = self.config.excluded_folder_names.clone();
            builder.filter_entry(move |entry| {
                let pruned = entry.depth() > 0
                    && is_real_dir(entry)
                    && excluded.contains(entry.file_name().to_string_lossy().as_ref());
                if pruned {
                    log::debug!("Pruned {}", entry.path().display());
                }
                !pruned
            });
        }

        builder.build()
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        dir.file_name().is_some_and(|n| {
            self.config
                .excluded_folder_names
                .contains(n.to_string_lossy().as_ref())
        })
    }

    fn directory_record(&self, dir: &Path, name: &str) -> MatchRecord {
        let (full_path, parent_path, parent_name) = self.split(dir);
        MatchRecord {
            full_path,
            kind: EntryKind::Directory,
            parent_path,
            parent_name,
            name: None,
            extension: None,
            directory: Some(name.to_string()),
        }
    }

    fn file_record(&self, dir: &Path, name: &str, ext: String) -> MatchRecord {
        let (full_path, parent_path, parent_name) = self.split(dir);
        MatchRecord {
            full_path,
            kind: EntryKind::File,
            parent_path,
            parent_name,
            name: Some(name.to_string()),
            extension: Some(ext),
            directory: None,
        }
    }

    /// `(full_path, parent_path, parent_name)` of `dir` using the configured separator.
    fn split(&self, dir: &Path) -> (String, String, String) {
        let sep = self.config.path_separator;
        let full_path = force_separator(&dir.to_string_lossy(), sep);
        let parent_path = dir
            .parent()
            .map(|p| force_separator(&p.to_string_lossy(), sep))
            .unwrap_or_default();
        let parent_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (full_path, parent_path, parent_name)
    }
}

/// Checks that `root` is an existing directory and returns it absolute.
///
/// A path going through `..` is canonicalized, since a symlink before the
/// `..` changes which directory it names. Otherwise `.` components are
/// dropped and symlinks are kept as written.
pub fn resolve_root(root: &Path) -> SearchResult<PathBuf> {
    if !root.is_dir() {
        return Err(SearchError::InvalidRoot(root.to_path_buf()));
    }
    if root.components().any(|c| c == Component::ParentDir) {
        return fs::canonicalize(root).map_err(|e| SearchError::io(root, e));
    }
    let absolute = std::path::absolute(root).map_err(|e| SearchError::io(root, e))?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Lowercased extension with its leading dot, `""` when the name has none.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn is_real_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
}

/// Symlinks are reported as what they point to, but never descended into.
fn classify(entry: &DirEntry) -> EntryKind {
    match entry.file_type() {
        Some(ft) if ft.is_dir() => EntryKind::Directory,
        Some(ft) if ft.is_symlink() => match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => EntryKind::Directory,
            _ => EntryKind::File,
        },
        _ => EntryKind::File,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{ExtensionFilter, Query, Scope};
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("one")).unwrap();
        fs::create_dir_all(root.join("test/dir1")).unwrap();
        fs::create_dir_all(root.join("test1")).unwrap();
        fs::write(root.join("test/dir1/one.txt"), "").unwrap();
        fs::write(root.join("test1/one.csv"), "").unwrap();
        fs::write(root.join("test1/README"), "").unwrap();
        dir
    }

    fn config(root: &Path, query: &str) -> SearchConfig {
        SearchConfig::new(root, Query::Literal(query.into()))
    }

    #[test]
    fn rejects_missing_root() {
        let dir = tree();
        let cfg = config(&dir.path().join("missing"), "one");
        assert!(matches!(Scanner::new(&cfg), Err(SearchError::InvalidRoot(_))));
    }

    #[test]
    fn rejects_file_as_root() {
        let dir = tree();
        let cfg = config(&dir.path().join("test1/one.csv"), "one");
        assert!(matches!(Scanner::new(&cfg), Err(SearchError::InvalidRoot(_))));
    }

    #[test]
    fn records_point_at_containing_directory() {
        let dir = tree();
        let cfg = config(dir.path(), "one");
        let records = Scanner::new(&cfg).unwrap().scan().unwrap();
        assert_eq!(records.len(), 3);

        for record in &records {
            assert_eq!(
                record.full_path,
                format!("{}/{}", record.parent_path, record.parent_name)
            );
        }

        let file = records
            .iter()
            .find(|r| r.name.as_deref() == Some("one.txt"))
            .unwrap();
        assert_eq!(file.parent_name, "dir1");
        assert_eq!(file.extension.as_deref(), Some(".txt"));
    }

    #[test]
    fn extensionless_files_get_empty_extension() {
        let dir = tree();
        let mut cfg = config(dir.path(), "README");
        cfg.scope = Scope::FilesOnly;
        let records = Scanner::new(&cfg).unwrap().scan().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].extension.as_deref(), Some(""));
    }

    #[test]
    fn inclusion_set_disables_folder_matches() {
        let dir = tree();
        let mut cfg = config(dir.path(), "");
        cfg.extension_filter = Some(ExtensionFilter::Include(HashSet::from([".csv".to_string()])));
        let records = Scanner::new(&cfg).unwrap().scan().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("one.csv"));
    }

    #[test]
    fn excluded_root_yields_nothing() {
        let dir = tree();
        let mut cfg = config(&dir.path().join("test"), "one");
        cfg.excluded_folder_names.insert("test".into());
        let mut visited = 0;
        let records = Scanner::new(&cfg)
            .unwrap()
            .scan_with(|_| visited += 1)
            .unwrap();
        assert!(records.is_empty());
        assert_eq!(visited, 0);
    }

    #[test]
    fn order_is_deterministic() {
        let dir = tree();
        let cfg = config(dir.path(), "");
        let scanner = Scanner::new(&cfg).unwrap();
        assert_eq!(scanner.scan().unwrap(), scanner.scan().unwrap());
    }

    #[test]
    fn root_is_normalized() {
        let dir = tree();
        let root = resolve_root(&dir.path().join(".").join("test")).unwrap();
        assert_eq!(root, std::path::absolute(dir.path().join("test")).unwrap());

        let root = resolve_root(&dir.path().join("test").join("..")).unwrap();
        assert_eq!(root, fs::canonicalize(dir.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn parent_of_symlink_is_the_link_targets_parent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/real")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a/target_file.txt"), "").unwrap();
        std::os::unix::fs::symlink(root.join("a/real"), root.join("b/link")).unwrap();

        let cfg = config(&root.join("b/link/.."), "target_file");
        let records = Scanner::new(&cfg).unwrap().scan().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("target_file.txt"));
        assert_eq!(records[0].parent_name, "a");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_matched_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(OsStr::from_bytes(b"bad\xff.csv")), "").unwrap();
        fs::write(root.join("good.csv"), "").unwrap();

        let mut cfg = config(root, "");
        cfg.scope = Scope::FilesOnly;
        cfg.extension_filter = Some(ExtensionFilter::Include(HashSet::from([".csv".to_string()])));
        let records = Scanner::new(&cfg).unwrap().scan().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.extension.as_deref() == Some(".csv")));
        assert!(records
            .iter()
            .any(|r| r.name.as_deref() == Some("bad\u{FFFD}.csv")));
    }

    #[test]
    fn case_variant_of_excluded_folder_is_walked_but_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Node_Modules")).unwrap();
        fs::write(root.join("Node_Modules/node.txt"), "").unwrap();

        let mut cfg = config(root, "node");
        cfg.case_sensitive = false;
        cfg.excluded_folder_names.insert("node_modules".into());

        let mut visited = Vec::new();
        let records = Scanner::new(&cfg)
            .unwrap()
            .scan_with(|d| visited.push(d.to_path_buf()))
            .unwrap();

        assert!(visited.iter().any(|d| d.ends_with("Node_Modules")));
        assert!(!records
            .iter()
            .any(|r| r.kind == EntryKind::Directory));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("node.txt"));
        assert_eq!(records[0].parent_name, "Node_Modules");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_aborts_without_partial_results() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a_match.txt"), "").unwrap();
        fs::create_dir_all(root.join("locked")).unwrap();
        fs::write(root.join("locked/match.txt"), "").unwrap();
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the directory.
        if fs::read_dir(root.join("locked")).is_ok() {
            fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let cfg = config(root, "match");
        let result = Scanner::new(&cfg).unwrap().scan();
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(SearchError::Walk(_))));
    }

    #[test]
    fn directory_matches_come_before_its_subtree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("one")).unwrap();
        fs::write(root.join("a/one.txt"), "").unwrap();
        fs::write(root.join("one.txt"), "").unwrap();

        let cfg = config(root, "one");
        let records = Scanner::new(&cfg).unwrap().scan().unwrap();
        let order: Vec<(EntryKind, &str, &str)> = records
            .iter()
            .map(|r| {
                let name = r.name.as_deref().or(r.directory.as_deref()).unwrap_or("");
                (r.kind, r.parent_name.as_str(), name)
            })
            .collect();

        let top = root.file_name().unwrap().to_str().unwrap();
        assert_eq!(
            order,
            vec![
                (EntryKind::Directory, top, "one"),
                (EntryKind::File, top, "one.txt"),
                (EntryKind::File, "a", "one.txt"),
            ]
        );
    }

    #[test]
    fn extension_helper() {
        assert_eq!(extension_of("a.TXT"), ".txt");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of(".bashrc"), "");
    }
}
