use crate::app::models::Query;
use deunicode::deunicode;
use std::borrow::Cow;

/// Decides which candidate names satisfy a query.
///
/// Folding (accents first, then case) only affects the comparison; callers
/// always get the original spelling back.
pub struct Matcher<'a> {
    query: &'a Query,
    needle: Cow<'a, str>,
    case_sensitive: bool,
    fold_accents: bool,
}

impl<'a> Matcher<'a> {
    pub fn new(query: &'a Query, case_sensitive: bool, fold_accents: bool) -> Self {
        let needle = match query {
            Query::Literal(s) => fold(s, case_sensitive, fold_accents),
            Query::Pattern(_) => Cow::Borrowed(""),
        };

        Self {
            query,
            needle,
            case_sensitive,
            fold_accents,
        }
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        let haystack = fold(candidate, self.case_sensitive, self.fold_accents);
        match self.query {
            Query::Literal(_) => haystack.contains(self.needle.as_ref()),
            Query::Pattern(re) => re.is_match(&haystack),
        }
    }

    /// The subset of `candidates` that match, in their original order.
    pub fn select<'c, S>(&self, candidates: &'c [S]) -> Vec<&'c S>
    where
        S: AsRef<str>,
    {
        candidates
            .iter()
            .filter(|c| self.is_match(c.as_ref()))
            .collect()
    }
}

fn fold(s: &str, case_sensitive: bool, fold_accents: bool) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(s);
    if fold_accents && !s.is_ascii() {
        out = Cow::Owned(deunicode(&out));
    }
    if !case_sensitive {
        out = Cow::Owned(out.to_lowercase());
    }
    out
}

/// Strips diacritics the same way candidates are folded before comparison.
pub fn fold_accents(s: &str) -> String {
    deunicode(s)
}

/// Rewrites every `/`, `\` or `\\` in `path` to `sep`.
pub fn force_separator(path: &str, sep: char) -> String {
    path.replace("\\\\", "/")
        .chars()
        .map(|c| if c == '/' || c == '\\' { sep } else { c })
        .collect()
}

/// `"MD"`, `"md"`, `".md"` and `"..md"` all become `".md"`.
pub fn normalize_extension(ext: &str) -> String {
    format!(".{}", ext.trim().trim_start_matches('.').to_lowercase())
}
