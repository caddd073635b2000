//! gitignore-style path policy.
//!
//! Rules are matched last-to-first; the first hit decides. A path under an
//! ignored directory stays ignored even if a later `!` rule names it.

use crate::utils::error::{DashError, Result};
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Ignore list shipped with the dashboard project. The data file is left
/// commented out so deployments can load it straight from the repository.
pub const DEFAULT_POLICY: &str = "\
# Virtual environments
venv/
.venv/
env/
ENV/

# Python caches
__pycache__/
*.py[cod]
*$py.class

# OS metadata
.DS_Store
Thumbs.db

# Editors
.vscode/
.idea/
*.swp

# Temp files and logs
*.log
*.tmp

# Loan data stays tracked so the app can read it after deploy
# data/loan_data.parquet
";

#[derive(Debug, Clone)]
pub struct IgnoreRule {
    original: String,
    line: usize,
    negated: bool,
    dir_only: bool,
    anchored: bool,
    regex: Regex,
}

impl IgnoreRule {
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn line(&self) -> usize {
        self.line
    }

    fn matches(&self, relative: &str, basename: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        let target = if self.anchored { relative } else { basename };
        self.regex.is_match(target)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Match<'a> {
    None,
    Ignored(&'a IgnoreRule),
    Whitelisted(&'a IgnoreRule),
}

impl<'a> Match<'a> {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Match::Ignored(_))
    }

    pub fn rule(&self) -> Option<&'a IgnoreRule> {
        match self {
            Match::None => None,
            Match::Ignored(rule) | Match::Whitelisted(rule) => Some(rule),
        }
    }
}

impl fmt::Display for Match<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule() {
            Some(rule) => write!(f, "{}:{}", rule.line, rule.original),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    rules: Vec<IgnoreRule>,
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self::parse(DEFAULT_POLICY).expect("built-in ignore policy is valid")
    }
}

impl IgnorePolicy {
    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            if let Some(rule) = parse_line(raw, index + 1)? {
                rules.push(rule);
            }
        }
        tracing::debug!("Parsed {} ignore rules", rules.len());
        Ok(Self { rules })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// Decide `path` (relative to the policy root). A trailing `/` marks a directory.
    pub fn matched(&self, path: &str, is_dir: bool) -> Match<'_> {
        let normalized = path.replace('\\', "/");
        let is_dir = is_dir || normalized.ends_with('/');
        let components: Vec<&str> = normalized
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .collect();

        let Some((last, parents)) = components.split_last() else {
            return Match::None;
        };

        for end in 1..=parents.len() {
            let relative = components[..end].join("/");
            let hit = self.match_single(&relative, components[end - 1], true);
            if hit.is_ignored() {
                return hit;
            }
        }

        self.match_single(&components.join("/"), last, is_dir)
    }

    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        self.matched(path, is_dir).is_ignored()
    }

    fn match_single(&self, relative: &str, basename: &str, is_dir: bool) -> Match<'_> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(relative, basename, is_dir))
            .map(|rule| {
                if rule.negated {
                    Match::Whitelisted(rule)
                } else {
                    Match::Ignored(rule)
                }
            })
            .unwrap_or(Match::None)
    }
}

/// One `check-ignore` output line for `path`, or `None` when nothing is printed.
///
/// Plain mode prints ignored paths only. `show_rule` prints `source:line:pattern<TAB>path`
/// for any matching rule, negations included. `non_matching` adds `::<TAB>path` for
/// paths no rule matched.
pub fn check_line(
    source: &str,
    matched: &Match<'_>,
    path: &str,
    show_rule: bool,
    non_matching: bool,
) -> Option<String> {
    match (show_rule, matched.rule()) {
        (true, Some(_)) => Some(format!("{}:{}\t{}", source, matched, path)),
        (false, Some(_)) if matched.is_ignored() => Some(path.to_string()),
        (_, None) if non_matching => Some(format!("::\t{}", path)),
        _ => None,
    }
}

/// Drop trailing spaces unless escaped with a backslash.
fn trim_trailing_spaces(text: &str) -> &str {
    let mut end = text.len();
    while end > 0 && text.as_bytes()[end - 1] == b' ' {
        if end >= 2 && text.as_bytes()[end - 2] == b'\\' {
            break;
        }
        end -= 1;
    }
    &text[..end]
}

fn parse_line(raw: &str, line: usize) -> Result<Option<IgnoreRule>> {
    let text = trim_trailing_spaces(raw.trim_end_matches('\r'));
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let (negated, mut body) = match text.strip_prefix('!') {
        Some(rest) => (true, rest),
        None if text.starts_with("\\!") || text.starts_with("\\#") => (false, &text[1..]),
        None => (false, text),
    };

    let dir_only = body.ends_with('/') && !body.ends_with("\\/");
    if dir_only {
        body = body.trim_end_matches('/');
    }
    let anchored = body.contains('/');
    let body = body.strip_prefix('/').unwrap_or(body);
    if body.is_empty() {
        return Ok(None);
    }

    let source = glob_to_regex(body).map_err(|reason| DashError::InvalidPattern {
        pattern: raw.to_string(),
        line,
        reason,
    })?;
    let regex = Regex::new(&source).map_err(|e| DashError::InvalidPattern {
        pattern: raw.to_string(),
        line,
        reason: e.to_string(),
    })?;

    Ok(Some(IgnoreRule {
        original: text.to_string(),
        line,
        negated,
        dir_only,
        anchored,
        regex,
    }))
}

/// Translate one glob into an anchored regex over `/`-separated paths.
fn glob_to_regex(glob: &str) -> std::result::Result<String, String> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                let start = i;
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                let at_component_start = start == 0 || chars[start - 1] == '/';
                let at_component_end = i == chars.len() || chars[i] == '/';

                if i - start >= 2 && at_component_start && at_component_end {
                    if i == chars.len() {
                        out.push_str(".*");
                    } else {
                        // `**/`：零個或多個目錄
                        out.push_str("(?:.*/)?");
                        i += 1;
                    }
                } else {
                    out.push_str("[^/]*");
                }
                continue;
            }
            '?' => out.push_str("[^/]"),
            '[' => {
                let (class, next) = translate_class(&chars, i)?;
                out.push_str(&class);
                i = next;
                continue;
            }
            '\\' => {
                i += 1;
                let escaped = chars
                    .get(i)
                    .ok_or_else(|| "trailing backslash".to_string())?;
                out.push_str(&regex::escape(&escaped.to_string()));
            }
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    Ok(out)
}

const POSIX_CLASSES: [&str; 12] = [
    "alnum", "alpha", "blank", "cntrl", "digit", "graph", "lower", "print", "punct", "space",
    "upper", "xdigit",
];

/// `[...]` starting at `open`; returns the regex class and the index after `]`.
/// The class never matches `/`.
fn translate_class(chars: &[char], open: usize) -> std::result::Result<(String, usize), String> {
    let mut i = open + 1;
    let negated = matches!(chars.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }
    let first = i;
    let mut body = String::new();

    while i < chars.len() {
        let c = chars[i];
        if c == ']' && i > first {
            let class = format!("[[{}{}]&&[^/]]", if negated { "^" } else { "" }, body);
            return Ok((class, i + 1));
        }
        match c {
            '[' if chars.get(i + 1) == Some(&':') => {
                let rest: String = chars[i + 2..].iter().collect();
                let name = rest
                    .find(":]")
                    .map(|end| &rest[..end])
                    .ok_or_else(|| "unterminated character class".to_string())?;
                if !POSIX_CLASSES.contains(&name) {
                    return Err(format!("unknown character class '[:{}:]'", name));
                }
                body.push_str(&format!("[:{}:]", name));
                i += name.chars().count() + 4;
                continue;
            }
            '-' if i > first && chars.get(i + 1).is_some_and(|n| *n != ']') => body.push('-'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                body.push_str(&regex::escape(&chars[i].to_string()));
            }
            c => body.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    Err("unterminated character class".to_string())
}
