//! Path and wildcard utilities.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};

/// Expand a leading `~` against the user's home directory.
fn expand_user(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        if let Some(home) = std::env::var_os(var) {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

/// Normalize a user-supplied path: expand `~`, then make absolute against the
/// current directory. Symlinks are not resolved; classification needs them intact.
pub fn fullpath(path: &Path) -> PathBuf {
    let expanded = expand_user(path);
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}

fn is_regex_special(c: char) -> bool {
    matches!(
        c,
        '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '\\' | '[' | ']' | '*' | '?'
    )
}

/// Translate one shell wildcard into a regex body: `*` → `.*`, `?` → `.`,
/// `[seq]` / `[!seq]` pass through as character classes, everything else literal.
fn translate_card(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s:");
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str("\\[");
                } else {
                    let inner: String = chars[i..j].iter().collect();
                    out.push('[');
                    match inner.strip_prefix('!') {
                        Some(rest) => {
                            out.push('^');
                            out.push_str(&rest.replace('\\', "\\\\"));
                        }
                        None => out.push_str(&inner.replace('\\', "\\\\")),
                    }
                    out.push(']');
                    i = j + 1;
                }
            }
            c => {
                if is_regex_special(c) {
                    out.push('\\');
                }
                out.push(c);
            }
        }
    }
    out.push(')');
    out
}

/// A compiled set of shell wildcards. Matching is against the whole string,
/// case-insensitively on Windows.
pub struct CardSet {
    re: Regex,
}

impl CardSet {
    pub fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }
}

/// Compile wildcards into one alternation, each branch anchored.
pub fn compile_cards<S: AsRef<str>>(patterns: &[S]) -> Result<CardSet> {
    let body = patterns
        .iter()
        .map(|p| format!("^{}$", translate_card(p.as_ref())))
        .collect::<Vec<_>>()
        .join("|");
    let re = RegexBuilder::new(&body)
        .case_insensitive(cfg!(windows))
        .build()
        .with_context(|| format!("compile wildcard patterns {body:?}"))?;
    Ok(CardSet { re })
}

/// True when the error chain bottoms out in a missing-file condition. Vanished
/// files are dropped from consideration instead of being reported.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}
