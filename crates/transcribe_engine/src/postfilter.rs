use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use url::Url;

/// An absolute http(s) URL written inside parentheses, as Markdown links and
/// images do.
pub(crate) static PAREN_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((https?://[^()\s]+)\)").expect("Failed to compile parenthesized URL regex")
});

/// Three or more line breaks, counting whitespace-only lines as empty.
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[ \t\r]*\n){3,}").expect("Failed to compile blank run regex")
});

/// A redirect/tracking URL whose real destination sits in a query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRule {
    pub host: String,
    pub path: String,
    pub param: String,
}

impl RedirectRule {
    pub fn new(host: impl Into<String>, path: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            param: param.into(),
        }
    }

    pub fn google() -> Self {
        Self::new("www.google.com", "/url", "q")
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
            && url.path() == self.path
    }
}

/// Markdown clean-up applied after conversion. Applying it twice gives the
/// same result as applying it once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    redirects: Vec<RedirectRule>,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self::new(vec![RedirectRule::google()])
    }
}

impl PostFilter {
    pub fn new(redirects: Vec<RedirectRule>) -> Self {
        Self { redirects }
    }

    pub fn apply(&self, markdown: &str) -> String {
        let text = trim_blank_edges(markdown);
        let text = collapse_blank_runs(&text);
        let text = strip_trailing_whitespace(&text);
        let text = remove_empty_blockquote_lines(&text);
        self.unwrap_redirects(&text)
    }

    /// Replaces `(redirector?param=<target>&...)` with `(<target>)`, repeating
    /// until no redirector link is left.
    pub fn unwrap_redirects(&self, markdown: &str) -> String {
        let mut current = markdown.to_string();
        loop {
            let next = PAREN_URL_RE
                .replace_all(&current, |caps: &Captures| match self.redirect_target(&caps[1]) {
                    Some(target) => format!("({target})"),
                    None => caps[0].to_string(),
                })
                .into_owned();
            // Each rewrite strictly shortens the text, so this terminates.
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn redirect_target(&self, raw: &str) -> Option<String> {
        let url = Url::parse(raw).ok()?;
        let rule = self.redirects.iter().find(|rule| rule.matches(&url))?;
        let (_, target) = url.query_pairs().find(|(key, _)| key == rule.param.as_str())?;
        let usable = (target.starts_with("http://") || target.starts_with("https://"))
            && !target.contains(|c: char| c.is_whitespace() || c == '(' || c == ')');
        usable.then(|| target.into_owned())
    }
}

/// Drops whitespace-only lines at the start and end.
pub fn trim_blank_edges(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let start = lines.iter().position(|line| !line.trim().is_empty());
    let end = lines.iter().rposition(|line| !line.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

pub fn collapse_blank_runs(markdown: &str) -> String {
    BLANK_RUN_RE.replace_all(markdown, "\n\n").into_owned()
}

pub fn strip_trailing_whitespace(markdown: &str) -> String {
    markdown
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes lines made only of `>` and whitespace. Blank lines left adjacent
/// by a removal are merged, and none are left at either end.
pub fn remove_empty_blockquote_lines(markdown: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in markdown.lines() {
        if is_empty_quote(line) {
            continue;
        }
        let blank = line.trim().is_empty();
        if blank && kept.last().map_or(true, |prev| prev.trim().is_empty()) {
            continue;
        }
        kept.push(line);
    }
    while kept.last().is_some_and(|line| line.trim().is_empty()) {
        kept.pop();
    }
    kept.join("\n")
}

fn is_empty_quote(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '>' || c.is_whitespace())
}
