use engine_logging::engine_warn;
use htmd::element_handler::{HandlerResult, Handlers};
use htmd::options::{
    BrStyle, BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, Options,
};
use htmd::{Element, HtmlToMarkdown};
use scraper::node::Node;
use scraper::Html;
use url::Url;

use crate::extract::Document;

/// Elements that never contribute text, even when the filter kept them.
const SKIPPED_TAGS: [&str; 9] = [
    "script", "style", "noscript", "iframe", "template", "head", "svg", "button", "nav",
];

/// Largest `<ol start>` passed on; bigger values are clamped.
const MAX_LIST_START: u32 = u32::MAX;

const CELL: char = '\u{E000}';
const HEADER_CELL: char = '\u{E001}';
const ROW: char = '\u{E002}';

/// Filtered tree to Markdown with a fixed style: ATX headings, backslash line
/// breaks, dash bullets, backtick fences. Links and images are absolutised
/// against the document's base URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn convert(&self, document: &Document) -> String {
        let mut prepared = document.clone();
        clamp_list_starts(prepared.html_mut());
        let html = prepared.to_html();

        let base = document.base_url().cloned();
        let (link_base, image_base, source_base) = (base.clone(), base.clone(), base.clone());
        let (video_base, audio_base) = (base.clone(), base);

        let converter = HtmlToMarkdown::builder()
            .skip_tags(SKIPPED_TAGS.to_vec())
            .options(Options {
                heading_style: HeadingStyle::Atx,
                br_style: BrStyle::Backslash,
                bullet_list_marker: BulletListMarker::Dash,
                code_block_style: CodeBlockStyle::Fenced,
                code_block_fence: CodeBlockFence::Backticks,
                ..Default::default()
            })
            .add_handler(vec!["a"], move |handlers: &dyn Handlers, element: Element| {
                anchor(handlers, element, link_base.as_ref())
            })
            .add_handler(vec!["img"], move |_: &dyn Handlers, element: Element| {
                image(element, image_base.as_ref())
            })
            .add_handler(vec!["source"], move |_: &dyn Handlers, element: Element| {
                let url = attr(&element, "src")
                    .and_then(|src| resolve_url(&src, source_base.as_ref()))?;
                Some(translated(format!("\n{url}\n")))
            })
            .add_handler(vec!["video"], move |handlers: &dyn Handlers, element: Element| {
                media(handlers, element, "video", video_base.as_ref())
            })
            .add_handler(vec!["audio"], move |handlers: &dyn Handlers, element: Element| {
                media(handlers, element, "audio", audio_base.as_ref())
            })
            .add_handler(vec!["td"], |handlers: &dyn Handlers, element: Element| {
                Some(translated(format!("{CELL}{}", cell_text(handlers, element))))
            })
            .add_handler(vec!["th"], |handlers: &dyn Handlers, element: Element| {
                Some(translated(format!("{HEADER_CELL}{}", cell_text(handlers, element))))
            })
            .add_handler(vec!["tr"], |handlers: &dyn Handlers, element: Element| {
                let content = handlers.walk_children(element.node).content;
                Some(translated(format!("{ROW}{}", content.trim())))
            })
            .add_handler(vec!["table"], |handlers: &dyn Handlers, element: Element| {
                let content = handlers.walk_children(element.node).content;
                Some(translated(format!("\n\n{}\n\n", pipe_table(&content))))
            })
            .build();

        match converter.convert(&html) {
            Ok(markdown) => markdown.trim().to_string(),
            Err(err) => {
                engine_warn!("markdown conversion failed: {}", err);
                String::new()
            }
        }
    }
}

fn translated(content: String) -> HandlerResult {
    HandlerResult {
        content,
        markdown_translated: true,
    }
}

fn attr(element: &Element, name: &str) -> Option<String> {
    element
        .attrs
        .iter()
        .find(|a| a.name.local.to_string() == name)
        .map(|a| a.value.to_string())
}

fn anchor(handlers: &dyn Handlers, element: Element, base: Option<&Url>) -> Option<HandlerResult> {
    let target = attr(&element, "href").and_then(|href| resolve_url(&href, base));
    let text = collapse_lines(&handlers.walk_children(element.node).content);
    Some(translated(match target {
        Some(url) if text.is_empty() => format!("[{url}]({url})"),
        Some(url) => format!("[{text}]({url})"),
        None => text,
    }))
}

fn image(element: Element, base: Option<&Url>) -> Option<HandlerResult> {
    let Some(url) = attr(&element, "src").and_then(|src| resolve_url(&src, base)) else {
        return Some(translated(String::new()));
    };
    let alt = attr(&element, "alt").unwrap_or_default();
    Some(translated(format!("![{}]({url})", alt.trim())))
}

/// `[video](url)` from the element's `src` or its first `<source>`.
fn media(
    handlers: &dyn Handlers,
    element: Element,
    label: &str,
    base: Option<&Url>,
) -> Option<HandlerResult> {
    let url = match attr(&element, "src").and_then(|src| resolve_url(&src, base)) {
        Some(url) => Some(url),
        None => handlers
            .walk_children(element.node)
            .content
            .lines()
            .find_map(|line| Url::parse(line.trim()).ok()),
    };
    Some(translated(match url {
        Some(url) => format!("\n\n[{label}]({url})\n\n"),
        None => String::new(),
    }))
}

fn cell_text(handlers: &dyn Handlers, element: Element) -> String {
    collapse_lines(&handlers.walk_children(element.node).content).replace('|', "\\|")
}

/// Builds a GFM table from rows and cells marked by the `tr`/`td`/`th`
/// handlers. A table without a header row gets an empty one.
fn pipe_table(content: &str) -> String {
    let rows: Vec<(Vec<&str>, bool)> = content
        .split(ROW)
        .skip(1)
        .map(|row| {
            let header = row.contains(HEADER_CELL);
            let cells = row
                .split([CELL, HEADER_CELL])
                .skip(1)
                .map(str::trim)
                .collect();
            (cells, header)
        })
        .filter(|(cells, _): &(Vec<&str>, bool)| !cells.is_empty())
        .collect();
    let Some(columns) = rows.iter().map(|(cells, _)| cells.len()).max() else {
        return String::new();
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header_present = rows.first().is_some_and(|(_, header)| *header);
    if !header_present {
        lines.push(format_row(&[], columns));
        lines.push(separator_row(columns));
    }
    for (index, (cells, _)) in rows.iter().enumerate() {
        lines.push(format_row(cells, columns));
        if index == 0 && header_present {
            lines.push(separator_row(columns));
        }
    }
    lines.join("\n")
}

fn format_row(cells: &[&str], columns: usize) -> String {
    let mut padded = cells.to_vec();
    padded.resize(columns, "");
    format!("| {} |", padded.join(" | "))
}

fn separator_row(columns: usize) -> String {
    format!("|{}", " --- |".repeat(columns))
}

fn collapse_lines(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrites `<ol start>` values too large to count from so list numbering
/// cannot overflow.
fn clamp_list_starts(html: &mut Html) {
    let lists: Vec<_> = html
        .tree
        .root()
        .descendants()
        .filter(|node| matches!(node.value(), Node::Element(el) if el.name() == "ol"))
        .map(|node| node.id())
        .collect();

    for id in lists {
        let Some(mut node) = html.tree.get_mut(id) else {
            continue;
        };
        if let Node::Element(element) = node.value() {
            element.attrs = std::mem::take(&mut element.attrs)
                .into_iter()
                .map(|(name, value)| {
                    if &*name.local == "start" && !fits_list_start(&value) {
                        (name, MAX_LIST_START.to_string().into())
                    } else {
                        (name, value)
                    }
                })
                .collect();
        }
    }
}

fn fits_list_start(value: &str) -> bool {
    let value = value.trim();
    value.parse::<u32>().is_ok() || !value.bytes().all(|b| b.is_ascii_digit())
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") || lower.starts_with("data:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
