use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::Html;

use crate::extract::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSettings {
    /// Elements removed together with everything inside them.
    pub noise_tags: Vec<String>,
    /// Elements kept even when they have no text or children.
    pub keep_empty_tags: Vec<String>,
    /// Attributes stripped from every element.
    pub stripped_attributes: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            noise_tags: to_strings(&["style", "script", "iframe", "nav", "svg", "button"]),
            keep_empty_tags: to_strings(&["img", "video", "audio", "source", "br", "hr"]),
            stripped_attributes: to_strings(&["style"]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Removes structural noise from a [`Document`]. Running it on its own
/// output changes nothing.
#[derive(Debug, Clone, Default)]
pub struct StructuralFilter {
    settings: FilterSettings,
}

impl StructuralFilter {
    pub fn new(settings: FilterSettings) -> Self {
        Self { settings }
    }

    pub fn filter(&self, mut document: Document) -> Document {
        let html = document.html_mut();
        self.remove_noise(html);
        self.strip_attributes(html);
        self.prune_empty(html);
        document
    }

    fn is_noise(&self, tag: &str) -> bool {
        contains_ignore_case(&self.settings.noise_tags, tag)
    }

    fn keeps_when_empty(&self, tag: &str) -> bool {
        contains_ignore_case(&self.settings.keep_empty_tags, tag)
    }

    /// Detaches comments and noise-tag subtrees.
    fn remove_noise(&self, html: &mut Html) {
        let doomed: Vec<NodeId> = html
            .tree
            .root()
            .descendants()
            .filter(|node| match node.value() {
                Node::Comment(_) => true,
                Node::Element(element) => self.is_noise(element.name()),
                _ => false,
            })
            .map(|node| node.id())
            .collect();
        detach_all(html, doomed);
    }

    fn strip_attributes(&self, html: &mut Html) {
        if self.settings.stripped_attributes.is_empty() {
            return;
        }
        let elements: Vec<NodeId> = html
            .tree
            .root()
            .descendants()
            .filter(|node| node.value().is_element())
            .map(|node| node.id())
            .collect();

        for id in elements {
            let Some(mut node) = html.tree.get_mut(id) else {
                continue;
            };
            if let Node::Element(element) = node.value() {
                let stripped = &self.settings.stripped_attributes;
                element.attrs = std::mem::take(&mut element.attrs)
                    .into_iter()
                    .filter(|(name, _)| !contains_ignore_case(stripped, &name.local))
                    .collect();
            }
        }
    }

    /// Detaches elements without any text below them. Children are decided
    /// before their parent, so one pass reaches the fixpoint.
    fn prune_empty(&self, html: &mut Html) {
        let protected = html.root_element().id();
        let mut doomed = Vec::new();
        self.mark_empty(html.tree.root(), protected, &mut doomed);
        detach_all(html, doomed);
    }

    /// Returns whether `node` carries content; collects the elements that do not.
    fn mark_empty(&self, node: NodeRef<'_, Node>, protected: NodeId, doomed: &mut Vec<NodeId>) -> bool {
        match node.value() {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(element) => {
                let mut has_content = false;
                for child in node.children() {
                    // No short-circuit: every child subtree needs visiting.
                    has_content |= self.mark_empty(child, protected, doomed);
                }
                let keep = has_content || self.keeps_when_empty(element.name());
                if !keep && node.id() != protected {
                    doomed.push(node.id());
                }
                keep
            }
            Node::Document | Node::Fragment => {
                let mut has_content = false;
                for child in node.children() {
                    has_content |= self.mark_empty(child, protected, doomed);
                }
                has_content
            }
            _ => false,
        }
    }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

fn detach_all(html: &mut Html, ids: Vec<NodeId>) {
    for id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ContentSelector, Extractor};

    fn filtered(html: &str) -> String {
        let doc = ContentSelector::default().select(html, None);
        StructuralFilter::default().filter(doc).to_html()
    }

    #[test]
    fn empty_parents_collapse_in_one_pass() {
        let out = filtered("<main><div><div><span> </span></div></div><p>keep</p></main>");
        assert_eq!(out, "<main><p>keep</p></main>");
    }

    #[test]
    fn custom_noise_tags_are_honoured() {
        let settings = FilterSettings {
            noise_tags: vec!["aside".to_string()],
            ..FilterSettings::default()
        };
        let doc = ContentSelector::default().select("<main><aside>ad</aside><p>text</p></main>", None);
        let out = StructuralFilter::new(settings).filter(doc).to_html();
        assert_eq!(out, "<main><p>text</p></main>");
    }
}
