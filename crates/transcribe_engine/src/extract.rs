use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Which element the document was narrowed down to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Article,
    Main,
    Body,
    WholeDocument,
}

impl Container {
    /// Containers in the order they are probed.
    pub const PRIORITY: [(&'static str, Container); 3] = [
        ("article", Container::Article),
        ("main", Container::Main),
        ("body", Container::Body),
    ];
}

/// Owned content tree handed from stage to stage.
///
/// The selector builds it, the structural filter takes it by value and
/// mutates it, the converter only reads it.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    container: Container,
    title: Option<String>,
    base_url: Option<Url>,
}

impl Document {
    pub fn container(&self) -> Container {
        self.container
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub(crate) fn html_mut(&mut self) -> &mut Html {
        &mut self.html
    }

    /// Serialized content, without the wrapper the parser adds around fragments.
    pub fn to_html(&self) -> String {
        match self.container {
            Container::WholeDocument => self.html.html(),
            _ => self.html.root_element().inner_html(),
        }
    }
}

pub trait Extractor: Send + Sync {
    fn select(&self, raw_html: &str, base_url: Option<Url>) -> Document;
}

/// Tag-priority content selector:
/// - `<article>` if present
/// - otherwise `<main>`
/// - otherwise the children of `<body>`, minus page-level header/footer
/// - fallback to the full document.
#[derive(Debug, Clone)]
pub struct ContentSelector {
    strip_body_landmarks: bool,
}

impl ContentSelector {
    pub fn new(strip_body_landmarks: bool) -> Self {
        Self {
            strip_body_landmarks,
        }
    }
}

impl Default for ContentSelector {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Extractor for ContentSelector {
    fn select(&self, raw_html: &str, base_url: Option<Url>) -> Document {
        let parsed = Html::parse_document(raw_html);
        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| {
                parsed
                    .select(&sel)
                    .next()
                    .map(|t| t.text().collect::<String>().trim().to_string())
            })
            .filter(|t| !t.is_empty());

        for (tag, container) in Container::PRIORITY {
            let Ok(selector) = Selector::parse(tag) else {
                continue;
            };
            let Some(node) = parsed.select(&selector).next() else {
                continue;
            };

            let mut html = match container {
                Container::Body => Html::parse_fragment(&node.inner_html()),
                _ => Html::parse_fragment(&node.html()),
            };
            if container == Container::Body && self.strip_body_landmarks {
                detach_landmarks(&mut html);
            }
            return Document {
                html,
                container,
                title,
                base_url,
            };
        }

        Document {
            html: parsed,
            container: Container::WholeDocument,
            title,
            base_url,
        }
    }
}

/// Removes page-level `<header>`/`<footer>` elements. Ones nested inside an
/// article or section belong to that content and are kept.
fn detach_landmarks(html: &mut Html) {
    let Ok(selector) = Selector::parse("header, footer") else {
        return;
    };
    let doomed: Vec<NodeId> = html
        .select(&selector)
        .filter(|element| {
            !element.ancestors().any(|ancestor| {
                ElementRef::wrap(ancestor)
                    .is_some_and(|el| matches!(el.value().name(), "article" | "section"))
            })
        })
        .map(|element| element.id())
        .collect();

    for id in doomed {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_captured() {
        let doc = ContentSelector::default().select(
            "<html><head><title> T </title></head><body><p>x</p></body></html>",
            None,
        );
        assert_eq!(doc.title(), Some("T"));
    }

    #[test]
    fn header_inside_section_survives_body_fallback() {
        let doc = ContentSelector::default().select(
            "<body><header>Site</header><section><header>Intro</header><p>x</p></section></body>",
            None,
        );
        let html = doc.to_html();
        assert!(!html.contains("Site"));
        assert!(html.contains("Intro"));
    }
}
