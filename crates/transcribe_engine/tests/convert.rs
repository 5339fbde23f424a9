use pretty_assertions::assert_eq;
use transcribe_engine::{ContentSelector, MarkdownConverter, StructuralFilter};
use url::Url;

const BASE: &str = "https://example.com/blog/post";

fn markdown(html: &str) -> String {
    let base = Url::parse(BASE).unwrap();
    let doc = ContentSelector::default().select(html, Some(base));
    let doc = StructuralFilter::default().filter(doc);
    MarkdownConverter::new().convert(&doc)
}

#[test]
fn headings_use_hash_markers() {
    assert_eq!(
        markdown("<main><h1>Title</h1><p>Body text</p><h3>Sub</h3></main>"),
        "# Title\n\nBody text\n\n### Sub"
    );
}

#[test]
fn line_breaks_use_backslash() {
    let out = markdown("<main><p>one<br>two</p></main>");
    assert!(out.contains("one\\\n"), "{out:?}");
    assert!(out.ends_with("two"), "{out:?}");
}

#[test]
fn links_and_images_resolve_against_base() {
    assert_eq!(
        markdown(r#"<main><p>See <a href="/docs">the docs</a>.</p></main>"#),
        "See [the docs](https://example.com/docs)."
    );
    assert_eq!(
        markdown(r#"<main><p><img src="img/a.png" alt="A"></p></main>"#),
        "![A](https://example.com/blog/img/a.png)"
    );
}

#[test]
fn fragment_links_keep_only_text() {
    assert_eq!(markdown(r##"<main><p><a href="#top">Top</a></p></main>"##), "Top");
}

#[test]
fn inline_marks_are_kept() {
    let out = markdown("<main><p><strong>bold</strong> and <em>it</em> and <code>x()</code></p></main>");
    assert!(out.contains("**bold**"), "{out:?}");
    assert!(out.contains("it"), "{out:?}");
    assert!(out.contains("`x()`"), "{out:?}");
}

#[test]
fn markdown_syntax_in_text_is_escaped() {
    let out = markdown("<main><p>2*3*4 and snake_case_name</p><p># not heading</p></main>");
    assert!(out.contains("\\*"), "{out:?}");
    assert!(!out.lines().any(|line| line.starts_with("# not")), "{out:?}");
}

#[test]
fn inline_code_with_backtick_keeps_its_content() {
    let out = markdown("<main><p><code>a`b</code></p></main>");
    assert!(out.contains("``"), "{out:?}");
    assert!(out.contains("a`b"), "{out:?}");
}

#[test]
fn lists_keep_numbering_and_nesting() {
    let out = markdown(r#"<main><ul><li>one</li><li>two</li></ul><ol start="3"><li>x</li></ol></main>"#);
    assert!(out.contains("- one"), "{out:?}");
    assert!(out.contains("- two"), "{out:?}");
    assert!(out.contains("3. x"), "{out:?}");

    let nested = markdown("<main><ul><li>a<ul><li>b</li></ul></li></ul></main>");
    assert!(nested.starts_with("- a"), "{nested:?}");
    assert!(nested.lines().any(|line| line.starts_with(' ') && line.trim() == "- b"), "{nested:?}");
}

#[test]
fn huge_list_start_does_not_overflow() {
    let out = markdown(r#"<main><ol start="18446744073709551615"><li>a</li><li>b</li></ol></main>"#);
    assert!(out.contains('a'), "{out:?}");
    assert!(out.contains('b'), "{out:?}");
}

#[test]
fn blockquotes_prefix_lines() {
    let out = markdown("<main><blockquote><p>q1</p><p>q2</p></blockquote></main>");
    assert!(out.contains("> q1"), "{out:?}");
    assert!(out.contains("> q2"), "{out:?}");
}

#[test]
fn preformatted_code_becomes_fenced() {
    let out = markdown("<main><pre><code class=\"language-rust\">fn main() {}\n</code></pre></main>");
    assert!(out.starts_with("```"), "{out:?}");
    assert!(out.contains("fn main() {}"), "{out:?}");
    assert!(out.ends_with("```"), "{out:?}");
}

#[test]
fn tables_become_pipe_tables() {
    let out = markdown(
        "<main><table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table></main>",
    );
    assert!(out.contains("| A | B |\n| --- | --- |\n| 1 | 2 |"), "{out:?}");
}

#[test]
fn media_elements_become_links() {
    assert_eq!(
        markdown(r#"<main><video src="https://cdn.example/v.mp4"></video></main>"#),
        "[video](https://cdn.example/v.mp4)"
    );
    let sourced = markdown(
        r#"<main><audio><source src="/a/song.mp3"></audio></main>"#,
    );
    assert_eq!(sourced, "[audio](https://example.com/a/song.mp3)");
}

#[test]
fn scripts_never_reach_markdown() {
    let out = markdown("<main><p>kept</p><noscript>hidden</noscript></main>");
    assert_eq!(out, "kept");
}
