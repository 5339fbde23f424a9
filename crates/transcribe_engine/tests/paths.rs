use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use transcribe_engine::{
    resolve_path, short_hash, OutputLocation, SourceReference, FILTERED_HTML_SUFFIX,
};

fn remote(url: &str) -> SourceReference {
    SourceReference::parse(url).unwrap()
}

#[test]
fn directory_mirrors_host_and_path() {
    let root = Path::new("out");
    let location = OutputLocation::derive(&remote("https://example.com/blog/post/"), root);
    assert_eq!(location.directory(), Path::new("out/example.com/blog"));
    assert_eq!(location.base_name(), "post");
    assert_eq!(
        location.document_path(),
        Path::new("out/example.com/blog/post/post.md")
    );
}

#[test]
fn extension_is_dropped_from_base_name() {
    let location =
        OutputLocation::derive(&remote("https://example.com/a/b/page.html?x=1"), Path::new("out"));
    assert_eq!(location.directory(), Path::new("out/example.com/a/b"));
    assert_eq!(location.base_name(), "page");
}

#[test]
fn empty_path_falls_back_to_hash() {
    let location = OutputLocation::derive(&remote("https://example.com/"), Path::new("out"));
    assert_eq!(location.directory(), Path::new("out/example.com"));
    assert_eq!(location.base_name(), short_hash("https://example.com/"));
}

#[test]
fn port_is_kept_in_host_directory() {
    let location = OutputLocation::derive(&remote("http://127.0.0.1:8080/x"), Path::new("out"));
    assert_eq!(location.directory(), Path::new("out/127.0.0.1_8080"));
}

#[test]
fn debug_artifacts_sit_next_to_the_document() {
    let location = OutputLocation::derive(&remote("https://example.com/p"), Path::new("out"));
    assert_eq!(
        location.artifact_path(FILTERED_HTML_SUFFIX),
        Path::new("out/example.com/p/p.filtered.html")
    );
}

#[cfg(unix)]
#[test]
fn local_files_go_under_local_namespace() {
    let source = SourceReference::parse("file:///home/me/docs/page.html").unwrap();
    let location = OutputLocation::derive(&source, Path::new("out"));
    assert_eq!(location.directory(), Path::new("out/local/docs"));
    assert_eq!(location.base_name(), "page");
}

#[test]
fn resolving_creates_directories_and_is_repeatable() {
    let temp = TempDir::new().unwrap();
    let source = remote("https://example.com/blog/post");

    let first = resolve_path(&source, temp.path()).unwrap();
    assert!(first.directory().is_dir());
    assert!(first.page_dir().is_dir());

    let second = resolve_path(&source, temp.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn derive_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let location = OutputLocation::derive(&remote("https://example.com/a/b"), temp.path());
    assert!(!location.directory().exists());
}
