//! The rewrite pipeline: parse once, run the stages in order, serialize
//! once.
//!
//! Stage order is a hard dependency chain. Headings synthesized by the
//! title and header/footer stages must exist before the empty-heading
//! sweep, the sweep must run before page-break headings are synthesized
//! (they are intentionally empty), and list coalescing runs last because
//! earlier stages may rewrite nodes adjacent to lists.

use std::path::Path;

use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{RcDom, SerializableHandle};
use tracing::debug;

use crate::error::PreprocessError;
use crate::fetch::ImageFetcher;
use crate::{headings, images, lists, styles};

/// Rewrite one exported document. `source` is both parsed into the tree
/// and kept as raw text for the style-class scan; the two views stay
/// separate and the derived style rules are passed into the retagging step
/// as a value. Fetched images land in `image_dir`.
#[tracing::instrument(skip_all)]
pub fn preprocess(
    source: &str,
    fetcher: &dyn ImageFetcher,
    image_dir: &Path,
) -> Result<String, PreprocessError> {
    let dom = parse_to_dom(source);
    let root = &dom.document;

    images::localize_images(root, fetcher, image_dir)?;
    headings::normalize_titles(root);
    let rules = styles::StyleRules::from_source(source);
    styles::resolve_styles(root, &rules);
    headings::unwrap_heading_images(root);
    headings::extract_header_footer(root);
    headings::remove_empty_headings(root);
    headings::rewrite_page_breaks(root);
    lists::coalesce_lists(root)?;

    debug!("pipeline complete");
    serialize_document(&dom)
}

fn parse_to_dom(input: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(input)
}

/// Serialize the whole document. html5ever escapes text exactly once, so
/// entities the parser resolved come back out correctly.
pub(crate) fn serialize_document(dom: &RcDom) -> Result<String, PreprocessError> {
    let mut buf = Vec::new();
    let handle = SerializableHandle::from(dom.document.clone());
    serialize(&mut buf, &handle, SerializeOpts::default())?;
    String::from_utf8(buf).map_err(|e| PreprocessError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoFetch;

    impl ImageFetcher for NoFetch {
        fn fetch(&self, uri: &str) -> Result<Vec<u8>, PreprocessError> {
            Err(PreprocessError::Fetch {
                uri: uri.to_string(),
                reason: "no network in tests".into(),
            })
        }
    }

    fn run(source: &str) -> String {
        let dir = tempfile::tempdir().unwrap();
        preprocess(source, &NoFetch, dir.path()).unwrap()
    }

    #[test]
    fn stages_compose_over_one_document() {
        let out = run(concat!(
            r#"<style>.c14{font-weight:bold}</style>"#,
            r#"<body>"#,
            r#"<p class="title">Doc Title</p>"#,
            r#"<p><span class="c14">bold bit</span></p>"#,
            r#"<hr style="page-break-before:always;display:none;">"#,
            r#"<ul class="lst-kix_z-0"><li>a</li></ul>"#,
            r#"<ul class="lst-kix_z-1"><li>b</li></ul>"#,
            r#"</body>"#,
        ));
        assert!(out.contains(r#"<h1 class="ew-pandoc-title">Doc Title</h1>"#));
        assert!(out.contains(r#"<strong class="c14">bold bit</strong>"#));
        assert!(out.contains(r#"<h1 class="ew-pandoc-pagebreak"></h1>"#));
        assert!(out.contains(
            r#"<ul class="lst-kix_z-0"><li>a<ul class="lst-kix_z-1"><li>b</li></ul></li></ul>"#
        ));
    }

    #[test]
    fn empty_headings_go_but_pagebreak_heading_survives() {
        let out = run(concat!(
            "<body><h1> </h1>",
            r#"<hr style="page-break-before:always;display:none;">"#,
            "<h2></h2><p>text</p></body>",
        ));
        assert_eq!(out.matches("ew-pandoc-pagebreak").count(), 1);
        assert!(!out.contains("<h2"));
        assert!(!out.contains("<h1> </h1>"));
    }

    #[test]
    fn serializer_does_not_double_escape() {
        let out = run("<p>a &amp; b</p>");
        assert!(out.contains("a &amp; b"));
        assert!(!out.contains("&amp;amp;"));
    }

    #[test]
    fn malformed_list_structure_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let source = concat!(
            r#"<ul class="lst-kix_a-0"></ul>"#,
            r#"<ul class="lst-kix_a-1"><li>x</li></ul>"#,
        );
        let err = preprocess(source, &NoFetch, dir.path()).unwrap_err();
        assert!(matches!(err, PreprocessError::MalformedListStructure { .. }));
    }
}
