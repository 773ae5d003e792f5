//! Stages 2 and 4-7: heading-related rewrites.
//!
//! Marker classes on the synthesized headings are how the downstream
//! converter and its filters find titles, page headers/footers, and page
//! breaks, so their exact spelling is part of the output contract.

use std::rc::Rc;

use markup5ever_rcdom::Handle;
use tracing::debug;

use crate::dom;

pub const TITLE_CLASS: &str = "ew-pandoc-title";
pub const SUBTITLE_CLASS: &str = "ew-pandoc-subtitle";
pub const HEADER_CLASS: &str = "ew-pandoc-header";
pub const FOOTER_CLASS: &str = "ew-pandoc-footer";
pub const PAGEBREAK_CLASS: &str = "ew-pandoc-pagebreak";

/// The exporter's page-break marker, matched byte for byte. Reordered or
/// re-spaced declarations do not count.
const PAGEBREAK_STYLE: &str = "page-break-before:always;display:none;";

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

fn heading_with_text(class: &str, text: &str) -> Handle {
    let h = dom::new_element("h1", &[("class", class)]);
    dom::append_child(&h, &dom::new_text(text));
    h
}

/// Stage 2: `<p class="title">` and `<p class="subtitle">` become level-1
/// headings carrying a marker class, keeping text content only. A later
/// metadata-extraction step locates them by that class.
pub fn normalize_titles(root: &Handle) {
    for (marker, class) in [("title", TITLE_CLASS), ("subtitle", SUBTITLE_CLASS)] {
        for p in dom::collect_elements(root, &["p"]) {
            if !dom::has_class(&p, marker) {
                continue;
            }
            let heading = heading_with_text(class, &dom::text_content(&p));
            dom::replace_node(&p, &heading);
        }
    }
}

/// Stage 4: an image inside a heading replaces the heading wholesale. The
/// downstream converter cannot render images in headings; keeping the image
/// beats keeping the heading text.
pub fn unwrap_heading_images(root: &Handle) {
    for heading in dom::collect_elements(root, &HEADING_TAGS) {
        let Some(img) = dom::collect_elements(&heading, &["img"]).into_iter().next() else {
            continue;
        };
        debug!("hoisting image out of heading");
        dom::remove_from_parent(&img);
        dom::replace_node(&heading, &img);
    }
}

/// Stage 5: a `<div>` that is the body's very first child (no preceding
/// sibling of any kind, text included) becomes a page-header heading; the
/// very last child symmetrically becomes a page-footer heading.
///
/// When the body has a single div child both conditions hold; the footer
/// rewrite runs second against the already-replaced node and wins.
pub fn extract_header_footer(root: &Handle) {
    let Some(body) = dom::find_element(root, "body") else {
        return;
    };
    let original: Vec<Handle> = body.children.borrow().clone();
    let (Some(first), Some(last)) = (original.first(), original.last()) else {
        return;
    };

    let first_is_div = dom::tag_lower(first).as_deref() == Some("div");
    let last_is_div = dom::tag_lower(last).as_deref() == Some("div");
    let single = Rc::ptr_eq(first, last);

    let mut first_slot = first.clone();
    if first_is_div {
        let heading = heading_with_text(HEADER_CLASS, &dom::text_content(first));
        dom::replace_node(first, &heading);
        first_slot = heading;
    }
    if last_is_div {
        let heading = heading_with_text(FOOTER_CLASS, &dom::text_content(last));
        let occupant = if single { &first_slot } else { last };
        dom::replace_node(occupant, &heading);
    }
}

/// Stage 6: drop headings whose whole text is whitespace. The exporter
/// leaves plenty of these, especially around page breaks. Must run before
/// page-break rewriting so the synthesized (empty) page-break headings
/// survive.
pub fn remove_empty_headings(root: &Handle) {
    for heading in dom::collect_elements(root, &HEADING_TAGS) {
        if dom::text_content(&heading).trim().is_empty() {
            dom::remove_from_parent(&heading);
        }
    }
}

/// Stage 7: replace the exporter's styled `<hr>` page-break marker with an
/// empty heading the converter can see.
pub fn rewrite_page_breaks(root: &Handle) {
    for hr in dom::collect_elements(root, &["hr"]) {
        if dom::attr_get(&hr, "style").as_deref() == Some(PAGEBREAK_STYLE) {
            let heading = dom::new_element("h1", &[("class", PAGEBREAK_CLASS)]);
            dom::replace_node(&hr, &heading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html5ever::parse_document;
    use html5ever::tendril::TendrilSink;
    use markup5ever_rcdom::RcDom;

    fn parse(input: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(input)
    }

    fn to_html(dom: &RcDom) -> String {
        crate::pipeline::serialize_document(dom).unwrap()
    }

    #[test]
    fn title_paragraph_becomes_marked_heading() {
        let dom = parse(r#"<p class="title c2"><span>My Doc</span></p>"#);
        normalize_titles(&dom.document);
        let out = to_html(&dom);
        assert!(out.contains(r#"<h1 class="ew-pandoc-title">My Doc</h1>"#));
        assert!(!out.contains("<p"));
    }

    #[test]
    fn subtitle_paragraph_becomes_marked_heading() {
        let dom = parse(r#"<p class="subtitle">sub</p>"#);
        normalize_titles(&dom.document);
        assert!(to_html(&dom).contains(r#"<h1 class="ew-pandoc-subtitle">sub</h1>"#));
    }

    #[test]
    fn image_replaces_its_heading() {
        let dom = parse(r#"<h2>caption<img src="x.jpg"></h2><p>after</p>"#);
        unwrap_heading_images(&dom.document);
        let out = to_html(&dom);
        assert!(!out.contains("<h2"));
        assert!(!out.contains("caption"));
        assert!(out.contains(r#"<img src="x.jpg">"#));
        assert!(out.contains("<p>after</p>"));
    }

    #[test]
    fn first_and_last_divs_become_header_and_footer() {
        let dom = parse("<body><div>Top</div><p>middle</p><div>Bottom</div></body>");
        extract_header_footer(&dom.document);
        let out = to_html(&dom);
        assert!(out.contains(r#"<h1 class="ew-pandoc-header">Top</h1>"#));
        assert!(out.contains(r#"<h1 class="ew-pandoc-footer">Bottom</h1>"#));
        assert!(out.contains("<p>middle</p>"));
    }

    #[test]
    fn single_div_body_becomes_footer() {
        // both rewrites fire; the footer rewrite runs second and wins
        let dom = parse("<body><div>only</div></body>");
        extract_header_footer(&dom.document);
        let out = to_html(&dom);
        assert!(out.contains(r#"<h1 class="ew-pandoc-footer">only</h1>"#));
        assert!(!out.contains("ew-pandoc-header"));
    }

    #[test]
    fn divs_with_neighbours_on_one_side_only() {
        let dom = parse("<body><p>lead</p><div>tail</div></body>");
        extract_header_footer(&dom.document);
        let out = to_html(&dom);
        assert!(out.contains(r#"<h1 class="ew-pandoc-footer">tail</h1>"#));
        assert!(!out.contains("ew-pandoc-header"));
    }

    #[test]
    fn whitespace_only_headings_are_removed() {
        let dom = parse("<h1>  </h1><h2>keep</h2><h3></h3>");
        remove_empty_headings(&dom.document);
        let out = to_html(&dom);
        assert!(!out.contains("<h1"));
        assert!(!out.contains("<h3"));
        assert!(out.contains("<h2>keep</h2>"));
    }

    #[test]
    fn exact_pagebreak_marker_is_rewritten() {
        let dom = parse(r#"<p>a</p><hr style="page-break-before:always;display:none;"><p>b</p>"#);
        rewrite_page_breaks(&dom.document);
        let out = to_html(&dom);
        assert!(out.contains(r#"<h1 class="ew-pandoc-pagebreak"></h1>"#));
        assert!(!out.contains("<hr"));
    }

    #[test]
    fn reordered_pagebreak_style_is_left_alone() {
        let dom = parse(r#"<hr style="display:none;page-break-before:always;">"#);
        rewrite_page_breaks(&dom.document);
        let out = to_html(&dom);
        assert!(out.contains("<hr"));
        assert!(!out.contains("ew-pandoc-pagebreak"));
    }
}
