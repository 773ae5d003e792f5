//! Stage 8: rebuild nested lists from the exporter's flat siblings.
//!
//! A nested list comes out of the exporter as separate top-level `<ul>`/
//! `<ol>` elements sitting next to each other, with the nesting depth only
//! recoverable from a class of the form `lst-kix_<id>-<N>` (`N` zero-based;
//! no such class means depth 0). Example export:
//!
//! ```text
//! <ul class="lst-kix_x-0"><li>top</li></ul>
//! <ul class="lst-kix_x-1"><li>nested</li></ul>
//! ```
//!
//! Coalescing walks depth buckets from the deepest down to 1, and within a
//! bucket from the end of the document backwards. The reverse order is what
//! keeps handles fresh: a list merged into its predecessor is never visited
//! again, and runs of same-depth lists chain together right to left. Each
//! list looks at its immediately preceding sibling: a same-depth list means
//! this is a continuation (items are appended, the shell dropped); a
//! shallower list means this whole list nests under that neighbour's last
//! item. Anything else, including a stray text node, leaves the list where
//! it is. Depth-0 lists are never merged upward.

use lazy_static::lazy_static;
use markup5ever_rcdom::Handle;
use regex::Regex;
use tracing::debug;

use crate::dom;
use crate::error::PreprocessError;

lazy_static! {
    static ref DEPTH_RE: Regex = Regex::new(r"^lst-kix_.*-(\d+)").unwrap();
}

/// Zero-based nesting depth from the first depth-encoding class token.
/// Recomputed on demand; never stored on the node.
pub fn list_depth(list: &Handle) -> usize {
    for token in dom::class_tokens(list) {
        let Some(cap) = DEPTH_RE.captures(&token) else {
            continue;
        };
        if let Ok(depth) = cap[1].parse() {
            return depth;
        }
    }
    0
}

/// List elements grouped by depth, each bucket in document order.
fn depth_buckets(root: &Handle) -> Vec<Vec<Handle>> {
    let mut buckets: Vec<Vec<Handle>> = Vec::new();
    for list in dom::collect_elements(root, &["ul", "ol"]) {
        let depth = list_depth(&list);
        if buckets.len() <= depth {
            buckets.resize_with(depth + 1, Vec::new);
        }
        buckets[depth].push(list);
    }
    buckets
}

pub fn coalesce_lists(root: &Handle) -> Result<(), PreprocessError> {
    let buckets = depth_buckets(root);
    for depth in (1..buckets.len()).rev() {
        debug!(depth, lists = buckets[depth].len(), "coalescing depth bucket");
        for list in buckets[depth].iter().rev() {
            let Some(prev) = dom::previous_sibling(list) else {
                continue;
            };
            match dom::tag_lower(&prev).as_deref() {
                Some("ul") | Some("ol") => {}
                _ => continue,
            }
            if list_depth(&prev) == depth {
                merge_continuation(&prev, list);
            } else {
                nest_under_last_item(&prev, list, depth)?;
            }
        }
    }
    Ok(())
}

/// Same depth: `list` continues `prev`. Its children are appended onto
/// `prev` and the emptied shell is dropped from the tree.
fn merge_continuation(prev: &Handle, list: &Handle) {
    let items: Vec<Handle> = list.children.borrow_mut().drain(..).collect();
    dom::append_children(prev, items);
    dom::remove_from_parent(list);
}

/// Shallower neighbour: `list` is a sub-list belonging inside the last item
/// of `prev`. A neighbour with no items has nowhere to put the sub-list;
/// failing beats silently dropping content.
fn nest_under_last_item(
    prev: &Handle,
    list: &Handle,
    depth: usize,
) -> Result<(), PreprocessError> {
    let last_item = {
        let children = prev.children.borrow();
        children
            .iter()
            .rev()
            .find(|c| dom::tag_lower(c).as_deref() == Some("li"))
            .cloned()
    };
    let Some(item) = last_item else {
        return Err(PreprocessError::MalformedListStructure { depth });
    };
    dom::append_child(&item, list);
    Ok(())
}
