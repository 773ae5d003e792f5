//! Small helpers over the rcdom tree shared by every rewrite stage.
//!
//! Nodes are `Rc`-owned by their parent; the `parent` cell is a weak
//! backlink used for navigation only. Removing or replacing a node
//! invalidates handles into the removed subtree.

use std::cell::RefCell;
use std::rc::Rc;

use html5ever::tendril::StrTendril;
use html5ever::{namespace_url, ns, Attribute, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData};

pub fn tag_lower(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

pub fn attr_get(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn attr_set(node: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        if let Some(a) = attrs
            .iter_mut()
            .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
        {
            a.value = StrTendril::from(value);
        } else {
            attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: StrTendril::from(value),
            });
        }
    }
}

pub fn class_tokens(node: &Handle) -> Vec<String> {
    attr_get(node, "class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    class_tokens(node).iter().any(|t| t == class)
}

/// Concatenated text of the node and all its descendants, unmodified.
pub fn text_content(node: &Handle) -> String {
    fn collect(node: &Handle, out: &mut String) {
        match &node.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            _ => {
                for c in node.children.borrow().iter() {
                    collect(c, out);
                }
            }
        }
    }
    let mut out = String::new();
    collect(node, &mut out);
    out
}

pub fn new_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(k, v)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*k)),
            value: StrTendril::from(*v),
        })
        .collect();
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(std::rc::Weak::upgrade);
    node.parent.set(weak);
    parent
}

pub fn previous_sibling(node: &Handle) -> Option<Handle> {
    let parent = parent_of(node)?;
    let children = parent.children.borrow();
    let i = children.iter().position(|c| Rc::ptr_eq(c, node))?;
    if i == 0 {
        None
    } else {
        children.get(i - 1).cloned()
    }
}

/// Detach a node from its parent. No-op when already detached.
pub fn remove_from_parent(node: &Handle) {
    if let Some(parent) = parent_of(node) {
        let mut children = parent.children.borrow_mut();
        if let Some(i) = children.iter().position(|c| Rc::ptr_eq(c, node)) {
            children.remove(i);
        }
    }
    node.parent.set(None);
}

/// Detach `child` from wherever it is and append it to `parent`.
pub fn append_child(parent: &Handle, child: &Handle) {
    remove_from_parent(child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// Append already-detached nodes to `parent`, in order.
pub fn append_children(parent: &Handle, children: Vec<Handle>) {
    for c in &children {
        c.parent.set(Some(Rc::downgrade(parent)));
    }
    parent.children.borrow_mut().extend(children);
}

/// Swap `new` into `old`'s position. `new` must be detached; `old` ends
/// detached and must not be navigated afterwards.
pub fn replace_node(old: &Handle, new: &Handle) {
    if let Some(parent) = parent_of(old) {
        let mut children = parent.children.borrow_mut();
        if let Some(i) = children.iter().position(|c| Rc::ptr_eq(c, old)) {
            new.parent.set(Some(Rc::downgrade(&parent)));
            children[i] = new.clone();
        }
    }
    old.parent.set(None);
}

/// Rebuild an element under a different tag, keeping its attributes and
/// moving its children over, then swap it into place. Returns the
/// replacement.
pub fn rename_element(node: &Handle, tag: &str) -> Handle {
    let attrs = match &node.data {
        NodeData::Element { attrs, .. } => attrs.borrow().clone(),
        _ => Vec::new(),
    };
    let new = Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    });
    let moved: Vec<Handle> = node.children.borrow_mut().drain(..).collect();
    append_children(&new, moved);
    replace_node(node, &new);
    new
}

pub fn find_element(node: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: q, .. } = &node.data {
        if q.local.to_string().eq_ignore_ascii_case(name) {
            return Some(node.clone());
        }
    }
    for c in node.children.borrow().iter() {
        if let Some(x) = find_element(c, name) {
            return Some(x);
        }
    }
    None
}

/// All elements under `root` whose tag is one of `tags`, in document order.
pub fn collect_elements(root: &Handle, tags: &[&str]) -> Vec<Handle> {
    fn walk(node: &Handle, tags: &[&str], out: &mut Vec<Handle>) {
        if let Some(tag) = tag_lower(node) {
            if tags.contains(&tag.as_str()) {
                out.push(node.clone());
            }
        }
        for c in node.children.borrow().iter() {
            walk(c, tags, out);
        }
    }
    let mut out = Vec::new();
    walk(root, tags, &mut out);
    out
}
