//! Stage 3: turn CSS-class-encoded styling into semantic tags.
//!
//! The exporter styles inline spans through generated classes declared in
//! an embedded stylesheet, e.g.
//!
//! ```text
//! .c14{font-weight:bold}
//! <span class="c14">Bold Text</span>
//! ```
//!
//! The declarations are extracted from the raw source text (not the parsed
//! tree) with three exact-form scans, then matching spans are retagged:
//! bold becomes `<strong>`, italic becomes `<em>`. Underline has no
//! semantic tag the downstream converter accepts, so those spans become
//! `<span class="underline">` around their text content and are left for a
//! downstream filter to translate.

use lazy_static::lazy_static;
use markup5ever_rcdom::Handle;
use regex::Regex;
use tracing::debug;

use crate::dom;

lazy_static! {
    static ref BOLD_RE: Regex = Regex::new(r"\.(c\d+)\{font-weight:bold\}").unwrap();
    static ref ITALIC_RE: Regex = Regex::new(r"\.(c\d+)\{font-style:italic\}").unwrap();
    static ref UNDERLINE_RE: Regex = Regex::new(r"\.(c\d+)\{text-decoration:underline\}").unwrap();
}

/// Class names grouped by the style they encode. Derived once per run from
/// the raw source and discarded after retagging; nothing is stored on the
/// document.
#[derive(Debug, Default)]
pub struct StyleRules {
    bold: Vec<String>,
    italic: Vec<String>,
    underline: Vec<String>,
}

impl StyleRules {
    pub fn from_source(source: &str) -> Self {
        let scan = |re: &Regex| {
            re.captures_iter(source)
                .map(|cap| cap[1].to_string())
                .collect::<Vec<_>>()
        };
        let rules = Self {
            bold: scan(&BOLD_RE),
            italic: scan(&ITALIC_RE),
            underline: scan(&UNDERLINE_RE),
        };
        debug!(
            bold = rules.bold.len(),
            italic = rules.italic.len(),
            underline = rules.underline.len(),
            "extracted style classes"
        );
        rules
    }
}

/// Retag every span matching a style rule. Zero matches is the normal case
/// for documents without that styling.
pub fn resolve_styles(root: &Handle, rules: &StyleRules) {
    for class in &rules.bold {
        for span in spans_with_class(root, class) {
            dom::rename_element(&span, "strong");
        }
    }
    for class in &rules.italic {
        for span in spans_with_class(root, class) {
            dom::rename_element(&span, "em");
        }
    }
    for class in &rules.underline {
        for span in spans_with_class(root, class) {
            let replacement = dom::new_element("span", &[("class", "underline")]);
            dom::append_child(&replacement, &dom::new_text(&dom::text_content(&span)));
            dom::replace_node(&span, &replacement);
        }
    }
}

fn spans_with_class(root: &Handle, class: &str) -> Vec<Handle> {
    dom::collect_elements(root, &["span"])
        .into_iter()
        .filter(|s| dom::has_class(s, class))
        .collect()
}
