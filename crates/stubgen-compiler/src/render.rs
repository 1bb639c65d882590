//! RBI rendering of the stub tree.

use crate::tree::{ClassNode, Method, StubTree};

const SIGIL: &str = "# typed: strong";

/// Indent every non-empty line of `text` by `indent` spaces.
///
/// Only lines with nothing before the line break are left alone; a line of
/// spaces is padded like any other.
pub fn indented(text: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim_end_matches(['\r', '\n']).is_empty() {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect()
}

fn render_method(method: &Method) -> String {
    format!(
        "sig {{ returns({}) }}\ndef {}; end\n",
        method.return_type, method.name
    )
}

/// The class declaration alone, without the file header.
pub fn render_class_body(node: &ClassNode) -> String {
    let body = node
        .methods()
        .iter()
        .map(render_method)
        .collect::<Vec<_>>()
        .join("\n");

    format!("class {}\n{}end\n", node.name(), indented(&body, 2))
}

/// A complete stub file for one class.
pub fn render_class(node: &ClassNode) -> String {
    format!(
        "# DO NOT EDIT MANUALLY\n\
         # This is an autogenerated file for dynamic methods in `{name}`.\n\
         # Please instead update this file by running `stubgen`.\n\
         \n\
         {SIGIL}\n\
         \n\
         {body}",
        name = node.name(),
        body = render_class_body(node),
    )
}

/// Every class of the tree in one document.
pub fn render_tree(tree: &StubTree) -> String {
    let classes = tree
        .classes()
        .map(render_class_body)
        .collect::<Vec<_>>()
        .join("\n");

    if classes.is_empty() {
        format!("{SIGIL}\n")
    } else {
        format!("{SIGIL}\n\n{classes}")
    }
}
