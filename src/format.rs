use categorier_core::{AttributeValue, Result};
use categorier_graph::GraphManager;

/// Numbered listing, one name per line.
pub fn format_listing<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = String::new();
    for (i, name) in names.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, name.as_ref()));
    }
    out
}

pub fn format_node(graph: &GraphManager, name: &str) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("═══ {} ═══\n", name));

    let sections = [
        ("parents", graph.parents(name)?),
        ("children", graph.children(name)?),
        ("ancestors", graph.ancestors(name)?),
        ("descendants", graph.descendants(name)?),
    ];
    for (label, names) in &sections {
        if !names.is_empty() {
            out.push_str(&format!("{}: {}\n", label, names.join(", ")));
        }
    }

    let attributes = graph.attributes(name)?;
    if !attributes.is_empty() {
        out.push('\n');
    }
    for (key, value) in attributes {
        match value {
            AttributeValue::Scalar(s) => out.push_str(&format!("{}: {}\n", key, s)),
            AttributeValue::List(items) => {
                out.push_str(&format!("{}:\n", key));
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&format!("  {}. {}\n", i + 1, item));
                }
            }
        }
    }
    Ok(out)
}
