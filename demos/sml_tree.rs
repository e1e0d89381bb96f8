//! Reading, querying and building SML trees.
//!
//! Run with: cargo run --example sml_tree

use std::error::Error;
use wsv_sml::{NodeId, ParseOptions, SmlDocument, SmlKind};

fn main() -> Result<(), Box<dyn Error>> {
    let text = "\
Config
  # network settings
  Server
    Host   example.org
    Ports  80 443
  End
  Debug  false
End";

    let mut doc = SmlDocument::from_str(text, &ParseOptions::new())?;
    let config = doc.element(doc.root(), "config").ok_or("no Config element")?;
    let server = doc.element(config, "server").ok_or("no Server element")?;

    if let Some(ports) = doc.attribute(server, "ports") {
        println!("Ports: {:?}", doc.values(ports));
    }

    println!("\nNodes:");
    for id in doc.descendants(doc.root()) {
        let kind = doc.kind(id)?;
        let depth = "  ".repeat(ancestors(&doc, id));
        match kind {
            SmlKind::Empty => println!("{}{} (comment: {:?})", depth, kind, doc.comment(id)),
            _ => println!("{}{} {}", depth, kind, doc.name(id).unwrap_or("-")),
        }
    }

    // Build onto the parsed tree
    let client = doc.add_element(config, "Client")?;
    doc.set_spaces(client, vec!["  ".to_string()])?;
    let retries = doc.add_attribute(client, "Retries", ["3"])?;
    doc.set_spaces(retries, vec!["    ".to_string(), " ".to_string()])?;
    doc.set_end_spaces(client, vec!["  ".to_string()])?;

    println!("\nEdited document:\n{}", doc);

    // Unbalanced input still yields what was read
    if let Err(failure) = SmlDocument::from_str("Outer\n  Inner\n    a 1", &ParseOptions::new()) {
        println!("\nError: {}", failure.error);
        println!("Partial tree:\n{}", failure.partial);
    }

    Ok(())
}

/// Number of elements enclosing `target`.
fn ancestors(doc: &SmlDocument, target: NodeId) -> usize {
    fn walk(doc: &SmlDocument, id: NodeId, target: NodeId, level: usize) -> Option<usize> {
        if id == target {
            return Some(level);
        }
        doc.children(id)
            .iter()
            .find_map(|&child| walk(doc, child, target, level + 1))
    }
    walk(doc, doc.root(), target, 0).map_or(0, |level| level.saturating_sub(1))
}
