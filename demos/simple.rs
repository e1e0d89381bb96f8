//! Parsing, editing and writing WSV lines.
//!
//! Run with: cargo run --example simple

use std::error::Error;
use wsv_sml::{parse_line, wsv_line, ParseOptions, WsvDocument};

fn main() -> Result<(), Box<dyn Error>> {
    let text = "\
# name      age  city
Alice       30   \"New York\"
Bob         -    Berlin      # age unknown
\"Ann Lee\"   41   \"\"";

    let mut doc = WsvDocument::from_str(text, &ParseOptions::new())?;
    println!("Parsed {} lines", doc.len());

    for line in doc.iter().filter(|line| !line.is_empty()) {
        let values: Vec<&str> = line.iter().map(|v| v.unwrap_or("<null>")).collect();
        println!("  {:?}", values);
    }

    // Edit in place; spacing and comments stay where they were
    let bob = &mut doc.lines_mut()[2];
    bob.set_value(1, "27");
    bob.set_comment(" age confirmed")?;
    doc.push(wsv_line!["Zoë", "35", null]);

    println!("\nEdited document:\n{}", doc);
    println!("\nMinimal form:\n{}", doc.to_minimal_string());

    // Errors carry line and column
    if let Err(err) = parse_line("Carol 29 \"unterminated", true) {
        println!("\nError: {}", err);
    }

    Ok(())
}
