//! Aligning attribute rows into columns.
//!
//! Run with: cargo run --example align_table

use std::error::Error;
use wsv_sml::{AlignOptions, ParseOptions, SmlDocument};

fn main() -> Result<(), Box<dyn Error>> {
    let text = "\
Planets
  Mercury 0.39 \"rocky, small\"  # closest
  Jupiter 5.2 \"gas giant\"
  Neptune 30.07 -
  Earth 1 home
End";

    let mut doc = SmlDocument::from_str(text, &ParseOptions::new())?;
    let planets = doc.element(doc.root(), "planets").ok_or("no Planets element")?;
    println!("Before:\n{}\n", doc);

    doc.align_attributes(planets, &AlignOptions::new())?;
    println!("Left aligned:\n{}\n", doc);

    let options = AlignOptions::new()
        .with_separator("  ")
        .with_right_aligned(vec![false, true]);
    doc.align_attributes(planets, &options)?;
    println!("Distances right aligned:\n{}", doc);

    Ok(())
}
