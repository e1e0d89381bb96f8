//! Writing and reading UTF-8 and UTF-16 files.
//!
//! Run with: cargo run --example encodings

use std::error::Error;
use wsv_sml::{Encoding, ParseOptions, WsvDocument};

fn main() -> Result<(), Box<dyn Error>> {
    let doc = WsvDocument::from_str("Currency Sign\nYen ¥\nEuro €", &ParseOptions::new())?;

    for encoding in [Encoding::Utf8, Encoding::Utf16Be, Encoding::Utf16Le] {
        let mut buffer = Vec::new();
        let written = doc.to_writer(&mut buffer, encoding)?;
        let head: Vec<String> = buffer.iter().take(8).map(|b| format!("{:02X}", b)).collect();
        println!("{:<9} {:>3} bytes  {} ...", encoding.to_string(), written, head.join(" "));

        let back = WsvDocument::from_bytes(&buffer, &ParseOptions::new())?;
        assert_eq!(back, doc);
    }

    match doc.to_bytes(Encoding::Utf32) {
        Ok(_) => println!("UTF-32 unexpectedly encoded"),
        Err(err) => println!("{}", err),
    }

    Ok(())
}
