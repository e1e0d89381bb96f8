use wsv_sml::{parse_line, wsv_line, WsvDocument};

#[test]
fn test_macro_line_matches_parsed_line() {
    let built = wsv_line!["id", "name", null, "two words"];
    let parsed = parse_line("id name - \"two words\"", true).unwrap();
    assert_eq!(
        built.iter().collect::<Vec<_>>(),
        parsed.iter().collect::<Vec<_>>()
    );
    assert_eq!(built.to_string(), parsed.to_string());
}

#[test]
fn test_macro_with_variables() {
    let city = "Zürich";
    let population = 421_878;
    let line = wsv_line![city, population.to_string(), null];
    assert_eq!(line.to_string(), "Zürich 421878 -");
}

#[test]
fn test_macro_lines_in_document() {
    let doc: WsvDocument = vec![
        wsv_line!["a", "b"],
        wsv_line![],
        wsv_line![null, "#"],
    ]
    .into_iter()
    .collect();
    assert_eq!(doc.to_string(), "a b\n\n- \"#\"");
}

#[test]
fn test_macro_special_values_are_quoted() {
    let line = wsv_line!["", "-", "a\"b", "x\ny"];
    assert_eq!(line.to_string(), "\"\" \"-\" \"a\"\"b\" \"x\"/\"y\"");
    assert!(!line.is_null(1));
}
