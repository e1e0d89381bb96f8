use wsv_sml::{Error, ParseOptions, SmlDocument, SmlKind};

fn parse(text: &str) -> SmlDocument {
    SmlDocument::from_str(text, &ParseOptions::new()).unwrap()
}

#[test]
fn test_nested_config() {
    let text = "\
Config
  Server
    Host  example.org
    Ports 80 443
  End
  Client
    Retries 3
  End
end";
    let doc = parse(text);
    let config = doc.element(doc.root(), "config").unwrap();
    assert_eq!(doc.depth(doc.root()), 2);
    assert_eq!(doc.filter_elements(config, "server").len(), 1);

    let server = doc.element(config, "Server").unwrap();
    let ports = doc.attribute(server, "ports").unwrap();
    assert_eq!(doc.name(ports), Some("Ports"));
    assert_eq!(doc.values(ports), vec![Some("80"), Some("443")]);
    assert_eq!(doc.spaces(doc.attribute(server, "host").unwrap()), &["    ", "  "]);

    let names: Vec<&str> = doc
        .descendants(doc.root())
        .filter_map(|id| doc.name(id))
        .collect();
    assert_eq!(
        names,
        vec!["Config", "Server", "Host", "Ports", "Client", "Retries"]
    );
}

#[test]
fn test_end_keyword_is_case_insensitive() {
    for end in ["end", "End", "END", "eNd"] {
        let text = format!("A\n{}", end);
        let doc = parse(&text);
        let a = doc.children(doc.root())[0];
        assert_eq!(doc.end_line(a).map(ToString::to_string), Some(end.to_string()));
        assert_eq!(doc.to_string(), text);
    }
}

#[test]
fn test_quoted_end_is_still_end() {
    // The quoted form holds the same string, so it closes the element.
    let doc = parse("A\n\"end\"");
    assert_eq!(doc.node_count(), 2);
    assert_eq!(doc.to_string(), "A\nend");
}

#[test]
fn test_end_with_extra_values_is_an_attribute() {
    let doc = parse("A\n  end here\nend");
    let a = doc.children(doc.root())[0];
    let child = doc.children(a)[0];
    assert_eq!(doc.kind(child), Ok(SmlKind::Attribute));
    assert_eq!(doc.values(child), vec![Some("here")]);
}

#[test]
fn test_null_element_name() {
    let doc = parse("-\n  a 1\nend");
    let element = doc.children(doc.root())[0];
    assert!(doc.is_element(element));
    assert_eq!(doc.name(element), None);

    let failure = SmlDocument::from_str("-\n  a 1", &ParseOptions::new()).unwrap_err();
    assert_eq!(
        failure.error,
        Error::MissingEndTag {
            names: vec!["-".to_string()]
        }
    );
}

#[test]
fn test_unmatched_end_reports_physical_line() {
    let options = ParseOptions::new().with_start_line(2);
    let failure = SmlDocument::from_str("skip\nskip\nA\nend\nend", &options).unwrap_err();
    assert_eq!(failure.error, Error::UnmatchedEndTag { line: 5 });
    assert_eq!(failure.partial.to_string(), "A\nend");
}

#[test]
fn test_tokenizer_error_inside_tree() {
    let failure =
        SmlDocument::from_str("A\n  b \"open\nend", &ParseOptions::new()).unwrap_err();
    assert_eq!(failure.error, Error::UnterminatedQuote { line: 2, col: 5 });
    assert_eq!(failure.partial.node_count(), 2);
}

#[test]
fn test_minimal_parse_drops_layout() {
    let text = "  Root   # c\n\tKey   \"v w\"  \n  END  ";
    let doc = SmlDocument::from_str(text, &ParseOptions::minimal()).unwrap();
    assert_eq!(doc.to_string(), "Root#\nKey \"v w\"\nEND");
}

#[test]
fn test_building_and_editing() {
    let mut doc = SmlDocument::new();
    let root = doc.root();
    let list = doc.add_element(root, "List").unwrap();
    let item = doc.add_attribute(list, "Item", ["a", "b"]).unwrap();
    doc.add_empty(list).unwrap();
    doc.set_values(item, ["x"]).unwrap();
    doc.set_null(item, 2).unwrap();
    doc.set_comment(item, " edited").unwrap();
    doc.set_name(list, "Items").unwrap();
    doc.set_end_spaces(list, vec![String::new(), "  ".to_string()])
        .unwrap();
    assert_eq!(doc.to_string(), "Items\nItem x - -# edited\n\nend  ");
    assert_eq!(doc.node_to_string(item).unwrap(), "Item x - -# edited");

    assert!(matches!(
        doc.add_element(list, "END"),
        Err(Error::ReservedName { .. })
    ));
    assert!(matches!(
        doc.add_element(item, "Nested"),
        Err(Error::NotAContainer { .. })
    ));
    assert!(matches!(
        doc.add_attribute(list, "Bare", Vec::<String>::new()),
        Err(Error::InvalidAttribute { .. })
    ));
    assert!(matches!(
        doc.set_name(root, "Top"),
        Err(Error::WrongKind { .. })
    ));
}

#[test]
fn test_deep_nesting_renders_without_recursion() {
    let levels = 60_000;
    let mut lines: Vec<String> = (0..levels).map(|i| format!("E{}", i)).collect();
    lines.push("leaf 1".to_string());
    lines.extend(std::iter::repeat("end".to_string()).take(levels));
    let text = lines.join("\n");

    let doc = parse(&text);
    assert_eq!(doc.node_count(), levels + 2);
    assert_eq!(doc.depth(doc.root()), levels);
    assert_eq!(doc.to_string(), text);
    assert_eq!(doc.to_lines().len(), 2 * levels + 1);

    let inner = doc.descendants(doc.root()).nth(levels - 1).unwrap();
    assert_eq!(doc.name(inner), Some("E59999"));
    assert_eq!(doc.node_to_string(inner).unwrap(), "E59999\nleaf 1\nend");
}
