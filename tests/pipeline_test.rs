//! Integration tests for the input-to-document pipeline.

use std::fs;

use brandoc::{
    extract_file, load_file, BlockKind, Brandoc, ContentBlock, Error, Locale, Package,
};

const NOTES: &str = "\
# Quarterly Report

Revenue grew by **12%** this quarter.

## Highlights

- New office opened
- Team doubled

1. Hire designers
2. Launch beta
";

fn footer_parts(package: &Package) -> Vec<String> {
    package
        .part_names()
        .filter(|name| name.starts_with("word/footer"))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_markdown_file_to_docx_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.md");
    let output = dir.path().join("report.docx");
    fs::write(&input, NOTES).unwrap();

    let result = Brandoc::new()
        .with_date("2025-02-15")
        .load(&input)
        .unwrap();
    result.write(&output).unwrap();
    assert!(output.is_file());

    let extracted = extract_file(&output).unwrap();
    assert_eq!(extracted, result.blocks);
    assert_eq!(extracted[0], ContentBlock::heading("Quarterly Report", 1));
    assert_eq!(extracted[1].text, "Revenue grew by **12%** this quarter.");
    assert_eq!(extracted[2], ContentBlock::heading("Highlights", 2));
}

#[test]
fn test_docx_input_is_reextracted() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.docx");
    let second = dir.path().join("second.docx");

    Brandoc::new().load_text(NOTES).unwrap().write(&first).unwrap();

    // Re-running on the generated document keeps the same blocks
    let result = Brandoc::new().load(&first).unwrap();
    result.write(&second).unwrap();
    assert_eq!(load_file(&second).unwrap(), result.blocks);
    assert_eq!(result.blocks.len(), 7);
}

#[test]
fn test_english_footer() {
    let package = Brandoc::new()
        .with_version("1.2")
        .with_date("2025-02-15")
        .load_text(NOTES)
        .unwrap()
        .to_package()
        .unwrap();

    let parts = footer_parts(&package);
    assert_eq!(parts.len(), 2);
    for part in parts {
        let xml = package.part_str(&part).unwrap();
        assert!(xml.contains("Version 1.2 from 15th February 2025, Page "));
        assert!(xml.contains(" NUMPAGES "));
        assert!(xml.contains(r#"<w:sz w:val="20"/>"#));
    }
}

#[test]
fn test_german_footer() {
    let package = Brandoc::new()
        .with_version("3")
        .with_date("15.02.2025")
        .with_locale(Locale::De)
        .load_text("# Bericht")
        .unwrap()
        .to_package()
        .unwrap();

    for part in footer_parts(&package) {
        let xml = package.part_str(&part).unwrap();
        assert!(xml.contains("Version 3 vom 15.02.2025   Seite "));
        assert!(xml.contains(" SECTIONPAGES "));
        assert!(xml.contains(r#"<w:sz w:val="16"/>"#));
    }
}

#[test]
fn test_german_content_detected() {
    let result = Brandoc::new()
        .load_text("Die Ergebnisse werden durch die Agentur und ihre Partner bereits geprüft.")
        .unwrap();
    assert_eq!(result.locale(), Locale::De);
}

#[test]
fn test_title_inserted_once() {
    let result = Brandoc::new()
        .with_title("Notes")
        .load_text("## Part one\n\nBody")
        .unwrap();
    assert_eq!(result.blocks[0], ContentBlock::heading("Notes", 1));

    let result = Brandoc::new().with_title("Notes").load_text(NOTES).unwrap();
    assert_eq!(result.blocks[0].text, "Quarterly Report");
}

#[test]
fn test_table_cells_bold_in_two_column_table() {
    let blocks = vec![ContentBlock::table(vec![
        vec!["Metric".to_string(), "Value".to_string()],
        vec!["Revenue".to_string(), "12".to_string()],
    ])];
    let package = Brandoc::new().with_blocks(blocks).to_package().unwrap();
    let xml = package.part_str("word/document.xml").unwrap();
    assert_eq!(xml.matches("<w:b/>").count(), 3);
    assert!(xml.contains(r#"<w:rFonts w:ascii="GT America Light""#));
}

#[test]
fn test_missing_input_reports_path() {
    let result = Brandoc::new().load("/nonexistent/notes.md");
    match result {
        Err(Error::InputNotFound(path)) => assert!(path.ends_with("notes.md")),
        _ => panic!("expected InputNotFound"),
    }
}

#[test]
fn test_missing_template_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.docx");

    let result = Brandoc::new()
        .with_template(dir.path().join("missing.dotx"))
        .load_text(NOTES)
        .unwrap();
    assert!(matches!(
        result.write(&output),
        Err(Error::TemplateMissing(_))
    ));
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_custom_template_file() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("brand.dotx");
    let output = dir.path().join("out.docx");

    // A rendered document works as a template for the next one
    Brandoc::new()
        .load_text("# Old content")
        .unwrap()
        .write(&template)
        .unwrap();
    Brandoc::new()
        .with_template(&template)
        .load_text("Fresh paragraph.")
        .unwrap()
        .write(&output)
        .unwrap();

    let blocks = extract_file(&output).unwrap();
    assert_eq!(blocks, vec![ContentBlock::paragraph("Fresh paragraph.")]);
}

#[test]
fn test_empty_input_produces_document() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.docx");
    let result = Brandoc::new().load_text("").unwrap();
    assert!(result.blocks.is_empty());
    result.write(&output).unwrap();

    let package = Package::open(&output).unwrap();
    assert_eq!(footer_parts(&package).len(), 2);
    assert!(extract_file(&output).unwrap().is_empty());
}

#[test]
fn test_extract_to_markdown() {
    let result = Brandoc::new().load_text(NOTES).unwrap();
    let markdown = result.to_markdown();
    assert!(markdown.starts_with("# Quarterly Report\n\n"));
    assert!(markdown.contains("- New office opened\n- Team doubled\n"));
    assert!(markdown.contains("1. Hire designers\n2. Launch beta\n"));
    assert_eq!(
        result
            .blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Bullet)
            .count(),
        2
    );
}
