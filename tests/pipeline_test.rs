//! End-to-end tests: text buffer in, one PDF per chunk out.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use txtpdf::{
    ConvertOptions, ErrorKind, FontLocator, ProgressEvent, RenderResult, TextConverter,
};

fn fixture_font() -> FontLocator {
    FontLocator::new(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("DejaVuSans.ttf"),
    )
}

fn pdf_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".pdf"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_45_chars_make_three_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let text = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHI";
    assert_eq!(text.chars().count(), 45);

    let options = ConvertOptions::new()
        .with_max_chunk_bytes(20)
        .with_worker_pool_size(2)
        .with_font(fixture_font().path());
    let converter = TextConverter::new(options).unwrap();
    let report = converter
        .convert_text(text, "letters.txt", dir.path(), &txtpdf::NoProgress)
        .unwrap();

    assert_eq!(report.chunk_count, 3);
    assert_eq!(report.results.len(), 3);
    assert!(report.is_complete());
    assert_eq!(
        pdf_files(dir.path()),
        vec!["letters_0.pdf", "letters_1.pdf", "letters_2.pdf"]
    );

    for (i, result) in report.results.iter().enumerate() {
        assert_eq!(result.chunk_index(), i);
        let path = result.output_path().unwrap();
        let doc = lopdf::Document::load(path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}

#[test]
fn test_missing_font_fails_every_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let options = ConvertOptions::new()
        .with_max_chunk_bytes(10)
        .with_font("/nonexistent/font.ttf");
    let converter = TextConverter::new(options).unwrap();
    let report = converter
        .convert_text(&"x".repeat(40), "gone.txt", dir.path(), &txtpdf::NoProgress)
        .unwrap();

    assert_eq!(report.results.len(), 4);
    assert_eq!(report.failed().count(), 4);
    for result in &report.results {
        assert_eq!(result.error_kind(), Some(ErrorKind::FontNotFound));
    }
    assert!(pdf_files(dir.path()).is_empty());
}

#[test]
fn test_write_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("out");
    fs::write(&blocked, b"not a directory").unwrap();

    let options = ConvertOptions::new().with_font(fixture_font().path());
    let converter = TextConverter::new(options).unwrap();
    let report = converter
        .convert_text("hello", "h.txt", &blocked, &txtpdf::NoProgress)
        .unwrap();

    assert_eq!(report.results.len(), 1);
    match &report.results[0] {
        RenderResult::Failure { kind, message, .. } => {
            assert_eq!(*kind, ErrorKind::DocumentWriteFailed);
            assert!(message.contains("h_0.pdf"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn test_rtl_and_tables_render() {
    let dir = tempfile::tempdir().unwrap();
    let text = "\u{0633}\u{0644}\u{0627}\u{0645} \u{062F}\u{0646}\u{06CC}\u{0627}\n\
                \n\
                | \u{0646}\u{0627}\u{0645} | name |\n\
                | \u{0639}\u{0644}\u{06CC} | Ali |\n\
                plain \"quoted\" & <tagged> text\n";

    let options = ConvertOptions::new().with_font(fixture_font().path());
    let report = txtpdf::convert_text(text, "mixed.txt", dir.path(), options).unwrap();
    assert!(report.is_complete());

    // paragraph, spacer, table, spacer, paragraph
    match &report.results[0] {
        RenderResult::Success { element_count, .. } => assert_eq!(*element_count, 5),
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn test_long_text_paginates_within_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let text = "a line of body text that repeats\n".repeat(300);

    let options = ConvertOptions::new().with_font(fixture_font().path());
    let report = txtpdf::convert_text(&text, "long.txt", dir.path(), options).unwrap();
    let doc = lopdf::Document::load(report.results[0].output_path().unwrap()).unwrap();
    assert!(doc.get_pages().len() > 1);
}

#[test]
fn test_tall_table_row_spills_onto_following_pages() {
    let dir = tempfile::tempdir().unwrap();
    let text = format!("intro paragraph\n|{}|\n", "cell ".repeat(3000));

    let options = ConvertOptions::new().with_font(fixture_font().path());
    let report = txtpdf::convert_text(&text, "tall.txt", dir.path(), options).unwrap();
    assert!(report.is_complete());
    let doc = lopdf::Document::load(report.results[0].output_path().unwrap()).unwrap();
    assert!(doc.get_pages().len() >= 3);
}

#[test]
fn test_progress_reaches_100_once_at_end() {
    let dir = tempfile::tempdir().unwrap();
    let options = ConvertOptions::new()
        .with_max_chunk_bytes(8)
        .with_worker_pool_size(3)
        .with_progress(30, 3600.0)
        .with_font(fixture_font().path());
    let converter = TextConverter::new(options).unwrap();

    let events: Mutex<Vec<ProgressEvent>> = Mutex::new(Vec::new());
    let sink = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());
    let report = converter
        .convert_text(&"y".repeat(80), "p.txt", dir.path(), &sink)
        .unwrap();
    assert_eq!(report.chunk_count, 10);

    let events = events.into_inner().unwrap();
    let percents: Vec<u32> = events.iter().map(|e| e.percent).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(percents.last(), Some(&100));
    assert_eq!(events.iter().filter(|e| e.is_final()).count(), 1);
    assert!(events.len() < 10);
}

#[test]
fn test_convert_file_reads_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("story.txt");
    fs::write(&input, "once upon a time\n").unwrap();
    let out = dir.path().join("pdf");

    let options = ConvertOptions::new().with_font(fixture_font().path());
    let report = txtpdf::convert_file(&input, &out, options).unwrap();
    assert_eq!(report.source, "story.txt");
    assert!(out.join("story_0.pdf").is_file());

    let json = report.to_json().unwrap();
    assert!(json.contains("\"status\": \"success\""));
}

#[test]
fn test_empty_input_produces_one_document() {
    let dir = tempfile::tempdir().unwrap();
    let options = ConvertOptions::new().with_font(fixture_font().path());
    let report = txtpdf::convert_text("", "empty.txt", dir.path(), options).unwrap();
    assert_eq!(report.chunk_count, 1);
    assert!(report.is_complete());
    assert_eq!(pdf_files(dir.path()), vec!["empty_0.pdf"]);
}
