use std::fs;
use std::io::Write;
use tempfile::TempDir;

use localrag_core::config::{Config, RetrieveOptions};
use localrag_core::data_processor::DataProcessor;
use localrag_core::types::{Corpus, CorpusBuilder, Fragment, FragmentId, Locator, SourceLocation, SourceType};
use localrag_core::Error;

fn fragment(text: &str, source_type: SourceType, location: SourceLocation) -> Fragment {
    Fragment { id: FragmentId(99), text: text.to_string(), source_path: "doc".to_string(), source_type, location }
}

#[test]
fn corpus_ids_match_positions() {
    let corpus = Corpus::from_fragments(vec![
        fragment("a", SourceType::PlainText, SourceLocation::default()),
        fragment("b", SourceType::PlainText, SourceLocation::default()),
    ])
    .expect("corpus");
    assert_eq!(corpus.len(), 2);
    for (i, f) in corpus.iter().enumerate() {
        assert_eq!(f.id.as_usize(), i, "ids are renumbered to positions");
    }
    assert_eq!(corpus[FragmentId(1)].text, "b");
    assert!(corpus.get(FragmentId(2)).is_none());
}

#[test]
fn builder_counts_distinct_sources() {
    let mut builder = CorpusBuilder::new();
    builder.push("x", "a.txt", SourceType::PlainText, SourceLocation::default()).unwrap();
    builder.push("y", "a.txt", SourceType::PlainText, SourceLocation::default()).unwrap();
    let id = builder.push("z", "b.txt", SourceType::PlainText, SourceLocation::default()).unwrap();
    assert_eq!(id, FragmentId(2));
    assert_eq!(builder.build().source_count(), 2);
}

#[test]
fn fragment_ids_are_bounded_by_u32() {
    assert_eq!(FragmentId::try_from(7usize).unwrap(), FragmentId(7));
    assert_eq!(FragmentId::try_from(u32::MAX as usize).unwrap(), FragmentId(u32::MAX));
    #[cfg(target_pointer_width = "64")]
    assert!(matches!(FragmentId::try_from(u32::MAX as usize + 1), Err(Error::CorpusFull)));
}

#[test]
fn locator_precedence() {
    let all = SourceLocation { page: Some(4), row: Some(7), chunk: Some(2) };
    assert_eq!(fragment("t", SourceType::PageBased, all).locator(), Locator::Page(4));
    assert_eq!(fragment("t", SourceType::Tabular, all).locator(), Locator::Row(7));
    assert_eq!(fragment("t", SourceType::PlainText, all).locator(), Locator::Chunk(2));

    let page_only = SourceLocation { page: Some(4), ..SourceLocation::default() };
    assert_eq!(fragment("t", SourceType::PlainText, page_only).locator(), Locator::Unknown);

    let missing_page = SourceLocation { chunk: Some(3), ..SourceLocation::default() };
    assert_eq!(fragment("t", SourceType::PageBased, missing_page).locator(), Locator::Chunk(3));

    assert_eq!(fragment("t", SourceType::Unknown, SourceLocation::default()).locator(), Locator::Unknown);
    assert_eq!(Locator::Unknown.describe(), "unknown location");
    assert_eq!(Locator::Page(3).to_string(), "page 3");
}

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let processor = DataProcessor::new();
    let corpus = processor.process_directory(dir).expect("process");

    assert_eq!(corpus.len(), 1, "one small file becomes one fragment");
    let frag = &corpus[FragmentId(0)];
    assert_eq!(frag.text, "Short text");
    assert_eq!(frag.source_type, SourceType::PlainText);
    assert_eq!(frag.locator(), Locator::Chunk(1));
}

#[test]
fn process_directory_chunks_and_rows() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("long.md"), "abcdefghij".repeat(3)).unwrap();
    fs::write(dir.join("prices.csv"), "item,price\n\napple,3\n").unwrap();
    fs::write(dir.join(".hidden.txt"), "ignored").unwrap();
    fs::write(dir.join("image.png"), "ignored").unwrap();

    let corpus = DataProcessor::with_chunk_size(10).unwrap().process_directory(dir).expect("process");
    assert_eq!(corpus.len(), 5);

    let md: Vec<_> = corpus.iter().filter(|f| f.source_type == SourceType::Markup).collect();
    assert_eq!(md.len(), 3);
    assert_eq!(md[2].locator(), Locator::Chunk(3));

    let rows: Vec<_> = corpus.iter().filter(|f| f.source_type == SourceType::Tabular).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].text, "apple,3");
    assert_eq!(rows[1].locator(), Locator::Row(3));
}

#[test]
fn zero_chunk_size_is_rejected() {
    assert!(matches!(
        DataProcessor::with_chunk_size(0),
        Err(Error::InvalidParameter { name: "chunk_size", .. })
    ));
}

#[test]
fn missing_directory_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("does-not-exist");
    let err = DataProcessor::new().process_directory(&missing).unwrap_err();
    match err {
        Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io, got {other:?}"),
    }
}

#[test]
fn empty_directory_yields_empty_corpus() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes.png"), "skip").unwrap();
    assert!(DataProcessor::new().process_directory(tmp.path()).unwrap().is_empty());
}

#[test]
fn retrieve_options_validation() {
    assert!(RetrieveOptions::default().validate().is_ok());
    let bad_alpha = RetrieveOptions::default().with_alpha(1.5);
    assert!(matches!(bad_alpha.validate(), Err(Error::InvalidParameter { name: "alpha", .. })));
    let nan_ratio = RetrieveOptions::default().with_min_score_ratio(f32::NAN);
    assert!(matches!(nan_ratio.validate(), Err(Error::InvalidParameter { name: "min_score_ratio", .. })));
    assert!(RetrieveOptions::default().with_alpha(0.0).with_min_score_ratio(1.0).validate().is_ok());
}

#[test]
fn config_defaults_and_overrides() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let config = Config::load_from(dir, "test").expect("defaults load");
    assert_eq!(config.retrieval().unwrap(), RetrieveOptions::default());
    assert_eq!(config.ingest().unwrap().chunk_size, 500);

    fs::write(dir.join("localrag.toml"), "[retrieval]\nk = 5\nalpha = 0.25\n\n[ingest]\ndata_dir = \"corpus\"\n").unwrap();
    fs::write(dir.join("localrag.test.toml"), "[retrieval]\nhybrid = false\n").unwrap();
    let config = Config::load_from(dir, "test").expect("file load");
    let opts = config.retrieval().unwrap();
    assert_eq!(opts.k, 5);
    assert!(!opts.hybrid);
    assert!((opts.alpha - 0.25).abs() < f32::EPSILON);
    assert!((opts.min_score_ratio - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.data_dir().unwrap(), dir.join("corpus"));
}

#[test]
fn config_rejects_out_of_range_alpha() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("localrag.toml"), "[retrieval]\nalpha = 2.0\n").unwrap();
    assert!(matches!(
        Config::load_from(tmp.path(), "test"),
        Err(Error::InvalidParameter { name: "alpha", .. })
    ));
}

#[test]
fn config_rejects_negative_k() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("localrag.toml"), "[retrieval]\nk = -1\n").unwrap();
    match Config::load_from(tmp.path(), "test") {
        Err(Error::InvalidParameter { name, value }) => {
            assert_eq!(name, "k");
            assert_eq!(value, "-1");
        }
        Err(other) => panic!("expected InvalidParameter, got {other:?}"),
        Ok(_) => panic!("negative k accepted"),
    }
}

#[test]
fn config_rejects_zero_chunk_size() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("localrag.toml"), "[ingest]\nchunk_size = 0\n").unwrap();
    let config = Config::load_from(tmp.path(), "test").unwrap();
    assert!(matches!(config.ingest(), Err(Error::Config(_))));
}
