use std::fs;
use tempfile::TempDir;

use localrag_core::data_processor::DataProcessor;
use localrag_core::traits::FragmentScorer;
use localrag_core::types::{Corpus, CorpusBuilder, SourceLocation, SourceType};
use localrag_core::Error;
use localrag_keyword::{Bm25Index, Bm25Params, KeywordIndex};

fn corpus(texts: &[&str]) -> Corpus {
    let mut builder = CorpusBuilder::new();
    for (i, t) in texts.iter().enumerate() {
        builder.push(*t, format!("doc{i}.txt"), SourceType::PlainText, SourceLocation::default()).expect("push");
    }
    builder.build()
}

#[test]
fn unbuilt_index_refuses_to_score() {
    let index = KeywordIndex::new();
    assert!(!index.is_built());
    assert_eq!(index.fragment_count(), 0);
    assert!(matches!(index.score("fire"), Err(Error::IndexNotBuilt)));
}

#[test]
fn empty_corpus_is_rejected() {
    assert!(matches!(KeywordIndex::build(&Corpus::default()), Err(Error::EmptyCorpus)));
}

#[test]
fn one_score_per_fragment() {
    let c = corpus(&["fire starter kit", "water filter", "fire wood", ""]);
    let index = KeywordIndex::build(&c).expect("build");
    assert!(index.is_built());
    for q in ["fire", "", "unknown words only", "fire fire water"] {
        assert_eq!(index.score(q).expect("score").len(), c.len(), "query {q:?}");
    }
}

#[test]
fn matching_fragments_rank_above_others() {
    let c = corpus(&["fire starter kit", "water filter", "fire wood"]);
    let index = Bm25Index::build(&c).expect("build");
    let scores = index.scores("fire");
    assert!(scores[0] > 0.0);
    assert!(scores[2] > 0.0);
    assert_eq!(scores[1], 0.0);
    // shorter fragment wins through length normalisation
    assert!(scores[2] > scores[0]);
}

#[test]
fn common_terms_use_floored_idf() {
    let c = corpus(&["fire starter kit", "water filter", "fire wood"]);
    let index = Bm25Index::build(&c).expect("build");
    let rare = index.idf("starter").expect("starter indexed");
    assert!((rare - (2.5f64 / 1.5).ln()).abs() < 1e-9);
    let common = index.idf("fire").expect("fire indexed");
    assert!(common > 0.0 && common < rare, "df > N/2 is floored to a small positive idf");
}

#[test]
fn tokens_are_case_sensitive_and_repeat() {
    let c = corpus(&["fire starter kit", "water filter", "fire wood"]);
    let index = Bm25Index::build(&c).expect("build");
    assert!(index.scores("Fire").iter().all(|s| *s == 0.0));
    let once = index.scores("starter");
    let twice = index.scores("starter starter");
    assert!((twice[0] - 2.0 * once[0]).abs() < 1e-5);
}

#[test]
fn params_are_retained() {
    let params = Bm25Params { k1: 1.2, b: 0.5, epsilon: 0.1 };
    let index = KeywordIndex::build_with(&corpus(&["a b", "c"]), params).expect("build");
    assert_eq!(index.as_built().expect("built").params(), params);
}

#[test]
fn directory_full_flow() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("fire.txt"), "how to build a fire with flint and steel").unwrap();
    fs::write(tmp.path().join("water.txt"), "boil water before drinking it").unwrap();
    fs::write(tmp.path().join("shelter.txt"), "a lean-to shelter keeps rain out").unwrap();

    let corpus = DataProcessor::new().process_directory(tmp.path()).expect("ingest");
    assert_eq!(corpus.len(), 3);
    let index = KeywordIndex::build(&corpus).expect("build");
    let scores = index.score("flint steel").expect("score");
    let best = scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert!(corpus.fragments()[best].source_path.ends_with("fire.txt"));
}
