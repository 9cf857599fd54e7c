use std::env;
use std::path::{Path, PathBuf};

use localrag_core::data_processor::DataProcessor;
use localrag_keyword::KeywordIndex;
use localrag_core::traits::FragmentScorer;

// Build a BM25 index over a directory and print the best-scoring fragments.
// Usage:
//   cargo run -p localrag-keyword --example search -- "your query" \
//     [--data ../dev_data/txt] [--limit 10]

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: cargo run -p localrag-keyword --example search -- <query> [--data DIR] [--limit N]");
        std::process::exit(1);
    }
    let mut query = String::new();
    let mut data_dir: Option<PathBuf> = None;
    let mut limit: usize = 10;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--data" => {
                if i + 1 >= args.len() { eprintln!("--data requires a path"); std::process::exit(2); }
                data_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2; continue;
            }
            "--limit" => {
                if i + 1 >= args.len() { eprintln!("--limit requires a number"); std::process::exit(2); }
                limit = args[i + 1].parse().unwrap_or(limit);
                i += 2; continue;
            }
            s if s.starts_with("-") => {
                eprintln!("Unknown flag: {}", s); std::process::exit(2);
            }
            s => {
                if query.is_empty() { query = s.to_string(); }
                i += 1; continue;
            }
        }
    }

    // Resolve data path precedence: flag > DATA_DIR > workspace-relative fallback
    let data_dir = if let Some(d) = data_dir {
        d
    } else if let Ok(env_path) = env::var("DATA_DIR") {
        PathBuf::from(env_path)
    } else {
        let base = Path::new(env!("CARGO_MANIFEST_DIR"))
            .ancestors().nth(2)
            .unwrap_or(Path::new("."));
        base.join("dev_data/txt")
    };

    let corpus = DataProcessor::new().process_directory(&data_dir)?;
    let index = KeywordIndex::build(&corpus)?;
    let scores = index.score(&query)?;

    let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    println!("BM25 search\n===========");
    println!("Data: {} ({} fragments)", data_dir.display(), corpus.len());
    println!("Query: {} (limit {})\n", query, limit);
    for (rank, (idx, score)) in ranked.into_iter().take(limit).enumerate() {
        let frag = &corpus.fragments()[idx];
        println!("{:>2}. score={:.3} path={} {}", rank + 1, score, frag.source_path, frag.locator());
    }
    Ok(())
}
