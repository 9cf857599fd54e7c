use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing_subscriber::prelude::*;

use localrag_core::config::Config;
use localrag_core::data_processor::DataProcessor;
use localrag_core::types::ResultRecord;
use localrag_hybrid::{format_sources_section, IndexGeneration, Retrieve, RetrieveOptions};

const USAGE: &str = "Usage: localrag <query|repl|eval> [args...]
  query \"<text>\" [data_dir]   retrieve fragments for one query
  repl [data_dir]              interactive queries until `exit`
  eval <queries.jsonl> [data_dir] [--out <file>]
Options: --json  --k <n>  --alpha <a>  --min-ratio <r>  --no-hybrid";

/// Preview length printed per result during `eval`; `--out` keeps full records.
const EVAL_PREVIEW_CHARS: usize = 120;

/// One line of an evaluation file.
#[derive(Debug, Deserialize)]
struct EvalQuery {
    q: String,
}

struct Args {
    cmd: String,
    positional: Vec<String>,
    json: bool,
    k: Option<usize>,
    alpha: Option<f32>,
    min_ratio: Option<f32>,
    no_hybrid: bool,
    out: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = env::args().skip(1);
    let Some(cmd) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };
    let mut parsed = Args { cmd, positional: Vec::new(), json: false, k: None, alpha: None, min_ratio: None, no_hybrid: false, out: None };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "--no-hybrid" => parsed.no_hybrid = true,
            "--out" => parsed.out = Some(PathBuf::from(args.next().context("--out needs a path")?)),
            "--k" => parsed.k = Some(args.next().context("--k needs a value")?.parse().context("--k must be an integer")?),
            "--alpha" => parsed.alpha = Some(args.next().context("--alpha needs a value")?.parse().context("--alpha must be a number")?),
            "--min-ratio" => {
                parsed.min_ratio = Some(args.next().context("--min-ratio needs a value")?.parse().context("--min-ratio must be a number")?);
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => parsed.positional.push(arg),
        }
    }
    Ok(parsed)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "localrag=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn options(config: &Config, args: &Args) -> anyhow::Result<RetrieveOptions> {
    let mut opts = config.retrieval()?;
    if let Some(k) = args.k { opts = opts.with_k(k); }
    if let Some(alpha) = args.alpha { opts = opts.with_alpha(alpha); }
    if let Some(ratio) = args.min_ratio { opts = opts.with_min_score_ratio(ratio); }
    if args.no_hybrid { opts = opts.with_hybrid(false); }
    opts.validate()?;
    Ok(opts)
}

fn build_generation(config: &Config, data_dir: Option<&String>) -> anyhow::Result<IndexGeneration> {
    let dir = match data_dir {
        Some(d) => PathBuf::from(d),
        None => config.data_dir()?,
    };
    let ingest = config.ingest()?;
    let corpus = DataProcessor::with_chunk_size(ingest.chunk_size)?.process_directory(&dir)?;
    if corpus.is_empty() {
        bail!("no fragments ingested from {}", dir.display());
    }
    tracing::info!(fragments = corpus.len(), sources = corpus.source_count(), dir = %dir.display(), "corpus loaded");
    Ok(IndexGeneration::build(corpus)?)
}

fn print_records(query: &str, records: &[ResultRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "query": query, "results": records }))?);
        return Ok(());
    }
    println!("\n🔍 {} results for: \"{}\"", records.len(), query);
    for (i, r) in records.iter().enumerate() {
        println!("\n  {}. score={:.4}  {} ({})", i + 1, r.score, r.source_path, r.locator);
        println!("     📝 {}", r.preview_text);
    }
    println!("\n{}", format_sources_section(records));
    Ok(())
}

fn run_query(generation: &IndexGeneration, query: &str, opts: &RetrieveOptions, json: bool) -> anyhow::Result<()> {
    let records = generation.retrieve(query, opts)?;
    print_records(query, &records, json)
}

fn run_repl(generation: &IndexGeneration, opts: &RetrieveOptions, json: bool) -> anyhow::Result<()> {
    println!("localrag repl: {} fragments loaded, type `exit` to quit", generation.corpus().len());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let query = line.trim();
        match query {
            "" => continue,
            "exit" | "quit" => break,
            _ => {
                if let Err(e) = run_query(generation, query, opts, json) {
                    eprintln!("❌ {e:#}");
                }
            }
        }
    }
    Ok(())
}

fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Runs every `{"q": ...}` line. The terminal gets shortened previews; with
/// `out` set, full records are also written there as one JSON object per query.
fn run_eval(
    generation: &IndexGeneration,
    path: &Path,
    opts: &RetrieveOptions,
    json: bool,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut writer = match out {
        Some(p) => Some(io::BufWriter::new(fs::File::create(p).with_context(|| format!("creating {}", p.display()))?)),
        None => None,
    };
    let mut count = 0usize;
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() { continue; }
        let entry: EvalQuery = serde_json::from_str(line).with_context(|| format!("{}:{}: invalid query line", path.display(), n + 1))?;
        let records = generation.retrieve(&entry.q, opts)?;
        if let Some(w) = writer.as_mut() {
            serde_json::to_writer(&mut *w, &serde_json::json!({ "query": entry.q, "results": records }))?;
            writeln!(w)?;
        }
        let shown: Vec<ResultRecord> = records
            .into_iter()
            .map(|r| ResultRecord { preview_text: truncate_preview(&r.preview_text, EVAL_PREVIEW_CHARS), ..r })
            .collect();
        print_records(&entry.q, &shown, json)?;
        count += 1;
    }
    if let Some(mut w) = writer {
        w.flush()?;
    }
    if let Some(p) = out {
        println!("\nFull results saved to {}", p.display());
    }
    tracing::info!(queries = count, "evaluation complete");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {e}"); e })?;
    let args = parse_args()?;
    let opts = options(&config, &args)?;
    match args.cmd.as_str() {
        "query" => {
            let Some(query) = args.positional.first() else {
                eprintln!("Usage: localrag query \"<text>\" [data_dir]");
                std::process::exit(1);
            };
            let generation = build_generation(&config, args.positional.get(1))?;
            run_query(&generation, query, &opts, args.json)?;
        }
        "repl" => {
            let generation = build_generation(&config, args.positional.first())?;
            run_repl(&generation, &opts, args.json)?;
        }
        "eval" => {
            let Some(file) = args.positional.first() else {
                eprintln!("Usage: localrag eval <queries.jsonl> [data_dir]");
                std::process::exit(1);
            };
            let generation = build_generation(&config, args.positional.get(1))?;
            run_eval(&generation, Path::new(file), &opts, args.json, args.out.as_deref())?;
        }
        other => {
            eprintln!("Unknown command: {other}\n{USAGE}");
            std::process::exit(1);
        }
    }
    Ok(())
}
