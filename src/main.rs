use anyhow::Result;
use clap::{Parser, Subcommand};
use graphrag::export::export_graph;
use graphrag::llm::OpenAiChatClient;
use graphrag::{Config, KnowledgeBase, QueryOptions};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "graphrag")]
#[command(about = "Knowledge graph retrieval versus flat keyword lookup", version)]
struct Args {
    /// Knowledge file or directory (overrides graphrag.knowledge_path)
    #[arg(short, long, global = true)]
    knowledge: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the knowledge graph analysis for a query
    Query {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Print the structured analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show flat keyword lookup next to the graph analysis
    Compare {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Answer a question with the language model, with and without graph context
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Write nodes and edges for the graph renderer
    Export {
        /// Output path (overrides visualization.output_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print graph and ingestion statistics
    Stats,
}

const RULE: &str = "─────────────────────────────────────────────────────────────────────────────";

fn section(title: &str) {
    println!("\n{}", title);
    println!("{:-<40}", "");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match (Config::load(), &args.knowledge) {
        (Ok(config), _) => config,
        // --knowledge alone is enough to run; everything else has defaults
        (Err(e), Some(knowledge)) => {
            eprintln!("No usable config ({:#}); using defaults", e);
            Config::with_knowledge_path(knowledge.clone())
        }
        (Err(e), None) => return Err(e),
    };

    // Logs go to stderr; RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.graphrag.log_level.as_str())
    ).init();

    let knowledge_path = args
        .knowledge
        .clone()
        .unwrap_or_else(|| config.knowledge_path().to_path_buf());
    log::info!("Loading knowledge from {}", knowledge_path.display());

    let start = Instant::now();
    let kb = KnowledgeBase::load(&knowledge_path, QueryOptions::from(&config.query))?;
    log::info!(
        "Knowledge graph ready: {} entities, {} relationships ({:?})",
        kb.graph().entity_count(),
        kb.graph().relationship_count(),
        start.elapsed()
    );

    match args.command {
        Command::Query { text, json } => run_query(&kb, &text.join(" "), json)?,
        Command::Compare { text } => run_compare(&kb, &text.join(" ")),
        Command::Ask { question } => run_ask(&kb, &config, &question.join(" ")).await?,
        Command::Export { output } => {
            let output = output.unwrap_or_else(|| config.visualization.output_path.clone());
            let export = export_graph(kb.graph(), &config.visualization.color_table());
            export.write_json(&output)?;
            println!("Knowledge graph export saved to: {}", output.display());
        }
        Command::Stats => run_stats(&kb),
    }

    Ok(())
}

fn run_query(kb: &KnowledgeBase, text: &str, json: bool) -> Result<()> {
    let analysis = kb.analyze(text);
    if json {
        println!("{}", analysis.to_json()?);
    } else {
        println!("{}", analysis.render());
    }
    Ok(())
}

fn run_compare(kb: &KnowledgeBase, text: &str) {
    println!("Query: \"{}\"", text);

    section("1. Flat keyword lookup:");
    let hits = kb.keyword_lookup(text);
    println!("{}", kb.keyword_answer(text));

    section("2. Knowledge graph analysis:");
    let analysis = kb.analyze(text);
    println!("{}", analysis.render());

    let extended: usize = analysis
        .matches
        .iter()
        .map(|m| m.extended_paths().count())
        .sum();
    println!("{}", RULE);
    println!(
        "Flat records: {} | Graph matches: {} | Multi-hop paths: {}",
        hits.len(),
        analysis.matches.len(),
        extended
    );
}

async fn run_ask(kb: &KnowledgeBase, config: &Config, question: &str) -> Result<()> {
    let client = OpenAiChatClient::new(config.api_key()?, &config.llm)?;
    log::info!("Using model {} at {}", client.model(), client.endpoint());

    println!("{}", RULE);
    println!("Query: {}", question);

    section("1. Basic LLM Response (without knowledge graph):");
    println!("{}", client.answer_flat(&kb.flat_context(), question).await);

    section("2. Knowledge Graph Analysis:");
    let analysis = kb.analyze(question);
    println!("{}", analysis.render());

    section("3. Enhanced LLM Response (with knowledge graph context):");
    println!("{}", client.answer_with_graph(&analysis, question).await);
    println!("{}", RULE);

    Ok(())
}

fn run_stats(kb: &KnowledgeBase) {
    let graph = kb.graph();
    let report = kb.ingest_report();

    println!("\n=== GraphRAG Knowledge Graph Statistics ===\n");
    println!("Records ingested:  {}", report.records_ingested);
    println!("Records skipped:   {}", report.records_skipped());
    for skipped in &report.skipped {
        println!("  #{}: {}", skipped.index, skipped.reason);
    }
    println!("Entities:          {}", graph.entity_count());
    println!("Relationships:     {}", graph.relationship_count());

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for entity in graph.entities() {
        *by_type.entry(entity.type_or_default()).or_default() += 1;
    }
    println!("\n{:<20} {:>8}", "Entity type", "Count");
    println!("{:-<30}", "");
    for (entity_type, count) in by_type {
        println!("{:<20} {:>8}", entity_type, count);
    }
    println!();
}
