use clap::Parser;
use newsimpact::application::ingest::RawArticle;
use newsimpact::cli::commands::{Cli, Commands};
use newsimpact::NewsImpact;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsimpact=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = std::env::var("NEWSIMPACT_DB").unwrap_or_else(|_| "./newsimpact.db".into());
    let assets_dir = PathBuf::from(
        std::env::var("NEWSIMPACT_ASSETS").unwrap_or_else(|_| "./assets".into()),
    );

    let engine = match NewsImpact::new(&db_path, &assets_dir) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error initializing newsimpact: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(engine, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(engine: NewsImpact, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Ingest { file } => {
            let raw = read_articles(&file)?;
            let saved = engine.ingest(raw)?;
            println!("Ingested {saved} articles");
        }
        Commands::Dedup => {
            let stories = engine.dedup().await?;
            println!("Created {stories} stories");
        }
        Commands::Extract => {
            let rows = engine.extract_entities().await?;
            println!("Extracted entities for {rows} stories");
        }
        Commands::MapImpacts => {
            let mapped = engine.map_impacts()?;
            println!("Mapped impacts for {mapped} stories");
        }
        Commands::Pipeline { file } => {
            let raw = read_articles(&file)?;
            let report = engine.run_pipeline(raw).await?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
        Commands::Query { text, limit } => {
            let response = engine.query(&text, limit).await?;
            println!("{}", serde_json::to_string_pretty(&response).unwrap());
        }
        Commands::Show { id } => {
            let story = engine.story(&id)?.ok_or(format!("No story with id {id}"))?;
            let entities = engine.story_entities(&id)?;
            let (impacts, summary) = engine.story_impacts(&id)?;
            let view = serde_json::json!({
                "story": story,
                "entities": entities,
                "impacts": impacts,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&view).unwrap());
        }
        Commands::Reindex => {
            let count = engine.reindex().await?;
            println!("Reindexed {count} stories");
        }
        Commands::Stats => {
            let stats = engine.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats).unwrap());
        }
    }
    Ok(())
}

fn read_articles(path: &str) -> Result<Vec<RawArticle>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
