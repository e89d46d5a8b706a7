//! Headless autoplay runner (default binary).
//!
//! Plays one game with the move search and prints the session statistics as
//! JSON on stdout. Configuration comes from `TETRIS_AI_*` environment
//! variables; `RUST_LOG` controls logging on stderr.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tetris_ai::core::ShapeTable;
use tetris_ai::engine::{Session, SessionConfig, Weights};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env();
    info!(
        width = config.width,
        height = config.height,
        seed = config.seed,
        depth = config.search_depth,
        "starting session"
    );

    let weights = match &config.weights_path {
        Some(path) => Weights::load(path)
            .with_context(|| format!("loading weights from {}", path.display()))?,
        None => Weights::default(),
    };

    let table = ShapeTable::standard().context("building shape table")?;
    let max_pieces = config.max_pieces;
    let mut session = Session::new(config, &table)
        .context("creating session")?
        .with_weights(weights);

    let stats = session.run(max_pieces).context("playing session")?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
