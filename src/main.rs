use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "fluency", version, about = "Run a scripted reading fluency assessment")]
struct Cli {
    /// JSON file with passages, word lists and questions
    #[arg(long)]
    content: PathBuf,

    /// JSON operator script to replay
    #[arg(long)]
    script: PathBuf,

    /// Directory for settings and the attempts database
    #[arg(long, default_value = ".fluency")]
    data_dir: PathBuf,

    /// Replay in real time instead of instantly
    #[arg(long)]
    paced: bool,

    /// Print the most recent stored attempts afterwards
    #[arg(long, default_value_t = 0)]
    history: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    fluency_lib::run(fluency_lib::RunOptions {
        content: cli.content,
        script: cli.script,
        data_dir: cli.data_dir,
        paced: cli.paced,
        history: cli.history,
    })
    .await
}
