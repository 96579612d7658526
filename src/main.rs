//! CLI for chitchat-decoder: respond, chat, serve, demo.

use anyhow::Result;
use chitchat_decoder::{
    DemoModel, DemoTokenizer, DialogueGenerator, DialogueTokenizer, GenerationConfig, HfTokenizer,
    History,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "chitchat")]
#[command(about = "Dialogue response decoding in Rust")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SamplingArgs {
    #[arg(long, default_value_t = 8)]
    top_k: usize,
    #[arg(long, default_value_t = 0.0)]
    top_p: f32,
    #[arg(long, default_value_t = 1.0)]
    temperature: f32,
    #[arg(long, default_value_t = 1.0)]
    repetition_penalty: f32,
    #[arg(long, default_value_t = 25)]
    max_new_tokens: usize,
    #[arg(long, default_value_t = 5)]
    history_window: usize,
    /// Fixed sampling seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

impl SamplingArgs {
    fn to_config(&self) -> GenerationConfig {
        GenerationConfig {
            top_k: self.top_k,
            top_p: self.top_p,
            temperature: self.temperature,
            repetition_penalty: self.repetition_penalty,
            max_new_tokens: self.max_new_tokens,
            history_window: self.history_window,
            seed: self.seed,
            deadline: None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one response: --text <text> [--tokenizer <tokenizer.json>]
    Respond {
        #[arg(long)]
        text: String,
        #[arg(long)]
        tokenizer: Option<PathBuf>,
        #[command(flatten)]
        sampling: SamplingArgs,
    },

    /// Interactive chat with per-session history
    Chat {
        #[arg(long)]
        tokenizer: Option<PathBuf>,
        #[command(flatten)]
        sampling: SamplingArgs,
    },

    /// HTTP API host
    Serve {
        #[arg(long)]
        tokenizer: Option<PathBuf>,
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[command(flatten)]
        sampling: SamplingArgs,
    },

    /// Seeded decode with the built-in demo collaborators
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Respond {
            text,
            tokenizer,
            sampling,
        } => run_respond(&text, tokenizer.as_deref(), &sampling)?,
        Commands::Chat { tokenizer, sampling } => run_chat(tokenizer.as_deref(), &sampling)?,
        Commands::Serve {
            tokenizer,
            port,
            sampling,
        } => run_serve(tokenizer.as_deref(), port, &sampling)?,
        Commands::Demo => run_demo()?,
    }
    Ok(())
}

/// Demo weights for hosts without a real inference backend.
const DEMO_MODEL_SEED: u64 = 42;

fn load_tokenizer(path: Option<&Path>) -> Result<Arc<dyn DialogueTokenizer>> {
    match path {
        Some(p) => {
            info!("Loading tokenizer from {:?}...", p);
            Ok(Arc::new(HfTokenizer::from_file(p)?))
        }
        None => {
            info!("No tokenizer file given, using demo vocabulary");
            Ok(Arc::new(DemoTokenizer::default()))
        }
    }
}

fn build_generator(
    tokenizer_path: Option<&Path>,
    sampling: &SamplingArgs,
) -> Result<DialogueGenerator> {
    let tokenizer = load_tokenizer(tokenizer_path)?;
    let model = Arc::new(DemoModel::new(tokenizer.vocab_size(), DEMO_MODEL_SEED));
    Ok(DialogueGenerator::new(
        model,
        tokenizer,
        sampling.to_config(),
    )?)
}

fn run_respond(text: &str, tokenizer_path: Option<&Path>, sampling: &SamplingArgs) -> Result<()> {
    let mut generator = build_generator(tokenizer_path, sampling)?;
    let mut history = History::new();
    let reply = generator.respond(text, &mut history)?;
    info!(
        "Generated {} tokens ({})",
        reply.token_ids.len(),
        reply.finish_reason.as_str()
    );
    println!("{}", reply.text);
    Ok(())
}

fn run_chat(tokenizer_path: Option<&Path>, sampling: &SamplingArgs) -> Result<()> {
    let mut generator = build_generator(tokenizer_path, sampling)?;
    let mut history = History::new();
    println!("Chat. Type 'quit' to exit.");
    loop {
        print!("> ");
        use std::io::Write;
        std::io::stdout().flush()?;
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err()
            || line.trim().eq_ignore_ascii_case("quit")
        {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let reply = generator.respond(text, &mut history)?;
        println!("{}", reply.text);
    }
    Ok(())
}

fn run_serve(tokenizer_path: Option<&Path>, port: u16, sampling: &SamplingArgs) -> Result<()> {
    let generator = build_generator(tokenizer_path, sampling)?;
    let rt = tokio::runtime::Runtime::new().map_err(|e| anyhow::anyhow!("tokio runtime: {}", e))?;
    rt.block_on(chitchat_decoder::server::run_server(generator, port))
        .map_err(|e| anyhow::anyhow!("server: {}", e))
}

fn run_demo() -> Result<()> {
    info!("Creating demo collaborators...");
    let tokenizer: Arc<dyn DialogueTokenizer> = Arc::new(DemoTokenizer::default());
    let model = Arc::new(DemoModel::new(tokenizer.vocab_size(), DEMO_MODEL_SEED));
    let config = GenerationConfig::default().with_seed(7);
    let mut generator = DialogueGenerator::new(model, tokenizer, config)?;

    let mut history = History::new();
    for turn in ["hello there", "how are you"] {
        let reply = generator.respond(turn, &mut history)?;
        info!(
            "'{}' -> {} tokens ({}): {}",
            turn,
            reply.token_ids.len(),
            reply.finish_reason.as_str(),
            reply.text
        );
    }
    Ok(())
}
