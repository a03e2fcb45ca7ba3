use clap::Parser;
use std::path::PathBuf;

use xquad_sweep::FailurePolicy;

#[derive(Parser, Debug)]
#[command(
    name = "xquad-sweep",
    version,
    about = "Run the CANINE XQuAD evaluator once per language"
)]
pub struct CliArgs {
    /// JSON sweep config; relative paths inside it resolve against its directory
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Comma-separated language configurations (default: the 12 XQuAD languages)
    #[arg(short, long, value_delimiter = ',')]
    pub languages: Option<Vec<String>>,

    /// Fine-tuned model weights
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// Maximum length of a predicted answer
    #[arg(long)]
    pub max_answer_length: Option<u32>,

    /// Maximum tokenized input length
    #[arg(long)]
    pub max_length: Option<u32>,

    /// Overlap between windows of a long context
    #[arg(long)]
    pub doc_stride: Option<u32>,

    /// Number of candidate answers considered
    #[arg(long)]
    pub n_best_size: Option<u32>,

    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Compute device (cuda or cpu)
    #[arg(long)]
    pub device: Option<String>,

    /// Dataset name forwarded to the evaluator (xquad or noisy)
    #[arg(long)]
    pub dataset_name: Option<String>,

    /// Data directory forwarded to the evaluator
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// HuggingFace checkpoint, e.g. google/canine-s
    #[arg(long = "hf-checkpoint")]
    pub huggingface_model_checkpoint: Option<String>,

    /// Evaluate SQuAD v2 style (unanswerable questions allowed)
    #[arg(long)]
    pub squad_v2: Option<bool>,

    /// Interpreter or evaluator executable
    #[arg(long)]
    pub python: Option<String>,

    /// Evaluator script passed to the interpreter
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Directory every evaluator run starts in
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// Virtual environment to activate, relative to the working directory
    #[arg(long, conflicts_with = "no_venv")]
    pub venv: Option<PathBuf>,

    /// Run with the inherited environment instead of a venv
    #[arg(long, default_value_t = false)]
    pub no_venv: bool,

    /// What to do when a language fails
    #[arg(long, value_enum)]
    pub on_error: Option<FailurePolicy>,

    /// Print the commands without running them
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Write a JSON report of the sweep
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Save the effective config and exit
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Extra arguments appended to every evaluator run (after `--`)
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}
