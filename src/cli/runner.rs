use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use xquad_sweep::{LanguageCode, SweepConfig, config_base_dir, load_config, save_config};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(debug: bool) -> Result<(), AppError> {
    let default_level = if debug { "xquad_sweep=debug" } else { "xquad_sweep=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

fn parse_languages(raw: &[String]) -> Result<Vec<LanguageCode>, AppError> {
    let languages: Vec<LanguageCode> = raw
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(LanguageCode::new)
        .collect();
    if languages.is_empty() {
        return Err(AppError::InvalidLanguages {
            value: raw.join(","),
        });
    }
    Ok(languages)
}

/// Flags override the config file, which overrides the defaults
fn build_config(args: &CliArgs) -> Result<(SweepConfig, PathBuf), AppError> {
    let (mut config, base) = match &args.config {
        Some(path) => (load_config(path)?, config_base_dir(path)),
        None => (
            SweepConfig::default(),
            std::env::current_dir().map_err(xquad_sweep::Error::from)?,
        ),
    };

    if let Some(raw) = &args.languages {
        config.languages = parse_languages(raw)?;
    }

    let params = &mut config.params;
    if let Some(v) = &args.model_path {
        params.model_path = v.clone();
    }
    if let Some(v) = args.max_answer_length {
        params.max_answer_length = v;
    }
    if let Some(v) = args.max_length {
        params.max_length = v;
    }
    if let Some(v) = args.doc_stride {
        params.doc_stride = v;
    }
    if let Some(v) = args.n_best_size {
        params.n_best_size = v;
    }
    if let Some(v) = args.batch_size {
        params.batch_size = v;
    }
    if let Some(v) = &args.device {
        params.device = v.clone();
    }
    if let Some(v) = &args.dataset_name {
        params.dataset_name = Some(v.clone());
    }
    if let Some(v) = &args.data_dir {
        params.data_dir = Some(v.clone());
    }
    if let Some(v) = &args.huggingface_model_checkpoint {
        params.huggingface_model_checkpoint = Some(v.clone());
    }
    if let Some(v) = args.squad_v2 {
        params.squad_v2 = Some(v);
    }
    if !args.extra_args.is_empty() {
        params.extra_args = args.extra_args.clone();
    }

    if let Some(v) = &args.python {
        config.evaluator.program = v.clone();
    }
    if let Some(v) = &args.script {
        config.evaluator.script = Some(v.clone());
    }
    if let Some(v) = &args.workdir {
        config.working_dir = v.clone();
    }
    if args.no_venv {
        config.venv = None;
    } else if let Some(v) = &args.venv {
        config.venv = Some(v.clone());
    }
    if let Some(v) = args.on_error {
        config.on_error = v;
    }

    Ok((config, base))
}

/// Run the CLI and return the process exit code
pub fn run(args: CliArgs) -> Result<i32, AppError> {
    init_logging(args.log)?;

    let (config, base) = build_config(&args)?;

    if let Some(path) = &args.save_config {
        config.validate()?;
        save_config(&config, path)?;
        return Ok(0);
    }

    if args.dry_run {
        for invocation in xquad_sweep::dry_run(&config, &base)? {
            println!("{}", invocation);
        }
        return Ok(0);
    }

    let report = xquad_sweep::sweep_in(&config, &base)?;
    if let Some(path) = &args.report {
        xquad_sweep::write_report(&report, path)?;
    }

    if !report.is_success() {
        info!(
            "{} of {} language(s) failed",
            report.failed,
            report.outcomes.len()
        );
    }
    Ok(report.exit_code())
}
