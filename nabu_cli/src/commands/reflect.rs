//! `nabu reflect`: structural export of PHP sources

use clap::Args;
use nabu_reflection::batch::{self, BatchConfig, BatchResults};
use nabu_reflection::config::runtime::RuntimeConfig;
use nabu_reflection::export::{self, ExportFormat};
use nabu_reflection::Pipeline;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ReflectArgs {
    /// PHP file or directory to reflect
    pub input: PathBuf,

    /// Export format: xml or json
    #[arg(long, default_value = "xml")]
    pub format: ExportFormat,

    /// Write one export per source file below this directory
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Runtime preferences file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keep type hints as written instead of expanding them
    #[arg(long)]
    pub no_expand_types: bool,

    /// Worker threads for directory input
    #[arg(long, short = 'j', default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Process files one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Only reflect the top level of a directory
    #[arg(long)]
    pub no_recursive: bool,

    /// Stop at the first failing file
    #[arg(long)]
    pub fail_fast: bool,

    #[arg(long)]
    pub max_files: Option<usize>,
}

impl ReflectArgs {
    fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            max_threads: if self.sequential { 1 } else { self.threads.max(1) },
            recursive: !self.no_recursive,
            max_files: self.max_files,
            progress_reporting: log::log_enabled!(log::Level::Info),
            fail_fast: self.fail_fast,
        }
    }
}

pub fn run(args: &ReflectArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };
    let expand_types = config.reflection.expand_types && !args.no_expand_types;
    let pipeline = Pipeline::from_config(&config);

    if args.input.is_file() {
        log::info!("reflecting {}", args.input.display());
        let result = match pipeline.process_file(&args.input) {
            Ok(result) => result,
            Err(error) => {
                eprintln!("FAILED [{}]: {}", error.stage(), error);
                return Ok(false);
            }
        };

        let output = export::export(&result.file, args.format, expand_types)?;
        match &args.output {
            Some(dir) => {
                let relative = args.input.file_name().map(Path::new).unwrap_or(args.input.as_path());
                let target = write_export(dir, relative, args.format, &output)?;
                log::info!("wrote {}", target.display());
            }
            None => println!("{}", output),
        }
        return Ok(true);
    }

    if !args.input.is_dir() {
        return Err(format!("input must be a PHP file or a directory: {}", args.input.display()).into());
    }

    let batch_config = args.batch_config();
    log::info!(
        "reflecting {} with {} thread(s)",
        args.input.display(),
        batch_config.effective_threads()
    );
    let results = batch::process_directory_with_config(&args.input, &batch_config, &pipeline)?;

    match &args.output {
        Some(dir) => {
            for (path, result) in &results.successful_files {
                let output = export::export(&result.file, args.format, expand_types)?;
                let relative = path.strip_prefix(&args.input).unwrap_or(path.as_path());
                write_export(dir, relative, args.format, &output)?;
            }
        }
        None => {
            for (_, result) in &results.successful_files {
                println!("{}", export::export(&result.file, args.format, expand_types)?);
            }
        }
    }

    print_batch_results(&results);
    Ok(results.failure_count() == 0)
}

/// Mirror `relative` below `output_dir`, swapping the extension for the format's
fn write_export(
    output_dir: &Path,
    relative: &Path,
    format: ExportFormat,
    content: &str,
) -> std::io::Result<PathBuf> {
    let target = output_dir.join(relative).with_extension(format.extension());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, content)?;
    Ok(target)
}

fn print_batch_results(results: &BatchResults) {
    eprintln!("{}", results.summary());
    for (file_path, error) in &results.failed_files {
        eprintln!("  {} [{}]: {}", file_path.display(), error.stage(), error);
    }
}
