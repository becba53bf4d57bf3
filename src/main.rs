// srcspell: collect definitions, comments and string literals from a C/C++ project

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use srcspell::config::{Config, OutputFormat};
use srcspell::inspect::WriterSink;
use srcspell::parser::FrontEnd;
use srcspell::project::{CompilationDatabase, Orchestrator};

/// Report definitions, comments and string literals of every unit listed in
/// a compilation database.
#[derive(Parser, Debug)]
#[command(name = "srcspell", author, version, about, long_about = None)]
struct Cli {
    /// Project directory containing compile_commands.json
    #[arg(default_value = ".")]
    project_dir: PathBuf,

    /// Explicit path to a compile_commands.json
    #[arg(short = 'p', long = "compile-commands")]
    compile_commands: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Only process units whose source path contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Extra system header directory (repeatable)
    #[arg(long = "system-include")]
    system_include: Vec<PathBuf>,

    /// Do not search /usr/include and /usr/local/include
    #[arg(long)]
    no_default_system_includes: bool,

    /// Enable debug diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            verbose: self.verbose,
            quiet: self.quiet,
            format: self.format,
            system_include_dirs: self.system_include.clone(),
            default_system_includes: !self.no_default_system_includes,
            filter: self.filter.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level()).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let database = match &cli.compile_commands {
        Some(path) => CompilationDatabase::load_from_file(path),
        None => CompilationDatabase::load_from_directory(&cli.project_dir),
    }
    .context("Failed to load compilation database")?;
    let tasks = database
        .tasks()
        .with_context(|| format!("Invalid entry in {}", database.path().display()))?;
    debug!("{} units in {}", tasks.len(), database.path().display());

    let front_end = FrontEnd::new(config.standard_include_dirs());
    let mut sink = WriterSink::new(io::stdout().lock(), config.format);
    Orchestrator::new(front_end, &config).run(&tasks, &mut sink);

    let _stdout = sink.finish().context("Failed to write observations")?;
    Ok(())
}
