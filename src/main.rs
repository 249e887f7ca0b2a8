use clap::{Args, Parser, Subcommand};
use colored::*;

use gutterpress_lib::LineNumberAnnotator;
use gutterpress_lib::config as gp_config;
use gutterpress_lib::exit_codes::exit;

mod file_processor;

use file_processor::FileReport;

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"])]
    color: String,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Ignore all configuration files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report code blocks pending annotation without modifying files
    Check(CheckArgs),
    /// Annotate files in place with line-number gutters
    Apply(CheckArgs),
    /// Initialize a new configuration file
    Init,
    /// Show version information
    Version,
}

/// Run mode determines exit-code behavior: Check exits 1 when blocks are
/// pending, Apply exits 0 after writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Check,
    Apply,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Files or directories to process
    #[arg(required = false)]
    paths: Vec<String>,

    /// Include only specific files or directories (comma-separated glob patterns)
    #[arg(long)]
    include: Option<String>,

    /// Exclude specific files or directories (comma-separated glob patterns)
    #[arg(long)]
    exclude: Option<String>,

    /// Disable all exclude patterns
    #[arg(long)]
    no_exclude: bool,

    /// Respect .gitignore files when scanning directories
    #[arg(long, default_value = "true")]
    respect_gitignore: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Print per-file results, but nothing else
    #[arg(short, long)]
    quiet: bool,

    /// Output format: text (default) or json
    #[arg(long, short = 'o', default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

fn split_patterns(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn load_config_or_exit(config_path: Option<&str>, isolated: bool) -> gp_config::Config {
    match gp_config::load_config(config_path, isolated) {
        Ok((config, _source)) => config,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red().bold(), e);
            exit::tool_error();
        }
    }
}

fn run(args: &CheckArgs, mode: RunMode, config_path: Option<&str>, isolated: bool) -> ! {
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let config = load_config_or_exit(config_path, isolated);

    let cli_include = split_patterns(args.include.as_deref());
    let cli_exclude = split_patterns(args.exclude.as_deref());

    // CLI patterns override the config file entirely, ruff-style
    let include = if cli_include.is_empty() {
        config.global.include.clone()
    } else {
        cli_include
    };
    let exclude = if args.no_exclude {
        Vec::new()
    } else if cli_exclude.is_empty() {
        config.global.exclude.clone()
    } else {
        cli_exclude
    };
    let respect_gitignore = args.respect_gitignore && config.global.respect_gitignore;

    let paths = if args.paths.is_empty() {
        vec![".".to_string()]
    } else {
        args.paths.clone()
    };

    let files = match file_processor::find_html_files(&paths, &include, &exclude, respect_gitignore) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    };

    let annotator = LineNumberAnnotator::from_config_struct(config.annotator.clone());

    let mut reports: Vec<FileReport> = Vec::new();
    let mut files_written = 0usize;
    let mut had_errors = false;

    for file in &files {
        match file_processor::process_file(file, &annotator, mode) {
            Ok(outcome) => {
                if outcome.written {
                    files_written += 1;
                }
                if outcome.blocks > 0 {
                    reports.push(FileReport {
                        file: file.clone(),
                        blocks: outcome.blocks,
                    });
                }
            }
            Err(e) => {
                eprintln!("{}: {:#}", "Error".red().bold(), e);
                had_errors = true;
            }
        }
    }

    let total_blocks: usize = reports.iter().map(|r| r.blocks).sum();

    if args.output == "json" {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{}: Failed to serialize report: {}", "Error".red().bold(), e);
                exit::tool_error();
            }
        }
    } else {
        for report in &reports {
            match mode {
                RunMode::Check => println!(
                    "{}: {} code block(s) pending annotation",
                    report.file,
                    report.blocks.to_string().yellow()
                ),
                RunMode::Apply => println!(
                    "{}: annotated {} code block(s)",
                    report.file,
                    report.blocks.to_string().green()
                ),
            }
        }

        if !args.quiet {
            match mode {
                RunMode::Check if total_blocks == 0 => {
                    println!("{} {} file(s) clean", "Checked".green().bold(), files.len())
                }
                RunMode::Check => println!(
                    "{} {} block(s) in {} file(s) pending annotation",
                    "Found".yellow().bold(),
                    total_blocks,
                    reports.len()
                ),
                RunMode::Apply => println!(
                    "{} {} block(s) in {} of {} file(s)",
                    "Annotated".green().bold(),
                    total_blocks,
                    files_written,
                    files.len()
                ),
            }
        }
    }

    if had_errors {
        exit::tool_error();
    }
    if mode == RunMode::Check && total_blocks > 0 {
        exit::pending();
    }
    exit::success()
}

fn main() {
    // Reset SIGPIPE to default behavior on Unix so piping to `head` etc.
    // works correctly. Without this, Rust ignores SIGPIPE and `println!`
    // panics on broken pipe.
    #[cfg(unix)]
    {
        // SAFETY: setting SIGPIPE back to SIG_DFL is the standard move for
        // CLI tools whose output is meant to be piped.
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    let cli = Cli::parse();

    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    match cli.command {
        Commands::Init => match gp_config::create_default_config(".gutterpress.toml") {
            Ok(_) => {
                println!("Created default configuration file: .gutterpress.toml");
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                exit::tool_error();
            }
        },
        Commands::Version => {
            println!("gutterpress {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Check(args) => run(&args, RunMode::Check, cli.config.as_deref(), cli.no_config),
        Commands::Apply(args) => run(&args, RunMode::Apply, cli.config.as_deref(), cli.no_config),
    }
}
