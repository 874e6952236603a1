mod check;
mod definition;

use anyhow::{Context, Result, bail};
use argline::{DefaultMessageProvider, DefaultRenderer, Frontend, Renderer, TerminalPrompter};
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

use crate::definition::{load_definition, write_default_definition};

#[derive(Parser)]
#[command(name = "argline")]
#[command(version, about = "Parse command lines against declarative option definitions", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter argline.json
    Init(InitArgs),

    /// Parse a command line and print the result as JSON
    Parse(ParseArgs),

    /// Print the help text of a command from a definition
    Help(HelpArgs),

    /// Validate a definition file
    Check(CheckArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Replace an existing argline.json
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the definition file
    #[arg(short, long, default_value = "argline.json", value_name = "FILE")]
    definition: PathBuf,

    /// Stop option scanning at the first positional token
    #[arg(long, env = "POSIXLY_CORRECT", value_parser = FalseyValueParser::new())]
    posix: bool,

    /// Tokens to parse, usually given after `--`
    #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct HelpArgs {
    /// Path to the definition file
    #[arg(short, long, default_value = "argline.json", value_name = "FILE")]
    definition: PathBuf,

    /// Sub-command path, e.g. `remote add`
    #[arg(value_name = "COMMAND")]
    path: Vec<String>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the definition file
    #[arg(short, long, default_value = "argline.json", value_name = "FILE")]
    definition: PathBuf,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Parse(args) => parse(args),
        Commands::Help(args) => help(args),
        Commands::Check(args) => check_command(args),
    }
}

fn init(args: InitArgs) -> Result<ExitCode> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let dest = write_default_definition(&dir, args.force)?;
    eprintln!("Created: {}", dest.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {} to declare your options", dest.display());
    eprintln!("  2. Run: argline check");
    eprintln!("  3. Run: argline parse -- <TOKENS>");
    Ok(ExitCode::SUCCESS)
}

fn parse(args: ParseArgs) -> Result<ExitCode> {
    tracing::debug!("executing parse command");

    let loaded = load_definition(&args.definition)?;
    let mut command = loaded.build()?;
    if args.posix {
        command.set_force_posix(true);
    }

    let mut frontend = Frontend::new(&command);
    match frontend.run(args.tokens.as_slice(), &mut TerminalPrompter) {
        Ok(matches) => {
            println!("{}", serde_json::to_string_pretty(&matches)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(code) => Ok(ExitCode::from(u8::try_from(code).unwrap_or(1))),
    }
}

fn help(args: HelpArgs) -> Result<ExitCode> {
    let loaded = load_definition(&args.definition)?;
    let root = loaded.build()?;
    let Some(command) = root.find(&args.path) else {
        bail!("no such command: {} {}", root.name(), args.path.join(" "));
    };

    let program = std::iter::once(root.name())
        .chain(args.path.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    let renderer = DefaultRenderer::<DefaultMessageProvider>::default();
    print!("{}", renderer.help(command, &program));
    Ok(ExitCode::SUCCESS)
}

fn check_command(args: CheckArgs) -> Result<ExitCode> {
    tracing::debug!("executing check command");

    let loaded = load_definition(&args.definition)?;
    let root = loaded.build()?;
    let report = check::check_definition(&loaded.path, &root);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!("OK: {}", report.definition);
        for cmd in &report.commands {
            eprintln!(
                "  {}: {} option(s), {} argument(s){}",
                cmd.path,
                cmd.options.len(),
                cmd.arguments.len(),
                if cmd.posix { ", posix" } else { "" }
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
