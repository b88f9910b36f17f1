use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use diff_marker::{DiffMarker, DiffOptions, DiffResult, View};
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "diff-marker")]
#[command(about = "Line-level text comparison with unified and side-by-side output")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two text files (use "-" to read one of them from stdin)
    Compare(CompareArgs),
    /// Print shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Print the man page
    Man,
}

#[derive(Args)]
struct CompareArgs {
    /// Left-hand text
    left: PathBuf,
    /// Right-hand text
    right: PathBuf,
    /// Lines of context around each change in unified output
    #[arg(short = 'U', long)]
    context: Option<usize>,
    /// How to render the result
    #[arg(long, value_enum, default_value_t = Format::SideBySide)]
    view: Format,
    /// Largest accepted input, in characters
    #[arg(long)]
    max_chars: Option<usize>,
    /// TOML file with diff options
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the rendered result to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    SideBySide,
    Unified,
    Stats,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Compare(args) => compare(args)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "diff-marker", &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn compare(args: CompareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = Path::new("-");
    if args.left == stdin && args.right == stdin {
        return Err("Only one side can be read from stdin".into());
    }

    let mut options = match &args.config {
        Some(path) => DiffOptions::from_toml_str(&fs::read_to_string(path)?)?,
        None => DiffOptions::default(),
    };
    if let Some(context) = args.context {
        options = options.with_context_lines(context);
    }
    if let Some(max_chars) = args.max_chars {
        options = options.with_max_input_chars(max_chars);
    }

    let left = read_input(&args.left)?;
    let right = read_input(&args.right)?;
    let result = DiffMarker::new(options).compare(&left, &right)?;

    let rendered = render(&result, args.view)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            info!(path = %path.display(), "wrote diff result");
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn render(result: &DiffResult, format: Format) -> Result<String, serde_json::Error> {
    Ok(match format {
        Format::SideBySide => result.render(View::SideBySide),
        Format::Unified => result.render(View::Unified),
        Format::Stats => result.render(View::Stats),
        Format::Json => serde_json::to_string_pretty(result)? + "\n",
    })
}

/// Read a file, or stdin for "-"
fn read_input(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(path)
    }
}
