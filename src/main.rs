use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sf2_tools::calendar::{self, CalendarOptions};
use sf2_tools::compose::{self, ComposeOptions, DEFAULT_TEMPLATE};
use sf2_tools::io::InputFormat;
use sf2_tools::layout::LayoutSchema;
use sf2_tools::partition::{DEFAULT_CAPACITY, OverflowPolicy};
use sf2_tools::{Result, ToolError, lint, logging};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose)?;
    match cli.command {
        Command::Compose(args) => execute_compose(args),
        Command::Lint(args) => execute_lint(args),
        Command::Dates(args) => execute_dates(args),
    }
}

fn execute_compose(args: ComposeArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }

    let format = match args.format {
        Some(format) => format.into(),
        None => sf2_tools::io::detect_format(&args.input).ok_or_else(|| {
            ToolError::UnsupportedInput(format!(
                "cannot determine the format of {}, pass --format",
                args.input.display()
            ))
        })?,
    };

    let schema = match &args.layout {
        Some(path) => LayoutSchema::load(path)?,
        None => LayoutSchema::default(),
    };

    let options = ComposeOptions {
        template: args.template,
        output: args.output,
        overflow: args.overflow.into(),
        capacity: args.capacity,
        schema,
        calendar: CalendarOptions {
            january_rollover: !args.no_january_rollover,
        },
        extra_holidays: args.holiday.into_iter().collect::<BTreeSet<_>>(),
    };

    let written = match format {
        InputFormat::Json => compose::json_to_excel(&args.input, &options)?,
        InputFormat::Csv => compose::csv_to_excel(&args.input, &options)?,
    };
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn execute_lint(args: LintArgs) -> Result<()> {
    let report = lint::lint_json(&args.input, args.capacity);
    print!("{report}");
    if report.is_valid() {
        Ok(())
    } else {
        Err(ToolError::SchemaValidation(format!(
            "{} blocking error(s) in {}",
            report.errors.len(),
            args.input.display()
        )))
    }
}

fn execute_dates(args: DatesArgs) -> Result<()> {
    let options = CalendarOptions {
        january_rollover: !args.no_january_rollover,
    };
    for date in calendar::resolve_with(&args.school_year, &args.month, &options)? {
        println!("{date}");
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compose SF2 monthly attendance reports from class rosters."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the attendance report for a JSON or CSV input.
    Compose(ComposeArgs),
    /// Check an attendance JSON file without generating anything.
    Lint(LintArgs),
    /// Print the school days of a month.
    Dates(DatesArgs),
}

#[derive(clap::Args)]
struct ComposeArgs {
    /// Attendance input file.
    #[arg(long)]
    input: PathBuf,

    /// Input format; guessed from the extension when omitted.
    #[arg(long, value_enum)]
    format: Option<InputFormatKind>,

    /// Report template workbook.
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: PathBuf,

    /// Output file path. Defaults to Attendance_<month>_<section>.xlsx next
    /// to the input.
    #[arg(long)]
    output: Option<PathBuf>,

    /// What to do when a gender exceeds the template capacity.
    #[arg(long, value_enum, default_value_t = OverflowKind::Abort)]
    overflow: OverflowKind,

    /// Students per gender per report.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// JSON description of the template layout.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Additional holiday (YYYY-MM-DD); may be repeated.
    #[arg(long)]
    holiday: Vec<String>,

    /// Report every January weekday instead of starting on the first
    /// Monday on or after January 4.
    #[arg(long)]
    no_january_rollover: bool,
}

#[derive(clap::Args)]
struct LintArgs {
    /// Attendance JSON file.
    #[arg(long)]
    input: PathBuf,

    /// Students per gender per report.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,
}

#[derive(clap::Args)]
struct DatesArgs {
    /// School year, e.g. 2025-2026.
    #[arg(long)]
    school_year: String,

    /// Month name or number.
    #[arg(long)]
    month: String,

    /// Report every January weekday.
    #[arg(long)]
    no_january_rollover: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum InputFormatKind {
    Json,
    Csv,
}

impl From<InputFormatKind> for InputFormat {
    fn from(kind: InputFormatKind) -> Self {
        match kind {
            InputFormatKind::Json => InputFormat::Json,
            InputFormatKind::Csv => InputFormat::Csv,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OverflowKind {
    Abort,
    Truncate,
    Split,
}

impl From<OverflowKind> for OverflowPolicy {
    fn from(kind: OverflowKind) -> Self {
        match kind {
            OverflowKind::Abort => OverflowPolicy::Abort,
            OverflowKind::Truncate => OverflowPolicy::Truncate,
            OverflowKind::Split => OverflowPolicy::Split,
        }
    }
}
