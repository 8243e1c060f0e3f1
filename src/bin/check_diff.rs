use clap::Parser;
use diff_ignore::{FilterOptions, check_diff, logging};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "check_diff")]
#[command(version, about = "Print an ed-style diff without the change blocks listed in an ignore file")]
struct Cli {
    /// Newly generated diff to filter
    diff_file: PathBuf,

    /// Ignore entries written by extract_ignore_lines
    ignore_lines_file: PathBuf,

    /// Fail when a header matches an ignore entry that was already passed,
    /// instead of printing the block with a warning
    #[arg(long)]
    strict_order: bool,

    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let options = FilterOptions {
        strict_order: cli.strict_order,
    };
    let mut out = BufWriter::new(io::stdout().lock());

    match check_diff(&cli.diff_file, &cli.ignore_lines_file, options, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("check_diff: {e}");
            ExitCode::FAILURE
        }
    }
}
