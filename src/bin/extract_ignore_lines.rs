use clap::Parser;
use diff_ignore::{ExtractOptions, extract_ignore_lines, logging};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "extract_ignore_lines")]
#[command(version, about = "Record the change blocks of an ed-style diff as ignore entries")]
struct Cli {
    /// Reference diff whose change blocks are known to be acceptable
    diff_file: PathBuf,

    /// Reject block headers that are not ed-style change headers (e.g. 5c5, 10,12c10,12)
    #[arg(long)]
    strict: bool,

    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let options = ExtractOptions { strict: cli.strict };
    let mut out = BufWriter::new(io::stdout().lock());

    match extract_ignore_lines(&cli.diff_file, options, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("extract_ignore_lines: {e}");
            ExitCode::FAILURE
        }
    }
}
