use clap::Parser;
use contact_trace_rs::logging::setup_logging;
use contact_trace_rs::{run, TraceConfig};
use std::path::PathBuf;

/// Takes a list of atomic contacts as input and generates a trace figure showing
/// the presence / absence of one or more interactions.
///
/// Interactions are given as two space-separated regular expressions over atom
/// identifiers (`chain:resname:resid:atom`), for example a hydrogen bond from a
/// specific HIS donor to any acceptor on a GLU:
///
///     "A:HIS:172:NE2 A:GLU:143:(OE.|O)"
///
/// Expressions match at the start of the identifier, so residue-level
/// interactions can be traced with e.g. "A:PHE:86:C[B-Z][0-9]* A:VAL:68:C[B-Z][0-9]*".
#[derive(Parser, Debug)]
#[command(name = "get-contact-trace", version, verbatim_doc_comment)]
struct Cli {
    /// One or more multi-frame contact files
    #[arg(long = "input_contacts", required = true, num_args = 1.., value_name = "PATH")]
    input_contacts: Vec<PathBuf>,

    /// Interaction patterns, each a space-separated pair of regexes
    #[arg(long = "interactions", required = true, num_args = 1.., value_name = "PATTERN")]
    interactions: Vec<String>,

    /// An image file to write the trace plot to (png and svg supported)
    #[arg(long = "trace_output", required = true, value_name = "PATH")]
    trace_output: PathBuf,

    /// Interaction pattern labels, one per pattern and file. If not specified,
    /// the regexes will be used
    #[arg(long = "labels", num_args = 1.., value_name = "LABEL")]
    labels: Option<Vec<String>>,

    /// Also write the active frames of every trace to a tab-separated file
    #[arg(long = "frames_output", value_name = "PATH")]
    frames_output: Option<PathBuf>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress log output and the progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = TraceConfig {
        input_contacts: cli.input_contacts,
        interactions: cli.interactions,
        trace_output: cli.trace_output,
        labels: cli.labels,
        frames_output: cli.frames_output,
        show_progress: !cli.quiet,
    };

    match run(&config) {
        Ok(outcome) => {
            if !cli.quiet {
                println!(
                    "✅ Traced {} interaction(s) over {} frames",
                    outcome.frame_sets.len(),
                    outcome.frame_count
                );
                println!("📄 Trace saved to: {:?}", config.trace_output);
                if let Some(path) = &config.frames_output {
                    println!("📄 Frames saved to: {:?}", path);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
