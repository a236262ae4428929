use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gatewalk::{Editor, EditorError};
use gatewalk_dialoguer::{DialoguerError, DialoguerRunner, JsonSink};
use tracing_subscriber::EnvFilter;

/// Run a gatewalk survey document in the terminal.
#[derive(Parser, Debug)]
#[command(name = "gatewalk-run", version, about)]
struct Args {
    /// Survey document (JSON).
    document: PathBuf,

    /// Write the submitted answers to this file instead of stdout.
    #[arg(short, long, env = "GATEWALK_OUTPUT")]
    output: Option<PathBuf>,

    /// Plain prompts without colors.
    #[arg(long, env = "GATEWALK_PLAIN")]
    plain: bool,

    /// Only check the document and report its problems.
    #[arg(long)]
    check: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let blob = std::fs::read_to_string(&args.document)
        .with_context(|| format!("reading {}", args.document.display()))?;

    let editor = match Editor::load(&blob) {
        Ok(editor) => editor,
        Err(err @ EditorError::MalformedDocument(_)) => {
            for problem in err.problems() {
                eprintln!("  - {problem}");
            }
            return Err(err).context(format!("{} is not a valid survey", args.document.display()));
        }
        Err(err) => return Err(err.into()),
    };
    let document = editor.document();

    if args.check {
        println!(
            "{}: ok ({} pages, {} questions)",
            args.document.display(),
            document.pages.len(),
            document.questions().count()
        );
        return Ok(());
    }

    let runner = if args.plain {
        DialoguerRunner::plain()
    } else {
        DialoguerRunner::new()
    };
    let sink = match args.output {
        Some(path) => JsonSink::File(path),
        None => JsonSink::Stdout,
    };

    match runner.run(document, sink) {
        Ok(_) => Ok(()),
        Err(DialoguerError::Cancelled) => {
            eprintln!("Survey cancelled.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
