//! `embed <term>...`: prints one word2vec vector per term as a JSON array.
//!
//! The first run parses the text model and writes the binary cache; later runs
//! read the cache. Any unknown term fails the whole call with `TERM_NOT_FOUND`.

use std::process::ExitCode;

use clap::Parser;
use searchkit::{cli, PipelineError};

#[derive(Parser, Debug)]
#[command(name = "embed", about = "Look up word2vec vectors for terms")]
struct Args {
    /// Terms to look up, in output order.
    #[arg(required = true)]
    terms: Vec<String>,
}

fn run(args: Args) -> Result<Vec<Vec<f32>>, PipelineError> {
    let config = cli::load_config()?;
    Ok(searchkit::embed_terms(&config.wordvec, &args.terms)?)
}

fn main() -> ExitCode {
    cli::init_tracing();
    let args = match cli::parse_args::<Args>() {
        Ok(args) => args,
        Err(code) => return code,
    };
    cli::finish("embed", run(args))
}
