//! `sentence-embed <term>...`: joins the terms into one sentence and prints
//! `[[...]]`, a JSON array holding the single sentence vector.

use std::process::ExitCode;

use clap::Parser;
use searchkit::{cli, PipelineError, SentenceEncoder};

#[derive(Parser, Debug)]
#[command(name = "sentence-embed", about = "Encode terms as one sentence vector")]
struct Args {
    /// Words of the sentence, joined with single spaces.
    #[arg(required = true)]
    terms: Vec<String>,
}

fn run(args: Args) -> Result<Vec<Vec<f32>>, PipelineError> {
    let config = cli::load_config()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PipelineError::ModelUnavailable(format!("tokio runtime: {e}")))?;

    let encoder = runtime.block_on(SentenceEncoder::load(&config.semantic))?;
    let vector = encoder.encode_terms(&args.terms)?;
    Ok(vec![vector])
}

fn main() -> ExitCode {
    cli::init_tracing();
    let args = match cli::parse_args::<Args>() {
        Ok(args) => args,
        Err(code) => return code,
    };
    cli::finish("sentence-embed", run(args))
}
