use std::{
	io::{self, BufRead, Write},
	path::PathBuf,
};

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use nanoplex_config::{Config, DEFAULT_LLM_API_BASE};
use nanoplex_service::AnswerService;

const QUERY_PROMPT: &str = "Enter your query: ";

#[derive(Debug, Parser)]
#[command(
	version = nanoplex_cli::VERSION,
	about = nanoplex_cli::ABOUT,
	rename_all = "kebab",
	styles = nanoplex_cli::styles(),
)]
pub struct Args {
	/// Question to answer. Read from stdin when omitted.
	#[arg(value_name = "QUERY")]
	pub query: Option<String>,
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	/// Overrides `output.dir` from the config.
	#[arg(long, short = 'o', value_name = "DIR")]
	pub output_dir: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = nanoplex_config::load(args.config.as_deref())?;

	init_tracing(&cfg);

	if cfg.llm.api_base == DEFAULT_LLM_API_BASE {
		tracing::info!(api_base = %cfg.llm.api_base, "Using the default local LLM endpoint.");
	}

	let query = match args.query {
		Some(query) => query,
		None => {
			let stdin = io::stdin();
			let mut stdout = io::stdout();

			read_query(&mut stdin.lock(), &mut stdout)?
		},
	};

	if query.trim().is_empty() {
		return Err(eyre::eyre!("Query must be non-empty."));
	}

	let output_dir = args.output_dir.unwrap_or_else(|| cfg.output.dir.clone());
	let service = AnswerService::new(cfg)?;

	tracing::info!(model = %service.cfg.llm.model, "Answering query.");

	let answer = service.answer(&query).await?;
	let path = answer.save(&output_dir)?;

	tracing::info!(
		path = %path.display(),
		evidence = answer.evidence.len(),
		citations = answer.normalized.mapping.len(),
		"Answer saved."
	);
	println!("{}", path.display());

	Ok(())
}

fn init_tracing(cfg: &Config) {
	let filter =
		EnvFilter::try_new(&cfg.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn read_query<R, W>(input: &mut R, prompt: &mut W) -> io::Result<String>
where
	R: BufRead,
	W: Write,
{
	prompt.write_all(QUERY_PROMPT.as_bytes())?;
	prompt.flush()?;

	let mut line = String::new();

	input.read_line(&mut line)?;

	Ok(line.trim().to_string())
}
