// crates.io
use clap::Parser;
// self
use nanoplex::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	nanoplex::run(args).await
}
