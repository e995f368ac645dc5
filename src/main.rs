use anyhow::{Context, Result};
use log::LevelFilter;
use surveymonkey_api::args::Args;
use surveymonkey_api::run;

fn init_logger(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();

    if debug {
        builder.filter_level(LevelFilter::Debug);
    }

    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.debug);

    let body = run(args).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&body).context("Failed to format the response")?
    );

    Ok(())
}
