use clap::Parser;
use deborgen::api::models::JobView;
use deborgen_cli::{build_headers, print_job};
use std::time::Duration;

/// Show details for one deborgen job
#[derive(Parser, Debug)]
#[command(name = "deborgen-get-job", version)]
struct Args {
    job_id: String,

    #[arg(long)]
    coordinator: String,

    #[arg(long, env = "DEBORGEN_TOKEN")]
    token: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let coordinator = args.coordinator.trim_end_matches('/');

    let client = reqwest::blocking::Client::builder()
        .default_headers(build_headers(args.token.as_deref()))
        .timeout(Duration::from_secs(30))
        .build()?;

    let job: JobView = client
        .get(format!("{coordinator}/jobs/{}", args.job_id))
        .send()?
        .error_for_status()?
        .json()?;

    print_job(&job);
    Ok(())
}
