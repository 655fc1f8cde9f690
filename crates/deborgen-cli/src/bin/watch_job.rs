use clap::Parser;
use deborgen_cli::{build_headers, watch_job};
use std::time::Duration;

/// Watch a deborgen job until it reaches a terminal state
#[derive(Parser, Debug)]
#[command(name = "deborgen-watch-job", version)]
struct Args {
    job_id: String,

    #[arg(long)]
    coordinator: String,

    #[arg(long, env = "DEBORGEN_TOKEN")]
    token: Option<String>,

    #[arg(long = "poll-seconds", default_value_t = 1.0)]
    poll_seconds: f64,

    #[arg(long = "timeout-seconds", default_value_t = 30.0)]
    timeout_seconds: f64,

    #[arg(long = "no-logs")]
    no_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let coordinator = args.coordinator.trim_end_matches('/').to_string();

    let client = reqwest::blocking::Client::builder()
        .default_headers(build_headers(args.token.as_deref()))
        .timeout(Duration::from_secs(30))
        .build()?;

    watch_job(
        &client,
        &coordinator,
        &args.job_id,
        args.poll_seconds,
        args.timeout_seconds,
        !args.no_logs,
    )
}
