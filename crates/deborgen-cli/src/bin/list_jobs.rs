use clap::Parser;
use deborgen::api::models::ListJobsResponse;
use deborgen_cli::{build_headers, format_job_line, parse_limit};
use std::time::Duration;

/// List recent deborgen jobs
#[derive(Parser, Debug)]
#[command(name = "deborgen-list-jobs", version)]
struct Args {
    #[arg(long)]
    coordinator: String,

    #[arg(long, env = "DEBORGEN_TOKEN")]
    token: Option<String>,

    #[arg(long, value_parser = ["queued", "running", "succeeded", "failed"])]
    status: Option<String>,

    #[arg(long, default_value_t = 10, value_parser = parse_limit)]
    limit: i64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let coordinator = args.coordinator.trim_end_matches('/');

    let client = reqwest::blocking::Client::builder()
        .default_headers(build_headers(args.token.as_deref()))
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut request = client
        .get(format!("{coordinator}/jobs"))
        .query(&[("limit", args.limit.to_string())]);
    if let Some(status) = &args.status {
        request = request.query(&[("status", status)]);
    }

    let response: ListJobsResponse = request.send()?.error_for_status()?.json()?;

    if response.jobs.is_empty() {
        println!("no jobs found");
        return Ok(());
    }
    for job in &response.jobs {
        println!("{}", format_job_line(job));
    }
    Ok(())
}
