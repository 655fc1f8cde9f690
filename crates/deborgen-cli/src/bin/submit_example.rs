use clap::{Parser, ValueEnum};
use deborgen_cli::{build_headers, print_follow_up, submit_example_job};
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum Example {
    Hello,
    Primes,
}

impl Example {
    fn name(self) -> &'static str {
        match self {
            Example::Hello => "hello",
            Example::Primes => "primes",
        }
    }
}

/// Submit one of deborgen's built-in example jobs
#[derive(Parser, Debug)]
#[command(name = "deborgen-submit-example", version)]
struct Args {
    #[arg(value_enum)]
    example: Example,

    #[arg(long)]
    coordinator: String,

    #[arg(long, env = "DEBORGEN_TOKEN")]
    token: Option<String>,

    #[arg(long = "timeout-seconds", default_value_t = 3600)]
    timeout_seconds: i64,

    #[arg(long = "max-attempts", default_value_t = 1)]
    max_attempts: i64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let coordinator = args.coordinator.trim_end_matches('/').to_string();
    let env_token = std::env::var("DEBORGEN_TOKEN").ok();
    let token_from_env = args.token.is_some() && args.token == env_token;

    let client = reqwest::blocking::Client::builder()
        .default_headers(build_headers(args.token.as_deref()))
        .timeout(Duration::from_secs(30))
        .build()?;

    let (job_id, command) = submit_example_job(
        &client,
        &coordinator,
        args.example.name(),
        args.timeout_seconds,
        args.max_attempts,
    )?;

    println!("example: {}", args.example.name());
    println!("command: {command}");
    print_follow_up(&job_id, &coordinator, token_from_env);
    Ok(())
}
