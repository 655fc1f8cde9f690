use clap::Parser;
use deborgen_cli::{build_headers, submit_example_job, watch_job};
use std::time::Duration;

/// Run the deborgen onboarding tutorial: submit a couple of example jobs
/// and watch them run end to end
#[derive(Parser, Debug)]
#[command(name = "deborgen-tutorial", version)]
struct Args {
    #[arg(long)]
    coordinator: String,

    #[arg(long, env = "DEBORGEN_TOKEN")]
    token: Option<String>,

    #[arg(long = "poll-seconds", default_value_t = 1.0)]
    poll_seconds: f64,

    #[arg(long = "timeout-seconds", default_value_t = 60.0)]
    timeout_seconds: f64,
}

const SEQUENCE: [(&str, &str); 2] = [
    ("hello", "Step 1: prove where the job runs"),
    ("primes", "Step 2: run a small practical compute job"),
];

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let coordinator = args.coordinator.trim_end_matches('/').to_string();

    let client = reqwest::blocking::Client::builder()
        .default_headers(build_headers(args.token.as_deref()))
        .timeout(Duration::from_secs(30))
        .build()?;

    println!("starting deborgen tutorial");

    for (example, title) in SEQUENCE {
        println!();
        println!("{title}");
        println!("submitting example={example}");
        let (job_id, command) =
            submit_example_job(&client, &coordinator, example, args.timeout_seconds as i64, 1)?;
        println!("command: {command}");
        println!("submitted {job_id}");
        watch_job(
            &client,
            &coordinator,
            &job_id,
            args.poll_seconds,
            args.timeout_seconds,
            true,
        )?;
    }

    println!();
    println!("what you just verified:");
    println!("- your local machine can submit jobs to the coordinator");
    println!("- a worker claims and runs those jobs");
    println!("- logs come back through the coordinator API");
    println!();
    println!("next commands:");
    println!("- submit one example: deborgen-submit-example hello --coordinator {coordinator}");
    println!("- submit one example: deborgen-submit-example primes --coordinator {coordinator}");
    println!("- watch a job: deborgen-watch-job <job_id> --coordinator {coordinator}");
    println!("- list recent jobs: deborgen-list-jobs --coordinator {coordinator}");
    println!();
    println!("tutorial complete");
    Ok(())
}
