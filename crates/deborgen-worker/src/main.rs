use clap::Parser;
use deborgen::jobs::{LabelValue, Labels};
use deborgen::api::models::AssignmentView;
use reqwest::Client;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::Instant;

/// deborgen v0 worker agent
#[derive(Parser, Debug)]
#[command(name = "deborgen-worker", about = "deborgen v0 worker agent", version)]
struct Args {
    #[arg(long)]
    coordinator: String,

    #[arg(long = "node-id")]
    node_id: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long = "labels-json", default_value = "{}")]
    labels_json: String,

    #[arg(long, env = "DEBORGEN_TOKEN")]
    token: Option<String>,

    #[arg(long = "poll-seconds", default_value_t = 2.0)]
    poll_seconds: f64,

    #[arg(long = "work-dir")]
    work_dir: Option<String>,

    #[arg(long = "heartbeat-seconds", default_value_t = 15.0)]
    heartbeat_seconds: f64,
}

fn parse_labels(raw: &str) -> anyhow::Result<Labels> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("--labels-json must decode to a JSON object"))?;

    let mut labels = Labels::new();
    for (key, v) in obj {
        let label = match v {
            serde_json::Value::String(s) => LabelValue::Str(s.clone()),
            serde_json::Value::Bool(b) => LabelValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    LabelValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    LabelValue::Float(f)
                } else {
                    anyhow::bail!("label '{key}' value must be str/int/float/bool");
                }
            }
            _ => anyhow::bail!("label '{key}' value must be str/int/float/bool"),
        };
        labels.insert(key.clone(), label);
    }
    Ok(labels)
}

struct RunOutcome {
    exit_code: i64,
    text: String,
    failure_reason: Option<String>,
}

/// Runs `command` as a literal argv (never through a shell) with a hard
/// wall-clock timeout. Mirrors the original agent's exit code conventions:
/// 2 for a malformed command, 124 for a timeout, 127 for an unresolvable
/// executable, and the child's own exit code otherwise.
async fn run_job(command: &str, timeout_seconds: u64, work_dir: Option<&str>) -> RunOutcome {
    let argv = match shlex::split(command) {
        None => {
            return RunOutcome {
                exit_code: 2,
                text: String::new(),
                failure_reason: Some("invalid command: unbalanced quotes".to_string()),
            };
        }
        Some(argv) if argv.is_empty() => {
            return RunOutcome {
                exit_code: 2,
                text: String::new(),
                failure_reason: Some("invalid command: empty command".to_string()),
            };
        }
        Some(argv) => argv,
    };

    let (argv0, rest) = argv.split_first().expect("checked non-empty above");

    let mut cmd = Command::new(argv0);
    cmd.args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = work_dir {
        cmd.current_dir(dir);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return RunOutcome {
                exit_code: 127,
                text: String::new(),
                failure_reason: Some(format!("command not found: {argv0}")),
            };
        }
        Err(e) => {
            return RunOutcome {
                exit_code: 127,
                text: String::new(),
                failure_reason: Some(format!("command not found: {argv0} ({e})")),
            };
        }
    };

    let mut stdout = child.stdout.take().expect("stdout piped");
    let mut stderr = child.stderr.take().expect("stderr piped");
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();

    let wait = async {
        let (_, _, status) = tokio::join!(
            stdout.read_to_end(&mut out_buf),
            stderr.read_to_end(&mut err_buf),
            child.wait(),
        );
        status
    };

    match tokio::time::timeout(Duration::from_secs(timeout_seconds), wait).await {
        Ok(Ok(status)) => {
            let mut text = String::from_utf8_lossy(&out_buf).into_owned();
            text.push_str(&String::from_utf8_lossy(&err_buf));
            RunOutcome {
                exit_code: status.code().unwrap_or(1) as i64,
                text,
                failure_reason: None,
            }
        }
        Ok(Err(e)) => RunOutcome {
            exit_code: 1,
            text: String::new(),
            failure_reason: Some(format!("failed to wait for child: {e}")),
        },
        Err(_) => {
            let _ = child.kill().await;
            let _ = child.wait().await;
            let mut text = String::from_utf8_lossy(&out_buf).into_owned();
            text.push_str(&String::from_utf8_lossy(&err_buf));
            RunOutcome {
                exit_code: 124,
                text,
                failure_reason: Some(format!("timeout exceeded ({timeout_seconds}s)")),
            }
        }
    }
}

async fn send_heartbeat(
    client: &Client,
    coordinator: &str,
    node_id: &str,
    name: &Option<String>,
    labels: &Labels,
) -> anyhow::Result<()> {
    client
        .post(format!("{coordinator}/nodes/{node_id}/heartbeat"))
        .json(&serde_json::json!({ "name": name, "labels": labels }))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let labels = parse_labels(&args.labels_json)?;
    let coordinator = args.coordinator.trim_end_matches('/').to_string();

    let mut headers = reqwest::header::HeaderMap::new();
    if let Some(token) = &args.token {
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {token}").parse()?,
        );
    }
    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .build()?;

    println!(
        "deborgen worker starting... coordinator={coordinator} node_id={} poll_seconds={} heartbeat_seconds={}",
        args.node_id, args.poll_seconds, args.heartbeat_seconds,
    );

    let mut next_heartbeat = Instant::now();

    loop {
        let now = Instant::now();
        if now >= next_heartbeat {
            if let Err(e) =
                send_heartbeat(&client, &coordinator, &args.node_id, &args.name, &labels).await
            {
                eprintln!("[worker] heartbeat failed: {e}");
            }
            next_heartbeat = now + Duration::from_secs_f64(args.heartbeat_seconds);
        }

        let response = match client
            .get(format!("{coordinator}/jobs/next"))
            .query(&[("node_id", &args.node_id)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                eprintln!("[worker] poll failed: {e}");
                tokio::time::sleep(Duration::from_secs_f64(args.poll_seconds)).await;
                continue;
            }
        };

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            tokio::time::sleep(Duration::from_secs_f64(args.poll_seconds)).await;
            continue;
        }
        if !response.status().is_success() {
            eprintln!(
                "[worker] poll returned {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            );
            tokio::time::sleep(Duration::from_secs_f64(args.poll_seconds)).await;
            continue;
        }

        let assignment: AssignmentView = match response.json().await {
            Ok(a) => a,
            Err(e) => {
                eprintln!("[worker] failed to parse assignment: {e}");
                tokio::time::sleep(Duration::from_secs_f64(args.poll_seconds)).await;
                continue;
            }
        };

        let job_id = assignment.job.id.clone();
        println!("[worker] running {job_id}: {}", assignment.job.command);

        let outcome = run_job(
            &assignment.job.command,
            assignment.job.timeout_seconds.max(0) as u64,
            args.work_dir.as_deref(),
        )
        .await;

        if !outcome.text.is_empty() {
            let res = client
                .post(format!("{coordinator}/jobs/{job_id}/logs"))
                .json(&serde_json::json!({
                    "node_id": args.node_id,
                    "lease_token": assignment.lease_token,
                    "text": outcome.text,
                }))
                .send()
                .await
                .and_then(|r| r.error_for_status());
            if let Err(e) = res {
                eprintln!("[worker] log upload failed for {job_id}: {e}");
            }
        }

        let finish_res = client
            .post(format!("{coordinator}/jobs/{job_id}/finish"))
            .json(&serde_json::json!({
                "node_id": args.node_id,
                "lease_token": assignment.lease_token,
                "exit_code": outcome.exit_code,
                "failure_reason": outcome.failure_reason,
            }))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match finish_res {
            Ok(_) => println!("[worker] finished {job_id} exit_code={}", outcome.exit_code),
            Err(e) => eprintln!("[worker] finish report failed for {job_id}: {e}"),
        }
    }
}
