//! marquee-ctl — command-line interface for the marquee daemon.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 9040;

// ── Response types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatusResponse {
    live_sessions: usize,
    scores_stored: usize,
    uptime_secs: u64,
}

#[derive(Deserialize)]
struct ScoresResponse {
    scores: Vec<ScoreRow>,
}

#[derive(Deserialize)]
struct ScoreRow {
    name: String,
    cinema: String,
    time: u64,
    date: String,
    verified: bool,
    mobile: bool,
}

#[derive(Deserialize)]
struct StartResponse {
    token: String,
    signature: String,
}

#[derive(Deserialize)]
struct InteractResponse {
    success: bool,
}

#[derive(Deserialize)]
struct SubmitResponse {
    success: bool,
    rank: usize,
}

// ── HTTP helpers ──────────────────────────────────────────────────────────────

fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{}/api", port)
}

async fn get_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T> {
    reqwest::get(url)
        .await
        .with_context(|| format!("failed to connect to marqueed at {} — is it running?", url))?
        .json::<T>()
        .await
        .context("failed to parse response")
}

async fn post_json<T: for<'de> Deserialize<'de>>(url: &str, body: serde_json::Value) -> Result<T> {
    reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("failed to connect to marqueed at {} — is it running?", url))?
        .json::<T>()
        .await
        .context("failed to parse response")
}

// ── Subcommand handlers ───────────────────────────────────────────────────────

async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Marquee Daemon Status");
    println!("═══════════════════════════════════════");
    println!("  Live sessions : {}", resp.live_sessions);
    println!("  Scores stored : {}", resp.scores_stored);
    println!("  Uptime        : {}s", resp.uptime_secs);

    Ok(())
}

async fn cmd_scores(port: u16) -> Result<()> {
    let resp: ScoresResponse = get_json(&format!("{}/scores", base_url(port))).await?;

    if resp.scores.is_empty() {
        println!("The board is empty.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Leaderboard ({})", resp.scores.len());
    println!("═══════════════════════════════════════");

    for (i, s) in resp.scores.iter().enumerate() {
        let mark = if s.verified { "✓" } else { " " };
        let platform = if s.mobile { "mobile" } else { "desktop" };
        println!(
            "  {:>3}. {mark} {:<20} {:>8}ms  {} ({}, {})",
            i + 1,
            s.name,
            s.time,
            s.cinema,
            platform,
            s.date
        );
    }

    Ok(())
}

async fn cmd_start(port: u16) -> Result<()> {
    let resp: StartResponse =
        post_json(&format!("{}/session/start", base_url(port)), serde_json::json!({})).await?;
    println!("token     : {}", resp.token);
    println!("signature : {}", resp.signature);
    Ok(())
}

async fn cmd_interact(port: u16, token: &str) -> Result<()> {
    let resp: InteractResponse = post_json(
        &format!("{}/session/interact", base_url(port)),
        serde_json::json!({ "token": token }),
    )
    .await?;
    println!("{}", if resp.success { "recorded" } else { "ignored" });
    Ok(())
}

async fn cmd_submit(port: u16, args: &[&str]) -> Result<()> {
    let mut name = None;
    let mut cinema = None;
    let mut time: Option<u64> = None;
    let mut email = None;
    let mut token = None;
    let mut mobile = false;

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--name" => {
                i += 1;
                name = Some(args.get(i).context("--name requires a value")?.to_string());
            }
            "--cinema" => {
                i += 1;
                cinema = Some(args.get(i).context("--cinema requires a value")?.to_string());
            }
            "--time" => {
                i += 1;
                time = Some(
                    args.get(i)
                        .context("--time requires a value")?
                        .parse()
                        .context("--time must be milliseconds")?,
                );
            }
            "--email" => {
                i += 1;
                email = Some(args.get(i).context("--email requires a value")?.to_string());
            }
            "--token" => {
                i += 1;
                token = Some(args.get(i).context("--token requires a value")?.to_string());
            }
            "--mobile" => mobile = true,
            other => bail!("unknown submit option: {}", other),
        }
        i += 1;
    }

    let body = serde_json::json!({
        "name": name,
        "cinema": cinema,
        "time": time,
        "email": email,
        "token": token,
        "mobile": mobile,
    });
    let resp: SubmitResponse = post_json(&format!("{}/scores", base_url(port)), body).await?;

    if !resp.success {
        bail!("submission refused");
    }
    if resp.rank == 0 {
        println!("accepted, but too slow for the board");
    } else {
        println!("accepted — rank {}", resp.rank);
    }
    Ok(())
}

fn print_usage() {
    println!("Usage: marquee-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status               Show daemon status");
    println!("  scores               Print the leaderboard");
    println!("  start                Open a session, print token and signature");
    println!("  interact <token>     Record one interaction event");
    println!("  submit --name <n> --cinema <c> --time <ms>");
    println!("         [--email <e>] [--token <t>] [--mobile]");
    println!("                       Submit a score");
    println!();
    println!("Options:");
    println!("  --port <port>   API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | [] => cmd_status(port).await,
        ["scores"] => cmd_scores(port).await,
        ["start"] => cmd_start(port).await,
        ["interact", token] => cmd_interact(port, token).await,
        ["submit", rest @ ..] => cmd_submit(port, rest).await,
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
