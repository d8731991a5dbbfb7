use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;

use uvolution::api::{WorkerResult, spawn_analysis};
use uvolution::config::{current_dir_config_path, read_config, write_config};
use uvolution::progress::LoadingMessages;
use uvolution::{AnalysisOutcome, AnalysisTarget, ClientError, DashboardClient, ReportsView};

#[derive(Parser)]
#[command(name = "uvolution", about = "Uvolution AI dashboard client")]
struct Cli {
  /// Dashboard server URL. Overrides `api_url` from config.json.
  #[arg(long, env = "UVOLUTION_API_URL")]
  api_url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Analyze an image file or a live page.
  Analyze {
    #[arg(required_unless_present = "url")]
    path: Option<PathBuf>,
    #[arg(long, conflicts_with = "path")]
    url: Option<String>,
  },
  /// List your reports, newest first.
  Reports,
  /// Delete one of your reports.
  Delete { id: i64 },
  /// Print the marketing principles knowledge base.
  Principles,
  /// Store a session token in config.json.
  Login { token: String },
}

fn main() -> ExitCode {
  dotenvy::dotenv().ok();
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .init();

  let cli = Cli::parse();
  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("{err}");
      if err.is_unauthorized() {
        eprintln!("Run `uvolution login <token>` with a valid session token.");
      }
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<(), ClientError> {
  let config_path = current_dir_config_path();
  let mut config = read_config(&config_path);

  if let Command::Login { token } = &cli.command {
    config.session_token = token.trim().to_string();
    write_config(&config_path, &config)?;
    println!("Session token saved to {}", config_path.display());
    return Ok(());
  }

  let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url.clone());
  let client = DashboardClient::new(&api_url, config.session_token())?;

  match cli.command {
    Command::Analyze { path, url } => {
      let target = match (path, url) {
        (_, Some(url)) => AnalysisTarget::Url(url),
        (Some(path), None) => AnalysisTarget::File(path),
        (None, None) => return Err(ClientError::Request("Nothing to analyze".to_string())),
      };
      let outcome = analyze_with_progress(client, target)?;
      print_outcome(&outcome);
    }
    Command::Reports => {
      let mut view = ReportsView::new();
      view.revalidate(&client);
      if let Some(err) = view.last_error() {
        return Err(ClientError::Request(err.to_string()));
      }
      print_reports(&view);
    }
    Command::Delete { id } => {
      let mut view = ReportsView::new();
      view.revalidate(&client);
      view.delete(&client, id)?;
      println!("Deleted report {id}. {} report(s) remaining.", view.reports().len());
    }
    Command::Principles => {
      let principles = client.marketing_principles()?;
      let pretty = serde_json::to_string_pretty(&principles)
        .map_err(|_| ClientError::InvalidResponse)?;
      println!("{pretty}");
    }
    Command::Login { .. } => {}
  }
  Ok(())
}

fn analyze_with_progress(
  client: DashboardClient,
  target: AnalysisTarget,
) -> Result<AnalysisOutcome, ClientError> {
  let (tx, rx) = crossbeam_channel::unbounded();
  let request_id = 1;
  let worker = spawn_analysis(client, target, tx, request_id);

  let messages = LoadingMessages::default();
  let started = Instant::now();
  let mut shown: Option<usize> = None;

  let result = loop {
    match rx.recv_timeout(Duration::from_millis(200)) {
      Ok(WorkerResult::Uploading(_)) => {}
      Ok(WorkerResult::Ok(id, outcome)) if id == request_id => break Ok(outcome),
      Ok(WorkerResult::Err(id, message)) if id == request_id => {
        break Err(ClientError::Request(message));
      }
      Ok(_) => {}
      Err(RecvTimeoutError::Timeout) => {}
      Err(RecvTimeoutError::Disconnected) => {
        break Err(ClientError::Request("Analysis worker stopped unexpectedly".to_string()));
      }
    }
    let elapsed = started.elapsed();
    let index = messages.index_at(elapsed);
    if shown != Some(index) {
      eprintln!("{}", messages.message_at(elapsed));
      shown = Some(index);
    }
  };

  let _ = worker.join();
  result
}

fn print_outcome(outcome: &AnalysisOutcome) {
  println!("Analysis #{} complete.", outcome.id);
  println!("  original:    {}", outcome.original_image);
  println!("  saliency:    {}", outcome.saliency_map);
  println!("  report:      {}", outcome.report);
  if let Some(basic) = outcome.metrics.as_ref().and_then(|m| m.basic.as_ref()) {
    println!(
      "  clutter {:.2}  focus {:.2}  hotspots {}",
      basic.clutter_score, basic.focus_ratio, basic.hotspot_count
    );
  }
  if outcome.subscription_limited {
    println!(
      "  IA structure, redesign and marketing consultation are available \
       on the Basic and Pro plans."
    );
  }
}

fn print_reports(view: &ReportsView) {
  if view.reports().is_empty() {
    println!("No reports yet.");
    return;
  }
  for report in view.reports() {
    let clutter = report
      .metrics
      .as_ref()
      .and_then(|m| m.basic.as_ref())
      .map(|basic| format!("{:.2}", basic.clutter_score))
      .unwrap_or_else(|| "-".to_string());
    let tier = if report.has_premium_sections() { "full" } else { "limited" };
    println!(
      "#{:<6} {}  clutter {:<5} {:<8} {}",
      report.id, report.created_at, clutter, tier, report.report
    );
  }
}
