use anyhow::Context;
use clap::{Arg, Command};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use triage_backend::{HttpBackend, InvestigationBackend, InvestigationReport, ScriptedBackend};
use triage_engine::{AnalysisEngine, AnalysisRequest, EngineConfig};
use triage_plan::recommendation::parse_recommendations;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Command::new("triage")
        .version("0.1.0")
        .about("Remediation analysis engine")
        .subcommand_required(true)
        .subcommand(
            Command::new("validate")
                .about("Validate a recommendation list and print its execution waves")
                .arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .help("JSON file holding the recommendation list"),
                ),
        )
        .subcommand(
            Command::new("analyze")
                .about("Run one analysis to a terminal phase")
                .arg(
                    Arg::new("request")
                        .long("request")
                        .required(true)
                        .help("JSON file holding the analysis request"),
                )
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .help("Base URL of the investigation service"),
                )
                .arg(
                    Arg::new("replay")
                        .long("replay")
                        .help("JSON file with a canned investigation report, used instead of the service"),
                )
                .arg(
                    Arg::new("api-key")
                        .long("api-key")
                        .help("Bearer token for the investigation service"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("Engine configuration file (TOML)"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("validate", args)) => {
            let path = args.get_one::<String>("path").unwrap();
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {path}"))?;

            match parse_recommendations(&raw).and_then(triage_plan::validate) {
                Ok(plan) => {
                    println!("valid plan: {} actions", plan.len());
                    for (i, wave) in plan.execution_waves().iter().enumerate() {
                        let ids: Vec<&str> = wave.iter().map(|id| id.as_str()).collect();
                        println!("wave {i}: {}", ids.join(" "));
                    }
                }
                Err(err) => {
                    eprintln!("invalid plan: {err}");
                    std::process::exit(1);
                }
            }
        }
        Some(("analyze", args)) => {
            let request_path = args.get_one::<String>("request").unwrap();
            let raw = std::fs::read_to_string(request_path)
                .with_context(|| format!("cannot read {request_path}"))?;
            let request: AnalysisRequest =
                serde_json::from_str(&raw).context("invalid analysis request")?;

            let config = match args.get_one::<String>("config") {
                Some(path) => EngineConfig::from_path(path)?,
                None => EngineConfig::default(),
            };

            let backend: Arc<dyn InvestigationBackend> = match (
                args.get_one::<String>("replay"),
                args.get_one::<String>("endpoint"),
            ) {
                (Some(replay_path), _) => {
                    let raw = std::fs::read_to_string(replay_path)
                        .with_context(|| format!("cannot read {replay_path}"))?;
                    let report: InvestigationReport =
                        serde_json::from_str(&raw).context("invalid investigation report")?;
                    let scripted = ScriptedBackend::new();
                    scripted.push_report(report);
                    Arc::new(scripted)
                }
                (None, Some(endpoint)) => {
                    let mut backend = HttpBackend::new(endpoint)?;
                    if let Some(key) = args.get_one::<String>("api-key") {
                        backend = backend.with_api_key(key);
                    }
                    Arc::new(backend)
                }
                (None, None) => {
                    anyhow::bail!("one of --endpoint or --replay is required");
                }
            };

            let engine = AnalysisEngine::new(config, backend);
            match engine.run(request).await {
                Ok(status) => {
                    println!("{}", serde_json::to_string_pretty(&status)?);
                }
                Err(err) => {
                    eprintln!("analysis failed: {err}");
                    std::process::exit(1);
                }
            }
        }
        _ => unreachable!("subcommand required"),
    }

    Ok(())
}
