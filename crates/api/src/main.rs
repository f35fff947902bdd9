mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod explain;
    pub mod export;
    pub mod health;
    pub mod jobs;
    pub mod solve;
    pub mod validate;
}

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use sched_core::{CancelToken, Solver};
use std::path::PathBuf;
use std::time::Duration;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::solve::solve,
            routes::jobs::status,
            routes::jobs::result,
            routes::jobs::cancel,
            routes::validate::validate_handler,
            routes::explain::explain,
            routes::export::export,
        ),
        components(schemas(
            types::Instance, types::Instructor, types::Room, types::Course, types::TimeSlot,
            types::Registration, types::GaConfig, types::ViolationWeights, types::ViolationKind,
            types::SolveParams, types::SolveEnvelope, types::SolverKind,
            types::SolveResult, types::SolveStatus, types::StopReason,
            types::Assignment, types::AssignmentRow, types::Violation,
            types::DayOfWeek, types::RoomType, types::CourseCategory, types::TimeslotId,
            types::InstructorId, types::StudentId, types::RoomId, types::CourseId,
            jobs::JobId, jobs::JobStatus,
            routes::validate::ValidationReport,
            routes::solve::JobCreated,
            routes::explain::ExplainIn,
            routes::explain::ExplainOut,
            routes::export::ExportIn
        )),
        tags(
            (name = "unischedule", description = "NEP-2020 timetable construction API")
        )
    )]
struct ApiDoc;

#[derive(Parser)]
#[command(name = "unischedule", version, about = "University timetable construction engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Solve one envelope from a JSON file and print the result.
    Solve {
        /// SolveEnvelope JSON (instance + params).
        #[arg(short, long)]
        input: PathBuf,
        /// Also write the timetable as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(clap::Parser)]
struct ServeArgs {
    #[arg(long, env = "UNISCHEDULE__SERVER__PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, env = "UNISCHEDULE__SERVER__BODY_LIMIT", default_value_t = 2 * 1024 * 1024)]
    body_limit: usize,
    #[arg(long, env = "UNISCHEDULE__SERVER__TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Solve { input, csv }) => solve_file(input, csv).await,
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(ServeArgs::parse_from(["serve"])).await,
    }
}

async fn solve_file(input: PathBuf, csv: Option<PathBuf>) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let env: types::SolveEnvelope = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", input.display()))?;
    sched_core::validate(&env.instance).with_context(|| format!("checking {}", input.display()))?;

    let instance = env.instance.clone();
    let res = state::DispatchSolver::new()
        .solve(env, CancelToken::new())
        .await?;

    if let Some(path) = csv {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        let rows = sched_core::export::to_rows(&instance, &res.assignments);
        sched_core::export::write_csv(std::io::BufWriter::new(file), &rows)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "timetable written");
    }
    println!("{}", serde_json::to_string_pretty(&res)?);
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let app_state = state::AppState::new_default();

    let app = Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/solve", post(routes::solve::solve))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/explain", post(routes::explain::explain))
        .route("/v1/export", post(routes::export::export))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/jobs/:id/cancel", post(routes::jobs::cancel))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack(args.body_limit, Duration::from_secs(args.timeout_secs)))
        .with_state(app_state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
