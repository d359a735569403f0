use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Deserialize;
use serde_json::json;
use survey_spec::{
    ImageLocator, PreSurveyDetails, QuestionId, ResultId, SurveyTarget, parse_questions,
};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use crate::collaborators::{DeviceIdentity, FixedDeviceId, FsImageReader};
use crate::config::ClientConfig;
use crate::controller::{Collaborators, QuestionnaireController};
use crate::device::FileDeviceIdentity;
use crate::error::DeviceIdError;
use crate::http::{Credentials, HttpApi};

#[derive(Parser, Debug)]
#[command(
    name = "survey-collect",
    about = "Fill in, check and submit field survey questionnaires",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path of the client configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the backend base url
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the render order and validate an answers file
    Check(CheckArgs),
    /// Print the submission payload for an answers file
    Payload(SubmitArgs),
    /// Submit an answers file to the backend
    Submit(SubmitArgs),
    /// Log in and print the access token
    Login(LoginArgs),
    /// Validate a project and download its questions
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
struct QuestionnaireArgs {
    /// Question schema (JSON array)
    #[arg(long, value_name = "FILE")]
    questions: PathBuf,
    /// Answers file: {"answers": {"1": "42"}, "images": {"4": "/path/photo.jpg"}}
    #[arg(long, value_name = "FILE")]
    answers: PathBuf,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    questionnaire: QuestionnaireArgs,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    #[command(flatten)]
    questionnaire: QuestionnaireArgs,
    /// Pre-survey details (JSON object)
    #[arg(long, value_name = "FILE")]
    details: Option<PathBuf>,
    #[arg(long = "project", value_name = "ID")]
    project_id: String,
    #[arg(long = "survey", value_name = "ID")]
    survey_id: String,
    /// Result id issued by the backend; generated from the clock when absent
    #[arg(long, value_name = "ID")]
    result_id: Option<String>,
    /// Use this device id instead of the persisted one
    #[arg(long, value_name = "ID")]
    device_id: Option<String>,
    /// Bearer token for the backend
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
}

#[derive(Args, Debug)]
struct FetchArgs {
    #[arg(long = "project", value_name = "ID")]
    project_id: String,
    #[arg(long = "survey", value_name = "ID")]
    survey_id: String,
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,
}

/// Answers recorded outside the app, keyed by question id.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnswersFile {
    answers: BTreeMap<QuestionId, String>,
    images: BTreeMap<QuestionId, String>,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path),
        None => ClientConfig::load_default(),
    }
    .context("failed to load configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    match cli.command {
        Commands::Check(args) => check(&config, &args),
        Commands::Payload(args) => runtime.block_on(payload(&config, &args)),
        Commands::Submit(args) => runtime.block_on(submit(&config, &args)),
        Commands::Login(args) => runtime.block_on(login(&config, &args)),
        Commands::Fetch(args) => runtime.block_on(fetch(&config, &args)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_controller(
    config: &ClientConfig,
    args: &QuestionnaireArgs,
) -> Result<QuestionnaireController> {
    let raw = read_file(&args.questions)?;
    let questions = parse_questions(&raw)
        .with_context(|| format!("invalid question schema {}", args.questions.display()))?;
    let answers: AnswersFile = serde_json::from_str(&read_file(&args.answers)?)
        .with_context(|| format!("invalid answers file {}", args.answers.display()))?;

    let mut controller = QuestionnaireController::new(
        questions,
        config.trigger_question_id,
        config.validation_scope,
    );
    for (question_id, value) in answers.answers {
        controller.set_answer(question_id, value);
    }
    for (question_id, locator) in answers.images {
        controller.attach_image(question_id, ImageLocator::new(locator))?;
    }
    Ok(controller)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn check(config: &ClientConfig, args: &CheckArgs) -> Result<()> {
    let controller = load_controller(config, &args.questionnaire)?;
    let validation = controller.validate();
    let order: Vec<QuestionId> = controller
        .render_order()
        .iter()
        .map(|question| question.id)
        .collect();
    let report = json!({
        "render_order": order,
        "show_conditional_group": controller.accumulator().show_conditional_group(),
        "validation": validation,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !validation.valid {
        bail!("questionnaire incomplete: {}", validation.summary());
    }
    Ok(())
}

fn survey_target(args: &SubmitArgs) -> SurveyTarget {
    SurveyTarget {
        project_id: args.project_id.clone(),
        survey_id: args.survey_id.clone(),
        result_id: ResultId::resolve(args.result_id.as_deref(), OffsetDateTime::now_utc()),
    }
}

fn read_details(path: Option<&Path>) -> Result<PreSurveyDetails> {
    match path {
        Some(path) => serde_json::from_str(&read_file(path)?)
            .with_context(|| format!("invalid pre-survey details {}", path.display())),
        None => Ok(PreSurveyDetails::default()),
    }
}

fn device_identity(config: &ClientConfig, args: &SubmitArgs) -> Result<Box<dyn DeviceIdentity>> {
    if let Some(id) = &args.device_id {
        return Ok(Box::new(FixedDeviceId(id.clone())));
    }
    let path = config.device_id_path().ok_or_else(|| {
        DeviceIdError::Unavailable("no data directory for this platform".to_string())
    })?;
    Ok(Box::new(FileDeviceIdentity::new(path)))
}

async fn payload(config: &ClientConfig, args: &SubmitArgs) -> Result<()> {
    let controller = load_controller(config, &args.questionnaire)?;
    let plan = controller.plan_submit(survey_target(args), read_details(args.details.as_deref())?)?;
    let device = device_identity(config, args)?;
    let payload = plan.prepare(device.as_ref(), &FsImageReader).await?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn api(config: &ClientConfig, token: Option<&str>) -> Result<HttpApi> {
    let api = HttpApi::new(config)?;
    Ok(match token {
        Some(token) => api.with_token(token),
        None => api,
    })
}

async fn submit(config: &ClientConfig, args: &SubmitArgs) -> Result<()> {
    let controller = load_controller(config, &args.questionnaire)?;
    let device = device_identity(config, args)?;
    let transport = api(config, args.token.as_deref())?;
    let receipt = controller
        .submit(
            survey_target(args),
            read_details(args.details.as_deref())?,
            Collaborators {
                device: device.as_ref(),
                images: &FsImageReader,
                transport: &transport,
            },
        )
        .await?;
    println!(
        "submitted {} ({} answers, {} images)",
        receipt.result_id, receipt.answered, receipt.images
    );
    if let Some(message) = receipt.message {
        println!("{message}");
    }
    Ok(())
}

async fn login(config: &ClientConfig, args: &LoginArgs) -> Result<()> {
    let credentials = Credentials::new(args.username.clone(), args.password.clone());
    let token = api(config, None)?.login(&credentials).await?;
    println!("{token}");
    Ok(())
}

async fn fetch(config: &ClientConfig, args: &FetchArgs) -> Result<()> {
    let api = api(config, args.token.as_deref())?;
    let project = api.validate_project(&args.project_id, &args.survey_id).await?;
    if !project.success {
        bail!("project validation failed: {}", project.message);
    }
    let questions = api.fetch_questions(&args.project_id, &args.survey_id).await?;
    println!("{}", serde_json::to_string_pretty(&questions)?);
    Ok(())
}
