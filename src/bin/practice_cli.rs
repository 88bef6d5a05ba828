use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pronunciation_trainer::config::AppConfig;
use pronunciation_trainer::error::AssessmentError;
use pronunciation_trainer::http::{self, DebugHttpConfig};
use pronunciation_trainer::practice::{PracticeMode, LANGUAGES};
use pronunciation_trainer::scoring::{band, ScoreBand};
use pronunciation_trainer::session::{
    PracticeSessionController, SessionSnapshot, SessionState, SpeechCollaborators,
};
use pronunciation_trainer::speech::{
    LoggingSynthesizer, ScriptedAssessor, ScriptedOutcome, StaticPermission,
};
use pronunciation_trainer::telemetry::AttemptEvent;
use pronunciation_trainer::OnboardingStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Exit code for an attempt that ended in Failed
const EXIT_ATTEMPT_FAILED: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "practice_cli",
    about = "Scripted practice session harness for Pronunciation Trainer"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one assessment attempt against a scripted backend and print a JSON report
    Assess {
        /// Reference text for Manual mode (defaults to the language's sentence)
        #[arg(long)]
        text: Option<String>,
        #[arg(long, default_value = "en-US")]
        language: String,
        /// Practice a random drill phrase instead of the reference text
        #[arg(long)]
        drill: bool,
        /// Simulate a denied microphone permission
        #[arg(long)]
        deny_permission: bool,
        /// Score hierarchy JSON returned by the backend
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Fail the backend call with this transport message
        #[arg(long)]
        fail: Option<String>,
        /// Backend succeeds without a pronunciation result
        #[arg(long)]
        no_result: bool,
        #[arg(long, default_value_t = 300)]
        capture_ms: u64,
        #[arg(long, default_value_t = 200)]
        scoring_ms: u64,
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Serve the debug HTTP surface while the attempt runs (debug_http builds)
        #[arg(long)]
        debug_http: bool,
    },
    /// Print random drill phrases
    Drill {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Print the feedback band for a score
    Band {
        #[arg(allow_hyphen_values = true)]
        score: f64,
    },
    /// List supported practice languages
    Languages,
    /// Show or set the onboarding flag
    Onboarding {
        /// Override the flag file from the configuration
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        complete: bool,
    },
}

struct AssessOptions {
    text: Option<String>,
    language: String,
    drill: bool,
    deny_permission: bool,
    fixture: Option<PathBuf>,
    fail: Option<String>,
    no_result: bool,
    capture_delay: Duration,
    scoring_delay: Duration,
    timeout: Duration,
    output: Option<PathBuf>,
    debug_http: bool,
}

fn main() -> ExitCode {
    pronunciation_trainer::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Assess {
            text,
            language,
            drill,
            deny_permission,
            fixture,
            fail,
            no_result,
            capture_ms,
            scoring_ms,
            timeout_secs,
            output,
            debug_http,
        } => {
            let options = AssessOptions {
                text,
                language,
                drill,
                deny_permission,
                fixture,
                fail,
                no_result,
                capture_delay: Duration::from_millis(capture_ms),
                scoring_delay: Duration::from_millis(scoring_ms),
                timeout: Duration::from_secs(timeout_secs),
                output,
                debug_http,
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .context("building tokio runtime")?;
            runtime.block_on(run_assess(&config, options))
        }
        Commands::Drill { seed, count } => run_drill(&config, seed, count),
        Commands::Band { score } => run_band(score),
        Commands::Languages => run_languages(),
        Commands::Onboarding { path, complete } => run_onboarding(&config, path, complete),
    }
}

#[derive(Debug, Serialize)]
struct AssessReport {
    reference_text: String,
    language: String,
    mode: PracticeMode,
    outcome: &'static str,
    reason: Option<String>,
    overall_score: Option<f64>,
    overall_band: Option<ScoreBand>,
    duration_ms: Option<u64>,
    words: Vec<WordReport>,
    events: Vec<AttemptEvent>,
}

#[derive(Debug, Serialize)]
struct WordReport {
    word: String,
    score: Option<f64>,
    band: Option<ScoreBand>,
    phonetic: Option<String>,
}

fn scripted_outcome(options: &AssessOptions) -> Result<ScriptedOutcome> {
    if let Some(message) = &options.fail {
        return Ok(ScriptedOutcome::Fail(AssessmentError::transport(message.clone())));
    }
    if options.no_result {
        return Ok(ScriptedOutcome::NoResult);
    }
    if let Some(path) = &options.fixture {
        let scores = ScriptedAssessor::load_fixture(path)
            .with_context(|| format!("loading fixture {}", path.display()))?;
        return Ok(ScriptedOutcome::Fixed(scores));
    }
    Ok(ScriptedOutcome::Synthesize)
}

async fn run_assess(config: &AppConfig, options: AssessOptions) -> Result<ExitCode> {
    let assessor = ScriptedAssessor::new(scripted_outcome(&options)?)
        .with_delays(options.capture_delay, options.scoring_delay);
    let permission = if options.deny_permission {
        StaticPermission::denied()
    } else {
        StaticPermission::granted()
    };
    let collaborators = SpeechCollaborators {
        assessor: Arc::new(assessor),
        permission: Arc::new(permission),
        synthesizer: Arc::new(LoggingSynthesizer::new()),
    };
    let controller = Arc::new(PracticeSessionController::new(config, collaborators)?);
    let debug_server = if options.debug_http {
        http::spawn_if_enabled(Arc::clone(&controller), DebugHttpConfig::from_env())
    } else {
        None
    };

    controller.select_language(&options.language)?;
    if options.drill {
        controller.set_mode(PracticeMode::Drill)?;
    } else if let Some(text) = &options.text {
        controller.set_reference_text(text.clone())?;
    }

    let mut updates = controller.subscribe();
    let practice = controller.practice_state()?;
    controller
        .start_assessment()
        .context("starting assessment")?;

    let outcome = tokio::time::timeout(
        options.timeout,
        wait_for_outcome(&controller, &mut updates),
    )
    .await
    .context("timed out waiting for the assessment")??;

    let mut report = AssessReport {
        reference_text: practice.active_text.clone(),
        language: controller.language()?,
        mode: practice.mode,
        outcome: outcome.name(),
        reason: outcome.failure().map(|reason| reason.reason()),
        overall_score: None,
        overall_band: None,
        duration_ms: None,
        words: Vec::new(),
        events: controller.telemetry().recent,
    };

    if let Some(scores) = outcome.scores() {
        report.overall_score = Some(scores.overall_score);
        report.overall_band = Some(band(scores.overall_score));
        report.duration_ms = controller.last_session()?.map(|s| s.duration_ms);
        let word_count = controller
            .navigator_view()?
            .map(|view| view.word_count)
            .unwrap_or(0);
        for index in 0..word_count {
            let view = controller.select_word(index)?;
            report.words.push(WordReport {
                word: view.current_word,
                score: view.word_score,
                band: view.word_band,
                phonetic: view.phonetic_text,
            });
        }
        controller.close_detail()?;
    }

    if let Some(server) = debug_server {
        server.abort();
    }

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = options.output {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    if outcome.scores().is_some() {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(EXIT_ATTEMPT_FAILED))
    }
}

async fn wait_for_outcome(
    controller: &PracticeSessionController,
    updates: &mut broadcast::Receiver<SessionSnapshot>,
) -> Result<SessionState> {
    loop {
        let state = controller.session_state()?;
        if state.is_terminal() {
            return Ok(state);
        }
        match updates.recv().await {
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => bail!("session closed before the attempt finished"),
        }
    }
}

fn run_drill(config: &AppConfig, seed: Option<u64>, count: usize) -> Result<ExitCode> {
    let pool = config.drill_pool()?;
    let mut rng = match seed.or(config.drill.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    for _ in 0..count {
        println!("{}", pool.pick(&mut rng));
    }
    Ok(ExitCode::from(0))
}

fn run_band(score: f64) -> Result<ExitCode> {
    let tier = band(score);
    let json = serde_json::json!({
        "score": score,
        "band": tier,
        "feedback": tier.feedback_label(),
        "color": tier.color_name(),
    });
    println!("{}", serde_json::to_string(&json)?);
    Ok(ExitCode::from(0))
}

fn run_languages() -> Result<ExitCode> {
    for language in LANGUAGES {
        println!("{}\t{}", language.tag, language.display_name());
    }
    Ok(ExitCode::from(0))
}

fn run_onboarding(config: &AppConfig, path: Option<PathBuf>, complete: bool) -> Result<ExitCode> {
    let path = path.unwrap_or_else(|| config.onboarding.flag_path.clone());
    let mut store = OnboardingStore::load(&path)
        .with_context(|| format!("reading onboarding flag {}", path.display()))?;
    if complete {
        store
            .mark_complete()
            .with_context(|| format!("writing onboarding flag {}", path.display()))?;
    }
    let json = serde_json::json!({ "onboarding_complete": store.is_complete() });
    println!("{}", serde_json::to_string(&json)?);
    Ok(ExitCode::from(0))
}
