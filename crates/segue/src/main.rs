use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use segue_core::{
    normalize_sheet, start_slide, CueAction, CueEngine, CueRunner, CueSheet, CueStudio,
    FsSheetSource, ManualClock, NullClock, PlayerSettings, PresetLibrary, SettingsManager,
    SlideStart, StaticApplicator, TargetRef,
};
use segue_stage::{ElementSpec, Stage};

/// Headless driver for the slide cue runtime: validate cue sheets, replay
/// them against a stage description, or bring a whole slide up the way the
/// player does.
#[derive(Parser, Debug)]
#[command(name = "segue")]
#[command(about = "Segue slide cue runtime")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a cue sheet file and print the normalized timeline
    Check {
        /// Cue sheet JSON file
        sheet: PathBuf,
    },
    /// Replay a cue sheet against a stage description with a scripted clock
    Preview {
        /// Cue sheet JSON file
        sheet: PathBuf,
        /// Stage description JSON file (element tree)
        stage: PathBuf,
        /// Clock samples in seconds, in order; a drop means a seek
        #[arg(long, value_delimiter = ',', default_value = "0,1,2,3,4,5")]
        clock: Vec<f64>,
    },
    /// Start a slide the way the player does: cue sheet candidates first,
    /// entrance fallback otherwise
    Slide {
        /// Stage description JSON file (element tree)
        stage: PathBuf,
        /// Directory holding cue sheet JSON files (overrides settings)
        #[arg(long)]
        cues_dir: Option<PathBuf>,
        /// Player settings file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// How long to let the engine run, in seconds
        #[arg(long, default_value = "3.0")]
        run_secs: f64,
    },
    /// Rewrite a cue sheet through the authoring model: normalized
    /// spellings, sorted cues, canonical field order
    Fmt {
        /// Cue sheet JSON file
        sheet: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Check { sheet } => check_sheet(&sheet),
        Command::Preview {
            sheet,
            stage,
            clock,
        } => preview(&sheet, &stage, &clock),
        Command::Slide {
            stage,
            cues_dir,
            settings,
            run_secs,
        } => run_slide(&stage, cues_dir, settings, run_secs).await,
        Command::Fmt { sheet } => fmt_sheet(&sheet),
    }
}

fn load_sheet(path: &Path) -> Result<CueSheet, anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading cue sheet {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing cue sheet {}", path.display()))?;
    normalize_sheet(&raw)
        .with_context(|| format!("cue sheet {} is not sheet-shaped", path.display()))
}

fn load_stage(path: &Path) -> Result<(Stage, segue_stage::ElementId), anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading stage description {}", path.display()))?;
    let spec: ElementSpec = serde_json::from_str(&text)
        .with_context(|| format!("parsing stage description {}", path.display()))?;
    Ok(Stage::from_spec(&spec))
}

fn check_sheet(path: &Path) -> Result<(), anyhow::Error> {
    let sheet = load_sheet(path)?;

    println!("Cue sheet: {}", path.display());
    println!("Follow voiceover: {}", sheet.follow_voiceover);
    println!("Poll interval: {}ms", sheet.poll_ms);
    println!("Valid cues: {}", sheet.cues.len());
    for cue in &sheet.cues {
        println!(
            "  {:>7.2}s  {:<11}  {}",
            cue.at,
            action_label(&cue.action),
            target_label(&cue.target)
        );
    }
    Ok(())
}

fn preview(sheet_path: &Path, stage_path: &Path, clock_samples: &[f64]) -> Result<(), anyhow::Error> {
    let sheet = load_sheet(sheet_path)?;
    let (mut stage, root) = load_stage(stage_path)?;

    let engine = CueEngine::start(
        &mut stage,
        root,
        sheet,
        PresetLibrary::builtin(),
        Box::new(StaticApplicator::new()),
    );
    let mut engine = match engine {
        Ok(engine) => engine,
        Err(_) => anyhow::bail!("engine declined to start (no cues matched the stage)"),
    };

    let clock = ManualClock::new();
    let mut last_sample = 0.0_f64;
    for &sample in clock_samples {
        let before = engine.next_cue_index();
        clock.set(sample);
        engine.tick(&mut stage, &clock);
        let after = engine.next_cue_index();
        let note = if sample + segue_core::CLOCK_EPSILON_SECS < last_sample {
            format!("rewound, replayed {}", after)
        } else {
            format!("applied {}", after.saturating_sub(before))
        };
        last_sample = sample;
        println!("t={:<8.3} {:<20} next cue index {}", sample, note, after);
    }

    print_node_states(&stage, &engine.tracked_nodes());
    Ok(())
}

async fn run_slide(
    stage_path: &Path,
    cues_dir: Option<PathBuf>,
    settings_path: Option<PathBuf>,
    run_secs: f64,
) -> Result<(), anyhow::Error> {
    let settings = match settings_path {
        Some(path) => SettingsManager::new(Some(path))
            .load()
            .context("loading player settings")?,
        None => PlayerSettings::default(),
    };
    let cues_dir = cues_dir.unwrap_or(settings.cue_sheet_dir);

    let (stage, root) = load_stage(stage_path)?;
    let stage = Arc::new(Mutex::new(stage));
    let source = FsSheetSource::new(cues_dir);
    let presets = PresetLibrary::builtin();

    let outcome = {
        let mut stage = stage.lock();
        start_slide(
            &mut stage,
            root,
            &source,
            &presets,
            Box::new(StaticApplicator::new()),
        )
        .await
    };

    match outcome {
        SlideStart::Intro => {
            println!("No usable cue sheet; entrance fallback ran.");
        }
        SlideStart::Engine(engine) => {
            let nodes = engine.tracked_nodes();
            println!(
                "Cue engine armed ({} cues); running for {:.1}s...",
                engine.sheet().cues.len(),
                run_secs
            );

            // no transport here, so the engine runs off its local clock
            let runner = CueRunner::spawn(engine, Arc::clone(&stage), Arc::new(NullClock));
            tokio::time::sleep(Duration::from_secs_f64(run_secs.max(0.0))).await;
            runner.dispose().await;

            print_node_states(&stage.lock(), &nodes);
        }
    }
    Ok(())
}

fn fmt_sheet(path: &Path) -> Result<(), anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading cue sheet {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing cue sheet {}", path.display()))?;

    let slide_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut studio = CueStudio::new(slide_id);
    let kept = studio.load_document(&raw, &path.display().to_string());
    log::debug!("kept {} cue(s) from {}", kept, path.display());

    println!("{}", studio.to_json_string());
    Ok(())
}

fn print_node_states(stage: &Stage, nodes: &[segue_stage::ElementId]) {
    println!("Final node states:");
    for &id in nodes {
        let element = stage.element(id);
        let label = element
            .attr("data-anim-key")
            .or_else(|| element.id.clone())
            .unwrap_or_else(|| element.tag.clone());
        println!(
            "  {:<16} classes=[{}] style=\"{}\"",
            label,
            element.classes.join(" "),
            element.style_text().unwrap_or_default()
        );
    }
}

fn action_label(action: &CueAction) -> &'static str {
    match action {
        CueAction::In { .. } => "in",
        CueAction::Out { .. } => "out",
        CueAction::Set { .. } => "set",
        CueAction::ClassAdd { .. } => "classAdd",
        CueAction::ClassRemove { .. } => "classRemove",
    }
}

fn target_label(target: &TargetRef) -> String {
    match target {
        TargetRef::Key(key) => key.clone(),
        TargetRef::Selector(selector) => format!("selector {}", selector),
    }
}
