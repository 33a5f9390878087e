use std::io::{self, Write};
use std::sync::Arc;

use dustguard_core::alert::voice::{self, VoiceIntentListener};
use dustguard_core::config::GuardCfg;
use dustguard_core::runtime::Engine;
use dustguard_core::types::{
    AirQualityFeed, AlertMode, Classifier, EngineEvent, VerdictOrigin, WeatherFeed,
};
use dustguard_core::view::DashboardView;
use dustguard_feeds::http;
use rustyline::error::ReadlineError;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    }

    let cfg = Arc::new(GuardCfg::from_env());

    // One OpenWeather account serves both live feeds.
    let live = http::weather_from_env(cfg.feed_timeout()).map(Arc::new);
    let weather = live.clone().map(|c| c as Arc<dyn WeatherFeed>);
    let air = live.map(|c| c as Arc<dyn AirQualityFeed>);
    let classifier =
        http::classifier_from_env(cfg.predict_timeout()).map(|c| Arc::new(c) as Arc<dyn Classifier>);

    if weather.is_none() {
        println!("live feeds not configured (DUSTGUARD_WEATHER_API_KEY); readings will be synthetic");
    }
    if classifier.is_none() {
        println!("classifier not configured (DUSTGUARD_PREDICT_URL); verdicts will be offline fallbacks");
    }

    let (mut engine, event_tx, view_rx) = Engine::new(cfg.clone(), weather, air, classifier);
    let token = engine.token();

    // No platform speech backend is wired into this build; voice intents
    // stay disabled unless a SpeechSource is provided. The `say` console
    // command covers the same path by hand.
    let _voice = VoiceIntentListener::spawn(
        None,
        event_tx.clone(),
        cfg.voice_restart_delay(),
        token.clone(),
    );

    let engine_fut = engine.run();
    let console_fut = run_console(event_tx, view_rx, token.clone());
    tokio::pin!(engine_fut);
    tokio::pin!(console_fut);

    tokio::select! {
        _ = &mut engine_fut => {
            token.cancel();
            (&mut console_fut).await
        }
        result = &mut console_fut => {
            token.cancel();
            (&mut engine_fut).await;
            result
        }
    }
}

async fn run_console(
    event_tx: mpsc::Sender<EngineEvent>,
    mut view_rx: watch::Receiver<DashboardView>,
    token: CancellationToken,
) -> anyhow::Result<()> {
    println!("dustguard console — enter for a live submission, `help` for commands");

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<InputEvent>();
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<()>();
    spawn_input_thread(line_tx, ready_rx);
    request_next_prompt(&ready_tx);

    // Counter ticks republish every second; only render when something
    // the operator cares about changed.
    let mut shown_mode = view_rx.borrow().mode;
    let mut shown_submissions = view_rx.borrow().submissions;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                match line {
                    InputEvent::Line(line) => {
                        if !handle_command(line.trim(), &event_tx, &view_rx).await {
                            break;
                        }
                        request_next_prompt(&ready_tx);
                    }
                    InputEvent::Interrupted => {
                        token.cancel();
                        break;
                    }
                    InputEvent::Eof => break,
                    InputEvent::Error(err) => {
                        eprintln!("input error: {err}");
                        break;
                    }
                }
            }
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = view_rx.borrow_and_update().clone();
                if view.mode != shown_mode || view.submissions != shown_submissions {
                    shown_mode = view.mode;
                    shown_submissions = view.submissions;
                    render_summary(&view);
                }
            }
        }
    }
    drop(ready_tx);
    println!();
    Ok(())
}

/// Dispatch one console command. Returns false when the console should
/// exit.
async fn handle_command(
    text: &str,
    event_tx: &mpsc::Sender<EngineEvent>,
    view_rx: &watch::Receiver<DashboardView>,
) -> bool {
    let event = match text {
        "/q" | "/quit" | "/exit" => return false,
        "" | "live" => Some(EngineEvent::SubmitLive),
        "synthetic" => Some(EngineEvent::SubmitSynthetic),
        "demo" => Some(EngineEvent::DemoTrigger),
        "reset" => Some(EngineEvent::Reset),
        "status" => {
            render_status(&view_rx.borrow());
            None
        }
        "json" => {
            match serde_json::to_string_pretty(&*view_rx.borrow()) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("serialize error: {e}"),
            }
            None
        }
        "help" => {
            print_help();
            None
        }
        say if say.starts_with("say ") => {
            let utterance = &say[4..];
            match voice::classify_utterance(utterance) {
                Some(intent) => Some(EngineEvent::Voice(intent)),
                None => {
                    println!("no intent recognized in \"{utterance}\"");
                    None
                }
            }
        }
        other => {
            println!("unknown command `{other}` — try `help`");
            None
        }
    };

    if let Some(event) = event {
        if event_tx.send(event).await.is_err() {
            return false;
        }
    }
    true
}

fn print_help() {
    println!("commands:");
    println!("  <enter> | live   acquire a live reading and submit it");
    println!("  synthetic        submit a synthetic reading");
    println!("  demo             inject the demo emergency scenario");
    println!("  reset            stand down from critical");
    println!("  say <utterance>  feed a spoken phrase to the intent classifier");
    println!("  status           show the full dashboard snapshot");
    println!("  json             dump the snapshot as JSON");
    println!("  /q               quit");
}

fn render_summary(view: &DashboardView) {
    let banner = match view.mode {
        AlertMode::Critical => "!! CRITICAL",
        AlertMode::Monitoring => "monitoring",
        AlertMode::Idle => "idle",
    };
    println!("\r[{banner}] submissions={}", view.submissions);
    if let Some(v) = &view.last_verdict {
        let origin = match v.origin {
            VerdictOrigin::Classifier => "",
            VerdictOrigin::Offline => " (offline fallback)",
            VerdictOrigin::Simulated => " (simulated)",
        };
        println!(
            "  cleaning needed: {}{origin} — {}",
            if v.cleaning_needed { "YES" } else { "no" },
            v.status
        );
        println!("  advice: {}", v.suggestion);
    }
    let _ = io::stdout().flush();
}

fn render_status(view: &DashboardView) {
    println!("mode: {}", view.mode);
    if let Some(r) = &view.last_reading {
        println!(
            "last reading: street {} pm2.5={:.1} pm10={:.1} humidity={:.0}% temp={:.1}C traffic={} dust={:.0}",
            r.street_id, r.pm2_5, r.pm10, r.humidity, r.temperature, r.traffic_density, r.dust_index
        );
    }
    if let Some(v) = &view.last_verdict {
        println!(
            "last verdict ({:?} at {}): cleaning needed = {}",
            v.origin,
            v.decided_at.format("%H:%M:%S"),
            v.cleaning_needed
        );
    }
    println!("trend: {:?}", view.trend);
    println!(
        "map: ({:.4}, {:.4}) critical={}",
        view.map.latitude, view.map.longitude, view.map.critical
    );
    println!(
        "hardware: network={:?} suppressors={:?} patrols={:?}",
        view.hardware.network, view.hardware.suppressors, view.hardware.patrols
    );
    println!("water saved: {} L", view.litres_saved);
}

fn request_next_prompt(ready_tx: &std::sync::mpsc::Sender<()>) {
    let _ = ready_tx.send(());
}

fn spawn_input_thread(
    line_tx: mpsc::UnboundedSender<InputEvent>,
    ready_rx: std::sync::mpsc::Receiver<()>,
) {
    std::thread::spawn(move || {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                let _ = line_tx.send(InputEvent::Error(e.to_string()));
                return;
            }
        };

        while ready_rx.recv().is_ok() {
            match editor.readline("dustguard> ") {
                Ok(line) => {
                    if line_tx.send(InputEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    let _ = line_tx.send(InputEvent::Interrupted);
                    break;
                }
                Err(ReadlineError::Eof) => {
                    let _ = line_tx.send(InputEvent::Eof);
                    break;
                }
                Err(e) => {
                    let _ = line_tx.send(InputEvent::Error(e.to_string()));
                    break;
                }
            }
        }
    });
}

enum InputEvent {
    Line(String),
    Interrupted,
    Eof,
    Error(String),
}
