//! Yoga Session Example
//!
//! Drives a short yoga routine with a simulated performer instead of a
//! webcam. The performer needs a moment to find each new pose, wobbles
//! once, then holds it.
//!
//! Run with `RUST_LOG=debug` to see every phase change.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use poseflow_core::{CompletionPolicy, ConfidenceSample, EngineEvent, PoseCatalog, PoseId};
use poseflow_runtime::logging::{self, LogFormat};
use poseflow_runtime::{FnSink, FrameLoop, PracticeSession, SessionSettings, TokioClock, TracingSink};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(LogFormat::Plain);

    println!("=== PoseFlow Yoga Session ===\n");

    let catalog = PoseCatalog::yoga();
    let settings = SessionSettings {
        poses: vec!["Mountain".into(), "Tree".into(), "Warrior II".into()],
        accuracy_threshold: 0.7,
        hold_seconds: 2.0,
        transition_seconds: 2.0,
        completion: CompletionPolicy::StopAtEnd,
        ..Default::default()
    };
    println!("Settings:\n{}\n", settings.to_json()?);

    let first = catalog.resolve_labels(&settings.poses)?[0];
    let target = Rc::new(Cell::new(first));
    let frame = Rc::new(Cell::new(0u32));
    let log = Rc::new(RefCell::new(Vec::new()));

    // Performer: 40 frames to get into the pose, a wobble at frame 70
    let sampler = {
        let target = target.clone();
        let frame = frame.clone();
        let catalog = catalog.clone();
        move || -> Option<ConfidenceSample> {
            let n = frame.get();
            frame.set(n + 1);
            let expected = target.get();
            let confidence = match n {
                0..=39 => 0.2 + n as f32 * 0.01,
                70 => 0.4,
                _ => 0.9,
            };
            Some(ConfidenceSample::from_pairs(catalog.entries().iter().map(|e| {
                let p = if e.id == expected { confidence } else { (1.0 - confidence) / 7.0 };
                (e.id, p)
            })))
        }
    };

    // Follow the routine and keep a log of milestones
    let sink = (
        TracingSink,
        FnSink({
            let target = target.clone();
            let frame = frame.clone();
            let log = log.clone();
            move |event: &EngineEvent| {
                if let EngineEvent::PoseAdvanced { new_class_id, .. } = event {
                    target.set(*new_class_id);
                    frame.set(0);
                }
                if event.is_milestone() {
                    log.borrow_mut().push(event.clone());
                }
            }
        }),
    );

    let mut session = PracticeSession::new(catalog.clone(), sampler, TokioClock::new(), sink);
    session.start_with_settings(&settings)?;

    let summary = FrameLoop::new(Duration::from_millis(16))
        .run_frames(&mut session, 60 * 60)
        .await;

    println!("Milestones:");
    for event in log.borrow().iter() {
        let detail = match event {
            EngineEvent::HoldStarted { class_id }
            | EngineEvent::HoldReset { class_id }
            | EngineEvent::HoldCompleted { class_id } => label(&catalog, *class_id),
            EngineEvent::PoseAdvanced { new_class_id, cursor } => {
                format!("{} (#{})", label(&catalog, *new_class_id), cursor)
            }
            _ => String::new(),
        };
        println!("   {:<18} {}", event.name(), detail);
    }

    println!(
        "\nFrames: {} ticked, {} skipped, {} events",
        summary.frames, summary.skipped, summary.events
    );
    if let Some(stats) = session.stop() {
        println!(
            "Holds: {} started, {} reset, {} completed; cycles: {}",
            stats.holds_started, stats.holds_reset, stats.holds_completed, stats.cycles_completed
        );
    }

    Ok(())
}

fn label(catalog: &PoseCatalog, id: PoseId) -> String {
    catalog
        .get(id)
        .map(|e| e.label.clone())
        .unwrap_or_else(|| id.to_string())
}
