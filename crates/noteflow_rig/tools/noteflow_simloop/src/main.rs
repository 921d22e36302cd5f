use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use noteflow_core::coordinator::FeederState;
use noteflow_rig::sim::SimHarness;
use noteflow_rig::ShotTiming;

use noteflow_simloop::config::Config;

/// Upper bound on script-driven ticks per phase; a scripted scenario that
/// exceeds this means the rig wedged, which the run should surface loudly.
const PHASE_TICK_LIMIT: u32 = 500;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_args();

    let timing = ShotTiming::new(
        Duration::from_secs(2),
        Duration::from_millis(250),
        Duration::from_millis(config.tick_ms),
    )
    .context("build shot timing")?;

    let mut harness = SimHarness::new(timing);

    let mut events = harness.rig.coordinator().subscribe_state_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(from = event.from.label(), to = event.to.label(), "state change");
        }
    });

    info!(
        tick_ms = config.tick_ms,
        notes = config.notes,
        continuous_burst = config.continuous_burst,
        "simloop started"
    );

    let mut interval = tokio::time::interval(timing.tick_period());

    for note in 0..config.notes {
        info!(note, "intaking");
        harness
            .rig
            .schedule(harness.rig.coordinator().intake_action());

        // A few empty cycles before the note reaches the beam break.
        for _ in 0..5 {
            interval.tick().await;
            harness.rig.tick();
        }

        harness.set_note_present(true);
        interval.tick().await;
        harness.rig.tick();

        info!(
            note,
            state = harness.rig.coordinator().state().label(),
            "note staged, shooting"
        );
        harness
            .rig
            .schedule(harness.rig.coordinator().shoot_action());
        harness.set_shooter_ready(true);

        let mut cleared = false;
        let mut ticks = 0u32;
        while harness.rig.active_actions() > 0 && ticks < PHASE_TICK_LIMIT {
            harness.settle_pivot();
            if !cleared && harness.feeder_state() == FeederState::Shooting {
                // The note leaves the feeder shortly after the feed starts.
                harness.set_note_present(false);
                cleared = true;
            }
            interval.tick().await;
            harness.rig.tick();
            ticks += 1;
        }
        harness.set_shooter_ready(false);
        info!(
            note,
            ticks,
            state = harness.rig.coordinator().state().label(),
            "shot finished"
        );

        // The loss edge landed mid-shot, where it is ignored; pulse the beam
        // so Aiming sees a fresh falling edge and drops back to Intake.
        harness.set_note_present(true);
        interval.tick().await;
        harness.rig.tick();
        harness.set_note_present(false);
        interval.tick().await;
        harness.rig.tick();
    }

    if config.continuous_burst {
        info!("continuous fire burst");
        harness
            .rig
            .schedule(harness.rig.coordinator().continuous_fire_action());

        for pulse in 0..6u32 {
            harness.set_note_present(pulse % 2 == 0);
            interval.tick().await;
            harness.rig.tick();
        }

        harness.set_note_present(false);
        harness.rig.cancel_all();
        interval.tick().await;
        harness.rig.tick();
    }

    info!(
        state = harness.rig.coordinator().state().label(),
        "simloop done"
    );
    Ok(())
}
