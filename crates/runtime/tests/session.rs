use std::time::Duration;

use pilot_core::{Arena, CraftState, MovementSource, PlannerConfig, Vec2, WorldSnapshot};
use pilot_runtime::{
    DecisionEvent, DiscardReason, Event, PilotRuntime, PlannerEvent, RuntimeConfig, Topic,
};
use tokio::time::{sleep, timeout};

fn open_space() -> WorldSnapshot {
    WorldSnapshot::new(
        Arena::new(1600.0, 1200.0),
        CraftState::new(Vec2::new(800.0, 600.0), Vec2::ZERO, 0.0, 15.0),
    )
}

fn small_planner() -> RuntimeConfig {
    RuntimeConfig {
        planner: PlannerConfig {
            population: 24,
            ..PlannerConfig::default().with_seed(7)
        },
        time_budget: None,
        ..RuntimeConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn planned_movement_is_eventually_adopted() {
    let mut runtime = PilotRuntime::builder()
        .config(small_planner())
        .build()
        .await
        .expect("runtime should build");
    let mut planner_events = runtime.subscribe(Topic::Planner);

    let adopted = timeout(Duration::from_secs(5), async {
        let mut tick = 0;
        loop {
            let output = runtime.tick(&open_space().at_tick(tick));
            if output.telemetry.movement == MovementSource::Planner {
                return tick;
            }
            tick += 1;
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("a plan should arrive");

    assert!(adopted > 0, "the first tick has no plan yet");
    let metrics = runtime.metrics();
    assert!(metrics.requested >= 1);
    assert_eq!(metrics.adopted, 1);
    assert!(runtime.session().executor().is_active());

    let mut saw_adoption = false;
    while let Ok(event) = planner_events.try_recv() {
        if let Event::Planner(PlannerEvent::Adopted { epoch, .. }) = event {
            assert_eq!(epoch, 0);
            saw_adoption = true;
        }
    }
    assert!(saw_adoption);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reset_discards_plans_from_the_previous_life() {
    let mut runtime = PilotRuntime::builder()
        .config(small_planner())
        .build()
        .await
        .expect("runtime should build");
    let mut planner_events = runtime.subscribe(Topic::Planner);

    runtime.tick(&open_space().at_tick(0));
    assert!(runtime.session().has_request_in_flight());
    let mut decision_events = runtime.subscribe(Topic::Decision);
    runtime.reset();
    assert_eq!(runtime.session().epoch(), 1);
    assert!(!runtime.session().executor().is_active());

    timeout(Duration::from_secs(5), async {
        let mut tick = 1;
        while runtime.metrics().stale_responses == 0 {
            runtime.tick(&open_space().at_tick(tick));
            tick += 1;
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("the old response should come back");

    assert_eq!(runtime.metrics().stale_responses, 1);

    let mut stale = Vec::new();
    while let Ok(event) = planner_events.try_recv() {
        if let Event::Planner(PlannerEvent::Discarded {
            epoch,
            reason: DiscardReason::StaleEpoch,
            ..
        }) = event
        {
            stale.push(epoch);
        }
    }
    assert_eq!(stale, vec![0]);

    assert_eq!(
        decision_events.try_recv().ok(),
        Some(Event::Decision(DecisionEvent::SessionReset { epoch: 1 }))
    );

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn without_a_planner_the_pilot_stays_reactive() {
    let mut runtime = PilotRuntime::builder()
        .enable_planner(false)
        .build()
        .await
        .expect("runtime should build");

    for tick in 0..20 {
        let output = runtime.tick(&open_space().at_tick(tick));
        assert_eq!(output.telemetry.movement, MovementSource::Reactive);
    }
    assert!(!runtime.session().has_request_in_flight());
    assert_eq!(runtime.metrics().requested, 0);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn invalid_configuration_is_rejected_at_build() {
    let config = RuntimeConfig {
        control_repeat: 0,
        ..RuntimeConfig::default()
    };
    assert!(PilotRuntime::builder().config(config).build().await.is_err());
}
