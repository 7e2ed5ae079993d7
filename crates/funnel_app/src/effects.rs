use std::time::Duration;

use funnel_core::{Effect, Msg, Route, SubmissionOutcome};
use funnel_engine::{CommitOutcome, EngineEvent, EngineHandle};
use funnel_logging::{funnel_debug, funnel_error, funnel_info, funnel_warn};

/// Executes core effects against the engine and turns engine events back
/// into core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    route: Route,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            route: Route::Entry,
        }
    }

    /// Route the last `Navigate` effect pointed at.
    pub fn route(&self) -> Route {
        self.route
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::NormalizeBatch {
                    batch_id,
                    source,
                    inputs,
                } => {
                    funnel_info!(
                        "NormalizeBatch batch_id={} source={} inputs={}",
                        batch_id,
                        source,
                        inputs.len()
                    );
                    self.engine.normalize(batch_id, inputs);
                }
                Effect::CommitSubmission { snapshot } => {
                    if snapshot.form.budget_inverted() {
                        funnel_warn!(
                            "Submitting with budget lower bound {} above upper bound {}",
                            snapshot.form.budget_lower,
                            snapshot.form.budget_upper
                        );
                    }
                    funnel_info!("CommitSubmission images={}", snapshot.images.len());
                    self.engine.commit(snapshot);
                }
                Effect::Navigate(route) => {
                    funnel_debug!("Navigate {:?} -> {:?}", self.route, route);
                    self.route = route;
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::BatchNormalized { batch_id, outcome } => Msg::BatchNormalized {
            batch_id,
            skipped: outcome.failures.len(),
            images: outcome.images,
        },
        EngineEvent::Committed(result) => {
            let outcome = match result {
                Ok(CommitOutcome::Accepted(record)) => SubmissionOutcome::Accepted { id: record.id },
                Ok(CommitOutcome::DuplicateSkipped { .. }) => SubmissionOutcome::DuplicateSkipped,
                Err(err) => {
                    funnel_error!("Failed to store submission: {}", err);
                    SubmissionOutcome::Failed
                }
            };
            Msg::SubmissionFinished { outcome }
        }
    }
}
