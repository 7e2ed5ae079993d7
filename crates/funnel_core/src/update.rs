use crate::{Effect, FlowState, FunnelStep, Msg, Route};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: FlowState, msg: Msg) -> (FlowState, Vec<Effect>) {
    let effects = match msg {
        Msg::ImagesPicked { source, inputs } => {
            if inputs.is_empty() || state.step() != FunnelStep::Upload {
                return (state, Vec::new());
            }
            let batch_id = state.begin_batch(source, inputs.len());
            vec![Effect::NormalizeBatch {
                batch_id,
                source,
                inputs,
            }]
        }
        Msg::BatchNormalized {
            batch_id,
            images,
            skipped,
        } => {
            state.finish_batch(batch_id, images, skipped);
            Vec::new()
        }
        Msg::RemoveImage(index) => {
            if state.step() == FunnelStep::Upload && index < state.images().len() {
                state.set_images(|images| {
                    images.remove_at(index);
                });
            }
            Vec::new()
        }
        Msg::ContinueClicked => {
            if state.step() == FunnelStep::Upload && !state.images().is_empty() {
                state.set_step(FunnelStep::Details);
                vec![Effect::Navigate(Route::Funnel)]
            } else {
                Vec::new()
            }
        }
        Msg::FieldChanged(field) => {
            if matches!(state.step(), FunnelStep::Upload | FunnelStep::Details) {
                state.set_field(field);
            }
            Vec::new()
        }
        Msg::SubmitClicked => {
            if state.step() == FunnelStep::Details {
                let snapshot = state.snapshot();
                state.record_submission(snapshot.clone());
                state.set_step(FunnelStep::Submitting);
                vec![Effect::CommitSubmission { snapshot }]
            } else {
                Vec::new()
            }
        }
        Msg::SubmissionFinished { outcome } => {
            if state.step() == FunnelStep::Submitting {
                state.record_outcome(outcome);
                state.set_step(FunnelStep::Complete);
                vec![Effect::Navigate(Route::Success)]
            } else {
                Vec::new()
            }
        }
        Msg::CompletionRequested => {
            if state.step() == FunnelStep::Complete && state.submitted().is_some() {
                Vec::new()
            } else {
                vec![Effect::Navigate(Route::Entry)]
            }
        }
        Msg::RestartClicked => {
            state = state.restarted();
            vec![Effect::Navigate(Route::Entry)]
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
