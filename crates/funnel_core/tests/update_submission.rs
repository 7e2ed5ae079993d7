use std::sync::Once;

use funnel_core::{
    update, DueDateKind, Effect, FieldUpdate, FlowState, FunnelForm, FunnelStep, InputSource, Msg,
    NormalizedImage, RawImageInput, Route, SubmissionOutcome,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(funnel_logging::initialize_for_tests);
}

fn img(tag: &str) -> NormalizedImage {
    NormalizedImage::new(format!("data:image/jpeg;base64,{tag}"), 640, 480)
}

fn apply(state: FlowState, msgs: Vec<Msg>) -> (FlowState, Vec<Effect>) {
    let mut effects = Vec::new();
    let mut state = state;
    for msg in msgs {
        let (next, mut emitted) = update(state, msg);
        effects.append(&mut emitted);
        state = next;
    }
    (state, effects)
}

fn details_step() -> FlowState {
    let (state, _) = apply(
        FlowState::new(),
        vec![
            Msg::ImagesPicked {
                source: InputSource::FilePicker,
                inputs: vec![
                    RawImageInput::new("1.jpg", None, vec![0]),
                    RawImageInput::new("2.jpg", None, vec![0]),
                ],
            },
            Msg::BatchNormalized {
                batch_id: 1,
                images: vec![img("img1"), img("img2")],
                skipped: 0,
            },
            Msg::ContinueClicked,
        ],
    );
    assert_eq!(state.step(), FunnelStep::Details);
    state
}

fn fill_dana(state: FlowState) -> FlowState {
    let (state, _) = apply(
        state,
        vec![
            Msg::FieldChanged(FieldUpdate::FirstName("דנה".into())),
            Msg::FieldChanged(FieldUpdate::LastName("לוי".into())),
            Msg::FieldChanged(FieldUpdate::PhoneNumber("0501234567".into())),
            Msg::FieldChanged(FieldUpdate::BudgetLower(5000)),
            Msg::FieldChanged(FieldUpdate::BudgetUpper(10000)),
            Msg::FieldChanged(FieldUpdate::DueDate(DueDateKind::WithinWeek)),
        ],
    );
    state
}

#[test]
fn fields_are_independent() {
    init_logging();
    let state = fill_dana(details_step());
    let (state, _) = update(
        state,
        Msg::FieldChanged(FieldUpdate::PhoneNumber("0529999999".into())),
    );
    let form = state.form();
    assert_eq!(form.first_name, "דנה");
    assert_eq!(form.last_name, "לוי");
    assert_eq!(form.phone_number, "0529999999");
    assert_eq!(form.budget_lower, 5000);
    assert_eq!(form.budget_upper, 10000);
    assert_eq!(form.due_date, DueDateKind::WithinWeek);
    assert_eq!(form.specific_date, None);
}

#[test]
fn submit_emits_commit_with_snapshot() {
    init_logging();
    let state = fill_dana(details_step());
    let expected = state.snapshot();

    let (state, effects) = update(state, Msg::SubmitClicked);

    assert_eq!(state.step(), FunnelStep::Submitting);
    assert_eq!(
        effects,
        vec![Effect::CommitSubmission {
            snapshot: expected.clone()
        }]
    );
    assert_eq!(expected.images.len(), 2);
    assert_eq!(state.submitted(), Some(&expected));
}

#[test]
fn submit_is_one_shot() {
    init_logging();
    let state = fill_dana(details_step());
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.step(), FunnelStep::Submitting);
}

#[test]
fn submit_outside_details_is_ignored() {
    init_logging();
    let (state, effects) = update(FlowState::new(), Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.step(), FunnelStep::Upload);
}

#[test]
fn inverted_budget_is_flagged_but_submittable() {
    init_logging();
    let (state, _) = apply(
        fill_dana(details_step()),
        vec![
            Msg::FieldChanged(FieldUpdate::BudgetLower(20000)),
            Msg::FieldChanged(FieldUpdate::BudgetUpper(100)),
        ],
    );
    assert!(state.view().budget_inverted);

    let (_, effects) = update(state, Msg::SubmitClicked);
    assert!(matches!(
        effects.as_slice(),
        [Effect::CommitSubmission { .. }]
    ));
}

#[test]
fn every_outcome_navigates_to_success() {
    init_logging();
    for outcome in [
        SubmissionOutcome::Accepted {
            id: "1700000000000".into(),
        },
        SubmissionOutcome::DuplicateSkipped,
        SubmissionOutcome::Failed,
    ] {
        let (state, _) = update(fill_dana(details_step()), Msg::SubmitClicked);
        let (state, effects) = update(
            state,
            Msg::SubmissionFinished {
                outcome: outcome.clone(),
            },
        );
        assert_eq!(effects, vec![Effect::Navigate(Route::Success)]);
        assert_eq!(state.step(), FunnelStep::Complete);
        assert_eq!(state.outcome(), Some(&outcome));

        let summary = state.view().summary.expect("summary");
        assert_eq!(summary.full_name, "דנה לוי");
        assert_eq!(summary.phone_number, "0501234567");
        assert_eq!(summary.budget_lower, 5000);
        assert_eq!(summary.budget_upper, 10000);
        assert_eq!(summary.due_date, DueDateKind::WithinWeek);
        assert_eq!(summary.image_count, 2);
    }
}

#[test]
fn completion_without_submission_redirects_to_entry() {
    init_logging();
    let (state, effects) = update(FlowState::new(), Msg::CompletionRequested);
    assert_eq!(effects, vec![Effect::Navigate(Route::Entry)]);
    assert!(state.view().summary.is_none());
}

#[test]
fn completion_with_submission_stays() {
    init_logging();
    let (state, _) = apply(
        fill_dana(details_step()),
        vec![
            Msg::SubmitClicked,
            Msg::SubmissionFinished {
                outcome: SubmissionOutcome::DuplicateSkipped,
            },
        ],
    );
    let (_, effects) = update(state, Msg::CompletionRequested);
    assert!(effects.is_empty());
}

#[test]
fn restart_discards_session_and_goes_home() {
    init_logging();
    let (state, _) = apply(
        fill_dana(details_step()),
        vec![
            Msg::SubmitClicked,
            Msg::SubmissionFinished {
                outcome: SubmissionOutcome::Failed,
            },
        ],
    );
    let (mut state, effects) = update(state, Msg::RestartClicked);

    assert_eq!(effects, vec![Effect::Navigate(Route::Entry)]);
    assert!(state.consume_dirty());
    let view = state.view();
    assert_eq!(view.step, FunnelStep::Upload);
    assert_eq!(view.image_count, 0);
    assert_eq!(view.form, FunnelForm::default());
    assert!(view.summary.is_none());
    assert!(state.outcome().is_none());
}

#[test]
fn stale_batch_after_restart_is_dropped() {
    init_logging();
    let (state, _) = update(
        FlowState::new(),
        Msg::ImagesPicked {
            source: InputSource::Camera,
            inputs: vec![RawImageInput::new("late.jpg", None, vec![0])],
        },
    );
    let (state, _) = update(state, Msg::RestartClicked);
    let (state, effects) = update(
        state,
        Msg::ImagesPicked {
            source: InputSource::FilePicker,
            inputs: vec![RawImageInput::new("new.jpg", None, vec![0])],
        },
    );
    assert!(matches!(
        effects.as_slice(),
        [Effect::NormalizeBatch { batch_id: 2, .. }]
    ));

    let (state, _) = update(
        state,
        Msg::BatchNormalized {
            batch_id: 1,
            images: vec![img("late")],
            skipped: 0,
        },
    );
    assert_eq!(state.view().image_count, 0);
    assert!(state.has_pending_batches());
}
