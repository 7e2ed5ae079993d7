use funnel_core::{update, FlowState, Msg};

#[test]
fn tick_is_noop() {
    let state = FlowState::new();
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
