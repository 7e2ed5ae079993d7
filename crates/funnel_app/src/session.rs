//! Drives one funnel session from command-line input.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use funnel_core::{
    update, FlowState, FunnelStep, FunnelViewModel, InputSource, Msg, RawImageInput, Route,
    SubmissionOutcome,
};
use funnel_engine::EngineHandle;
use funnel_logging::{funnel_debug, funnel_warn};

use crate::cli::SubmitArgs;
use crate::effects::EffectRunner;

const ENGINE_WAIT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub view: FunnelViewModel,
    pub outcome: Option<SubmissionOutcome>,
    pub route: Route,
}

pub struct Session {
    state: FlowState,
    runner: EffectRunner,
}

impl Session {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            state: FlowState::new(),
            runner: EffectRunner::new(engine),
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            let view = state.view();
            funnel_debug!(
                "step={:?} images={} pending={}",
                view.step,
                view.image_count,
                view.pending_batches
            );
        }
        self.state = state;
        self.runner.run(effects);
    }

    /// Runs the whole funnel: pick, normalize, continue, fill, submit, complete.
    pub fn run(mut self, args: &SubmitArgs) -> SessionReport {
        for (source, paths) in [
            (InputSource::FilePicker, &args.images),
            (InputSource::Camera, &args.camera),
        ] {
            let inputs = read_inputs(paths);
            self.dispatch(Msg::ImagesPicked { source, inputs });
        }
        self.wait_while(|state| state.has_pending_batches());

        self.dispatch(Msg::ContinueClicked);
        if self.state.step() != FunnelStep::Details {
            funnel_warn!("No usable images; the funnel cannot continue");
            return self.report();
        }

        for field in args.field_updates() {
            self.dispatch(Msg::FieldChanged(field));
        }
        self.dispatch(Msg::SubmitClicked);
        self.wait_while(|state| state.step() == FunnelStep::Submitting);
        self.dispatch(Msg::CompletionRequested);
        self.report()
    }

    fn wait_while(&mut self, pending: impl Fn(&FlowState) -> bool) {
        while pending(&self.state) {
            match self.runner.next_msg(ENGINE_WAIT) {
                Some(msg) => self.dispatch(msg),
                None => {
                    funnel_warn!("Engine did not answer within {:?}", ENGINE_WAIT);
                    return;
                }
            }
        }
    }

    fn report(&self) -> SessionReport {
        SessionReport {
            view: self.state.view(),
            outcome: self.state.outcome().cloned(),
            route: self.runner.route(),
        }
    }
}

/// Unreadable files are skipped like images that fail to decode.
fn read_inputs(paths: &[PathBuf]) -> Vec<RawImageInput> {
    paths
        .iter()
        .filter_map(|path| match fs::read(path) {
            Ok(bytes) => Some(RawImageInput::new(
                path.display().to_string(),
                media_type_for(path),
                bytes,
            )),
            Err(err) => {
                funnel_warn!("Skipping {:?}: {}", path, err);
                None
            }
        })
        .collect()
}

fn media_type_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(media_type.to_string())
}
