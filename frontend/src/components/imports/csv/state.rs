use common::import::{ImportSession, POLL_INTERVAL};
use common::model::ImportKind;
use gloo_timers::callback::Interval;
use yew::html::Scope;
use yew::NodeRef;

use super::api::UploadHandle;
use super::messages::Msg;

pub struct CsvImportDialog {
    pub session: ImportSession,
    pub file_input_ref: NodeRef,
    pub sheet_ref: NodeRef,
    /// True while the browser reads the picked file.
    pub reading: bool,
    pub upload: Option<UploadHandle>,
    /// Dropping the interval cancels it.
    pub poll_timer: Option<Interval>,
}

impl CsvImportDialog {
    pub fn new(kind: ImportKind, redirect_to: Option<String>) -> Self {
        let mut session = ImportSession::new(kind);
        session.monitor_mut().set_redirect(redirect_to);
        Self {
            session,
            file_input_ref: NodeRef::default(),
            sheet_ref: NodeRef::default(),
            reading: false,
            upload: None,
            poll_timer: None,
        }
    }

    /// Polls once now, then on every interval tick.
    pub fn start_polling(&mut self, link: &Scope<Self>) {
        let tick = link.clone();
        let millis = u32::try_from(POLL_INTERVAL.as_millis()).unwrap_or(u32::MAX);
        self.poll_timer = Some(Interval::new(millis, move || {
            tick.send_message(Msg::PollTick)
        }));
        link.send_message(Msg::PollTick);
    }

    pub fn stop_polling(&mut self) {
        self.poll_timer = None;
    }

    pub fn abort_upload(&mut self) {
        if let Some(upload) = self.upload.take() {
            upload.abort();
        }
    }
}
