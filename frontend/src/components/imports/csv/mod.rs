//! CSV import dialog: root module wiring the Yew `Component` implementation
//! with submodules for state, update logic, view rendering, and the HTTP calls.
//!
//! Responsibilities
//! - Re-export selected types (`Msg`, `CsvImportProps`, `CsvImportDialog`).
//! - Provide the `Component` implementation that delegates to `update::update` and `view::view`.
//! - When mounted with a `resume_task`, re-attach to an import left running in
//!   the background and start polling right away.
//! - On teardown, stop the poll timer and abort any upload still in flight.

use yew::prelude::*;

mod api;
mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use props::CsvImportProps;
pub use state::CsvImportDialog;

impl Component for CsvImportDialog {
    type Message = Msg;
    type Properties = CsvImportProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let mut dialog = CsvImportDialog::new(props.kind, props.redirect_to.clone());

        if let Some(task_id) = &props.resume_task {
            match dialog.session.resume_task(task_id) {
                Ok(()) => dialog.start_polling(ctx.link()),
                Err(err) => gloo_console::warn!(format!("cannot resume {}: {}", task_id, err)),
            }
        }
        dialog
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.stop_polling();
        self.abort_upload();
    }
}
