use common::import::{CompletionAction, MonitorEvent, UploadOutcome};
use gloo_file::futures::read_as_bytes;
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

use super::api;
use super::helpers::{format_count, navigate, show_toast};
use super::messages::Msg;
use super::state::CsvImportDialog;

pub fn update(component: &mut CsvImportDialog, ctx: &Context<CsvImportDialog>, msg: Msg) -> bool {
    let kind = component.session.kind();

    match msg {
        Msg::OpenFilePicker => {
            if let Some(input) = component.file_input_ref.cast::<HtmlInputElement>() {
                input.click();
            }
            false
        }

        Msg::FileChosen(raw) => {
            if component.session.is_busy() {
                show_toast("Wait for the current import to finish.");
                return false;
            }
            component.reading = true;
            let link = ctx.link().clone();
            let file = gloo_file::File::from(raw);
            spawn_local(async move {
                let name = file.name();
                let result = read_as_bytes(&file).await.map_err(|e| e.to_string());
                link.send_message(Msg::FileRead { name, result });
            });
            // Lets the same file be picked again after a fix.
            if let Some(input) = component.file_input_ref.cast::<HtmlInputElement>() {
                input.set_value("");
            }
            true
        }

        Msg::FileRead { name, result } => {
            component.reading = false;
            let selected = match result {
                Ok(bytes) => component.session.select_file(&name, &bytes).map(|_| ()),
                Err(reason) => component.session.read_failed(&name, &reason).map(|_| ()),
            };
            if let Err(err) = selected {
                show_toast(&err.to_string());
            }
            true
        }

        Msg::ToggleWarnings => {
            component.session.toggle_warnings();
            true
        }

        Msg::Upload => {
            let request = match component.session.begin_upload() {
                Ok(request) => request,
                Err(err) => {
                    show_toast(&err.to_string());
                    return false;
                }
            };
            let link = ctx.link();
            let on_progress =
                link.callback(|(loaded, total): (f64, f64)| Msg::UploadProgress { loaded, total });
            let on_done = link.callback(Msg::UploadFinished);
            match api::upload_csv(kind, &request, on_progress, on_done) {
                Ok(handle) => component.upload = Some(handle),
                Err(err) => {
                    component.session.finish_upload(Err(err));
                }
            }
            true
        }

        Msg::UploadProgress { loaded, total } => {
            component
                .session
                .record_progress(loaded.max(0.0) as u64, total.max(0.0) as u64);
            true
        }

        Msg::UploadFinished(result) => {
            component.upload = None;
            match component.session.finish_upload(result) {
                UploadOutcome::Completed(ack) => {
                    show_toast(&format!(
                        "{} ({} rows)",
                        ack.message,
                        format_count(ack.rows_imported)
                    ));
                    ctx.props().on_finished.emit(kind);
                    match &ctx.props().redirect_to {
                        Some(url) => navigate(url),
                        None => ctx.props().on_close.emit(()),
                    }
                    false
                }
                UploadOutcome::Queued(task_id) => {
                    gloo_console::log!(format!("{} import queued as {}", kind, task_id));
                    component.start_polling(ctx.link());
                    true
                }
                UploadOutcome::Failed(_) => true,
                UploadOutcome::Ignored => false,
            }
        }

        Msg::PollTick => {
            if let Some(task_id) = component.session.monitor_mut().begin_poll() {
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = api::fetch_status(&task_id).await;
                    link.send_message(Msg::StatusReceived(result));
                });
            }
            false
        }

        Msg::StatusReceived(result) => match component.session.monitor_mut().apply(result) {
            MonitorEvent::Progress(_) => true,
            MonitorEvent::Completed { message, action } => {
                component.stop_polling();
                ctx.props().on_finished.emit(kind);
                match action {
                    CompletionAction::Redirect(url) => navigate(&url),
                    CompletionAction::Notify => {
                        show_toast(&format!("{} finished: {}", kind.label(), message))
                    }
                    CompletionAction::Close => {
                        show_toast(&message);
                        ctx.props().on_close.emit(());
                    }
                }
                true
            }
            MonitorEvent::Failed(_) | MonitorEvent::Errored(_) => {
                component.stop_polling();
                ctx.props().on_finished.emit(kind);
                true
            }
            MonitorEvent::Ignored => false,
        },

        Msg::ContinueInBackground => {
            if let Some(task_id) = component.session.continue_in_background() {
                component.stop_polling();
                show_toast("The import keeps running in the background.");
                ctx.props().on_background.emit((kind, task_id));
                ctx.props().on_close.emit(());
            }
            true
        }

        Msg::DownloadTemplate => {
            spawn_local(api::download_template(kind));
            false
        }

        Msg::Retry => {
            component.stop_polling();
            component.abort_upload();
            component.session.reset();
            true
        }

        Msg::Close => {
            component.stop_polling();
            component.abort_upload();
            component.session.reset();
            ctx.props().on_close.emit(());
            false
        }
    }
}
