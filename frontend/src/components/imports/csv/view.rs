use common::import::{TaskStatus, UploadJob};
use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::prelude::*;

use super::helpers::{format_bytes, format_count};
use super::messages::Msg;
use super::state::CsvImportDialog;
use crate::tops_sheet::yw_material_top_sheet::YwMaterialTopSheet;

pub fn view(component: &CsvImportDialog, ctx: &Context<CsvImportDialog>) -> Html {
    let link = ctx.link();

    let body = match component.session.monitor().status() {
        Some(status) => build_task_panel(component, link, status),
        None => html! {
            <>
                { build_file_picker(component, link) }
                { build_validation(component, link) }
                { build_upload(component, link) }
            </>
        },
    };

    html! {
        <YwMaterialTopSheet node_ref={component.sheet_ref.clone()} open={true}>
            <div class="csv-import-dialog">
                { build_header(component, link) }
                { body }
            </div>
        </YwMaterialTopSheet>
    }
}

fn build_header(component: &CsvImportDialog, link: &Scope<CsvImportDialog>) -> Html {
    let kind = component.session.kind();
    html! {
        <header>
            <h2>{ format!("Import {}", kind.label()) }</h2>
            <div>
                <button onclick={link.callback(|_| Msg::DownloadTemplate)}>
                    { "Download template" }
                </button>
                <button onclick={link.callback(|_| Msg::Close)}>{ "Close" }</button>
            </div>
        </header>
    }
}

fn build_file_picker(component: &CsvImportDialog, link: &Scope<CsvImportDialog>) -> Html {
    let busy = component.session.is_busy() || component.reading;
    let chosen = match component.session.job() {
        Some(job) => describe_job(job),
        None => "No file selected.".to_string(),
    };

    html! {
        <section class="file-picker">
            <input
                type="file"
                accept=".csv,text/csv"
                style="display: none"
                ref={component.file_input_ref.clone()}
                onchange={link.batch_callback(|e: Event| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    input.files().and_then(|files| files.get(0)).map(Msg::FileChosen)
                })}
            />
            <button disabled={busy} onclick={link.callback(|_| Msg::OpenFilePicker)}>
                { "Choose CSV file" }
            </button>
            <span>{ if component.reading { "Reading file...".to_string() } else { chosen } }</span>
        </section>
    }
}

fn describe_job(job: &UploadJob) -> String {
    format!(
        "{} ({}, {} rows)",
        job.file_name,
        format_bytes(job.file_size),
        format_count(job.validation.data_row_count())
    )
}

fn build_validation(component: &CsvImportDialog, link: &Scope<CsvImportDialog>) -> Html {
    let Some(job) = component.session.job() else {
        return html! {};
    };
    let validation = &job.validation;

    let errors = if validation.errors.is_empty() {
        html! { <p class="valid">{ "The file is ready to upload." }</p> }
    } else {
        html! {
            <>
                <h3>{ format!("{} errors", format_count(validation.errors.len())) }</h3>
                { message_list("errors", &validation.errors) }
            </>
        }
    };

    let warnings = if validation.warnings.is_empty() {
        html! {}
    } else {
        let show = component.session.show_warnings();
        html! {
            <>
                <h3>
                    { format!("{} warnings ", format_count(validation.warnings.len())) }
                    <button onclick={link.callback(|_| Msg::ToggleWarnings)}>
                        { if show { "Hide" } else { "Show" } }
                    </button>
                </h3>
                if show {
                    { message_list("warnings", &validation.warnings) }
                }
            </>
        }
    };

    html! {
        <section class="validation">
            { errors }
            { warnings }
        </section>
    }
}

fn message_list(class: &'static str, messages: &[String]) -> Html {
    html! {
        <ul class={class}>
            { for messages.iter().map(|message| html! { <li>{ message.clone() }</li> }) }
        </ul>
    }
}

fn build_upload(component: &CsvImportDialog, link: &Scope<CsvImportDialog>) -> Html {
    let progress = component.session.progress();

    html! {
        <section class="upload">
            if progress.is_uploading() || progress.percent() > 0 {
                <progress max="100" value={progress.percent().to_string()} />
                <span>{ format!("{}%", progress.percent()) }</span>
            }
            if let Some(error) = progress.error() {
                <p class="upload-error">{ error.to_string() }</p>
            }
            <button
                disabled={!component.session.can_upload()}
                onclick={link.callback(|_| Msg::Upload)}
            >
                { if progress.error().is_some() { "Retry upload" } else { "Upload" } }
            </button>
        </section>
    }
}

fn build_task_panel(
    component: &CsvImportDialog,
    link: &Scope<CsvImportDialog>,
    status: TaskStatus,
) -> Html {
    let message = component
        .session
        .monitor()
        .task()
        .map(|task| task.message.clone())
        .unwrap_or_default();

    match status {
        TaskStatus::Processing => html! {
            <section class="task-panel processing">
                <div class="spin"></div>
                <p>{ message }</p>
                <button onclick={link.callback(|_| Msg::ContinueInBackground)}>
                    { "Continue in background" }
                </button>
            </section>
        },
        TaskStatus::Complete => html! {
            <section class="task-panel complete">
                <p>{ message }</p>
                <button onclick={link.callback(|_| Msg::Close)}>{ "Done" }</button>
            </section>
        },
        TaskStatus::Failed | TaskStatus::Error => html! {
            <section class="task-panel failed">
                <p class="upload-error">{ message }</p>
                <button onclick={link.callback(|_| Msg::Retry)}>{ "Start over" }</button>
            </section>
        },
    }
}
