use std::collections::HashMap;

use common::model::ImportKind;
use yew::{html, Component, Context, Html};

use crate::components::imports::csv::CsvImportDialog;

pub enum AppMsg {
    Open(ImportKind),
    Close,
    Backgrounded(ImportKind, String),
    Finished(ImportKind),
    DismissNotice,
}

/// Launcher page: one button per import kind, plus the dialog when open.
pub struct App {
    open: Option<ImportKind>,
    /// Imports the user sent to the background, by kind.
    background: HashMap<ImportKind, String>,
    /// Set when a dialog redirected here after its import finished.
    notice: Option<ImportKind>,
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            open: None,
            background: HashMap::new(),
            notice: finished_from_location(),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::Open(kind) => self.open = Some(kind),
            AppMsg::Close => self.open = None,
            AppMsg::Backgrounded(kind, task_id) => {
                self.background.insert(kind, task_id);
            }
            AppMsg::Finished(kind) => {
                self.background.remove(&kind);
            }
            AppMsg::DismissNotice => self.notice = None,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let dialog = match self.open {
            Some(kind) => html! {
                <CsvImportDialog
                    key={kind.slug()}
                    kind={kind}
                    resume_task={self.background.get(&kind).cloned()}
                    redirect_to={Some(kind.finished_page())}
                    on_close={link.callback(|_: ()| AppMsg::Close)}
                    on_background={link.callback(|(kind, task_id): (ImportKind, String)| {
                        AppMsg::Backgrounded(kind, task_id)
                    })}
                    on_finished={link.callback(AppMsg::Finished)}
                />
            },
            None => html! {},
        };

        let notice = match self.notice {
            Some(kind) => html! {
                <div class="import-notice">
                    { format!("{} import finished.", kind.label()) }
                    <button onclick={link.callback(|_| AppMsg::DismissNotice)}>{ "Dismiss" }</button>
                </div>
            },
            None => html! {},
        };

        html! {
            <div>
                { notice }
                <div class="import-launcher">
                    { for ImportKind::ALL.iter().map(|&kind| html! {
                        <button onclick={link.callback(move |_| AppMsg::Open(kind))}>
                            { format!("Import {}", kind.label()) }
                            if self.background.contains_key(&kind) {
                                <span class="badge">{ "running" }</span>
                            }
                        </button>
                    }) }
                </div>
                { dialog }
            </div>
        }
    }
}

fn finished_from_location() -> Option<ImportKind> {
    let search = web_sys::window()?.location().search().ok()?;
    ImportKind::from_finished_query(&search)
}
