use common::model::ImportKind;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CsvImportProps {
    pub kind: ImportKind,
    /// Task left running in the background by an earlier instance.
    #[prop_or_default]
    pub resume_task: Option<String>,
    /// Page to open once a queued import completes.
    #[prop_or_default]
    pub redirect_to: Option<String>,
    pub on_close: Callback<()>,
    /// Fired with the task id when the user sends a running import to the background.
    pub on_background: Callback<(ImportKind, String)>,
    /// Fired when an import of this kind reached a terminal state.
    pub on_finished: Callback<ImportKind>,
}
