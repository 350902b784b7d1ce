use common::jobs::TaskStatusResponse;
use common::requests::UploadResponse;

pub enum Msg {
    OpenFilePicker,
    FileChosen(web_sys::File),
    FileRead {
        name: String,
        result: Result<Vec<u8>, String>,
    },
    ToggleWarnings,
    Upload,
    UploadProgress {
        loaded: f64,
        total: f64,
    },
    UploadFinished(Result<UploadResponse, String>),
    PollTick,
    StatusReceived(Result<TaskStatusResponse, String>),
    ContinueInBackground,
    DownloadTemplate,
    Retry,
    Close,
}
