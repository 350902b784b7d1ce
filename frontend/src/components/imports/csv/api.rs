//! HTTP calls made by the import dialog.
//!
//! The upload goes through `XmlHttpRequest` because fetch exposes no upload
//! progress; status polling and the template check use `gloo_net`.

use common::jobs::TaskStatusResponse;
use common::model::ImportKind;
use common::requests::{UploadCsvRequest, UploadResponse};
use gloo_net::http::Request;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ProgressEvent, XmlHttpRequest};
use yew::Callback;

use super::helpers::alert;

/// A running upload. Keeps the event closures alive until the request ends.
pub struct UploadHandle {
    xhr: XmlHttpRequest,
    _on_progress: Closure<dyn FnMut(ProgressEvent)>,
    _on_load: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

impl UploadHandle {
    pub fn abort(&self) {
        if let Ok(upload) = self.xhr.upload() {
            upload.set_onprogress(None);
        }
        self.xhr.set_onload(None);
        self.xhr.set_onerror(None);
        if let Err(err) = self.xhr.abort() {
            gloo_console::warn!(err);
        }
    }
}

/// Posts the cleaned CSV to the upload route of `kind`.
///
/// `on_done` always fires from a fresh task, never from inside the XHR
/// event handler, so the receiver may drop the handle.
pub fn upload_csv(
    kind: ImportKind,
    request: &UploadCsvRequest,
    on_progress: Callback<(f64, f64)>,
    on_done: Callback<Result<UploadResponse, String>>,
) -> Result<UploadHandle, String> {
    let body = serde_json::to_string(request).map_err(|e| e.to_string())?;
    let xhr = XmlHttpRequest::new().map_err(js_error)?;
    xhr.open_with_async("POST", &kind.upload_path(), true)
        .map_err(js_error)?;
    xhr.set_request_header("Content-Type", "application/json")
        .map_err(js_error)?;

    let on_progress = Closure::wrap(Box::new(move |event: ProgressEvent| {
        if event.length_computable() {
            on_progress.emit((event.loaded(), event.total()));
        }
    }) as Box<dyn FnMut(ProgressEvent)>);
    xhr.upload()
        .map_err(js_error)?
        .set_onprogress(Some(on_progress.as_ref().unchecked_ref()));

    let on_load = {
        let xhr = xhr.clone();
        let on_done = on_done.clone();
        Closure::wrap(Box::new(move || {
            let result = read_upload_response(&xhr);
            let on_done = on_done.clone();
            spawn_local(async move { on_done.emit(result) });
        }) as Box<dyn FnMut()>)
    };
    xhr.set_onload(Some(on_load.as_ref().unchecked_ref()));

    let on_error = Closure::wrap(Box::new(move || {
        let on_done = on_done.clone();
        spawn_local(async move {
            on_done.emit(Err("Network error while uploading the file.".to_string()))
        });
    }) as Box<dyn FnMut()>);
    xhr.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    xhr.send_with_opt_str(Some(&body)).map_err(js_error)?;

    Ok(UploadHandle {
        xhr,
        _on_progress: on_progress,
        _on_load: on_load,
        _on_error: on_error,
    })
}

fn read_upload_response(xhr: &XmlHttpRequest) -> Result<UploadResponse, String> {
    let status = xhr.status().map_err(js_error)?;
    let text = xhr.response_text().map_err(js_error)?.unwrap_or_default();

    if (200..300).contains(&status) {
        serde_json::from_str(&text)
            .map_err(|e| format!("Unexpected response from the server: {}", e))
    } else if text.trim().is_empty() {
        Err(format!("Upload failed with status {}.", status))
    } else {
        Err(text)
    }
}

pub async fn fetch_status(task_id: &str) -> Result<TaskStatusResponse, String> {
    let response = Request::get(&format!("/api/imports/status/{}", task_id))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.ok() {
        let body = response.text().await.unwrap_or_default();
        return Err(if body.trim().is_empty() {
            format!("status {}", response.status())
        } else {
            body
        });
    }
    response
        .json::<TaskStatusResponse>()
        .await
        .map_err(|e| e.to_string())
}

/// Checks that the template route answers, then lets the browser download it.
pub async fn download_template(kind: ImportKind) {
    let path = kind.template_path();
    match Request::get(&path).send().await {
        Ok(resp) if resp.ok() => {
            let opened = web_sys::window().map(|window| window.open_with_url(&path));
            if !matches!(opened, Some(Ok(_))) {
                alert("Could not open the template download.");
            }
        }
        Ok(resp) => alert(&format!(
            "Could not download the template (status {}).",
            resp.status()
        )),
        Err(err) => alert(&format!("Could not download the template: {}", err)),
    }
}

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
