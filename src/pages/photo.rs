//! Photo input page: upload a photo and jump to the matching profile.

#[cfg(test)]
#[path = "photo_test.rs"]
mod photo_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::net::types::PhotoUpload;
use crate::routes::profile_path;
use crate::state::context::AuthContext;

pub(crate) const UPLOAD_FAILED: &str = "Error uploading image";

/// Check a selected file before it is sent for lookup.
pub(crate) fn prepare_upload(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<PhotoUpload, &'static str> {
    if bytes.is_empty() {
        return Err("Choose a photo first.");
    }
    let content_type = content_type.trim().to_ascii_lowercase();
    if !content_type.starts_with("image/") {
        return Err("Only image files can be uploaded.");
    }
    let file_name = match file_name.trim() {
        "" => "photo".to_owned(),
        name => name.to_owned(),
    };
    Ok(PhotoUpload { file_name, content_type, bytes })
}

#[cfg(feature = "hydrate")]
async fn read_selected_file(input: &web_sys::HtmlInputElement) -> Result<(String, String, Vec<u8>), &'static str> {
    let file = input
        .files()
        .and_then(|files| files.get(0))
        .ok_or("Choose a photo first.")?;
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| UPLOAD_FAILED)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok((file.name(), file.type_(), bytes))
}

#[component]
pub fn PhotoPage(auth: AuthContext) -> impl IntoView {
    let file_input = NodeRef::<leptos::html::Input>::new();
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let navigate = use_navigate();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        busy.set(true);
        info.set("Looking up profile...".to_owned());

        #[cfg(feature = "hydrate")]
        {
            let api = auth.machine.api();
            let navigate = navigate.clone();
            let input = file_input.get();
            leptos::task::spawn_local(async move {
                let Some(input) = input else {
                    info.set(UPLOAD_FAILED.to_owned());
                    busy.set(false);
                    return;
                };
                let upload = match read_selected_file(&input).await {
                    Ok((name, content_type, bytes)) => prepare_upload(&name, &content_type, bytes),
                    Err(msg) => Err(msg),
                };
                let upload = match upload {
                    Ok(upload) => upload,
                    Err(msg) => {
                        info.set(msg.to_owned());
                        busy.set(false);
                        return;
                    }
                };
                match api.verify_photo(&upload).await {
                    Ok(profile) => {
                        log::info!("photo: matched profile {}", profile.id);
                        navigate(&profile_path(&profile.id), NavigateOptions::default());
                    }
                    Err(e) => {
                        log::warn!("photo: lookup failed: {e}");
                        info.set(UPLOAD_FAILED.to_owned());
                        busy.set(false);
                    }
                }
            });
        }
    };

    view! {
        <div class="photo-page">
            <h1>"Identify"</h1>
            <form class="photo-form" on:submit=on_submit>
                <input class="photo-input" type="file" accept="image/*" node_ref=file_input/>
                <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                    "Upload"
                </button>
            </form>
            <Show when=move || !info.get().is_empty()>
                <p class="photo-message">{move || info.get()}</p>
            </Show>
        </div>
    }
}
