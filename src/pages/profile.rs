//! Profile view for a matched identity.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::net::api::IdentityApi;
use crate::net::types::Profile;
use crate::state::context::AuthContext;

pub(crate) const PROFILE_FAILED: &str = "Failed to load profile data";
pub(crate) const PHOTO_FAILED: &str = "Failed to load user's photo";

/// A profile plus its photo, if one could be loaded.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LoadedProfile {
    pub profile: Profile,
    pub photo: Result<Option<String>, &'static str>,
}

/// Fetch the profile, then its photo as a `data:` URL.
///
/// A missing or broken photo does not hide the profile.
pub(crate) async fn load_profile(api: Arc<dyn IdentityApi>, profile_id: String) -> Result<LoadedProfile, &'static str> {
    let profile = api.fetch_profile(&profile_id).await.map_err(|e| {
        log::warn!("profile: fetch {profile_id} failed: {e}");
        PROFILE_FAILED
    })?;
    let photo = match profile.photo_id.as_deref() {
        None => Ok(None),
        Some(photo_id) => match api.fetch_profile_photo(photo_id).await {
            Ok(photo) => Ok(Some(photo.data_url())),
            Err(e) => {
                log::warn!("profile: photo {photo_id} failed: {e}");
                Err(PHOTO_FAILED)
            }
        },
    };
    Ok(LoadedProfile { profile, photo })
}

#[component]
pub fn ProfilePage(auth: AuthContext) -> impl IntoView {
    let params = use_params_map();
    let api = auth.machine.api();
    let loaded = LocalResource::new(move || {
        let api = Arc::clone(&api);
        let profile_id = params.with(|p| p.get("profile_id").unwrap_or_default());
        load_profile(api, profile_id)
    });

    view! {
        <div class="profile-page">
            <Suspense fallback=move || view! { <p>"Loading profile..."</p> }>
                {move || {
                    loaded
                        .get()
                        .map(|result| match result {
                            Ok(loaded) => view! { <ProfileCard loaded/> }.into_any(),
                            Err(msg) => view! { <p class="profile-page__error">{msg}</p> }.into_any(),
                        })
                }}
            </Suspense>
        </div>
    }
}

#[component]
fn ProfileCard(loaded: LoadedProfile) -> impl IntoView {
    let LoadedProfile { profile, photo } = loaded;
    let photo = match photo {
        Ok(Some(src)) => view! { <img class="profile-card__photo" src=src alt="Profile photo"/> }.into_any(),
        Ok(None) => view! { <div class="profile-card__photo profile-card__photo--empty"></div> }.into_any(),
        Err(msg) => view! { <p class="profile-card__error">{msg}</p> }.into_any(),
    };
    let field = |label: &'static str, value: Option<String>| {
        view! {
            <div class="profile-card__field">
                <span class="profile-card__label">{label}</span>
                <span class="profile-card__value">{value.unwrap_or_default()}</span>
            </div>
        }
    };

    view! {
        <article class="profile-card">
            {photo}
            <h2>{profile.display_name()}</h2>
            {field("Age", profile.age.map(|a| a.to_string()))}
            {field("Phone", profile.phone_number)}
            {field("Email", profile.email)}
            {field("Created", profile.created_at)}
            {field("Updated", profile.updated_at)}
        </article>
    }
}
