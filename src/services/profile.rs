use std::rc::Rc;

use crate::config::AppConfig;
use crate::errors::ProfileError;
use crate::models::{ProfileForm, User};
use crate::services::api::{HttpUserApi, UserApi};
use crate::services::navigation::Navigator;
use crate::services::session::Session;
use crate::services::storage::{FirebaseStorage, ObjectStorage};
use crate::services::upload::{upload_avatar, AvatarChange, UploadEvents};
use crate::Route;

/// Remote services a profile update talks to.
#[derive(Clone)]
pub struct Backends {
    pub storage: Rc<dyn ObjectStorage>,
    pub api: Rc<dyn UserApi>,
}

impl Backends {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            storage: Rc::new(FirebaseStorage::new(
                config.storage_endpoint.clone(),
                config.storage_bucket.clone(),
                config.upload_chunk_size,
            )),
            api: Rc::new(HttpUserApi::new(config.api_url.clone())),
        }
    }
}

/// Saves the edited profile of the signed-in user.
///
/// A new avatar is uploaded to completion before the profile request goes
/// out, so the backend only ever sees a storage-issued URL. The session is
/// updated and `navigator` moves to the profile page only after the backend
/// accepts the update; on any error neither happens.
pub async fn submit_profile<N: Navigator>(
    backends: &Backends,
    session: &Session,
    form: ProfileForm,
    avatar: AvatarChange,
    events: &UploadEvents,
    navigator: &N,
) -> Result<User, ProfileError> {
    let user = session.current_user().ok_or(ProfileError::NotSignedIn)?;

    let avatar_url = match avatar {
        AvatarChange::Keep => user.avatar.clone(),
        AvatarChange::Uploaded(url) => Some(url),
        AvatarChange::Upload(file) => Some(
            upload_avatar(
                backends.storage.as_ref(),
                backends.api.as_ref(),
                &file,
                &user.id,
                events,
            )
            .await?,
        ),
    };

    let patch = form.into_patch(avatar_url);
    let updated = backends.api.update_user(&user.id, &patch).await?;
    log::info!("profile of {} updated", updated.id);

    session.update_user(updated.clone());
    navigator.navigate(Route::Profile);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use futures::StreamExt;

    use super::*;
    use crate::models::UserPatch;
    use crate::services::upload::{PendingAvatar, UploadState};
    use crate::test_support::{sample_user, Call, FakeFile, Recorder};

    fn backends(recorder: &Recorder, api_status: Option<u16>) -> Backends {
        let api = match api_status {
            Some(status) => recorder.api().failing_with(status),
            None => recorder.api(),
        };
        Backends {
            storage: Rc::new(recorder.storage()),
            api: Rc::new(api),
        }
    }

    fn form(username: &str) -> ProfileForm {
        ProfileForm {
            username: username.into(),
            email: "bob@example.com".into(),
            password: String::new(),
        }
    }

    #[test]
    fn new_avatar_is_uploaded_before_profile_update() {
        let recorder = Recorder::default();
        let session = Session::new(Some(sample_user()));
        let file = Rc::new(FakeFile::new("photo.jpg"));

        let updated = block_on(submit_profile(
            &backends(&recorder, None),
            &session,
            form("alice"),
            AvatarChange::Upload(file),
            &UploadEvents::detached(),
            &recorder.navigator(),
        ))
        .unwrap();

        let expected = UserPatch {
            username: Some("alice".into()),
            email: Some("bob@example.com".into()),
            password: Some(String::new()),
            avatar: Some("https://storage/42-photo.jpg".into()),
        };
        assert_eq!(
            recorder.calls(),
            vec![
                Call::Upload("42-photo.jpg".into()),
                Call::DownloadUrl("42-photo.jpg".into()),
                Call::UpdateUser("42".into(), UserPatch::avatar("https://storage/42-photo.jpg")),
                Call::UpdateUser("42".into(), expected),
                Call::Navigate(Route::Profile),
            ]
        );
        assert_eq!(updated.username, "alice");
        assert_eq!(session.current_user(), Some(updated));
    }

    #[test]
    fn without_new_file_storage_is_untouched() {
        let recorder = Recorder::default();
        let session = Session::new(Some(sample_user()));

        block_on(submit_profile(
            &backends(&recorder, None),
            &session,
            form("alice"),
            AvatarChange::Keep,
            &UploadEvents::detached(),
            &recorder.navigator(),
        ))
        .unwrap();

        let calls = recorder.calls();
        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::Upload(_) | Call::DownloadUrl(_))));
        match &calls[0] {
            Call::UpdateUser(id, patch) => {
                assert_eq!(id, "42");
                assert_eq!(patch.username.as_deref(), Some("alice"));
                assert_eq!(patch.avatar.as_deref(), Some("old.png"));
            }
            other => panic!("unexpected first call {:?}", other),
        }
    }

    #[test]
    fn previously_uploaded_url_is_reused() {
        let recorder = Recorder::default();
        let session = Session::new(Some(sample_user()));

        block_on(submit_profile(
            &backends(&recorder, None),
            &session,
            form("bob"),
            AvatarChange::Uploaded("https://storage/42-photo.jpg".into()),
            &UploadEvents::detached(),
            &recorder.navigator(),
        ))
        .unwrap();

        match &recorder.calls()[0] {
            Call::UpdateUser(_, patch) => {
                assert_eq!(patch.avatar.as_deref(), Some("https://storage/42-photo.jpg"))
            }
            other => panic!("unexpected first call {:?}", other),
        }
    }

    #[test]
    fn rejected_update_leaves_session_and_route_alone() {
        let recorder = Recorder::default();
        let session = Session::new(Some(sample_user()));

        let err = block_on(submit_profile(
            &backends(&recorder, Some(500)),
            &session,
            form("alice"),
            AvatarChange::Upload(Rc::new(FakeFile::new("photo.jpg"))),
            &UploadEvents::detached(),
            &recorder.navigator(),
        ))
        .unwrap_err();

        assert!(matches!(err, ProfileError::Api(_)));
        assert_eq!(session.current_user(), Some(sample_user()));
        assert!(!recorder
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Navigate(_))));
    }

    #[test]
    fn failed_upload_aborts_submission() {
        let recorder = Recorder::default();
        let session = Session::new(Some(sample_user()));
        let backends = Backends {
            storage: Rc::new(recorder.storage().failing_upload("offline")),
            api: Rc::new(recorder.api()),
        };

        let err = block_on(submit_profile(
            &backends,
            &session,
            form("alice"),
            AvatarChange::Upload(Rc::new(FakeFile::new("photo.jpg"))),
            &UploadEvents::detached(),
            &recorder.navigator(),
        ))
        .unwrap_err();

        assert!(matches!(err, ProfileError::Upload(_)));
        assert_eq!(recorder.calls(), vec![Call::Upload("42-photo.jpg".into())]);
        assert_eq!(session.current_user(), Some(sample_user()));
    }

    #[test]
    fn signed_out_session_is_rejected() {
        let recorder = Recorder::default();

        let err = block_on(submit_profile(
            &backends(&recorder, None),
            &Session::default(),
            form("alice"),
            AvatarChange::Keep,
            &UploadEvents::detached(),
            &recorder.navigator(),
        ))
        .unwrap_err();

        assert_eq!(err, ProfileError::NotSignedIn);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn signed_out_submit_does_not_strand_picked_avatar() {
        let recorder = Recorder::default();
        let mut avatar = PendingAvatar::new("old.png");
        avatar.select_file(Rc::new(FakeFile::new("photo.jpg"))).unwrap();
        let (events, rx) = UploadEvents::channel();

        let err = block_on(submit_profile(
            &backends(&recorder, None),
            &Session::default(),
            form("alice"),
            avatar.take_change(),
            &events,
            &recorder.navigator(),
        ))
        .unwrap_err();
        drop(events);
        for event in block_on(rx.collect::<Vec<_>>()) {
            avatar.apply(event);
        }
        avatar.settle_failed(err.to_string());

        assert_eq!(
            avatar.state(),
            &UploadState::Failed {
                error: "no signed-in user".into()
            }
        );
        assert_eq!(avatar.preview_url(), "old.png");
        assert!(recorder.calls().is_empty());
    }
}
