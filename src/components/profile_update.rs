use std::rc::Rc;

use futures::StreamExt;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::config::AppConfig;
use crate::errors::ProfileError;
use crate::models::{ProfileForm, User};
use crate::services::file::BrowserFile;
use crate::services::profile::{submit_profile, Backends};
use crate::services::session::Session;
use crate::services::upload::{PendingAvatar, UploadEvent, UploadEvents, UploadState};

pub enum Msg {
    PickAvatar,
    FileChosen(web_sys::File),
    Upload(UploadEvent),
    Submit,
    Saved(User),
    Failed(ProfileError),
}

pub struct ProfileUpdate {
    session: Option<Session>,
    backends: Backends,
    avatar: PendingAvatar,
    file_input: NodeRef,
    username_input: NodeRef,
    email_input: NodeRef,
    password_input: NodeRef,
    submitting: bool,
    error: Option<String>,
}

impl ProfileUpdate {
    fn current_user(&self) -> Option<User> {
        self.session.as_ref().and_then(Session::current_user)
    }

    fn read_form(&self) -> ProfileForm {
        ProfileForm {
            username: input_value(&self.username_input),
            email: input_value(&self.email_input),
            password: input_value(&self.password_input),
        }
    }
}

fn error_line(error: Option<&str>) -> Html {
    match error {
        Some(error) => html! { <span class="text-sm text-red-600">{error.to_string()}</span> },
        None => html! {},
    }
}

fn input_value(node: &NodeRef) -> String {
    node.cast::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}

impl Component for ProfileUpdate {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = ctx
            .link()
            .context::<AppConfig>(Callback::noop())
            .map(|(config, _)| config)
            .unwrap_or_else(AppConfig::from_build_env);
        let session = ctx
            .link()
            .context::<Session>(Callback::noop())
            .map(|(session, _)| session);
        if session.is_none() {
            log::warn!("profile page mounted without a session context");
        }

        let current_avatar = session
            .as_ref()
            .and_then(Session::current_user)
            .map(|user| user.avatar_or(&config.default_avatar).to_string())
            .unwrap_or_else(|| config.default_avatar.clone());

        Self {
            session,
            backends: Backends::from_config(&config),
            avatar: PendingAvatar::new(current_avatar),
            file_input: NodeRef::default(),
            username_input: NodeRef::default(),
            email_input: NodeRef::default(),
            password_input: NodeRef::default(),
            submitting: false,
            error: None,
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, first_render: bool) {
        if !first_render {
            return;
        }
        if let Some(user) = self.current_user() {
            if let Some(input) = self.username_input.cast::<HtmlInputElement>() {
                input.set_value(&user.username);
            }
            if let Some(input) = self.email_input.cast::<HtmlInputElement>() {
                input.set_value(&user.email);
            }
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::PickAvatar => {
                if let Some(input) = self.file_input.cast::<HtmlInputElement>() {
                    input.click();
                }
                false
            }
            Msg::FileChosen(file) => {
                match self.avatar.select_file(Rc::new(BrowserFile::new(file))) {
                    Ok(()) => self.error = None,
                    Err(e) => {
                        log::error!("could not preview avatar: {}", e);
                        self.error = Some(e.to_string());
                    }
                }
                true
            }
            Msg::Upload(event) => {
                self.avatar.apply(event);
                true
            }
            Msg::Submit => {
                if self.submitting {
                    log::warn!("profile update already in flight, ignoring submit");
                    return false;
                }
                let session = match &self.session {
                    Some(session) if session.current_user().is_some() => session.clone(),
                    _ => {
                        self.error = Some(ProfileError::NotSignedIn.to_string());
                        return true;
                    }
                };

                let form = self.read_form();
                let change = self.avatar.take_change();
                let (events, mut progress) = UploadEvents::channel();
                let link = ctx.link().clone();
                spawn_local(async move {
                    while let Some(event) = progress.next().await {
                        link.send_message(Msg::Upload(event));
                    }
                });

                let backends = self.backends.clone();
                let history = ctx.link().history();
                ctx.link().send_future(async move {
                    match submit_profile(&backends, &session, form, change, &events, &history).await {
                        Ok(user) => Msg::Saved(user),
                        Err(e) => Msg::Failed(e),
                    }
                });

                self.submitting = true;
                self.error = None;
                true
            }
            Msg::Saved(user) => {
                log::debug!("saved profile for {}", user.username);
                self.submitting = false;
                true
            }
            Msg::Failed(e) => {
                log::error!("Error updating profile: {}", e);
                self.avatar.settle_failed(e.to_string());
                self.submitting = false;
                self.error = Some(e.to_string());
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: FocusEvent| {
            e.prevent_default();
            Msg::Submit
        });
        let pick_avatar = ctx.link().callback(|_| Msg::PickAvatar);
        let file_chosen = ctx.link().batch_callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            input.files().and_then(|files| files.get(0)).map(Msg::FileChosen)
        });

        let upload_status = match self.avatar.state() {
            UploadState::Uploading { progress } => html! {
                <div class="w-full">
                    <div class="h-2 bg-gray-200 rounded">
                        <div class="h-2 bg-teal-600 rounded" style={format!("width: {}%", progress)}></div>
                    </div>
                    <span class="text-xs text-gray-600">{format!("Uploading {}%", progress)}</span>
                </div>
            },
            UploadState::Succeeded { .. } => html! {
                <span class="text-xs text-green-700">{"Image uploaded"}</span>
            },
            _ => html! {},
        };

        html! {
            <div class="flex h-full">
                <div class="flex-[3] flex items-center justify-center">
                    <form class="flex flex-col gap-5" onsubmit={onsubmit}>
                        <h1 class="text-3xl font-light">{"Update Profile"}</h1>
                        <div class="flex flex-col gap-1">
                            <label for="username">{"Username"}</label>
                            <input
                                ref={self.username_input.clone()}
                                id="username"
                                name="username"
                                type="text"
                                class="px-4 py-3 border border-gray-400 rounded"
                            />
                        </div>
                        <div class="flex flex-col gap-1">
                            <label for="email">{"Email"}</label>
                            <input
                                ref={self.email_input.clone()}
                                id="email"
                                name="email"
                                type="email"
                                class="px-4 py-3 border border-gray-400 rounded"
                            />
                        </div>
                        <div class="flex flex-col gap-1">
                            <label for="password">{"Password"}</label>
                            <input
                                ref={self.password_input.clone()}
                                id="password"
                                name="password"
                                type="password"
                                class="px-4 py-3 border border-gray-400 rounded"
                            />
                        </div>
                        <button
                            disabled={self.submitting}
                            class="py-3 rounded bg-teal-600 text-white font-bold disabled:bg-gray-400"
                        >
                            {if self.submitting { "Updating..." } else { "Update" }}
                        </button>
                        { error_line(self.error.as_deref()) }
                    </form>
                </div>
                <div class="flex-[2] flex flex-col items-center justify-center gap-3 bg-yellow-50">
                    <div class="cursor-pointer" onclick={pick_avatar}>
                        <input
                            ref={self.file_input.clone()}
                            type="file"
                            accept="image/*"
                            class="hidden"
                            onchange={file_chosen}
                        />
                        <img src={self.avatar.preview_url().to_string()} alt="Avatar" class="w-2/3 mx-auto rounded-full object-cover" />
                    </div>
                    {upload_status}
                    { error_line(self.avatar.error()) }
                </div>
            </div>
        }
    }
}
