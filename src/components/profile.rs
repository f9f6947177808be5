use yew::prelude::*;
use yew_router::prelude::*;

use crate::config::AppConfig;
use crate::services::session::Session;
use crate::Route;

#[function_component(Profile)]
pub fn profile() -> Html {
    let config = use_context::<AppConfig>().unwrap_or_default();
    let user = use_context::<Session>().and_then(|session| session.current_user());

    match user {
        Some(user) => html! {
            <div class="flex flex-col gap-6 px-8 py-12 max-w-xl">
                <div class="flex items-center justify-between">
                    <h1 class="text-3xl font-light">{"User Information"}</h1>
                    <Link<Route> classes={classes!("px-6", "py-3", "bg-yellow-400")} to={Route::ProfileUpdate}>
                        {"Update Profile"}
                    </Link<Route>>
                </div>
                <div class="flex items-center gap-4">
                    {"Avatar: "}
                    <img class="w-10 h-10 rounded-full object-cover" src={user.avatar_or(&config.default_avatar).to_string()} alt="" />
                </div>
                <div>{"Username: "}<b>{user.username.clone()}</b></div>
                <div>{"E-mail: "}<b>{user.email.clone()}</b></div>
            </div>
        },
        None => html! {
            <div class="px-8 py-12 text-gray-600">{"Please sign in to view your profile."}</div>
        },
    }
}
