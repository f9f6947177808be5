#![recursion_limit = "512"]

pub mod components;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
#[cfg(test)]
mod test_support;

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use yew::prelude::*;
use yew_router::prelude::*;

use components::home::Home;
use components::navbar::Navbar;
use components::profile::Profile;
use components::profile_update::ProfileUpdate;
use config::AppConfig;
use services::session::{LocalStorageStore, Session};

// Use `wee_alloc` as the global allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[derive(Debug, Clone, Copy, PartialEq, Routable)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/profile")]
    Profile,
    #[at("/profile/update")]
    ProfileUpdate,
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[function_component(Main)]
fn app() -> Html {
    let config = use_state(AppConfig::from_build_env);
    let session = {
        let key = config.session_key.clone();
        use_state(move || Session::restore(Rc::new(LocalStorageStore::new(key))))
    };

    html! {
        <ContextProvider<AppConfig> context={(*config).clone()}>
            <ContextProvider<Session> context={(*session).clone()}>
                <BrowserRouter>
                    <div class="flex flex-col w-screen h-screen max-w-7xl mx-auto">
                        <Navbar />
                        <main class="flex-1">
                            <Switch<Route> render={Switch::render(switch)} />
                        </main>
                    </div>
                </BrowserRouter>
            </ContextProvider<Session>>
        </ContextProvider<AppConfig>>
    }
}

fn switch(selected_route: &Route) -> Html {
    match selected_route {
        Route::Home => html! {<Home />},
        Route::Profile => html! {<Profile />},
        Route::ProfileUpdate => html! {<ProfileUpdate />},
        Route::NotFound => html! {<h1 class="px-8 py-12">{"404"}</h1>},
    }
}

#[wasm_bindgen(start)]
pub fn run_app() -> Result<(), JsValue> {
    wasm_logger::init(wasm_logger::Config::default());
    yew::start_app::<Main>();
    Ok(())
}
