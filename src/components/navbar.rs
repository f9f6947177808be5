use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;

const SECTIONS: [&str; 4] = ["Home", "About", "Contact", "Agents"];

#[function_component(Navbar)]
pub fn navbar() -> Html {
    html! {
        <nav class="flex items-center justify-between h-24 px-8">
            <div class="flex items-center gap-12 flex-[3]">
                <Link<Route> classes={classes!("flex", "items-center", "gap-2", "font-bold", "text-xl")} to={Route::Home}>
                    <img class="w-7" src="/logo.png" alt="" />
                    <span>{"AntoineEstate"}</span>
                </Link<Route>>
                {
                    SECTIONS.iter().map(|label| html! {
                        <Link<Route> classes={classes!("hover:scale-105", "transition-all")} to={Route::Home}>
                            {*label}
                        </Link<Route>>
                    }).collect::<Html>()
                }
            </div>
            <div class="flex items-center justify-end gap-6 flex-[2] h-full bg-yellow-50">
                <Link<Route> classes={classes!("px-6", "py-3")} to={Route::Home}>{"Sign in"}</Link<Route>>
                <Link<Route> classes={classes!("px-6", "py-3", "bg-yellow-400")} to={Route::Home}>
                    {"Sign up"}
                </Link<Route>>
                <div class="hidden menu-icon"></div>
            </div>
        </nav>
    }
}
