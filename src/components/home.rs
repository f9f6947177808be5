use yew::prelude::*;

#[function_component(Home)]
pub fn home() -> Html {
    html! {
        <div class="flex flex-col justify-center gap-12 px-8 py-16 max-w-3xl">
            <h1 class="text-6xl font-bold">{"Find Real Estate & Get Your Dream Place"}</h1>
            <p class="text-gray-600">
                {"Browse listings, talk to agents and keep your profile up to date."}
            </p>
        </div>
    }
}
