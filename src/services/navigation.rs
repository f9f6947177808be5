use yew_router::history::{AnyHistory, History};

use crate::Route;

pub trait Navigator {
    fn navigate(&self, route: Route);
}

impl Navigator for AnyHistory {
    fn navigate(&self, route: Route) {
        self.push(route);
    }
}

/// Outside a router there is nowhere to go; the request is logged and dropped.
impl<N: Navigator> Navigator for Option<N> {
    fn navigate(&self, route: Route) {
        match self {
            Some(navigator) => navigator.navigate(route),
            None => log::warn!("no router available, staying put instead of {:?}", route),
        }
    }
}
