//! Role-gated navigation.
//!
//! Every screen a user may see is decided by a single table keyed on
//! [`NavState`]. Tab navigators and stack navigators both read from it, so the
//! client and provider variants cannot drift apart.

use crate::domain::model::{Category, Role};
use crate::utils::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Login,
    Register,
    Home,
    NearbyServices,
    Orders,
    Profile,
    ProviderHome,
    ProviderOrders,
    ProviderProfile,
    ServiceDetails,
    Services,
    EditProfile,
    Addresses,
    PaymentMethods,
    Notifications,
    Settings,
    ProviderServices,
    WorkSchedule,
    Earnings,
}

impl Screen {
    /// Tab bar title and icon; `None` for screens that never sit in a tab bar.
    pub fn tab_item(self) -> Option<(&'static str, &'static str)> {
        match self {
            Screen::Home | Screen::ProviderHome => Some(("Inicio", "home")),
            Screen::NearbyServices => Some(("Cercanos", "location-on")),
            Screen::Orders | Screen::ProviderOrders => Some(("Pedidos", "receipt")),
            Screen::Profile | Screen::ProviderProfile => Some(("Perfil", "person")),
            _ => None,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavState {
    /// Session restore in progress; nothing is rendered.
    Loading,
    Unauthenticated,
    Client,
    Provider,
}

impl NavState {
    pub fn resolve(is_loading: bool, is_authenticated: bool, role: Option<Role>) -> Self {
        match (is_loading, is_authenticated, role) {
            (true, _, _) => NavState::Loading,
            (false, true, Some(Role::Client)) => NavState::Client,
            (false, true, Some(Role::Provider)) => NavState::Provider,
            // authenticated without a role is treated as signed out
            (false, _, _) => NavState::Unauthenticated,
        }
    }
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavState::Loading => f.write_str("loading"),
            NavState::Unauthenticated => f.write_str("signed out"),
            NavState::Client => f.write_str("signed in as client"),
            NavState::Provider => f.write_str("signed in as provider"),
        }
    }
}

#[derive(Debug)]
pub struct RouteSet {
    pub initial: Option<Screen>,
    pub tabs: &'static [Screen],
    pub stack: &'static [Screen],
}

impl RouteSet {
    pub fn contains(&self, screen: Screen) -> bool {
        self.tabs.contains(&screen) || self.stack.contains(&screen)
    }

    pub fn screens(&self) -> impl Iterator<Item = Screen> + '_ {
        self.tabs.iter().chain(self.stack.iter()).copied()
    }
}

pub static ROUTE_TABLE: [(NavState, RouteSet); 4] = [
    (
        NavState::Loading,
        RouteSet {
            initial: None,
            tabs: &[],
            stack: &[],
        },
    ),
    (
        NavState::Unauthenticated,
        RouteSet {
            initial: Some(Screen::Login),
            tabs: &[],
            stack: &[Screen::Login, Screen::Register],
        },
    ),
    (
        NavState::Client,
        RouteSet {
            initial: Some(Screen::Home),
            tabs: &[
                Screen::Home,
                Screen::NearbyServices,
                Screen::Orders,
                Screen::Profile,
            ],
            stack: &[
                Screen::ServiceDetails,
                Screen::Services,
                Screen::EditProfile,
                Screen::Addresses,
                Screen::PaymentMethods,
                Screen::Notifications,
                Screen::Settings,
            ],
        },
    ),
    (
        NavState::Provider,
        RouteSet {
            initial: Some(Screen::ProviderHome),
            tabs: &[
                Screen::ProviderHome,
                Screen::ProviderOrders,
                Screen::ProviderProfile,
            ],
            stack: &[
                Screen::ServiceDetails,
                Screen::EditProfile,
                Screen::Addresses,
                Screen::PaymentMethods,
                Screen::Notifications,
                Screen::Settings,
                Screen::ProviderServices,
                Screen::WorkSchedule,
                Screen::Earnings,
            ],
        },
    ),
];

pub fn routes_for(state: NavState) -> &'static RouteSet {
    ROUTE_TABLE
        .iter()
        .find(|(s, _)| *s == state)
        .map(|(_, routes)| routes)
        .unwrap_or(&ROUTE_TABLE[0].1)
}

pub fn is_reachable(state: NavState, screen: Screen) -> bool {
    routes_for(state).contains(screen)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RouteParams {
    None,
    ServiceDetails { listing_id: String },
    Services { category: Option<Category> },
}

impl RouteParams {
    /// Detail screens need their own params; every other screen takes none.
    pub fn fits(&self, screen: Screen) -> bool {
        match (screen, self) {
            (Screen::ServiceDetails, RouteParams::ServiceDetails { listing_id }) => {
                !listing_id.trim().is_empty()
            }
            (Screen::Services, RouteParams::Services { .. }) => true,
            (Screen::ServiceDetails | Screen::Services, _) => false,
            (_, RouteParams::None) => true,
            (_, _) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub screen: Screen,
    pub params: RouteParams,
}

/// Navigation host holding the current route stack.
#[derive(Debug)]
pub struct Navigator {
    state: NavState,
    stack: Vec<Route>,
}

impl Navigator {
    pub fn new(state: NavState) -> Self {
        let mut navigator = Self {
            state,
            stack: Vec::new(),
        };
        navigator.reset();
        navigator
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn current(&self) -> Option<&Route> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Applies a session transition. A changed state discards the stack.
    pub fn sync(&mut self, state: NavState) {
        if state != self.state {
            tracing::debug!("Navigation state {} -> {}", self.state, state);
            self.state = state;
            self.reset();
        }
    }

    pub fn navigate(&mut self, screen: Screen, params: RouteParams) -> Result<()> {
        if !is_reachable(self.state, screen) {
            tracing::warn!("Blocked navigation to {} while {}", screen, self.state);
            return Err(MarketError::RouteUnavailable {
                screen: screen.to_string(),
                state: self.state.to_string(),
            });
        }
        if !params.fits(screen) {
            return Err(MarketError::validation(format!(
                "{} cannot be opened with {:?}",
                screen, params
            )));
        }

        let routes = routes_for(self.state);
        if routes.tabs.contains(&screen) {
            // switching tabs replaces the whole stack with the tab root
            self.stack.clear();
        }
        self.stack.push(Route { screen, params });
        Ok(())
    }

    pub fn go_back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        if let Some(initial) = routes_for(self.state).initial {
            self.stack.push(Route {
                screen: initial,
                params: RouteParams::None,
            });
        }
    }
}
