use anyhow::Result;
use servicehub::adapters::auth::{DEMO_CLIENT_EMAIL, DEMO_PASSWORD, DEMO_PROVIDER_EMAIL};
use servicehub::core::navigation::{is_reachable, routes_for, RouteParams};
use servicehub::domain::model::{Category, Role};
use servicehub::utils::error::ErrorCategory;
use servicehub::{InMemoryAuthBackend, NavState, Navigator, Screen, Session};

#[test]
fn test_provider_tab_roots() {
    let state = NavState::resolve(false, true, Some(Role::Provider));
    let routes = routes_for(state);
    assert_eq!(
        routes.tabs,
        &[
            Screen::ProviderHome,
            Screen::ProviderOrders,
            Screen::ProviderProfile
        ]
    );
    assert!(!is_reachable(state, Screen::Login));
    assert!(!is_reachable(state, Screen::Register));
    assert!(!is_reachable(state, Screen::Home));
}

#[test]
fn test_client_tab_roots() {
    let routes = routes_for(NavState::Client);
    assert_eq!(
        routes.tabs,
        &[
            Screen::Home,
            Screen::NearbyServices,
            Screen::Orders,
            Screen::Profile
        ]
    );
    assert!(routes.contains(Screen::ServiceDetails));
    assert!(!routes.contains(Screen::Earnings));
}

#[test]
fn test_signed_out_only_sees_auth_screens() {
    let routes = routes_for(NavState::Unauthenticated);
    let screens: Vec<Screen> = routes.screens().collect();
    assert_eq!(screens, vec![Screen::Login, Screen::Register]);
    assert!(routes.tabs.is_empty());
}

#[test]
fn test_navigator_blocks_other_roles_screens() {
    let mut nav = Navigator::new(NavState::Client);
    let err = nav
        .navigate(Screen::Earnings, RouteParams::None)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(nav.current().unwrap().screen, Screen::Home);
}

#[test]
fn test_navigator_rejects_mismatched_params() {
    let mut nav = Navigator::new(NavState::Client);

    let err = nav
        .navigate(Screen::ServiceDetails, RouteParams::None)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);

    let err = nav
        .navigate(
            Screen::Home,
            RouteParams::Services {
                category: Some(Category::Painting),
            },
        )
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);

    assert_eq!(nav.depth(), 1);
    assert_eq!(nav.current().unwrap().screen, Screen::Home);
}

#[test]
fn test_tab_switch_resets_stack() -> Result<()> {
    let mut nav = Navigator::new(NavState::Client);
    nav.navigate(
        Screen::Services,
        RouteParams::Services {
            category: Some(Category::Plumbing),
        },
    )?;
    nav.navigate(
        Screen::ServiceDetails,
        RouteParams::ServiceDetails {
            listing_id: "1".to_string(),
        },
    )?;
    assert_eq!(nav.depth(), 3);

    nav.navigate(Screen::Orders, RouteParams::None)?;
    assert_eq!(nav.depth(), 1);
    assert_eq!(nav.current().unwrap().screen, Screen::Orders);
    Ok(())
}

#[tokio::test]
async fn test_session_transitions_reset_navigation() -> Result<()> {
    let mut session = Session::new(InMemoryAuthBackend::with_demo_accounts());
    let mut nav = Navigator::new(session.nav_state());
    assert_eq!(nav.current().unwrap().screen, Screen::Login);

    session.login(DEMO_PROVIDER_EMAIL, DEMO_PASSWORD).await?;
    nav.sync(session.nav_state());
    assert_eq!(nav.current().unwrap().screen, Screen::ProviderHome);
    assert!(nav.navigate(Screen::Login, RouteParams::None).is_err());

    session.logout();
    nav.sync(session.nav_state());
    assert_eq!(nav.current().unwrap().screen, Screen::Login);

    session.login(DEMO_CLIENT_EMAIL, DEMO_PASSWORD).await?;
    nav.sync(session.nav_state());
    assert_eq!(nav.state(), NavState::Client);
    assert_eq!(nav.current().unwrap().screen, Screen::Home);
    Ok(())
}
