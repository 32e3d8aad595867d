//! Recursive route-segment delegation over a component tree.
//!
//! [`resolve_route`] walks a component tree asking each node to claim one
//! path segment. A component may appoint a delegate to own the claiming
//! logic; without one it delegates to itself. The accepted route is
//! reconstructed segment by segment on the way back up, so it can end up a
//! strict prefix of the requested route when a deeper component rejects part
//! of it.

use futures::future::BoxFuture;

use crate::component::{ComponentHandle, RouteOutcome};

use super::route::Route;

/// Ambient information threaded through a route resolution.
///
/// Carries request-level context the component tree may want while claiming
/// segments; it is passed through recursion unchanged.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    /// The full route originally requested, before any segments were consumed.
    pub requested: Route,
    /// The referrer the navigation originated from, if known.
    pub referrer: Option<String>,
}

impl RouteContext {
    /// Creates a context for a requested route.
    #[must_use]
    pub fn new(requested: Route) -> Self {
        Self {
            requested,
            referrer: None,
        }
    }
}

/// Resolves `route` against `component`, returning the accepted route.
///
/// Per call:
/// 1. **Idempotence guard** - when routing is already initialized for this
///    instance and the requested route structurally equals the delegate's
///    current internal route, the call is a no-op returning the route
///    unchanged.
/// 2. The first segment is popped and offered to the delegate's `on_route`
///    hook with an `is_initial` flag that is `true` only on the first routing
///    call for this instance.
/// 3. The hook rejects the segment (accepted route is empty), consumes it, or
///    redirects to a child - which is focused when it exposes a focus
///    operation, and recursed into when segments remain.
///
/// # Errors
///
/// Propagates errors thrown by `on_route` hooks.
pub fn resolve_route<'a>(
    component: &'a ComponentHandle,
    route: Route,
    context: &'a RouteContext,
) -> BoxFuture<'a, anyhow::Result<Route>> {
    Box::pin(async move {
        let delegate = component.route_delegate().unwrap_or_else(|| component.clone());

        // ignore if the route is already up to date
        if component.is_route_initialized() && route == delegate.internal_route() {
            return Ok(route);
        }
        let is_initial = component.mark_route_initialized();

        let segment = route.first().unwrap_or_default().to_string();
        let outcome = delegate.behavior().on_route(&segment, is_initial).await?;

        let child = match outcome {
            RouteOutcome::Reject => return Ok(Route::root()),
            RouteOutcome::Consume => None,
            RouteOutcome::Child(child) => {
                if child.behavior().focusable() {
                    child.focus();
                }
                Some(child)
            }
        };

        match child {
            // remaining segments continue in the child; the accepted route is
            // the consumed segment plus whatever the child accepted
            Some(child) if route.len() > 1 => {
                let child_route = resolve_route(&child, route.rest(), context).await?;
                Ok(child_route.prepended(segment))
            }
            // end of route reached or handled here without redirection
            _ => Ok(route),
        }
    })
}
