//! Client-side routing: route representation, resolution, and coordination.
//!
//! # Modules
//!
//! - [`route`] - the [`Route`] segment sequence and its structural equality
//! - [`resolver`] - [`resolve_route`], the recursive segment delegation walk
//! - [`Router`] - the coordinator tying the current route, the component
//!   tree, and the address bar together
//!
//! # Consistency cross-check
//!
//! After content is resolved for a requested route, the component tree's
//! self-reported internal route must agree with the route that was accepted.
//! [`Router::update`] asserts exactly that: on disagreement it surfaces a
//! warning and signals the loading indicator to stop - the equivalent of
//! aborting an in-flight navigation. The disagreement is not fatal; in-flight
//! `on_route` calls are not forcibly cancelled.

pub mod resolver;
pub mod route;

use std::sync::Mutex;

use crate::component::ComponentHandle;

pub use resolver::{RouteContext, resolve_route};
pub use route::Route;

/// Address-bar collaborator: receives route changes to record in history.
pub trait HistorySink: Send + Sync {
    /// Records a new route in the navigation history.
    fn push(&self, route: &Route);
}

/// Navigation loading UI collaborator.
pub trait LoadingIndicator: Send + Sync {
    /// Stops an in-flight loading animation.
    fn stop(&self);
}

/// No-op history sink for headless and test environments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHistory;

impl HistorySink for NoopHistory {
    fn push(&self, _route: &Route) {}
}

/// No-op loading indicator for headless and test environments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl LoadingIndicator for NoopIndicator {
    fn stop(&self) {}
}

/// Coordinates the current route, the component tree, and the address bar.
///
/// The router owns the "current route" state and performs the
/// internal-route consistency cross-check after navigations. Rendering and
/// entrypoint content resolution are collaborators outside this crate.
pub struct Router {
    content: Mutex<Option<ComponentHandle>>,
    current: Mutex<Route>,
    history: Box<dyn HistorySink>,
    indicator: Box<dyn LoadingIndicator>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Box::new(NoopHistory), Box::new(NoopIndicator))
    }
}

impl Router {
    /// Creates a router with the given collaborators.
    #[must_use]
    pub fn new(history: Box<dyn HistorySink>, indicator: Box<dyn LoadingIndicator>) -> Self {
        Self {
            content: Mutex::new(None),
            current: Mutex::new(Route::root()),
            history,
            indicator,
        }
    }

    /// Installs the root component the router resolves routes against.
    pub fn set_content(&self, content: ComponentHandle) {
        *self.content.lock().expect("content lock poisoned") = Some(content);
    }

    /// The route the router currently considers active.
    #[must_use]
    pub fn current_route(&self) -> Route {
        self.current.lock().expect("route lock poisoned").clone()
    }

    /// Sets the current route, recording it in history. Structurally equal
    /// routes are a no-op. Unless `silent`, the route is resolved against the
    /// content tree and cross-checked.
    ///
    /// # Errors
    ///
    /// Propagates `on_route` hook errors from the resolution pass.
    pub async fn set_current_route(&self, route: Route, silent: bool) -> anyhow::Result<()> {
        {
            let mut current = self.current.lock().expect("route lock poisoned");
            if *current == route {
                // no change, ignore
                return Ok(());
            }
            *current = route.clone();
        }
        self.history.push(&route);

        if silent {
            return Ok(());
        }
        self.navigate(route).await.map(|_| ())
    }

    /// Resolves `route` against the content tree, cross-checks the outcome,
    /// and returns the accepted route.
    ///
    /// # Errors
    ///
    /// Propagates `on_route` hook errors.
    pub async fn navigate(&self, route: Route) -> anyhow::Result<Route> {
        let Some(content) = self.content.lock().expect("content lock poisoned").clone() else {
            return Ok(route);
        };
        let context = RouteContext::new(route.clone());
        let accepted = resolve_route(&content, route, &context).await?;
        self.update(Some(&accepted));
        Ok(accepted)
    }

    /// Cross-checks the content tree's internal route against `compare` and
    /// silently aligns the address bar with whatever the tree settled on.
    ///
    /// On disagreement a warning is surfaced and the loading indicator is
    /// told to stop; the navigation itself is not aborted.
    pub fn update(&self, compare: Option<&Route>) {
        let Some(content) = self.content.lock().expect("content lock poisoned").clone() else {
            return;
        };
        let internal = content.internal_route();

        if let Some(compare) = compare
            && *compare != internal
        {
            tracing::warn!(
                "new route should be \"{}\", but was changed to \"{}\". Make sure \
                 internal_route() and on_route() are consistent in all components.",
                compare.routename(),
                internal.routename()
            );
            self.indicator.stop();
        }

        // update silently
        let mut current = self.current.lock().expect("route lock poisoned");
        if *current != internal {
            *current = internal.clone();
            self.history.push(&internal);
        }

        tracing::debug!("new route: {}", current.routename());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{
        Component, ComponentBuilder, ComponentClass, Options, RouteOutcome,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct RecordingHistory(Arc<Mutex<Vec<Route>>>);

    impl HistorySink for RecordingHistory {
        fn push(&self, route: &Route) {
            self.0.lock().unwrap().push(route.clone());
        }
    }

    #[derive(Clone, Default)]
    struct CountingIndicator(Arc<AtomicUsize>);

    impl LoadingIndicator for CountingIndicator {
        fn stop(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Accepts every segment and reports a fixed internal route.
    struct FixedRoute(Route);

    #[async_trait]
    impl Component for FixedRoute {
        async fn on_route(&self, _segment: &str, _initial: bool) -> anyhow::Result<RouteOutcome> {
            Ok(RouteOutcome::Consume)
        }

        fn internal_route(&self) -> Route {
            self.0.clone()
        }
    }

    async fn fixed_cell(route: &str) -> ComponentHandle {
        let class = ComponentClass::builder("Fixed").build().unwrap();
        let cell =
            ComponentBuilder::new(class, Arc::new(FixedRoute(Route::parse(route)))).build();
        cell.construct(Options::new(), &[]).await.unwrap();
        cell
    }

    #[tokio::test]
    async fn equal_route_is_a_no_op() {
        let history = RecordingHistory::default();
        let router = Router::new(Box::new(history.clone()), Box::new(NoopIndicator));

        router.set_current_route(Route::parse("/a"), true).await.unwrap();
        router.set_current_route(Route::parse("a/"), true).await.unwrap();

        // one push: the second call was structurally equal
        assert_eq!(history.0.lock().unwrap().len(), 1);
        assert_eq!(router.current_route(), Route::parse("a"));
    }

    #[tokio::test]
    async fn matching_internal_route_passes_cross_check() {
        let indicator = CountingIndicator::default();
        let router = Router::new(Box::new(NoopHistory), Box::new(indicator.clone()));
        router.set_content(fixed_cell("a").await);

        let accepted = router.navigate(Route::parse("a")).await.unwrap();
        assert_eq!(accepted, Route::parse("a"));
        assert_eq!(indicator.0.load(Ordering::SeqCst), 0, "no mismatch, no stop signal");
    }

    #[tokio::test]
    async fn mismatching_internal_route_stops_loading() {
        let indicator = CountingIndicator::default();
        let router = Router::new(Box::new(NoopHistory), Box::new(indicator.clone()));
        // the tree claims the route but reports a different internal route
        router.set_content(fixed_cell("somewhere/else").await);

        let accepted = router.navigate(Route::parse("a")).await.unwrap();
        assert_eq!(accepted, Route::parse("a"));
        assert_eq!(indicator.0.load(Ordering::SeqCst), 1, "mismatch stops the indicator");
        // the address bar follows what the tree settled on
        assert_eq!(router.current_route(), Route::parse("somewhere/else"));
    }
}
