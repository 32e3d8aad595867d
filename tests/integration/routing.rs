//! Component lifecycle and route resolution scenarios.
//!
//! Builds a small application shell - a frame component delegating to pages -
//! and drives it through the public API: construct, attach, navigate, detach,
//! re-attach.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use weft::component::{
    Component, ComponentBuilder, ComponentClass, ComponentHandle, Options, RouteOutcome,
};
use weft::routing::{Route, RouteContext, Router, resolve_route};

/// Application frame: routes the first segment to a named page component.
struct Frame {
    pages: Mutex<Vec<(String, ComponentHandle)>>,
    active: Mutex<Route>,
}

impl Frame {
    fn new() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
            active: Mutex::new(Route::root()),
        }
    }
}

#[async_trait]
impl Component for Frame {
    async fn on_route(&self, segment: &str, _is_initial: bool) -> anyhow::Result<RouteOutcome> {
        let pages = self.pages.lock().unwrap();
        match pages.iter().find(|(name, _)| name == segment) {
            Some((name, page)) => {
                *self.active.lock().unwrap() = Route::parse(name);
                Ok(RouteOutcome::Child(page.clone()))
            }
            None => Ok(RouteOutcome::Reject),
        }
    }

    fn internal_route(&self) -> Route {
        self.active.lock().unwrap().clone()
    }
}

/// Leaf page claiming a set of detail segments.
struct Page {
    details: Vec<String>,
    current: Mutex<Route>,
    route_calls: AtomicUsize,
}

impl Page {
    fn new(details: &[&str]) -> Self {
        Self {
            details: details.iter().map(|d| (*d).to_string()).collect(),
            current: Mutex::new(Route::root()),
            route_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Component for Page {
    async fn on_route(&self, segment: &str, _is_initial: bool) -> anyhow::Result<RouteOutcome> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        if segment.is_empty() || self.details.iter().any(|d| d == segment) {
            *self.current.lock().unwrap() = Route::parse(segment);
            Ok(RouteOutcome::Consume)
        } else {
            Ok(RouteOutcome::Reject)
        }
    }

    fn internal_route(&self) -> Route {
        self.current.lock().unwrap().clone()
    }
}

async fn cell(name: &str, behavior: Arc<dyn Component>) -> ComponentHandle {
    let class = ComponentClass::builder(name).build().unwrap();
    let cell = ComponentBuilder::new(class, behavior).build();
    cell.construct(Options::new(), &[]).await.unwrap();
    cell
}

/// Builds the frame with a settings page (accepting "profile") and wires the
/// page under the frame.
async fn app() -> (ComponentHandle, ComponentHandle, Arc<Page>) {
    let frame = Arc::new(Frame::new());
    let page = Arc::new(Page::new(&["profile"]));

    let page_cell = cell("SettingsPage", Arc::clone(&page) as Arc<dyn Component>).await;
    frame.pages.lock().unwrap().push(("settings".to_string(), Arc::clone(&page_cell)));

    let frame_cell = cell("Frame", frame as Arc<dyn Component>).await;
    frame_cell.attach(None).await;
    page_cell.attach(Some(&frame_cell)).await;

    (frame_cell, page_cell, page)
}

#[tokio::test]
async fn deep_route_accepted_end_to_end() {
    let (frame_cell, _, _) = app().await;

    let accepted =
        resolve_route(&frame_cell, Route::parse("settings/profile"), &RouteContext::default())
            .await
            .unwrap();
    assert_eq!(accepted, Route::parse("settings/profile"));
}

#[tokio::test]
async fn rejected_tail_truncates_accepted_route() {
    let (frame_cell, _, _) = app().await;

    let accepted =
        resolve_route(&frame_cell, Route::parse("settings/unknown"), &RouteContext::default())
            .await
            .unwrap();
    assert_eq!(accepted, Route::parse("settings"), "deeper rejection yields a strict prefix");
}

#[tokio::test]
async fn unknown_page_rejects_whole_route() {
    let (frame_cell, _, _) = app().await;

    let accepted =
        resolve_route(&frame_cell, Route::parse("missing/whatever"), &RouteContext::default())
            .await
            .unwrap();
    assert_eq!(accepted, Route::root());
}

#[tokio::test]
async fn router_coordinates_navigation_and_cross_check() {
    let (frame_cell, _, _) = app().await;

    let router = Router::default();
    router.set_content(frame_cell);

    let accepted = router.navigate(Route::parse("/settings")).await.unwrap();
    assert_eq!(accepted, Route::parse("settings"));
    assert_eq!(router.current_route(), Route::parse("settings"));
}

#[tokio::test]
async fn lifecycle_and_routing_survive_reattachment() {
    let (frame_cell, page_cell, page) = app().await;

    resolve_route(&frame_cell, Route::parse("settings/profile"), &RouteContext::default())
        .await
        .unwrap();
    let calls_after_first = page.route_calls.load(Ordering::SeqCst);

    // identical navigation while mounted: the page's idempotence guard
    // prevents its hook from running again
    resolve_route(&frame_cell, Route::parse("settings/profile"), &RouteContext::default())
        .await
        .unwrap();
    assert_eq!(page.route_calls.load(Ordering::SeqCst), calls_after_first);

    // detach re-arms routing: the same route resolves afresh after re-attach
    frame_cell.detach();
    page_cell.detach();
    frame_cell.attach(None).await;
    page_cell.attach(Some(&frame_cell)).await;
    resolve_route(&frame_cell, Route::parse("settings/profile"), &RouteContext::default())
        .await
        .unwrap();
    assert!(page.route_calls.load(Ordering::SeqCst) > calls_after_first);
}
