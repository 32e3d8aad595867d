//! Component model: capability trait, lifecycle state machine, class registry.
//!
//! A component couples author-supplied behavior (the [`Component`] trait) with
//! framework-owned lifecycle state (the [`ComponentCell`]). The cell drives a
//! per-instance state machine:
//!
//! ```text
//! constructing → constructed → (created) → anchored ⇄ detached
//! ```
//!
//! with `skeleton` as an orthogonal flag meaning "present as pre-rendered
//! markup, not yet upgraded to a live instance".
//!
//! # Lifecycle gates
//!
//! Three [`Gate`]s make lifecycle progress awaitable:
//! - `constructed` - promoted once, after `construct`/`replicate` finishes
//! - `created` - promoted once, after the first successful attach
//! - `anchored` - promoted on every attach, re-armed on every detach
//!
//! # Hooks
//!
//! All hooks are optional capabilities with default no-op implementations.
//! Exceptions from `on_create` and `on_anchor` are caught and logged -
//! attachment is never blocked on a user hook's bug. Contract failures from
//! class resource loading, by contrast, abort construction loudly.
//!
//! # Construction entry points
//!
//! - [`ComponentCell::construct`] - fresh instantiation; harvests markup
//!   attributes (JSON-parsed with raw-string fallback) merged under
//!   programmatic options and class defaults
//! - [`ComponentCell::replicate`] - restore from previously serialized state;
//!   skips attribute harvesting
//! - [`ComponentCell::unskeletonize`] - upgrade pre-rendered markup to a live
//!   instance via the replicate path
//!
//! Both entry points converge on a shared `init` routine: class styles,
//! layout hook, declared property bindings, class resource loading (lazy,
//! once per class), then `on_construct`/`on_init`.

pub mod gate;
pub mod options;
pub mod registry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use async_trait::async_trait;

use crate::resolver::{DefaultLoader, ModuleLoader};
use crate::routing::route::Route;
use crate::routing::RouteContext;

pub use gate::{Gate, GateWait};
pub use options::Options;
pub use registry::{
    ComponentClass, ComponentClassBuilder, ImportBinding, PropDecl, PropKind, ResourceBindings,
    StandaloneRegistry,
};

/// Shared handle to a live component instance.
pub type ComponentHandle = Arc<ComponentCell>;

/// What a component's `on_route` hook decided about a path segment.
#[derive(Default)]
pub enum RouteOutcome {
    /// The segment is rejected; route resolution stops with an empty
    /// accepted route.
    Reject,
    /// The segment is accepted and handled here; no child redirection.
    #[default]
    Consume,
    /// The segment is accepted and resolution continues in a child.
    Child(ComponentHandle),
}

/// Author-supplied component behavior.
///
/// Every hook is optional: the defaults do nothing, accept every route
/// segment, and report the root internal route. Implementations declare the
/// capabilities they actually use by overriding the corresponding methods.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Called during fresh construction, after options are assembled.
    async fn on_construct(&self, _options: &Options) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after construction and `init` completed.
    async fn on_constructed(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after construction or replication, before any attachment.
    async fn on_init(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called exactly once per instance, on the first attach.
    async fn on_create(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called on every attach.
    async fn on_anchor(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called on attach in non-headless (browser) contexts only.
    async fn on_display(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after the component is removed from the tree.
    fn on_remove(&self) {}

    /// Layout-customization hook, called during `init`.
    fn on_create_layout(&self) {}

    /// Claims or rejects a route segment. `is_initial` is `true` only on the
    /// very first routing call for this instance.
    async fn on_route(&self, _segment: &str, _is_initial: bool) -> anyhow::Result<RouteOutcome> {
        Ok(RouteOutcome::Consume)
    }

    /// The component's current internal route.
    fn internal_route(&self) -> Route {
        Route::root()
    }

    /// Whether the component exposes a focus operation.
    fn focusable(&self) -> bool {
        false
    }

    /// Brings the component to the foreground.
    fn on_focus(&self) {}

    /// Called on a parent when a child component is attached under it.
    fn on_child_added(&self, _child: &ComponentHandle) {}

    /// Called on a parent when a child component is detached.
    fn on_child_removed(&self, _child: &ComponentHandle) {}

    /// Called on a parent when a child component is focused.
    fn on_child_focused(&self, _child: &ComponentHandle) {}
}

/// Builder for [`ComponentCell`].
pub struct ComponentBuilder {
    class: Arc<ComponentClass>,
    behavior: Arc<dyn Component>,
    loader: Arc<dyn ModuleLoader>,
    headless: bool,
    skeleton: bool,
}

impl ComponentBuilder {
    /// Starts building a cell for the given class and behavior.
    #[must_use]
    pub fn new(class: Arc<ComponentClass>, behavior: Arc<dyn Component>) -> Self {
        Self {
            class,
            behavior,
            loader: Arc::new(DefaultLoader::new()),
            headless: true,
            skeleton: false,
        }
    }

    /// Replaces the module loader used for class styles and resources.
    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Marks the environment as browser-like; `on_display` fires on attach.
    #[must_use]
    pub fn displayed(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Starts the cell in skeleton state (pre-rendered markup awaiting
    /// hydration).
    #[must_use]
    pub fn skeleton(mut self) -> Self {
        self.skeleton = true;
        self
    }

    /// Builds the cell. No lifecycle runs yet - call
    /// [`ComponentCell::construct`] or [`ComponentCell::replicate`].
    #[must_use]
    pub fn build(self) -> ComponentHandle {
        Arc::new_cyclic(|me| ComponentCell {
            me: me.clone(),
            class: self.class,
            behavior: self.behavior,
            loader: self.loader,
            headless: self.headless,
            skeleton: AtomicBool::new(self.skeleton),
            created: AtomicBool::new(false),
            route_initialized: AtomicBool::new(false),
            constructed_gate: Gate::new(),
            created_gate: Gate::new(),
            anchored_gate: Gate::new(),
            options: Mutex::new(Options::new()),
            imports: OnceLock::new(),
            parent: Mutex::new(Weak::new()),
            children: Mutex::new(Vec::new()),
            route_delegate: Mutex::new(None),
        })
    }
}

/// A live component instance: behavior plus lifecycle state.
pub struct ComponentCell {
    me: Weak<ComponentCell>,
    class: Arc<ComponentClass>,
    behavior: Arc<dyn Component>,
    loader: Arc<dyn ModuleLoader>,
    headless: bool,

    skeleton: AtomicBool,
    created: AtomicBool,
    route_initialized: AtomicBool,

    constructed_gate: Gate,
    created_gate: Gate,
    anchored_gate: Gate,

    options: Mutex<Options>,
    imports: OnceLock<Arc<ResourceBindings>>,

    parent: Mutex<Weak<ComponentCell>>,
    children: Mutex<Vec<ComponentHandle>>,
    route_delegate: Mutex<Option<ComponentHandle>>,
}

impl ComponentCell {
    /// A strong handle to this cell.
    ///
    /// Cells only ever live inside an `Arc` (see [`ComponentBuilder::build`]),
    /// so the self reference is always upgradable while a method runs.
    fn handle(&self) -> ComponentHandle {
        self.me.upgrade().expect("component cell is always owned by an Arc")
    }

    /// The component's class metadata.
    #[must_use]
    pub fn class(&self) -> &Arc<ComponentClass> {
        &self.class
    }

    /// The author-supplied behavior.
    #[must_use]
    pub fn behavior(&self) -> &Arc<dyn Component> {
        &self.behavior
    }

    /// Snapshot of the instance options.
    #[must_use]
    pub fn options(&self) -> Options {
        self.options.lock().expect("options lock poisoned").clone()
    }

    /// Values bound from the class's resource modules, available after a
    /// successful `construct`/`replicate`.
    #[must_use]
    pub fn imports(&self) -> Option<&Arc<ResourceBindings>> {
        self.imports.get()
    }

    /// Whether the component is still pre-rendered markup.
    #[must_use]
    pub fn is_skeleton(&self) -> bool {
        self.skeleton.load(Ordering::SeqCst)
    }

    /// Whether `on_create` has run for this instance.
    #[must_use]
    pub fn was_created(&self) -> bool {
        self.created.load(Ordering::SeqCst)
    }

    /// Gate promoted once construction finished.
    #[must_use]
    pub fn constructed(&self) -> &Gate {
        &self.constructed_gate
    }

    /// Gate promoted once the first attach completed.
    #[must_use]
    pub fn created(&self) -> &Gate {
        &self.created_gate
    }

    /// Gate promoted on every attach, re-armed on every detach.
    #[must_use]
    pub fn anchored(&self) -> &Gate {
        &self.anchored_gate
    }

    /// The current parent component, if attached under one.
    #[must_use]
    pub fn parent(&self) -> Option<ComponentHandle> {
        self.parent.lock().expect("parent lock poisoned").upgrade()
    }

    /// Snapshot of the attached child components.
    #[must_use]
    pub fn children(&self) -> Vec<ComponentHandle> {
        self.children.lock().expect("children lock poisoned").clone()
    }

    /// Appoints another component to own route-claiming for this one.
    pub fn set_route_delegate(&self, delegate: Option<ComponentHandle>) {
        *self.route_delegate.lock().expect("delegate lock poisoned") = delegate;
    }

    /// The appointed route delegate, if any.
    #[must_use]
    pub fn route_delegate(&self) -> Option<ComponentHandle> {
        self.route_delegate.lock().expect("delegate lock poisoned").clone()
    }

    /// The component's current internal route, as reported by its behavior.
    #[must_use]
    pub fn internal_route(&self) -> Route {
        self.behavior.internal_route()
    }

    /// Whether routing has been initialized for this instance.
    #[must_use]
    pub fn is_route_initialized(&self) -> bool {
        self.route_initialized.load(Ordering::SeqCst)
    }

    /// Marks routing as initialized. Returns `true` when this call did the
    /// transition, i.e. the next `on_route` is the initial one.
    pub fn mark_route_initialized(&self) -> bool {
        !self.route_initialized.swap(true, Ordering::SeqCst)
    }

    /// Fresh instantiation: assembles options from markup attributes and
    /// class defaults, runs `init`, fires `on_constructed`, and promotes the
    /// `constructed` gate exactly once.
    ///
    /// # Errors
    ///
    /// Propagates class resource contract failures and errors from
    /// `on_construct`/`on_init`/`on_constructed`.
    pub async fn construct(
        &self,
        options: Options,
        attributes: &[(&str, &str)],
    ) -> anyhow::Result<()> {
        let mut options = options;
        options.apply_attributes(attributes.iter().copied());
        options.merge_defaults(self.class.default_options());
        *self.options.lock().expect("options lock poisoned") = options;

        self.init(true).await?;
        self.behavior.on_constructed().await?;
        self.constructed_gate.promote();
        Ok(())
    }

    /// Restores from previously serialized state: runs `init` without
    /// attribute harvesting and promotes the `constructed` gate.
    ///
    /// # Errors
    ///
    /// Propagates class resource contract failures and errors from
    /// `on_init`.
    pub async fn replicate(&self) -> anyhow::Result<()> {
        self.init(false).await?;
        self.constructed_gate.promote();
        Ok(())
    }

    /// Upgrades a skeleton into a live instance by running the replicate
    /// path. A no-op for components that are not skeletons.
    ///
    /// # Errors
    ///
    /// Propagates the replicate path's errors.
    pub async fn unskeletonize(&self) -> anyhow::Result<()> {
        if !self.skeleton.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.replicate().await
    }

    /// Shared initialization for both construction entry points.
    async fn init(&self, constructed: bool) -> anyhow::Result<()> {
        // per-class style resources; failures are logged, never fatal
        self.class.ensure_styles(self.loader.as_ref()).await;

        self.behavior.on_create_layout();

        // declared resource imports are a contract: failures abort loudly
        let bindings = self
            .class
            .ensure_resources(self.loader.as_ref())
            .await
            .map_err(|err| anyhow::anyhow!(err))?;
        let _ = self.imports.set(bindings);

        if constructed {
            let options = self.options();
            self.behavior.on_construct(&options).await?;
        }
        self.behavior.on_init().await?;
        Ok(())
    }

    /// Attaches the component under `parent` (or as a root when `None`).
    ///
    /// Skeletons ignore attachment entirely - hydration happens elsewhere.
    /// Otherwise the parent is notified, then the attach continuation awaits
    /// the `constructed` gate, runs `on_create` exactly once per instance
    /// lifetime, `on_anchor` on every attach, `on_display` in non-headless
    /// contexts, yields once so queued work settles, and finally promotes the
    /// `created` and `anchored` gates.
    ///
    /// Errors thrown by `on_create`, `on_anchor` or `on_display` are logged
    /// and do not abort the remaining lifecycle steps.
    pub async fn attach(&self, parent: Option<&ComponentHandle>) {
        if self.is_skeleton() {
            return;
        }

        if let Some(parent) = parent {
            let this = self.handle();
            *self.parent.lock().expect("parent lock poisoned") = Arc::downgrade(parent);
            {
                let mut children = parent.children.lock().expect("children lock poisoned");
                if !children.iter().any(|c| Arc::ptr_eq(c, &this)) {
                    children.push(Arc::clone(&this));
                }
            }
            parent.behavior.on_child_added(&this);
        }

        self.constructed_gate.wait().await;

        let first_create = !self.created.swap(true, Ordering::SeqCst);
        if first_create {
            if let Err(err) = self.behavior.on_create().await {
                tracing::error!("error calling on_create on component {}: {err:#}", self.class.name());
            }
        } else {
            self.created_gate.wait().await;
        }

        if let Err(err) = self.behavior.on_anchor().await {
            tracing::error!("error calling on_anchor on component {}: {err:#}", self.class.name());
        }

        if !self.headless
            && let Err(err) = self.behavior.on_display().await
        {
            tracing::error!("error calling on_display on component {}: {err:#}", self.class.name());
        }

        // let already-queued continuations settle before gates open
        tokio::task::yield_now().await;

        self.created_gate.promote();
        self.anchored_gate.promote();
    }

    /// Detaches the component: re-arms the `anchored` gate (the next route is
    /// treated as initial again), unlinks from the parent with a
    /// child-removed notification, and fires `on_remove`.
    pub fn detach(&self) {
        self.anchored_gate.rearm();
        self.route_initialized.store(false, Ordering::SeqCst);

        let parent = {
            let mut parent = self.parent.lock().expect("parent lock poisoned");
            std::mem::replace(&mut *parent, Weak::new()).upgrade()
        };
        if let Some(parent) = parent {
            let this = self.handle();
            parent
                .children
                .lock()
                .expect("children lock poisoned")
                .retain(|c| !Arc::ptr_eq(c, &this));
            parent.behavior.on_child_removed(&this);
        }

        self.behavior.on_remove();
    }

    /// Brings the component to the foreground and notifies the parent.
    pub fn focus(&self) {
        self.behavior.on_focus();
        if let Some(parent) = self.parent() {
            parent.behavior.on_child_focused(&self.handle());
        }
    }

    /// Resolves a route through this component's delegation chain. See
    /// [`crate::routing::resolve_route`].
    ///
    /// # Errors
    ///
    /// Propagates errors from `on_route` hooks.
    pub async fn resolve_route(
        &self,
        route: Route,
        context: &RouteContext,
    ) -> anyhow::Result<Route> {
        crate::routing::resolve_route(&self.handle(), route, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Probe {
        constructs: AtomicUsize,
        inits: AtomicUsize,
        creates: AtomicUsize,
        anchors: AtomicUsize,
        displays: AtomicUsize,
        removes: AtomicUsize,
        children_added: AtomicUsize,
        children_removed: AtomicUsize,
        fail_create: bool,
        fail_anchor: bool,
    }

    #[async_trait]
    impl Component for Probe {
        async fn on_construct(&self, _options: &Options) -> anyhow::Result<()> {
            self.constructs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_init(&self) -> anyhow::Result<()> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_create(&self) -> anyhow::Result<()> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                anyhow::bail!("boom in on_create");
            }
            Ok(())
        }

        async fn on_anchor(&self) -> anyhow::Result<()> {
            self.anchors.fetch_add(1, Ordering::SeqCst);
            if self.fail_anchor {
                anyhow::bail!("boom in on_anchor");
            }
            Ok(())
        }

        async fn on_display(&self) -> anyhow::Result<()> {
            self.displays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_remove(&self) {
            self.removes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_child_added(&self, _child: &ComponentHandle) {
            self.children_added.fetch_add(1, Ordering::SeqCst);
        }

        fn on_child_removed(&self, _child: &ComponentHandle) {
            self.children_removed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn probe_cell(probe: Arc<Probe>) -> ComponentHandle {
        let class = ComponentClass::builder("Probe").build().unwrap();
        ComponentBuilder::new(class, probe).build()
    }

    async fn constructed_cell(probe: Arc<Probe>) -> ComponentHandle {
        let cell = probe_cell(probe);
        cell.construct(Options::new(), &[]).await.unwrap();
        cell
    }

    #[tokio::test]
    async fn construct_harvests_attributes_with_json_fallback() {
        let probe = Arc::new(Probe::default());
        let cell = probe_cell(Arc::clone(&probe));
        let mut options = Options::new();
        options.insert("title", serde_json::json!("from code"));

        cell.construct(options, &[("count", "3"), ("title", "ignored")])
            .await
            .unwrap();
        let snapshot = cell.options();
        assert_eq!(snapshot.get("count"), Some(&serde_json::json!(3)));
        assert_eq!(snapshot.get("title"), Some(&serde_json::json!("from code")));
        assert_eq!(probe.constructs.load(Ordering::SeqCst), 1);
        assert_eq!(probe.inits.load(Ordering::SeqCst), 1);
        assert!(cell.constructed().is_promoted());
    }

    #[tokio::test]
    async fn replicate_skips_attribute_harvesting_and_on_construct() {
        let probe = Arc::new(Probe::default());
        let cell = probe_cell(Arc::clone(&probe));
        cell.replicate().await.unwrap();

        assert_eq!(probe.constructs.load(Ordering::SeqCst), 0);
        assert_eq!(probe.inits.load(Ordering::SeqCst), 1);
        assert!(cell.constructed().is_promoted());
    }

    #[tokio::test]
    async fn on_create_once_on_anchor_every_attach() {
        let probe = Arc::new(Probe::default());
        let cell = constructed_cell(Arc::clone(&probe)).await;

        cell.attach(None).await;
        cell.detach();
        cell.attach(None).await;
        cell.detach();
        cell.attach(None).await;

        assert_eq!(probe.creates.load(Ordering::SeqCst), 1, "on_create fires exactly once");
        assert_eq!(probe.anchors.load(Ordering::SeqCst), 3, "on_anchor fires once per attach");
    }

    #[tokio::test]
    async fn anchored_gate_rearms_per_detach_others_fire_once() {
        let probe = Arc::new(Probe::default());
        let cell = constructed_cell(probe).await;

        cell.attach(None).await;
        assert!(cell.anchored().is_promoted());
        assert!(cell.created().is_promoted());
        assert_eq!(cell.anchored().wait().await, GateWait::Promoted);

        cell.detach();
        assert!(!cell.anchored().is_promoted(), "anchored re-arms on detach");
        assert!(cell.created().is_promoted(), "created stays promoted");
        assert!(cell.constructed().is_promoted(), "constructed stays promoted");

        cell.attach(None).await;
        assert!(cell.anchored().is_promoted(), "anchored resolves again on re-attach");
    }

    #[tokio::test]
    async fn hook_failures_do_not_abort_attachment() {
        let probe = Arc::new(Probe {
            fail_create: true,
            fail_anchor: true,
            ..Probe::default()
        });
        let cell = constructed_cell(Arc::clone(&probe)).await;

        cell.attach(None).await;
        assert!(cell.anchored().is_promoted(), "lifecycle ran to completion");
        assert!(cell.created().is_promoted());
        assert_eq!(probe.creates.load(Ordering::SeqCst), 1);
        assert_eq!(probe.anchors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn on_display_only_fires_when_not_headless() {
        let headless_probe = Arc::new(Probe::default());
        let cell = constructed_cell(Arc::clone(&headless_probe)).await;
        cell.attach(None).await;
        assert_eq!(headless_probe.displays.load(Ordering::SeqCst), 0);

        let display_probe = Arc::new(Probe::default());
        let class = ComponentClass::builder("Probe").build().unwrap();
        let cell = ComponentBuilder::new(class, Arc::clone(&display_probe) as Arc<dyn Component>)
            .displayed()
            .build();
        cell.construct(Options::new(), &[]).await.unwrap();
        cell.attach(None).await;
        assert_eq!(display_probe.displays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn skeleton_ignores_attachment_until_unskeletonized() {
        let probe = Arc::new(Probe::default());
        let class = ComponentClass::builder("Probe").build().unwrap();
        let cell = ComponentBuilder::new(class, Arc::clone(&probe) as Arc<dyn Component>)
            .skeleton()
            .build();

        cell.attach(None).await;
        assert_eq!(probe.anchors.load(Ordering::SeqCst), 0, "skeleton attach is a no-op");
        assert!(!cell.anchored().is_promoted());

        cell.unskeletonize().await.unwrap();
        assert!(!cell.is_skeleton());
        assert!(cell.constructed().is_promoted());

        cell.attach(None).await;
        assert_eq!(probe.anchors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn parent_is_notified_of_child_changes() {
        let parent_probe = Arc::new(Probe::default());
        let parent = constructed_cell(Arc::clone(&parent_probe)).await;
        parent.attach(None).await;

        let child = constructed_cell(Arc::new(Probe::default())).await;
        child.attach(Some(&parent)).await;

        assert_eq!(parent_probe.children_added.load(Ordering::SeqCst), 1);
        assert_eq!(parent.children().len(), 1);
        assert!(child.parent().is_some_and(|p| Arc::ptr_eq(&p, &parent)));

        child.detach();
        assert_eq!(parent_probe.children_removed.load(Ordering::SeqCst), 1);
        assert!(parent.children().is_empty());
        assert!(child.parent().is_none());
    }

    #[tokio::test]
    async fn attach_waits_for_construction() {
        let probe = Arc::new(Probe::default());
        let cell = probe_cell(Arc::clone(&probe));

        let attach = {
            let cell = Arc::clone(&cell);
            tokio::spawn(async move { cell.attach(None).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(probe.creates.load(Ordering::SeqCst), 0, "attach blocked on constructed gate");

        cell.construct(Options::new(), &[]).await.unwrap();
        attach.await.unwrap();
        assert_eq!(probe.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_construction_does_not_repromote() {
        let probe = Arc::new(Probe::default());
        let cell = constructed_cell(Arc::clone(&probe)).await;
        assert!(cell.constructed().is_promoted());
        // a second construction attempt must not re-promote the gate
        cell.construct(Options::new(), &[]).await.unwrap();
        assert_eq!(probe.constructs.load(Ordering::SeqCst), 2);
        assert!(cell.constructed().is_promoted());
    }
}
