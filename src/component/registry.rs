//! Per-class component registries: resources, stylesheets, standalone surface.
//!
//! Every component class carries declarative metadata that is shared by all
//! of its instances:
//!
//! - **stylesheets** - per-class style resources, loaded lazily and cached on
//!   the class object
//! - **resource modules** - JSON sidecar files exporting declared values; a
//!   class's declared imports bind against them, and an unsatisfiable
//!   declaration is a fatal, sticky class error
//! - **standalone registry** - the selection of methods and properties that
//!   are portable to a minimal client runtime without the full framework
//!
//! Resource loading happens at most once per class, memoized through a shared
//! [`OnceCell`] so concurrent first-uses share a single load. The standalone
//! registry is computed at class definition time ([`ComponentClassBuilder::build`]);
//! invalid standalone declarations abort class creation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use crate::core::WeftError;
use crate::resolver::{ModuleId, ModuleLoader};

use super::options::Options;

/// The kinds of declared instance properties a standalone property can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    /// An element looked up by id.
    Id,
    /// A content-projection slot.
    Content,
    /// A layout region.
    Layout,
    /// A child component reference.
    Child,
}

/// A declared instance property: its kind and the markup id it binds to.
#[derive(Debug, Clone)]
pub struct PropDecl {
    /// Binding kind.
    pub kind: PropKind,
    /// The markup id the property is bound to.
    pub id: String,
}

/// A declared import: where the value comes from and which export to take.
#[derive(Debug, Clone)]
pub struct ImportBinding {
    /// Explicit resource module, or `None` to search the class's resource files.
    pub location: Option<ModuleId>,
    /// Export name; `"*"` takes the whole export map.
    pub export: String,
}

/// A standalone property entry: the binding it relies on.
#[derive(Debug, Clone)]
pub struct StandaloneProperty {
    /// Binding kind.
    pub kind: PropKind,
    /// The markup id the property is bound to.
    pub id: String,
}

/// The class's standalone (client-portable) surface.
///
/// Methods are captured by name at class-definition time. Claiming `on_route`
/// implicitly also captures `resolve_route` - routing cannot function in a
/// detached client without both.
#[derive(Debug, Clone, Default)]
pub struct StandaloneRegistry {
    methods: Vec<String>,
    properties: BTreeMap<String, StandaloneProperty>,
}

impl StandaloneRegistry {
    /// The captured method names, in registration order.
    #[must_use]
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// The captured properties.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, StandaloneProperty> {
        &self.properties
    }

    /// Whether any standalone surface was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.properties.is_empty()
    }

    fn add_method(&mut self, name: &str) {
        if self.methods.iter().any(|m| m == name) {
            return;
        }
        self.methods.push(name.to_string());
        for inferred in inferred_standalone_methods(name) {
            self.add_method(inferred);
        }
    }
}

/// Methods implied by capturing another method.
fn inferred_standalone_methods(name: &str) -> &'static [&'static str] {
    match name {
        "on_route" => &["resolve_route"],
        _ => &[],
    }
}

/// Values bound from resource modules, keyed by declared property name.
#[derive(Debug, Clone, Default)]
pub struct ResourceBindings {
    values: BTreeMap<String, Value>,
}

impl ResourceBindings {
    /// Looks up a bound value.
    #[must_use]
    pub fn get(&self, prop: &str) -> Option<&Value> {
        self.values.get(prop)
    }

    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values were bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Derives the resource sidecar identity for a component's source module:
/// the module path with its script extension replaced by `.resources.json`.
#[must_use]
pub fn resource_sidecar(module: &ModuleId) -> Option<ModuleId> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\.m?(ts|js)x?$").expect("sidecar regex is valid"));

    let canonical = module.canonical();
    if !re.is_match(&canonical) {
        return None;
    }
    let replaced = re.replace(&canonical, ".resources.json");
    ModuleId::parse(&replaced).ok()
}

/// Shared, immutable metadata for a component class.
///
/// Built once per class via [`ComponentClass::builder`] and shared by all
/// instances through an [`Arc`].
#[derive(Debug)]
pub struct ComponentClass {
    name: String,
    module: Option<ModuleId>,
    stylesheets: Vec<ModuleId>,
    resource_files: Vec<ModuleId>,
    declared_imports: BTreeMap<String, ImportBinding>,
    declared_props: BTreeMap<String, PropDecl>,
    use_resources: bool,
    default_options: Options,
    standalone: StandaloneRegistry,
    resources: OnceCell<Result<Arc<ResourceBindings>, Arc<WeftError>>>,
    styles: OnceCell<Vec<String>>,
}

impl ComponentClass {
    /// Starts building a class with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ComponentClassBuilder {
        ComponentClassBuilder {
            name: name.into(),
            module: None,
            stylesheets: Vec::new(),
            resource_files: Vec::new(),
            declared_imports: BTreeMap::new(),
            declared_props: BTreeMap::new(),
            standalone_methods: Vec::new(),
            standalone_properties: Vec::new(),
            use_resources: true,
            default_options: Options::new(),
        }
    }

    /// The class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source module the class was defined in, if registered.
    #[must_use]
    pub fn module(&self) -> Option<&ModuleId> {
        self.module.as_ref()
    }

    /// Class-level default options layered under instance options.
    #[must_use]
    pub fn default_options(&self) -> &Options {
        &self.default_options
    }

    /// Declared id/content/layout/child properties.
    #[must_use]
    pub fn declared_props(&self) -> &BTreeMap<String, PropDecl> {
        &self.declared_props
    }

    /// The standalone surface selected for this class.
    #[must_use]
    pub fn standalone(&self) -> &StandaloneRegistry {
        &self.standalone
    }

    /// Loads and caches the class stylesheets.
    ///
    /// Failures are logged and skipped - missing styling never blocks a
    /// component from initializing.
    pub async fn ensure_styles(&self, loader: &dyn ModuleLoader) -> &[String] {
        self.styles
            .get_or_init(|| async {
                let mut loaded = Vec::new();
                for sheet in &self.stylesheets {
                    match loader.load(sheet).await {
                        Ok(css) => loaded.push(css),
                        Err(err) => {
                            tracing::warn!("failed to load stylesheet {sheet}: {err:#}");
                        }
                    }
                }
                loaded
            })
            .await
    }

    /// Loads the class's resource modules and binds every declared import.
    ///
    /// Runs at most once per class; concurrent first-uses share the same
    /// in-flight load. The outcome is sticky: a contract failure keeps the
    /// class unusable on every later call.
    ///
    /// # Errors
    ///
    /// Returns the fatal contract error (see [`crate::core::WeftError`]
    /// resource variants) when a resource module cannot be loaded or a
    /// declared export cannot be located.
    pub async fn ensure_resources(
        &self,
        loader: &dyn ModuleLoader,
    ) -> Result<Arc<ResourceBindings>, Arc<WeftError>> {
        self.resources
            .get_or_init(|| async {
                self.load_resources(loader).await.map(Arc::new).map_err(Arc::new)
            })
            .await
            .clone()
    }

    async fn load_resources(&self, loader: &dyn ModuleLoader) -> Result<ResourceBindings, WeftError> {
        let mut candidates: Vec<(ModuleId, bool)> =
            self.resource_files.iter().map(|file| (file.clone(), true)).collect();

        // the module-bound sidecar participates when present
        let sidecar = if self.use_resources {
            self.module.as_ref().and_then(resource_sidecar)
        } else {
            None
        };
        if let Some(sidecar) = &sidecar
            && !candidates.iter().any(|(file, _)| file == sidecar)
        {
            candidates.push((sidecar.clone(), false));
        }

        let mut valid: Vec<(String, Map<String, Value>)> = Vec::new();
        for (file, declared) in candidates {
            match loader.load(&file).await {
                Ok(text) => {
                    let exports: Map<String, Value> = serde_json::from_str(&text).map_err(|e| {
                        WeftError::ResourceLoadFailed {
                            class: self.name.clone(),
                            location: file.canonical(),
                            reason: e.to_string(),
                        }
                    })?;
                    tracing::debug!("loaded resource module: {file}");
                    valid.push((file.canonical(), exports));
                }
                Err(err) => {
                    if declared && !file.is_web() {
                        return Err(WeftError::ResourceLoadFailed {
                            class: self.name.clone(),
                            location: file.canonical(),
                            reason: format!("{err:#}"),
                        });
                    }
                    if declared {
                        tracing::warn!("could not fetch resource module {file}: {err:#}");
                    }
                }
            }
        }

        let mut values = BTreeMap::new();
        for (prop, binding) in &self.declared_imports {
            match &binding.location {
                None => {
                    if valid.is_empty() {
                        return Err(self.missing_resource_error(&binding.export, sidecar.as_ref()));
                    }
                    let mut found = false;
                    for (file, exports) in &valid {
                        if binding.export == "*" {
                            values.insert(prop.clone(), Value::Object(exports.clone()));
                            found = true;
                        } else if let Some(value) = exports.get(&binding.export) {
                            values.insert(prop.clone(), value.clone());
                            found = true;
                        }
                        if found {
                            tracing::debug!(
                                "using export '{}' as '{prop}' in '{}' (from {file})",
                                binding.export,
                                self.name
                            );
                            break;
                        }
                    }
                    if !found {
                        let searched: Vec<&str> =
                            valid.iter().map(|(file, _)| file.as_str()).collect();
                        return Err(WeftError::ResourceExportNotFound {
                            class: self.name.clone(),
                            export: binding.export.clone(),
                            searched: searched.join(" or "),
                        });
                    }
                }
                Some(location) => {
                    let text = loader.load(location).await.map_err(|err| {
                        WeftError::ResourceLoadFailed {
                            class: self.name.clone(),
                            location: location.canonical(),
                            reason: format!("{err:#}"),
                        }
                    })?;
                    let exports: Map<String, Value> =
                        serde_json::from_str(&text).map_err(|e| WeftError::ResourceLoadFailed {
                            class: self.name.clone(),
                            location: location.canonical(),
                            reason: e.to_string(),
                        })?;
                    if binding.export == "*" {
                        values.insert(prop.clone(), Value::Object(exports));
                    } else if let Some(value) = exports.get(&binding.export) {
                        values.insert(prop.clone(), value.clone());
                    } else {
                        return Err(WeftError::ResourceExportMissingAtLocation {
                            class: self.name.clone(),
                            export: binding.export.clone(),
                            location: location.canonical(),
                        });
                    }
                }
            }
        }

        Ok(ResourceBindings {
            values,
        })
    }

    fn missing_resource_error(&self, export: &str, sidecar: Option<&ModuleId>) -> WeftError {
        if !self.use_resources {
            return WeftError::ResourcesDisabled {
                class: self.name.clone(),
                export: export.to_string(),
            };
        }
        match (self.module.as_ref(), sidecar) {
            (Some(_), Some(sidecar)) => WeftError::ResourceFileMissing {
                class: self.name.clone(),
                export: export.to_string(),
                expected: sidecar.canonical(),
            },
            _ => WeftError::ComponentModuleUnknown {
                class: self.name.clone(),
                export: export.to_string(),
            },
        }
    }
}

/// Builder for [`ComponentClass`].
pub struct ComponentClassBuilder {
    name: String,
    module: Option<ModuleId>,
    stylesheets: Vec<ModuleId>,
    resource_files: Vec<ModuleId>,
    declared_imports: BTreeMap<String, ImportBinding>,
    declared_props: BTreeMap<String, PropDecl>,
    standalone_methods: Vec<String>,
    standalone_properties: Vec<String>,
    use_resources: bool,
    default_options: Options,
}

impl ComponentClassBuilder {
    /// Registers the source module the class is defined in.
    #[must_use]
    pub fn module(mut self, module: ModuleId) -> Self {
        self.module = Some(module);
        self
    }

    /// Adds a class stylesheet.
    #[must_use]
    pub fn stylesheet(mut self, sheet: ModuleId) -> Self {
        self.stylesheets.push(sheet);
        self
    }

    /// Adds an explicit resource module.
    #[must_use]
    pub fn resource_file(mut self, file: ModuleId) -> Self {
        self.resource_files.push(file);
        self
    }

    /// Declares an import bound from the class's resource files.
    #[must_use]
    pub fn import(mut self, prop: impl Into<String>, export: impl Into<String>) -> Self {
        self.declared_imports.insert(
            prop.into(),
            ImportBinding {
                location: None,
                export: export.into(),
            },
        );
        self
    }

    /// Declares an import bound from an explicit resource module.
    #[must_use]
    pub fn import_from(
        mut self,
        prop: impl Into<String>,
        location: ModuleId,
        export: impl Into<String>,
    ) -> Self {
        self.declared_imports.insert(
            prop.into(),
            ImportBinding {
                location: Some(location),
                export: export.into(),
            },
        );
        self
    }

    /// Declares an instance property with a binding kind; the markup id
    /// defaults to the property name.
    #[must_use]
    pub fn prop(self, name: impl Into<String>, kind: PropKind) -> Self {
        let name = name.into();
        let id = name.clone();
        self.prop_with_id(name, kind, id)
    }

    /// Declares an instance property bound to an explicit markup id.
    #[must_use]
    pub fn prop_with_id(
        mut self,
        name: impl Into<String>,
        kind: PropKind,
        id: impl Into<String>,
    ) -> Self {
        self.declared_props.insert(
            name.into(),
            PropDecl {
                kind,
                id: id.into(),
            },
        );
        self
    }

    /// Marks a method as standalone (client-portable).
    #[must_use]
    pub fn standalone_method(mut self, name: impl Into<String>) -> Self {
        self.standalone_methods.push(name.into());
        self
    }

    /// Marks an instance property as standalone.
    #[must_use]
    pub fn standalone_property(mut self, name: impl Into<String>) -> Self {
        self.standalone_properties.push(name.into());
        self
    }

    /// Disables resource files for this class.
    #[must_use]
    pub fn no_resources(mut self) -> Self {
        self.use_resources = false;
        self
    }

    /// Sets the class-level default options.
    #[must_use]
    pub fn default_options(mut self, options: Options) -> Self {
        self.default_options = options;
        self
    }

    /// Finalizes the class.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::StandaloneProperty`] when a standalone property
    /// lacks a supporting id/content/layout/child declaration - the class
    /// contract cannot be satisfied, so the class must not come into use.
    pub fn build(self) -> Result<Arc<ComponentClass>, WeftError> {
        let mut standalone = StandaloneRegistry::default();
        for method in &self.standalone_methods {
            standalone.add_method(method);
        }
        for property in &self.standalone_properties {
            let Some(decl) = self.declared_props.get(property) else {
                return Err(WeftError::StandaloneProperty {
                    class: self.name.clone(),
                    property: property.clone(),
                });
            };
            standalone.properties.insert(
                property.clone(),
                StandaloneProperty {
                    kind: decl.kind,
                    id: decl.id.clone(),
                },
            );
        }

        Ok(Arc::new(ComponentClass {
            name: self.name,
            module: self.module,
            stylesheets: self.stylesheets,
            resource_files: self.resource_files,
            declared_imports: self.declared_imports,
            declared_props: self.declared_props,
            use_resources: self.use_resources,
            default_options: self.default_options,
            standalone,
            resources: OnceCell::new(),
            styles: OnceCell::new(),
        }))
    }
}
