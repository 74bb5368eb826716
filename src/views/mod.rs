//! Views - named handlers registered per context kind.
//!
//! A view is looked up by the kind of object the request resolved to and
//! the view name left over by traversal, or by the controller name of a
//! matched route. Each view declares the permission it needs; the app
//! checks it against the context's ACL lineage before dispatch.
//!
//! ## Example
//!
//! ```ignore
//! let views = ViewRegistry::new()
//!     .view(ViewFor::Kind(NodeKind::Video), "", Permission::View, pages::video)
//!     .view(ViewFor::Route, "tag", Permission::View, pages::tag);
//!
//! let view = views.lookup(NodeKind::Video, "").unwrap();
//! ```

mod error;
mod files;
mod forms;
mod pages;
mod request;
mod templates;

use std::collections::HashMap;

use minijinja::{context, Value};

pub use error::ViewError;
pub use request::{Method, Request, Response, Upload};
pub use templates::Templates;

use crate::app::Services;
use crate::model::Root;
use crate::routing::RouteMatch;
use crate::security::Permission;
use crate::traversal::{walk, walk_mut, ContextRef, Node, NodeKind, NodeMut};

/// What a view is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewFor {
    /// Controller name of a route-table entry.
    Route,
    /// Objects of this kind reached by traversal.
    Kind(NodeKind),
}

/// Handler signature shared by every view.
pub type Handler = Box<dyn Fn(&mut ViewContext<'_>) -> Result<Response, ViewError> + Send + Sync>;

/// A registered view.
pub struct RegisteredView {
    pub name: String,
    pub target: ViewFor,
    pub permission: Permission,
    handler: Handler,
}

impl RegisteredView {
    pub fn call(&self, ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
        (self.handler)(ctx)
    }
}

/// Registry of views keyed by target and name.
///
/// A view named `*` on a kind catches every non-empty view name that has
/// no view of its own.
#[derive(Default)]
pub struct ViewRegistry {
    views: HashMap<(ViewFor, String), RegisteredView>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view, replacing any previous one under the same key.
    pub fn view<F>(mut self, target: ViewFor, name: &str, permission: Permission, handler: F) -> Self
    where
        F: Fn(&mut ViewContext<'_>) -> Result<Response, ViewError> + Send + Sync + 'static,
    {
        self.views.insert(
            (target, name.to_string()),
            RegisteredView {
                name: name.to_string(),
                target,
                permission,
                handler: Box::new(handler),
            },
        );
        self
    }

    /// Every view mint serves.
    pub fn standard() -> Self {
        use NodeKind as K;
        use Permission::{Add, Admin, Edit, View};
        let kind = ViewFor::Kind;

        Self::new()
            .view(ViewFor::Route, "index.html", View, pages::index)
            .view(ViewFor::Route, "tag", View, pages::tag)
            .view(ViewFor::Route, "podcast.xml", View, pages::podcast)
            .view(ViewFor::Route, "static", View, files::static_file)
            .view(ViewFor::Route, "encodes", View, files::encode_file)
            .view(kind(K::Root), "static", View, files::static_file)
            .view(kind(K::Root), "login.html", View, forms::login)
            .view(kind(K::Root), "logout.html", View, forms::logout)
            .view(kind(K::Root), "set_default_video.html", Admin, forms::set_default_video)
            .view(kind(K::Root), "*", View, pages::legacy_redirect)
            .view(kind(K::Videos), "", View, pages::video_list)
            .view(kind(K::Videos), "add_video.html", Add, forms::add_video)
            .view(kind(K::Video), "", View, pages::video)
            .view(kind(K::Video), "upload.html", Edit, forms::upload)
            .view(kind(K::Users), "register.html", View, forms::register)
            .view(kind(K::User), "profile.html", View, pages::profile)
            .view(kind(K::User), "edit.html", Edit, forms::edit_user)
            .view(kind(K::Channels), "", View, pages::channel_list)
            .view(kind(K::Channel), "", View, pages::channel)
            .view(kind(K::Channel), "edit.html", Edit, forms::edit_channel)
            .view(kind(K::Banners), "", View, pages::banner_list)
            .view(kind(K::Banners), "add.html", Add, forms::add_banner)
            .view(kind(K::AdSpace), "", View, pages::adspace)
            .view(kind(K::AdSpace), "edit.html", Edit, forms::edit_banner)
            .view(kind(K::Advert), "", View, files::advert_content)
    }

    pub fn route_view(&self, name: &str) -> Option<&RegisteredView> {
        self.views.get(&(ViewFor::Route, name.to_string()))
    }

    pub fn lookup(&self, kind: NodeKind, name: &str) -> Option<&RegisteredView> {
        let target = ViewFor::Kind(kind);
        self.views.get(&(target, name.to_string())).or_else(|| {
            if name.is_empty() {
                None
            } else {
                self.views.get(&(target, "*".to_string()))
            }
        })
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// What the request resolved to.
#[derive(Debug, Clone)]
pub enum Target {
    Route(RouteMatch),
    Context {
        context: ContextRef,
        view_name: String,
        subpath: Vec<String>,
    },
}

type Hook = Box<dyn FnOnce() + Send>;

/// Side effects held back until the request's transaction is decided.
///
/// Files and other state outside the database are touched here, so an
/// aborted or retried attempt leaves nothing behind.
#[derive(Default)]
pub struct Deferred {
    on_commit: Vec<Hook>,
    on_abort: Vec<Hook>,
}

impl Deferred {
    pub fn on_commit(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.on_commit.push(Box::new(hook));
    }

    pub fn on_abort(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.on_abort.push(Box::new(hook));
    }

    pub fn is_empty(&self) -> bool {
        self.on_commit.is_empty() && self.on_abort.is_empty()
    }

    /// The attempt was committed: run the commit hooks in order.
    pub fn committed(self) {
        for hook in self.on_commit {
            hook();
        }
    }

    /// The attempt was thrown away: run the abort hooks in order.
    pub fn aborted(self) {
        for hook in self.on_abort {
            hook();
        }
    }
}

/// Everything a view handler can reach.
///
/// The root is the request's private working copy. Reaching it mutably
/// marks the request as changed, which is what makes the app commit.
pub struct ViewContext<'a> {
    request: &'a Request,
    services: &'a Services,
    user: Option<&'a str>,
    target: Target,
    root: &'a mut Root,
    changed: bool,
    deferred: Deferred,
}

impl<'a> ViewContext<'a> {
    pub fn new(
        request: &'a Request,
        services: &'a Services,
        user: Option<&'a str>,
        target: Target,
        root: &'a mut Root,
    ) -> Self {
        Self {
            request,
            services,
            user,
            target,
            root,
            changed: false,
            deferred: Deferred::default(),
        }
    }

    pub fn request(&self) -> &'a Request {
        self.request
    }

    pub fn services(&self) -> &'a Services {
        self.services
    }

    /// Authenticated user id.
    pub fn user(&self) -> Option<&'a str> {
        self.user
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn root(&self) -> &Root {
        &*self.root
    }

    pub fn root_mut(&mut self) -> &mut Root {
        self.changed = true;
        &mut *self.root
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Hooks run once the request's transaction commits or aborts.
    pub fn deferred(&mut self) -> &mut Deferred {
        &mut self.deferred
    }

    pub fn into_deferred(self) -> Deferred {
        self.deferred
    }

    /// A captured route parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        match &self.target {
            Target::Route(matched) => matched.param(name),
            Target::Context { .. } => None,
        }
    }

    /// Path of the traversal context; empty for routed requests.
    pub fn context_path(&self) -> &[String] {
        match &self.target {
            Target::Context { context, .. } => context.path.as_slice(),
            Target::Route(_) => &[],
        }
    }

    /// Key of the traversal context within its container.
    pub fn context_name(&self) -> Result<String, ViewError> {
        self.context_path()
            .last()
            .cloned()
            .ok_or_else(|| ViewError::NotFound("context".to_string()))
    }

    pub fn view_name(&self) -> &str {
        match &self.target {
            Target::Context { view_name, .. } => view_name,
            Target::Route(matched) => &matched.view,
        }
    }

    /// File path below a static or media view: the `*path` capture of a
    /// route, or the traversal subpath.
    pub fn rest_path(&self) -> String {
        match &self.target {
            Target::Route(matched) => matched.param("path").unwrap_or_default().to_string(),
            Target::Context { subpath, .. } => subpath.join("/"),
        }
    }

    pub fn subpath(&self) -> &[String] {
        match &self.target {
            Target::Context { subpath, .. } => subpath.as_slice(),
            Target::Route(_) => &[],
        }
    }

    /// The traversal context object.
    pub fn node(&self) -> Result<Node<'_>, ViewError> {
        let path = self.context_path();
        walk(&*self.root, path).ok_or_else(|| ViewError::NotFound(format!("/{}", path.join("/"))))
    }

    /// Mutable access to the traversal context object.
    pub fn node_mut(&mut self) -> Result<NodeMut<'_>, ViewError> {
        let path = match &self.target {
            Target::Context { context, .. } => context.path.clone(),
            Target::Route(_) => Vec::new(),
        };
        self.changed = true;
        walk_mut(&mut *self.root, &path).ok_or_else(|| ViewError::NotFound(format!("/{}", path.join("/"))))
    }

    /// Render an HTML template in the site layout.
    ///
    /// `page` is merged over the values every page gets: `site`, `title`,
    /// `user` and the submitted `form`.
    pub fn render(&self, template: &str, title: &str, page: Value) -> Result<Response, ViewError> {
        let body = self.services.templates.render(
            template,
            context! {
                site => &self.root.title,
                title => title,
                user => self.user,
                form => &self.request.form,
                ..page
            },
        )?;
        Ok(Response::html(body))
    }
}
