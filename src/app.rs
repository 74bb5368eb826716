//! App - the request pipeline.
//!
//! ```text
//! identify -> connect -> route or traverse -> find view -> authorize
//!          -> dispatch -> commit (retry on conflict) | abort
//! ```
//!
//! Each attempt runs on a fresh connection; the connection is closed on
//! every path. Only requests whose view touched the root mutably are
//! committed. Side effects a view deferred run after the outcome is
//! known: commit hooks on success, abort hooks otherwise.

use std::path::PathBuf;

use minijinja::context;

use crate::auth::{challenge, parse_basic, TicketStore, ZodbPlugin};
use crate::config::Config;
use crate::finder::UtilityFinder;
use crate::model::Root;
use crate::routing::{resolve, Lifecycle, RequestState, Resolution, RouteMapper, RoutingError};
use crate::security::{authorize, Decision, Principal};
use crate::store::{Database, MediaStore, StoreError};
use crate::traversal::Node;
use crate::views::{
    Deferred, Request, Response, Target, Templates, ViewContext, ViewError, ViewRegistry,
};

/// Long-lived collaborators shared by every request.
pub struct Services {
    pub db: Database,
    pub base: String,
    pub finder: UtilityFinder,
    /// Uploaded encodes.
    pub media: MediaStore,
    /// Stylesheets, scripts and images.
    pub statics: MediaStore,
    pub tickets: TicketStore,
    pub auth: ZodbPlugin,
    pub templates: Templates,
}

impl Services {
    pub fn new(
        db: Database,
        base: impl Into<String>,
        video_dir: impl Into<PathBuf>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        let base = base.into();
        Self {
            auth: ZodbPlugin::new(db.clone(), base.clone(), UtilityFinder::standard()),
            db,
            base,
            finder: UtilityFinder::standard(),
            media: MediaStore::new(video_dir),
            statics: MediaStore::new(static_dir),
            tickets: TicketStore::new(),
            templates: Templates::new(),
        }
    }
}

/// The mint application: services plus route and view tables.
pub struct App {
    services: Services,
    routes: RouteMapper,
    views: ViewRegistry,
    retry_attempts: usize,
}

impl App {
    pub fn new(services: Services) -> Result<Self, RoutingError> {
        Ok(Self {
            services,
            routes: Self::standard_routes()?,
            views: ViewRegistry::standard(),
            retry_attempts: 3,
        })
    }

    pub fn from_config(config: &Config, db: Database) -> Result<Self, RoutingError> {
        let services = Services::new(
            db,
            config.database.base.clone(),
            config.storage.video_dir.clone(),
            config.storage.static_dir.clone(),
        );
        Ok(Self::new(services)?.with_retry_attempts(config.database.retry_attempts))
    }

    pub fn with_retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Replace the view table.
    pub fn with_views(mut self, views: ViewRegistry) -> Self {
        self.views = views;
        self
    }

    /// The route table tried before traversal.
    pub fn standard_routes() -> Result<RouteMapper, RoutingError> {
        let mut routes = RouteMapper::new();
        routes
            .connect("/", "index.html")?
            .connect("/index.html", "index.html")?
            .connect("/tags/:tag", "tag")?
            .connect("/podcast.xml", "podcast.xml")?
            .connect("/static/*path", "static")?
            .connect("/encodes/*path", "encodes")?;
        Ok(routes)
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn routes(&self) -> &RouteMapper {
        &self.routes
    }

    /// Handle one request end to end.
    pub fn handle(&self, request: &Request) -> Response {
        let identity = self.identify(request);
        let mut attempt = 1;
        loop {
            let mut conn = match self.services.db.connect(&self.services.base) {
                Ok(conn) => conn,
                Err(err) => return self.error_page(request, None, &err.into()),
            };
            let (response, changed, deferred) = self.run(request, identity.as_deref(), conn.root_mut());
            if !changed || response.status >= 400 {
                conn.abort();
                deferred.aborted();
                self.log_outcome(request, &response);
                return response;
            }
            match conn.commit() {
                Ok(version) => {
                    tracing::debug!(path = %request.path, version, "committed request");
                    deferred.committed();
                    self.log_outcome(request, &response);
                    return response;
                }
                Err(StoreError::Conflict { .. }) if attempt < self.retry_attempts => {
                    tracing::warn!(path = %request.path, attempt, "conflicting commit, retrying request");
                    deferred.aborted();
                    attempt += 1;
                }
                Err(err) => {
                    deferred.aborted();
                    return self.error_page(request, identity.as_deref(), &err.into());
                }
            }
        }
    }

    /// Who is asking: a ticket cookie first, then Basic credentials.
    fn identify(&self, request: &Request) -> Option<String> {
        if let Some(ticket) = request.ticket() {
            match self.services.tickets.identify(&ticket) {
                Ok(Some(user)) => return Some(user),
                Ok(None) => tracing::debug!("unknown login ticket"),
                Err(err) => tracing::warn!(%err, "ticket lookup failed"),
            }
        }
        let header = request.header("authorization")?;
        let credentials = match parse_basic(header) {
            Ok(credentials) => credentials?,
            Err(err) => {
                tracing::debug!(%err, "ignoring authorization header");
                return None;
            }
        };
        match self.services.auth.authenticate(&credentials) {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(%err, "authentication failed");
                None
            }
        }
    }

    /// One attempt against a working copy. Returns the response, whether
    /// the root was touched mutably and the view's deferred side effects.
    fn run(
        &self,
        request: &Request,
        identity: Option<&str>,
        root: &mut Root,
    ) -> (Response, bool, Deferred) {
        let mut lifecycle = Lifecycle::new();

        // Users deleted since they logged in are treated as anonymous.
        let (user, groups) = match identity.and_then(|id| root.users.get(id)) {
            Some(user) => (identity, user.groups().to_vec()),
            None => (None, Vec::new()),
        };

        let (view, target, lineage) = match resolve(&self.routes, root, &request.path) {
            Resolution::Routed(matched) => {
                step(&mut lifecycle, RequestState::RouteMatched);
                let lineage = Node::Root(root).acl().into_iter().collect();
                (self.views.route_view(&matched.view), Target::Route(matched), lineage)
            }
            Resolution::Traversed(traversal) => {
                step(&mut lifecycle, RequestState::Traversed);
                let view = self.views.lookup(traversal.context.kind, &traversal.view_name);
                let target = Target::Context {
                    context: traversal.context,
                    view_name: traversal.view_name,
                    subpath: traversal.subpath,
                };
                (view, target, traversal.lineage)
            }
        };

        let Some(view) = view else {
            step(&mut lifecycle, RequestState::NotFound);
            let err = ViewError::NotFound(request.path.clone());
            return (self.render_error(root, user, &err), false, Deferred::default());
        };

        let principals = Principal::effective(user, &groups);
        if authorize(&lineage, &principals, view.permission) == Decision::Denied {
            return match user {
                None => {
                    step(&mut lifecycle, RequestState::Unauthorized);
                    tracing::debug!(path = %request.path, permission = %view.permission, "challenging anonymous request");
                    let response = self
                        .message_page(401, &root.title, "Unauthorized", None, "Please log in.")
                        .with_header("www-authenticate", challenge());
                    (response, false, Deferred::default())
                }
                Some(user) => {
                    step(&mut lifecycle, RequestState::Forbidden);
                    tracing::info!(path = %request.path, user, permission = %view.permission, "forbidden");
                    let response =
                        self.message_page(403, &root.title, "Forbidden", Some(user), "You may not do that.");
                    (response, false, Deferred::default())
                }
            };
        }

        step(&mut lifecycle, RequestState::Dispatched);
        let mut ctx = ViewContext::new(request, &self.services, user, target, root);
        let result = view.call(&mut ctx);
        let changed = ctx.is_changed();
        let deferred = ctx.into_deferred();
        step(&mut lifecycle, RequestState::Responded);

        match result {
            Ok(response) => (response, changed, deferred),
            Err(err) => (self.render_error(root, user, &err), false, deferred),
        }
    }

    fn render_error(&self, root: &Root, user: Option<&str>, err: &ViewError) -> Response {
        let status = err.status_code();
        if status >= 500 {
            tracing::error!(%err, "request failed");
        }
        let title = if status == 404 { "Not Found" } else { "Error" };
        self.message_page(status, &root.title, title, user, &err.to_string())
    }

    /// Error page rendered without a root, for failures outside a view.
    fn error_page(&self, request: &Request, user: Option<&str>, err: &ViewError) -> Response {
        tracing::error!(path = %request.path, %err, "request failed");
        self.message_page(err.status_code(), "mint", "Error", user, &err.to_string())
    }

    /// A page in the site layout carrying one message. Falls back to plain
    /// text if the template itself fails.
    fn message_page(
        &self,
        status: u16,
        site: &str,
        title: &str,
        user: Option<&str>,
        note: &str,
    ) -> Response {
        let page = context! { site => site, title => title, user => user, note => note };
        match self.services.templates.render("message.html", page) {
            Ok(body) => Response::html(body).with_status(status),
            Err(err) => {
                tracing::error!(%err, "could not render message page");
                Response::new(status, "text/plain; charset=utf-8", note.to_string())
            }
        }
    }

    fn log_outcome(&self, request: &Request, response: &Response) {
        tracing::info!(
            method = ?request.method,
            path = %request.path,
            status = response.status,
            "handled request"
        );
    }
}

/// Advance the lifecycle. The pipeline only takes legal steps, so a
/// refusal is logged rather than surfaced.
fn step(lifecycle: &mut Lifecycle, next: RequestState) {
    if let Err(err) = lifecycle.advance(next) {
        tracing::error!(%err, "request lifecycle out of order");
    }
}
