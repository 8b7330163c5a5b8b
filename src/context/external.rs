//! External context: the request/response/session surface supplied by the container.

use crate::application::Application;
use crate::error::ContextError;
use crate::scope::{
    AttributeMap, Cookie, ReadOnlySource, RequestAttributes, Session, SharedAttributes,
};
use crate::writer::SharedBuffer;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Callback run when the owning request context is released
pub type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Raw request data as delivered by the container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestData {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub parameters: Vec<(String, String)>,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(skip)]
    pub session: Option<Session>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl RequestData {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }
}

/// Response being assembled for the container
#[derive(Debug)]
pub struct Response {
    status: u16,
    content_type: Option<String>,
    headers: Vec<(String, String)>,
    body: SharedBuffer,
    committed: bool,
}

impl Response {
    pub fn new(body: SharedBuffer) -> Self {
        Self {
            status: 200,
            content_type: None,
            headers: Vec::new(),
            body,
            committed: false,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Handle to the body; clones write into the same buffer.
    pub fn body(&self) -> SharedBuffer {
        self.body.clone()
    }

    /// Marks the response as sent; after this it can no longer be reset.
    pub fn commit(&mut self) {
        self.committed = true;
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Discard status, headers and body. Returns false when already committed.
    pub fn reset(&mut self) -> bool {
        if self.committed {
            return false;
        }
        self.status = 200;
        self.content_type = None;
        self.headers.clear();
        self.body.clear();
        true
    }
}

struct RequestState {
    data: RequestData,
    request_map: AttributeMap<RequestAttributes>,
    session: Option<Session>,
    response: Response,
    header_map: OnceCell<AttributeMap<ReadOnlySource<String>>>,
    header_values_map: OnceCell<AttributeMap<ReadOnlySource<Vec<String>>>>,
    parameter_map: OnceCell<AttributeMap<ReadOnlySource<String>>>,
    parameter_values_map: OnceCell<AttributeMap<ReadOnlySource<Vec<String>>>>,
    cookie_map: OnceCell<AttributeMap<ReadOnlySource<Cookie>>>,
}

/// Container-facing half of a request context.
///
/// The startup variant has no request: its request and response accessors fail with
/// [`ContextError::UnsupportedDuringStartup`].
pub struct ExternalContext {
    application: Arc<Application>,
    request: Option<RequestState>,
    release_hook: Option<ReleaseHook>,
}

impl fmt::Debug for ExternalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalContext")
            .field("startup", &self.request.is_none())
            .field("release_hook", &self.release_hook.is_some())
            .finish()
    }
}

impl ExternalContext {
    pub fn for_request(application: Arc<Application>, mut data: RequestData, body: SharedBuffer) -> Self {
        let session = data.session.take();
        Self {
            application,
            request: Some(RequestState {
                data,
                request_map: AttributeMap::new(RequestAttributes::new()),
                session,
                response: Response::new(body),
                header_map: OnceCell::new(),
                header_values_map: OnceCell::new(),
                parameter_map: OnceCell::new(),
                parameter_values_map: OnceCell::new(),
                cookie_map: OnceCell::new(),
            }),
            release_hook: None,
        }
    }

    pub fn for_startup(application: Arc<Application>) -> Self {
        Self {
            application,
            request: None,
            release_hook: None,
        }
    }

    /// Attach a collaborator to be notified on release.
    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.release_hook = Some(Box::new(hook));
        self
    }

    pub fn is_startup(&self) -> bool {
        self.request.is_none()
    }

    fn state(&self, operation: &'static str) -> Result<&RequestState, ContextError> {
        self.request
            .as_ref()
            .ok_or(ContextError::UnsupportedDuringStartup(operation))
    }

    fn state_mut(&mut self, operation: &'static str) -> Result<&mut RequestState, ContextError> {
        self.request
            .as_mut()
            .ok_or(ContextError::UnsupportedDuringStartup(operation))
    }

    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    pub fn application_map(&self) -> AttributeMap<SharedAttributes> {
        self.application.application_map()
    }

    pub fn init_parameter(&self, name: &str) -> Option<&str> {
        self.application.init_parameter(name)
    }

    pub fn init_parameter_map(&self) -> AttributeMap<ReadOnlySource<String>> {
        self.application.init_parameter_map()
    }

    pub fn request_method(&self) -> Result<&str, ContextError> {
        Ok(&self.state("request_method")?.data.method)
    }

    pub fn request_path(&self) -> Result<&str, ContextError> {
        Ok(&self.state("request_path")?.data.path)
    }

    pub fn request_map(&mut self) -> Result<&mut AttributeMap<RequestAttributes>, ContextError> {
        Ok(&mut self.state_mut("request_map")?.request_map)
    }

    pub fn request_header_map(&self) -> Result<&AttributeMap<ReadOnlySource<String>>, ContextError> {
        let state = self.state("request_header_map")?;
        Ok(state
            .header_map
            .get_or_init(|| AttributeMap::new(ReadOnlySource::headers(&state.data.headers))))
    }

    pub fn request_header_values_map(
        &self,
    ) -> Result<&AttributeMap<ReadOnlySource<Vec<String>>>, ContextError> {
        let state = self.state("request_header_values_map")?;
        Ok(state.header_values_map.get_or_init(|| {
            AttributeMap::new(ReadOnlySource::header_values(&state.data.headers))
        }))
    }

    pub fn request_parameter_map(
        &self,
    ) -> Result<&AttributeMap<ReadOnlySource<String>>, ContextError> {
        let state = self.state("request_parameter_map")?;
        Ok(state.parameter_map.get_or_init(|| {
            AttributeMap::new(ReadOnlySource::parameters(&state.data.parameters))
        }))
    }

    pub fn request_parameter_values_map(
        &self,
    ) -> Result<&AttributeMap<ReadOnlySource<Vec<String>>>, ContextError> {
        let state = self.state("request_parameter_values_map")?;
        Ok(state.parameter_values_map.get_or_init(|| {
            AttributeMap::new(ReadOnlySource::parameter_values(&state.data.parameters))
        }))
    }

    pub fn request_cookie_map(&self) -> Result<&AttributeMap<ReadOnlySource<Cookie>>, ContextError> {
        let state = self.state("request_cookie_map")?;
        Ok(state
            .cookie_map
            .get_or_init(|| AttributeMap::new(ReadOnlySource::cookies(&state.data.cookies))))
    }

    pub fn request_header(&self, name: &str) -> Result<Option<String>, ContextError> {
        Ok(self.request_header_map()?.get(name))
    }

    pub fn request_parameter(&self, name: &str) -> Result<Option<String>, ContextError> {
        Ok(self.request_parameter_map()?.get(name))
    }

    /// Session map, creating the session on demand when `create` is set.
    pub fn session_map(
        &mut self,
        create: bool,
    ) -> Result<Option<AttributeMap<SharedAttributes>>, ContextError> {
        let state = self.state_mut("session_map")?;
        if state.session.is_none() && create {
            let session = Session::new();
            debug!(session_id = session.id(), "Session created");
            state.session = Some(session);
        }
        Ok(state
            .session
            .as_ref()
            .map(|session| AttributeMap::new(session.attributes())))
    }

    pub fn session(&self) -> Result<Option<&Session>, ContextError> {
        Ok(self.state("session")?.session.as_ref())
    }

    pub fn response(&self) -> Result<&Response, ContextError> {
        Ok(&self.state("response")?.response)
    }

    pub fn response_mut(&mut self) -> Result<&mut Response, ContextError> {
        Ok(&mut self.state_mut("response")?.response)
    }

    /// Consume the context, notifying the release collaborator if one was attached.
    pub fn release(mut self) {
        if let Some(hook) = self.release_hook.take() {
            hook();
        }
        debug!(startup = self.request.is_none(), "External context released");
    }
}
