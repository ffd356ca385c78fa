//! Session Transport
//!
//! Logs in once, then issues at most one enveloped request at a time.
//! Every failure funnels through [`SessionTransport::error`], which clears the
//! working state, notifies the error hook, and records the message.

use log::{debug, info, trace, warn};
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

use super::command::{CommandSender, LOGIN_COMMAND};
use super::envelope::{build_request, read_response};
use super::error::{Rejected, TransportError, TransportResult};
use super::events::{ErrorHook, TransportEvent, WorkingCallback, WorkingState};
use super::session::{LoginResponse, Session, SessionStore};

const DEFAULT_EVENT_CAPACITY: usize = 64;

struct Inner {
    sender: Arc<dyn CommandSender>,
    sessions: SessionStore,
    login_command: String,
    working: Mutex<WorkingState>,
    last_error: Mutex<Option<String>>,
    /// Bumped at the start of every `error()` call
    error_count: AtomicU64,
    /// Bumped on every admission, while the working lock is held
    admissions: AtomicU64,
    working_callback: Option<WorkingCallback>,
    on_error: RwLock<ErrorHook>,
    event_tx: broadcast::Sender<TransportEvent>,
}

impl Inner {
    fn set_working(&self, is_working: bool, should_continue: Option<bool>) {
        let state = WorkingState {
            is_working,
            should_continue: should_continue.unwrap_or(true),
        };
        *self.working.lock() = state;
        self.notify_working(state);
    }

    fn notify_working(&self, state: WorkingState) {
        if let Some(ref callback) = self.working_callback {
            callback(state.is_working, state.should_continue);
        }
        let _ = self.event_tx.send(TransportEvent::from(state));
    }

    fn error(&self, message: &str) {
        self.error_count.fetch_add(1, Ordering::SeqCst);
        self.set_working(false, Some(false));
        warn!("Transport error: {}", message);

        let hook = Arc::clone(&*self.on_error.read());
        hook(message);

        let _ = self.event_tx.send(TransportEvent::Error {
            message: message.to_string(),
        });
        *self.last_error.lock() = Some(message.to_string());
    }

    fn route<T>(&self, result: TransportResult<T>) -> TransportResult<T> {
        if let Err(ref e) = result {
            self.error(&e.report_message());
        }
        result
    }

    /// Clear the working flag only if `generation` is still the latest admission
    fn finish(&self, generation: u64) -> bool {
        let state = WorkingState::default();
        {
            let mut working = self.working.lock();
            if self.admissions.load(Ordering::SeqCst) != generation {
                return false;
            }
            *working = state;
        }
        self.notify_working(state);
        true
    }

    async fn dispatch(
        &self,
        request_id: Uuid,
        envelope: String,
        generation: u64,
        admitted_at: u64,
    ) -> TransportResult<String> {
        debug!(
            "Request {}: sending envelope via {}",
            request_id,
            self.sender.sender_type()
        );

        let raw = self.route(self.sender.send_command(&envelope).await)?;
        let payload = self.route(read_response(&raw))?;

        // An error reported while this request was in flight withholds the payload
        if self.error_count.load(Ordering::SeqCst) != admitted_at {
            let message = self.last_error.lock().clone().unwrap_or_default();
            debug!("Request {}: payload withheld after error: {}", request_id, message);
            return Err(TransportError::Interrupted(message));
        }

        if !self.finish(generation) {
            debug!("Request {}: a newer request owns the working flag", request_id);
        }
        debug!("Request {}: completed ({} bytes)", request_id, payload.len());
        Ok(payload)
    }
}

/// Future resolving to the unwrapped payload of one admitted request.
///
/// Resolves exactly once. On `Err` the transport's error path has already run.
/// Dropping it does not cancel the request.
#[derive(Debug)]
pub struct PendingRequest {
    request_id: Uuid,
    rx: oneshot::Receiver<TransportResult<String>>,
}

impl PendingRequest {
    /// Id used to correlate this request in logs
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Future for PendingRequest {
    type Output = TransportResult<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TransportError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Builder for [`SessionTransport`]
pub struct SessionTransportBuilder {
    sender: Arc<dyn CommandSender>,
    sessions: SessionStore,
    working_callback: Option<WorkingCallback>,
    login_command: String,
}

impl SessionTransportBuilder {
    /// Invoke `callback(is_working, should_continue)` on every working-state change
    pub fn working_callback(mut self, callback: impl Fn(bool, bool) + Send + Sync + 'static) -> Self {
        self.working_callback = Some(Box::new(callback));
        self
    }

    /// Share a session store with other transports
    pub fn session_store(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// Override the login command
    pub fn login_command(mut self, command: impl Into<String>) -> Self {
        self.login_command = command.into();
        self
    }

    pub fn build(self) -> SessionTransport {
        let (event_tx, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        let noop: ErrorHook = Arc::new(|_: &str| {});

        SessionTransport {
            inner: Arc::new(Inner {
                sender: self.sender,
                sessions: self.sessions,
                login_command: self.login_command,
                working: Mutex::new(WorkingState::default()),
                last_error: Mutex::new(None),
                error_count: AtomicU64::new(0),
                admissions: AtomicU64::new(0),
                working_callback: self.working_callback,
                on_error: RwLock::new(noop),
                event_tx,
            }),
        }
    }
}

/// Session-and-request wrapper over a command sender.
///
/// Clones share all state.
#[derive(Clone)]
pub struct SessionTransport {
    inner: Arc<Inner>,
}

impl SessionTransport {
    /// Create a transport with its own session store
    pub fn new(sender: Arc<dyn CommandSender>, working_callback: Option<WorkingCallback>) -> Self {
        let mut builder = Self::builder(sender);
        builder.working_callback = working_callback;
        builder.build()
    }

    pub fn builder(sender: Arc<dyn CommandSender>) -> SessionTransportBuilder {
        SessionTransportBuilder {
            sender,
            sessions: SessionStore::new(),
            working_callback: None,
            login_command: LOGIN_COMMAND.to_string(),
        }
    }

    /// Log in and store the returned session key.
    ///
    /// Does not touch the working state, so a request issued before this
    /// completes goes out with whatever key the store holds at that moment.
    pub async fn connect(&self) -> TransportResult<()> {
        trace!("Login");

        let raw = self
            .inner
            .route(self.inner.sender.send_command(&self.inner.login_command).await)?;
        let login: LoginResponse = self
            .inner
            .route(serde_json::from_str(&raw).map_err(TransportError::from))?;

        debug!("Session key received ({} chars)", login.sessionkey.len());
        self.inner.sessions.set(Session::new(login.sessionkey));
        info!("Session established via {}", self.inner.sender.sender_type());
        Ok(())
    }

    /// Issue one enveloped request.
    ///
    /// Returns [`Rejected::Busy`] without side effects when a request is
    /// already in flight, and [`Rejected::NoRuntime`] when called outside a
    /// tokio runtime.
    pub fn request(&self, request: impl Into<String>) -> Result<PendingRequest, Rejected> {
        trace!("Send request");

        let runtime = Handle::try_current().map_err(|_| {
            debug!("Request rejected: no tokio runtime");
            Rejected::NoRuntime
        })?;

        let generation = {
            let mut working = self.inner.working.lock();
            if working.is_working {
                debug!("Request rejected: another request is in flight");
                return Err(Rejected::Busy);
            }
            *working = WorkingState {
                is_working: true,
                should_continue: true,
            };
            self.inner.admissions.fetch_add(1, Ordering::SeqCst) + 1
        };
        *self.inner.last_error.lock() = None;
        let admitted_at = self.inner.error_count.load(Ordering::SeqCst);
        self.inner.notify_working(WorkingState {
            is_working: true,
            should_continue: true,
        });

        let request_id = Uuid::new_v4();
        let session_key = self.inner.sessions.key().unwrap_or_else(|| {
            warn!("Request {} issued before a session was established", request_id);
            String::new()
        });
        let envelope = build_request(&session_key, &request.into());

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            let result = inner
                .dispatch(request_id, envelope, generation, admitted_at)
                .await;
            if tx.send(result).is_err() {
                trace!("Request {}: caller dropped the pending result", request_id);
            }
        });

        Ok(PendingRequest { request_id, rx })
    }

    /// Set the working state; `None` for `should_continue` means `true`.
    ///
    /// Notifies the working callback and all subscribers on every call.
    pub fn set_working(&self, is_working: bool, should_continue: Option<bool>) {
        self.inner.set_working(is_working, should_continue);
    }

    /// Report a failure: stop working, log, call the error hook, record the message
    pub fn error(&self, message: impl AsRef<str>) {
        self.inner.error(message.as_ref());
    }

    /// Replace the error hook (default does nothing)
    pub fn set_on_error(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.inner.on_error.write() = Arc::new(hook);
    }

    /// Hook for a measurement source to ask for new data to be sent.
    ///
    /// Currently traced and discarded.
    pub fn set_measure_func<F>(&self, _func: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        trace!("SetMeasureFunc");
    }

    /// Subscribe to working and error events
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn working_state(&self) -> WorkingState {
        *self.inner.working.lock()
    }

    pub fn is_working(&self) -> bool {
        self.inner.working.lock().is_working
    }

    /// Most recent error message, cleared when a request is admitted
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.sessions.current()
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.inner.sessions
    }
}

impl std::fmt::Debug for SessionTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTransport")
            .field("sender", &self.inner.sender.sender_type())
            .field("working", &self.working_state())
            .field("last_error", &self.last_error())
            .field("has_session", &self.inner.sessions.is_established())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::command::fake::{FakeCommandSender, FakeEntry};

    type Recorder = Arc<Mutex<Vec<(bool, bool)>>>;

    fn recording_transport(sender: Arc<FakeCommandSender>) -> (SessionTransport, Recorder) {
        let recorder: Recorder = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&recorder);
        let transport = SessionTransport::builder(sender)
            .working_callback(move |working, cont| sink.lock().push((working, cont)))
            .build();
        (transport, recorder)
    }

    fn ok(raw: &str) -> TransportResult<String> {
        Ok(raw.to_string())
    }

    #[test]
    fn test_new_transport_is_idle() {
        let transport = SessionTransport::new(Arc::new(FakeCommandSender::default()), None);
        assert_eq!(transport.working_state(), WorkingState::default());
        assert!(transport.last_error().is_none());
        assert!(transport.session().is_none());
    }

    #[tokio::test]
    async fn test_connect_session_key_is_embedded() {
        let sender = Arc::new(FakeCommandSender::new(vec![
            ok(r#"{"sessionkey":"abc123"}"#),
            ok("<protocol><response>done</response></protocol>"),
        ]));
        let transport = SessionTransport::new(sender.clone(), None);

        transport.connect().await.unwrap();
        assert_eq!(transport.session().unwrap().key, "abc123");

        let payload = transport.request("<op/>").unwrap().await.unwrap();
        assert_eq!(payload, "done");

        let sent = sender.sent();
        assert_eq!(sent[0], "login");
        assert_eq!(
            sent[1],
            r#"<protocol version="1.3"><request sessionkey="abc123"><op/></request></protocol>"#
        );
    }

    #[tokio::test]
    async fn test_connect_does_not_toggle_working() {
        let sender = Arc::new(FakeCommandSender::new(vec![ok(r#"{"sessionkey":"k"}"#)]));
        let (transport, recorder) = recording_transport(sender);

        transport.connect().await.unwrap();
        assert!(recorder.lock().is_empty());
        assert!(!transport.is_working());
    }

    #[tokio::test]
    async fn test_custom_login_command() {
        let sender = Arc::new(FakeCommandSender::new(vec![ok(r#"{"sessionkey":"k"}"#)]));
        let transport = SessionTransport::builder(sender.clone())
            .login_command("login:visir")
            .build();

        transport.connect().await.unwrap();
        assert_eq!(sender.sent(), vec!["login:visir".to_string()]);
    }

    #[tokio::test]
    async fn test_connect_failure_routes_through_error() {
        let sender = Arc::new(FakeCommandSender::new(vec![Err(TransportError::CommandFailed(
            "backend unreachable".to_string(),
        ))]));
        let (transport, recorder) = recording_transport(sender);
        let hooked = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&hooked);
        transport.set_on_error(move |msg| sink.lock().push(msg.to_string()));

        assert!(transport.connect().await.is_err());
        assert_eq!(*hooked.lock(), vec!["backend unreachable".to_string()]);
        assert_eq!(transport.last_error().as_deref(), Some("backend unreachable"));
        assert_eq!(*recorder.lock(), vec![(false, false)]);
        assert!(transport.session().is_none());
    }

    #[tokio::test]
    async fn test_connect_rejects_non_json_login() {
        let sender = Arc::new(FakeCommandSender::new(vec![ok("<html>denied</html>")]));
        let transport = SessionTransport::new(sender, None);

        let err = transport.connect().await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidLogin(_)));
        assert!(transport.last_error().unwrap().starts_with("Invalid login response"));
    }

    #[tokio::test]
    async fn test_request_success_unwraps_payload() {
        let sender = Arc::new(FakeCommandSender::new(vec![ok(
            "<protocol><response>PAYLOAD</response></protocol>",
        )]));
        let (transport, recorder) = recording_transport(sender);

        let payload = transport.request("<op/>").unwrap().await.unwrap();
        assert_eq!(payload, "PAYLOAD");
        assert!(transport.last_error().is_none());
        assert_eq!(*recorder.lock(), vec![(true, true), (false, true)]);
    }

    #[tokio::test]
    async fn test_request_error_element() {
        let sender = Arc::new(FakeCommandSender::new(vec![ok(
            "<protocol><error>BOOM</error></protocol>",
        )]));
        let transport = SessionTransport::new(sender, None);
        let hooked = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&hooked);
        transport.set_on_error(move |msg| sink.lock().push(msg.to_string()));

        let err = transport.request("<op/>").unwrap().await.unwrap_err();
        assert!(matches!(err, TransportError::Protocol(ref m) if m == "BOOM"));
        assert_eq!(*hooked.lock(), vec!["BOOM".to_string()]);
        assert_eq!(
            transport.working_state(),
            WorkingState {
                is_working: false,
                should_continue: false
            }
        );
        assert_eq!(transport.last_error().as_deref(), Some("BOOM"));
    }

    #[tokio::test]
    async fn test_request_unparseable_response() {
        let sender = Arc::new(FakeCommandSender::new(vec![ok("<protocol><status/></protocol>")]));
        let transport = SessionTransport::new(sender, None);

        let err = transport.request("<op/>").unwrap().await.unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse));
        assert_eq!(
            transport.last_error().as_deref(),
            Some("Unable to parse response")
        );
    }

    #[tokio::test]
    async fn test_sender_failure_skips_parsing() {
        let sender = Arc::new(FakeCommandSender::new(vec![Err(TransportError::CommandFailed(
            "connection reset".to_string(),
        ))]));
        let transport = SessionTransport::new(sender, None);

        let err = transport.request("<op/>").unwrap().await.unwrap_err();
        assert!(matches!(err, TransportError::CommandFailed(_)));
        assert_eq!(transport.last_error().as_deref(), Some("connection reset"));
        assert!(!transport.is_working());
    }

    #[tokio::test]
    async fn test_second_request_rejected_while_in_flight() {
        let (entry, release) =
            FakeEntry::gated(ok("<protocol><response>first</response></protocol>"));
        let sender = Arc::new(FakeCommandSender::with_script(vec![entry]));
        let (transport, recorder) = recording_transport(sender.clone());

        let first = transport.request("<op/>").unwrap();
        assert!(matches!(transport.request("<op/>"), Err(Rejected::Busy)));
        assert_eq!(*recorder.lock(), vec![(true, true)]);

        release.send(()).unwrap();
        assert_eq!(first.await.unwrap(), "first");
        assert_eq!(sender.sent().len(), 1);
        assert!(transport.last_error().is_none());
    }

    #[tokio::test]
    async fn test_stale_success_keeps_newer_request_working() {
        let (first_entry, release_first) =
            FakeEntry::gated(ok("<protocol><response>a</response></protocol>"));
        let (second_entry, release_second) =
            FakeEntry::gated(ok("<protocol><response>b</response></protocol>"));
        let sender = Arc::new(FakeCommandSender::with_script(vec![first_entry, second_entry]));
        let transport = SessionTransport::new(sender.clone(), None);

        let first = transport.request("<a/>").unwrap();
        transport.set_working(false, None);
        let second = transport.request("<b/>").unwrap();

        release_first.send(()).unwrap();
        assert_eq!(first.await.unwrap(), "a");

        assert!(transport.is_working());
        assert!(matches!(transport.request("<c/>"), Err(Rejected::Busy)));

        release_second.send(()).unwrap();
        assert_eq!(second.await.unwrap(), "b");
        assert!(!transport.is_working());
        assert_eq!(sender.sent().len(), 2);
    }

    #[test]
    fn test_request_outside_runtime_is_rejected() {
        let sender = Arc::new(FakeCommandSender::default());
        let (transport, recorder) = recording_transport(sender.clone());

        assert!(matches!(transport.request("<op/>"), Err(Rejected::NoRuntime)));
        assert!(!transport.is_working());
        assert!(recorder.lock().is_empty());
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_busy_rejection_keeps_last_error() {
        let (entry, release) = FakeEntry::gated(ok("<protocol><error>late</error></protocol>"));
        let sender = Arc::new(FakeCommandSender::with_script(vec![entry]));
        let transport = SessionTransport::new(sender, None);

        let first = transport.request("<a/>").unwrap();
        release.send(()).unwrap();
        assert!(first.await.is_err());

        transport.set_working(true, None);
        assert!(matches!(transport.request("<b/>"), Err(Rejected::Busy)));
        assert_eq!(transport.last_error().as_deref(), Some("late"));
    }

    #[tokio::test]
    async fn test_error_during_flight_withholds_payload() {
        let (entry, release) = FakeEntry::gated(ok("<protocol><response>data</response></protocol>"));
        let sender = Arc::new(FakeCommandSender::with_script(vec![entry]));
        let transport = SessionTransport::new(sender, None);

        let pending = transport.request("<op/>").unwrap();
        transport.error("instrument fault");
        release.send(()).unwrap();

        let err = pending.await.unwrap_err();
        assert!(matches!(err, TransportError::Interrupted(ref m) if m == "instrument fault"));
        assert_eq!(transport.last_error().as_deref(), Some("instrument fault"));
    }

    #[tokio::test]
    async fn test_transport_usable_after_error() {
        let sender = Arc::new(FakeCommandSender::new(vec![
            ok("<protocol><error>BOOM</error></protocol>"),
            ok("<protocol><response>again</response></protocol>"),
        ]));
        let transport = SessionTransport::new(sender, None);

        assert!(transport.request("<op/>").unwrap().await.is_err());
        assert!(transport.last_error().is_some());

        let pending = transport.request("<op/>").unwrap();
        assert!(transport.last_error().is_none());
        assert_eq!(pending.await.unwrap(), "again");
    }

    #[tokio::test]
    async fn test_request_from_error_hook_is_admitted() {
        let sender = Arc::new(FakeCommandSender::new(vec![
            ok("<protocol><error>retry me</error></protocol>"),
            ok("<protocol><response>recovered</response></protocol>"),
        ]));
        let transport = SessionTransport::new(sender, None);
        let reissued: Arc<Mutex<Option<PendingRequest>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&reissued);
        let handle = transport.clone();
        transport.set_on_error(move |_| {
            if let Ok(pending) = handle.request("<op/>") {
                *slot.lock() = Some(pending);
            }
        });

        assert!(transport.request("<op/>").unwrap().await.is_err());
        let pending = reissued.lock().take().expect("request reissued from hook");
        assert_eq!(pending.await.unwrap(), "recovered");
    }

    #[tokio::test]
    async fn test_error_hook_sees_stopped_state() {
        let transport = SessionTransport::new(Arc::new(FakeCommandSender::default()), None);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let handle = transport.clone();
        transport.set_on_error(move |_| {
            *sink.lock() = Some((handle.working_state(), handle.last_error()));
        });

        transport.set_working(true, None);
        transport.error("stop");

        let (state, recorded) = seen.lock().take().unwrap();
        assert_eq!(
            state,
            WorkingState {
                is_working: false,
                should_continue: false
            }
        );
        assert!(recorded.is_none());
        assert_eq!(transport.last_error().as_deref(), Some("stop"));
    }

    #[test]
    fn test_set_working_defaults_should_continue() {
        let (transport, recorder) = recording_transport(Arc::new(FakeCommandSender::default()));

        transport.set_working(true, None);
        transport.set_working(false, None);
        transport.set_working(false, None);

        assert_eq!(
            transport.working_state(),
            WorkingState {
                is_working: false,
                should_continue: true
            }
        );
        assert_eq!(*recorder.lock(), vec![(true, true), (false, true), (false, true)]);
    }

    #[test]
    fn test_working_events_broadcast() {
        let transport = SessionTransport::new(Arc::new(FakeCommandSender::default()), None);
        let mut rx = transport.subscribe();

        transport.set_working(true, Some(false));
        transport.error("BOOM");

        assert_eq!(
            rx.try_recv().unwrap(),
            TransportEvent::Working {
                is_working: true,
                should_continue: false
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            TransportEvent::Working {
                is_working: false,
                should_continue: false
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            TransportEvent::Error {
                message: "BOOM".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_dropped_pending_still_reports_error() {
        let sender = Arc::new(FakeCommandSender::new(vec![ok("garbage")]));
        let transport = SessionTransport::new(sender, None);
        let mut rx = transport.subscribe();

        drop(transport.request("<op/>").unwrap());

        loop {
            if let TransportEvent::Error { message } = rx.recv().await.unwrap() {
                assert_eq!(message, "Unable to parse response");
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_request_without_session_sends_empty_key() {
        let sender = Arc::new(FakeCommandSender::new(vec![ok(
            "<protocol><response/></protocol>",
        )]));
        let transport = SessionTransport::new(sender.clone(), None);

        assert_eq!(transport.request("<op/>").unwrap().await.unwrap(), "");
        assert!(sender.sent()[0].contains(r#"sessionkey="""#));
    }

    #[tokio::test]
    async fn test_shared_session_store() {
        let store = SessionStore::new();
        let login = Arc::new(FakeCommandSender::new(vec![ok(r#"{"sessionkey":"shared"}"#)]));
        let worker = Arc::new(FakeCommandSender::new(vec![ok(
            "<protocol><response>x</response></protocol>",
        )]));
        let a = SessionTransport::builder(login).session_store(store.clone()).build();
        let b = SessionTransport::builder(worker.clone()).session_store(store).build();

        a.connect().await.unwrap();
        b.request("<op/>").unwrap().await.unwrap();
        assert!(worker.sent()[0].contains(r#"sessionkey="shared""#));
    }

    #[test]
    fn test_set_measure_func_stores_nothing() {
        let transport = SessionTransport::new(Arc::new(FakeCommandSender::default()), None);
        transport.set_measure_func(|| {});
        assert!(!transport.is_working());
        assert!(transport.last_error().is_none());
    }
}
