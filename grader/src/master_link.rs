//! Long-lived connection to the yajudge master.
//!
//! The link advertises this node, keeps a server-streaming call open to
//! receive submissions, reports free capacity and sends back finished
//! submissions. Results that arrive while disconnected wait in the channel
//! for the next session. Any stream end or error
//! leads to a fixed one second backoff and a fresh connection; only
//! cancellation stops the loop.

use std::time::Duration;

use tokio::net::UnixStream;
use tokio::sync::{OwnedSemaphorePermit, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::Interceptor;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint, Uri};
use tower::service_fn;
use tracing::{debug, error, info, warn};
use yajudge_proto::course_content_provider_client::CourseContentProviderClient;
use yajudge_proto::submission_management_client::SubmissionManagementClient;
use yajudge_proto::{
    ConnectedServiceProperties, ConnectedServiceStatus, ContentStatus, ProblemContentRequest,
    ServiceStatus, Submission,
};

use crate::capacity::WorkerSlots;
use crate::config::Endpoints;
use crate::endpoint::RpcEndpoint;
use crate::error::{GraderError, GraderResult};
use crate::storage::Storage;

/// Pause between a lost stream and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);
/// Period of unsolicited status pushes while streaming.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const SHUTDOWN_PUSH_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Streaming,
    Backoff,
}

/// Adds the node's private token to every call.
#[derive(Clone)]
pub struct TokenInterceptor {
    token: MetadataValue<Ascii>,
}

impl TokenInterceptor {
    pub fn new(token: &str) -> GraderResult<Self> {
        let token = token
            .parse()
            .map_err(|_| GraderError::Config("private token is not valid ASCII metadata".into()))?;
        Ok(Self { token })
    }
}

impl Interceptor for TokenInterceptor {
    fn call(&mut self, mut request: tonic::Request<()>) -> Result<tonic::Request<()>, tonic::Status> {
        request.metadata_mut().insert("token", self.token.clone());
        Ok(request)
    }
}

type AuthChannel = InterceptedService<Channel, TokenInterceptor>;

struct Clients {
    submissions: SubmissionManagementClient<AuthChannel>,
    content: CourseContentProviderClient<AuthChannel>,
}

/// Why a streaming session ended.
enum SessionEnd {
    Cancelled,
    Lost,
}

pub struct MasterLink {
    endpoints: Endpoints,
    interceptor: TokenInterceptor,
    properties: ConnectedServiceProperties,
    slots: WorkerSlots,
    storage: Storage,
    dispatch: mpsc::UnboundedSender<Submission>,
    results: mpsc::UnboundedReceiver<Submission>,
    state: watch::Sender<LinkState>,
}

impl MasterLink {
    pub fn new(
        endpoints: Endpoints,
        token: &str,
        properties: ConnectedServiceProperties,
        slots: WorkerSlots,
        storage: Storage,
        dispatch: mpsc::UnboundedSender<Submission>,
        results: mpsc::UnboundedReceiver<Submission>,
    ) -> GraderResult<Self> {
        let (state, _) = watch::channel(LinkState::Idle);
        Ok(Self {
            endpoints,
            interceptor: TokenInterceptor::new(token)?,
            properties,
            slots,
            storage,
            dispatch,
            results,
            state,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: LinkState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!(from = ?prev, to = ?next, "master link state");
        }
    }

    /// Run until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        let _link_slot = reserve_link_slot(&self.slots);
        info!(
            submissions = %self.endpoints.submissions,
            content = %self.endpoints.courses_content,
            name = %self.properties.name,
            "master link starting"
        );
        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.set_state(LinkState::Connecting);
            match self.connect().await {
                Ok(mut clients) => {
                    self.set_state(LinkState::Streaming);
                    if let SessionEnd::Cancelled = self.stream(&mut clients, &cancel).await {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "cannot connect to master"),
            }
            if cancel.is_cancelled() {
                break;
            }
            self.set_state(LinkState::Backoff);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }
        self.set_state(LinkState::Idle);
        info!("master link stopped");
    }

    async fn connect(&self) -> GraderResult<Clients> {
        let submissions = open_channel(&self.endpoints.submissions).await?;
        let content = if self.endpoints.courses_content == self.endpoints.submissions {
            submissions.clone()
        } else {
            open_channel(&self.endpoints.courses_content).await?
        };
        Ok(Clients {
            submissions: SubmissionManagementClient::with_interceptor(
                submissions,
                self.interceptor.clone(),
            ),
            content: CourseContentProviderClient::with_interceptor(
                content,
                self.interceptor.clone(),
            ),
        })
    }

    async fn stream(&mut self, clients: &mut Clients, cancel: &CancellationToken) -> SessionEnd {
        self.push_status(clients, None).await;

        let opened = tokio::select! {
            _ = cancel.cancelled() => return SessionEnd::Cancelled,
            r = clients.submissions.receive_submissions_to_process(self.properties.clone()) => r,
        };
        let mut submissions = match opened {
            Ok(response) => response.into_inner(),
            Err(status) => {
                warn!(code = ?status.code(), message = status.message(), "cannot open submissions stream");
                return SessionEnd::Lost;
            }
        };
        info!("receiving submissions");

        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + STATUS_INTERVAL,
            STATUS_INTERVAL,
        );
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let push = self.push_status(clients, Some(ServiceStatus::ShuttingDown));
                    if tokio::time::timeout(SHUTDOWN_PUSH_TIMEOUT, push).await.is_err() {
                        debug!("shutdown status push timed out");
                    }
                    return SessionEnd::Cancelled;
                }
                Some(done) = self.results.recv() => report_result(clients, done).await,
                _ = ticker.tick() => self.push_status(clients, None).await,
                message = submissions.message() => match message {
                    Ok(Some(submission)) => {
                        self.accept(clients, submission).await;
                        self.push_status(clients, None).await;
                    }
                    Ok(None) => {
                        info!("submissions stream closed by master");
                        return SessionEnd::Lost;
                    }
                    Err(status) => {
                        warn!(code = ?status.code(), message = status.message(), "submissions stream failed");
                        return SessionEnd::Lost;
                    }
                },
            }
        }
    }

    /// Report capacity. Failures are logged and otherwise ignored.
    async fn push_status(&self, clients: &mut Clients, status: Option<ServiceStatus>) {
        let capacity = self.slots.capacity();
        let status = status.unwrap_or_else(|| capacity.service_status());
        let message = ConnectedServiceStatus {
            properties: Some(self.properties.clone()),
            status: status as i32,
            capacity: i32::try_from(capacity.free_slots()).unwrap_or(i32::MAX),
        };
        match clients.submissions.set_external_service_status(message).await {
            Ok(_) => debug!(
                status = status.as_str_name(),
                free = capacity.free_slots(),
                "status pushed"
            ),
            Err(e) => warn!(code = ?e.code(), message = e.message(), "status push failed"),
        }
    }

    async fn accept(&self, clients: &mut Clients, submission: Submission) {
        info!(id = submission.id, problem = %submission.problem_id, "submission received");
        if let Err(e) = self.fetch_problem(clients, &submission).await {
            error!(id = submission.id, error = %e, "failed to fetch submission problem");
            return;
        }
        if self.dispatch.send(submission).is_err() {
            error!("jobs manager is gone, submission dropped");
        }
    }

    /// Refresh the cached problem content unless the master reports it unchanged.
    async fn fetch_problem(&self, clients: &mut Clients, submission: &Submission) -> GraderResult<()> {
        let has_files = submission
            .solution_files
            .as_ref()
            .is_some_and(|set| !set.files.is_empty());
        if !has_files {
            return Err(GraderError::Storage(format!(
                "submission {} has no solution files",
                submission.id
            )));
        }
        let course_data_id = submission
            .course
            .as_ref()
            .map(|c| c.data_id.clone())
            .unwrap_or_default();
        let problem_id = submission.problem_id.clone();
        let cached_timestamp = self
            .storage
            .problem_timestamp(&course_data_id, &problem_id)
            .unwrap_or(0);

        let response = clients
            .content
            .get_problem_full_content(ProblemContentRequest {
                course_data_id,
                problem_id,
                cached_timestamp,
            })
            .await?
            .into_inner();
        if response.status() == ContentStatus::HasData {
            let root = self.storage.store_problem(&response)?;
            debug!(path = %root.display(), last_modified = response.last_modified, "problem cached");
        }
        Ok(())
    }
}

/// The link holds one worker slot while it runs.
fn reserve_link_slot(slots: &WorkerSlots) -> Option<OwnedSemaphorePermit> {
    let permit = slots.try_acquire();
    if permit.is_none() {
        warn!(
            pool = slots.pool_size(),
            "no free slot for the master link, running without one"
        );
    }
    permit
}

/// Send a finished submission to the master. Failures are logged and the
/// result is dropped.
async fn report_result(clients: &mut Clients, submission: Submission) {
    let id = submission.id;
    let status = submission.status();
    match clients.submissions.update_grader_output(submission).await {
        Ok(_) => debug!(id, status = status.as_str_name(), "result reported"),
        Err(e) => error!(id, code = ?e.code(), message = e.message(), "result report failed"),
    }
}

async fn open_channel(endpoint: &RpcEndpoint) -> GraderResult<Channel> {
    let channel = match endpoint {
        RpcEndpoint::Unix(path) => {
            let path = path.clone();
            // The authority is ignored: the connector always dials the socket.
            Endpoint::try_from("http://[::]:50051")?
                .connect_with_connector(service_fn(move |_: Uri| {
                    let path = path.clone();
                    async move { UnixStream::connect(path).await }
                }))
                .await?
        }
        RpcEndpoint::Http { .. } => {
            Endpoint::from_shared(endpoint.to_string())?
                .connect_timeout(CONNECT_TIMEOUT)
                .connect()
                .await?
        }
        RpcEndpoint::Https { .. } => {
            let mut tls = ClientTlsConfig::new();
            if let Some(domain) = endpoint.tls_domain() {
                tls = tls.domain_name(domain);
            }
            Endpoint::from_shared(endpoint.to_string())?
                .connect_timeout(CONNECT_TIMEOUT)
                .tls_config(tls)?
                .connect()
                .await?
        }
    };
    Ok(channel)
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use tokio::net::TcpListener;
    use tokio_stream::Stream;
    use tokio_stream::wrappers::TcpListenerStream;
    use tonic::transport::Server;
    use tonic::{Request, Response, Status};
    use yajudge_proto::course_content_provider_server::{
        CourseContentProvider, CourseContentProviderServer,
    };
    use yajudge_proto::submission_management_server::{
        SubmissionManagement, SubmissionManagementServer,
    };
    use yajudge_proto::{
        Course, Empty, File, FileSet, ProblemContentResponse, ProblemData, SolutionStatus,
    };

    use super::*;
    use crate::config::LocationsConfig;

    const TOKEN: &str = "secret-token";

    #[derive(Default)]
    struct Recorded {
        sessions: Vec<Instant>,
        statuses: Vec<ConnectedServiceStatus>,
        content_requests: Vec<ProblemContentRequest>,
        results: Vec<Submission>,
    }

    /// Serves exactly one submission per stream, then closes it.
    #[derive(Clone, Default)]
    struct StubMaster {
        recorded: Arc<Mutex<Recorded>>,
    }

    fn check_token<T>(request: &Request<T>) -> Result<(), Status> {
        match request.metadata().get("token") {
            Some(v) if v == TOKEN => Ok(()),
            _ => Err(Status::unauthenticated("bad token")),
        }
    }

    #[tonic::async_trait]
    impl SubmissionManagement for StubMaster {
        async fn set_external_service_status(
            &self,
            request: Request<ConnectedServiceStatus>,
        ) -> Result<Response<Empty>, Status> {
            check_token(&request)?;
            self.recorded.lock().unwrap().statuses.push(request.into_inner());
            Ok(Response::new(Empty {}))
        }

        async fn update_grader_output(
            &self,
            request: Request<Submission>,
        ) -> Result<Response<Submission>, Status> {
            check_token(&request)?;
            let submission = request.into_inner();
            self.recorded.lock().unwrap().results.push(submission.clone());
            Ok(Response::new(submission))
        }

        type ReceiveSubmissionsToProcessStream =
            Pin<Box<dyn Stream<Item = Result<Submission, Status>> + Send>>;

        async fn receive_submissions_to_process(
            &self,
            request: Request<ConnectedServiceProperties>,
        ) -> Result<Response<Self::ReceiveSubmissionsToProcessStream>, Status> {
            check_token(&request)?;
            let id = {
                let mut recorded = self.recorded.lock().unwrap();
                recorded.sessions.push(Instant::now());
                recorded.sessions.len() as i64
            };
            let submission = Submission {
                id,
                course: Some(Course {
                    data_id: "course".into(),
                    ..Default::default()
                }),
                problem_id: "ch1:sum".into(),
                solution_files: Some(FileSet {
                    files: vec![File {
                        name: "main.c".into(),
                        data: b"int main(){return 0;}".to_vec(),
                        ..Default::default()
                    }],
                }),
                ..Default::default()
            };
            let stream = tokio_stream::iter(vec![Ok(submission)]);
            Ok(Response::new(Box::pin(stream)))
        }
    }

    #[tonic::async_trait]
    impl CourseContentProvider for StubMaster {
        async fn get_problem_full_content(
            &self,
            request: Request<ProblemContentRequest>,
        ) -> Result<Response<ProblemContentResponse>, Status> {
            check_token(&request)?;
            let request = request.into_inner();
            self.recorded
                .lock()
                .unwrap()
                .content_requests
                .push(request.clone());
            Ok(Response::new(ProblemContentResponse {
                course_data_id: request.course_data_id,
                problem_id: request.problem_id.clone(),
                last_modified: 42,
                status: ContentStatus::HasData as i32,
                data: Some(ProblemData {
                    id: request.problem_id,
                    ..Default::default()
                }),
            }))
        }
    }

    async fn start_stub(stub: StubMaster) -> (u16, tokio::sync::oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            Server::builder()
                .add_service(SubmissionManagementServer::new(stub.clone()))
                .add_service(CourseContentProviderServer::new(stub))
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = stop_rx.await;
                })
                .await
                .unwrap();
        });
        (port, stop_tx)
    }

    struct TestLink {
        link: MasterLink,
        storage: Storage,
        dispatched: mpsc::UnboundedReceiver<Submission>,
        finished: mpsc::UnboundedSender<Submission>,
    }

    fn link_for(port: u16, dir: &std::path::Path) -> TestLink {
        let endpoint = RpcEndpoint::Http {
            host: "127.0.0.1".into(),
            port,
        };
        let storage = Storage::new(&LocationsConfig {
            working_directory: dir.join("work"),
            cache_directory: dir.join("cache"),
            system_environment: "/".into(),
            cgroup_root: None,
            fork_guard_library: None,
        });
        let (tx, dispatched) = mpsc::unbounded_channel();
        let (finished, results) = mpsc::unbounded_channel();
        let properties = crate::properties::service_properties("test-node", false, 2, 1.0);
        let link = MasterLink::new(
            Endpoints {
                courses_content: endpoint.clone(),
                submissions: endpoint,
            },
            TOKEN,
            properties,
            WorkerSlots::new(2),
            storage.clone(),
            tx,
            results,
        )
        .unwrap();
        TestLink {
            link,
            storage,
            dispatched,
            finished,
        }
    }

    #[tokio::test]
    async fn reconnects_after_stream_end_with_backoff() {
        let stub = StubMaster::default();
        let (port, stop) = start_stub(stub.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let TestLink {
            link,
            storage,
            dispatched: mut rx,
            finished,
        } = link_for(port, dir.path());
        let mut result = Submission {
            id: 77,
            build_error_log: "checker crashed".into(),
            ..Default::default()
        };
        result.set_status(SolutionStatus::CheckFailed);
        finished.send(result.clone()).unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(link.run(cancel.clone()));

        let wait = Duration::from_secs(10);
        let first = tokio::time::timeout(wait, rx.recv()).await.unwrap().unwrap();
        let second = tokio::time::timeout(wait, rx.recv()).await.unwrap().unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        tokio::time::timeout(wait, async {
            while stub.recorded.lock().unwrap().results.is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap();

        cancel.cancel();
        tokio::time::timeout(wait, handle).await.unwrap().unwrap();
        let _ = stop.send(());

        let recorded = stub.recorded.lock().unwrap();
        let gap = recorded.sessions[1].duration_since(recorded.sessions[0]);
        assert!(gap >= RECONNECT_DELAY, "reconnected after {gap:?}");

        let first_status = &recorded.statuses[0];
        assert_eq!(first_status.status(), ServiceStatus::Idle);
        assert_eq!(first_status.capacity, 2);
        assert_eq!(first_status.properties.as_ref().unwrap().name, "test-node");

        assert_eq!(recorded.content_requests[0].cached_timestamp, 0);
        assert_eq!(recorded.content_requests[1].cached_timestamp, 42);
        assert_eq!(storage.problem_timestamp("course", "ch1:sum"), Some(42));
        assert_eq!(recorded.results, vec![result]);
    }

    #[tokio::test]
    async fn wrong_token_never_delivers() {
        let stub = StubMaster::default();
        let (port, stop) = start_stub(stub.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let TestLink {
            mut link,
            dispatched: mut rx,
            ..
        } = link_for(port, dir.path());
        link.interceptor = TokenInterceptor::new("wrong").unwrap();
        let mut state = link.subscribe();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(link.run(cancel.clone()));

        tokio::time::timeout(Duration::from_secs(10), state.wait_for(|s| *s == LinkState::Backoff))
            .await
            .unwrap()
            .unwrap();
        assert!(rx.try_recv().is_err());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*state.borrow(), LinkState::Idle);
        let _ = stop.send(());
        assert!(stub.recorded.lock().unwrap().sessions.is_empty());
    }

    #[tokio::test]
    async fn unreachable_master_backs_off_until_cancelled() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let TestLink { link, .. } = link_for(port, dir.path());
        let mut state = link.subscribe();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(link.run(cancel.clone()));

        tokio::time::timeout(Duration::from_secs(10), state.wait_for(|s| *s == LinkState::Backoff))
            .await
            .unwrap()
            .unwrap();
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn link_slot_is_optional_when_pool_is_exhausted() {
        let slots = WorkerSlots::new(1);
        let held = [reserve_link_slot(&slots), reserve_link_slot(&slots)];
        assert!(held.iter().all(Option::is_some));
        assert_eq!(slots.active_tasks(), 2);
        assert!(reserve_link_slot(&slots).is_none());
        drop(held);
        assert_eq!(slots.active_tasks(), 0);
    }
}
