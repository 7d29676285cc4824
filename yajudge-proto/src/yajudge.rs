#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Empty {}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct File {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "3")]
    pub description: ::prost::alloc::string::String,
    #[prost(int32, tag = "4")]
    pub permissions: i32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileSet {
    #[prost(message, repeated, tag = "1")]
    pub files: ::prost::alloc::vec::Vec<File>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GradingPlatform {
    #[prost(enumeration = "Arch", tag = "1")]
    pub arch: i32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GradingLimits {
    #[prost(int32, tag = "1")]
    pub stack_size_limit_mb: i32,
    #[prost(int32, tag = "2")]
    pub memory_max_limit_mb: i32,
    #[prost(int32, tag = "3")]
    pub cpu_time_limit_sec: i32,
    #[prost(int32, tag = "4")]
    pub real_time_limit_sec: i32,
    #[prost(int32, tag = "5")]
    pub proc_count_limit: i32,
    #[prost(int32, tag = "6")]
    pub fd_count_limit: i32,
    #[prost(int32, tag = "7")]
    pub stdout_size_limit_mb: i32,
    #[prost(int32, tag = "8")]
    pub stderr_size_limit_mb: i32,
    #[prost(bool, tag = "9")]
    pub allow_network: bool,
    #[prost(int32, tag = "11")]
    pub new_proc_delay_msec: i32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GradingOptions {
    #[prost(message, optional, tag = "6")]
    pub limits: ::core::option::Option<GradingLimits>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProblemData {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub unique_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub title: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "6")]
    pub statement_files: ::core::option::Option<FileSet>,
    #[prost(message, optional, tag = "7")]
    pub solution_files: ::core::option::Option<FileSet>,
    #[prost(message, optional, tag = "8")]
    pub grader_files: ::core::option::Option<FileSet>,
    #[prost(message, optional, tag = "10")]
    pub grading_options: ::core::option::Option<GradingOptions>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Course {
    #[prost(int32, tag = "1")]
    pub id: i32,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub data_id: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Submission {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(message, optional, tag = "3")]
    pub course: ::core::option::Option<Course>,
    #[prost(int64, tag = "4")]
    pub datetime: i64,
    #[prost(message, optional, tag = "5")]
    pub solution_files: ::core::option::Option<FileSet>,
    #[prost(enumeration = "SolutionStatus", tag = "6")]
    pub status: i32,
    #[prost(double, tag = "7")]
    pub grader_score: f64,
    #[prost(string, tag = "8")]
    pub grader_name: ::prost::alloc::string::String,
    #[prost(string, tag = "9")]
    pub style_error_log: ::prost::alloc::string::String,
    #[prost(string, tag = "10")]
    pub build_error_log: ::prost::alloc::string::String,
    #[prost(string, tag = "12")]
    pub problem_id: ::prost::alloc::string::String,
    #[prost(enumeration = "SubmissionProcessStatus", tag = "100")]
    pub grading_status: i32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProblemContentRequest {
    #[prost(string, tag = "1")]
    pub course_data_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub problem_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub cached_timestamp: i64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProblemContentResponse {
    #[prost(string, tag = "1")]
    pub course_data_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub problem_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub last_modified: i64,
    #[prost(enumeration = "ContentStatus", tag = "4")]
    pub status: i32,
    #[prost(message, optional, tag = "5")]
    pub data: ::core::option::Option<ProblemData>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConnectedServiceProperties {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub platform: ::core::option::Option<GradingPlatform>,
    #[prost(double, tag = "3")]
    pub performance_rating: f64,
    #[prost(bool, tag = "4")]
    pub arch_specific_only_jobs: bool,
    #[prost(int32, tag = "5")]
    pub number_of_workers: i32,
    #[prost(enumeration = "ServiceRole", tag = "10")]
    pub role: i32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConnectedServiceStatus {
    #[prost(message, optional, tag = "1")]
    pub properties: ::core::option::Option<ConnectedServiceProperties>,
    #[prost(enumeration = "ServiceStatus", tag = "2")]
    pub status: i32,
    #[prost(int32, tag = "3")]
    pub capacity: i32,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Arch {
    Any = 0,
    X86 = 1,
    X8664 = 2,
    Armv7 = 3,
    Aarch64 = 4,
}
impl Arch {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Arch::Any => "ARCH_ANY",
            Arch::X86 => "ARCH_X86",
            Arch::X8664 => "ARCH_X86_64",
            Arch::Armv7 => "ARCH_ARMV7",
            Arch::Aarch64 => "ARCH_AARCH64",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "ARCH_ANY" => Some(Self::Any),
            "ARCH_X86" => Some(Self::X86),
            "ARCH_X86_64" => Some(Self::X8664),
            "ARCH_ARMV7" => Some(Self::Armv7),
            "ARCH_AARCH64" => Some(Self::Aarch64),
            _ => None,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SolutionStatus {
    AnyStatusOrNull = 0,
    StyleCheckError = 3,
    CompilationError = 4,
    WrongAnswer = 5,
    SummonForDefence = 6,
    PendingReview = 7,
    CodeReviewRejected = 8,
    Disqualified = 12,
    CheckFailed = 13,
    RuntimeError = 14,
    TimeLimit = 15,
    ValgrindErrors = 16,
    Ok = 100,
    HardDeadlinePassed = 300,
}
impl SolutionStatus {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            SolutionStatus::AnyStatusOrNull => "ANY_STATUS_OR_NULL",
            SolutionStatus::StyleCheckError => "STYLE_CHECK_ERROR",
            SolutionStatus::CompilationError => "COMPILATION_ERROR",
            SolutionStatus::WrongAnswer => "WRONG_ANSWER",
            SolutionStatus::SummonForDefence => "SUMMON_FOR_DEFENCE",
            SolutionStatus::PendingReview => "PENDING_REVIEW",
            SolutionStatus::CodeReviewRejected => "CODE_REVIEW_REJECTED",
            SolutionStatus::Disqualified => "DISQUALIFIED",
            SolutionStatus::CheckFailed => "CHECK_FAILED",
            SolutionStatus::RuntimeError => "RUNTIME_ERROR",
            SolutionStatus::TimeLimit => "TIME_LIMIT",
            SolutionStatus::ValgrindErrors => "VALGRIND_ERRORS",
            SolutionStatus::Ok => "OK",
            SolutionStatus::HardDeadlinePassed => "HARD_DEADLINE_PASSED",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "ANY_STATUS_OR_NULL" => Some(Self::AnyStatusOrNull),
            "STYLE_CHECK_ERROR" => Some(Self::StyleCheckError),
            "COMPILATION_ERROR" => Some(Self::CompilationError),
            "WRONG_ANSWER" => Some(Self::WrongAnswer),
            "SUMMON_FOR_DEFENCE" => Some(Self::SummonForDefence),
            "PENDING_REVIEW" => Some(Self::PendingReview),
            "CODE_REVIEW_REJECTED" => Some(Self::CodeReviewRejected),
            "DISQUALIFIED" => Some(Self::Disqualified),
            "CHECK_FAILED" => Some(Self::CheckFailed),
            "RUNTIME_ERROR" => Some(Self::RuntimeError),
            "TIME_LIMIT" => Some(Self::TimeLimit),
            "VALGRIND_ERRORS" => Some(Self::ValgrindErrors),
            "OK" => Some(Self::Ok),
            "HARD_DEADLINE_PASSED" => Some(Self::HardDeadlinePassed),
            _ => None,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SubmissionProcessStatus {
    ProcessQueued = 0,
    ProcessAssigned = 1,
    ProcessDone = 2,
}
impl SubmissionProcessStatus {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            SubmissionProcessStatus::ProcessQueued => "PROCESS_QUEUED",
            SubmissionProcessStatus::ProcessAssigned => "PROCESS_ASSIGNED",
            SubmissionProcessStatus::ProcessDone => "PROCESS_DONE",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "PROCESS_QUEUED" => Some(Self::ProcessQueued),
            "PROCESS_ASSIGNED" => Some(Self::ProcessAssigned),
            "PROCESS_DONE" => Some(Self::ProcessDone),
            _ => None,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ContentStatus {
    HasData = 0,
    NotChanged = 1,
}
impl ContentStatus {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ContentStatus::HasData => "HAS_DATA",
            ContentStatus::NotChanged => "NOT_CHANGED",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "HAS_DATA" => Some(Self::HasData),
            "NOT_CHANGED" => Some(Self::NotChanged),
            _ => None,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ServiceRole {
    ServiceGrading = 0,
    ServiceCheatChecking = 1,
}
impl ServiceRole {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ServiceRole::ServiceGrading => "SERVICE_GRADING",
            ServiceRole::ServiceCheatChecking => "SERVICE_CHEAT_CHECKING",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "SERVICE_GRADING" => Some(Self::ServiceGrading),
            "SERVICE_CHEAT_CHECKING" => Some(Self::ServiceCheatChecking),
            _ => None,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ServiceStatus {
    Unknown = 0,
    Idle = 1,
    Busy = 2,
    ShuttingDown = 3,
}
impl ServiceStatus {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "SERVICE_STATUS_UNKNOWN",
            ServiceStatus::Idle => "SERVICE_STATUS_IDLE",
            ServiceStatus::Busy => "SERVICE_STATUS_BUSY",
            ServiceStatus::ShuttingDown => "SERVICE_STATUS_SHUTTING_DOWN",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "SERVICE_STATUS_UNKNOWN" => Some(Self::Unknown),
            "SERVICE_STATUS_IDLE" => Some(Self::Idle),
            "SERVICE_STATUS_BUSY" => Some(Self::Busy),
            "SERVICE_STATUS_SHUTTING_DOWN" => Some(Self::ShuttingDown),
            _ => None,
        }
    }
}
/// Generated client implementations.
pub mod submission_management_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    #[derive(Debug, Clone)]
    pub struct SubmissionManagementClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl SubmissionManagementClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> SubmissionManagementClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> SubmissionManagementClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
            >>::Error: Into<StdError> + Send + Sync,
        {
            SubmissionManagementClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        pub async fn set_external_service_status(
            &mut self,
            request: impl tonic::IntoRequest<super::ConnectedServiceStatus>,
        ) -> std::result::Result<tonic::Response<super::Empty>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/yajudge.SubmissionManagement/SetExternalServiceStatus",
            );
            let req = request.into_request();
            self.inner.unary(req, path, codec).await
        }
        pub async fn receive_submissions_to_process(
            &mut self,
            request: impl tonic::IntoRequest<super::ConnectedServiceProperties>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::Submission>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/yajudge.SubmissionManagement/ReceiveSubmissionsToProcess",
            );
            let req = request.into_request();
            self.inner.server_streaming(req, path, codec).await
        }
        pub async fn update_grader_output(
            &mut self,
            request: impl tonic::IntoRequest<super::Submission>,
        ) -> std::result::Result<tonic::Response<super::Submission>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/yajudge.SubmissionManagement/UpdateGraderOutput",
            );
            let req = request.into_request();
            self.inner.unary(req, path, codec).await
        }
    }
}
/// Generated client implementations.
pub mod course_content_provider_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    #[derive(Debug, Clone)]
    pub struct CourseContentProviderClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl CourseContentProviderClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> CourseContentProviderClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> CourseContentProviderClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
            >>::Error: Into<StdError> + Send + Sync,
        {
            CourseContentProviderClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        pub async fn get_problem_full_content(
            &mut self,
            request: impl tonic::IntoRequest<super::ProblemContentRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ProblemContentResponse>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/yajudge.CourseContentProvider/GetProblemFullContent",
            );
            let req = request.into_request();
            self.inner.unary(req, path, codec).await
        }
    }
}
/// Generated server implementations.
pub mod submission_management_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    /// Generated trait containing gRPC methods that should be implemented for use with SubmissionManagementServer.
    #[async_trait]
    pub trait SubmissionManagement: Send + Sync + 'static {
        async fn set_external_service_status(
            &self,
            request: tonic::Request<super::ConnectedServiceStatus>,
        ) -> std::result::Result<tonic::Response<super::Empty>, tonic::Status>;
        /// Server streaming response type for the ReceiveSubmissionsToProcess method.
        type ReceiveSubmissionsToProcessStream: futures_core::Stream<
                Item = std::result::Result<super::Submission, tonic::Status>,
            >
            + Send
            + 'static;
        async fn receive_submissions_to_process(
            &self,
            request: tonic::Request<super::ConnectedServiceProperties>,
        ) -> std::result::Result<
            tonic::Response<Self::ReceiveSubmissionsToProcessStream>,
            tonic::Status,
        >;
        async fn update_grader_output(
            &self,
            request: tonic::Request<super::Submission>,
        ) -> std::result::Result<tonic::Response<super::Submission>, tonic::Status>;
    }
    #[derive(Debug)]
    pub struct SubmissionManagementServer<T: SubmissionManagement> {
        inner: _Inner<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
    }
    struct _Inner<T>(Arc<T>);
    impl<T: SubmissionManagement> SubmissionManagementServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }
        pub fn from_arc(inner: Arc<T>) -> Self {
            let inner = _Inner(inner);
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
            }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }
        /// Enable decompressing requests with the given encoding.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.accept_compression_encodings.enable(encoding);
            self
        }
        /// Compress responses with the given encoding, if the client supports it.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.send_compression_encodings.enable(encoding);
            self
        }
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for SubmissionManagementServer<T>
    where
        T: SubmissionManagement,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/yajudge.SubmissionManagement/SetExternalServiceStatus" => {
                    #[allow(non_camel_case_types)]
                    struct SetExternalServiceStatusSvc<T: SubmissionManagement>(pub Arc<T>);
                    impl<
                        T: SubmissionManagement,
                    > tonic::server::UnaryService<super::ConnectedServiceStatus>
                    for SetExternalServiceStatusSvc<T> {
                        type Response = super::Empty;
                        type Future = BoxFuture<
                            tonic::Response<Self::Response>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ConnectedServiceStatus>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                (*inner).set_external_service_status(request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = SetExternalServiceStatusSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/yajudge.SubmissionManagement/UpdateGraderOutput" => {
                    #[allow(non_camel_case_types)]
                    struct UpdateGraderOutputSvc<T: SubmissionManagement>(pub Arc<T>);
                    impl<
                        T: SubmissionManagement,
                    > tonic::server::UnaryService<super::Submission>
                    for UpdateGraderOutputSvc<T> {
                        type Response = super::Submission;
                        type Future = BoxFuture<
                            tonic::Response<Self::Response>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::Submission>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                (*inner).update_grader_output(request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = UpdateGraderOutputSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/yajudge.SubmissionManagement/ReceiveSubmissionsToProcess" => {
                    #[allow(non_camel_case_types)]
                    struct ReceiveSubmissionsToProcessSvc<T: SubmissionManagement>(
                        pub Arc<T>,
                    );
                    impl<
                        T: SubmissionManagement,
                    > tonic::server::ServerStreamingService<
                        super::ConnectedServiceProperties,
                    > for ReceiveSubmissionsToProcessSvc<T> {
                        type Response = super::Submission;
                        type ResponseStream = T::ReceiveSubmissionsToProcessStream;
                        type Future = BoxFuture<
                            tonic::Response<Self::ResponseStream>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ConnectedServiceProperties>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                (*inner).receive_submissions_to_process(request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = ReceiveSubmissionsToProcessSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            );
                        let res = grpc.server_streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => {
                    Box::pin(async move {
                        Ok(
                            http::Response::builder()
                                .status(200)
                                .header("grpc-status", "12")
                                .header("content-type", "application/grpc")
                                .body(empty_body())
                                .unwrap(),
                        )
                    })
                }
            }
        }
    }
    impl<T: SubmissionManagement> Clone for SubmissionManagementServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
            }
        }
    }
    impl<T: SubmissionManagement> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(Arc::clone(&self.0))
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: SubmissionManagement> tonic::server::NamedService
    for SubmissionManagementServer<T> {
        const NAME: &'static str = "yajudge.SubmissionManagement";
    }
}
/// Generated server implementations.
pub mod course_content_provider_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    /// Generated trait containing gRPC methods that should be implemented for use with CourseContentProviderServer.
    #[async_trait]
    pub trait CourseContentProvider: Send + Sync + 'static {
        async fn get_problem_full_content(
            &self,
            request: tonic::Request<super::ProblemContentRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ProblemContentResponse>,
            tonic::Status,
        >;
    }
    #[derive(Debug)]
    pub struct CourseContentProviderServer<T: CourseContentProvider> {
        inner: _Inner<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
    }
    struct _Inner<T>(Arc<T>);
    impl<T: CourseContentProvider> CourseContentProviderServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }
        pub fn from_arc(inner: Arc<T>) -> Self {
            let inner = _Inner(inner);
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
            }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }
        /// Enable decompressing requests with the given encoding.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.accept_compression_encodings.enable(encoding);
            self
        }
        /// Compress responses with the given encoding, if the client supports it.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.send_compression_encodings.enable(encoding);
            self
        }
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for CourseContentProviderServer<T>
    where
        T: CourseContentProvider,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/yajudge.CourseContentProvider/GetProblemFullContent" => {
                    #[allow(non_camel_case_types)]
                    struct GetProblemFullContentSvc<T: CourseContentProvider>(pub Arc<T>);
                    impl<
                        T: CourseContentProvider,
                    > tonic::server::UnaryService<super::ProblemContentRequest>
                    for GetProblemFullContentSvc<T> {
                        type Response = super::ProblemContentResponse;
                        type Future = BoxFuture<
                            tonic::Response<Self::Response>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProblemContentRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                (*inner).get_problem_full_content(request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = GetProblemFullContentSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            );
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => {
                    Box::pin(async move {
                        Ok(
                            http::Response::builder()
                                .status(200)
                                .header("grpc-status", "12")
                                .header("content-type", "application/grpc")
                                .body(empty_body())
                                .unwrap(),
                        )
                    })
                }
            }
        }
    }
    impl<T: CourseContentProvider> Clone for CourseContentProviderServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
            }
        }
    }
    impl<T: CourseContentProvider> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(Arc::clone(&self.0))
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: CourseContentProvider> tonic::server::NamedService
    for CourseContentProviderServer<T> {
        const NAME: &'static str = "yajudge.CourseContentProvider";
    }
}
