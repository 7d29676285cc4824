#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("rpc error: {0}")]
    Rpc(Box<tonic::Status>),

    #[error("sandbox error: {0}")]
    Sandbox(#[from] sandbox::SandboxError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tonic::Status> for GraderError {
    fn from(status: tonic::Status) -> Self {
        GraderError::Rpc(Box::new(status))
    }
}

pub type GraderResult<T> = Result<T, GraderError>;
