use std::fmt;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{GraderError, GraderResult};

/// Where a master service listens, after scheme aliases and default ports
/// are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcEndpoint {
    Unix(PathBuf),
    Http { host: String, port: u16 },
    Https { host: String, port: u16 },
}

impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcEndpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            RpcEndpoint::Http { host, port } => write!(f, "http://{}:{port}", Authority(host)),
            RpcEndpoint::Https { host, port } => write!(f, "https://{}:{port}", Authority(host)),
        }
    }
}

/// Host part of a URI authority; IPv6 literals get their brackets back.
struct Authority<'a>(&'a str);

impl fmt::Display for Authority<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.contains(':') {
            write!(f, "[{}]", self.0)
        } else {
            f.write_str(self.0)
        }
    }
}

impl RpcEndpoint {
    /// Resolve a configured endpoint string.
    ///
    /// `grpc` and `grpcs` are aliases for `http` and `https`. A value without
    /// a scheme is a unix socket path, relative paths being taken from
    /// `config_dir`.
    pub fn resolve(value: &str, config_dir: &Path) -> GraderResult<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(GraderError::Config("empty endpoint".into()));
        }
        if !value.contains("://") {
            let path = Path::new(value);
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                config_dir.join(path)
            };
            return Ok(RpcEndpoint::Unix(path));
        }

        let url = Url::parse(value)
            .map_err(|e| GraderError::Config(format!("endpoint {value:?}: {e}")))?;
        let host = || -> GraderResult<String> {
            match url.host_str() {
                Some(h) if !h.is_empty() => Ok(h.trim_matches(['[', ']']).to_string()),
                _ => Err(GraderError::Config(format!("endpoint {value:?} has no host"))),
            }
        };
        match url.scheme() {
            "unix" => Ok(RpcEndpoint::Unix(PathBuf::from(url.path()))),
            "http" | "grpc" => Ok(RpcEndpoint::Http {
                host: host()?,
                port: url.port().unwrap_or(80),
            }),
            "https" | "grpcs" => Ok(RpcEndpoint::Https {
                host: host()?,
                port: url.port().unwrap_or(443),
            }),
            other => Err(GraderError::Config(format!(
                "endpoint {value:?}: unsupported scheme {other:?}"
            ))),
        }
    }

    /// Unix endpoints must name an existing socket.
    pub fn validate(&self) -> GraderResult<()> {
        match self {
            RpcEndpoint::Unix(path) => {
                let meta = std::fs::metadata(path).map_err(|e| {
                    GraderError::Config(format!("socket {}: {e}", path.display()))
                })?;
                if !meta.file_type().is_socket() {
                    return Err(GraderError::Config(format!(
                        "{} is not a socket",
                        path.display()
                    )));
                }
                Ok(())
            }
            RpcEndpoint::Http { .. } | RpcEndpoint::Https { .. } => Ok(()),
        }
    }

    /// Host name used for TLS verification.
    pub fn tls_domain(&self) -> Option<&str> {
        match self {
            RpcEndpoint::Https { host, .. } => Some(host),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(value: &str) -> RpcEndpoint {
        RpcEndpoint::resolve(value, Path::new("/etc/j")).unwrap()
    }

    #[test]
    fn grpc_alias_gets_default_port() {
        let ep = resolve("grpc://host");
        assert_eq!(ep.to_string(), "http://host:80");
    }

    #[test]
    fn grpcs_alias_keeps_explicit_port() {
        let ep = resolve("grpcs://master.example.org:9443");
        assert_eq!(
            ep,
            RpcEndpoint::Https {
                host: "master.example.org".into(),
                port: 9443
            }
        );
        assert_eq!(ep.tls_domain(), Some("master.example.org"));
    }

    #[test]
    fn https_default_port() {
        assert_eq!(resolve("https://m").to_string(), "https://m:443");
    }

    #[test]
    fn ipv6_host_keeps_brackets_in_uri() {
        let ep = resolve("grpc://[::1]:9000");
        assert_eq!(
            ep,
            RpcEndpoint::Http {
                host: "::1".into(),
                port: 9000
            }
        );
        assert_eq!(ep.to_string(), "http://[::1]:9000");
        assert!(tonic::transport::Endpoint::from_shared(ep.to_string()).is_ok());

        let tls = resolve("grpcs://[fe80::2]");
        assert_eq!(tls.to_string(), "https://[fe80::2]:443");
        assert_eq!(tls.tls_domain(), Some("fe80::2"));
    }

    #[test]
    fn relative_path_is_socket_in_config_dir() {
        assert_eq!(resolve("rel/sock").to_string(), "unix:///etc/j/rel/sock");
    }

    #[test]
    fn absolute_path_is_socket() {
        assert_eq!(
            resolve("/run/yajudge/master.sock"),
            RpcEndpoint::Unix("/run/yajudge/master.sock".into())
        );
    }

    #[test]
    fn explicit_unix_scheme() {
        assert_eq!(
            resolve("unix:///run/m.sock"),
            RpcEndpoint::Unix("/run/m.sock".into())
        );
    }

    #[test]
    fn rejects_unknown_scheme_and_missing_host() {
        let dir = Path::new("/");
        assert!(RpcEndpoint::resolve("ftp://host", dir).is_err());
        assert!(RpcEndpoint::resolve("http://", dir).is_err());
        assert!(RpcEndpoint::resolve("", dir).is_err());
    }

    #[test]
    fn validate_requires_socket() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"").unwrap();
        assert!(RpcEndpoint::Unix(file).validate().is_err());
        assert!(RpcEndpoint::Unix(dir.path().join("absent")).validate().is_err());

        let sock = dir.path().join("master.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&sock).unwrap();
        assert!(RpcEndpoint::Unix(sock).validate().is_ok());
    }
}
