use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing project id: set one of {}", .vars.join(", "))]
    MissingProjectId { vars: Vec<&'static str> },

    #[error("missing credentials: set {var}")]
    MissingCredentials { var: &'static str },

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml parse error in {path}: {source}")]
    YamlParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
