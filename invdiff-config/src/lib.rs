use envconfig::Envconfig;

#[derive(Debug, Envconfig)]
pub struct Config {
    #[envconfig(from = "INVDIFF_LOG_LEVEL", default = "info")]
    pub log_level: String,
    #[envconfig(from = "INVDIFF_AWS_REGION")]
    pub aws_region: Option<String>,
    /// Custom endpoint for S3 compatible stores (MinIO, Ceph, ...)
    #[envconfig(from = "INVDIFF_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,
    #[envconfig(from = "INVDIFF_S3_ALLOW_HTTP", default = "false")]
    pub s3_allow_http: bool,
    /// Data files fetched at once while loading a manifest. 1 keeps loading sequential.
    #[envconfig(from = "INVDIFF_FETCH_CONCURRENCY", default = "1")]
    pub fetch_concurrency: usize,
    #[envconfig(from = "INVDIFF_REPORT_PREVIEW_LIMIT", default = "10")]
    pub report_preview_limit: usize,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn load() -> Result<Config, envconfig::Error> {
        Config::init_from_env()
    }
}
