//! Manager configuration loaded from the environment.

use envconfig::Envconfig;

use crate::format::MimeFormat;

#[derive(Envconfig, Clone, Debug)]
pub struct ManagerConfig {
    /// Base URL of the Redmine installation, e.g. `https://redmine.example.org`.
    #[envconfig(from = "REDMINE_HOST")]
    pub host: String,

    #[envconfig(from = "REDMINE_API_KEY")]
    pub api_key: Option<String>,

    #[envconfig(from = "REDMINE_FORMAT", default = "xml")]
    pub format: MimeFormat,

    /// Default `limit` for list requests.
    #[envconfig(from = "REDMINE_PAGE_SIZE", default = "25")]
    pub page_size: u32,

    /// Login to act as, sent as `X-Redmine-Switch-User`. Needs an admin key.
    #[envconfig(from = "REDMINE_IMPERSONATE_USER")]
    pub impersonate_user: Option<String>,
}
