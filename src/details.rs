//! Connection details for the running database process.
//!
//! The step that starts the database publishes a [`ProcessDetails`] record
//! under [`PROCESS_DETAILS_KEY`] in the global namespace before its `set_up`
//! returns. Later steps, the capability injector and the tests themselves
//! read it from there.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::context::{ContextStore, Namespace};
use crate::error::ContextError;

/// Well-known context key holding the [`ProcessDetails`] of the running node.
pub const PROCESS_DETAILS_KEY: &str = "process_details";

const DEFAULT_USER: &str = "root";
const DEFAULT_DATABASE: &str = "defaultdb";
const CA_CERT_FILE: &str = "ca.crt";

/// How to reach the running database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDetails {
    /// Host name or address the SQL listener is bound to.
    pub host: String,

    /// SQL port.
    pub sql_port: u16,

    /// Port of the HTTP console, when enabled.
    pub http_port: Option<u16>,

    /// SQL user to connect as.
    pub user: String,

    /// Password for `user`, when password authentication is used.
    pub password: Option<String>,

    /// Database to connect to.
    pub database: String,

    /// Directory holding the node's client certificates in secure mode.
    pub certs_dir: Option<Utf8PathBuf>,

    /// Whether the node was started with `--insecure`.
    pub insecure: bool,
}

impl ProcessDetails {
    /// Details for an insecure node at `host:sql_port` using default
    /// credentials.
    #[must_use]
    pub fn new(host: impl Into<String>, sql_port: u16) -> Self {
        Self {
            host: host.into(),
            sql_port,
            http_port: None,
            user: String::from(DEFAULT_USER),
            password: None,
            database: String::from(DEFAULT_DATABASE),
            certs_dir: None,
            insecure: true,
        }
    }

    /// Attach the HTTP console port.
    #[must_use]
    pub const fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = Some(port);
        self
    }

    /// Use the given user and optional password.
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.user = user.into();
        self.password = password;
        self
    }

    /// Connect to `database` instead of the default database.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Switch to secure mode using client certificates from `certs_dir`.
    #[must_use]
    pub fn with_certs_dir(mut self, certs_dir: impl Into<Utf8PathBuf>) -> Self {
        self.certs_dir = Some(certs_dir.into());
        self.insecure = false;
        self
    }

    /// Return the `host:port` SQL address.
    #[must_use]
    pub fn sql_address(&self) -> String {
        format!("{}:{}", self.host, self.sql_port)
    }

    /// Render a `postgresql://` connection URL for these details.
    ///
    /// Insecure nodes use `sslmode=disable`. Secure nodes use
    /// `sslmode=verify-full` and point at the CA and client certificates in
    /// [`Self::certs_dir`], following the `client.<user>.crt` naming
    /// convention.
    #[must_use]
    pub fn connection_url(&self) -> String {
        let credentials = self.password.as_ref().map_or_else(
            || self.user.clone(),
            |password| format!("{}:{password}", self.user),
        );
        let base = format!(
            "postgresql://{credentials}@{}/{}",
            self.sql_address(),
            self.database
        );

        match (self.insecure, self.certs_dir.as_deref()) {
            (false, Some(dir)) => format!("{base}?{}", self.secure_query(dir)),
            (false, None) => format!("{base}?sslmode=verify-full"),
            (true, _) => format!("{base}?sslmode=disable"),
        }
    }

    fn secure_query(&self, dir: &Utf8Path) -> String {
        let user = &self.user;
        format!(
            "sslmode=verify-full&sslrootcert={}&sslcert={}&sslkey={}",
            dir.join(CA_CERT_FILE),
            dir.join(format!("client.{user}.crt")),
            dir.join(format!("client.{user}.key")),
        )
    }

    /// Publish these details under [`PROCESS_DETAILS_KEY`] in the global
    /// namespace.
    pub fn publish(self, store: &mut ContextStore) {
        store.put(&Namespace::GLOBAL, PROCESS_DETAILS_KEY, self);
    }

    /// Borrow the published details.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingEntry`] when no step has published
    /// details yet, or [`ContextError::InvalidEntry`] when the key holds a
    /// value of another type.
    pub fn lookup(store: &ContextStore) -> Result<&Self, ContextError> {
        store.get::<Self>(&Namespace::GLOBAL, PROCESS_DETAILS_KEY)
    }
}
