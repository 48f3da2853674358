//! Tokenkeeper - keeps OAuth2 site credentials fresh
//!
//! Manages OAuth2 credentials for a set of named external services
//! ("sites") declared in a TOML file, automating the authorization-code
//! and refresh-token grants. Meant to run periodically from a scheduler
//! so a small fleet of API credentials never expires.
//!
//! # Features
//!
//! - Out-of-band authorization-code flow with manual code entry
//! - Proactive refresh inside a fixed look-ahead window
//! - Batch-atomic persistence: one failing site discards the whole run
//! - Cross-process exclusive lock around the load-modify-save window
//!
//! # Example
//!
//! ```no_run
//! use tokenkeeper::prelude::*;
//!
//! let store = ConfigStore::new("conf.toml");
//! let _lock = store.lock().unwrap();
//! let mut config = store.load().unwrap();
//!
//! let client = TokenClient::new().unwrap();
//! let controller = Controller::new(&client, &StdinPrompt);
//! if controller.run(&mut config, Mode::Refresh).unwrap() {
//!     store.save(&config).unwrap();
//! }
//! ```

pub mod controller;
pub mod error;
pub mod exchange;
pub mod prompt;
pub mod site;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::controller::{Controller, Mode};
    pub use crate::error::{Error, Result};
    pub use crate::exchange::{TokenClient, TokenExchanger, TokenGrant};
    pub use crate::prompt::{CodePrompt, StdinPrompt};
    pub use crate::site::{Site, SiteConfig};
    pub use crate::store::ConfigStore;
}
