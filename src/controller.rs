/// Credential lifecycle controller
use crate::error::{Error, Result};
use crate::exchange::TokenExchanger;
use crate::prompt::{authorize_url, CodePrompt};
use crate::site::{unix_now, Site, SiteConfig};
use tracing::{debug, info};

/// Which per-site action policy a run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Authorize sites that have never completed the code flow.
    New,
    /// Refresh tokens inside the proactive expiry window.
    Refresh,
}

/// Walks the credential set in stored order and applies the mode's policy
/// to each site.
///
/// A run is batch-atomic: the first failing site aborts the remaining
/// entries and the caller must not persist, so earlier in-memory updates
/// are discarded with the process. Re-attempting the whole batch on the
/// next scheduled run beats persisting a half-refreshed set.
pub struct Controller<'a> {
    exchanger: &'a dyn TokenExchanger,
    prompt: &'a dyn CodePrompt,
}

impl<'a> Controller<'a> {
    pub fn new(exchanger: &'a dyn TokenExchanger, prompt: &'a dyn CodePrompt) -> Self {
        Self { exchanger, prompt }
    }

    /// Process every site in order. Returns whether any site was updated;
    /// an all no-op batch needs no write-back.
    ///
    /// Errors carry the offending site's name.
    pub fn run(&self, config: &mut SiteConfig, mode: Mode) -> Result<bool> {
        let mut updated = false;

        for site in &mut config.sites {
            let changed = match mode {
                Mode::New => self.authorize(site),
                Mode::Refresh => self.refresh(site),
            }
            .map_err(|source| Error::Site {
                name: site.name.clone(),
                source: Box::new(source),
            })?;

            updated = updated || changed;
        }

        Ok(updated)
    }

    fn authorize(&self, site: &mut Site) -> Result<bool> {
        if site.is_authorized() {
            debug!(site = %site.name, "already authorized, nothing to do");
            return Ok(false);
        }

        let url = authorize_url(site)?;
        let code = self.prompt.read_code(&url)?;
        let grant = self.exchanger.exchange_code(site, &code)?;
        site.apply_grant(&grant, unix_now());

        info!(site = %site.name, "authorized");
        Ok(true)
    }

    fn refresh(&self, site: &mut Site) -> Result<bool> {
        if !site.needs_refresh(unix_now()) {
            debug!(site = %site.name, "access token still fresh");
            return Ok(false);
        }

        if !site.is_authorized() {
            return Err(Error::NoRefreshToken);
        }

        let grant = self.exchanger.refresh(site)?;
        site.apply_grant(&grant, unix_now());

        info!(site = %site.name, "refreshed access token");
        Ok(true)
    }
}
