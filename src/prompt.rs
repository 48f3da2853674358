/// Interactive authorization-code collection
use crate::error::{Error, Result};
use crate::exchange::OOB_REDIRECT_URI;
use crate::site::Site;
use std::io::{self, BufRead, Write};
use url::Url;

/// Build the URL the operator opens to authorize a site.
pub fn authorize_url(site: &Site) -> Result<String> {
    let mut url = Url::parse(&site.auth_url)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &site.client_id)
        .append_pair("redirect_uri", OOB_REDIRECT_URI)
        .append_pair("scope", &site.scopes.join(" "));
    Ok(url.into())
}

/// Supplies an authorization code for a constructed authorization URL.
///
/// Injected into the controller so tests can run the new-authorization
/// path without a terminal.
pub trait CodePrompt {
    fn read_code(&self, authorize_url: &str) -> Result<String>;
}

/// Terminal prompt: prints the URL, tries to open it in the default
/// browser, then blocks for a single line containing the code.
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    fn read_code(&self, authorize_url: &str) -> Result<String> {
        println!("Open url:\n{authorize_url}\n");
        if webbrowser::open(authorize_url).is_err() {
            tracing::debug!("could not open a browser, continuing with manual entry");
        }

        print!("Enter authorization code: ");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        let code = line.trim();
        if read == 0 || code.is_empty() {
            return Err(Error::AuthorizationInput(
                "no authorization code entered".to_string(),
            ));
        }

        Ok(code.to_string())
    }
}
