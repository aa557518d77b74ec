//! Identity-provider session glue.
//!
//! The hosted login flow redirects back with a session and leaves the access
//! token and username in browser storage; this module only reads and clears
//! them. Token issuance and refresh belong to the provider, not to us.

use web_sys::console;

const ACCESS_TOKEN_KEY: &str = "access_token";
const USERNAME_KEY: &str = "username";

/// The current bearer token, if a session exists. Called before every API
/// request so an expired-and-refreshed session is picked up immediately.
pub fn access_token() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage.get_item(ACCESS_TOKEN_KEY).ok()?
}

pub fn username() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage.get_item(USERNAME_KEY).ok()?
}

/// Drops the local session. The provider's own session cookie is outside our
/// reach; clearing the stored token is enough to sign this client out.
pub fn sign_out() {
    let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
        console::log_1(&"sign out: no local storage".into());
        return;
    };
    let _ = storage.remove_item(ACCESS_TOKEN_KEY);
    let _ = storage.remove_item(USERNAME_KEY);
}
