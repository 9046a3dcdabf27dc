//! Login flows against the auth service.
//!
//! - [`browser`]: verification session confirmed in a browser (`af login`)
//! - [`email`]: one-time code sent by email (`af login --email`)

pub mod browser;
pub mod client;
pub mod email;

pub use browser::{BrowserLogin, LOGIN_SESSION_NAME, cancel_on_ctrl_c};
pub use client::{AuthClient, EmailCodeRequest, EmailSession, VerificationSession};
pub use email::{EmailLogin, Prompter, StdinPrompter};
