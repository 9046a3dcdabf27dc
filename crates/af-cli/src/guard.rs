//! Guard chain for commands that talk to the platform.
//!
//! ```text
//! START ─► AUTH_CHECKED ─► CLIENT_BUILT ─► RUNNING ─► SUCCESS | FAILED
//! ```
//!
//! The login guard makes sure a personal access token exists (running an
//! interactive login if needed), the SDK guard builds an authenticated
//! [`SdkClient`], and the action runs with both. Every failure is folded
//! into an [`ActionOutcome`]; the guard never exits the process.

use std::future::Future;
use std::io::Write;

use af_sdk::{PersonalAccessTokenService, SdkClient, SdkError};
use tracing::{debug, info, warn};

use crate::auth::{AuthClient, BrowserLogin, cancel_on_ctrl_c};
use crate::config::Config;
use crate::endpoints::ServiceUrls;
use crate::error::CliError;
use crate::poll::PollPolicy;

/// Exit code for every guarded failure.
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Interactive login run by the login guard when no token is stored.
pub trait LoginFlow: Send + Sync {
    /// Log in against `auth_service_url` and persist the token in `config`.
    fn login(
        &self,
        auth_service_url: &str,
        config: &Config,
    ) -> impl Future<Output = Result<(), CliError>> + Send;
}

/// Browser login, cancellable with Ctrl-C. Prompts go to stderr.
#[derive(Debug, Clone, Copy)]
pub struct InteractiveLogin {
    policy: PollPolicy,
}

impl InteractiveLogin {
    /// Interactive login with the given polling budget.
    #[must_use]
    pub const fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }
}

impl Default for InteractiveLogin {
    fn default() -> Self {
        Self::new(PollPolicy::CLI_SESSION)
    }
}

impl LoginFlow for InteractiveLogin {
    async fn login(&self, auth_service_url: &str, config: &Config) -> Result<(), CliError> {
        let client = AuthClient::new(auth_service_url)?;
        let mut stderr = std::io::stderr();

        BrowserLogin::new(&client)
            .with_policy(self.policy)
            .with_cancellation(cancel_on_ctrl_c())
            .login(config, &mut stderr)
            .await?;

        writeln!(stderr, "✓ Logged in")?;
        Ok(())
    }
}

/// What a guarded action receives.
#[derive(Debug)]
pub struct GuardedArgs<A> {
    /// Authenticated platform client.
    pub sdk: SdkClient,
    /// Parsed command arguments.
    pub args: A,
}

/// Result of one guarded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action completed.
    Success,
    /// A guard or the action failed; `message` is for the user.
    Failed {
        /// Process exit code.
        exit_code: u8,
        /// Message to print on stderr.
        message: String,
    },
}

impl ActionOutcome {
    /// Failure carrying the user-facing message for `error`.
    #[must_use]
    pub fn from_error(error: &anyhow::Error) -> Self {
        Self::Failed {
            exit_code: FAILURE_EXIT_CODE,
            message: describe(error),
        }
    }

    /// Fold a command result into an outcome.
    #[must_use]
    pub fn from_result<E>(result: Result<(), E>) -> Self
    where
        E: Into<anyhow::Error>,
    {
        match result {
            Ok(()) => Self::Success,
            Err(e) => Self::from_error(&e.into()),
        }
    }

    /// Process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failed { exit_code, .. } => *exit_code,
        }
    }

    /// Whether the action completed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// User-facing message for an action error.
///
/// Errors raised by this crate or the SDK print their own message; anything
/// else prints its message followed by its causes.
#[must_use]
pub fn describe(error: &anyhow::Error) -> String {
    if let Some(e) = error.downcast_ref::<CliError>() {
        return e.to_string();
    }
    if let Some(e) = error.downcast_ref::<SdkError>() {
        return e.to_string();
    }
    format!("{error:#}")
}

/// Login guard, SDK guard and action runner.
#[derive(Debug)]
pub struct Guard<L> {
    config: Config,
    urls: ServiceUrls,
    login: L,
}

impl<L: LoginFlow> Guard<L> {
    /// Guard over the given credentials and endpoints.
    #[must_use]
    pub const fn new(config: Config, urls: ServiceUrls, login: L) -> Self {
        Self { config, urls, login }
    }

    /// Credentials this guard checks.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Login guard: make sure a personal access token is available.
    ///
    /// The auth service URL is checked first, so a misconfigured environment
    /// fails before any network call or prompt.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingConfiguration`] if no auth service URL is
    /// set, the login flow's error if it fails, and
    /// [`CliError::MissingPersonalAccessToken`] if it finished without
    /// storing a token.
    pub async fn ensure_logged_in(&self) -> Result<(), CliError> {
        let auth_service_url = self.urls.require_auth_service_url()?;

        if self.config.personal_access_token().is_some() {
            debug!("personal access token present");
            return Ok(());
        }

        warn!(auth_service_url, "no personal access token, starting login");
        eprintln!("⚠ You are not logged in. Log in to continue.");
        self.login.login(auth_service_url, &self.config).await?;

        if self.config.personal_access_token().is_none() {
            return Err(CliError::MissingPersonalAccessToken);
        }
        info!("login completed");
        Ok(())
    }

    /// SDK guard: build an authenticated platform client.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingPersonalAccessToken`] without a token and
    /// [`CliError::MissingConfiguration`] without a GraphQL URL.
    pub fn build_sdk_client(&self) -> Result<SdkClient, CliError> {
        let credentials = self.config.credentials();
        let token = credentials
            .personal_access_token
            .ok_or(CliError::MissingPersonalAccessToken)?;
        let tokens = PersonalAccessTokenService::new(token, credentials.project_id);
        let options = self.urls.sdk_options()?;
        Ok(SdkClient::new(options, tokens)?)
    }

    /// Run `action` behind both guards.
    pub async fn run<A, F, Fut>(&self, args: A, action: F) -> ActionOutcome
    where
        F: FnOnce(GuardedArgs<A>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        if let Err(e) = self.ensure_logged_in().await {
            return ActionOutcome::from_error(&e.into());
        }

        let sdk = match self.build_sdk_client() {
            Ok(sdk) => sdk,
            Err(e) => return ActionOutcome::from_error(&e.into()),
        };

        debug!("running guarded action");
        match action(GuardedArgs { sdk, args }).await {
            Ok(()) => ActionOutcome::Success,
            Err(e) => {
                debug!(error = ?e, "guarded action failed");
                ActionOutcome::from_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigKey, CredentialStore, MemoryStore, Secrets};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FakeLogin {
        issues: Option<&'static str>,
        calls: AtomicU32,
    }

    impl FakeLogin {
        fn issuing(token: &'static str) -> Self {
            Self {
                issues: Some(token),
                calls: AtomicU32::new(0),
            }
        }

        fn giving_up() -> Self {
            Self {
                issues: None,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LoginFlow for FakeLogin {
        async fn login(&self, auth_service_url: &str, config: &Config) -> Result<(), CliError> {
            assert_eq!(auth_service_url, "https://auth.test");
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = self.issues {
                config.store_personal_access_token(token)?;
            }
            Ok(())
        }
    }

    fn urls(pairs: &[(&str, &str)]) -> ServiceUrls {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServiceUrls::from_lookup(|key| vars.get(key).cloned())
    }

    fn full_urls() -> ServiceUrls {
        urls(&[
            ("SDK__AUTH_SERVICE_URL", "https://auth.test"),
            ("SDK__GRAPHQL_API_URL", "http://127.0.0.1:9/graphql"),
        ])
    }

    fn guard(store: Arc<MemoryStore>, urls: ServiceUrls, login: FakeLogin) -> Guard<FakeLogin> {
        Guard::new(Config::new(store, Secrets::default()), urls, login)
    }

    #[tokio::test]
    async fn logs_in_before_running_action() {
        let store = Arc::new(MemoryStore::new());
        let guard = guard(store.clone(), full_urls(), FakeLogin::issuing("fresh"));

        let mut seen = None;
        let outcome = guard
            .run("args", |guarded| {
                seen = Some((
                    guarded.args,
                    guarded.sdk.tokens().personal_access_token().to_string(),
                ));
                async { Ok(()) }
            })
            .await;

        assert_eq!(outcome, ActionOutcome::Success);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(guard.login.calls(), 1);
        assert_eq!(seen, Some(("args", "fresh".to_string())));
        assert_eq!(store.get(ConfigKey::PersonalAccessToken).as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn stored_token_skips_login() {
        let store = Arc::new(MemoryStore::with_token("stored"));
        store.set(ConfigKey::ProjectId, "proj_1").expect("seed");
        let guard = guard(store, full_urls(), FakeLogin::issuing("unused"));

        let mut project = None;
        let outcome = guard
            .run((), |guarded| {
                project = guarded.sdk.tokens().project_id().map(str::to_string);
                async { Ok(()) }
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(guard.login.calls(), 0);
        assert_eq!(project.as_deref(), Some("proj_1"));
    }

    #[tokio::test]
    async fn login_without_token_never_runs_action() {
        let guard = guard(Arc::new(MemoryStore::new()), full_urls(), FakeLogin::giving_up());

        let mut ran = false;
        let outcome = guard
            .run((), |_| {
                ran = true;
                async { Ok(()) }
            })
            .await;

        assert!(!ran);
        assert_eq!(guard.login.calls(), 1);
        match outcome {
            ActionOutcome::Failed { exit_code, message } => {
                assert_eq!(exit_code, 1);
                assert!(message.contains("missing personal access token"));
            }
            ActionOutcome::Success => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn missing_auth_url_fails_before_login() {
        let urls = urls(&[("SDK__GRAPHQL_API_URL", "http://127.0.0.1:9/graphql")]);
        let guard = guard(Arc::new(MemoryStore::new()), urls, FakeLogin::issuing("fresh"));

        let outcome = guard.run((), |_| async { Ok(()) }).await;

        assert_eq!(guard.login.calls(), 0);
        assert_eq!(
            outcome,
            ActionOutcome::Failed {
                exit_code: 1,
                message: "missing required configuration: SDK__AUTH_SERVICE_URL".into(),
            }
        );
    }

    #[tokio::test]
    async fn missing_graphql_url_fails_in_sdk_guard() {
        let urls = urls(&[("AUTH__API_URL", "https://auth.test")]);
        let guard = guard(Arc::new(MemoryStore::with_token("stored")), urls, FakeLogin::giving_up());

        let mut ran = false;
        let outcome = guard
            .run((), |_| {
                ran = true;
                async { Ok(()) }
            })
            .await;

        assert!(!ran);
        assert_eq!(outcome.exit_code(), 1);
        assert!(matches!(
            outcome,
            ActionOutcome::Failed { ref message, .. } if message.contains("SDK__GRAPHQL_API_URL")
        ));
    }

    #[tokio::test]
    async fn recognised_action_errors_keep_their_message() {
        let guard = guard(Arc::new(MemoryStore::with_token("t")), full_urls(), FakeLogin::giving_up());

        let outcome = guard
            .run((), |_| async {
                Err(SdkError::NotFound {
                    resource: "domain".into(),
                }
                .into())
            })
            .await;
        assert_eq!(
            outcome,
            ActionOutcome::Failed {
                exit_code: 1,
                message: SdkError::NotFound {
                    resource: "domain".into()
                }
                .to_string(),
            }
        );

        let outcome = guard
            .run((), |_| async { Err(CliError::Command("deploy failed".into()).into()) })
            .await;
        assert_eq!(
            outcome,
            ActionOutcome::Failed {
                exit_code: 1,
                message: "command error: deploy failed".into(),
            }
        );
    }

    #[tokio::test]
    async fn foreign_errors_keep_their_message() {
        let guard = guard(Arc::new(MemoryStore::with_token("t")), full_urls(), FakeLogin::giving_up());

        let outcome = guard
            .run((), |_| async { Err(anyhow::anyhow!("boom")) })
            .await;
        assert_eq!(
            outcome,
            ActionOutcome::Failed {
                exit_code: 1,
                message: "boom".into(),
            }
        );

        let outcome = guard
            .run((), |_| async {
                Err(anyhow::Error::new(std::io::Error::other("disk full")))
            })
            .await;
        assert_eq!(
            outcome,
            ActionOutcome::Failed {
                exit_code: 1,
                message: "disk full".into(),
            }
        );
    }

    #[test]
    fn describe_includes_context_chain() {
        let error = anyhow::Error::new(std::io::Error::other("disk full")).context("saving report");
        assert_eq!(describe(&error), "saving report: disk full");
    }

    #[test]
    fn from_result_maps_ok_and_err() {
        assert!(ActionOutcome::from_result::<CliError>(Ok(())).is_success());
        let outcome = ActionOutcome::from_result(Err(CliError::LoginCancelled));
        assert_eq!(
            outcome,
            ActionOutcome::Failed {
                exit_code: 1,
                message: "login cancelled".into(),
            }
        );
    }
}
