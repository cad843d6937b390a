//! Authentication and profile backend.
//!
//! The assistant treats persistence as an external collaborator behind
//! [`AuthBackend`]. [`MockAuthBackend`] is the in-memory implementation the
//! app ships with: accounts live in a map, sign-ups wait for an out-of-band
//! email confirmation, and session changes are broadcast to subscribers.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::types::{Profile, Timestamp};

/// One-time password accepted for mobile sign-in by the mock backend.
pub const DEMO_OTP: &str = "123456";

/// Capacity of the session-change broadcast channel.
const EVENT_CAPACITY: usize = 16;

/// Errors surfaced to the user as a notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("Email not confirmed: {0}")]
    EmailNotConfirmed(String),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("An account already exists for {0}")]
    AccountExists(String),
    #[error("No account found for {0}")]
    UnknownAccount(String),
    #[error("Invalid sign-up details: {0}")]
    InvalidSignUp(String),
    #[error("Auth backend error: {0}")]
    Backend(String),
}

/// The three sign-in methods offered on the login screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    Email { email: String, password: String },
    Mobile { mobile: String, otp: String },
    Policy { policy_number: String, date_of_birth: NaiveDate },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignUpOutcome {
    /// The account exists but must be confirmed from the emailed link.
    ConfirmationRequired { email: String },
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub email: String,
    pub signed_in_at: Timestamp,
}

/// Notification emitted whenever the session changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(AuthSession),
    SignedOut,
}

/// External authentication and profile service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, AuthError>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError>;

    async fn resend_confirmation(&self, email: &str) -> Result<(), AuthError>;

    /// Fetch a profile. `Ok(None)` means the profile is not available yet,
    /// which callers render as a loading state.
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;

    async fn current_session(&self) -> Option<AuthSession>;

    /// Subscribe to session changes. Call on startup.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

#[derive(Debug, Clone)]
struct Account {
    user_id: Uuid,
    email: String,
    password: String,
    mobile: Option<String>,
    policy_number: Option<String>,
    date_of_birth: Option<NaiveDate>,
    confirmed: bool,
    profile: Option<Profile>,
}

/// In-memory [`AuthBackend`] with simulated latency.
pub struct MockAuthBackend {
    latency: Duration,
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<SessionEvent>,
    confirmations_sent: RwLock<HashMap<String, u32>>,
}

impl MockAuthBackend {
    /// Create an empty backend.
    pub fn new(latency: Duration) -> Self {
        Self::from_accounts(latency, HashMap::new())
    }

    fn from_accounts(latency: Duration, accounts: HashMap<String, Account>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            latency,
            accounts: RwLock::new(accounts),
            session: RwLock::new(None),
            events,
            confirmations_sent: RwLock::new(HashMap::new()),
        }
    }

    /// Create a backend seeded with the demo policy holder.
    ///
    /// Email `john@example.com` / `password123`, mobile `+15550100` with
    /// [`DEMO_OTP`], or policy `TI-2024-001234` born 1985-06-20.
    pub fn with_demo_account(latency: Duration) -> Self {
        let user_id = Uuid::new_v4();
        let profile = Profile {
            id: user_id,
            name: "John Traveler".to_string(),
            email: "john@example.com".to_string(),
            policy_number: "TI-2024-001234".to_string(),
            dependents: 2,
            policy_start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
            policy_end_date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap_or_default(),
        };
        let account = Account {
            user_id,
            email: profile.email.clone(),
            password: "password123".to_string(),
            mobile: Some("+15550100".to_string()),
            policy_number: Some(profile.policy_number.clone()),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 6, 20),
            confirmed: true,
            profile: Some(profile),
        };
        let mut accounts = HashMap::new();
        accounts.insert(account.email.clone(), account);
        Self::from_accounts(latency, accounts)
    }

    /// Complete the out-of-band email confirmation for an account.
    pub async fn confirm_email(&self, email: &str) -> Result<(), AuthError> {
        let key = normalize_email(email);
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&key)
            .ok_or_else(|| AuthError::UnknownAccount(key.clone()))?;
        account.confirmed = true;
        tracing::info!(email = %key, "Email confirmed");
        Ok(())
    }

    /// Number of confirmation emails sent to an address, including resends.
    pub async fn confirmations_sent(&self, email: &str) -> u32 {
        let sent = self.confirmations_sent.read().await;
        sent.get(&normalize_email(email)).copied().unwrap_or(0)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn record_confirmation(&self, email: &str) {
        let mut sent = self.confirmations_sent.write().await;
        *sent.entry(email.to_string()).or_insert(0) += 1;
    }

    fn find_account<'a>(
        accounts: &'a HashMap<String, Account>,
        credentials: &Credentials,
    ) -> Result<&'a Account, AuthError> {
        match credentials {
            Credentials::Email { email, password } => accounts
                .get(&normalize_email(email))
                .filter(|a| &a.password == password)
                .ok_or(AuthError::InvalidCredentials),
            Credentials::Mobile { mobile, otp } => {
                if otp != DEMO_OTP {
                    return Err(AuthError::InvalidCredentials);
                }
                accounts
                    .values()
                    .find(|a| a.mobile.as_deref() == Some(mobile.as_str()))
                    .ok_or(AuthError::InvalidCredentials)
            }
            Credentials::Policy {
                policy_number,
                date_of_birth,
            } => accounts
                .values()
                .find(|a| {
                    a.policy_number
                        .as_deref()
                        .is_some_and(|p| p.eq_ignore_ascii_case(policy_number))
                        && a.date_of_birth == Some(*date_of_birth)
                })
                .ok_or(AuthError::InvalidCredentials),
        }
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        self.simulate_latency().await;

        let session = {
            let accounts = self.accounts.read().await;
            let account = Self::find_account(&accounts, credentials)?;
            if !account.confirmed {
                return Err(AuthError::EmailNotConfirmed(account.email.clone()));
            }
            AuthSession {
                user_id: account.user_id,
                email: account.email.clone(),
                signed_in_at: Timestamp::now(),
            }
        };

        *self.session.write().await = Some(session.clone());
        let _ = self.events.send(SessionEvent::SignedIn(session.clone()));
        tracing::info!(user_id = %session.user_id, "Signed in");
        Ok(session)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError> {
        self.simulate_latency().await;

        if request.password != request.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        let email = normalize_email(&request.email);
        if !email.contains('@') {
            return Err(AuthError::InvalidSignUp("email address".to_string()));
        }
        if request.password.is_empty() {
            return Err(AuthError::InvalidSignUp("password".to_string()));
        }
        if request.name.trim().is_empty() {
            return Err(AuthError::InvalidSignUp("name".to_string()));
        }

        {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&email) {
                return Err(AuthError::AccountExists(email));
            }
            accounts.insert(
                email.clone(),
                Account {
                    user_id: Uuid::new_v4(),
                    email: email.clone(),
                    password: request.password.clone(),
                    mobile: None,
                    policy_number: None,
                    date_of_birth: None,
                    confirmed: false,
                    profile: None,
                },
            );
        }

        self.record_confirmation(&email).await;
        tracing::info!(email = %email, "Account created, confirmation email sent");
        Ok(SignUpOutcome::ConfirmationRequired { email })
    }

    async fn resend_confirmation(&self, email: &str) -> Result<(), AuthError> {
        self.simulate_latency().await;

        let key = normalize_email(email);
        {
            let accounts = self.accounts.read().await;
            let account = accounts
                .get(&key)
                .ok_or_else(|| AuthError::UnknownAccount(key.clone()))?;
            if account.confirmed {
                return Ok(());
            }
        }
        self.record_confirmation(&key).await;
        tracing::info!(email = %key, "Confirmation email resent");
        Ok(())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AuthError> {
        self.simulate_latency().await;

        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.user_id == user_id)
            .and_then(|a| a.profile.clone()))
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let previous = self.session.write().await.take();
        if previous.is_some() {
            let _ = self.events.send(SessionEvent::SignedOut);
            tracing::info!("Signed out");
        }
        Ok(())
    }

    async fn current_session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MockAuthBackend {
        MockAuthBackend::with_demo_account(Duration::ZERO)
    }

    fn email_login(email: &str, password: &str) -> Credentials {
        Credentials::Email {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn sign_up_request(email: &str) -> SignUpRequest {
        SignUpRequest {
            name: "Ana Lopez".to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_email_login_succeeds() {
        let auth = backend();
        let session = auth
            .login(&email_login("John@Example.com", "password123"))
            .await
            .unwrap();
        assert_eq!(session.email, "john@example.com");
        assert_eq!(auth.current_session().await, Some(session));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let auth = backend();
        let err = auth
            .login(&email_login("john@example.com", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(auth.current_session().await.is_none());
    }

    #[tokio::test]
    async fn test_mobile_login_requires_otp() {
        let auth = backend();
        let bad = Credentials::Mobile {
            mobile: "+15550100".to_string(),
            otp: "000000".to_string(),
        };
        assert!(auth.login(&bad).await.is_err());

        let good = Credentials::Mobile {
            mobile: "+15550100".to_string(),
            otp: DEMO_OTP.to_string(),
        };
        assert!(auth.login(&good).await.is_ok());
    }

    #[tokio::test]
    async fn test_policy_login() {
        let auth = backend();
        let creds = Credentials::Policy {
            policy_number: "ti-2024-001234".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 6, 20).unwrap(),
        };
        assert!(auth.login(&creds).await.is_ok());

        let wrong_dob = Credentials::Policy {
            policy_number: "TI-2024-001234".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        };
        assert_eq!(
            auth.login(&wrong_dob).await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_sign_up_requires_confirmation() {
        let auth = backend();
        let outcome = auth.sign_up(&sign_up_request("ana@example.com")).await.unwrap();
        assert_eq!(
            outcome,
            SignUpOutcome::ConfirmationRequired {
                email: "ana@example.com".to_string()
            }
        );

        let err = auth
            .login(&email_login("ana@example.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailNotConfirmed(_)));

        auth.confirm_email("ana@example.com").await.unwrap();
        assert!(auth
            .login(&email_login("ana@example.com", "secret"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_sign_up_password_mismatch() {
        let auth = backend();
        let mut request = sign_up_request("ana@example.com");
        request.confirm_password = "different".to_string();
        assert_eq!(
            auth.sign_up(&request).await.unwrap_err(),
            AuthError::PasswordMismatch
        );
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_account() {
        let auth = backend();
        let err = auth
            .sign_up(&sign_up_request("john@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountExists(_)));
    }

    #[tokio::test]
    async fn test_resend_confirmation_counts() {
        let auth = backend();
        auth.sign_up(&sign_up_request("ana@example.com")).await.unwrap();
        auth.resend_confirmation("ana@example.com").await.unwrap();
        assert_eq!(auth.confirmations_sent("ana@example.com").await, 2);

        let err = auth.resend_confirmation("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownAccount(_)));
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let auth = backend();
        let session = auth
            .login(&email_login("john@example.com", "password123"))
            .await
            .unwrap();
        let profile = auth.fetch_profile(session.user_id).await.unwrap().unwrap();
        assert_eq!(profile.policy_number, "TI-2024-001234");

        assert!(auth.fetch_profile(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_account_has_no_profile_yet() {
        let auth = backend();
        auth.sign_up(&sign_up_request("ana@example.com")).await.unwrap();
        auth.confirm_email("ana@example.com").await.unwrap();
        let session = auth
            .login(&email_login("ana@example.com", "secret"))
            .await
            .unwrap();
        assert!(auth.fetch_profile(session.user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_events_broadcast() {
        let auth = backend();
        let mut events = auth.subscribe();

        let session = auth
            .login(&email_login("john@example.com", "password123"))
            .await
            .unwrap();
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedIn(session));

        auth.logout().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut);
        assert!(auth.current_session().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_when_signed_out_is_quiet() {
        let auth = backend();
        let mut events = auth.subscribe();
        auth.logout().await.unwrap();
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let auth = MockAuthBackend::with_demo_account(Duration::from_millis(1500));
        let started = tokio::time::Instant::now();
        auth.login(&email_login("john@example.com", "password123"))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }
}
