//! Seller onboarding wizard.
//!
//! Application, then the one-time registration fee, then the recurring
//! subscription, then admin review. Payment progress is remembered in the
//! session store so the wizard resumes where it left off after a restart.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{Session, SessionFlag};
use crate::models::{ApplicationState, ApplicationStatus, SellerApplication};
use crate::payment::{CheckoutOptions, PaymentConfirmation, PaymentReceipt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Application,
    RegistrationPayment,
    Subscription,
    Review,
    /// Terminal: the seller console is unlocked.
    Approved,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 5] = [
        OnboardingStep::Application,
        OnboardingStep::RegistrationPayment,
        OnboardingStep::Subscription,
        OnboardingStep::Review,
        OnboardingStep::Approved,
    ];

    pub fn index(&self) -> usize {
        match self {
            OnboardingStep::Application => 0,
            OnboardingStep::RegistrationPayment => 1,
            OnboardingStep::Subscription => 2,
            OnboardingStep::Review => 3,
            OnboardingStep::Approved => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            OnboardingStep::Application => "Business details",
            OnboardingStep::RegistrationPayment => "Registration fee",
            OnboardingStep::Subscription => "Subscription",
            OnboardingStep::Review => "Under review",
            OnboardingStep::Approved => "Approved",
        }
    }

    pub fn next(&self) -> Option<OnboardingStep> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Payment steps completed on this device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WizardProgress {
    pub registration_paid: bool,
    pub subscription_completed: bool,
}

impl WizardProgress {
    pub fn from_session(session: &Session) -> Self {
        Self {
            registration_paid: session.flag(SessionFlag::RegistrationPaymentCompleted),
            subscription_completed: session.flag(SessionFlag::SubscriptionCompleted),
        }
    }
}

/// Pick the step to show for a server-side application status and local
/// progress. The server's own payment flags count as completed too.
pub fn resume(status: &ApplicationStatus, progress: WizardProgress) -> OnboardingStep {
    match status.state() {
        ApplicationState::NotSubmitted | ApplicationState::Rejected => OnboardingStep::Application,
        ApplicationState::Approved => OnboardingStep::Approved,
        ApplicationState::Pending | ApplicationState::UnderReview | ApplicationState::Unknown => {
            if !(progress.registration_paid || status.registration_paid) {
                OnboardingStep::RegistrationPayment
            } else if !(progress.subscription_completed || status.subscription_active) {
                OnboardingStep::Subscription
            } else {
                OnboardingStep::Review
            }
        }
    }
}

/// Drives the wizard against the API.
pub struct SellerOnboarding<'a> {
    client: &'a ApiClient,
    step: OnboardingStep,
    status: ApplicationStatus,
}

impl<'a> SellerOnboarding<'a> {
    /// Load the application status and position the wizard.
    pub async fn start(client: &'a ApiClient) -> Result<Self, ApiError> {
        let mut wizard = Self {
            client,
            step: OnboardingStep::Application,
            status: ApplicationStatus::default(),
        };
        wizard.refresh_status().await?;
        Ok(wizard)
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    /// Last status fetched from the server.
    pub fn status(&self) -> &ApplicationStatus {
        &self.status
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self.status.state() {
            ApplicationState::Rejected => self.status.rejection_reason.as_deref(),
            _ => None,
        }
    }

    pub async fn refresh_status(&mut self) -> Result<&ApplicationStatus, ApiError> {
        self.status = self.client.seller().application_status().await?;

        if matches!(
            self.status.state(),
            ApplicationState::Approved | ApplicationState::Rejected
        ) {
            self.clear_flags();
        }

        self.step = resume(&self.status, WizardProgress::from_session(self.client.session()));
        debug!(state = %self.status.state(), step = %self.step, "Onboarding status loaded");
        Ok(&self.status)
    }

    pub async fn submit_application(&mut self, application: SellerApplication) -> Result<(), ApiError> {
        self.expect_step(OnboardingStep::Application)?;

        let missing = application.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::InvalidRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        self.client.seller().apply(&application.normalized()).await?;

        self.status.status = Some(ApplicationState::Pending);
        self.status.rejection_reason = None;
        self.step = resume(&self.status, WizardProgress::from_session(self.client.session()));
        info!(step = %self.step, "Seller application accepted");
        Ok(())
    }

    /// Create the registration fee order and the widget options for it.
    pub async fn begin_registration_payment(&self, key: &str) -> Result<CheckoutOptions, ApiError> {
        self.expect_step(OnboardingStep::RegistrationPayment)?;
        let order = self.client.subscription().create_registration().await?;
        Ok(CheckoutOptions::for_registration(key, &order))
    }

    pub async fn complete_registration_payment(
        &mut self,
        confirmation: &PaymentConfirmation,
    ) -> Result<PaymentReceipt, ApiError> {
        self.expect_step(OnboardingStep::RegistrationPayment)?;
        let receipt = self.client.subscription().verify_registration(confirmation).await?;

        self.set_flag(SessionFlag::RegistrationPaymentCompleted);
        self.status.registration_paid = true;
        self.step = resume(&self.status, WizardProgress::from_session(self.client.session()));
        info!(step = %self.step, "Registration fee paid");
        Ok(receipt)
    }

    pub async fn begin_subscription(&self, key: &str, plan_id: &str) -> Result<CheckoutOptions, ApiError> {
        self.expect_step(OnboardingStep::Subscription)?;
        let subscription = self.client.subscription().create(plan_id).await?;
        Ok(CheckoutOptions::for_subscription(key, &subscription))
    }

    pub async fn complete_subscription(
        &mut self,
        confirmation: &PaymentConfirmation,
    ) -> Result<PaymentReceipt, ApiError> {
        self.expect_step(OnboardingStep::Subscription)?;
        let receipt = self.client.subscription().verify(confirmation).await?;

        self.set_flag(SessionFlag::SubscriptionCompleted);
        self.status.subscription_active = true;
        self.step = OnboardingStep::Review;
        info!("Subscription active, application awaiting review");
        Ok(receipt)
    }

    fn expect_step(&self, expected: OnboardingStep) -> Result<(), ApiError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ApiError::InvalidRequest(format!(
                "Onboarding is at \"{}\", not \"{}\"",
                self.step, expected
            )))
        }
    }

    fn set_flag(&self, flag: SessionFlag) {
        if let Err(e) = self.client.session().set_flag(flag, true) {
            warn!(flag = flag.key(), error = %e, "Failed to persist onboarding progress");
        }
    }

    fn clear_flags(&self) {
        let session = self.client.session();
        for flag in [
            SessionFlag::RegistrationPaymentCompleted,
            SessionFlag::SubscriptionCompleted,
        ] {
            if let Err(e) = session.set_flag(flag, false) {
                warn!(flag = flag.key(), error = %e, "Failed to clear onboarding progress");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: Option<ApplicationState>) -> ApplicationStatus {
        ApplicationStatus {
            status: state,
            ..Default::default()
        }
    }

    #[test]
    fn test_step_order() {
        assert_eq!(OnboardingStep::Application.next(), Some(OnboardingStep::RegistrationPayment));
        assert_eq!(OnboardingStep::Review.next(), Some(OnboardingStep::Approved));
        assert_eq!(OnboardingStep::Approved.next(), None);
        for (i, step) in OnboardingStep::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
    }

    #[test]
    fn test_resume_without_application() {
        let progress = WizardProgress {
            registration_paid: true,
            subscription_completed: true,
        };
        assert_eq!(resume(&status(None), progress), OnboardingStep::Application);
        assert_eq!(
            resume(&status(Some(ApplicationState::Rejected)), progress),
            OnboardingStep::Application
        );
    }

    #[test]
    fn test_resume_pending_follows_flags() {
        let pending = status(Some(ApplicationState::Pending));
        assert_eq!(
            resume(&pending, WizardProgress::default()),
            OnboardingStep::RegistrationPayment
        );
        assert_eq!(
            resume(
                &pending,
                WizardProgress {
                    registration_paid: true,
                    subscription_completed: false
                }
            ),
            OnboardingStep::Subscription
        );
        assert_eq!(
            resume(
                &pending,
                WizardProgress {
                    registration_paid: true,
                    subscription_completed: true
                }
            ),
            OnboardingStep::Review
        );
    }

    #[test]
    fn test_resume_uses_server_flags() {
        let mut under_review = status(Some(ApplicationState::UnderReview));
        under_review.registration_paid = true;
        under_review.subscription_active = true;
        assert_eq!(resume(&under_review, WizardProgress::default()), OnboardingStep::Review);
    }

    #[test]
    fn test_resume_approved() {
        assert_eq!(
            resume(&status(Some(ApplicationState::Approved)), WizardProgress::default()),
            OnboardingStep::Approved
        );
    }

    #[test]
    fn test_progress_from_session() {
        let session = Session::in_memory();
        session
            .set_flag(SessionFlag::RegistrationPaymentCompleted, true)
            .unwrap();
        assert_eq!(
            WizardProgress::from_session(&session),
            WizardProgress {
                registration_paid: true,
                subscription_completed: false
            }
        );
    }
}
