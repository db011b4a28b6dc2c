//! Domain services
//!
//! - [`PermissionService`] - effective-permission resolution and overrides
//! - [`OnboardingService`] - store creation, invitations, staff lifecycle
//! - [`SalesService`] - transactional sale recording
//! - [`MailerService`] - best-effort outbound mail
//! - [`AssetService`] - image upload storage

pub mod assets;
pub mod mailer;
pub mod onboarding;
pub mod permission;
pub mod sales;

pub use assets::AssetService;
pub use mailer::{MailConfig, MailerService};
pub use onboarding::{InviteAccept, OnboardingService, StaffInvite};
pub use permission::PermissionService;
pub use sales::SalesService;
