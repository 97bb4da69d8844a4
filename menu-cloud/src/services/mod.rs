//! External collaborators behind trait seams
//!
//! Each seam is held as `Arc<dyn Trait>` in `AppState` so tests can swap in
//! fakes.

pub mod auth_provider;
pub mod email;
pub mod payment;
pub mod qr;
pub mod storage;

pub use auth_provider::{AuthAccount, AuthProvider, AuthProviderError, LocalAuthProvider};
pub use email::{EmailAttachment, EmailMessage, EmailSender, LogEmailSender, SesEmailSender};
pub use payment::{CheckoutSession, PaymentProvider, StripePayments, StripePrices};
pub use qr::{QrGenerator, QrImage, SvgQrGenerator};
pub use storage::{LocalStorage, ObjectStorage, S3Storage};
