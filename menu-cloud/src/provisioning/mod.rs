//! Onboarding / provisioning

mod flow;
mod saga;

pub use flow::{
    ProvisionOutcome, ProvisionRequest, ProvisionStep, ProvisionWarning, Provisioner,
    ProvisioningError,
};
pub use saga::{CompensationReport, Saga};
