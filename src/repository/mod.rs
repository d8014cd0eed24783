//! Server-side state owned by this service.

pub mod wizard;

pub use wizard::WizardRegistry;
