//! Report context, prompt assembly and the audit snapshots around generation

pub mod assembler;
pub mod audit;
pub mod context;
pub mod envelope;
pub mod headline;
pub mod template;

pub use assembler::ContextAssembler;
pub use audit::AuditTrail;
pub use context::{ContractType, ReportContext};
pub use envelope::{context_from_slice, context_from_value};
pub use headline::Headline;
pub use template::ReportTemplate;
