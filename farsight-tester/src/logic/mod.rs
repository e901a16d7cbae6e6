pub mod checks;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use checks::{CheckContext, CheckResult, get_check, list_checks, run_check};
pub use seeds::resolve_seed_inputs;
