//! Cross-checks the optimizer against full enumeration on random small instances.

pub mod output;
pub mod synthetic;
pub mod trial;

pub use output::{print_summary, write_csv};
pub use synthetic::{random_bounds, random_catalog, random_config, InstanceShape};
pub use trial::{run_trial, run_verification, TrialResult, VerifyConfig, VerifyReport};
