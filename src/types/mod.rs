// ABOUTME: Validated domain types shared across the pipeline.
// ABOUTME: Stack names and target architectures.

mod architecture;
mod stack_name;

pub use architecture::Architecture;
pub use stack_name::{StackName, StackNameError};
