//! ASSUME-BREAK: adversarial stress testing of business plans.
//!
//! A run extracts the plan's testable assumptions, retrieves the
//! ground-truth facts relevant to it, and then loops critique → defense →
//! judgment until the plan is validated or broken. The deterministic core
//! (state machine, retrieval, reply grammar) lives in the `coordination`
//! crate; this crate adds the oracle boundary, the four capabilities, the
//! async run driver, and the CLI.
//!
//! ```rust,ignore
//! use assume_break::StressTester;
//!
//! let tester = StressTester::fallback_only(3);
//! let result = tester.run("We plan to import maize from Zambia.", None).await;
//! println!("{}", assume_break::report::render(&result));
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod agents;
pub mod config;
pub mod oracle;
pub mod orchestrator;
pub mod prompts;
pub mod report;

pub use agents::{Capability, Strategy};
pub use config::{settings, ConfigError, Settings};
pub use oracle::{AnthropicOracle, Oracle, OracleError, RetryingOracle};
pub use orchestrator::{RunFault, StressTester};
