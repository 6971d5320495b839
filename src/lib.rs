//! Courier: delegate natural-language tasks to a hosted connector agent.
//!
//! A [`tools::DelegationTool`] forwards instructions to a
//! [`executor::RemoteTaskExecutor`] and turns every outcome into a
//! [`types::TaskResult`]. On top of it sit the [`workflow`] driver (delegate,
//! extract an email address, look the email up, optionally reply), a
//! sequential batch runner, and a tool-calling [`agent::Agent`] that can be
//! driven from the interactive [`shell`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use courier::prelude::*;
//!
//! # async fn example() -> courier::error::Result<()> {
//! let config = CourierConfig::from_env()?;
//! let executor = Arc::new(HttpTaskExecutor::from_config(&config));
//! let delegation = DelegationTool::new(executor).with_timeout(config.task_timeout());
//!
//! let task = Task::new("List 5 recent emails from Gmail")?;
//! println!("{}", delegation.invoke(&task).await);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod email;
pub mod error;
pub mod executor;
pub mod extract;
pub mod generation;
pub mod prelude;
pub mod provider;
pub mod shell;
pub mod tools;
pub mod types;
pub mod util;
pub mod workflow;

#[cfg(feature = "cli")]
pub mod cli;
