//! Monitor agent: summarizes multi-agent conversation memory and asks a
//! generative model to attribute it to the senders that shaped it.

pub mod agent;
pub mod config;
pub mod evaluator;
pub mod llm;
pub mod prompts;

pub use agent::{AgentSettings, MonitorAgent, TurnOutcome};
pub use config::MonitorConfig;
