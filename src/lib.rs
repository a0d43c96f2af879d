//! Letterpress - cover letter generation relay
//!
//! Serves a single endpoint that turns a resume and a job description into a
//! cover letter by relaying one prompt to the OpenRouter chat-completion API.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod prompt;
pub mod telemetry;
pub mod upstream;
