//! Error type shared by the external agent ports.

use super::define_port_error;

define_port_error! {
    /// Failures reaching or decoding an external agent.
    pub enum AgentError {
        /// Connection-level failure.
        Transport { message: String } => "transport error: {message}",
        /// The agent did not answer in time.
        Timeout { message: String } => "request timed out: {message}",
        /// The agent answered with a non-success status.
        Status { message: String } => "agent responded with {message}",
        /// The agent answered with an unexpected body.
        Decode { message: String } => "invalid agent response: {message}",
    }
}
