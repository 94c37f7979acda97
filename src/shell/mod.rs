//! External process execution and environment checks.

pub mod command;

pub use command::{run_process, ProcessOutput};

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_ci_does_not_panic() {
        let _ = is_ci();
    }
}
