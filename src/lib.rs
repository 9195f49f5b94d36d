pub mod cli;
pub mod env_detect;
pub mod executor;
pub mod resolver;

/// Resolve the platform artifact, run it and return the exit code to finish with.
pub fn run_launcher() -> i32 {
    cli::run()
}
