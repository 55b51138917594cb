use std::path::PathBuf;

/// What the runner was asked to do.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub input: PathBuf,
    /// RON file with a `NewtonConfig`; defaults apply without one.
    pub config: Option<PathBuf>,
    /// Write the report here instead of stdout.
    pub output: Option<PathBuf>,
    pub compact: bool,
    /// Treat the input as an assembled IR and skip resolution.
    pub ir: bool,
}

impl RunnerConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            config: None,
            output: None,
            compact: false,
            ir: false,
        }
    }
}
