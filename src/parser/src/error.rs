use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("--min-observations ({min_observations}) must be strictly lower than --max-iterations ({max_iterations})")]
    ObservationsExceedIterations { min_observations: u64, max_iterations: u64 },

    #[error("--{0} must be a positive integer")]
    NonPositiveParameter(&'static str),

    #[error("Malformed random SNP source '{0}'. Expected 'randomN' with N a positive integer")]
    MalformedRandomCount(String),
}
