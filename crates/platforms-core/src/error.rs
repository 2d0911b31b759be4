/// Errors raised when building a snapshot from untrusted sample data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("spectrogram snapshot needs {expected} samples, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}
