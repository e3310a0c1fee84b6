use std::process::ExitCode;

/// Why a file could not be fully processed. When several files fail, the greatest variant is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Failure {
    /// The file could not be read or decompressed.
    Open,
    /// Not a CCS container.
    InvalidHeader,
    /// Recognised as CCS, but its contents are inconsistent.
    Malformed,
    /// Decoded fine, but outputs could not be written.
    Export,
}

impl Failure {
    /// Classifies a failed container load.
    pub fn from_load(err: &guccs_ccs::Error) -> Self {
        match err {
            guccs_ccs::Error::InvalidHeader { .. } => Failure::InvalidHeader,
            _ => Failure::Malformed,
        }
    }

    /// Exit status for the process. 2 is left to clap for usage errors.
    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(match self {
            Failure::Open => 3,
            Failure::InvalidHeader => 4,
            Failure::Malformed => 5,
            Failure::Export => 6,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_load_errors() {
        assert_eq!(
            Failure::from_load(&guccs_ccs::Error::InvalidHeader { found: 0 }),
            Failure::InvalidHeader
        );
        assert_eq!(
            Failure::from_load(&guccs_ccs::Error::malformed(0, "too many names")),
            Failure::Malformed
        );
        assert_eq!(
            Failure::from_load(&guccs_ccs::Error::TruncatedInput {
                offset: 0,
                need: 4,
                have: 0
            }),
            Failure::Malformed
        );
    }

    #[test]
    fn worst_failure_wins() {
        let failures = [Failure::Export, Failure::Open, Failure::Malformed];
        assert_eq!(failures.iter().max(), Some(&Failure::Export));
        assert!(Failure::InvalidHeader > Failure::Open);
    }
}
