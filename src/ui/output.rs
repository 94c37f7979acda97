//! Output verbosity.

use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything, including per-validator details.
    Verbose,
    /// Show progress and results.
    #[default]
    Normal,
    /// Show results only.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Check if this mode shows progress spinners.
    pub fn shows_spinners(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Check if this mode shows status messages (success and warnings).
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes() {
        assert_eq!("Verbose".parse::<OutputMode>().unwrap(), OutputMode::Verbose);
        assert_eq!("quiet".parse::<OutputMode>().unwrap(), OutputMode::Quiet);
        assert!("loud".parse::<OutputMode>().is_err());
    }

    #[test]
    fn quiet_hides_status_and_spinners() {
        assert!(!OutputMode::Quiet.shows_status());
        assert!(!OutputMode::Quiet.shows_spinners());
        assert!(OutputMode::Normal.shows_spinners());
    }
}
