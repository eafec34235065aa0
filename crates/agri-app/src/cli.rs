use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMode {
    Live,
    Mocked,
}

impl ModelMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Mocked => "mocked",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub mode: ModelMode,
    pub dark: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("missing value for argument: {0}")]
    MissingValue(String),
    #[error("invalid --mode value: {0}")]
    InvalidMode(String),
    #[error("help requested")]
    HelpRequested,
}

impl CliOptions {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut mode = ModelMode::Live;
        let mut dark = false;

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(CliError::HelpRequested),
                "--mode" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    mode = parse_mode(&value)?;
                }
                "--dark" => dark = true,
                unknown => return Err(CliError::UnknownArgument(unknown.to_string())),
            }
        }

        Ok(Self { mode, dark })
    }
}

fn parse_mode(value: &str) -> Result<ModelMode, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "live" => Ok(ModelMode::Live),
        "mocked" => Ok(ModelMode::Mocked),
        _ => Err(CliError::InvalidMode(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, CliOptions, ModelMode};

    fn parse(args: &[&str]) -> Result<CliOptions, CliError> {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_to_live_light_mode() {
        let options = parse(&[]).expect("empty args should parse");
        assert_eq!(options.mode, ModelMode::Live);
        assert!(!options.dark);
    }

    #[test]
    fn parses_mode_and_dark_flag() {
        let options = parse(&["--mode", "Mocked", "--dark"]).expect("args should parse");
        assert_eq!(options.mode, ModelMode::Mocked);
        assert!(options.dark);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(parse(&["--mode"]), Err(CliError::MissingValue(_))));
        assert!(matches!(
            parse(&["--mode", "offline"]),
            Err(CliError::InvalidMode(_))
        ));
        assert!(matches!(
            parse(&["--verbose"]),
            Err(CliError::UnknownArgument(_))
        ));
        assert!(matches!(parse(&["-h"]), Err(CliError::HelpRequested)));
    }
}
