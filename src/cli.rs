// Command-line arguments
//
// Three flags, nothing else: --help, --version, --verbose.
// Unknown options and positional arguments are rejected.

use std::fmt;

/// Flags that affect a normal run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub verbose: bool,
}

/// What the arguments asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(Options),
    Help,
    Version,
}

/// An argument that is not one of the recognized flags.
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownArgument(pub String);

impl fmt::Display for UnknownArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized option '{}'", self.0)
    }
}

impl std::error::Error for UnknownArgument {}

/// Parse the arguments following the program name.
///
/// `--help`/`--version` win over everything else, matching getopt-style
/// behavior where they print and exit as soon as they are seen.
pub fn parse<I>(args: I) -> Result<Command, UnknownArgument>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--verbose" => options.verbose = true,
            _ => return Err(UnknownArgument(arg)),
        }
    }
    Ok(Command::Run(options))
}

/// Usage text for --help and for parse errors.
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [OPTION]...\n\
         Displays a Vulkan-ready window under X11\n\n\
         Options:\n\
         \x20 -h, --help     display this help and exit\n\
         \x20 -V, --version  output version information and exit\n\
         \x20     --verbose  be verbose\n"
    )
}

pub fn version() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_strs(args: &[&str]) -> Result<Command, UnknownArgument> {
        parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_runs_quietly() {
        assert_eq!(
            parse_strs(&[]),
            Ok(Command::Run(Options { verbose: false }))
        );
    }

    #[test]
    fn verbose_flag() {
        assert_eq!(
            parse_strs(&["--verbose"]),
            Ok(Command::Run(Options { verbose: true }))
        );
    }

    #[test]
    fn help_short_and_long() {
        assert_eq!(parse_strs(&["-h"]), Ok(Command::Help));
        assert_eq!(parse_strs(&["--help"]), Ok(Command::Help));
    }

    #[test]
    fn version_short_and_long() {
        assert_eq!(parse_strs(&["-V"]), Ok(Command::Version));
        assert_eq!(parse_strs(&["--version"]), Ok(Command::Version));
    }

    #[test]
    fn help_wins_over_later_garbage() {
        assert_eq!(parse_strs(&["--help", "--bogus"]), Ok(Command::Help));
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert_eq!(
            parse_strs(&["--fullscreen"]),
            Err(UnknownArgument("--fullscreen".to_string()))
        );
    }

    #[test]
    fn double_dash_is_not_special() {
        assert_eq!(
            parse_strs(&["--"]),
            Err(UnknownArgument("--".to_string()))
        );
    }

    #[test]
    fn positional_arguments_are_rejected() {
        assert_eq!(
            parse_strs(&["scene.gltf"]),
            Err(UnknownArgument("scene.gltf".to_string()))
        );
    }

    #[test]
    fn usage_names_the_program() {
        let text = usage("vkwindow");
        assert!(text.starts_with("Usage: vkwindow"));
        assert!(text.contains("--verbose"));
    }
}
