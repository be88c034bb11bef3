use std::path::PathBuf;

use crate::config::Settings;

/// What the command line asked for, on top of the loaded settings.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    pub print_config: bool,
}

impl CliArgs {
    /// `audioshelf [ROOT] [--print-config]`. The first bare argument is the root.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = CliArgs::default();
        for arg in args.into_iter().map(Into::into) {
            if arg == "--print-config" {
                out.print_config = true;
            } else if !arg.starts_with("--") && out.root.is_none() {
                out.root = Some(PathBuf::from(arg));
            }
        }
        out
    }
}

/// Settings for this run: file and environment layers, then the CLI root.
///
/// Runs before logging is set up, so problems go to stderr and never stop
/// startup.
pub fn resolve_settings(cli: &CliArgs) -> Settings {
    let mut settings = match Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => s,
            Err(msg) => {
                eprintln!("audioshelf: ignoring config ({msg}), using defaults");
                Settings::default()
            }
        },
        Err(e) => {
            eprintln!("audioshelf: cannot load config ({e}), using defaults");
            Settings::default()
        }
    };

    if let Some(root) = &cli.root {
        settings.library.root = root.clone();
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_bare_argument_is_the_root() {
        let cli = CliArgs::parse(["/srv/audio", "--print-config", "ignored"]);
        assert_eq!(cli.root, Some(PathBuf::from("/srv/audio")));
        assert!(cli.print_config);

        assert_eq!(CliArgs::parse(Vec::<String>::new()), CliArgs::default());
    }

    #[test]
    fn unknown_flags_are_ignored() {
        let cli = CliArgs::parse(["--verbose"]);
        assert_eq!(cli.root, None);
        assert!(!cli.print_config);
    }
}
