#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_flags_leaves_everything_unset() {
        let cli = Cli::try_parse_from(["raiment-dev-server"]).unwrap();
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.serve.title.is_none());
        assert!(cli.serve.port.is_none());
        assert!(cli.serve.config.is_none());
    }

    #[test]
    fn test_parse_server_flags() {
        let cli = Cli::try_parse_from([
            "raiment-dev-server",
            "--title",
            "palette-editor",
            "-p",
            "7100",
            "--out-dir",
            "build/web",
            "--timestamp-file",
            "build/web/.stamp",
            "--fallback",
            "index.html",
            "--strip-prefix",
            "app/",
        ])
        .unwrap();

        assert_eq!(cli.serve.title.as_deref(), Some("palette-editor"));
        assert_eq!(cli.serve.port, Some(7100));
        assert_eq!(cli.serve.out_dir, Some(PathBuf::from("build/web")));
        assert_eq!(
            cli.serve.timestamp_file,
            Some(PathBuf::from("build/web/.stamp"))
        );
        assert_eq!(cli.serve.fallback.as_deref(), Some("index.html"));
        assert_eq!(cli.serve.strip_prefix.as_deref(), Some("app/"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["raiment-dev-server", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["raiment-dev-server", "--port", "70000"]).is_err());
    }
}
