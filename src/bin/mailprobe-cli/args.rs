use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mailprobe::{ProbeOptions, ValidationMode};

#[derive(Debug, Parser)]
#[command(name = "mailprobe-cli", version, about = "Checks whether a mailbox exists")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Local format check only, no network.
    Validate {
        #[arg(long, value_enum, default_value_t = Mode::Strict)]
        mode: Mode,
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
        email: String,
    },
    /// Resolves and prints the domain's mail exchangers.
    Mx {
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
        domain: String,
    },
    /// Full verification: format, MX, then SMTP probes.
    Verify {
        email: String,
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Runs the HTTP front end (`POST /verify`).
    #[cfg(feature = "with-http")]
    Serve {
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
        listen: String,
        #[command(flatten)]
        probe: ProbeArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Strict,
    Relaxed,
}

impl From<Mode> for ValidationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Strict => ValidationMode::Strict,
            Mode::Relaxed => ValidationMode::Relaxed,
        }
    }
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// port SMTP des MX (défaut: $SMTP_PORT, sinon 25)
    #[arg(long)]
    pub port: Option<u16>,
    /// nom annoncé dans HELO (défaut: $HELLO_DOMAIN)
    #[arg(long)]
    pub helo: Option<String>,
    /// enveloppe MAIL FROM (défaut: $PROBE_SENDER)
    #[arg(long = "from")]
    pub mail_from: Option<String>,
    /// budget d'une session SMTP complète en ms (défaut: $PROBE_TIMEOUT_MS)
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,
    /// nombre maximum d'MX interrogés
    #[arg(long = "max-hosts")]
    pub max_hosts: Option<usize>,
    #[arg(long, value_enum, default_value_t = Mode::Strict)]
    pub mode: Mode,
}

impl ProbeArgs {
    /// Environment first, then the flags given on the command line.
    pub fn options(&self) -> Result<ProbeOptions> {
        let base =
            ProbeOptions::from_env().context("invalid probe configuration in environment")?;
        self.overlay(base)
    }

    pub fn overlay(&self, mut options: ProbeOptions) -> Result<ProbeOptions> {
        if let Some(port) = self.port {
            if port == 0 {
                bail!("--port must be greater than zero");
            }
            options.port = port;
        }
        if let Some(helo) = self.helo.as_deref().filter(|h| !h.trim().is_empty()) {
            options.helo_domain = helo.trim().to_string();
        }
        if let Some(from) = self.mail_from.as_deref().filter(|f| !f.trim().is_empty()) {
            options.probe_sender = from.trim().to_string();
        }
        if let Some(ms) = self.timeout_ms {
            if ms == 0 {
                bail!("--timeout-ms must be greater than zero");
            }
            options.timeout = Duration::from_millis(ms);
        }
        if let Some(max) = self.max_hosts {
            if max == 0 {
                bail!("--max-hosts must be greater than zero");
            }
            options.max_hosts = Some(max);
        }
        options.validation_mode = self.mode.into();
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verify_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "mailprobe-cli",
            "verify",
            "alice@example.com",
            "--port",
            "2525",
            "--helo",
            "probe.example.net",
            "--from",
            "bounce@example.net",
            "--timeout-ms",
            "2000",
            "--max-hosts",
            "2",
            "--format",
            "json",
        ])
        .expect("parse");
        let Commands::Verify {
            email,
            format,
            probe,
        } = cli.cmd
        else {
            panic!("expected verify");
        };
        assert_eq!(email, "alice@example.com");
        assert_eq!(format, Format::Json);
        let options = probe.overlay(ProbeOptions::default()).expect("options");
        assert_eq!(options.port, 2525);
        assert_eq!(options.helo_domain, "probe.example.net");
        assert_eq!(options.probe_sender, "bounce@example.net");
        assert_eq!(options.timeout, Duration::from_secs(2));
        assert_eq!(options.max_hosts, Some(2));
    }

    #[test]
    fn zero_timeout_is_refused() {
        let cli = Cli::try_parse_from([
            "mailprobe-cli",
            "verify",
            "alice@example.com",
            "--timeout-ms",
            "0",
        ])
        .expect("parse");
        let Commands::Verify { probe, .. } = cli.cmd else {
            panic!("expected verify");
        };
        assert!(probe.overlay(ProbeOptions::default()).is_err());
    }

    #[test]
    fn absent_flags_keep_environment_values() {
        let cli = Cli::try_parse_from([
            "mailprobe-cli",
            "verify",
            "alice@example.com",
            "--helo",
            "cli.example.net",
        ])
        .expect("parse");
        let Commands::Verify { probe, .. } = cli.cmd else {
            panic!("expected verify");
        };
        let from_env = ProbeOptions {
            port: 2525,
            helo_domain: "env.example.net".to_string(),
            probe_sender: "env@example.net".to_string(),
            timeout: Duration::from_secs(3),
            ..ProbeOptions::default()
        };
        let options = probe.overlay(from_env).expect("options");
        assert_eq!(options.port, 2525);
        assert_eq!(options.helo_domain, "cli.example.net");
        assert_eq!(options.probe_sender, "env@example.net");
        assert_eq!(options.timeout, Duration::from_secs(3));
    }

    #[test]
    fn smtp_settings_are_not_read_by_clap() {
        let command = Cli::command();
        let verify = command.find_subcommand("verify").expect("verify subcommand");
        for arg in verify.get_arguments() {
            assert!(arg.get_env().is_none(), "{} reads the environment", arg.get_id());
        }
    }
}
