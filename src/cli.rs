// src/cli.rs
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Write};

#[derive(Debug, Parser)]
#[command(name = "teamgate", version, about = "Team portal login and signup")]
pub struct Cli {
    /// Verbosity: -v info, -vv debug, -vvv trace (RUST_LOG wins when set)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with email and password
    Login(LoginArgs),
    /// Create a new account
    Signup(SignupArgs),
    /// Show who is logged in on this machine
    Status,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, env = "TEAMGATE_EMAIL")]
    pub email: Option<String>,

    #[arg(long, env = "TEAMGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Echo the password in the form summary
    #[arg(long)]
    pub show_password: bool,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long, env = "TEAMGATE_EMAIL")]
    pub email: Option<String>,

    #[arg(long, env = "TEAMGATE_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "TEAMGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long)]
    pub confirm_password: Option<String>,

    /// Echo the password in the form summary
    #[arg(long)]
    pub show_password: bool,
}

pub fn verbosity_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Returns `given` or asks for the value on stdin. End of input reads as
/// an empty value so validation reports it.
pub fn value_or_prompt(given: Option<String>, label: &str) -> io::Result<String> {
    if let Some(value) = given {
        return Ok(value);
    }
    prompt(&mut io::stdin().lock(), &mut io::stderr(), label)
}

/// Like `value_or_prompt`, but a terminal does not echo what is typed.
/// Piped input is read as a plain line.
pub fn secret_or_prompt(given: Option<String>, label: &str) -> anyhow::Result<String> {
    if let Some(value) = given {
        return Ok(value);
    }
    if !io::stdin().is_terminal() {
        return Ok(prompt(&mut io::stdin().lock(), &mut io::stderr(), label)?);
    }
    let secret = dialoguer::Password::new()
        .with_prompt(label)
        .allow_empty_password(true)
        .interact()?;
    Ok(secret)
}

fn prompt(input: &mut impl BufRead, output: &mut impl Write, label: &str) -> io::Result<String> {
    write!(output, "{}: ", label)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_signup() {
        temp_env::with_vars_unset(["TEAMGATE_EMAIL", "TEAMGATE_USERNAME", "TEAMGATE_PASSWORD"], || {
            let cli = Cli::try_parse_from([
                "teamgate",
                "-vv",
                "signup",
                "--email",
                "link@hyrule.org",
                "--username",
                "link",
                "--show-password",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            match cli.command {
                Command::Signup(args) => {
                    assert_eq!(args.email.as_deref(), Some("link@hyrule.org"));
                    assert_eq!(args.username.as_deref(), Some("link"));
                    assert!(args.password.is_none());
                    assert!(args.show_password);
                }
                other => panic!("unexpected command {:?}", other),
            }
        });
    }

    #[test]
    fn test_login_reads_env() {
        temp_env::with_vars(
            [
                ("TEAMGATE_EMAIL", Some("zelda@hyrule.org")),
                ("TEAMGATE_PASSWORD", Some("Ab1!aaaa")),
            ],
            || {
                let cli = Cli::try_parse_from(["teamgate", "login"]).unwrap();
                match cli.command {
                    Command::Login(args) => {
                        assert_eq!(args.email.as_deref(), Some("zelda@hyrule.org"));
                        assert_eq!(args.password.as_deref(), Some("Ab1!aaaa"));
                    }
                    other => panic!("unexpected command {:?}", other),
                }
            },
        );
    }

    #[test]
    fn test_verbosity_level() {
        assert_eq!(verbosity_level(0), tracing::Level::WARN);
        assert_eq!(verbosity_level(1), tracing::Level::INFO);
        assert_eq!(verbosity_level(9), tracing::Level::TRACE);
    }

    #[test]
    fn test_secret_given_skips_prompt() {
        let value = secret_or_prompt(Some("Ab1!aaaa".into()), "Password").unwrap();
        assert_eq!(value, "Ab1!aaaa");
        assert_eq!(secret_or_prompt(Some(String::new()), "Password").unwrap(), "");
    }

    #[test]
    fn test_prompt_reads_one_line() {
        let mut input = io::Cursor::new("link@hyrule.org\r\nrest\n");
        let mut output = Vec::new();
        let value = prompt(&mut input, &mut output, "Email").unwrap();
        assert_eq!(value, "link@hyrule.org");
        assert_eq!(String::from_utf8(output).unwrap(), "Email: ");

        let mut empty = io::Cursor::new("");
        assert_eq!(prompt(&mut empty, &mut Vec::new(), "Password").unwrap(), "");
    }
}
