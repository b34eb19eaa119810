//! `verity completions <shell>`

use anyhow::Result;
use clap::Command;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

/// Write the completion script for `cmd` to `out`
pub fn write_completions(cmd: &mut Command, shell: Shell, out: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, out);
}

pub fn execute(cmd: &mut Command, shell: Shell) -> Result<()> {
    write_completions(cmd, shell, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    fn sample() -> Command {
        Command::new("verity")
            .subcommand(Command::new("list"))
            .subcommand(Command::new("dashboard"))
    }

    #[test]
    fn test_shell_names_parse() {
        assert_eq!(Shell::from_str("bash", true), Ok(Shell::Bash));
        assert_eq!(Shell::from_str("ZSH", true), Ok(Shell::Zsh));
        assert!(Shell::from_str("tcsh", true).is_err());
    }

    #[test]
    fn test_scripts_mention_subcommands() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let mut out = Vec::new();
            write_completions(&mut sample(), shell, &mut out);
            let script = String::from_utf8(out).unwrap();
            assert!(script.contains("dashboard"), "{shell:?}");
        }
    }
}
