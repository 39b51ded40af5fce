use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "envm",
    about = "Save, recall and verify named sets of environment variables",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the store file [default: $ENVM_HOME, then your home directory]
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Which invocations the process lock serializes against
    #[arg(long, global = true, value_enum, default_value_t = LockScope::Global)]
    pub lock_scope: LockScope,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LockScope {
    /// One lock in the temp directory shared by every store on the host
    #[default]
    Global,
    /// A lock next to the store file; unrelated stores do not block each other.
    ///
    /// Does not exclude invocations using the global scope. Every invocation
    /// that writes the same store must use the same scope, since they share
    /// one staging file.
    Store,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the shell function that makes `envm use` export into the current shell
    Init(InitArgs),
    /// List namespaces
    Ls(LsArgs),
    /// Capture environment variables into a new namespace
    New(NewArgs),
    /// Print `export` lines for a namespace (eval'd by the shell function)
    Use(UseArgs),
    /// Show the variables stored in a namespace
    Show(ShowArgs),
    /// Capture environment variables into a namespace, merging with what it holds
    Update(UpdateArgs),
    /// Delete a namespace
    Rm(RmArgs),
    /// Compare stored namespaces with the current environment
    Check(CheckArgs),
}

#[derive(Args)]
pub struct InitArgs {}

#[derive(Args)]
pub struct LsArgs {}

#[derive(Args)]
pub struct NewArgs {
    pub name: String,
    #[arg(required = true, value_name = "VAR")]
    pub vars: Vec<String>,
}

#[derive(Args)]
pub struct UseArgs {
    pub name: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub name: String,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub name: String,
    #[arg(value_name = "VAR")]
    pub vars: Vec<String>,
}

#[derive(Args)]
pub struct RmArgs {
    pub name: String,
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["envm", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init(_)));
    }

    #[test]
    fn parse_ls() {
        let cli = Cli::try_parse_from(["envm", "ls"]).unwrap();
        assert!(matches!(cli.command, Command::Ls(_)));
        assert_eq!(cli.lock_scope, LockScope::Global);
        assert!(cli.home.is_none());
    }

    #[test]
    fn parse_new() {
        let cli = Cli::try_parse_from(["envm", "new", "prod", "API_URL", "TOKEN"]).unwrap();
        if let Command::New(args) = cli.command {
            assert_eq!(args.name, "prod");
            assert_eq!(args.vars, vec!["API_URL", "TOKEN"]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn new_requires_a_variable() {
        assert!(Cli::try_parse_from(["envm", "new", "prod"]).is_err());
        assert!(Cli::try_parse_from(["envm", "new"]).is_err());
    }

    #[test]
    fn parse_use() {
        let cli = Cli::try_parse_from(["envm", "use", "prod"]).unwrap();
        if let Command::Use(args) = cli.command {
            assert_eq!(args.name, "prod");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn use_requires_name() {
        assert!(Cli::try_parse_from(["envm", "use"]).is_err());
    }

    #[test]
    fn parse_update_without_vars() {
        let cli = Cli::try_parse_from(["envm", "update", "prod"]).unwrap();
        if let Command::Update(args) = cli.command {
            assert_eq!(args.name, "prod");
            assert!(args.vars.is_empty());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_rm_yes() {
        let cli = Cli::try_parse_from(["envm", "rm", "-y", "old"]).unwrap();
        if let Command::Rm(args) = cli.command {
            assert!(args.yes);
            assert_eq!(args.name, "old");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_check_many() {
        let cli = Cli::try_parse_from(["envm", "check", "a", "b"]).unwrap();
        if let Command::Check(args) = cli.command {
            assert_eq!(args.names, vec!["a", "b"]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn check_requires_a_name() {
        assert!(Cli::try_parse_from(["envm", "check"]).is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "envm", "ls", "--verbose", "--home", "/srv/envm", "--lock-scope", "store",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.home, Some(PathBuf::from("/srv/envm")));
        assert_eq!(cli.lock_scope, LockScope::Store);
    }
}
