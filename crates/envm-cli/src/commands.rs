use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::Context;
use colored::{Color, Colorize};
use envm_lock::with_lock;
use envm_store::{
    capture, check_namespace, export_script, Environment, NamespaceStore, ProcessEnvironment,
};
use tracing::debug;

use crate::cli::*;
use crate::prompt::ask_yes_or_no;
use crate::settings::Settings;
use crate::shell::INIT_SCRIPT;

/// Streams and environment a command runs against.
pub struct Session<'a> {
    pub env: &'a dyn Environment,
    pub out: &'a mut dyn Write,
    pub input: &'a mut dyn BufRead,
    pub color: bool,
}

/// How a command finished when it did not error out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The command ran but reports failure through the exit code (`check`).
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let env = ProcessEnvironment;

    let mut session = Session {
        env: &env,
        out: &mut out,
        input: &mut input,
        color,
    };

    // `init` touches neither the store nor the lock.
    if let Command::Init(_) = cli.command {
        return cmd_init(&mut session).map(ExitCode::from);
    }

    let settings = Settings::resolve(cli.home.as_deref(), cli.lock_scope, &env)?;
    let mut store = settings.store();
    let mut lock = settings.lock();
    with_lock(&mut lock, || execute(cli.command, &mut store, &mut session)).map(ExitCode::from)
}

pub fn execute(
    command: Command,
    store: &mut dyn NamespaceStore,
    session: &mut Session<'_>,
) -> anyhow::Result<Outcome> {
    match command {
        Command::Init(_) => cmd_init(session),
        Command::Ls(_) => cmd_ls(store, session),
        Command::New(args) => cmd_new(args, store, session),
        Command::Use(args) => cmd_use(args, store, session),
        Command::Show(args) => cmd_show(args, store, session),
        Command::Update(args) => cmd_update(args, store, session),
        Command::Rm(args) => cmd_rm(args, store, session),
        Command::Check(args) => cmd_check(args, store, session),
    }
}

fn cmd_init(session: &mut Session<'_>) -> anyhow::Result<Outcome> {
    session.out.write_all(INIT_SCRIPT.as_bytes())?;
    Ok(Outcome::Success)
}

fn cmd_ls(store: &dyn NamespaceStore, session: &mut Session<'_>) -> anyhow::Result<Outcome> {
    let names = store.list_namespaces().context("failed to list namespaces")?;
    for name in names {
        writeln!(session.out, "{name}")?;
    }
    Ok(Outcome::Success)
}

fn cmd_new(
    args: NewArgs,
    store: &mut dyn NamespaceStore,
    session: &mut Session<'_>,
) -> anyhow::Result<Outcome> {
    let variables = capture(&args.vars, session.env);
    store
        .create(&args.name, variables)
        .with_context(|| format!("failed to create namespace `{}`", args.name))?;
    debug!(namespace = %args.name, count = args.vars.len(), "namespace created");
    Ok(Outcome::Success)
}

fn cmd_use(
    args: UseArgs,
    store: &dyn NamespaceStore,
    session: &mut Session<'_>,
) -> anyhow::Result<Outcome> {
    let variables = store
        .require(&args.name)
        .with_context(|| format!("failed to read namespace `{}`", args.name))?;
    let script = export_script(&variables);
    if !script.is_empty() {
        writeln!(session.out, "{script}")?;
    }
    Ok(Outcome::Success)
}

fn cmd_show(
    args: ShowArgs,
    store: &dyn NamespaceStore,
    session: &mut Session<'_>,
) -> anyhow::Result<Outcome> {
    let Some(variables) = store
        .get(&args.name)
        .with_context(|| format!("failed to read namespace `{}`", args.name))?
    else {
        debug!(namespace = %args.name, "namespace not found; nothing to show");
        return Ok(Outcome::Success);
    };
    writeln!(session.out, "{}", export_script(&variables))?;
    Ok(Outcome::Success)
}

fn cmd_update(
    args: UpdateArgs,
    store: &mut dyn NamespaceStore,
    session: &mut Session<'_>,
) -> anyhow::Result<Outcome> {
    let variables = capture(&args.vars, session.env);
    store
        .merge_update(&args.name, variables)
        .with_context(|| format!("failed to update namespace `{}`", args.name))?;
    debug!(namespace = %args.name, count = args.vars.len(), "namespace updated");
    Ok(Outcome::Success)
}

fn cmd_rm(
    args: RmArgs,
    store: &mut dyn NamespaceStore,
    session: &mut Session<'_>,
) -> anyhow::Result<Outcome> {
    if !store
        .contains(&args.name)
        .with_context(|| format!("failed to read namespace `{}`", args.name))?
    {
        debug!(namespace = %args.name, "namespace not found; nothing to remove");
        return Ok(Outcome::Success);
    }

    if !args.yes {
        write!(session.out, "remove {}? [Y/N] ", args.name)?;
        session.out.flush()?;
        if !ask_yes_or_no(&mut *session.input) {
            return Ok(Outcome::Success);
        }
    }

    store
        .delete(&args.name)
        .with_context(|| format!("failed to remove namespace `{}`", args.name))?;
    Ok(Outcome::Success)
}

fn cmd_check(
    args: CheckArgs,
    store: &dyn NamespaceStore,
    session: &mut Session<'_>,
) -> anyhow::Result<Outcome> {
    let mut all_passed = true;
    for name in &args.names {
        let Some(stored) = store
            .get(name)
            .with_context(|| format!("failed to read namespace `{name}`"))?
        else {
            writeln!(session.out, "=== Not found {name}")?;
            writeln!(session.out, "{} {name}\n", paint("FAIL", Color::Red, session.color))?;
            all_passed = false;
            continue;
        };

        writeln!(session.out, "=== Check {name}")?;
        let report = check_namespace(name, &stored, session.env);
        for key in &report.keys {
            if key.matched {
                writeln!(session.out, "{} {}", paint("✔", Color::Green, session.color), key.key)?;
            } else {
                writeln!(session.out, "{} {}", paint("✗", Color::Red, session.color), key.key)?;
            }
        }
        if report.passed() {
            writeln!(session.out, "{}   {name}\n", paint("ok", Color::Green, session.color))?;
        } else {
            writeln!(session.out, "{} {name}\n", paint("FAIL", Color::Red, session.color))?;
            debug!(
                namespace = %name,
                mismatched = ?report.mismatched().collect::<Vec<_>>(),
                "namespace differs from environment"
            );
            all_passed = false;
        }
    }

    Ok(if all_passed {
        Outcome::Success
    } else {
        Outcome::Failed
    })
}

fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}
