use std::sync::Arc;

use anyhow::Result;
use argbind_core::{render_markdown, verify_registry, Command, Engine, Error, Registry};
use clap::ArgMatches;
use tokio::io::BufReader;

use super::group_listing;
use crate::{dispatch::Dispatch, json, rpc};

/// Output switches after merging config with command-line flags.
#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
    pretty: bool,
}

/// Run the selected subcommand and return the process exit code.
pub async fn dispatch(
    matches: &ArgMatches,
    engine: Arc<Engine>,
    dispatcher: Arc<dyn Dispatch>,
) -> Result<i32> {
    match matches.subcommand() {
        Some(("rpc", _)) => handle_rpc(engine, dispatcher).await,
        Some(("schema", sub_m)) => {
            let output = output(
                &engine,
                global_flag(matches, "json"),
                global_flag(matches, "pretty"),
            );
            handle_schema(sub_m, engine.registry(), output)
        }
        Some((name, sub_m)) => {
            let words: Vec<String> = std::iter::once(name.to_string())
                .chain(sub_m.get_many::<String>("").into_iter().flatten().cloned())
                .collect();
            Ok(handle_command(
                &words,
                &engine,
                dispatcher.as_ref(),
                global_flag(matches, "json"),
                global_flag(matches, "pretty"),
            ))
        }
        None => anyhow::bail!("No command given. Run 'argbind --help' for usage."),
    }
}

/// Render an error chain for stderr.
pub fn format_error(err: &anyhow::Error) -> String {
    let mut msg = format!("{err}");
    for cause in err.chain().skip(1) {
        msg.push_str(&format!("\nCaused by: {cause}"));
    }
    if let Some(hint) = err.downcast_ref::<Error>().and_then(Error::suggestion) {
        msg.push_str(&format!("\nHint: {hint}"));
    }
    msg
}

/// Exit code for an error that escaped a handler.
pub fn get_exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Error>().map_or(1, Error::exit_code)
}

/// A global switch set at any level. External subcommands define no
/// arguments, so a missing id reads as unset.
fn global_flag(matches: &ArgMatches, id: &str) -> bool {
    let mut current = matches;
    let mut set = false;
    loop {
        set |= current
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);
        match current.subcommand() {
            Some((_, next)) => current = next,
            None => return set,
        }
    }
}

fn output(engine: &Engine, json: bool, pretty: bool) -> Output {
    let config = engine.config().clone().with_cli_flags(json, pretty);
    Output {
        json: config.output.json,
        pretty: config.output.pretty,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SCHEMA COMMANDS
// ═══════════════════════════════════════════════════════════════════════════

fn handle_command(
    words: &[String],
    engine: &Engine,
    dispatcher: &dyn Dispatch,
    json: bool,
    pretty: bool,
) -> i32 {
    let registry = engine.registry();
    let command = lookup(registry, words);
    let (argv, local) = split_local_flags(words, |name| {
        command
            .and_then(|command| command.argument(name))
            .is_some_and(|arg| !arg.arg_type.is_bool())
    });
    let output = output(engine, json || local.json, pretty || local.pretty);

    let listing = match argv.as_slice() {
        [word] => group_listing(registry, word),
        _ => None,
    };
    if let Some(listing) = listing {
        return print_out(listing.trim_end());
    }

    if local.help {
        if let Some(command) = lookup(registry, &argv) {
            return print_out(command.help());
        }
    }

    match engine.bind_cli(&argv) {
        Ok(call) => {
            tracing::debug!(method = call.command.key(), "bound command line");
            match dispatcher.dispatch(&call) {
                Ok(result) if output.json => print_out(&json::success(result, output.pretty)),
                Ok(result) => print_out(&json::render(&result, true)),
                Err(err) => {
                    print_err(&format!("Error: {err:#}"));
                    1
                }
            }
        }
        Err(err) => report_failure(&err, &argv, registry, output),
    }
}

/// The command the leading words name, following a retired name to its
/// replacement.
fn lookup<'a>(registry: &'a Registry, words: &[String]) -> Option<&'a Arc<Command>> {
    registry.resolve(words).map(|(command, _)| command).or_else(|| {
        words
            .first()
            .and_then(|name| registry.deprecated(name))
            .flatten()
            .and_then(|new| registry.get(new))
    })
}

/// Flags `argbind` itself owns, pulled out of a schema command's arguments.
#[derive(Debug, Default, PartialEq, Eq)]
struct LocalFlags {
    json: bool,
    pretty: bool,
    help: bool,
}

/// Remove `--json`, `--pretty` and `--help`/`-h` that appear before `--`.
///
/// `takes_value` says whether `--name` without `=` consumes the next token.
/// That token is kept as the option's value, the same way the binder reads it.
fn split_local_flags<F>(words: &[String], takes_value: F) -> (Vec<String>, LocalFlags)
where
    F: Fn(&str) -> bool,
{
    let mut flags = LocalFlags::default();
    let mut argv = Vec::with_capacity(words.len());
    let mut tokens = words.iter().peekable();
    while let Some(word) = tokens.next() {
        match word.as_str() {
            "--json" => flags.json = true,
            "--pretty" => flags.pretty = true,
            "--help" | "-h" => flags.help = true,
            "--" => {
                argv.extend(std::iter::once(word).chain(tokens.by_ref()).cloned());
                break;
            }
            _ => {
                argv.push(word.clone());
                let value_follows = word
                    .strip_prefix("--")
                    .is_some_and(|name| !name.contains('=') && takes_value(name));
                if value_follows {
                    if let Some(value) = tokens.next_if(|next| !next.starts_with("--")) {
                        argv.push(value.clone());
                    }
                }
            }
        }
    }
    (argv, flags)
}

fn report_failure(err: &Error, argv: &[String], registry: &Registry, output: Output) -> i32 {
    tracing::debug!(code = %err.code(), "command line rejected");
    if output.json {
        print_out(&json::error(err, output.pretty));
        return err.exit_code();
    }

    let mut message = String::new();
    if let Error::Binding(_) = err {
        if let Some(command) = lookup(registry, argv) {
            message.push_str(command.help());
            message.push_str("\n\n");
        }
    }
    message.push_str(&format!("Error: {err}"));
    if let Some(hint) = err.suggestion() {
        message.push_str(&format!("\nHint: {hint}"));
    }
    print_err(&message);
    err.exit_code()
}

// ═══════════════════════════════════════════════════════════════════════════
// RPC AND SCHEMA SUBCOMMANDS
// ═══════════════════════════════════════════════════════════════════════════

async fn handle_rpc(engine: Arc<Engine>, dispatcher: Arc<dyn Dispatch>) -> Result<i32> {
    tracing::info!(commands = engine.registry().len(), "serving JSON-RPC on stdio");
    rpc::serve(
        engine,
        dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;
    Ok(0)
}

fn handle_schema(matches: &ArgMatches, registry: &Registry, output: Output) -> Result<i32> {
    match matches.subcommand() {
        Some(("check", _)) => Ok(handle_check(registry, output)),
        Some(("list", _)) => Ok(handle_list(registry, output)),
        Some(("show", sub_m)) => {
            let words: Vec<String> = sub_m
                .get_many::<String>("command")
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            handle_show(&words, registry, output)
        }
        Some(("docs", _)) => Ok(print_out(render_markdown(registry).trim_end())),
        _ => anyhow::bail!("Unknown schema command. Run 'argbind schema --help' for usage."),
    }
}

fn handle_check(registry: &Registry, output: Output) -> i32 {
    let drift = verify_registry(registry);
    let code = if drift.is_empty() { 0 } else { 3 };
    if output.json {
        let problems: Vec<String> = drift.iter().map(ToString::to_string).collect();
        let result = serde_json::json!({
            "commands": registry.len(),
            "drift": problems,
        });
        print_out(&json::success(result, output.pretty));
        return code;
    }
    if drift.is_empty() {
        print_out(&format!("{} commands, no help drift", registry.len()));
    } else {
        for problem in &drift {
            print_err(&problem.to_string());
        }
        print_err(&format!(
            "{} of {} commands have help drift",
            drift.len(),
            registry.len()
        ));
    }
    code
}

fn handle_list(registry: &Registry, output: Output) -> i32 {
    if output.json {
        let commands: Vec<_> = registry
            .commands()
            .map(|command| {
                serde_json::json!({
                    "method": command.key(),
                    "cli": command.cli(),
                    "summary": command.summary(),
                })
            })
            .collect();
        return print_out(&json::success(commands.into(), output.pretty));
    }
    let width = registry
        .commands()
        .map(|command| command.cli().len())
        .max()
        .unwrap_or(0);
    let listing: Vec<String> = registry
        .commands()
        .map(|command| format!("{:<width$}  {}", command.cli(), command.summary()))
        .collect();
    print_out(&listing.join("\n"))
}

fn handle_show(words: &[String], registry: &Registry, output: Output) -> Result<i32> {
    let command = registry
        .resolve(words)
        .map(|(command, _)| command)
        .or_else(|| words.first().and_then(|key| registry.get(key)))
        .ok_or_else(|| Error::UnknownCommand(words.join(" ")))?;
    if output.json {
        let doc = serde_json::to_value(command.to_doc())?;
        return Ok(print_out(&json::success(doc, output.pretty)));
    }
    Ok(print_out(command.help()))
}

fn print_out(text: &str) -> i32 {
    #[allow(clippy::print_stdout)]
    {
        println!("{text}");
    }
    0
}

fn print_err(text: &str) {
    #[allow(clippy::print_stderr)]
    {
        eprintln!("{text}");
    }
}
