use std::io::IsTerminal;
use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::DataLock;
use crate::io::storage::FileStore;
use crate::model::config::AppConfig;
use crate::model::theme::Theme;
use crate::ops::task_ops::now_millis;
use crate::session::{Session, SuggestOutcome};
use crate::suggest::{GeminiClient, SuggestionClient};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved settings shared by every command
struct Context {
    config: AppConfig,
    data_dir: PathBuf,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let config = config_io::load_config();
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref(), &config);
    tracing::debug!(data_dir = %data_dir.display(), "resolved data directory");
    let ctx = Context {
        config,
        data_dir,
        json: cli.json,
    };

    match cli.command {
        None => cmd_list(&ctx, ListArgs::default()),
        Some(cmd) => match cmd {
            Commands::List(args) => cmd_list(&ctx, args),
            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Toggle(args) => cmd_toggle(&ctx, args),
            Commands::Edit(args) => cmd_edit(&ctx, args),
            Commands::Rm(args) => cmd_rm(&ctx, args),
            Commands::Suggest(args) => cmd_suggest(&ctx, args),
            Commands::Theme(args) => cmd_theme(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a session for reading. Nothing is created on disk.
fn load_readonly(ctx: &Context) -> Session<FileStore> {
    Session::load(FileStore::at(&ctx.data_dir))
}

/// Lock the data directory and load the session under the lock.
fn open_locked(ctx: &Context) -> Result<(DataLock, Session<FileStore>), Box<dyn std::error::Error>> {
    let store = FileStore::open(&ctx.data_dir)?;
    let lock = DataLock::acquire_default(store.dir())?;
    Ok((lock, Session::load(store)))
}

/// Surface a failed write as a command error.
fn finish(session: &mut Session<FileStore>) -> CmdResult {
    match session.take_write_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Resolve an id prefix, printing a hint when it is unknown or ambiguous.
fn resolve_or_hint(session: &Session<FileStore>, prefix: &str) -> Option<String> {
    let id = session.resolve_id(prefix);
    if id.is_none() {
        match session.tasks().prefix_match_count(prefix) {
            0 => eprintln!("no task matches '{}'", prefix),
            n => eprintln!("'{}' matches {} tasks; use a longer id", prefix, n),
        }
    }
    id
}

fn palette_for(theme: Theme) -> Palette {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    if no_color || !std::io::stdout().is_terminal() {
        Palette::plain()
    } else {
        Palette::for_theme(theme)
    }
}

fn print_task(session: &Session<FileStore>, id: &str, json: bool) -> CmdResult {
    let Some(task) = session.tasks().get(id) else {
        return Ok(());
    };
    let now = now_millis();
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task, now))?);
    } else {
        println!("{}", format_task_line(task, now, &palette_for(session.theme())));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let session = load_readonly(ctx);
    let mode = args.filter;
    let visible = session.visible(mode);
    let counts = session.tasks().counts();
    let now = now_millis();

    if ctx.json {
        let out = ListJson {
            filter: mode,
            counts,
            tasks: visible.iter().map(|t| task_to_json(t, now)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let palette = palette_for(session.theme());
        for line in format_listing(&visible, counts, now, &palette) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let (_lock, mut session) = open_locked(ctx)?;
    let text = join_words(&args.text);
    let Some(id) = session.add(&text, args.due.as_deref()) else {
        return Ok(());
    };
    finish(&mut session)?;
    print_task(&session, &id, ctx.json)
}

fn cmd_toggle(ctx: &Context, args: IdArg) -> CmdResult {
    let (_lock, mut session) = open_locked(ctx)?;
    let Some(id) = resolve_or_hint(&session, &args.id) else {
        return Ok(());
    };
    session.toggle(&id);
    finish(&mut session)?;
    print_task(&session, &id, ctx.json)
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let (_lock, mut session) = open_locked(ctx)?;
    let Some(id) = resolve_or_hint(&session, &args.id) else {
        return Ok(());
    };
    session.edit(&id, &join_words(&args.text));
    finish(&mut session)?;
    print_task(&session, &id, ctx.json)
}

fn cmd_rm(ctx: &Context, args: IdArg) -> CmdResult {
    let (_lock, mut session) = open_locked(ctx)?;
    let Some(id) = resolve_or_hint(&session, &args.id) else {
        return Ok(());
    };
    let short_id = session
        .tasks()
        .get(&id)
        .map(|t| t.short_id().to_string())
        .unwrap_or_default();
    session.remove(&id);
    finish(&mut session)?;
    if ctx.json {
        println!("{}", serde_json::json!({ "removed": id }));
    } else {
        println!("removed {}", short_id);
    }
    Ok(())
}

fn cmd_suggest(ctx: &Context, args: AddArgs) -> CmdResult {
    let text = join_words(&args.text);

    // Add the parent under the lock, then release it for the request.
    let pending = {
        let (_lock, mut session) = open_locked(ctx)?;
        let pending = session.begin_suggestion(&text, args.due.as_deref());
        finish(&mut session)?;
        match pending {
            Some(p) => p,
            None => return Ok(()),
        }
    };

    let client = GeminiClient::from_config(&ctx.config.suggest);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let suggestions = runtime.block_on(client.suggest(&pending.text));
    if suggestions.is_empty() {
        eprintln!("no suggestions available; added the task on its own");
    }

    let (_lock, mut session) = open_locked(ctx)?;
    let outcome: SuggestOutcome =
        session.finish_suggestion(pending, &suggestions, &ctx.config.suggest.subtask_prefix);
    finish(&mut session)?;

    let now = now_millis();
    if ctx.json {
        let out = SuggestJson {
            parent: outcome.parent.clone(),
            subtasks: outcome
                .subtasks
                .iter()
                .filter_map(|id| session.tasks().get(id))
                .map(|t| task_to_json(t, now))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let palette = palette_for(session.theme());
        for id in outcome.subtasks.iter().chain(outcome.parent.iter()) {
            if let Some(task) = session.tasks().get(id) {
                println!("{}", format_task_line(task, now, &palette));
            }
        }
    }
    Ok(())
}

fn cmd_theme(ctx: &Context, args: ThemeArgs) -> CmdResult {
    let theme = match args.action {
        None => load_readonly(ctx).theme(),
        Some(action) => {
            let (_lock, mut session) = open_locked(ctx)?;
            match action {
                ThemeAction::Light => {
                    session.set_theme(Theme::Light);
                }
                ThemeAction::Dark => {
                    session.set_theme(Theme::Dark);
                }
                ThemeAction::Toggle => {
                    session.toggle_theme();
                }
            }
            finish(&mut session)?;
            session.theme()
        }
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ThemeJson { theme })?);
    } else {
        println!("{}", theme);
    }
    Ok(())
}
