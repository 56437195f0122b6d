mod config;
mod logging;

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use canopy_core::reduce;
use canopy_core::Catalogue;
use canopy_core::NodeKey;
use canopy_core::Presenter;
use canopy_core::RecordingSurface;
use canopy_core::ThreadAction;
use canopy_core::ThreadId;
use canopy_core::UserAction;
use canopy_core::ViewState;
use canopy_remote::CommentService;
use canopy_remote::Dispatcher;
use canopy_remote::FixtureCommentService;
use chrono::Utc;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("canopy {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "render" => {
            let args = RenderArgs::parse(args.collect::<Vec<_>>())?;
            render(args)
        }
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderArgs {
    fixtures: PathBuf,
    thread: String,
    config: Option<PathBuf>,
    verbose: bool,
    expand_all: bool,
}

impl RenderArgs {
    fn parse(args: Vec<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut positional = Vec::new();
        let mut config = None;
        let mut verbose = false;
        let mut expand_all = false;
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    let Some(value) = args.get(i + 1) else {
                        return Err("--config requires a path".into());
                    };
                    config = Some(PathBuf::from(value));
                    i += 2;
                }
                "--verbose" | "-v" => {
                    verbose = true;
                    i += 1;
                }
                "--expand-all" => {
                    expand_all = true;
                    i += 1;
                }
                other if other.starts_with('-') => {
                    return Err(format!("unsupported argument: {other}").into());
                }
                other => {
                    positional.push(other.to_string());
                    i += 1;
                }
            }
        }
        let [fixtures, thread] = <[String; 2]>::try_from(positional)
            .map_err(|_| "render expects <fixture-dir> <thread-id>")?;
        Ok(Self {
            fixtures: PathBuf::from(fixtures),
            thread,
            config,
            verbose,
            expand_all,
        })
    }
}

fn render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let preferences = config::load_preferences(args.config.as_deref())?;
    logging::init(logging::level_for(
        args.verbose,
        preferences.log_level.as_deref(),
    ))?;

    let service = FixtureCommentService::new(&args.fixtures);
    log::info!("serving thread {} from {}", args.thread, service.root().display());
    let mut dispatcher = Dispatcher::new(service, preferences.user_hash.clone());
    let mut state = ViewState::new(preferences);

    let effects = reduce(
        &mut state,
        ThreadAction::User(UserAction::Navigate(ThreadId::new(args.thread.clone()))),
    );
    let mut frames = dispatcher.drain(&mut state, effects);
    if args.expand_all {
        frames += expand_all(&mut state, &mut dispatcher);
    }
    log::debug!("{frames} frames requested");

    let catalogue = Catalogue::english();
    let presenter = Presenter::new(&catalogue, Utc::now());
    let mut surface = RecordingSurface::new();
    presenter.present(&state, &mut surface);
    print!("{}", surface.render_text());

    if let Some(err) = &state.last_action_error {
        eprintln!("warning: {err}");
    }
    Ok(())
}

/// Expands every placeholder once, including the ones that appear inside expansions.
fn expand_all<S: CommentService>(state: &mut ViewState, dispatcher: &mut Dispatcher<S>) -> usize {
    let mut attempted: HashSet<NodeKey> = HashSet::new();
    let mut frames = 0;
    loop {
        let pending: Vec<NodeKey> = match state.tree.as_ref() {
            Some(tree) => tree
                .depth_first()
                .into_iter()
                .map(|(key, _)| key)
                .filter(|key| tree.placeholder(*key).is_some() && !attempted.contains(key))
                .collect(),
            None => Vec::new(),
        };
        if pending.is_empty() {
            return frames;
        }
        for node in pending {
            attempted.insert(node);
            let effects = reduce(state, ThreadAction::User(UserAction::ExpandMore { node }));
            frames += dispatcher.drain(state, effects);
        }
    }
}

fn print_help() {
    println!(
        "canopy {}\n\nUSAGE:\n  canopy render <fixture-dir> <thread-id> [--config PATH] [--verbose] [--expand-all]\n  canopy --help\n  canopy --version\n\nThe fixture directory holds <thread-id>.json in the two-listing thread format and,\noptionally, morechildren.json for expansions.",
        env!("CARGO_PKG_VERSION")
    );
}
