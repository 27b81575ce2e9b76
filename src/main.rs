use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use stream_viewer::catalog::ContentEntry;
use stream_viewer::screens::category_sync::{CategorySelection, load_category_selection};
use stream_viewer::screens::detail::{DetailContent, DetailView, EpisodeAction, load_detail};
use stream_viewer::screens::home::{HomeView, load_home};
use stream_viewer::screens::login::{login, logout};
use std::time::Duration;
use stream_viewer::credentials::open_store;
use stream_viewer::session::{LoadOutcome, ScreenActivations, spawn_load};
use stream_viewer::{
    CatalogError, ConfigError, ContentKind, CredentialStore, CredentialStoreError, Credentials,
    ExternalPlayer, HttpCatalogClient, LoginError, PlayRequest, PlaybackSession, PlayerError,
    Route, RouteError, Settings, StreamUrls, StreamViewerError,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Browse and play the catalogs of a stream viewer backend
#[derive(Debug, Parser)]
#[command(name = "stream-viewer", version, about)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in to a backend and remember the credentials
    Login {
        /// Backend URL, e.g. http://192.168.0.10:5000
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// Upstream Xtream provider URL
        #[arg(long)]
        provider: Option<String>,
    },
    /// Forget the stored credentials
    Logout,
    /// Show watchlist, favorites and categories
    Home {
        #[arg(long, default_value = "movies")]
        kind: ContentKind,
    },
    /// Show the details of a movie or series
    Detail { kind: ContentKind, id: u64 },
    /// Play a movie, or an episode of a series
    Play {
        kind: ContentKind,
        id: u64,
        /// Episode to play; defaults to the episode in progress
        #[arg(long)]
        episode: Option<u64>,
        /// Overwrite progress on another episode without asking
        #[arg(long)]
        yes: bool,
    },
    /// Add or remove a favorite
    Favorite { kind: ContentKind, id: u64 },
    /// Add to or remove from the watchlist
    Watchlist { kind: ContentKind, id: u64 },
    /// Choose which provider categories the backend syncs
    Categories {
        #[arg(long, default_value = "movies")]
        kind: ContentKind,
    },
    /// Browse interactively
    Browse,
    /// Browse interactively, starting at a route such as `detail/series/42`
    Open { route: String },
    /// Show where settings are read from
    Config {
        /// Write the effective settings to the config file
        #[arg(long)]
        init: bool,
        /// Replace an existing config file when used with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] StreamViewerError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    CredentialStore(#[from] CredentialStoreError),

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Usage(String),
}

struct App {
    settings: Settings,
    config_path: PathBuf,
    store: Box<dyn CredentialStore>,
}

impl App {
    fn client(&self) -> Result<HttpCatalogClient, CliError> {
        Ok(stream_viewer::connect(self.store.as_ref(), &self.settings)?)
    }

    /// Longest wait for a screen load: the primary request, then the
    /// concurrent secondary ones.
    fn load_timeout(&self) -> Duration {
        self.settings.server.timeout() * 2
    }

    fn player(&self) -> ExternalPlayer {
        ExternalPlayer::new(&self.settings.player)
    }
}

fn init_logging(verbose: bool, settings: &Settings) {
    let filter = if verbose {
        EnvFilter::new("stream_viewer=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let settings = match Settings::load_from(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    init_logging(cli.verbose, &settings);

    let store = match open_store(settings.credentials.backend) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    tracing::debug!(backend = ?settings.credentials.backend, "credential store opened");

    let app = App {
        settings,
        config_path,
        store,
    };
    if let Err(e) = run(&app, cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(app: &App, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login {
            server,
            username,
            provider,
        } => login_prompt(app, server, username, provider).map(|_| ()),
        Command::Logout => {
            logout(app.store.as_ref())?;
            println!("Logged out.");
            Ok(())
        }
        Command::Home { kind } => {
            let view = load_home(&app.client()?, kind)?;
            print_home(&view);
            Ok(())
        }
        Command::Detail { kind, id } => {
            let view = load_detail(&app.client()?, kind, id)?;
            print_detail(&view);
            Ok(())
        }
        Command::Play {
            kind,
            id,
            episode,
            yes,
        } => play_command(app, kind, id, episode, yes),
        Command::Favorite { kind, id } => {
            let client = app.client()?;
            let mut view = load_detail(&client, kind, id)?;
            let favorite = view.toggle_favorite(&client)?;
            println!(
                "{} {}",
                view.key,
                if favorite { "added to favorites" } else { "removed from favorites" }
            );
            Ok(())
        }
        Command::Watchlist { kind, id } => {
            let client = app.client()?;
            let mut view = load_detail(&client, kind, id)?;
            let listed = view.toggle_watchlist(&client)?;
            println!(
                "{} {}",
                view.key,
                if listed { "added to watchlist" } else { "removed from watchlist" }
            );
            Ok(())
        }
        Command::Categories { kind } => {
            let client = app.client()?;
            let mut selection = load_category_selection(&client, kind)?;
            edit_categories(&client, &mut selection)
        }
        Command::Browse => {
            let start = match app.store.load()? {
                Some(_) => Route::Home {
                    kind: ContentKind::Movie,
                },
                None => Route::Login,
            };
            navigate(app, start)
        }
        Command::Open { route } => navigate(app, Route::parse(&route)?),
        Command::Config { init, force } => config_command(app, init, force),
    }
}

fn config_command(app: &App, init: bool, force: bool) -> Result<(), CliError> {
    let path = &app.config_path;
    if !init {
        let state = if path.exists() { "" } else { " (not created, using defaults)" };
        println!("{}{}", path.display(), state);
        return Ok(());
    }
    if path.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} already exists; pass --force to replace it",
            path.display()
        )));
    }
    app.settings.save_to(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn login_prompt(
    app: &App,
    server: Option<String>,
    username: Option<String>,
    provider: Option<String>,
) -> Result<Credentials, CliError> {
    let previous = app.store.load()?.unwrap_or_default();
    let or_previous = |value: String, fallback: &str| {
        if value.is_empty() { fallback.to_string() } else { value }
    };

    let base_url = match server {
        Some(server) => server,
        None => Input::<String>::new()
            .with_prompt("Server URL")
            .default(or_previous(
                previous.base_url.clone(),
                &app.settings.server.default_base_url,
            ))
            .interact_text()?,
    };
    let username = match username {
        Some(username) => username,
        None => Input::<String>::new()
            .with_prompt("Username")
            .with_initial_text(previous.username.clone())
            .interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;
    let provider_url = match provider {
        Some(provider) => provider,
        None => Input::<String>::new()
            .with_prompt("Xtream provider URL")
            .with_initial_text(previous.provider_url.clone())
            .interact_text()?,
    };

    let candidate = Credentials::new(base_url, username, password, provider_url);
    let client = HttpCatalogClient::new(candidate.clone(), app.settings.server.timeout())?;
    let info = login(app.store.as_ref(), &candidate, &client)?;

    println!("Logged in as {}.", info.username.as_deref().unwrap_or(&candidate.username));
    if let Some(status) = &info.status {
        println!("  Account status: {}", status);
    }
    if let Some(message) = info.message.as_deref().filter(|m| !m.is_empty()) {
        println!("  {}", message);
    }
    Ok(candidate)
}

fn entry_label(entry: &ContentEntry) -> String {
    let rating = entry.rating_text();
    if rating.is_empty() {
        format!("[{}] {}", entry.canonical_id(), entry.name)
    } else {
        format!("[{}] {} ({})", entry.canonical_id(), entry.name, rating)
    }
}

fn print_home(view: &HomeView) {
    for (row, entries) in view.rows() {
        println!("\n=== {} ===", row);
        for entry in entries {
            println!("  {}", entry_label(entry));
        }
    }
}

fn print_detail(view: &DetailView) {
    let title = match view.kind {
        ContentKind::Movie => "Movie Details",
        ContentKind::Series => "Series Details",
    };
    println!("=== {} ({}) ===", title, view.key);
    println!(
        "Favorite: {}  Watchlist: {}",
        if view.is_favorite { "yes" } else { "no" },
        if view.is_in_watchlist() { "yes" } else { "no" }
    );

    if let Some(plot) = view.plot() {
        println!("\nPlot\n{}", nanohtml2text::html2text(plot).trim());
    }
    if let Some(cast) = view.cast() {
        println!("Cast: {}", cast);
    }
    if let Some(director) = view.director() {
        println!("Director: {}", director);
    }
    if let Some(label) = view.play_label() {
        println!("\n[{}]", label);
    }

    if let DetailContent::Series { info, .. } = &view.content {
        if let Some(caption) = view.resume_caption() {
            println!("\n[{}]", caption);
        }
        let active = view.active_episode().map(|e| e.id);
        for season in view.seasons() {
            println!("\n{}", season.name);
            for episode in info.episodes_in(season.season_number) {
                let marker = if Some(episode.id) == active { "*" } else { " " };
                println!(
                    " {} [{}] {}. {}",
                    marker, episode.id, episode.episode_num, episode.title
                );
            }
        }
    }
}

fn stream_urls(client: &HttpCatalogClient) -> StreamUrls {
    StreamUrls::from_credentials(client.credentials())
}

fn play_command(
    app: &App,
    kind: ContentKind,
    id: u64,
    episode: Option<u64>,
    yes: bool,
) -> Result<(), CliError> {
    let client = app.client()?;
    let urls = stream_urls(&client);
    let mut view = load_detail(&client, kind, id)?;

    let request = match (kind, episode) {
        (ContentKind::Movie, _) => view.movie_play(&urls, None),
        (ContentKind::Series, None) => match view.resume_play(&urls) {
            Some(request) => Some(request),
            None => {
                return Err(CliError::Usage(
                    "No episode in progress; pass --episode <id>".to_string(),
                ));
            }
        },
        (ContentKind::Series, Some(episode_id)) => {
            match view.select_episode(episode_id, &urls) {
                Some(EpisodeAction::Play(request)) => Some(request),
                Some(EpisodeAction::ConfirmOverwrite) => {
                    if yes || confirm_overwrite()? {
                        view.confirm_overwrite(&urls)
                    } else {
                        view.cancel_overwrite();
                        println!("Cancelled.");
                        None
                    }
                }
                None => {
                    return Err(CliError::Usage(format!(
                        "Series {} has no episode {}",
                        id, episode_id
                    )));
                }
            }
        }
    };

    match request {
        Some(request) => play(app, request),
        None => Ok(()),
    }
}

fn confirm_overwrite() -> Result<bool, CliError> {
    println!("Starting this episode will overwrite your current progress in another episode.");
    Ok(Confirm::new()
        .with_prompt("Overwrite current Playback?")
        .default(false)
        .interact()?)
}

fn play(app: &App, request: PlayRequest) -> Result<(), CliError> {
    let mut player = app.player();
    let mut session = PlaybackSession::start(&mut player, request)?;
    println!("Playing. Close the player to return.");
    match session.wait() {
        Ok(()) => Ok(()),
        // The viewer closing the player early is not an error here
        Err(PlayerError::Exited(code)) => {
            tracing::warn!(?code, "player exited unsuccessfully");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn edit_categories<C>(catalog: &C, selection: &mut CategorySelection) -> Result<(), CliError>
where
    C: stream_viewer::CatalogService + ?Sized,
{
    let labels: Vec<String> = selection
        .categories()
        .iter()
        .map(|c| c.display_name().to_string())
        .collect();
    let defaults: Vec<bool> = selection
        .categories()
        .iter()
        .map(|c| selection.is_selected(&c.category_id))
        .collect();

    let Some(chosen) = MultiSelect::new()
        .with_prompt(format!("Categories to sync ({})", selection.kind.plural()))
        .items(&labels)
        .defaults(&defaults)
        .interact_opt()?
    else {
        println!("Unchanged.");
        return Ok(());
    };

    let ids: Vec<String> = chosen
        .into_iter()
        .filter_map(|i| selection.categories().get(i))
        .map(|c| c.category_id.clone())
        .collect();
    selection.set_selected(ids.iter().map(String::as_str));

    if selection.save(catalog)? {
        println!("Saved {} categories.", selection.selected_count());
    } else {
        println!("The backend did not accept the selection.");
    }
    Ok(())
}

/// Next step of the interactive navigator.
#[derive(Debug, PartialEq)]
enum Nav {
    Push(Route),
    Replace(Route),
    Back,
    Quit,
}

fn navigate(app: &App, start: Route) -> Result<(), CliError> {
    let activations = ScreenActivations::new();
    let mut stack = vec![start];

    while let Some(route) = stack.last().cloned() {
        tracing::debug!(route = %route.to_path(), "navigating");
        let nav = match show_screen(app, &activations, &route) {
            Ok(nav) => nav,
            Err(error) => on_screen_error(&route, error)?,
        };
        activations.deactivate();

        match nav {
            Nav::Push(route) => stack.push(route),
            Nav::Replace(route) => {
                stack.pop();
                stack.push(route);
            }
            Nav::Back => {
                stack.pop();
            }
            Nav::Quit => break,
        }
    }
    Ok(())
}

fn show_screen(app: &App, activations: &ScreenActivations, route: &Route) -> Result<Nav, CliError> {
    match route {
        Route::Login => {
            login_prompt(app, None, None, None)?;
            Ok(Nav::Replace(Route::Home {
                kind: ContentKind::Movie,
            }))
        }
        Route::Home { kind } => home_screen(app, activations, *kind),
        Route::Sync { kind } => {
            let client = app.client()?;
            let mut selection = load_category_selection(&client, *kind)?;
            edit_categories(&client, &mut selection)?;
            Ok(Nav::Back)
        }
        Route::Detail { kind, id } => detail_screen(app, activations, *kind, *id),
        Route::Player(request) => {
            play(app, request.clone())?;
            Ok(Nav::Back)
        }
    }
}

/// Reports a failed screen and decides where the navigator goes next.
///
/// Login asks again and every other screen returns to the previous one.
/// A broken terminal ends the session.
fn on_screen_error(route: &Route, error: CliError) -> Result<Nav, CliError> {
    if let CliError::Prompt(_) = error {
        return Err(error);
    }
    tracing::warn!(route = %route.to_path(), %error, "screen failed");
    eprintln!("Error: {}", error);
    Ok(match (route, &error) {
        (Route::Login, _) => Nav::Replace(Route::Login),
        (_, CliError::App(StreamViewerError::NotLoggedIn)) => Nav::Replace(Route::Login),
        _ => Nav::Back,
    })
}

/// Loads on a worker thread and accepts the result only for the current
/// activation of the screen.
///
/// The prompt cannot be interrupted while the load runs, so the wait is
/// bounded by `timeout` instead. A load that overruns it is
/// abandoned and its late result discarded.
fn load_screen<T, F>(
    activations: &ScreenActivations,
    timeout: Duration,
    load: F,
) -> Result<Option<T>, CliError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CatalogError> + Send + 'static,
{
    let pending = spawn_load(activations.activate(), load);
    match activations.wait(&pending, timeout) {
        LoadOutcome::Ready(result) => Ok(Some(result?)),
        LoadOutcome::Superseded => Ok(None),
        LoadOutcome::TimedOut => Err(CliError::Usage(format!(
            "Loading took longer than {}s",
            timeout.as_secs()
        ))),
        LoadOutcome::Lost => Err(CliError::Usage("Loading failed unexpectedly".to_string())),
    }
}

fn home_screen(
    app: &App,
    activations: &ScreenActivations,
    kind: ContentKind,
) -> Result<Nav, CliError> {
    let client = Arc::new(app.client()?);
    let loader = Arc::clone(&client);
    let Some(view) = load_screen(activations, app.load_timeout(), move || {
        load_home(&*loader, kind)
    })?
    else {
        return Ok(Nav::Back);
    };

    let mut labels = vec![
        format!("Switch to {}", kind.other().plural()),
        "Category sync".to_string(),
        "Logout".to_string(),
        "Quit".to_string(),
    ];
    let mut targets: Vec<&ContentEntry> = Vec::new();
    for (row, entries) in view.rows() {
        for entry in entries {
            labels.push(format!("{} › {}", row, entry_label(entry)));
            targets.push(entry);
        }
    }

    let Some(choice) = Select::new()
        .with_prompt(format!("Home ({})", kind.plural()))
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(Nav::Quit);
    };

    Ok(match choice {
        0 => Nav::Replace(Route::Home { kind: kind.other() }),
        1 => Nav::Push(Route::Sync { kind }),
        2 => {
            logout(app.store.as_ref())?;
            Nav::Replace(Route::Login)
        }
        3 => Nav::Quit,
        n => {
            let entry = targets[n - 4];
            if entry.id.is_resolved() {
                Nav::Push(Route::Detail {
                    kind: entry.kind().unwrap_or(kind),
                    id: entry.canonical_id(),
                })
            } else {
                println!("'{}' has no known id and cannot be opened.", entry.name);
                Nav::Replace(Route::Home { kind })
            }
        }
    })
}

fn detail_screen(
    app: &App,
    activations: &ScreenActivations,
    kind: ContentKind,
    id: u64,
) -> Result<Nav, CliError> {
    let client = Arc::new(app.client()?);
    let urls = stream_urls(&client);
    let loader = Arc::clone(&client);
    let Some(mut view) = load_screen(activations, app.load_timeout(), move || {
        load_detail(&*loader, kind, id)
    })?
    else {
        return Ok(Nav::Back);
    };

    loop {
        print_detail(&view);

        enum Action {
            Movie,
            Resume,
            Season,
            Episode(u64),
            Favorite,
            Watchlist,
            Back,
        }
        let mut labels = Vec::new();
        let mut actions = Vec::new();

        if let Some(label) = view.play_label() {
            labels.push(label.to_string());
            actions.push(Action::Movie);
        }
        if let Some(caption) = view.resume_caption() {
            labels.push(caption);
            actions.push(Action::Resume);
        }
        if view.seasons().len() > 1 {
            labels.push("Choose season".to_string());
            actions.push(Action::Season);
        }
        for episode in view.episodes_in_selected_season() {
            labels.push(format!("{}. {}", episode.episode_num, episode.title));
            actions.push(Action::Episode(episode.id));
        }
        labels.push(
            if view.is_favorite { "Remove favorite" } else { "Add favorite" }.to_string(),
        );
        actions.push(Action::Favorite);
        labels.push(
            if view.is_in_watchlist() { "Remove from watchlist" } else { "Add to watchlist" }
                .to_string(),
        );
        actions.push(Action::Watchlist);
        labels.push("Back".to_string());
        actions.push(Action::Back);

        let Some(choice) = Select::new().items(&labels).default(0).interact_opt()? else {
            return Ok(Nav::Back);
        };

        match actions.get(choice).unwrap_or(&Action::Back) {
            Action::Movie => {
                if let Some(request) = view.movie_play(&urls, None) {
                    return Ok(Nav::Push(Route::Player(request)));
                }
            }
            Action::Resume => {
                if let Some(request) = view.resume_play(&urls) {
                    return Ok(Nav::Push(Route::Player(request)));
                }
            }
            Action::Season => {
                let seasons = view.seasons();
                let names: Vec<&str> = seasons.iter().map(|s| s.name.as_str()).collect();
                if let Some(season) = Select::new()
                    .with_prompt("Season")
                    .items(&names)
                    .interact_opt()?
                    .and_then(|i| seasons.get(i))
                {
                    view.select_season(season.season_number);
                }
            }
            Action::Episode(episode_id) => match view.select_episode(*episode_id, &urls) {
                Some(EpisodeAction::Play(request)) => {
                    return Ok(Nav::Push(Route::Player(request)));
                }
                Some(EpisodeAction::ConfirmOverwrite) => {
                    if confirm_overwrite()? {
                        if let Some(request) = view.confirm_overwrite(&urls) {
                            return Ok(Nav::Push(Route::Player(request)));
                        }
                    } else {
                        view.cancel_overwrite();
                    }
                }
                None => {}
            },
            // A failed toggle leaves the view as it was
            Action::Favorite => {
                if let Err(e) = view.toggle_favorite(&*client) {
                    eprintln!("Error: {}", e);
                }
            }
            Action::Watchlist => {
                if let Err(e) = view.toggle_watchlist(&*client) {
                    eprintln!("Error: {}", e);
                }
            }
            Action::Back => return Ok(Nav::Back),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail() -> Route {
        Route::Detail {
            kind: ContentKind::Series,
            id: 7,
        }
    }

    fn backend_down() -> CliError {
        CliError::Catalog(CatalogError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        })
    }

    #[test]
    fn test_failed_screen_returns_to_previous() {
        assert_eq!(on_screen_error(&detail(), backend_down()).unwrap(), Nav::Back);
        assert_eq!(
            on_screen_error(
                &Route::Home {
                    kind: ContentKind::Movie
                },
                CliError::Usage("Loading took longer than 30s".to_string())
            )
            .unwrap(),
            Nav::Back
        );
    }

    #[test]
    fn test_failed_login_asks_again() {
        assert_eq!(
            on_screen_error(&Route::Login, backend_down()).unwrap(),
            Nav::Replace(Route::Login)
        );
        assert_eq!(
            on_screen_error(&detail(), CliError::App(StreamViewerError::NotLoggedIn)).unwrap(),
            Nav::Replace(Route::Login)
        );
    }

    #[test]
    fn test_prompt_failure_ends_navigation() {
        let error = CliError::Prompt(dialoguer::Error::IO(std::io::Error::other("no tty")));
        assert!(matches!(
            on_screen_error(&detail(), error),
            Err(CliError::Prompt(_))
        ));
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::try_parse_from(["stream-viewer", "config", "--init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                init: true,
                force: true
            }
        ));
        assert!(Cli::try_parse_from(["stream-viewer", "config", "--force"]).is_err());
    }
}
