//! CLI command implementations

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Subcommand;
use reelview_core::config::ControllerConfig;
use reelview_core::controller::details::{DetailsEvent, spawn_details_controller};
use reelview_core::controller::lists::{ListsEvent, ListsHandle, spawn_lists_controller};
use reelview_core::controller::search::{SearchEvent, spawn_search_controller};
use reelview_core::domain::{Category, ListKind, MediaId, MediaType, TimeWindow, TrendingScope};
use reelview_core::state::lists::ListsState;
use reelview_core::{DetailsRepository, FetchError, MediaRepository, ReelviewConfig, ReelviewError};
use reelview_tmdb::{CachedRepository, MediaSource, MockSource, TmdbClient};

use crate::output;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show a curated listing
    List {
        /// Media type of the listing
        #[arg(short = 't', long = "type", default_value = "movie")]
        media_type: MediaType,
        /// popular, top-rated, now-playing, upcoming, on-the-air or airing-today
        #[arg(short, long, default_value = "popular")]
        category: Category,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Show what is trending
    Trending {
        /// all, movie or tv
        #[arg(long, default_value = "all")]
        scope: TrendingScope,
        /// day or week
        #[arg(long, default_value = "day")]
        window: TimeWindow,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Search movies and shows by title
    Search {
        /// Search terms
        query: String,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Show everything known about one title
    Details {
        /// TMDB id of the title
        id: MediaId,
        /// Media type of the title
        #[arg(short = 't', long = "type", default_value = "movie")]
        media_type: MediaType,
        /// Listing to look the title up in before fetching details
        #[arg(short, long)]
        category: Option<Category>,
        /// Pick a video and print its YouTube link
        #[arg(short, long)]
        watch: bool,
    },
    /// Show the genre lists
    Genres {
        /// Only this media type
        #[arg(short = 't', long = "type")]
        media_type: Option<MediaType>,
    },
}

/// Settings shared by every command.
pub struct Context {
    pub config: ReelviewConfig,
    pub json: bool,
    pub offline: bool,
}

/// Both repository ports over one cache.
pub struct Repositories {
    media: Arc<dyn MediaRepository>,
    details: Arc<dyn DetailsRepository>,
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands, context: &Context) -> Result<()> {
    if context.offline {
        tracing::info!("Offline mode, serving canned data");
        return run_with_source(command, context, MockSource::new()).await;
    }

    let client = TmdbClient::new(&context.config.api)
        .map_err(|e| ReelviewError::from(FetchError::from(e)))?;
    tracing::debug!(base_url = %client.base_url(), "Using TMDB API");
    run_with_source(command, context, client).await
}

async fn run_with_source<S: MediaSource + 'static>(
    command: Commands,
    context: &Context,
    source: S,
) -> Result<()> {
    let repository = Arc::new(CachedRepository::new(source, &context.config.cache));
    let repositories = Repositories {
        media: repository.clone(),
        details: repository.clone(),
    };

    let result = match command {
        Commands::List {
            media_type,
            category,
            pages,
        } => list(context, &repositories, media_type, category, pages).await,
        Commands::Trending {
            scope,
            window,
            pages,
        } => {
            let kind = ListKind::trending(scope, window);
            show_listing(context, &repositories, kind, pages).await
        }
        Commands::Search { query, pages } => search(context, &repositories, query, pages).await,
        Commands::Details {
            id,
            media_type,
            category,
            watch,
        } => details(context, &repositories, id, media_type, category, watch).await,
        Commands::Genres { media_type } => genres(context, &repositories, media_type).await,
    };

    let stats = repository.statistics();
    tracing::debug!(
        entries = stats.entries,
        hits = stats.hit_count,
        misses = stats.miss_count,
        hit_rate = stats.hit_rate(),
        "Response cache statistics"
    );
    result
}

/// Show a category listing
///
/// # Errors
/// - Category is not offered for the media type
/// - Listing failed to load
pub async fn list(
    context: &Context,
    repositories: &Repositories,
    media_type: MediaType,
    category: Category,
    pages: u32,
) -> Result<()> {
    if !category.is_available_for(media_type) {
        bail!(
            "'{}' is not available for {media_type} listings",
            category.as_path()
        );
    }
    let kind = ListKind::category(media_type, category);
    show_listing(context, repositories, kind, pages).await
}

/// Load up to `pages` pages of a listing and print them
///
/// # Errors
/// - Listing failed to load and nothing was shown
/// - Controller stopped
pub async fn show_listing(
    context: &Context,
    repositories: &Repositories,
    kind: ListKind,
    pages: u32,
) -> Result<()> {
    let handle = spawn_lists_controller(repositories.media.clone(), &context.config.controller);
    handle.send(ListsEvent::Load(kind)).await?;
    let mut state = handle.settle().await?;

    for _ in 1..pages {
        let has_more = state.lists.get(&kind).is_some_and(|list| list.has_more());
        if !has_more || state.errors.contains_key(&kind) {
            break;
        }
        handle.send(ListsEvent::Paginate(kind)).await?;
        state = handle.settle().await?;
    }
    handle.shutdown().await?;

    report_listing_error(&state, kind)?;
    tracing::info!(%kind, titles = state.items(kind).len(), "Listing loaded");

    if context.json {
        output::print_json(&state.items(kind))
    } else {
        output::print_titles(&kind.to_string(), state.items(kind));
        Ok(())
    }
}

fn report_listing_error(state: &ListsState, kind: ListKind) -> Result<()> {
    let Some(message) = state.errors.get(&kind) else {
        return Ok(());
    };
    if state.items(kind).is_empty() {
        bail!("Loading {kind} failed: {message}");
    }
    eprintln!("warning: not every page of {kind} loaded: {message}");
    Ok(())
}

/// Search titles and print the results
///
/// # Errors
/// - Search failed
/// - Controller stopped
pub async fn search(
    context: &Context,
    repositories: &Repositories,
    query: String,
    pages: u32,
) -> Result<()> {
    // A single query from the command line has nothing to debounce
    let config = ControllerConfig {
        search_debounce: Duration::ZERO,
        ..context.config.controller.clone()
    };
    let handle = spawn_search_controller(repositories.media.clone(), &config);
    handle.send(SearchEvent::QueryChanged(query.clone())).await?;
    let mut state = handle.settle().await?;

    for _ in 1..pages {
        if !state.results.has_more() || state.error.is_some() {
            break;
        }
        handle.send(SearchEvent::Paginate).await?;
        state = handle.settle().await?;
    }
    handle.shutdown().await?;

    if let Some(message) = &state.error {
        if state.results.is_empty() {
            bail!("Search for '{query}' failed: {message}");
        }
        eprintln!("warning: not every page of results loaded: {message}");
    }
    tracing::info!(query = %query, titles = state.results.len(), "Search finished");

    if context.json {
        output::print_json(&state.results.items)
    } else {
        let heading = format!("Results for '{query}'");
        output::print_titles(&heading, &state.results.items);
        Ok(())
    }
}

/// Show one title with cast, videos and similar titles
///
/// # Errors
/// - Title details failed to load
/// - Controller stopped
pub async fn details(
    context: &Context,
    repositories: &Repositories,
    id: MediaId,
    media_type: MediaType,
    category: Option<Category>,
    watch: bool,
) -> Result<()> {
    let lists = spawn_lists_controller(repositories.media.clone(), &context.config.controller);
    lists.send(ListsEvent::LoadGenres { refresh: false }).await?;
    if let Some(category) = category {
        // The listing fills the local item index the details screen starts from
        lists
            .send(ListsEvent::Load(ListKind::category(media_type, category)))
            .await?;
    }
    let genres = settle_and_stop(lists).await?;

    let handle = spawn_details_controller(
        repositories.media.clone(),
        repositories.details.clone(),
        &context.config.controller,
    );
    handle
        .send(DetailsEvent::SetDataAndLoad {
            id,
            media_type,
            category: category.map(Category::as_path).unwrap_or_default().to_string(),
            movie_genres: genres.movie_genres,
            tv_genres: genres.tv_genres,
        })
        .await?;
    let mut state = handle.settle().await?;

    if watch {
        handle.send(DetailsEvent::NavigateToWatchVideo).await?;
        state = handle.settle().await?;
    }
    handle.shutdown().await?;

    if state.media.is_none() {
        let reason = state.errors.details.as_deref().unwrap_or("no data returned");
        bail!("Loading {media_type} {id} failed: {reason}");
    }

    if context.json {
        output::print_json(&state)
    } else {
        output::print_details(&state, &context.config.api.image_base_url);
        if watch {
            output::print_watch_link(&state);
        }
        Ok(())
    }
}

/// Print the genre lists
///
/// # Errors
/// - Genres failed to load
/// - Controller stopped
pub async fn genres(
    context: &Context,
    repositories: &Repositories,
    media_type: Option<MediaType>,
) -> Result<()> {
    let handle = spawn_lists_controller(repositories.media.clone(), &context.config.controller);
    handle.send(ListsEvent::LoadGenres { refresh: false }).await?;
    let state = settle_and_stop(handle).await?;

    if let Some(message) = &state.genre_error {
        bail!("Loading genres failed: {message}");
    }

    let types = match media_type {
        Some(media_type) => vec![media_type],
        None => vec![MediaType::Movie, MediaType::Tv],
    };
    if context.json {
        let mut genres = serde_json::Map::new();
        for media_type in &types {
            genres.insert(
                media_type.to_string(),
                serde_json::to_value(state.genres(*media_type))?,
            );
        }
        output::print_json(&genres)
    } else {
        for media_type in types {
            output::print_genres(media_type, state.genres(media_type));
        }
        Ok(())
    }
}

async fn settle_and_stop(handle: ListsHandle) -> Result<ListsState> {
    let state = handle.settle().await?;
    handle.shutdown().await?;
    Ok(state)
}
