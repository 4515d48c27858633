//! Media domain model shared by repositories, screen states and the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier TMDB assigns to a movie or show.
pub type MediaId = u64;

/// Base URL for poster and backdrop images.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Number of similar titles shown in the compact row of the details screen.
pub const SMALL_SIMILAR_LIST_SIZE: usize = 10;

/// Failed to parse one of the listing identifiers from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct ParseKindError {
    /// Which identifier was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl ParseKindError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Whether a title is a movie or a TV show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment used by the API.
    pub fn as_path(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for MediaType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaType::Movie),
            "tv" | "show" | "shows" => Ok(MediaType::Tv),
            _ => Err(ParseKindError::new("media type", s)),
        }
    }
}

/// Curated listing offered per media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
    OnTheAir,
    AiringToday,
}

impl Category {
    /// Path segment used by the API.
    pub fn as_path(self) -> &'static str {
        match self {
            Category::Popular => "popular",
            Category::TopRated => "top_rated",
            Category::NowPlaying => "now_playing",
            Category::Upcoming => "upcoming",
            Category::OnTheAir => "on_the_air",
            Category::AiringToday => "airing_today",
        }
    }

    /// Whether the API serves this listing for the given media type.
    pub fn is_available_for(self, media_type: MediaType) -> bool {
        match self {
            Category::Popular | Category::TopRated => true,
            Category::NowPlaying | Category::Upcoming => media_type == MediaType::Movie,
            Category::OnTheAir | Category::AiringToday => media_type == MediaType::Tv,
        }
    }
}

impl FromStr for Category {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "popular" => Ok(Category::Popular),
            "top_rated" => Ok(Category::TopRated),
            "now_playing" => Ok(Category::NowPlaying),
            "upcoming" => Ok(Category::Upcoming),
            "on_the_air" => Ok(Category::OnTheAir),
            "airing_today" => Ok(Category::AiringToday),
            _ => Err(ParseKindError::new("category", s)),
        }
    }
}

/// Which titles a trending listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingScope {
    All,
    Movie,
    Tv,
}

impl TrendingScope {
    pub fn as_path(self) -> &'static str {
        match self {
            TrendingScope::All => "all",
            TrendingScope::Movie => "movie",
            TrendingScope::Tv => "tv",
        }
    }
}

impl FromStr for TrendingScope {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TrendingScope::All),
            "movie" | "movies" => Ok(TrendingScope::Movie),
            "tv" => Ok(TrendingScope::Tv),
            _ => Err(ParseKindError::new("trending scope", s)),
        }
    }
}

/// Time window a trending listing is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_path(self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            _ => Err(ParseKindError::new("time window", s)),
        }
    }
}

/// Identifies one paginated listing of titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ListKind {
    /// `{type}/{category}`
    Category {
        media_type: MediaType,
        category: Category,
    },
    /// `trending/{scope}/{window}`
    Trending {
        scope: TrendingScope,
        window: TimeWindow,
    },
}

impl ListKind {
    /// Creates a category listing.
    pub fn category(media_type: MediaType, category: Category) -> Self {
        ListKind::Category {
            media_type,
            category,
        }
    }

    /// Creates a trending listing.
    pub fn trending(scope: TrendingScope, window: TimeWindow) -> Self {
        ListKind::Trending { scope, window }
    }

    /// Label stored in `Media::category` for titles from this listing.
    pub fn label(&self) -> &'static str {
        match self {
            ListKind::Category { category, .. } => category.as_path(),
            ListKind::Trending { .. } => "trending",
        }
    }

    /// Media type every entry of the listing has, if the listing is not mixed.
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            ListKind::Category { media_type, .. } => Some(*media_type),
            ListKind::Trending {
                scope: TrendingScope::Movie,
                ..
            } => Some(MediaType::Movie),
            ListKind::Trending {
                scope: TrendingScope::Tv,
                ..
            } => Some(MediaType::Tv),
            ListKind::Trending {
                scope: TrendingScope::All,
                ..
            } => None,
        }
    }

    /// API path of the listing, relative to the base URL.
    pub fn path(&self) -> String {
        match self {
            ListKind::Category {
                media_type,
                category,
            } => format!("{}/{}", media_type.as_path(), category.as_path()),
            ListKind::Trending { scope, window } => {
                format!("trending/{}/{}", scope.as_path(), window.as_path())
            }
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A movie or TV show as shown on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    pub media_type: MediaType,
    /// Listing the title was loaded from (`popular`, `trending`, `search`, ...)
    pub category: String,
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// `YYYY-MM-DD`, first air date for shows
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub genre_ids: Vec<u64>,
    pub original_language: String,
    pub adult: bool,
    /// Runtime in minutes, only known after a details fetch
    pub runtime: Option<u32>,
    pub status: Option<String>,
    pub tagline: Option<String>,
}

impl Media {
    /// Creates a title with only identity fields set.
    pub fn new(id: MediaId, title: impl Into<String>, media_type: MediaType) -> Self {
        let title = title.into();
        Self {
            id,
            original_title: title.clone(),
            title,
            overview: String::new(),
            media_type,
            category: String::new(),
            popularity: 0.0,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 0.0,
            vote_count: 0,
            genre_ids: Vec::new(),
            original_language: String::new(),
            adult: false,
            runtime: None,
            status: None,
            tagline: None,
        }
    }

    /// Full poster URL under the given image base.
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| join_image_path(image_base, path))
    }

    /// Full backdrop URL under the given image base.
    pub fn backdrop_url(&self, image_base: &str) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .map(|path| join_image_path(image_base, path))
    }

    /// Year of first release, if the date is present and well formed.
    pub fn release_year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .and_then(|year| year.parse().ok())
    }

    /// Copy of this title carrying the detail-only fields of `details`.
    pub fn with_details(&self, details: &Media) -> Media {
        Media {
            runtime: details.runtime,
            status: details.status.clone(),
            tagline: details.tagline.clone(),
            ..self.clone()
        }
    }
}

fn join_image_path(image_base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        image_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaPage {
    pub page: u32,
    pub results: Vec<Media>,
    pub total_pages: u32,
    pub total_results: u32,
}

/// Genre as listed by `genre/{type}/list`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Resolves genre ids to names in order, skipping ids missing from `genres`.
pub fn genre_names(ids: &[u64], genres: &[Genre]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| genres.iter().find(|genre| genre.id == *id))
        .map(|genre| genre.name.clone())
        .collect()
}

/// Cast member from a title's credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cast {
    pub id: u64,
    pub name: String,
    pub original_name: String,
    pub character: String,
    pub credit_id: String,
    /// Absent in TV credits
    pub cast_id: Option<u64>,
    pub order: u32,
    pub gender: u8,
    pub known_for_department: String,
    pub popularity: f64,
    pub profile_path: Option<String>,
    pub adult: bool,
}

/// Formats a runtime in minutes as `"HH hr MM min"`.
pub fn readable_runtime(minutes: u32) -> String {
    let hours = minutes / 60;
    let remaining = minutes % 60;
    format!("{hours:02} hr {remaining:02} min")
}
