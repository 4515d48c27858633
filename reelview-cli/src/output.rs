//! Terminal rendering of screen states.

use anyhow::Result;
use reelview_core::domain::{Genre, Media, MediaType};
use reelview_core::state::details::DetailsState;
use serde::Serialize;

const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Billed cast members printed before the list is cut off.
const CAST_SHOWN: usize = 8;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One listing line: id, type, title with year and rating.
fn title_line(media: &Media) -> String {
    let year = media
        .release_year()
        .map_or_else(|| "----".to_string(), |year| year.to_string());
    format!(
        "{:>8}  {:<5}  {} ({year})  {:.1}",
        media.id,
        media.media_type.as_path(),
        media.title,
        media.vote_average
    )
}

pub fn print_titles(heading: &str, titles: &[Media]) {
    println!("{heading} ({} titles)", titles.len());
    println!("{}", "=".repeat(heading.len()));
    if titles.is_empty() {
        println!("Nothing found.");
        return;
    }
    for media in titles {
        println!("{}", title_line(media));
    }
}

pub fn print_details(state: &DetailsState, image_base: &str) {
    let Some(media) = &state.media else {
        return;
    };

    let heading = match media.release_year() {
        Some(year) => format!("{} ({year})", media.title),
        None => media.title.clone(),
    };
    println!("{heading}  [{}]", media.media_type);
    println!("{}", "=".repeat(heading.len()));

    if let Some(tagline) = media.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("\"{tagline}\"");
    }
    let mut facts = vec![format!(
        "Rating: {:.1} ({} votes)",
        media.vote_average, media.vote_count
    )];
    if !state.readable_time.is_empty() {
        facts.push(format!("Runtime: {}", state.readable_time));
    }
    if let Some(status) = &media.status {
        facts.push(format!("Status: {status}"));
    }
    println!("{}", facts.join("  |  "));

    let genres = state.genre_names();
    if !genres.is_empty() {
        println!("Genres: {}", genres.join(", "));
    }
    if !media.overview.is_empty() {
        println!();
        println!("{}", media.overview);
    }
    if let Some(poster) = media.poster_url(image_base) {
        println!();
        println!("Poster: {poster}");
    }

    if !state.cast_list.is_empty() {
        println!();
        println!("Cast:");
        for member in state.cast_list.iter().take(CAST_SHOWN) {
            println!("  {} as {}", member.name, member.character);
        }
    }
    if !state.small_similar_list.is_empty() {
        println!();
        println!(
            "Similar ({} of {}):",
            state.small_similar_list.len(),
            state.similar_list.len()
        );
        for similar in &state.small_similar_list {
            println!("{}", title_line(similar));
        }
    }
    println!();
    println!("Videos: {}", state.videos_list.len());

    let errors = &state.errors;
    for (what, error) in [
        ("similar titles", &errors.similar),
        ("videos", &errors.videos),
        ("cast", &errors.cast),
    ] {
        if let Some(message) = error {
            eprintln!("warning: {what} failed to load: {message}");
        }
    }
}

/// Link to the video picked for playback.
fn watch_link(video_id: &str) -> Option<String> {
    (!video_id.is_empty()).then(|| format!("{YOUTUBE_WATCH_URL}{video_id}"))
}

pub fn print_watch_link(state: &DetailsState) {
    match watch_link(&state.video_id) {
        Some(link) => println!("Watch: {link}"),
        None => println!("No videos to watch."),
    }
}

pub fn print_genres(media_type: MediaType, genres: &[Genre]) {
    let heading = match media_type {
        MediaType::Movie => "Movie genres",
        MediaType::Tv => "TV genres",
    };
    println!("{heading}");
    for genre in genres {
        println!("{:>8}  {}", genre.id, genre.name);
    }
}
