use super::{movie_json, stars, AppContext};
use crate::output::Output;
use catalog_core::{SearchOptions, SearchState, SearchStatus, SearchViewModel};
use catalog_models::Movie;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::time::Duration;

struct Row {
    movie: Movie,
    favorite: bool,
    average: f64,
    review_count: usize,
}

pub async fn run_search(
    ctx: &AppContext,
    term: Option<String>,
    year: Option<String>,
    genre: Option<String>,
    pages: u32,
    output: &Output,
) -> Result<()> {
    let catalog = ctx.catalog()?;
    let vm = SearchViewModel::new(catalog, SearchOptions::from(&ctx.config.search));

    vm.set_term(term.unwrap_or_default());
    vm.set_year(year);
    vm.set_genre(genre);

    let spinner = spinner(output);
    vm.search_now().await;
    let mut loaded = 1;
    while loaded < pages && vm.load_more().await {
        loaded += 1;
        spinner.set_message(format!("Loaded page {}", loaded));
    }
    spinner.finish_and_clear();

    let state = vm.state();
    tracing::info!(
        "Search for {:?} finished with {} movies over {} pages",
        state.input.term,
        state.movies.len(),
        state.page
    );

    match &state.status {
        SearchStatus::Error(message) => {
            return Err(color_eyre::eyre::eyre!("{}", message));
        }
        SearchStatus::Empty | SearchStatus::Idle | SearchStatus::Searching => {
            output.render(
                || println!("No movies found."),
                &results_json(&state, &[]),
            );
            return Ok(());
        }
        SearchStatus::Results => {}
    }

    let rows = annotate(ctx, &state.movies).await?;
    output.render(|| print_table(&state, &rows), &results_json(&state, &rows));
    Ok(())
}

/// Favorite flag and review summary for each result.
async fn annotate(ctx: &AppContext, movies: &[Movie]) -> Result<Vec<Row>> {
    let favorites = ctx.favorites().list_favorites().await?;
    let reviews = ctx.reviews();

    let mut rows = Vec::with_capacity(movies.len());
    for movie in movies {
        let list = reviews.get_reviews(&movie.imdb_id).await?;
        rows.push(Row {
            favorite: favorites.contains(&movie.imdb_id),
            average: catalog_core::average_rating(&list),
            review_count: list.len(),
            movie: movie.clone(),
        });
    }
    Ok(rows)
}

fn spinner(output: &Output) -> ProgressBar {
    if !output.is_human() || output.is_quiet() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Searching...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_table(state: &SearchState, rows: &[Row]) {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("IMDb ID").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Genre").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Reviews").add_attribute(comfy_table::Attribute::Bold),
    ]);

    for row in rows {
        let reviews = if row.review_count == 0 {
            "-".to_string()
        } else {
            format!("{} ({})", stars(row.average), row.review_count)
        };
        table.add_row(vec![
            Cell::new(if row.favorite { "♥" } else { "" }),
            Cell::new(&row.movie.imdb_id),
            Cell::new(&row.movie.title),
            Cell::new(&row.movie.year),
            Cell::new(&row.movie.genre),
            Cell::new(reviews),
        ]);
    }

    println!("{}", table);
    let term = if state.input.term.trim().is_empty() {
        "(default)"
    } else {
        state.input.term.as_str()
    };
    println!(
        "{} movies for {} across {} page(s){}",
        rows.len(),
        term,
        state.page,
        if state.has_more { ", more available with --pages" } else { "" }
    );
}

fn results_json(state: &SearchState, rows: &[Row]) -> serde_json::Value {
    let movies: Vec<_> = rows
        .iter()
        .map(|row| {
            let mut value = movie_json(&row.movie);
            value["is_favorite"] = json!(row.favorite);
            value["average_rating"] = json!(row.average);
            value["review_count"] = json!(row.review_count);
            value
        })
        .collect();

    json!({
        "term": state.input.term,
        "year": state.input.year,
        "genre": state.input.genre,
        "page": state.page,
        "has_more": state.has_more,
        "movies": movies,
    })
}
