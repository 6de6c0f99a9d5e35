use super::{movie_json, review_json, stars, AppContext};
use crate::output::Output;
use catalog_core::{DetailState, DetailViewModel, MovieDetail};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_details(ctx: &AppContext, imdb_id: &str, output: &Output) -> Result<()> {
    let vm = load_detail(ctx, imdb_id).await?;
    if let Some(detail) = vm.state().detail() {
        output.render(|| print_detail(detail), &detail_json(detail));
    }
    Ok(())
}

/// Detail view-model with `imdb_id` loaded, or the error state as a report.
pub(crate) async fn load_detail(ctx: &AppContext, imdb_id: &str) -> Result<DetailViewModel> {
    let vm = DetailViewModel::new(ctx.catalog()?, ctx.favorites(), ctx.reviews());
    vm.load(imdb_id).await;

    match vm.state() {
        DetailState::Loaded(_) => Ok(vm),
        DetailState::Error(message) => Err(eyre!("{} ({})", message, imdb_id)),
        other => Err(eyre!("Unexpected detail state for {}: {:?}", imdb_id, other)),
    }
}

pub(crate) fn print_detail(detail: &MovieDetail) {
    let movie = &detail.movie;
    let heart = if detail.is_favorite { " ♥" } else { "" };

    println!();
    println!("{} ({}){}", movie.title.bright_cyan().bold(), movie.year, heart.red());
    println!("{}", movie.imdb_id.dimmed());
    println!();

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.add_row(vec![Cell::new("Genre").add_attribute(comfy_table::Attribute::Bold), Cell::new(&movie.genre)]);
    table.add_row(vec![Cell::new("Director").add_attribute(comfy_table::Attribute::Bold), Cell::new(&movie.director)]);
    table.add_row(vec![
        Cell::new("Actors").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(if movie.actors.is_empty() { "-".to_string() } else { movie.actors.join(", ") }),
    ]);
    table.add_row(vec![Cell::new("Plot").add_attribute(comfy_table::Attribute::Bold), Cell::new(&movie.plot)]);
    table.add_row(vec![
        Cell::new("Poster").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(movie.poster.url().unwrap_or("<not available>")),
    ]);
    println!("{}", table);
    println!();

    if detail.reviews.is_empty() {
        println!("No reviews yet.");
        return;
    }

    println!(
        "{} {:.1} from {} review(s)",
        stars(detail.average_rating).yellow(),
        detail.average_rating,
        detail.reviews.len()
    );
    for review in &detail.reviews {
        println!();
        println!(
            "  {} {} {}",
            stars(f64::from(review.rating)).yellow(),
            review.name.bold(),
            review.date.format("%Y-%m-%d").to_string().dimmed()
        );
        println!("  {}", review.message);
    }
}

pub(crate) fn detail_json(detail: &MovieDetail) -> serde_json::Value {
    json!({
        "movie": movie_json(&detail.movie),
        "is_favorite": detail.is_favorite,
        "average_rating": detail.average_rating,
        "reviews": detail.reviews.iter().map(review_json).collect::<Vec<_>>(),
    })
}
