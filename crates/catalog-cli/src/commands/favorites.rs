use super::{movie_json, AppContext};
use crate::output::Output;
use crate::FavoritesCommands;
use catalog_core::{FavoritesState, FavoritesViewModel};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::json;

pub async fn run_favorites(ctx: &AppContext, cmd: FavoritesCommands, output: &Output) -> Result<()> {
    match cmd {
        FavoritesCommands::List => list_favorites(ctx, output).await,
        FavoritesCommands::Add { imdb_id } => {
            let added = ctx.favorites().add_favorite(&imdb_id).await?;
            if added {
                output.success(format!("Added {} to favorites", imdb_id));
            } else {
                output.info(format!("{} is already a favorite", imdb_id));
            }
            Ok(())
        }
        FavoritesCommands::Remove { imdb_id } => {
            let favorites = ctx.favorites();
            let was_favorite = favorites.is_favorite(&imdb_id).await?;
            favorites.remove_favorite(&imdb_id).await?;
            if was_favorite {
                output.success(format!("Removed {} from favorites", imdb_id));
            } else {
                output.info(format!("{} was not a favorite", imdb_id));
            }
            Ok(())
        }
        FavoritesCommands::Toggle { imdb_id } => {
            // Goes through the detail view so the id is checked against the catalog
            let vm = super::details::load_detail(ctx, &imdb_id).await?;
            let now_favorite = vm.toggle_favorite().await?;
            if now_favorite {
                output.success(format!("Added {} to favorites", imdb_id));
            } else {
                output.success(format!("Removed {} from favorites", imdb_id));
            }
            Ok(())
        }
    }
}

async fn list_favorites(ctx: &AppContext, output: &Output) -> Result<()> {
    let vm = FavoritesViewModel::new(ctx.catalog()?, ctx.favorites());
    vm.refresh().await;

    match vm.state() {
        FavoritesState::Loaded(movies) => {
            let data = json!({ "favorites": movies.iter().map(movie_json).collect::<Vec<_>>() });
            output.render(
                || {
                    let mut table = Table::new();
                    table.load_preset(comfy_table::presets::UTF8_FULL);
                    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                    table.set_header(vec![
                        Cell::new("IMDb ID").add_attribute(comfy_table::Attribute::Bold),
                        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
                        Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
                        Cell::new("Genre").add_attribute(comfy_table::Attribute::Bold),
                    ]);
                    for movie in &movies {
                        table.add_row(vec![
                            Cell::new(&movie.imdb_id),
                            Cell::new(&movie.title),
                            Cell::new(&movie.year),
                            Cell::new(&movie.genre),
                        ]);
                    }
                    println!("{}", table);
                },
                &data,
            );
            Ok(())
        }
        FavoritesState::Empty => {
            output.render(
                || println!("You have no favorites yet. Add one with 'moviecatalog favorites add <ID>'."),
                &json!({ "favorites": [] }),
            );
            Ok(())
        }
        FavoritesState::Error(message) => Err(eyre!("{}", message)),
        other => Err(eyre!("Unexpected favorites state: {:?}", other)),
    }
}
