use super::{review_json, stars, AppContext};
use crate::output::Output;
use crate::ReviewCommands;
use catalog_core::{average_rating, DetailError, ReviewDraft};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_review(ctx: &AppContext, cmd: ReviewCommands, output: &Output) -> Result<()> {
    match cmd {
        ReviewCommands::Add { imdb_id, name, message, rating } => {
            let draft = ReviewDraft::new(name, message, rating);
            // Reject bad input before touching the network
            draft.validate().map_err(|e| eyre!("Review not saved: {}", e))?;

            let vm = super::details::load_detail(ctx, &imdb_id).await?;
            match vm.submit_review(draft).await {
                Ok(()) => {}
                Err(DetailError::InvalidReview(rejection)) => {
                    return Err(eyre!("Review not saved: {}", rejection));
                }
                Err(e) => return Err(e.into()),
            }

            let state = vm.state();
            let count = state.detail().map(|d| d.reviews.len()).unwrap_or_default();
            let average = state.detail().map(|d| d.average_rating).unwrap_or_default();
            output.success(format!(
                "Review saved for {} ({} review(s), average {:.1})",
                imdb_id, count, average
            ));
            Ok(())
        }
        ReviewCommands::List { imdb_id } => {
            let reviews = ctx.reviews().get_reviews(&imdb_id).await?;
            let average = average_rating(&reviews);

            let data = json!({
                "imdb_id": imdb_id,
                "average_rating": average,
                "reviews": reviews.iter().map(review_json).collect::<Vec<_>>(),
            });
            output.render(
                || {
                    if reviews.is_empty() {
                        println!("No reviews for {} yet.", imdb_id);
                        return;
                    }
                    println!("{} {:.1} average for {}", stars(average).yellow(), average, imdb_id);
                    for review in &reviews {
                        println!();
                        println!(
                            "  {} {} {}",
                            stars(f64::from(review.rating)).yellow(),
                            review.name.bold(),
                            review.date.format("%Y-%m-%d").to_string().dimmed()
                        );
                        println!("  {}", review.message);
                    }
                },
                &data,
            );
            Ok(())
        }
    }
}
