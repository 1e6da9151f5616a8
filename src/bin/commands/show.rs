use super::utils::open_fetcher;
use dlsite_org::{Config, ProductCode, Work, WorkFetcher};

/// Handle the show command
pub async fn handle_show_command(
    config: &Config,
    code: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let code: ProductCode = code.parse()?;

    let mut fetcher = open_fetcher(config)?;
    let work = fetcher.fetch_work(&code).await;
    fetcher.close()?;
    let work = work?;

    if json {
        println!("{}", serde_json::to_string_pretty(&work)?);
    } else {
        print_work(&work);
    }
    Ok(())
}

fn print_work(work: &Work) {
    println!("{work}");
    println!("  Path: {}", work.path().display());
    if let Some(series) = &work.series {
        println!("  Series: {series}");
    }
    if let Some(age) = &work.age {
        println!("  Age: {age:?}");
    }
    if let Some(genres) = &work.genres {
        println!("  Genres: {}", genres.join(", "));
    }
    if let Some(tracklist) = &work.tracklist {
        println!("  Tracks:");
        for track in tracklist {
            println!("    {track}");
        }
    }
    for image in &work.images {
        println!("  Image: {image}");
    }
    if let Some(description) = &work.description {
        println!();
        println!("{}", description.trim_end());
    }
}
