use super::utils::open_fetcher;
use dlsite_org::{code, Config, WorkFetcher};
use std::io::{self, BufRead};

/// Handle the list command
pub async fn handle_list_command(
    config: &Config,
    no_info: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let codes = io::stdin()
        .lock()
        .lines()
        .filter_map(|line| match line {
            Ok(line) => code::extract(&line).ok().map(Ok),
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if no_info {
        for code in &codes {
            println!("{code}");
        }
        return Ok(());
    }

    let mut fetcher = open_fetcher(config)?;
    let mut result = Ok(());
    for code in &codes {
        match fetcher.fetch_work(code).await {
            Ok(work) => println!("{}", work.filename()),
            Err(e) => {
                result = Err(e.into());
                break;
            }
        }
    }
    fetcher.close()?;
    result
}
