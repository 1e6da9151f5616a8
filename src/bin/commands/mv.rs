use super::utils::open_fetcher;
use dlsite_org::{code, Config, WorkFetcher};
use std::fs;
use std::path::Path;

/// Handle the mv command
pub async fn handle_mv_command(
    config: &Config,
    file: &Path,
    code_arg: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let code = match code_arg {
        Some(text) => code::extract(text)?,
        None => {
            let name = file
                .file_name()
                .ok_or_else(|| format!("{} has no file name", file.display()))?;
            code::extract(&name.to_string_lossy())?
        }
    };

    let mut fetcher = open_fetcher(config)?;
    let work = fetcher.fetch_work(&code).await;
    fetcher.close()?;
    let work = work?;

    let destination = file.with_file_name(work.filename());
    if destination.exists() {
        return Err(format!("{} already exists", destination.display()).into());
    }
    log::info!("Renaming {} to {}", file.display(), destination.display());
    fs::rename(file, &destination)?;
    Ok(())
}
