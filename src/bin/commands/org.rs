use super::utils::open_fetcher;
use dlsite_org::{org, Config, OrganizeOptions};
use std::path::Path;

/// Handle the org command
pub async fn handle_org_command(
    config: &Config,
    root: &Path,
    options: OrganizeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut fetcher = open_fetcher(config)?;
    let result = org::organize(&mut fetcher, root, options).await;
    fetcher.close()?;

    let renames = result?;
    log::info!("{} works to rename", renames.len());
    Ok(())
}
