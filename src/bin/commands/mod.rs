pub mod list;
pub mod mv;
pub mod org;
pub mod show;
pub mod utils;

use clap::Subcommand;
use dlsite_org::{Config, OrganizeOptions};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Organize work directories
    ///
    /// Every directory whose name contains a product code is moved to
    /// MAKER/[SERIES/]CODE TITLE below the root. Directories left empty are
    /// removed afterwards.
    ///
    /// Usage examples:
    /// # Show what would be renamed in the current directory
    /// dlsite-org org --dry-run
    ///
    /// # Organize a whole library, including nested works
    /// dlsite-org org ~/dlsite --all
    ///
    /// # Also write description and tracklist files into each work
    /// dlsite-org org ~/dlsite --all --add-descriptions
    Org {
        /// Library root (defaults to the current directory)
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Log the renames without applying them
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Also organize works below the top level
        #[arg(short, long)]
        all: bool,

        /// Write description and tracklist files into each work
        #[arg(short = 'd', long)]
        add_descriptions: bool,
    },

    /// Print the product code of each input line
    ///
    /// Lines are read from stdin; lines without a code are skipped. Unless
    /// --no-info is given, the work filename is printed instead of the code.
    ///
    /// Usage examples:
    /// ls ~/downloads | dlsite-org list
    List {
        /// Do not fetch info; print the product code only
        #[arg(long)]
        no_info: bool,
    },

    /// Rename a file or directory to its work filename
    ///
    /// Usage examples:
    /// dlsite-org mv RJ123456.zip
    /// dlsite-org mv "some download" RJ123456
    Mv {
        /// File or directory to rename
        file: PathBuf,

        /// Product code (taken from the file name if omitted)
        code: Option<String>,
    },

    /// Show the metadata of a work
    Show {
        /// Product code of the work
        code: String,

        /// Print the work as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn execute_command(
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Org {
            root,
            dry_run,
            all,
            add_descriptions,
        } => {
            let options = OrganizeOptions {
                recursive: all,
                dry_run,
                add_descriptions,
            };
            org::handle_org_command(config, &root, options).await
        }

        Commands::List { no_info } => list::handle_list_command(config, no_info).await,

        Commands::Mv { file, code } => mv::handle_mv_command(config, &file, code.as_deref()).await,

        Commands::Show { code, json } => show::handle_show_command(config, &code, json).await,
    }
}
