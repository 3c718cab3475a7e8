use crate::client::{clamp_pages, SearchcodeClient};
use crate::config;
use crate::license;
use crate::logging;
use crate::render::Renderer;
use crate::types::SearchRequest;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "sc")]
#[command(about = "Searchcode: simple, comprehensive code search")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query the code index (paginated, or single-shot JSONP)
    ///
    /// e.g., sc search "import module"
    Search(SearchArgs),
    /// Get the raw data from a code file
    ///
    /// e.g., sc code 4061576
    Code {
        /// Code id, as found in the `id` field of a search result
        id: u64,
    },
    /// Show results the index considers duplicates of a code file
    Related {
        id: u64,
    },
    /// Show license information
    License {
        /// License terms and conditions
        #[arg(long, conflicts_with = "warranty")]
        conditions: bool,
        /// License warranty
        #[arg(long)]
        warranty: bool,
    },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search term; textual filters like `ext:erb` or `repo:quake` may be embedded
    pub query: String,

    /// Start page number
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Number of pages to fetch (maximum 5). Ignored if --callback is set.
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Results per page (maximum 100)
    #[arg(long, default_value_t = 50)]
    pub per_page: u32,

    /// Filter to sources with fewer lines of code (0 to 10000)
    #[arg(long)]
    pub lines_of_code_lt: Option<u32>,

    /// Filter to sources with more lines of code (0 to 10000)
    #[arg(long)]
    pub lines_of_code_gt: Option<u32>,

    /// Comma-separated list of language filters
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Comma-separated list of source filters
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Callback function for JSONP output (disables pagination)
    #[arg(long)]
    pub callback: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub pretty: bool,
}

impl SearchArgs {
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            query: self.query.clone(),
            page: self.page,
            per_page: self.per_page,
            languages: non_empty(&self.languages),
            sources: non_empty(&self.sources),
            lines_of_code_gt: self.lines_of_code_gt,
            lines_of_code_lt: self.lines_of_code_lt,
            callback: self.callback.clone(),
        }
    }
}

fn non_empty(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse arguments and run the selected command
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    let _log_guard = logging::init(&config, cli.verbose)?;

    let mut renderer = Renderer::stdout();

    match cli.command {
        Commands::Search(args) => search_command(&make_client(&config)?, &mut renderer, &args).await,
        Commands::Code { id } => code_command(&make_client(&config)?, &mut renderer, id).await,
        Commands::Related { id } => related_command(&make_client(&config)?, &mut renderer, id).await,
        Commands::License {
            conditions,
            warranty,
        } => license_command(&mut renderer, conditions, warranty),
    }
}

fn make_client(config: &config::Config) -> Result<SearchcodeClient> {
    let client = SearchcodeClient::from_config(config).context("Failed to create searchcode client")?;
    tracing::debug!(base_url = %client.base_url(), user_agent = %client.user_agent(), "client ready");
    Ok(client)
}

async fn search_command<W: Write>(
    client: &SearchcodeClient,
    renderer: &mut Renderer<W>,
    args: &SearchArgs,
) -> Result<()> {
    renderer.clear_screen()?;
    renderer.set_title(&args.query)?;

    let request = args.to_request();
    let spinner = spinner(format!("Querying code index with {}...", args.query));

    if request.is_jsonp() {
        let outcome = client.search(&request).await;
        spinner.finish_and_clear();
        if let Some(jsonp) = outcome?.into_jsonp() {
            renderer.print_jsonp(&jsonp)?;
        }
        return Ok(());
    }

    let pages = clamp_pages(args.pages);
    let paged = client
        .search_pages_with_progress(&request, pages, |progress| {
            spinner.set_message(format!(
                "Getting page results on page {} of {} ({} results collected)...",
                progress.iteration, progress.pages, progress.collected
            ));
        })
        .await;
    spinner.finish_and_clear();
    let paged = paged?;

    if paged.results.is_empty() {
        renderer.print_no_results(&args.query)?;
    } else if args.pretty {
        renderer.print_pretty(&paged.results)?;
    } else {
        renderer.print_summary(paged.results.len(), paged.total, &args.query)?;
        renderer.print_results(&paged.results)?;
    }
    Ok(())
}

async fn code_command<W: Write>(client: &SearchcodeClient, renderer: &mut Renderer<W>, id: u64) -> Result<()> {
    renderer.clear_screen()?;
    renderer.set_title(&id.to_string())?;

    let spinner = spinner(format!("Getting code file {id}..."));
    let record = client.code_result(id).await;
    spinner.finish_and_clear();

    renderer.print_code(&record?, id)?;
    Ok(())
}

async fn related_command<W: Write>(client: &SearchcodeClient, renderer: &mut Renderer<W>, id: u64) -> Result<()> {
    renderer.clear_screen()?;
    renderer.set_title(&format!("related to {id}"))?;

    let spinner = spinner(format!("Getting results related to {id}..."));
    let related = client.related_results(id).await;
    spinner.finish_and_clear();
    let related = related?;

    if related.is_empty() {
        renderer.print_no_results(&format!("related to {id}"))?;
    } else {
        renderer.print_results(&related)?;
    }
    Ok(())
}

fn license_command<W: Write>(renderer: &mut Renderer<W>, conditions: bool, warranty: bool) -> Result<()> {
    renderer.clear_screen()?;
    let (title, text) = if conditions {
        ("Terms and Conditions", license::TERMS_AND_CONDITIONS)
    } else if warranty {
        ("Warranty", license::WARRANTY)
    } else {
        ("License", license::NOTICE)
    };
    renderer.set_title(title)?;
    renderer.print_centered(text)?;
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
