//! Command-line front end.
//!
//! Each subcommand mounts one view, settles it, and renders it. On a
//! terminal the list views and the dashboard stay open and take single-key
//! commands.

mod render;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::{Key, Term};
use tracing::debug;

use resonance::config::load_settings;
use resonance::views::{CategorizedView, CommentsView, DashboardView, PageLimit, YearFilter};
use resonance::{ApiClient, Fetcher, Runtime};

#[derive(Parser)]
#[command(name = "resonance", version, about = "Browse precomputed comment analysis")]
pub struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, env = "RESONANCE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Page through every analysed comment
    Comments {
        /// Page size: 25, 50 or 100
        #[arg(short, long)]
        limit: Option<PageLimit>,
        /// Print the first page and exit
        #[arg(long)]
        once: bool,
    },
    /// Page through comments of one predicted category
    Categorized {
        /// Category to show; omit to pick one interactively
        category: Option<String>,
        /// Page size: 25, 50 or 100
        #[arg(short, long)]
        limit: Option<PageLimit>,
        /// Print the first page and exit
        #[arg(long)]
        once: bool,
    },
    /// List the known categories
    Categories,
    /// Sentiment and quality breakdowns with the yearly trend
    Dashboard {
        /// Year to filter by, or "all"
        #[arg(short, long, default_value = "all")]
        year: YearFilter,
        /// Print once and exit
        #[arg(long)]
        once: bool,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings().await;
    if let Some(ref api_url) = cli.api_url {
        settings.set_api_url(api_url)?;
    }
    debug!("Using backend at {}", settings.api_url);

    let fetcher: Arc<dyn Fetcher> = Arc::new(ApiClient::from_settings(&settings)?);
    let term = Term::stdout();

    match cli.command {
        Command::Comments { limit, once } => {
            let view = CommentsView::new(limit.unwrap_or(settings.default_limit));
            browse_comments(Runtime::new(view, fetcher), &term, !once && term.is_term()).await
        }
        Command::Categorized {
            category,
            limit,
            once,
        } => {
            let mut view = CategorizedView::new(limit.unwrap_or(settings.default_limit));
            if let Some(ref category) = category {
                view.select_category(category);
            }
            browse_categorized(Runtime::new(view, fetcher), &term, !once && term.is_term()).await
        }
        Command::Categories => {
            let mut runtime = Runtime::new(CategorizedView::default(), fetcher);
            runtime.settle().await;
            render::print(&term, &render::category_lines(runtime.view()))
        }
        Command::Dashboard { year, once } => {
            let view = DashboardView::with_year(year);
            browse_dashboard(Runtime::new(view, fetcher), &term, !once && term.is_term()).await
        }
    }
}

async fn read_key() -> Result<Key> {
    let key = tokio::task::spawn_blocking(|| Term::stdout().read_key()).await??;
    Ok(key)
}

async fn read_line(prompt: &str) -> Result<String> {
    let prompt = prompt.to_string();
    let line = tokio::task::spawn_blocking(move || {
        let term = Term::stdout();
        term.write_str(&prompt)?;
        term.read_line()
    })
    .await??;
    Ok(line.trim().to_string())
}

/// What a key press asks of a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagingCommand {
    Next,
    Previous,
    Limit(PageLimit),
    ChooseCategory,
    Quit,
}

fn paging_command(key: &Key) -> Option<PagingCommand> {
    match key {
        Key::Char('n') | Key::ArrowRight => Some(PagingCommand::Next),
        Key::Char('p') | Key::ArrowLeft => Some(PagingCommand::Previous),
        Key::Char('1') => Some(PagingCommand::Limit(PageLimit::Small)),
        Key::Char('2') => Some(PagingCommand::Limit(PageLimit::Medium)),
        Key::Char('3') => Some(PagingCommand::Limit(PageLimit::Large)),
        Key::Char('c') => Some(PagingCommand::ChooseCategory),
        Key::Char('q') | Key::Escape => Some(PagingCommand::Quit),
        _ => None,
    }
}

async fn browse_comments(
    mut runtime: Runtime<CommentsView>,
    term: &Term,
    interactive: bool,
) -> Result<()> {
    loop {
        runtime.settle().await;
        term.clear_screen().ok();
        render::print(term, &render::comments_lines(runtime.view()))?;
        if !interactive {
            return Ok(());
        }
        render::print(term, &[render::paging_help(false)])?;

        match paging_command(&read_key().await?) {
            Some(PagingCommand::Next) => {
                runtime.update(|view| view.go_to_next_page());
            }
            Some(PagingCommand::Previous) => {
                runtime.update(|view| view.go_to_previous_page());
            }
            Some(PagingCommand::Limit(limit)) => runtime.update(|view| view.set_limit(limit)),
            Some(PagingCommand::Quit) => return Ok(()),
            Some(PagingCommand::ChooseCategory) | None => {}
        }
    }
}

async fn browse_categorized(
    mut runtime: Runtime<CategorizedView>,
    term: &Term,
    interactive: bool,
) -> Result<()> {
    loop {
        runtime.settle().await;
        term.clear_screen().ok();
        render::print(term, &render::categorized_lines(runtime.view()))?;
        if !interactive {
            return Ok(());
        }
        render::print(term, &[render::paging_help(true)])?;

        match paging_command(&read_key().await?) {
            Some(PagingCommand::ChooseCategory) => {
                let name = read_line("Category (empty to clear): ").await?;
                runtime.update(|view| view.select_category(&name));
            }
            Some(PagingCommand::Next) => {
                runtime.update(|view| view.go_to_next_page());
            }
            Some(PagingCommand::Previous) => {
                runtime.update(|view| view.go_to_previous_page());
            }
            Some(PagingCommand::Limit(limit)) => runtime.update(|view| view.set_limit(limit)),
            Some(PagingCommand::Quit) => return Ok(()),
            None => {}
        }
    }
}

async fn browse_dashboard(
    mut runtime: Runtime<DashboardView>,
    term: &Term,
    interactive: bool,
) -> Result<()> {
    let options: Vec<YearFilter> = YearFilter::options().collect();
    loop {
        runtime.settle().await;
        term.clear_screen().ok();
        render::print(term, &render::dashboard_lines(runtime.view()))?;
        if !interactive {
            return Ok(());
        }
        render::print(term, &["[y] next year  [Y] previous year  [q] quit".to_string()])?;

        let current = options
            .iter()
            .position(|year| *year == runtime.view().year())
            .unwrap_or(0);
        match read_key().await? {
            Key::Char('y') | Key::ArrowRight => {
                let next = options[(current + 1) % options.len()];
                runtime.update(|view| view.set_year(next));
            }
            Key::Char('Y') | Key::ArrowLeft => {
                let previous = options[(current + options.len() - 1) % options.len()];
                runtime.update(|view| view.set_year(previous));
            }
            Key::Char('q') | Key::Escape => return Ok(()),
            _ => {}
        }
    }
}
