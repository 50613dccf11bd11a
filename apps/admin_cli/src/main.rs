use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    AdminClient, FetchOutcome, ListEvent, ListSource, LocalListController, RemoteListController,
};
use shared::{
    domain::{customer_path, Affiliate, Record, UserSummary},
    protocol::{CollectionSpec, Page},
    query::{filter_tag_for_tab, parse_sort_value, ListConfig, QueryState, ALL_TAB},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Browse affiliate and user records of the admin service")]
struct Cli {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    auth_token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List affiliate codes.
    Affiliates(ListArgs),
    /// List users.
    Users(ListArgs),
    /// Show one affiliate code and a page of the players who used it.
    Affiliate {
        code: String,
        #[command(flatten)]
        paging: PageArgs,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    /// Sort as `field|direction`, e.g. `last_login|desc`.
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, default_value = ALL_TAB)]
    tab: String,
    #[command(flatten)]
    paging: PageArgs,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    page: i64,
    #[arg(long)]
    per_page: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(token) = cli.auth_token {
        settings.auth_token = Some(token);
    }

    let mut client = AdminClient::new(reqwest::Client::new(), settings.base_url()?);
    if let Some(token) = &settings.auth_token {
        client = client.with_auth_token(token.clone());
    }
    info!(server = %client.base_url(), "using admin service");

    match cli.command {
        Command::Affiliates(args) => {
            let config = ListConfig::affiliates().with_default_page_size(settings.page_size);
            let page = load_remote_page::<Affiliate>(
                Arc::new(client.list_source(CollectionSpec::affiliates())),
                config,
                &args,
            )
            .await?;
            print_affiliates(&page);
        }
        Command::Users(args) => {
            let config = ListConfig::users().with_default_page_size(settings.page_size);
            let page = load_remote_page::<UserSummary>(
                Arc::new(client.list_source(CollectionSpec::users())),
                config,
                &args,
            )
            .await?;
            print_users(&page);
        }
        Command::Affiliate { code, paging } => {
            let affiliate = client
                .fetch_affiliate(&code)
                .await
                .with_context(|| format!("failed to load affiliate {code}"))?;
            print_affiliate_details(&affiliate);

            let config = ListConfig::affiliates().with_default_page_size(settings.page_size);
            let mut uses = LocalListController::new(affiliate.people_used.clone(), config);
            if let Some(per_page) = paging.per_page {
                uses.set_page_size(per_page)?;
            }
            uses.set_page_index(paging.page - 1)?;
            print_uses(&uses);
        }
    }

    Ok(())
}

async fn load_remote_page<R>(
    source: Arc<dyn ListSource<R>>,
    config: ListConfig,
    args: &ListArgs,
) -> Result<PageView<R>>
where
    R: Record + Clone + Send + Sync + 'static,
{
    let mut query = QueryState::new(&config);
    if let Some(search) = &args.search {
        query.set_search_text(search.clone());
    }
    if let Some(sort) = &args.sort {
        let (key, direction) = parse_sort_value(sort)?;
        query.set_sort(&config, &key, direction)?;
    }
    query.set_filter_tag(filter_tag_for_tab(&args.tab));
    if let Some(per_page) = args.paging.per_page {
        query.set_page_size(per_page)?;
    }
    query.set_page_index(args.paging.page - 1)?;

    let controller = RemoteListController::new_with_query(source, config, query);
    let mut events = controller.subscribe_events();
    let outcome = controller
        .refresh()
        .await
        .await
        .context("list fetch task panicked")?;

    match outcome {
        FetchOutcome::Settled => {
            let snapshot = controller.snapshot().await;
            Ok(PageView {
                query: snapshot.query,
                page: snapshot.page,
            })
        }
        FetchOutcome::Failed => match events.recv().await {
            Ok(ListEvent::FetchFailed { message, .. }) => bail!("list fetch failed: {message}"),
            _ => bail!("list fetch failed"),
        },
        FetchOutcome::StaleDiscarded | FetchOutcome::Detached => {
            bail!("list fetch was superseded before it completed")
        }
    }
}

struct PageView<R> {
    query: QueryState,
    page: Page<R>,
}

impl<R> PageView<R> {
    fn footer(&self) -> String {
        format!(
            "page {} of {} ({} total, {} per page)",
            self.query.page_index() + 1,
            self.query.page_count(self.page.total_count).max(1),
            self.page.total_count,
            self.query.page_size()
        )
    }
}

fn print_affiliates(view: &PageView<Affiliate>) {
    println!(
        "{:<16} {:>16} {:>16} {:>6}  LINK",
        "CODE", "TOTAL DEPOSITED", "TOTAL DEPOSITORS", "USES"
    );
    for affiliate in &view.page.items {
        println!(
            "{:<16} {:>16} {:>16} {:>6}  {}",
            affiliate.code,
            affiliate.total_deposited_display(),
            affiliate.total_depositors,
            affiliate.uses(),
            affiliate.detail_path()
        );
    }
    println!("{}", view.footer());
}

fn print_users(view: &PageView<UserSummary>) {
    println!("{:<8} {:<24} {:>5}  LAST LOGIN", "ID", "NAME", "ROLE");
    for user in &view.page.items {
        let last_login = user
            .last_login
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<24} {:>5}  {}",
            user.id.0, user.name, user.role, last_login
        );
    }
    println!("{}", view.footer());
}

fn print_affiliate_details(affiliate: &Affiliate) {
    println!("Player Info");
    println!("  Code              {}", affiliate.code);
    println!("  Total Deposited   {}", affiliate.total_deposited);
    println!("  Uses              {}", affiliate.uses());
    println!("  Total Depositors  {}", affiliate.total_depositors);
}

fn print_uses(uses: &LocalListController<String>) {
    println!();
    println!("Code Users");
    for steam_id in &uses.page().items {
        println!("  SteamID  {steam_id}  {}", customer_path(steam_id));
    }
    let query = uses.query();
    println!(
        "page {} of {} ({} total)",
        query.page_index() + 1,
        query.page_count(uses.page().total_count).max(1),
        uses.page().total_count
    );
}
