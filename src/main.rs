// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use jobcrawlrs::config::settings::{FetcherEngine, PatternBackendKind, Settings};
use jobcrawlrs::domain::models::scrape_request::ScrapeRequest;
use jobcrawlrs::domain::repositories::pattern_repository::PatternBackend;
use jobcrawlrs::domain::services::pattern_inference::{NoopInference, PatternInference};
use jobcrawlrs::domain::services::pattern_learner::{LearnOptions, PatternLearner};
use jobcrawlrs::engines::playwright_engine::BrowserFetcher;
use jobcrawlrs::engines::reqwest_engine::HttpFetcher;
use jobcrawlrs::engines::traits::PageFetcher;
use jobcrawlrs::infrastructure::cache::file_backend::FilePatternBackend;
use jobcrawlrs::infrastructure::cache::memory_backend::MemoryPatternBackend;
use jobcrawlrs::infrastructure::cache::pattern_store::PatternStore;
use jobcrawlrs::infrastructure::cache::redis_client::RedisPatternBackend;
use jobcrawlrs::infrastructure::inference::llm_pattern_inference::LlmPatternInference;
use jobcrawlrs::infrastructure::liveness::link_checker::{LinkChecker, LivenessOptions, ReqwestLinkProbe};
use jobcrawlrs::infrastructure::metrics;
use jobcrawlrs::infrastructure::sites::aggregator::{AggregateOptions, CrawlAggregator};
use jobcrawlrs::infrastructure::sites::factory::SiteAdapterFactory;
use jobcrawlrs::infrastructure::sites::site_crawler::{CrawlOptions, JobSource, SiteCrawler};
use jobcrawlrs::utils::telemetry;

#[derive(Parser)]
#[command(name = "jobcrawlrs")]
#[command(about = "Adaptive job-posting crawler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl job sites and print jobs as JSON lines
    Crawl {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        employment_type: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        experience_min: Option<i64>,
        #[arg(long)]
        experience_max: Option<i64>,
        /// Annual salary lower bound in 10k KRW
        #[arg(long)]
        salary_min: Option<i64>,
        #[arg(long)]
        salary_max: Option<i64>,
        #[arg(long)]
        limit: Option<usize>,
        /// Site ids to crawl (defaults to the configured list)
        #[arg(long = "site")]
        sites: Vec<String>,
        /// Check detail links after crawling
        #[arg(long)]
        check_links: bool,
        /// Only check the first N links
        #[arg(long)]
        sample: Option<usize>,
    },

    /// Learn and save the pattern of a site page
    Learn {
        url: String,
        /// Domain of the detail pages when it differs from the page's own host
        #[arg(long)]
        detail_domain: Option<String>,
    },

    /// Inspect the pattern cache
    Patterns {
        #[command(subcommand)]
        command: PatternCommands,
    },
}

#[derive(Subcommand)]
enum PatternCommands {
    /// List cached domains
    List,
    /// Print a cached pattern
    Show { domain: String },
    /// Delete a cached pattern
    Delete { domain: String },
    /// Report whether a cached pattern is fresh
    Fresh {
        domain: String,
        #[arg(long)]
        max_age_days: Option<i64>,
    },
}

/// 主函数
///
/// 加载配置、初始化日志与指标，然后执行子命令
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new().context("failed to load configuration")?;

    telemetry::init_telemetry(settings.telemetry.json);
    metrics::init_metrics(settings.telemetry.metrics_addr.as_deref());

    match cli.command {
        Commands::Crawl {
            keyword,
            location,
            employment_type,
            industry,
            experience_min,
            experience_max,
            salary_min,
            salary_max,
            limit,
            sites,
            check_links,
            sample,
        } => {
            let mut request = ScrapeRequest::new()
                .experience(experience_min, experience_max)
                .salary(salary_min, salary_max)
                .limit(limit.unwrap_or(settings.crawl.default_limit));
            request.keyword = keyword;
            request.location = location;
            request.employment_type = employment_type;
            request.industry = industry;

            run_crawl(&settings, &request, sites, check_links, sample).await
        }
        Commands::Learn { url, detail_domain } => {
            let store = build_store(&settings)?;
            let learner = build_learner(&settings, build_fetcher(&settings)?);
            let options = LearnOptions {
                timeout: settings.fetcher.timeout(),
                headless: settings.fetcher.headless,
                detail_domain,
            };
            let pattern = learner.learn(&url, &options).await?;
            store.save(&pattern).await?;
            println!("{}", serde_json::to_string_pretty(&pattern)?);
            Ok(())
        }
        Commands::Patterns { command } => run_patterns(&settings, command).await,
    }
}

async fn run_crawl(
    settings: &Settings,
    request: &ScrapeRequest,
    sites: Vec<String>,
    check_links: bool,
    sample: Option<usize>,
) -> Result<()> {
    let store = build_store(settings)?;
    let fetcher = build_fetcher(settings)?;
    let learner = Arc::new(build_learner(settings, fetcher.clone()));
    let crawl_options = CrawlOptions {
        fetch_timeout: settings.fetcher.timeout(),
        wait_timeout: settings.fetcher.wait_timeout(),
        headless: settings.fetcher.headless,
        user_agent: settings.fetcher.user_agent.clone(),
        fresh_days: settings.pattern_store.fresh_days,
    };

    let sites = if sites.is_empty() {
        settings.crawl.sites.clone()
    } else {
        sites
    };
    let mut sources: Vec<Arc<dyn JobSource>> = Vec::new();
    for site in &sites {
        let Some(adapter) = SiteAdapterFactory::create(site) else {
            bail!("unknown site '{}'", site);
        };
        sources.push(Arc::new(
            SiteCrawler::new(adapter, fetcher.clone(), store.clone(), learner.clone())
                .with_options(crawl_options.clone()),
        ));
    }

    let aggregator = CrawlAggregator::new(sources).with_options(AggregateOptions {
        site_timeout: Duration::from_millis(settings.crawl.site_timeout_ms),
        ..AggregateOptions::default()
    });
    let result = aggregator.crawl_all(request, &[]).await;

    for job in &result.jobs {
        println!("{}", serde_json::to_string(job)?);
    }
    for (site, count) in &result.per_site_counts {
        info!("{}: {} jobs", site, count);
    }
    if let Some(report) = &result.report {
        info!(
            "Validation: {}/{} valid ({:.1}%), {} with warnings, {} duplicates removed",
            report.valid, report.total, report.success_rate, report.with_warnings, result.duplicate_count
        );
    }

    if check_links {
        let checker = LinkChecker::new(Arc::new(ReqwestLinkProbe::new()?));
        let options = LivenessOptions {
            concurrency: settings.liveness.concurrency,
            timeout_per_request: Duration::from_millis(settings.liveness.timeout_ms),
            politeness_delay: Duration::from_millis(settings.liveness.politeness_delay_ms),
            sample_size: sample.or(settings.liveness.sample_size),
        };
        let report = checker.validate_links_live(&result.jobs, &options).await;
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

async fn run_patterns(settings: &Settings, command: PatternCommands) -> Result<()> {
    let store = build_store(settings)?;
    match command {
        PatternCommands::List => {
            for domain in store.list_domains().await? {
                println!("{}", domain);
            }
        }
        PatternCommands::Show { domain } => match store.load(&domain).await? {
            Some(pattern) => println!("{}", serde_json::to_string_pretty(&pattern)?),
            None => bail!("no usable pattern for {}", domain),
        },
        PatternCommands::Delete { domain } => {
            store.delete(&domain).await?;
            info!("Deleted pattern for {}", domain);
        }
        PatternCommands::Fresh { domain, max_age_days } => {
            let days = max_age_days.unwrap_or(settings.pattern_store.fresh_days);
            println!("{}", store.is_fresh(&domain, days).await?);
        }
    }
    Ok(())
}

fn build_store(settings: &Settings) -> Result<Arc<PatternStore>> {
    let cfg = &settings.pattern_store;
    let backend: Arc<dyn PatternBackend> = match cfg.backend {
        PatternBackendKind::File => Arc::new(FilePatternBackend::new(PathBuf::from(&cfg.path))),
        PatternBackendKind::Memory => Arc::new(MemoryPatternBackend::new()),
        PatternBackendKind::Redis => Arc::new(RedisPatternBackend::new(&cfg.redis_url, cfg.key_prefix.clone())?),
    };
    Ok(Arc::new(PatternStore::with_ttl_days(backend, cfg.ttl_days)))
}

fn build_fetcher(settings: &Settings) -> Result<Arc<dyn PageFetcher>> {
    Ok(match settings.fetcher.engine {
        FetcherEngine::Http => Arc::new(HttpFetcher::new()?),
        FetcherEngine::Browser => Arc::new(BrowserFetcher),
    })
}

fn build_learner(settings: &Settings, fetcher: Arc<dyn PageFetcher>) -> PatternLearner {
    let llm = &settings.llm;
    let inference: Arc<dyn PatternInference> = if llm.enabled {
        Arc::new(
            LlmPatternInference::new(llm.api_key.clone(), llm.model.clone(), llm.api_base_url.clone())
                .with_timeout(Duration::from_millis(llm.timeout_ms)),
        )
    } else {
        Arc::new(NoopInference)
    };

    PatternLearner::new(fetcher, inference)
        .with_min_id_digits(settings.learner.min_id_digits)
        .with_max_ai_samples(settings.learner.max_ai_samples)
        .with_user_agent(settings.fetcher.user_agent.clone())
}
