use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use nostr_sdk::{Keys, Timestamp};
use tenex_feed::nostr::{
    load_keys, load_project, load_project_names, mime_type_for, project_live_filters,
    BlossomUploader, RelaySource, UploadManager, UploadRequest, UploadStatus,
};
use tenex_feed::store::{project_feed, thread_list, ProjectLookup, SharedEventStore};
use tenex_feed::virtual_list::VirtualList;
use tenex_feed::voice::VoiceProfileManager;
use tenex_feed::{EventStore, FeedConfig, ThreadQuery, TimeFilter};
use tokio::sync::watch;

use crate::render::{feed_line, print_json, thread_lines};

/// Password for NIP-49 encrypted credentials
const PASSWORD_ENV: &str = "TENEX_KEY_PASSWORD";

pub struct ThreadsArgs {
    pub project: String,
    pub filter: Option<String>,
    pub pubkey: Option<String>,
    pub scroll: u64,
    pub rows: u64,
    pub follow: bool,
}

pub enum VoiceCommand {
    Assign { pubkey: String, name: String },
    List,
    SetVoices { voices: Vec<String> },
    Override { pubkey: String, voice: String },
    ClearOverride { pubkey: String },
    Rule { pattern: String, voice: String },
}

fn signing_keys(config: &FeedConfig) -> Result<Option<Keys>> {
    let Some(credentials) = &config.credentials else {
        return Ok(None);
    };
    let password = std::env::var(PASSWORD_ENV).ok();
    let keys = load_keys(credentials, password.as_deref())
        .with_context(|| format!("Failed to load credentials (set {} for ncryptsec keys)", PASSWORD_ENV))?;
    Ok(Some(keys))
}

fn parse_filter(key: Option<&str>) -> Result<Option<TimeFilter>> {
    key.map(|key| {
        TimeFilter::parse(key).with_context(|| format!("Unknown time filter: {}", key))
    })
    .transpose()
}

async fn connect_and_load(
    config: &FeedConfig,
    keys: Option<Keys>,
    project: &str,
) -> Result<(RelaySource, SharedEventStore, ProjectLookup)> {
    let source = RelaySource::connect(&config.relays, keys).await?;
    let store = EventStore::shared();
    let stats = load_project(&source, &store, project, config.fetch_timeout()).await?;
    tracing::info!(threads = stats.threads, related = stats.related, "project loaded");
    let projects = load_project_names(&source, &[project], config.fetch_timeout()).await?;
    Ok((source, store, projects))
}

pub async fn threads(config: &FeedConfig, args: ThreadsArgs, json: bool) -> Result<()> {
    let filter = parse_filter(args.filter.as_deref())?;
    let keys = signing_keys(config)?;
    let current_user = args
        .pubkey
        .clone()
        .or_else(|| keys.as_ref().map(|k| k.public_key().to_hex()));

    let (source, store, projects) = connect_and_load(config, keys, &args.project).await?;

    let list_view = VirtualList::from_config(&config.list);
    let row_height = u64::from(list_view.row_height);
    let print = |store: &EventStore| -> Result<()> {
        let mut query = ThreadQuery::new(Timestamp::now().as_u64(), &projects)
            .project(&args.project)
            .filter(filter);
        if let Some(pubkey) = current_user.as_deref() {
            query = query.current_user(pubkey);
        }
        let list = thread_list(store, &query);
        if json {
            return print_json(&list);
        }
        let plan = list_view.plan(
            list.threads.len(),
            args.scroll * row_height,
            args.rows * row_height,
        );
        for line in thread_lines(&list, &plan) {
            println!("{}", line);
        }
        Ok(())
    };

    print(&store.read())?;

    if args.follow {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = cancel_tx.send(true);
            }
        });

        let filters = project_live_filters(&args.project, &store);
        let snapshot = store.clone();
        source
            .follow(filters, store, cancel_rx, |_event| {
                println!();
                if let Err(e) = print(&snapshot.read()) {
                    tracing::warn!(error = %e, "failed to print thread list");
                }
            })
            .await?;
    }

    source.disconnect().await;
    Ok(())
}

pub async fn feed(
    config: &FeedConfig,
    project: &str,
    group: bool,
    limit: usize,
    json: bool,
) -> Result<()> {
    let keys = signing_keys(config)?;
    let (source, store, _projects) = connect_and_load(config, keys, project).await?;
    source.disconnect().await;

    let mut items = project_feed(&store.read(), Some(project), group);
    items.truncate(limit);

    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("No activity yet");
    }
    for item in &items {
        println!("{}", feed_line(item));
    }
    Ok(())
}

pub async fn upload(config: &FeedConfig, files: Vec<PathBuf>, json: bool) -> Result<()> {
    let keys = signing_keys(config)?.context("Uploading requires credentials in the config file")?;
    let manager = UploadManager::new(
        BlossomUploader::new(config.blossom_server.clone(), keys),
        config.upload,
    );

    for path in &files {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        manager.enqueue(UploadRequest {
            data,
            mime_type: mime_type_for(path).to_string(),
            name: path.display().to_string(),
        });
    }

    let jobs = manager.wait_all().await;
    if json {
        print_json(&jobs)?;
    } else {
        for job in &jobs {
            match &job.status {
                UploadStatus::Completed { url } => println!("{}  {}", job.name, url),
                UploadStatus::Failed { error } => println!("{}  failed: {}", job.name, error),
                other => println!("{}  {:?}", job.name, other),
            }
        }
    }

    let failed = jobs
        .iter()
        .filter(|job| !matches!(job.status, UploadStatus::Completed { .. }))
        .count();
    if failed > 0 {
        bail!("{} of {} uploads failed", failed, jobs.len());
    }
    Ok(())
}

pub fn voice(config: &FeedConfig, command: VoiceCommand, json: bool) -> Result<()> {
    let mut manager = VoiceProfileManager::new(&config.data_dir);

    match command {
        VoiceCommand::Assign { pubkey, name } => {
            let assignment = manager.assign(&pubkey, &name);
            if json {
                return print_json(&assignment);
            }
            match assignment {
                Some(a) => println!("{} ({:?})", a.voice, a.source),
                None => println!("No voice available; add voices with `voice set-voices`"),
            }
        }
        VoiceCommand::List => {
            let profiles = manager.profiles();
            if json {
                return print_json(profiles);
            }
            println!("voices: {}", profiles.voices.join(", "));
            for (pubkey, voice) in &profiles.overrides {
                println!("override {} -> {}", pubkey, voice);
            }
            for rule in &profiles.rules {
                println!("rule \"{}\" -> {}", rule.pattern, rule.voice);
            }
        }
        VoiceCommand::SetVoices { voices } => manager.set_voices(voices)?,
        VoiceCommand::Override { pubkey, voice } => manager.set_override(&pubkey, &voice)?,
        VoiceCommand::ClearOverride { pubkey } => {
            if !manager.clear_override(&pubkey)? {
                println!("No override for {}", pubkey);
            }
        }
        VoiceCommand::Rule { pattern, voice } => manager.add_rule(&pattern, &voice)?,
    }
    Ok(())
}
