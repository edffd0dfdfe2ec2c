// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use repolink::{
    config::Settings,
    mover,
    remote::{clone_remote, find_remotes},
    store::{FileSystem, JsonFile, Persistence, PruneReport, Store},
    Group, Repository,
};

use anyhow::{anyhow, bail, Error, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use indicatif::{MultiProgress, ProgressBar};
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "repolink [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to settings file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        let ctx = Context::open(self.config)?;
        match self.command {
            Command::Add(opts) => run_add(&ctx, opts),
            Command::Clone(opts) => run_clone(&ctx, opts).await,
            Command::Rm(opts) => run_remove(&ctx, opts),
            Command::Mv(opts) => run_move(&ctx, opts),
            Command::Prune(opts) => run_prune(&ctx, opts),
            Command::List(opts) => run_list(&ctx, opts),
            Command::Group(cmd) => run_group(&ctx, cmd),
            Command::Repository(cmd) => run_repository(&ctx, cmd),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Register existing working copies.
    #[command(override_usage = "repolink add [options] <path>...")]
    Add(AddOptions),

    /// Clone remote repositories and register them.
    #[command(override_usage = "repolink clone [options] <url>...")]
    Clone(CloneOptions),

    /// Remove groups, repositories, or relations.
    #[command(override_usage = "repolink rm [options] <target>...")]
    Rm(RemoveOptions),

    /// Move repositories between groups.
    #[command(override_usage = "repolink mv <from>... <to>")]
    Mv(MoveOptions),

    /// Remove stale repositories and empty groups.
    #[command(override_usage = "repolink prune [options]")]
    Prune(PruneOptions),

    /// List groups with their repositories.
    #[command(override_usage = "repolink list [group]...")]
    List(ListOptions),

    /// Manage groups.
    #[command(subcommand)]
    Group(GroupCommand),

    /// Manage repositories.
    #[command(subcommand)]
    Repository(RepositoryCommand),
}

#[derive(Debug, Clone, Subcommand)]
enum GroupCommand {
    /// Create new groups.
    Add(GroupAddOptions),

    /// Change attributes of a group.
    Update(GroupUpdateOptions),

    /// List groups.
    List,

    /// Remove groups.
    Rm(GroupRemoveOptions),
}

#[derive(Debug, Clone, Subcommand)]
enum RepositoryCommand {
    /// List repositories.
    List,

    /// Show details of repositories.
    Info(RepositoryInfoOptions),

    /// Change attributes of a repository.
    Update(RepositoryUpdateOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct AddOptions {
    /// Paths to working copies.
    #[arg(required = true, value_name = "path")]
    pub paths: Vec<PathBuf>,

    /// Groups to put repositories in.
    #[arg(short, long = "group", value_name = "group")]
    pub groups: Vec<String>,

    /// Repository id to use instead of the directory name.
    #[arg(long, value_name = "id")]
    pub id: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CloneOptions {
    /// URLs of remotes to clone from.
    #[arg(required = true, value_name = "url")]
    pub urls: Vec<String>,

    /// Groups to put repositories in.
    #[arg(short, long = "group", value_name = "group")]
    pub groups: Vec<String>,

    /// Directory to clone into.
    #[arg(short, long, value_name = "path")]
    pub destination: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RemoveOptions {
    /// Groups, repositories, or group/repository relations.
    #[arg(required = true, value_name = "target")]
    pub targets: Vec<String>,

    /// Remove groups even if they still have members.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct MoveOptions {
    /// Groups, repositories, or group/repository relations to move.
    #[arg(required = true, value_name = "from")]
    pub froms: Vec<String>,

    /// Destination group or group/repository.
    #[arg(value_name = "to")]
    pub to: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PruneOptions {
    /// Only show what would be removed.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ListOptions {
    /// Groups to list, all if none given.
    #[arg(value_name = "group")]
    pub groups: Vec<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct GroupAddOptions {
    /// Names of groups to create.
    #[arg(required = true, value_name = "name")]
    pub names: Vec<String>,

    /// Brief description of groups.
    #[arg(short, long, value_name = "summary")]
    pub description: Option<String>,

    /// Hide member listing of groups.
    #[arg(long)]
    pub omit_list: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct GroupUpdateOptions {
    /// Name of group to update.
    #[arg(value_name = "name")]
    pub name: String,

    /// New name of group.
    #[arg(short = 'n', long, value_name = "name")]
    pub new_name: Option<String>,

    /// New description of group.
    #[arg(short, long, value_name = "summary")]
    pub description: Option<String>,

    /// Hide or show member listing of group.
    #[arg(long, value_name = "bool")]
    pub omit_list: Option<bool>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct GroupRemoveOptions {
    /// Names of groups to remove.
    #[arg(required = true, value_name = "name")]
    pub names: Vec<String>,

    /// Remove groups even if they still have members.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RepositoryInfoOptions {
    /// Ids of repositories to show.
    #[arg(required = true, value_name = "id")]
    pub ids: Vec<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RepositoryUpdateOptions {
    /// Id of repository to update.
    #[arg(value_name = "id")]
    pub id: String,

    /// New id of repository.
    #[arg(long, value_name = "id")]
    pub new_id: Option<String>,

    /// New path of working copy.
    #[arg(short, long, value_name = "path")]
    pub path: Option<PathBuf>,

    /// New description of repository.
    #[arg(short, long, value_name = "summary")]
    pub description: Option<String>,

    /// Re-read remotes from working copy.
    #[arg(short, long)]
    pub remotes: bool,
}

/// Settings and database location of one command invocation.
struct Context {
    settings: Settings,
    persistence: JsonFile,
}

impl Context {
    fn open(config: Option<PathBuf>) -> Result<Self> {
        let settings = Settings::load(Settings::locate(config)?)?;
        let persistence = JsonFile::new(settings.database_path()?);

        Ok(Self {
            settings,
            persistence,
        })
    }

    fn load(&self) -> Result<Store> {
        Ok(Store::load(&self.persistence, self.settings.store_options())?)
    }

    /// Persist store if and only if no error occurred.
    fn commit(&self, store: Store, errors: Vec<Error>) -> Result<()> {
        if !errors.is_empty() {
            for error in &errors {
                error!("{error:#}");
            }
            bail!("{} error(s), database left untouched", errors.len());
        }

        if store.is_dirty() {
            self.persistence.store(&store.into_database())?;
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

fn run_add(ctx: &Context, opts: AddOptions) -> Result<()> {
    if opts.id.is_some() && opts.paths.len() > 1 {
        bail!("--id can only be used with a single path");
    }

    let mut store = ctx.load()?;
    let groups = ctx.settings.groups_or_default(opts.groups);
    let errors = opts
        .paths
        .into_iter()
        .filter_map(|path| store.register(path, opts.id.as_deref(), &groups).err())
        .map(Error::from)
        .collect();

    ctx.commit(store, errors)
}

async fn run_clone(ctx: &Context, opts: CloneOptions) -> Result<()> {
    let mut store = ctx.load()?;
    let groups = ctx.settings.groups_or_default(opts.groups);
    let destination = opts
        .destination
        .unwrap_or_else(|| ctx.settings.clone_destination());

    let multi = MultiProgress::new();
    let handles = opts.urls.into_iter().map(|url| {
        let bar = multi.add(ProgressBar::no_length());
        let destination = destination.clone();
        tokio::task::spawn_blocking(move || {
            let result = clone_remote(&url, &destination, bar);
            (url, result)
        })
    });

    let mut errors = Vec::new();
    let mut cloned = Vec::new();
    for joined in join_all(handles).await {
        match joined? {
            (_, Ok(path)) => cloned.push(path),
            (url, Err(err)) => {
                errors.push(Error::from(err).context(format!("failed to clone {url}")))
            }
        }
    }

    for path in &cloned {
        if let Err(err) = store.register(path, None, &groups) {
            errors.push(err.into());
        }
    }

    if !errors.is_empty() {
        for path in &cloned {
            warn!("{:?} was cloned but is not registered", path.display());
        }
    }

    ctx.commit(store, errors)
}

fn run_remove(ctx: &Context, opts: RemoveOptions) -> Result<()> {
    let mut store = ctx.load()?;
    let errors = opts
        .targets
        .iter()
        .filter_map(|token| store.remove_target(token, opts.force).err())
        .map(Error::from)
        .collect();

    ctx.commit(store, errors)
}

fn run_move(ctx: &Context, opts: MoveOptions) -> Result<()> {
    let mut store = ctx.load()?;
    let errors = match mover::perform(&mut store, &opts.froms, &opts.to) {
        Ok(kind) => {
            info!("moved to {} ({kind})", opts.to);
            Vec::new()
        }
        Err(failures) => failures.into_iter().map(Error::from).collect(),
    };

    ctx.commit(store, errors)
}

fn run_prune(ctx: &Context, opts: PruneOptions) -> Result<()> {
    let mut store = ctx.load()?;
    if opts.dry_run {
        let mut preview = store.clone();
        print_prune_report(&preview.prune(&FileSystem)?, "would remove");
        return Ok(());
    }

    let report = store.prune(&FileSystem)?;
    print_prune_report(&report, "removed");

    ctx.commit(store, Vec::new())
}

fn print_prune_report(report: &PruneReport, verb: &str) {
    for id in &report.missing {
        println!("{verb} repository {id} (working copy missing)");
    }
    for id in &report.orphans.repositories {
        println!("{verb} repository {id} (no group)");
    }
    for name in &report.orphans.groups {
        println!("{verb} group {name} (no member)");
    }
    if report.dangling_relations > 0 {
        println!("{verb} {} dangling relation(s)", report.dangling_relations);
    }
}

fn run_list(ctx: &Context, opts: ListOptions) -> Result<()> {
    let store = ctx.load()?;
    let groups = if opts.groups.is_empty() {
        store.groups().iter().collect::<Vec<_>>()
    } else {
        opts.groups
            .iter()
            .map(|name| {
                store
                    .find_group(name)
                    .ok_or_else(|| anyhow!("{name}: group not found"))
            })
            .collect::<Result<Vec<_>>>()?
    };

    for group in groups {
        match &group.description {
            Some(description) => println!("{} ({description})", group.name),
            None => println!("{}", group.name),
        }

        let members = store.relations_of_group(&group.name);
        if group.omit_list {
            println!("    {} repositories", members.len());
            continue;
        }

        for id in members {
            match store.find_repository(&id) {
                Some(repo) => println!("    {:<24} {}", repo.id, repo.as_path().display()),
                None => println!("    {id:<24} (missing)"),
            }
        }
    }

    Ok(())
}

fn run_group(ctx: &Context, cmd: GroupCommand) -> Result<()> {
    let mut store = ctx.load()?;
    let errors = match cmd {
        GroupCommand::Add(opts) => opts
            .names
            .iter()
            .filter_map(|name| {
                store
                    .create_group(name, opts.description.clone(), opts.omit_list)
                    .err()
                    .map(Error::from)
            })
            .collect(),
        GroupCommand::Update(opts) => {
            let current = store
                .find_group(&opts.name)
                .cloned()
                .ok_or_else(|| anyhow!("{}: group not found", opts.name))?;
            let group = Group {
                name: opts.new_name.unwrap_or(current.name),
                description: opts.description.or(current.description),
                omit_list: opts.omit_list.unwrap_or(current.omit_list),
            };
            store
                .update_group(&opts.name, group)
                .err()
                .map(Error::from)
                .into_iter()
                .collect()
        }
        GroupCommand::List => {
            for group in store.groups() {
                let members = store.relations_of_group(&group.name).len();
                let description = group.description.as_deref().unwrap_or("");
                println!("{:<24} {members:>4}  {description}", group.name);
            }
            return Ok(());
        }
        GroupCommand::Rm(opts) => opts
            .names
            .iter()
            .filter_map(|name| {
                let result = if opts.force {
                    store.force_delete_group(name)
                } else {
                    store.delete_group(name)
                };
                result.err().map(Error::from)
            })
            .collect(),
    };

    ctx.commit(store, errors)
}

fn run_repository(ctx: &Context, cmd: RepositoryCommand) -> Result<()> {
    let mut store = ctx.load()?;
    match cmd {
        RepositoryCommand::List => {
            for repo in store.repositories() {
                println!("{:<24} {}", repo.id, repo.as_path().display());
            }
            Ok(())
        }
        RepositoryCommand::Info(opts) => {
            for id in &opts.ids {
                let repo = store
                    .find_repository(id)
                    .ok_or_else(|| anyhow!("{id}: repository not found"))?;
                print_repository(&store, repo);
            }
            Ok(())
        }
        RepositoryCommand::Update(opts) => {
            let current = store
                .find_repository(&opts.id)
                .cloned()
                .ok_or_else(|| anyhow!("{}: repository not found", opts.id))?;
            let path = opts.path.unwrap_or(current.path);
            let remotes = if opts.remotes {
                find_remotes(&path)?
            } else {
                current.remotes
            };
            let repo = Repository {
                id: opts.new_id.unwrap_or(current.id),
                path,
                description: opts.description.or(current.description),
                remotes,
            };
            let errors = store
                .update_repository(&opts.id, repo)
                .err()
                .map(Error::from)
                .into_iter()
                .collect();

            ctx.commit(store, errors)
        }
    }
}

fn print_repository(store: &Store, repo: &Repository) {
    println!("{}", repo.id);
    println!("    path:        {}", repo.as_path().display());
    if let Some(description) = &repo.description {
        println!("    description: {description}");
    }
    for remote in &repo.remotes {
        println!("    remote:      {remote}");
    }
    let groups = store.relations_of_repository(&repo.id);
    if !groups.is_empty() {
        println!("    groups:      {}", groups.join(", "));
    }
}
