mod store;
mod transport;


use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use session::config::{
    AUTH_SERVICE_URL_VAR, CONTENT_SERVICE_URL_VAR, DEFAULT_AUTH_SERVICE_URL, DEFAULT_CONTENT_SERVICE_URL,
    RESTORE_POLICY_VAR,
};
use session::{
    ApiClient, ApiError, ClientEvent, ConfigError, NewComment, PostDraft, PostQuery, RestorePolicy, ServiceConfig,
    Session, SessionManager, SessionPhase, TokenStore, UserPatch,
};

use store::FileTokenStore;
use transport::{DEFAULT_TIMEOUT_SECS, ReqwestTransport};

type CliSession = SessionManager<ReqwestTransport, FileTokenStore>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    AuthFailed(String),
    #[error("not logged in; run `blog login` first")]
    NotLoggedIn,
    #[error("nothing to update; pass at least one field")]
    EmptyPatch,
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "blog", about = "Blog platform command-line client")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    #[arg(long, global = true, env = AUTH_SERVICE_URL_VAR, default_value = DEFAULT_AUTH_SERVICE_URL)]
    auth_url: String,

    #[arg(long, global = true, env = CONTENT_SERVICE_URL_VAR, default_value = DEFAULT_CONTENT_SERVICE_URL)]
    content_url: String,

    #[arg(long, global = true, env = RESTORE_POLICY_VAR, default_value = "optimistic")]
    restore_policy: RestorePolicy,

    /// Where the session token is kept between runs.
    #[arg(long, global = true, env = "BLOG_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign into it.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "BLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored token. Nothing is sent to the server.
    Logout,
    /// Show the restored session without contacting the server.
    Status,
    /// Fetch the current user from the authentication service.
    Whoami,
    Profile(ProfileCommand),
    Posts(PostsCommand),
    Comments(CommentsCommand),
    Reactions(ReactionsCommand),
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Update(ProfileArgs),
}

#[derive(Args, Debug, Default)]
struct ProfileArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    avatar: Option<String>,
    #[arg(long)]
    bio: Option<String>,
}

impl From<ProfileArgs> for UserPatch {
    fn from(args: ProfileArgs) -> Self {
        Self { username: args.username, email: args.email, avatar: args.avatar, bio: args.bio }
    }
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 6)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    Get {
        id: i64,
    },
    Create(DraftArgs),
    Update {
        id: i64,
        #[command(flatten)]
        draft: DraftArgs,
    },
    Delete {
        id: i64,
    },
    ByUser {
        user_id: i64,
    },
}

#[derive(Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: String,
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl From<DraftArgs> for PostDraft {
    fn from(args: DraftArgs) -> Self {
        Self { title: args.title, content: args.content, tags: args.tags }
    }
}

#[derive(Args, Debug)]
struct CommentsCommand {
    #[command(subcommand)]
    command: CommentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentsSubcommand {
    List {
        post_id: i64,
    },
    Add {
        post_id: i64,
        #[arg(long)]
        content: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        content: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ReactionsCommand {
    #[command(subcommand)]
    command: ReactionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReactionsSubcommand {
    List {
        post_id: i64,
    },
    /// Show the signed-in user's reaction to a post.
    Mine {
        post_id: i64,
    },
    Add {
        post_id: i64,
        #[arg(long, default_value = "like")]
        kind: String,
    },
    Remove {
        post_id: i64,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    Show { id: i64 },
}

/// Output of `blog status`.
#[derive(Debug, Serialize)]
struct StatusReport {
    phase: SessionPhase,
    token_file: PathBuf,
    #[serde(flatten)]
    session: Session,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "ignoring unreadable .env");
        }
    }

    let session = connect(&cli.global)?;
    session.initialize().await;
    run(&session, cli.command).await
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn service_config(global: &GlobalArgs) -> Result<ServiceConfig, CliError> {
    Ok(ServiceConfig::new(&global.auth_url, &global.content_url)?.with_restore_policy(global.restore_policy))
}

fn connect(global: &GlobalArgs) -> Result<CliSession, CliError> {
    let config = service_config(global)?;
    let path = global.token_file.clone().unwrap_or_else(FileTokenStore::default_path);
    let transport = ReqwestTransport::new(Duration::from_secs(global.timeout_secs))?;
    let store = FileTokenStore::new(path);
    let held_token = store.get().is_some();
    let client = Arc::new(ApiClient::new(config, transport, store));
    client.subscribe(move |event| report_unauthorized(event, held_token));
    Ok(SessionManager::new(client))
}

fn report_unauthorized(event: &ClientEvent, held_token: bool) {
    let ClientEvent::Unauthorized { status, url } = event;
    tracing::warn!(status, %url, held_token, "request rejected as unauthorized");
    if let Some(hint) = unauthorized_hint(event, held_token) {
        eprintln!("{hint}");
    }
}

/// Re-login hint for a rejection. Only a token saved before this run can have
/// expired; an anonymous rejection is already reported by the command.
fn unauthorized_hint(event: &ClientEvent, held_token: bool) -> Option<String> {
    let ClientEvent::Unauthorized { status, .. } = event;
    held_token.then(|| format!("session expired or rejected ({status}); run `blog login` again"))
}

async fn run(session: &CliSession, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let outcome = session.login(&email, &password).await;
            if !outcome.success {
                return Err(CliError::AuthFailed(outcome.message.unwrap_or_default()));
            }
            print_json(&session.snapshot())
        }
        Command::Register { username, email, password } => {
            let outcome = session.register(&username, &email, &password).await;
            if !outcome.success {
                return Err(CliError::AuthFailed(outcome.message.unwrap_or_default()));
            }
            print_json(&session.snapshot())
        }
        Command::Logout => {
            session.logout();
            eprintln!("logged out");
            Ok(())
        }
        Command::Status => print_json(&StatusReport {
            phase: session.phase(),
            token_file: session.client().store().path().to_path_buf(),
            session: session.snapshot(),
        }),
        Command::Whoami => {
            require_login(session)?;
            print_json(&session.refresh_user().await?)
        }
        Command::Profile(profile) => run_profile(session, profile).await,
        Command::Posts(posts) => run_posts(session, posts).await,
        Command::Comments(comments) => run_comments(session, comments).await,
        Command::Reactions(reactions) => run_reactions(session, reactions).await,
        Command::Users(users) => match users.command {
            UsersSubcommand::Show { id } => print_json(&session.client().user_profile(id).await?),
        },
    }
}

fn require_login(session: &CliSession) -> Result<(), CliError> {
    if session.is_authenticated() { Ok(()) } else { Err(CliError::NotLoggedIn) }
}

async fn run_profile(session: &CliSession, profile: ProfileCommand) -> Result<(), CliError> {
    match profile.command {
        ProfileSubcommand::Update(args) => {
            let patch = UserPatch::from(args);
            if patch.is_empty() {
                return Err(CliError::EmptyPatch);
            }
            require_login(session)?;
            print_json(&session.save_profile(&patch).await?)
        }
    }
}

async fn run_posts(session: &CliSession, posts: PostsCommand) -> Result<(), CliError> {
    let client = session.client();
    match posts.command {
        PostsSubcommand::List { page, limit, search, tag } => {
            let query = PostQuery::new(page, limit)
                .with_search(search.unwrap_or_default())
                .with_tag(tag.unwrap_or_default());
            print_json(&client.list_posts(&query).await?)
        }
        PostsSubcommand::Get { id } => print_json(&client.get_post(id).await?),
        PostsSubcommand::Create(draft) => print_json(&client.create_post(&draft.into()).await?),
        PostsSubcommand::Update { id, draft } => print_json(&client.update_post(id, &draft.into()).await?),
        PostsSubcommand::Delete { id } => print_json(&client.delete_post(id).await?),
        PostsSubcommand::ByUser { user_id } => print_json(&client.user_posts(user_id).await?),
    }
}

async fn run_comments(session: &CliSession, comments: CommentsCommand) -> Result<(), CliError> {
    let client = session.client();
    match comments.command {
        CommentsSubcommand::List { post_id } => print_json(&client.post_comments(post_id).await?),
        CommentsSubcommand::Add { post_id, content } => {
            print_json(&client.create_comment(&NewComment { post_id, content }).await?)
        }
        CommentsSubcommand::Edit { id, content } => print_json(&client.update_comment(id, &content).await?),
        CommentsSubcommand::Delete { id } => print_json(&client.delete_comment(id).await?),
    }
}

async fn run_reactions(session: &CliSession, reactions: ReactionsCommand) -> Result<(), CliError> {
    let client = session.client();
    match reactions.command {
        ReactionsSubcommand::List { post_id } => print_json(&client.post_reactions(post_id).await?),
        ReactionsSubcommand::Mine { post_id } => print_json(&client.user_reaction(post_id).await?),
        ReactionsSubcommand::Add { post_id, kind } => print_json(&client.add_reaction(post_id, &kind).await?),
        ReactionsSubcommand::Remove { post_id } => print_json(&client.remove_reaction(post_id).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
