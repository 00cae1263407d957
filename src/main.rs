use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use skillswap::app::{App, ClipViewMode, Phase, TuneIntent, MATCHING_STATUS, TOUR_STEPS};
use skillswap::config::{Config, ConfigOverrides};
use skillswap::data_source;
use skillswap::models::FeedbackPayload;
use skillswap::storage::FileStore;
use skillswap::tags::{CategoryFilter, Tag};
use skillswap::user_models::{SignInRequest, UserProfile};
use skillswap::user_storage::UserStorage;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skillswap")]
#[command(about = "Discover and join live skill-swap sessions", long_about = None)]
struct Cli {
    #[arg(long, global = true, env = "SKILLSWAP_STORE", help = "Path of the local state file")]
    store: Option<PathBuf>,

    #[arg(long, global = true, env = "SKILLSWAP_BACKEND_URL", help = "Backend REST endpoint")]
    backend_url: Option<String>,

    #[arg(long, global = true, env = "SKILLSWAP_BACKEND_KEY", help = "Backend anonymous key")]
    backend_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Sign in with your email")]
    Signin {
        #[arg(short, long, help = "Display name")]
        name: String,

        #[arg(short, long, help = "Email address")]
        email: String,

        #[arg(short, long, help = "Age (13 or older)")]
        age: u32,
    },

    #[command(about = "Finish onboarding with what you want to learn and teach")]
    Onboard {
        #[arg(short, long, help = "Display name")]
        name: String,

        #[arg(short, long, value_delimiter = ',', help = "Tags to learn (comma-separated)")]
        learn: Vec<Tag>,

        #[arg(short, long, value_delimiter = ',', help = "Tags you can teach (comma-separated)")]
        teach: Vec<Tag>,

        #[arg(long, help = "Timezone (defaults to UTC)")]
        timezone: Option<String>,
    },

    #[command(about = "Show current user")]
    Whoami,

    #[command(about = "Sign out (your profile is kept)")]
    Signout,

    #[command(about = "List sessions ranked for you")]
    Sessions {
        #[arg(short, long, help = "Search title, host or description")]
        search: Option<String>,

        #[arg(short, long, help = "Category tag or 'all'")]
        category: Option<CategoryFilter>,

        #[arg(long, help = "Show more of a tag (repeatable)")]
        more: Vec<Tag>,

        #[arg(long, help = "Show less of a tag (repeatable)")]
        less: Vec<Tag>,
    },

    #[command(about = "List clips ranked for you")]
    Clips {
        #[arg(short, long, help = "Search title or creator")]
        search: Option<String>,

        #[arg(short, long, help = "Category tag or 'all'")]
        category: Option<CategoryFilter>,

        #[arg(long, help = "Only saved clips")]
        saved: bool,
    },

    #[command(about = "List creators")]
    Creators {
        #[arg(short, long, help = "Search name or bio")]
        search: Option<String>,

        #[arg(short, long, help = "Category tag or 'all'")]
        category: Option<CategoryFilter>,
    },

    #[command(about = "Join a session")]
    Join {
        #[arg(help = "Session ID")]
        session_id: String,

        #[arg(short, long, help = "Rate the session (1-5) after leaving")]
        rating: Option<u8>,

        #[arg(long, help = "Feedback notes")]
        notes: Option<String>,
    },

    #[command(about = "Save a clip for later")]
    Save {
        #[arg(help = "Clip ID")]
        clip_id: String,

        #[arg(long, help = "Remove from saved instead")]
        remove: bool,
    },

    #[command(about = "Show or toggle the colour theme")]
    Theme {
        #[arg(long, help = "Switch between light and dark")]
        toggle: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::with_overrides(ConfigOverrides {
        backend_url: cli.backend_url,
        backend_key: cli.backend_key,
        store_path: cli.store,
    });
    init_tracing(&config.log_directive);

    if let Err(e) = run_command(cli.command, config).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    config.validate()?;
    let store = FileStore::open(&config.store_path)
        .with_context(|| format!("Failed to open {}", config.store_path.display()))?;
    let storage = UserStorage::new(Arc::new(store));
    let viewer_id = storage.viewer_id().await.context("Failed to create viewer id")?;
    let source = data_source::select(&config, viewer_id);

    let mut app = App::start(storage, source).await;
    app.load_catalog().await;

    match command {
        Commands::Signin { name, email, age } => {
            signin(&mut app, SignInRequest { name, email, age }).await?;
        }
        Commands::Onboard {
            name,
            learn,
            teach,
            timezone,
        } => {
            let mut profile = UserProfile::new(name, learn, teach);
            if let Some(timezone) = timezone {
                profile.timezone = timezone;
            }
            onboard(&mut app, profile).await?;
        }
        Commands::Whoami => {
            whoami(&app);
        }
        Commands::Signout => {
            app.sign_out().await;
            println!("✅ Signed out. Your profile is kept for next time.");
        }
        Commands::Sessions {
            search,
            category,
            more,
            less,
        } => {
            require_discovery(&app)?;
            for tag in more {
                app.tune_tag(tag, TuneIntent::More);
            }
            for tag in less {
                app.tune_tag(tag, TuneIntent::Less);
            }
            apply_filters(&mut app, search, category);
            list_sessions(&app);
        }
        Commands::Clips {
            search,
            category,
            saved,
        } => {
            require_discovery(&app)?;
            if saved {
                app.open_saved_clips()?;
            }
            apply_filters(&mut app, search, category);
            list_clips(&app);
        }
        Commands::Creators { search, category } => {
            require_discovery(&app)?;
            apply_filters(&mut app, search, category);
            list_creators(&app);
        }
        Commands::Join {
            session_id,
            rating,
            notes,
        } => {
            require_discovery(&app)?;
            join(&mut app, &session_id, rating, notes).await?;
        }
        Commands::Save { clip_id, remove } => {
            require_discovery(&app)?;
            if !app.catalog().clips.iter().any(|clip| clip.id == clip_id) {
                bail!("Clip '{}' not found", clip_id);
            }
            app.toggle_save_clip(&clip_id, !remove).await;
            if remove {
                println!("✅ Removed '{}' from saved clips", clip_id);
            } else {
                println!("📌 Saved '{}' ({} saved)", clip_id, app.saved_clip_ids().len());
            }
        }
        Commands::Theme { toggle } => {
            if toggle {
                app.toggle_theme().await;
            }
            println!("🎨 Theme: {}", app.theme().as_str());
        }
    }

    Ok(())
}

fn require_discovery(app: &App) -> Result<()> {
    match app.phase() {
        Phase::Landing => bail!("Not signed in. Run: skillswap signin -n <name> -e <email> -a <age>"),
        Phase::Onboarding => bail!("Onboarding not finished. Run: skillswap onboard -n <name> -l <tags>"),
        _ => Ok(()),
    }
}

fn apply_filters(app: &mut App, search: Option<String>, category: Option<CategoryFilter>) {
    if let Some(search) = search {
        app.set_search_query(search);
    }
    if let Some(category) = category {
        app.select_category(category);
    }
}

fn tag_labels(tags: &[Tag]) -> String {
    tags.iter().map(|tag| tag.label()).collect::<Vec<_>>().join(", ")
}

async fn signin(app: &mut App, request: SignInRequest) -> Result<()> {
    if let Some(user) = app.auth_user() {
        bail!("Already signed in as {}. Run: skillswap signout", user.email);
    }

    app.begin()?;
    let phase = app.sign_in(request).await?;

    println!("✅ Signed in!");
    if let Some(user) = app.auth_user() {
        println!("👤 {} <{}>", user.name, user.email);
    }
    match phase {
        Phase::Onboarding => {
            println!("\n💡 Next: skillswap onboard -n <name> -l <learn tags> -t <teach tags>");
            println!("   Tags: {}", Tag::ALL.map(|tag| tag.as_str()).join(", "));
        }
        _ => println!("\n💡 Welcome back! Try: skillswap sessions"),
    }
    Ok(())
}

async fn onboard(app: &mut App, profile: UserProfile) -> Result<()> {
    if app.phase() != Phase::Onboarding {
        bail!("Nothing to onboard. Sign in first, or update your profile instead");
    }
    app.complete_onboarding(profile).await?;

    println!("✅ Profile ready!");
    if let Some(entry) = app.activity().latest() {
        println!("✨ {}", entry.detail.as_deref().unwrap_or(&entry.label));
    }
    if app.tour_step().is_some() {
        println!("\n🧭 Quick tour");
        for (i, step) in TOUR_STEPS.iter().enumerate() {
            println!("   {}. {}: {}", i + 1, step.title, step.body);
        }
        app.close_tour().await;
    }
    Ok(())
}

fn whoami(app: &App) {
    let Some(user) = app.auth_user() else {
        println!("❌ Not signed in");
        return;
    };

    println!("👤 {} <{}>", user.name, user.email);
    match app.profile() {
        Some(profile) => {
            println!("🌍 Timezone: {}", profile.timezone);
            println!("📚 Learning: {}", tag_labels(&profile.learn_tags));
            if !profile.teach_tags.is_empty() {
                println!("🎓 Teaching: {}", tag_labels(&profile.teach_tags));
            }
        }
        None => println!("💡 Onboarding not finished"),
    }
    println!("🎨 Theme: {}", app.theme().as_str());
}

fn list_sessions(app: &App) {
    let sessions = app.visible_sessions();
    if sessions.is_empty() {
        println!("📭 No sessions match your filters.");
        return;
    }

    if let Some(tag) = app.highlight_tag() {
        println!("\n✨ Because you're into {}", tag.label());
    }
    println!("\n📋 Sessions ({})\n", sessions.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Title"),
        Cell::new("Tag"),
        Cell::new("Host"),
        Cell::new("Status"),
        Cell::new("Starts"),
        Cell::new("Rating"),
    ]));

    for session in sessions {
        table.add_row(Row::new(vec![
            Cell::new(&session.id),
            Cell::new(&session.title),
            Cell::new(session.tag.label()),
            Cell::new(&session.host),
            Cell::new(&session.status.to_string()),
            Cell::new(&session.start_time),
            Cell::new(&format!("{:.1}", session.rating)),
        ]));
    }

    table.printstd();
    println!();
}

fn list_clips(app: &App) {
    let clips = app.visible_clips();
    if clips.is_empty() {
        match app.clip_view_mode() {
            ClipViewMode::Saved => println!("📭 No saved clips yet. Try: skillswap save <clip-id>"),
            ClipViewMode::All => println!("📭 No clips match your filters."),
        }
        return;
    }

    println!("\n🎬 Clips ({})\n", clips.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Title"),
        Cell::new("Creator"),
        Cell::new("Tags"),
        Cell::new("Likes"),
        Cell::new("Saves"),
    ]));

    for clip in clips {
        let creator = app.creator_for(&clip.creator_id);
        table.add_row(Row::new(vec![
            Cell::new(&clip.id),
            Cell::new(&clip.title),
            Cell::new(&creator.name),
            Cell::new(&tag_labels(&clip.tags)),
            Cell::new(&clip.likes.to_string()),
            Cell::new(&clip.saves.to_string()),
        ]));
    }

    table.printstd();
    println!();
}

fn list_creators(app: &App) {
    let creators = app.visible_creators();
    if creators.is_empty() {
        println!("📭 No creators match your filters.");
        return;
    }

    println!("\n🌟 Creators ({})\n", creators.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("Teaches"),
        Cell::new("Followers"),
    ]));

    for creator in creators {
        table.add_row(Row::new(vec![
            Cell::new(&creator.id),
            Cell::new(&creator.name),
            Cell::new(&tag_labels(&creator.specialty)),
            Cell::new(&creator.followers.to_string()),
        ]));
    }

    table.printstd();
    println!();
}

async fn join(app: &mut App, session_id: &str, rating: Option<u8>, notes: Option<String>) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    println!("⏳ {}", MATCHING_STATUS);
    if !app.join_session_by_id(session_id, &cancel).await? {
        println!("❌ Matchmaking cancelled");
        return Ok(());
    }

    if let Some(session) = app.active_session() {
        println!("🎥 You're in: {} with {}", session.title, session.host);
        println!("   {} · {} min · {}", session.language, session.duration, session.level);
    }
    app.leave_session()?;

    match rating {
        Some(rating) => {
            let mut payload = FeedbackPayload::new(rating);
            payload.notes = notes.unwrap_or_default();
            app.submit_feedback(payload)?;
            println!("✅ Thanks for rating the session {}/5", rating);
        }
        None => println!("💡 Re-run with --rating <1-5> to leave feedback"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_flag_falls_back_to_environment() {
        std::env::set_var("SKILLSWAP_STORE", "/tmp/from-env.json");
        let cli = Cli::try_parse_from(["skillswap", "whoami"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/from-env.json")));

        let cli = Cli::try_parse_from(["skillswap", "--store", "/tmp/flag.json", "whoami"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/flag.json")));
        std::env::remove_var("SKILLSWAP_STORE");
    }

    #[test]
    fn onboard_takes_comma_separated_tags() {
        let cli = Cli::try_parse_from(["skillswap", "onboard", "-n", "Mina", "-l", "music,diy", "-t", "cooking"]).unwrap();
        match cli.command {
            Commands::Onboard { learn, teach, .. } => {
                assert_eq!(learn, vec![Tag::Music, Tag::Diy]);
                assert_eq!(teach, vec![Tag::Cooking]);
            }
            _ => panic!("expected onboard"),
        }
    }
}
