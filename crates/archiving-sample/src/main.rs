//! Archiving sample
//!
//! Creates a session, mints a token for it and drives the archive lifecycle
//! from the command line.
//!
//! ```text
//! archiving-sample                        create a session and print a moderator token
//! archiving-sample token <session> [role] print a token for an existing session
//! archiving-sample start <session> [name] start recording
//! archiving-sample stop <archive-id>      stop recording
//! archiving-sample get <archive-id>       show one archive
//! archiving-sample list [offset] [count]  list archives
//! archiving-sample delete <archive-id>    delete an archive
//! ```
//!
//! Credentials come from `OPENTOK_API_KEY` and `OPENTOK_API_SECRET`.

use anyhow::{bail, Context, Result};
use opentok::{
    Archive, ArchiveListOptions, ArchiveMode, ClientConfig, OpenTok, Role, SessionProperties,
    TokenOptions,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opentok=debug,archiving_sample=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        api_key = config.api_key,
        api_url = %config.api_url,
        "Configuration loaded successfully"
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let command = parse_command(&args)?;

    let client = OpenTok::new(config)?;

    match command {
        Command::CreateSession => create_session(&client).await,
        Command::Token { session_id, role } => print_token(&client, session_id, role),
        Command::Start { session_id, name } => {
            print_archive(&client.start_archive(session_id, name).await?);
            Ok(())
        }
        Command::Stop(archive_id) => {
            print_archive(&client.stop_archive(archive_id).await?);
            Ok(())
        }
        Command::Get(archive_id) => {
            print_archive(&client.get_archive(archive_id).await?);
            Ok(())
        }
        Command::List(options) => list_archives(&client, options).await,
        Command::Delete(archive_id) => {
            client.delete_archive(archive_id).await?;
            info!(archive_id = %archive_id, "Archive deleted");
            Ok(())
        }
    }
}

/// One invocation of the sample.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    CreateSession,
    Token { session_id: &'a str, role: Role },
    Start {
        session_id: &'a str,
        name: Option<&'a str>,
    },
    Stop(Uuid),
    Get(Uuid),
    List(ArchiveListOptions),
    Delete(Uuid),
}

fn parse_command<'a>(args: &[&'a str]) -> Result<Command<'a>> {
    let command = match args {
        [] => Command::CreateSession,
        ["token", session_id] => Command::Token {
            session_id: *session_id,
            role: Role::Publisher,
        },
        ["token", session_id, role] => Command::Token {
            session_id: *session_id,
            role: role.parse::<Role>()?,
        },
        ["start", session_id] => Command::Start {
            session_id: *session_id,
            name: None,
        },
        ["start", session_id, name] => Command::Start {
            session_id: *session_id,
            name: Some(*name),
        },
        ["stop", archive_id] => Command::Stop(parse_archive_id(archive_id)?),
        ["get", archive_id] => Command::Get(parse_archive_id(archive_id)?),
        ["list"] => Command::List(list_options(None, None)?),
        ["list", offset] => Command::List(list_options(Some(offset), None)?),
        ["list", offset, count] => Command::List(list_options(Some(offset), Some(count))?),
        ["delete", archive_id] => Command::Delete(parse_archive_id(archive_id)?),
        other => bail!("Unrecognised arguments: {}", other.join(" ")),
    };
    Ok(command)
}

/// Create a manually archived, routed session and print a moderator token.
async fn create_session(client: &OpenTok) -> Result<()> {
    let properties = SessionProperties {
        archive_mode: ArchiveMode::Manual,
        ..SessionProperties::default()
    };
    let session = client.create_session(&properties).await?;
    info!(session_id = %session.session_id(), "Session created");

    let token = session.generate_token(&TokenOptions {
        role: Some(Role::Moderator),
        connection_data: Some("name=sample-host".to_string()),
        ..TokenOptions::default()
    })?;

    println!("api_key:    {}", session.api_key());
    println!("session_id: {}", session.session_id());
    println!("token:      {token}");
    Ok(())
}

fn print_token(client: &OpenTok, session_id: &str, role: Role) -> Result<()> {
    let token = client.generate_token(
        session_id,
        &TokenOptions {
            role: Some(role),
            ..TokenOptions::default()
        },
    )?;
    println!("{token}");
    Ok(())
}

/// Paging from `[offset] [count]`.
fn list_options(offset: Option<&str>, count: Option<&str>) -> Result<ArchiveListOptions> {
    let parse = |value: Option<&str>, what: &str| -> Result<Option<u32>> {
        value
            .map(|v| v.parse::<u32>().with_context(|| format!("Invalid {what}: {v}")))
            .transpose()
    };
    Ok(ArchiveListOptions {
        offset: parse(offset, "offset")?,
        count: parse(count, "count")?,
    })
}

async fn list_archives(client: &OpenTok, options: ArchiveListOptions) -> Result<()> {
    let list = client.list_archives(&options).await?;
    info!(total = list.count, page = list.items.len(), "Archives listed");
    for archive in &list.items {
        print_archive(archive);
    }
    Ok(())
}

fn parse_archive_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Invalid archive id: {value}"))
}

fn print_archive(archive: &Archive) {
    println!(
        "{}  {:?}  session={}  name={}  duration={}s  url={}",
        archive.id,
        archive.status,
        archive.session_id,
        archive.name.as_deref().unwrap_or("-"),
        archive.duration,
        archive.url.as_deref().unwrap_or("-"),
    );
}
