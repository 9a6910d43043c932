//! One-shot commands: session management, catalog administration, config dump.

use std::error::Error;
use std::io::{self, Write};

use tracing::{debug, info};

use crate::catalog::{CatalogStore, JsonCatalogStore, NewTrack};
use crate::cli::{AdminCommand, Command, UploadArgs};
use crate::config::Settings;
use crate::identity::{AdminGate, IdentityProvider, LocalIdentity};
use crate::storage::JsonFileStore;

pub fn run(command: Command, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let mut identity = LocalIdentity::new(JsonFileStore::open(&settings.store.path));
    let mut catalog = JsonCatalogStore::open(&settings.catalog.path);
    debug!(catalog = %catalog.path().display(), ?command, "running command");
    let mut out = io::stdout().lock();
    execute(command, settings, &mut identity, &mut catalog, &mut out)
}

pub(super) fn execute(
    command: Command,
    settings: &Settings,
    identity: &mut impl IdentityProvider,
    catalog: &mut dyn CatalogStore,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let gate = AdminGate::new(&settings.admin.allowed_admins);

    match command {
        Command::Login { email, name } => {
            let user = identity.sign_in(&email, name.as_deref())?;
            writeln!(out, "Signed in as {}", user.label())?;
            if !gate.is_admin(&user) {
                writeln!(out, "{} is not an admin; admin commands will end this session", user.email)?;
            }
        }
        Command::Logout => {
            identity.sign_out()?;
            writeln!(out, "Signed out")?;
        }
        Command::Whoami => match identity.current_user()? {
            Some(user) => {
                let role = if gate.is_admin(&user) { "admin" } else { "listener" };
                writeln!(out, "{} <{}> ({})", user.label(), user.email, role)?;
            }
            None => writeln!(out, "Not signed in")?,
        },
        Command::Admin(cmd) => {
            let admin = gate.authorize(identity)?;
            match cmd {
                AdminCommand::List => {
                    for t in catalog.list()? {
                        writeln!(out, "{}\t{}\t{}", t.id, t.title, t.artist)?;
                    }
                }
                AdminCommand::Upload(UploadArgs {
                    title,
                    artist,
                    audio,
                    cover,
                }) => {
                    let track = catalog.create(NewTrack {
                        title,
                        artist,
                        cover_url: cover,
                        audio_url: audio,
                    })?;
                    info!(by = %admin.email, id = %track.id, "song uploaded");
                    writeln!(out, "Uploaded {} ({})", track.display(), track.id)?;
                }
                AdminCommand::Delete { id } => {
                    catalog.delete(&id)?;
                    info!(by = %admin.email, %id, "song deleted");
                    writeln!(out, "Deleted {}", id)?;
                }
            }
        }
        Command::Config => {
            write!(out, "{}", toml::to_string_pretty(settings)?)?;
        }
    }

    Ok(())
}
