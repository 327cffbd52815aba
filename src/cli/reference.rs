//! Group, category and party CLI commands
//!
//! The three tagging dimensions share one set of subcommands; the entity
//! kind is chosen by the top-level command.

use std::str::FromStr;

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_choices, format_reference_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Reference, UserId};
use crate::services::{ReferenceService, SelectionRanker};
use crate::storage::{Storage, Stored};

/// Subcommands shared by `group`, `category` and `party`
#[derive(Subcommand)]
pub enum ReferenceCommands {
    /// Create a new entry
    Create {
        /// Entry name
        name: String,
    },
    /// List all entries, most used first
    List,
    /// Rename an entry
    Rename {
        /// Current name or ID
        entry: String,
        /// New name
        name: String,
    },
    /// Hide an entry from selection lists
    Deactivate {
        /// Name or ID
        entry: String,
    },
    /// Make an entry selectable again
    Activate {
        /// Name or ID
        entry: String,
    },
    /// Show active entries in selection order
    Choices,
}

/// Resolve an entry by name, full ID or short display ID
pub fn resolve_reference<E>(storage: &Storage, identifier: &str, owner: UserId) -> LedgerResult<E>
where
    E: Stored + Reference,
    E::Id: FromStr,
{
    let service = ReferenceService::<E>::new(storage);

    if let Some(row) = service.find(identifier, owner)? {
        return Ok(row);
    }

    if let Ok(id) = identifier.parse::<E::Id>() {
        if let Some(row) = service.get(id, owner)? {
            return Ok(row);
        }
    }

    service
        .list(owner)?
        .into_iter()
        .find(|row| row.id().to_string().eq_ignore_ascii_case(identifier))
        .ok_or_else(|| LedgerError::NotFound {
            entity_type: E::ENTITY,
            identifier: identifier.to_string(),
        })
}

/// Handle a group, category or party command
pub fn handle_reference_command<E>(
    storage: &Storage,
    settings: &Settings,
    cmd: ReferenceCommands,
) -> LedgerResult<()>
where
    E: Stored + Reference,
    E::Id: FromStr,
{
    let service = ReferenceService::<E>::new(storage);
    let owner = settings.owner;

    match cmd {
        ReferenceCommands::Create { name } => {
            let row = service.create(&name, owner)?;
            println!("Created {}: {}", E::ENTITY.to_lowercase(), row.name());
            println!("  ID: {}", row.id());
        }

        ReferenceCommands::List => {
            let rows = service.list(owner)?;
            print!("{}", format_reference_list(E::ENTITY, &rows));
        }

        ReferenceCommands::Rename { entry, name } => {
            let found = resolve_reference::<E>(storage, &entry, owner)?;
            let updated = service.rename(found.id(), &name, owner)?;
            println!("Renamed {} to: {}", found.name(), updated.name());
        }

        ReferenceCommands::Deactivate { entry } => {
            let found = resolve_reference::<E>(storage, &entry, owner)?;
            let updated = service.set_active(found.id(), false, owner)?;
            println!("Deactivated {}: {}", E::ENTITY.to_lowercase(), updated.name());
        }

        ReferenceCommands::Activate { entry } => {
            let found = resolve_reference::<E>(storage, &entry, owner)?;
            let updated = service.set_active(found.id(), true, owner)?;
            println!("Activated {}: {}", E::ENTITY.to_lowercase(), updated.name());
        }

        ReferenceCommands::Choices => {
            let choices = SelectionRanker::new(storage).choices::<E>(owner, None)?;
            print!("{}", format_choices(E::ENTITY, &choices));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use crate::models::Party;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_reference_by_name_and_id() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let owner = UserId::new();
        let party = ReferenceService::<Party>::new(&storage)
            .create("Grocer", owner)
            .unwrap();

        let by_name = resolve_reference::<Party>(&storage, "grocer", owner).unwrap();
        assert_eq!(by_name.id, party.id);

        let by_short = resolve_reference::<Party>(&storage, &party.id.to_string(), owner).unwrap();
        assert_eq!(by_short.id, party.id);

        let err = resolve_reference::<Party>(&storage, "Grocer", UserId::new()).unwrap_err();
        assert!(err.is_not_found());
    }
}
