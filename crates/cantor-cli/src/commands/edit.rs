use anyhow::{Context, Result};

use cantor_core::model::{ActorId, HymnDraft, HymnEdit, HymnId};
use cantor_core::schema::Database;
use cantor_core::Catalog;
use cantor_search::HymnService;

use super::Output;

/// Fields given on the command line for an update.
#[derive(Debug, Clone, Default)]
pub struct Changes {
    pub name_jp: Option<String>,
    pub name_kr: Option<String>,
    pub lyric: Option<String>,
    pub link: Option<String>,
}

impl Changes {
    fn apply(self, edit: &mut HymnEdit) {
        if let Some(name_jp) = self.name_jp {
            edit.name_jp = name_jp;
        }
        if let Some(name_kr) = self.name_kr {
            edit.name_kr = name_kr;
        }
        if let Some(lyric) = self.lyric {
            edit.lyric = lyric;
        }
        if let Some(link) = self.link {
            edit.link = link;
        }
    }
}

pub fn draft(
    name_jp: String,
    name_kr: String,
    lyric: String,
    link: String,
    classical: bool,
    actor: i64,
) -> HymnDraft {
    HymnDraft::new(name_jp, ActorId::new(actor))
        .with_name_kr(name_kr)
        .with_lyric(lyric)
        .with_link(link)
        .with_classical(classical)
}

pub fn run_add(service: &HymnService<Database>, output: &Output, draft: HymnDraft) -> Result<()> {
    let created = service.create(draft).context("Failed to add hymn")?;
    if output.is_json() {
        return output.json(&created);
    }
    println!("✓ Added hymn {}", created.id);
    println!("  Listed on page {}", created.last_page);
    Ok(())
}

pub fn run_update(
    service: &HymnService<Database>,
    output: &Output,
    id: i64,
    changes: Changes,
    actor: i64,
) -> Result<()> {
    let id = HymnId::new(id);
    let current = service
        .catalog()
        .find_visible(id)?
        .ok_or_else(|| anyhow::anyhow!("Hymn {} not found", id))?;

    let mut edit = HymnEdit::of(&current, ActorId::new(actor));
    changes.apply(&mut edit);
    let updated = service.update(&edit).context("Failed to update hymn")?;

    if output.is_json() {
        return output.json(&updated);
    }
    println!("✓ Updated hymn {}", updated.id);
    Ok(())
}

pub fn run_delete(service: &HymnService<Database>, id: i64, actor: i64) -> Result<()> {
    service
        .delete(HymnId::new(id), ActorId::new(actor))
        .context("Failed to delete hymn")?;
    println!("✓ Deleted hymn {id}");
    Ok(())
}

pub fn run_restore(service: &HymnService<Database>, id: i64, actor: i64) -> Result<()> {
    service
        .restore(HymnId::new(id), ActorId::new(actor))
        .context("Failed to restore hymn")?;
    println!("✓ Restored hymn {id}");
    Ok(())
}
