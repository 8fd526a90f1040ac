//! In-memory [`DocumentStore`] backend mirroring the folder semantics the
//! REST client relies on: exact-title search, root/Solved parentage, and a
//! trashed flag that hides files from every search.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use super::{DocumentStore, error::DriveResult};

/// Folder a stored sheet currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFolder {
    /// The hunt's root folder.
    Root,
    /// The Solved folder.
    Solved,
}

#[derive(Debug)]
struct StoredSheet {
    title: String,
    folder: SheetFolder,
    trashed: bool,
    link: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    sheets: Vec<StoredSheet>,
}

/// Document store held entirely in process memory.
#[derive(Clone, Default)]
pub struct MemoryDrive {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDrive {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-trashed sheets with this exact title, across folders.
    pub fn active_count(&self, title: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .sheets
            .iter()
            .filter(|sheet| sheet.title == title && !sheet.trashed)
            .count()
    }

    /// Folder of the first non-trashed sheet with this title, if any.
    pub fn folder_of(&self, title: &str) -> Option<SheetFolder> {
        self.inner
            .lock()
            .unwrap()
            .sheets
            .iter()
            .find(|sheet| sheet.title == title && !sheet.trashed)
            .map(|sheet| sheet.folder)
    }

    /// Seed a sheet directly, bypassing the search-before-create path.
    pub fn seed_sheet(&self, title: impl Into<String>, folder: SheetFolder) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let link = format!("memory://sheet/{}", inner.next_id);
        inner.sheets.push(StoredSheet {
            title: title.into(),
            folder,
            trashed: false,
            link,
        });
    }
}

impl DocumentStore for MemoryDrive {
    fn find_or_create_spreadsheet(&self, title: &str) -> BoxFuture<'static, DriveResult<String>> {
        let drive = self.clone();
        let title = title.to_string();
        Box::pin(async move {
            let mut inner = drive.inner.lock().unwrap();
            if let Some(existing) = inner
                .sheets
                .iter()
                .find(|sheet| {
                    sheet.title == title && sheet.folder == SheetFolder::Root && !sheet.trashed
                })
            {
                return Ok(existing.link.clone());
            }

            inner.next_id += 1;
            let link = format!("memory://sheet/{}", inner.next_id);
            inner.sheets.push(StoredSheet {
                title,
                folder: SheetFolder::Root,
                trashed: false,
                link: link.clone(),
            });
            Ok(link)
        })
    }

    fn move_spreadsheet_to_solved(&self, title: &str) -> BoxFuture<'static, DriveResult<()>> {
        let drive = self.clone();
        let title = title.to_string();
        Box::pin(async move {
            let mut inner = drive.inner.lock().unwrap();
            for sheet in inner.sheets.iter_mut().filter(|sheet| {
                sheet.title == title && sheet.folder == SheetFolder::Root && !sheet.trashed
            }) {
                sheet.folder = SheetFolder::Solved;
            }
            Ok(())
        })
    }

    fn trash_spreadsheet(&self, title: &str) -> BoxFuture<'static, DriveResult<()>> {
        let drive = self.clone();
        let title = title.to_string();
        Box::pin(async move {
            let mut inner = drive.inner.lock().unwrap();
            for sheet in inner
                .sheets
                .iter_mut()
                .filter(|sheet| sheet.title == title && !sheet.trashed)
            {
                sheet.trashed = true;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creation_is_idempotent_by_search() {
        let drive = MemoryDrive::new();
        let first = drive.find_or_create_spreadsheet("Crossword 1").await.unwrap();
        let second = drive.find_or_create_spreadsheet("Crossword 1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(drive.active_count("Crossword 1"), 1);
    }

    #[tokio::test]
    async fn move_re_parents_every_duplicate() {
        let drive = MemoryDrive::new();
        drive.seed_sheet("Crossword 1", SheetFolder::Root);
        drive.seed_sheet("Crossword 1", SheetFolder::Root);

        drive.move_spreadsheet_to_solved("Crossword 1").await.unwrap();

        assert_eq!(drive.folder_of("Crossword 1"), Some(SheetFolder::Solved));
        assert_eq!(drive.active_count("Crossword 1"), 2);
    }

    #[tokio::test]
    async fn trash_covers_both_folders_and_hides_from_search() {
        let drive = MemoryDrive::new();
        drive.seed_sheet("Crossword 1", SheetFolder::Root);
        drive.seed_sheet("Crossword 1", SheetFolder::Solved);

        drive.trash_spreadsheet("Crossword 1").await.unwrap();
        assert_eq!(drive.active_count("Crossword 1"), 0);

        // A fresh create after trashing starts a new sheet.
        drive.find_or_create_spreadsheet("Crossword 1").await.unwrap();
        assert_eq!(drive.active_count("Crossword 1"), 1);
    }
}
