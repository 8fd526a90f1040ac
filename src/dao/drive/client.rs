use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use super::{
    DocumentStore,
    auth::TokenBroker,
    config::DriveConfig,
    error::{DriveError, DriveResult},
    wire::{
        CreateFileRequest, FOLDER_MIME, FileList, FileResource, SPREADSHEET_MIME,
        TrashFileRequest, search_query,
    },
};

/// Name of the folder solved spreadsheets are re-parented into.
const SOLVED_FOLDER_NAME: &str = "Solved";

/// REST-backed [`DocumentStore`] for Google Drive.
///
/// Owns no state beyond the cached root/Solved folder identifiers and the
/// token broker; every operation re-queries the store.
#[derive(Clone)]
pub struct DriveClient {
    client: Client,
    base_url: Arc<str>,
    broker: Arc<TokenBroker>,
    root_folder_id: Arc<str>,
    solved_folder_id: Arc<str>,
}

impl DriveClient {
    /// Resolve the root and Solved folders and return a ready client.
    ///
    /// A missing root folder is fatal: the adapter has no destination for
    /// new spreadsheets, so the caller is expected to exit.
    pub async fn connect(
        config: &DriveConfig,
        broker: Arc<TokenBroker>,
        root_folder_name: &str,
    ) -> DriveResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| DriveError::ClientBuilder { source })?;

        let mut drive = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            broker,
            root_folder_id: Arc::<str>::from(""),
            solved_folder_id: Arc::<str>::from(""),
        };

        let root_query = search_query(FOLDER_MIME, root_folder_name, None);
        let root = drive
            .list_files(&root_query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriveError::RootFolderMissing {
                name: root_folder_name.to_string(),
            })?;
        drive.root_folder_id = Arc::<str>::from(root.id);

        let root_id = drive.root_folder_id.to_string();
        let solved_id = drive
            .get_or_create_folder(SOLVED_FOLDER_NAME, Some(&root_id))
            .await?;
        drive.solved_folder_id = Arc::<str>::from(solved_id);

        Ok(drive)
    }

    async fn request(&self, method: Method, path: &str) -> DriveResult<reqwest::RequestBuilder> {
        let token = self.broker.access_token().await?;
        let url = format!("{}/{}", self.base_url, path);
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send_json<T>(&self, builder: reqwest::RequestBuilder, path: &str) -> DriveResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|source| DriveError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::RequestStatus {
                path: path.to_string(),
                status,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| DriveError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn send_expect_success(
        &self,
        builder: reqwest::RequestBuilder,
        path: &str,
    ) -> DriveResult<()> {
        let response = builder
            .send()
            .await
            .map_err(|source| DriveError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DriveError::RequestStatus {
                path: path.to_string(),
                status,
            })
        }
    }

    async fn list_files(&self, query: &str) -> DriveResult<Vec<FileResource>> {
        const PATH: &str = "files";
        let builder = self.request(Method::GET, PATH).await?.query(&[
            ("q", query),
            ("fields", "files(id,name,webViewLink)"),
            ("pageSize", "100"),
        ]);
        let payload: FileList = self.send_json(builder, PATH).await?;
        Ok(payload.files)
    }

    /// Create a file, then re-fetch its metadata for the browse link.
    async fn create_file(
        &self,
        name: &str,
        mime_type: &str,
        parent: &str,
    ) -> DriveResult<FileResource> {
        const PATH: &str = "files";
        let body = CreateFileRequest {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parents: vec![parent.to_string()],
        };
        let created: FileResource = self
            .send_json(self.request(Method::POST, PATH).await?.json(&body), PATH)
            .await?;

        let path = format!("files/{}", created.id);
        let builder = self
            .request(Method::GET, &path)
            .await?
            .query(&[("fields", "id,name,webViewLink")]);
        self.send_json(builder, &path).await
    }

    /// Idempotent folder lookup/creation under the given parent (root when
    /// absent).
    pub async fn get_or_create_folder(
        &self,
        name: &str,
        parent: Option<&str>,
    ) -> DriveResult<String> {
        let query = search_query(FOLDER_MIME, name, parent);
        if let Some(existing) = self.list_files(&query).await?.into_iter().next() {
            return Ok(existing.id);
        }

        let parent_id = parent.unwrap_or(self.root_folder_id.as_ref()).to_string();
        let created = self.create_file(name, FOLDER_MIME, &parent_id).await?;
        Ok(created.id)
    }

    fn sheet_link(file: &FileResource) -> String {
        file.web_view_link
            .clone()
            .unwrap_or_else(|| format!("https://docs.google.com/spreadsheets/d/{}", file.id))
    }
}

impl DocumentStore for DriveClient {
    fn find_or_create_spreadsheet(&self, title: &str) -> BoxFuture<'static, DriveResult<String>> {
        let drive = self.clone();
        let title = title.to_string();
        Box::pin(async move {
            let query = search_query(SPREADSHEET_MIME, &title, Some(&drive.root_folder_id));
            // First match wins; duplicates from past anomalies are tolerated.
            if let Some(existing) = drive.list_files(&query).await?.into_iter().next() {
                return Ok(Self::sheet_link(&existing));
            }

            let root_id = drive.root_folder_id.to_string();
            let created = drive
                .create_file(&title, SPREADSHEET_MIME, &root_id)
                .await?;
            Ok(Self::sheet_link(&created))
        })
    }

    fn move_spreadsheet_to_solved(&self, title: &str) -> BoxFuture<'static, DriveResult<()>> {
        let drive = self.clone();
        let title = title.to_string();
        Box::pin(async move {
            let query = search_query(SPREADSHEET_MIME, &title, Some(&drive.root_folder_id));
            // Re-parent every match so duplicate sheets from a past anomaly
            // all end up in the Solved folder.
            for sheet in drive.list_files(&query).await? {
                let path = format!("files/{}", sheet.id);
                let builder = drive
                    .request(Method::PATCH, &path)
                    .await?
                    .query(&[
                        ("addParents", drive.solved_folder_id.as_ref()),
                        ("removeParents", drive.root_folder_id.as_ref()),
                    ])
                    .json(&serde_json::json!({}));
                drive.send_expect_success(builder, &path).await?;
            }
            Ok(())
        })
    }

    fn trash_spreadsheet(&self, title: &str) -> BoxFuture<'static, DriveResult<()>> {
        let drive = self.clone();
        let title = title.to_string();
        Box::pin(async move {
            let folders = [
                drive.root_folder_id.to_string(),
                drive.solved_folder_id.to_string(),
            ];
            for folder in folders {
                let query = search_query(SPREADSHEET_MIME, &title, Some(&folder));
                for sheet in drive.list_files(&query).await? {
                    let path = format!("files/{}", sheet.id);
                    let builder = drive
                        .request(Method::PATCH, &path)
                        .await?
                        .json(&TrashFileRequest { trashed: true });
                    drive.send_expect_success(builder, &path).await?;
                }
            }
            Ok(())
        })
    }
}
