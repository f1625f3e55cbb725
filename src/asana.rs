use crate::http;
use crate::types::{
    AsanaAttachment, AsanaData, AsanaPage, AsanaProject, AsanaSection, AsanaStory, AsanaTag,
    AsanaTask, AsanaTeam, AsanaUser, AsanaWorkspace, NewProject, NewSection, NewStory, NewTag,
    NewTask,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;

pub const BASE_URL: &str = "https://app.asana.com/api/1.0";

const PAGE_SIZE: &str = "100";
const TASK_OPT_FIELDS: &str = "name,notes,completed,assignee,followers,tags,parent,due_at,created_at";
const ATTACHMENT_OPT_FIELDS: &str = "name,download_url,view_url";

pub struct Asana {
    token: String,
    base_url: String,
}

impl Asana {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        Self {
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Follows `next_page.offset` until the listing is exhausted.
    async fn fetch_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, Box<dyn Error>> {
        let url = format!("{}{}", self.base_url, path);
        let mut all = vec![];
        let mut offset: Option<String> = None;
        loop {
            let mut request = http::CLIENT
                .get(url.as_str())
                .query(query)
                .query(&[("limit", PAGE_SIZE)])
                .header("Authorization", self.auth());
            if let Some(offset) = &offset {
                request = request.query(&[("offset", offset.as_str())]);
            }
            let response = request.send().await?;
            let payload = &response.text().await?;
            let page: AsanaPage<T> = serde_json::from_str(payload)?;
            all.extend(page.data);
            match page.next_page {
                Some(next) => offset = Some(next.offset),
                None => break,
            }
        }
        Ok(all)
    }

    async fn create<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Box<dyn Error>> {
        let url = format!("{}{}", self.base_url, path);
        let response = http::BARE_CLIENT
            .post(url.as_str())
            .header("Authorization", self.auth())
            .json(&AsanaData { data: body })
            .send()
            .await?
            .error_for_status()?;
        let payload = &response.text().await?;
        let created: AsanaData<T> = serde_json::from_str(payload)?;
        Ok(created.data)
    }

    pub async fn fetch_workspaces(&self) -> Result<Vec<AsanaWorkspace>, Box<dyn Error>> {
        self.fetch_paginated("/workspaces", &[]).await
    }

    pub async fn fetch_teams(&self, workspace_gid: &str) -> Result<Vec<AsanaTeam>, Box<dyn Error>> {
        self.fetch_paginated(&format!("/organizations/{}/teams", workspace_gid), &[])
            .await
    }

    pub async fn fetch_projects(&self, team_gid: &str) -> Result<Vec<AsanaProject>, Box<dyn Error>> {
        self.fetch_paginated(&format!("/teams/{}/projects", team_gid), &[])
            .await
    }

    pub async fn fetch_users(&self, workspace_gid: &str) -> Result<Vec<AsanaUser>, Box<dyn Error>> {
        self.fetch_paginated(&format!("/workspaces/{}/users", workspace_gid), &[])
            .await
    }

    pub async fn fetch_sections(
        &self,
        project_gid: &str,
    ) -> Result<Vec<AsanaSection>, Box<dyn Error>> {
        self.fetch_paginated(&format!("/projects/{}/sections", project_gid), &[])
            .await
    }

    pub async fn fetch_project_tasks(
        &self,
        project_gid: &str,
    ) -> Result<Vec<AsanaTask>, Box<dyn Error>> {
        self.fetch_paginated(
            &format!("/projects/{}/tasks", project_gid),
            &[("opt_fields", TASK_OPT_FIELDS)],
        )
        .await
    }

    pub async fn fetch_section_tasks(
        &self,
        section_gid: &str,
    ) -> Result<Vec<AsanaTask>, Box<dyn Error>> {
        self.fetch_paginated(
            &format!("/sections/{}/tasks", section_gid),
            &[("opt_fields", TASK_OPT_FIELDS)],
        )
        .await
    }

    pub async fn fetch_stories(&self, task_gid: &str) -> Result<Vec<AsanaStory>, Box<dyn Error>> {
        self.fetch_paginated(&format!("/tasks/{}/stories", task_gid), &[])
            .await
    }

    pub async fn fetch_attachments(
        &self,
        task_gid: &str,
    ) -> Result<Vec<AsanaAttachment>, Box<dyn Error>> {
        self.fetch_paginated(
            &format!("/tasks/{}/attachments", task_gid),
            &[("opt_fields", ATTACHMENT_OPT_FIELDS)],
        )
        .await
    }

    pub async fn create_project(
        &self,
        team_gid: &str,
        project: &NewProject,
    ) -> Result<AsanaProject, Box<dyn Error>> {
        self.create(&format!("/teams/{}/projects", team_gid), project)
            .await
    }

    pub async fn create_section(
        &self,
        project_gid: &str,
        name: &str,
    ) -> Result<AsanaSection, Box<dyn Error>> {
        let body = NewSection {
            name: name.to_string(),
        };
        self.create(&format!("/projects/{}/sections", project_gid), &body)
            .await
    }

    pub async fn create_tag(&self, tag: &NewTag) -> Result<AsanaTag, Box<dyn Error>> {
        self.create("/tags", tag).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<AsanaTask, Box<dyn Error>> {
        self.create("/tasks", task).await
    }

    pub async fn create_subtask(
        &self,
        parent_gid: &str,
        subtask: &NewTask,
    ) -> Result<AsanaTask, Box<dyn Error>> {
        self.create(&format!("/tasks/{}/subtasks", parent_gid), subtask)
            .await
    }

    pub async fn add_comment(
        &self,
        task_gid: &str,
        text: &str,
    ) -> Result<AsanaStory, Box<dyn Error>> {
        let body = NewStory {
            text: text.to_string(),
        };
        self.create(&format!("/tasks/{}/stories", task_gid), &body)
            .await
    }

    /// Downloads `source_url` and re-uploads it as a task attachment. The
    /// transfer runs on the blocking pool; the message pair lets callers log
    /// a per-item failure without aborting the run.
    pub async fn upload_attachment(
        &self,
        task_gid: &str,
        source_url: &str,
        filename: &str,
    ) -> Result<String, String> {
        let token = self.token.clone();
        let base_url = self.base_url.clone();
        let task_gid = task_gid.to_string();
        let source_url = source_url.to_string();
        let filename = filename.to_string();
        let spawn_result = tokio::task::spawn_blocking(move || {
            match synchronous_upload_attachment(&token, &base_url, &task_gid, &source_url, &filename)
            {
                Ok(_) => Ok(format!("Uploaded {}.", filename)),
                Err(reason) => Err(format!("Failed to upload {}: {}", filename, reason)),
            }
        })
        .await;
        spawn_result.map_err(|_| "Spawn blocking failed!".to_string())?
    }
}

fn synchronous_upload_attachment(
    token: &str,
    base_url: &str,
    task_gid: &str,
    source_url: &str,
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let client = reqwest::blocking::Client::new();
    let response = client.get(source_url).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    let part = reqwest::blocking::multipart::Part::bytes(bytes.to_vec())
        .file_name(filename.to_string());
    let form = reqwest::blocking::multipart::Form::new().part("file", part);
    client
        .post(format!("{}/tasks/{}/attachments", base_url, task_gid))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()?
        .error_for_status()?;
    Ok(())
}
