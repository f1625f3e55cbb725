use serde::{Deserialize, Serialize};

// --- Trello board export ---------------------------------------------------

#[derive(Deserialize, Clone, Debug)]
pub struct TrelloBoard {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub labels: Vec<TrelloLabel>,
    #[serde(default)]
    pub lists: Vec<TrelloList>,
    #[serde(default)]
    pub cards: Vec<TrelloCard>,
    #[serde(default)]
    pub members: Vec<TrelloMember>,
    #[serde(default)]
    pub checklists: Vec<TrelloChecklist>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrelloLabel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrelloList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrelloCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub due: Option<String>,
    pub id_list: String,
    #[serde(default)]
    pub id_members: Vec<String>,
    #[serde(default)]
    pub id_labels: Vec<String>,
    #[serde(default)]
    pub id_checklists: Vec<String>,
    #[serde(default)]
    pub badges: TrelloBadges,
    #[serde(default)]
    pub attachments: Vec<TrelloAttachment>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct TrelloBadges {
    #[serde(default)]
    pub comments: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrelloAttachment {
    #[serde(default)]
    pub name: String,
    pub url: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrelloMember {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrelloChecklist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub check_items: Vec<TrelloCheckItem>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrelloCheckItem {
    pub name: String,
    pub state: String,
}

// --- Trello REST API -------------------------------------------------------

/// A card action as returned by `/1/cards/{id}/actions`.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrelloAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id_member_creator: String,
    #[serde(default)]
    pub member_creator: Option<TrelloMember>,
    pub data: TrelloActionData,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrelloActionData {
    #[serde(default)]
    pub text: String,
}

// --- Asana REST API --------------------------------------------------------

/// Every Asana request and response body is wrapped in `{ "data": ... }`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AsanaData<T> {
    pub data: T,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AsanaPage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_page: Option<NextPage>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NextPage {
    pub offset: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AsanaWorkspace {
    pub gid: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AsanaTeam {
    pub gid: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AsanaProject {
    pub gid: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AsanaSection {
    pub gid: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AsanaTag {
    pub gid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AsanaUser {
    pub gid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AsanaTaskRef {
    pub gid: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AsanaTask {
    pub gid: String,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub assignee: Option<AsanaUser>,
    #[serde(default)]
    pub followers: Vec<AsanaUser>,
    #[serde(default)]
    pub tags: Vec<AsanaTag>,
    #[serde(default)]
    pub parent: Option<AsanaTaskRef>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AsanaStory {
    pub gid: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_by: Option<AsanaUser>,
    #[serde(default)]
    pub resource_subtype: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AsanaAttachment {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub view_url: Option<String>,
}

// --- Asana create-request bodies -------------------------------------------

#[derive(Serialize, Debug)]
pub struct NewProject {
    pub name: String,
    pub notes: String,
    pub default_view: &'static str,
}

#[derive(Serialize, Debug)]
pub struct NewSection {
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct NewTag {
    pub name: String,
    pub workspace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

/// Also used for subtask creation: the project/membership fields are simply
/// left empty there and skipped during serialization.
#[derive(Serialize, Debug, Default)]
pub struct NewTask {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub followers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub memberships: Vec<TaskMembership>,
}

#[derive(Serialize, Debug)]
pub struct TaskMembership {
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct NewStory {
    pub text: String,
}
