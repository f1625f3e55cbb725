use crate::asana::Asana;
use crate::config::Config;
use crate::trello::Trello;
use crate::types::{
    AsanaProject, AsanaTask, NewProject, NewTag, NewTask, TaskMembership, TrelloAction,
    TrelloAttachment, TrelloBoard, TrelloChecklist,
};
use crate::{export, http};
use itertools::Itertools;
use regex::Regex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error;
use std::path::PathBuf;

lazy_static::lazy_static! {
    /// Trello label color -> Asana tag color.
    static ref LABEL_COLORS: HashMap<&'static str, &'static str> = HashMap::from([
        ("green", "light-green"),
        ("yellow", "light-yellow"),
        ("orange", "dark-orange"),
        ("red", "light-red"),
        ("purple", "dark-purple"),
        ("blue", "dark-blue"),
        ("sky", "light-blue"),
        ("lime", "light-orange"),
        ("pink", "light-pink"),
        ("black", "dark-warm-gray"),
    ]);

    static ref RX_POSTFIX: Regex = Regex::new(r" \(([0-9]+)\)$").unwrap();
}

/// Distinguishes a finished run from an early return that only printed the
/// listings the operator needs to fill in the config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    NeedsConfig,
}

/// Re-creates each exported Trello board as an Asana project in the
/// configured team.
pub async fn import_boards(
    asana: &Asana,
    trello: Option<&Trello>,
    config: &Config,
    files: &[PathBuf],
    only_members: bool,
) -> Result<Outcome, Box<dyn Error>> {
    let Some(workspace) = require_workspace(asana, config).await? else {
        return Ok(Outcome::NeedsConfig);
    };
    let Some(team) = require_team(asana, config, workspace).await? else {
        return Ok(Outcome::NeedsConfig);
    };

    let boards = files
        .iter()
        .map(|path| export::load_board(path))
        .collect::<Result<Vec<_>, _>>()?;

    if only_members {
        println!("Trello Users");
        println!("<username>: <full name>");
        for member in boards
            .iter()
            .flat_map(|board| &board.members)
            .unique_by(|member| member.id.as_str())
        {
            println!("{}: {}", member.username, member.full_name);
        }
        println!();
        println!("Asana Users");
        println!("<gid>: <name>");
        for user in asana.fetch_users(workspace).await? {
            println!("{}: {}", user.gid, user.name);
        }
        return Ok(Outcome::Completed);
    }

    let mut taken: Vec<String> = asana
        .fetch_projects(team)
        .await?
        .into_iter()
        .map(|project| project.name)
        .collect();
    let user_names: HashMap<String, String> = asana
        .fetch_users(workspace)
        .await?
        .into_iter()
        .map(|user| (user.gid, user.name))
        .collect();

    for board in &boards {
        import_board(asana, trello, config, workspace, team, &mut taken, &user_names, board)
            .await?;
    }
    Ok(Outcome::Completed)
}

#[allow(clippy::too_many_arguments)]
async fn import_board(
    asana: &Asana,
    trello: Option<&Trello>,
    config: &Config,
    workspace: &str,
    team: &str,
    taken: &mut Vec<String>,
    user_names: &HashMap<String, String>,
    board: &TrelloBoard,
) -> Result<(), Box<dyn Error>> {
    let project = asana
        .create_project(
            team,
            &NewProject {
                name: unique_project_name(&board.name, taken),
                notes: board.desc.clone(),
                default_view: "board",
            },
        )
        .await?;
    println!("Created {} project in your team.", project.name);
    taken.push(project.name.clone());

    // Sections in list order, so the board columns come out the same way.
    let mut section_map: HashMap<&str, String> = HashMap::new();
    for list in &board.lists {
        let section = asana.create_section(&project.gid, &list.name).await?;
        println!("Created {} section.", list.name);
        section_map.insert(list.id.as_str(), section.gid);
    }

    // Tags are independent of each other, so they go out in polite batches.
    let futures: Vec<_> = board
        .labels
        .iter()
        .map(|label| {
            let tag = NewTag {
                name: label.name.clone(),
                workspace: workspace.to_string(),
                color: label
                    .color
                    .as_deref()
                    .and_then(|color| LABEL_COLORS.get(color).copied()),
            };
            async move { asana.create_tag(&tag).await }
        })
        .collect();
    let tags = http::politely_try_join_all(futures, 8, 250).await?;
    let mut tag_map: HashMap<&str, String> = HashMap::new();
    for (label, tag) in board.labels.iter().zip(tags) {
        tag_map.insert(label.id.as_str(), tag.gid);
    }

    let checklist_map: HashMap<&str, &TrelloChecklist> = board
        .checklists
        .iter()
        .map(|checklist| (checklist.id.as_str(), checklist))
        .collect();

    println!("Creating {} parent tasks...", board.cards.len());
    let mut task_map: HashMap<&str, String> = HashMap::new();
    let mut warned_no_trello = false;
    for card in &board.cards {
        let body = NewTask {
            name: card.name.clone(),
            notes: Some(card.desc.clone()),
            due_at: card.due.clone(),
            assignee: card
                .id_members
                .first()
                .and_then(|id| config.member.get(id).cloned()),
            completed: None,
            followers: if card.id_members.len() > 1 {
                card.id_members
                    .iter()
                    .filter_map(|id| config.member.get(id).cloned())
                    .collect()
            } else {
                vec![]
            },
            tags: card
                .id_labels
                .iter()
                .filter_map(|id| tag_map.get(id.as_str()).cloned())
                .collect(),
            projects: vec![project.gid.clone()],
            memberships: vec![TaskMembership {
                project: project.gid.clone(),
                section: section_map.get(card.id_list.as_str()).cloned(),
            }],
        };
        let task = asana.create_task(&body).await?;
        task_map.insert(card.id.as_str(), task.gid.clone());
        if task_map.len() % 10 == 0 {
            println!("{}...", task_map.len());
        }

        // Asana inserts new subtasks at the top, so checklists, their items
        // and the trailing name header all go in reversed.
        for checklist_id in card.id_checklists.iter().rev() {
            let Some(checklist) = checklist_map.get(checklist_id.as_str()) else {
                continue;
            };
            for item in checklist.check_items.iter().rev() {
                let subtask = NewTask {
                    name: item.name.clone(),
                    completed: Some(item.state != "incomplete"),
                    ..Default::default()
                };
                asana.create_subtask(&task.gid, &subtask).await?;
            }
            let header = NewTask {
                name: format!("{}:", checklist.name),
                ..Default::default()
            };
            asana.create_subtask(&task.gid, &header).await?;
        }

        if card.badges.comments > 0 {
            match trello {
                Some(trello) => {
                    let comments = trello.fetch_card_comments(&card.id).await?;
                    for comment in comments.iter().rev() {
                        let author = comment_author(comment, &config.member, user_names);
                        let text = format!("{}: {} from Trello", author, comment.data.text);
                        asana.add_comment(&task.gid, &text).await?;
                    }
                }
                None if !warned_no_trello => {
                    println!("No Trello credentials in config; skipping comment copy.");
                    warned_no_trello = true;
                }
                None => {}
            }
        }

        for attachment in &card.attachments {
            let filename = attachment_filename(attachment);
            if let Err(reason) = asana
                .upload_attachment(&task.gid, &attachment.url, filename)
                .await
            {
                println!("Failed to upload attachment: {}", reason);
            }
        }
    }
    println!("Created {} tasks in {}.", task_map.len(), project.name);
    Ok(())
}

/// Copies the tasks of one Asana project into another, subtree by subtree.
pub async fn copy_tasks(
    asana: &Asana,
    config: &Config,
    from: Option<&str>,
    to: Option<&str>,
    section: Option<&str>,
    start_at: Option<&str>,
) -> Result<Outcome, Box<dyn Error>> {
    let Some(workspace) = require_workspace(asana, config).await? else {
        return Ok(Outcome::NeedsConfig);
    };
    let Some(team) = require_team(asana, config, workspace).await? else {
        return Ok(Outcome::NeedsConfig);
    };
    let (from, to) = match (from, to) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            println!("You should select origin and target projects. (from, to)");
            println!("<gid>: <name>");
            for project in asana.fetch_projects(team).await? {
                println!("{}: {}", project.gid, project.name);
            }
            return Ok(Outcome::NeedsConfig);
        }
    };

    let projects = asana.fetch_projects(team).await?;
    let from_gid = resolve_project(&projects, from)?;
    let to_gid = resolve_project(&projects, to)?;

    let tasks = match section {
        Some(section) => {
            let sections = asana.fetch_sections(&from_gid).await?;
            let matched = sections
                .iter()
                .find(|candidate| candidate.gid == section || candidate.name == section)
                .ok_or_else(|| format!("No section {} in the origin project!", section))?;
            asana.fetch_section_tasks(&matched.gid).await?
        }
        None => asana.fetch_project_tasks(&from_gid).await?,
    };
    let tasks = resume_from(tasks, start_at)?;
    let trees = group_by_parent(tasks);

    println!("Copying {} parent tasks...", trees.len());
    let mut copied = 0;
    for tree in &trees {
        copied += copy_tree(asana, &to_gid, tree).await?;
    }
    println!("Copied {} tasks into the target project.", copied);
    Ok(Outcome::Completed)
}

async fn copy_tree(asana: &Asana, to_gid: &str, tree: &TaskTree) -> Result<usize, Box<dyn Error>> {
    let root = asana.create_task(&copy_body(&tree.task, Some(to_gid))).await?;
    copy_task_extras(asana, &tree.task, &root.gid).await?;
    let mut copied = 1;

    let mut queue: VecDeque<(String, &TaskTree)> = tree
        .children
        .iter()
        .map(|child| (root.gid.clone(), child))
        .collect();
    while let Some((parent_gid, node)) = queue.pop_front() {
        let created = asana
            .create_subtask(&parent_gid, &copy_body(&node.task, None))
            .await?;
        copy_task_extras(asana, &node.task, &created.gid).await?;
        copied += 1;
        for child in &node.children {
            queue.push_back((created.gid.clone(), child));
        }
    }
    Ok(copied)
}

async fn copy_task_extras(
    asana: &Asana,
    source: &AsanaTask,
    target_gid: &str,
) -> Result<(), Box<dyn Error>> {
    for attachment in asana.fetch_attachments(&source.gid).await? {
        let Some(url) = attachment
            .download_url
            .as_deref()
            .or(attachment.view_url.as_deref())
        else {
            continue;
        };
        if let Err(reason) = asana
            .upload_attachment(target_gid, url, &attachment.name)
            .await
        {
            println!("Failed to upload attachment: {}", reason);
        }
    }

    let stories = asana.fetch_stories(&source.gid).await?;
    for story in stories
        .iter()
        .filter(|story| story.resource_subtype.as_deref() == Some("comment_added"))
    {
        let author = story
            .created_by
            .as_ref()
            .map(|user| user.name.as_str())
            .unwrap_or("Unknown");
        asana
            .add_comment(target_gid, &format!("{}: {}", author, story.text))
            .await?;
    }
    Ok(())
}

async fn require_workspace<'a>(
    asana: &Asana,
    config: &'a Config,
) -> Result<Option<&'a str>, Box<dyn Error>> {
    match &config.asana.workspace {
        Some(gid) => Ok(Some(gid.as_str())),
        None => {
            println!("You should select your workspace in asana.");
            println!("<gid>: <name>");
            for workspace in asana.fetch_workspaces().await? {
                println!("{}: {}", workspace.gid, workspace.name);
            }
            Ok(None)
        }
    }
}

async fn require_team<'a>(
    asana: &Asana,
    config: &'a Config,
    workspace: &str,
) -> Result<Option<&'a str>, Box<dyn Error>> {
    match &config.asana.team {
        Some(gid) => Ok(Some(gid.as_str())),
        None => {
            println!("You should select a team in asana.");
            println!("<gid>: <name>");
            for team in asana.fetch_teams(workspace).await? {
                println!("{}: {}", team.gid, team.name);
            }
            Ok(None)
        }
    }
}

pub struct TaskTree {
    pub task: AsanaTask,
    pub children: Vec<TaskTree>,
}

/// Rebuilds the subtask hierarchy from a flat listing, whatever order the
/// tasks came back in. Tasks whose parent is outside the listing are dropped.
pub fn group_by_parent(tasks: Vec<AsanaTask>) -> Vec<TaskTree> {
    let known: HashSet<String> = tasks.iter().map(|task| task.gid.clone()).collect();
    let mut children_of: HashMap<String, Vec<AsanaTask>> = HashMap::new();
    let mut roots = vec![];
    for task in tasks {
        match task.parent.as_ref().map(|parent| parent.gid.clone()) {
            None => roots.push(task),
            Some(gid) if known.contains(&gid) => {
                children_of.entry(gid).or_default().push(task)
            }
            Some(_) => {}
        }
    }
    roots
        .into_iter()
        .map(|root| attach_children(root, &mut children_of))
        .collect()
}

fn attach_children(task: AsanaTask, children_of: &mut HashMap<String, Vec<AsanaTask>>) -> TaskTree {
    let children = children_of.remove(&task.gid).unwrap_or_default();
    TaskTree {
        children: children
            .into_iter()
            .map(|child| attach_children(child, children_of))
            .collect(),
        task,
    }
}

/// Keeps the task with the marker gid and everything after it.
pub fn resume_from(
    tasks: Vec<AsanaTask>,
    start_at: Option<&str>,
) -> Result<Vec<AsanaTask>, Box<dyn Error>> {
    let Some(marker) = start_at else {
        return Ok(tasks);
    };
    let position = tasks
        .iter()
        .position(|task| task.gid == marker)
        .ok_or_else(|| format!("No task {} in the origin project!", marker))?;
    Ok(tasks.into_iter().skip(position).collect())
}

pub fn resolve_project(projects: &[AsanaProject], wanted: &str) -> Result<String, Box<dyn Error>> {
    projects
        .iter()
        .find(|project| project.gid == wanted || project.name == wanted)
        .map(|project| project.gid.clone())
        .ok_or_else(|| format!("No project {} in the team!", wanted).into())
}

/// Disambiguates against existing project names: `Name` becomes `Name (1)`,
/// and an existing ` (N)` suffix increments until the name is free.
pub fn unique_project_name(name: &str, taken: &[String]) -> String {
    if !taken.iter().any(|existing| existing == name) {
        return name.to_string();
    }
    let (pure_name, number) = match RX_POSTFIX.captures(name) {
        Some(captures) => {
            let number: u32 = captures[1].parse().unwrap_or(0);
            (RX_POSTFIX.replace(name, "").into_owned(), number + 1)
        }
        None => (name.to_string(), 1),
    };
    unique_project_name(&format!("{} ({})", pure_name, number), taken)
}

fn comment_author(
    comment: &TrelloAction,
    member_map: &HashMap<String, String>,
    user_names: &HashMap<String, String>,
) -> String {
    member_map
        .get(&comment.id_member_creator)
        .and_then(|gid| user_names.get(gid))
        .cloned()
        .or_else(|| {
            comment
                .member_creator
                .as_ref()
                .map(|member| member.full_name.clone())
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

fn attachment_filename(attachment: &TrelloAttachment) -> &str {
    let base = attachment.url.rsplit('/').next().unwrap_or_default();
    if base.is_empty() {
        &attachment.name
    } else {
        base
    }
}

fn copy_body(task: &AsanaTask, project_gid: Option<&str>) -> NewTask {
    NewTask {
        name: task.name.clone(),
        notes: task.notes.clone(),
        due_at: task.due_at.clone(),
        assignee: task.assignee.as_ref().map(|user| user.gid.clone()),
        completed: task.completed.then_some(true),
        followers: task.followers.iter().map(|user| user.gid.clone()).collect(),
        tags: task.tags.iter().map(|tag| tag.gid.clone()).collect(),
        projects: project_gid.map(|gid| vec![gid.to_string()]).unwrap_or_default(),
        memberships: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AsanaTaskRef, AsanaUser, TrelloActionData, TrelloMember};

    fn task(gid: &str, parent: Option<&str>) -> AsanaTask {
        AsanaTask {
            gid: gid.to_string(),
            name: format!("Task {}", gid),
            notes: None,
            completed: false,
            assignee: None,
            followers: vec![],
            tags: vec![],
            parent: parent.map(|gid| AsanaTaskRef {
                gid: gid.to_string(),
            }),
            due_at: None,
            created_at: None,
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn unique_name_passes_through_without_collision() {
        assert_eq!(unique_project_name("Roadmap", &names(&["Other"])), "Roadmap");
    }

    #[test]
    fn unique_name_appends_a_counter_on_collision() {
        assert_eq!(
            unique_project_name("Roadmap", &names(&["Roadmap"])),
            "Roadmap (1)"
        );
    }

    #[test]
    fn unique_name_increments_until_free() {
        let taken = names(&["Roadmap", "Roadmap (1)", "Roadmap (2)"]);
        assert_eq!(unique_project_name("Roadmap", &taken), "Roadmap (3)");
    }

    #[test]
    fn unique_name_increments_an_existing_suffix() {
        let taken = names(&["Roadmap (4)"]);
        assert_eq!(unique_project_name("Roadmap (4)", &taken), "Roadmap (5)");
    }

    #[test]
    fn grouping_survives_children_before_parents() {
        let trees = group_by_parent(vec![task("2", Some("1")), task("1", None)]);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].task.gid, "1");
        assert_eq!(trees[0].children.len(), 1);
        assert_eq!(trees[0].children[0].task.gid, "2");
    }

    #[test]
    fn grouping_drops_children_of_unknown_parents() {
        let trees = group_by_parent(vec![task("3", Some("404")), task("1", None)]);
        assert_eq!(trees.len(), 1);
        assert!(trees[0].children.is_empty());
    }

    #[test]
    fn grouping_nests_grandchildren() {
        let trees = group_by_parent(vec![
            task("1", None),
            task("3", Some("2")),
            task("2", Some("1")),
        ]);
        assert_eq!(trees.len(), 1);
        let child = &trees[0].children[0];
        assert_eq!(child.task.gid, "2");
        assert_eq!(child.children[0].task.gid, "3");
    }

    #[test]
    fn resume_keeps_the_marker_and_the_rest() {
        let tasks = vec![task("1", None), task("2", None), task("3", None)];
        let resumed = resume_from(tasks, Some("2")).unwrap();
        let gids: Vec<_> = resumed.iter().map(|task| task.gid.as_str()).collect();
        assert_eq!(gids, vec!["2", "3"]);
    }

    #[test]
    fn resume_without_marker_keeps_everything() {
        let tasks = vec![task("1", None), task("2", None)];
        assert_eq!(resume_from(tasks, None).unwrap().len(), 2);
    }

    #[test]
    fn resume_with_unknown_marker_fails() {
        let tasks = vec![task("1", None)];
        assert!(resume_from(tasks, Some("404")).is_err());
    }

    #[test]
    fn projects_resolve_by_gid_or_name() {
        let projects = vec![
            AsanaProject {
                gid: "10".to_string(),
                name: "Roadmap".to_string(),
            },
            AsanaProject {
                gid: "11".to_string(),
                name: "Backlog".to_string(),
            },
        ];
        assert_eq!(resolve_project(&projects, "11").unwrap(), "11");
        assert_eq!(resolve_project(&projects, "Roadmap").unwrap(), "10");
        assert!(resolve_project(&projects, "Missing").is_err());
    }

    #[test]
    fn comment_author_prefers_the_member_mapping() {
        let comment = TrelloAction {
            kind: "commentCard".to_string(),
            id_member_creator: "m1".to_string(),
            member_creator: Some(TrelloMember {
                id: "m1".to_string(),
                username: "kim".to_string(),
                full_name: "Kim from Trello".to_string(),
            }),
            data: TrelloActionData {
                text: "hello".to_string(),
            },
        };
        let member_map = HashMap::from([("m1".to_string(), "u9".to_string())]);
        let user_names = HashMap::from([("u9".to_string(), "Kim in Asana".to_string())]);
        assert_eq!(
            comment_author(&comment, &member_map, &user_names),
            "Kim in Asana"
        );
        assert_eq!(
            comment_author(&comment, &HashMap::new(), &user_names),
            "Kim from Trello"
        );
    }

    #[test]
    fn attachment_filenames_come_from_the_url() {
        let attachment = TrelloAttachment {
            name: "fallback.png".to_string(),
            url: "https://files.example/boards/b1/trace.png".to_string(),
        };
        assert_eq!(attachment_filename(&attachment), "trace.png");

        let trailing_slash = TrelloAttachment {
            name: "fallback.png".to_string(),
            url: "https://files.example/boards/b1/".to_string(),
        };
        assert_eq!(attachment_filename(&trailing_slash), "fallback.png");
    }

    #[test]
    fn copy_body_carries_the_references_over() {
        let mut source = task("5", None);
        source.completed = true;
        source.assignee = Some(AsanaUser {
            gid: "u1".to_string(),
            name: "Kim".to_string(),
        });
        source.followers = vec![AsanaUser {
            gid: "u2".to_string(),
            name: "Sam".to_string(),
        }];
        let body = copy_body(&source, Some("77"));
        assert_eq!(body.name, "Task 5");
        assert_eq!(body.completed, Some(true));
        assert_eq!(body.assignee.as_deref(), Some("u1"));
        assert_eq!(body.followers, vec!["u2"]);
        assert_eq!(body.projects, vec!["77"]);

        let subtask_body = copy_body(&task("6", Some("5")), None);
        assert!(subtask_body.projects.is_empty());
        assert_eq!(subtask_body.completed, None);
    }
}
