//! Item commands

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde_json::json;

use super::app::Session;
use crate::domain::{
    sorted, Component, Item, Priority, Project, SortKey, Status, Task, TaskBuilder, Urgent,
};
use crate::events::EventKind;
use crate::storage::{LegacyTask, Repository};

/// Tasks first, then projects, each in ID order
fn all_items(session: &Session) -> Vec<Item> {
    let repo = session.repo();
    repo.find_all_tasks()
        .into_iter()
        .map(Item::from)
        .chain(repo.find_all_projects().into_iter().map(Item::from))
        .collect()
}

fn print_items(session: &Session, heading: &str, items: &[Item]) {
    let output = session.output();
    if output.is_json() {
        output.data(&items);
        return;
    }

    if items.is_empty() {
        output.line("No items found.");
        return;
    }
    output.line(heading);
    for item in items {
        output.text(&item.display(1));
    }
}

pub fn add(
    session: &Session,
    title: &str,
    description: Option<String>,
    priority: Option<Priority>,
    status: Option<Status>,
) -> Result<()> {
    let mut builder = TaskBuilder::new(title);
    if let Some(description) = description {
        builder = builder.description(description);
    }
    if let Some(priority) = priority {
        builder = builder.priority(priority);
    }
    if let Some(status) = status {
        builder = builder.status(status);
    }
    let task = builder.build()?;
    session
        .output()
        .verbose_ctx("add", &format!("built task {}", task.id()));

    let item = Item::from(task);
    session.repo().save(item.clone())?;

    let output = session.output();
    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!("Created task {}: {}", item.id(), item.title()));
    }
    Ok(())
}

pub fn urgent(session: &Session, title: &str, description: Option<String>) -> Result<()> {
    let mut builder = TaskBuilder::new(title).priority(Priority::Critical);
    if let Some(description) = description {
        builder = builder.description(description);
    }
    let task = builder.build()?;
    session.repo().save(Item::from(task.clone()))?;

    let urgent = Urgent::new(task);
    let output = session.output();
    if output.is_json() {
        output.data(&json!({
            "urgent": true,
            "message": urgent.urgency_message(),
            "item": Item::from(urgent.inner().clone()),
        }));
    } else {
        output.success(&format!(
            "Created urgent task {}: {}",
            urgent.id(),
            urgent.title()
        ));
        output.text(&urgent.display(0));
        output.line(urgent.urgency_message());
    }
    Ok(())
}

pub fn project(
    session: &Session,
    title: &str,
    description: Option<&str>,
    task_titles: &[String],
) -> Result<()> {
    let mut project = Project::new(title, description)?;
    let repo = session.repo();

    for task_title in task_titles {
        let task = Task::new(task_title, None)?;
        let child = repo.save(task.into())?;
        project.add_component(child);
    }
    session
        .output()
        .verbose_ctx("project", &format!("{} child tasks", project.len()));

    let item = Item::from(project);
    repo.save(item.clone())?;

    let output = session.output();
    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!("Created project {}: {}", item.id(), item.title()));
        output.text(&item.display(1));
    }
    Ok(())
}

pub fn list(session: &Session) -> Result<()> {
    let items = all_items(session);
    print_items(session, &format!("Items ({}):", items.len()), &items);
    Ok(())
}

pub fn show(session: &Session, id: &str) -> Result<()> {
    let Some(item) = session.repo().find_by_id(id) else {
        bail!("Item not found: {}", id);
    };

    let output = session.output();
    if output.is_json() {
        output.data(&item);
        return Ok(());
    }

    output.line(&format!("ID:       {}", item.id()));
    output.line(&format!("Kind:     {}", item.kind()));
    output.line(&format!("Title:    {}", item.title()));
    output.line(&format!("Status:   {}", item.status().label()));
    output.line(&format!("Priority: {}", item.priority().label()));
    if let Some(description) = item.description() {
        output.line(&format!("Notes:    {}", description));
    }
    if let Some(project) = item.as_project() {
        output.line("");
        output.text(&project.display(0));
    }
    Ok(())
}

pub fn delete(session: &Session, id: &str) -> Result<()> {
    if !session.repo().delete(id) {
        bail!("Item not found: {}", id);
    }
    session.output().success(&format!("Deleted {}", id));
    Ok(())
}

pub fn set_status(session: &Session, id: &str, status: Status) -> Result<()> {
    let updated = session.repo().update(id, |item| {
        item.set_status(status);
        Ok(())
    })?;
    let Some(item) = updated else {
        bail!("Item not found: {}", id);
    };

    let output = session.output();
    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!("{} is now {}", item.id(), status.label()));
    }
    Ok(())
}

pub fn set_priority(session: &Session, id: &str, priority: Priority) -> Result<()> {
    let updated = session.repo().update(id, |item| {
        item.set_priority(priority);
        Ok(())
    })?;
    let Some(item) = updated else {
        bail!("Item not found: {}", id);
    };

    let output = session.output();
    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!(
            "{} priority is now {}",
            item.id(),
            item.priority().label()
        ));
    }
    Ok(())
}

pub fn sort(session: &Session, key: Option<SortKey>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => session.config().sort_key()?,
    };
    let strategy = key.strategy();
    let items = sorted(strategy, &all_items(session));

    let output = session.output();
    if output.is_json() {
        output.data(&json!({
            "strategy": key.as_str(),
            "items": items,
        }));
    } else {
        print_items(session, &format!("{}:", strategy.name()), &items);
    }
    Ok(())
}

pub fn filter(session: &Session, status: Status) -> Result<()> {
    let items: Vec<Item> = all_items(session)
        .into_iter()
        .filter(|item| item.status() == status)
        .collect();
    print_items(
        session,
        &format!("Items with status {}:", status.label()),
        &items,
    );
    Ok(())
}

pub fn stats(session: &Session) -> Result<()> {
    let counts = session.repo().stats();
    let items = all_items(session);

    let mut by_status: BTreeMap<u8, (Status, usize)> = Status::ALL
        .iter()
        .map(|status| (status.rank(), (*status, 0)))
        .collect();
    for item in &items {
        if let Some(entry) = by_status.get_mut(&item.status().rank()) {
            entry.1 += 1;
        }
    }

    let output = session.output();
    if output.is_json() {
        let statuses: BTreeMap<&str, usize> = by_status
            .values()
            .map(|(status, count)| (status.as_str(), *count))
            .collect();
        output.data(&json!({
            "total": counts.total,
            "tasks": counts.tasks,
            "projects": counts.projects,
            "by_status": statuses,
        }));
        return Ok(());
    }

    output.line(&format!("Total items: {}", counts.total));
    output.line(&format!("  Tasks:    {}", counts.tasks));
    output.line(&format!("  Projects: {}", counts.projects));
    output.line("By status:");
    for (status, count) in by_status.values() {
        output.line(&format!("  {:<12} {}", status.label(), count));
    }
    Ok(())
}

pub fn export(session: &Session) -> Result<()> {
    let records: Vec<LegacyTask> = session
        .repo()
        .find_all_tasks()
        .iter()
        .map(LegacyTask::from)
        .collect();

    let output = session.output();
    if output.is_json() {
        output.data(&records);
    } else if records.is_empty() {
        output.line("No tasks to export.");
    } else {
        for record in &records {
            output.line(&record.to_string());
        }
    }
    Ok(())
}

pub fn clear(session: &Session) -> Result<()> {
    let repo = session.repo();
    repo.clear()?;

    let store = repo.inner();
    store.flush()?;
    store
        .notifier()
        .notify(EventKind::Cleared, "All items cleared", "SYSTEM");

    session.output().success("Cleared all items");
    Ok(())
}
