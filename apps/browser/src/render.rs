use client_core::{DetailView, FormPhase, ListView, ServerTiming};

pub fn list_screen(view: &ListView, timing: &ServerTiming) -> String {
    let mut lines = vec!["== Catalog ==".to_string()];
    lines.extend(timing.render());

    match view {
        ListView::Loading => lines.push("Loading...".to_string()),
        ListView::Empty => lines.push("No users on this page.".to_string()),
        ListView::Failed(err) => lines.push(format!("Could not load users: {err}")),
        ListView::Entries {
            rows,
            last_request_failed,
        } => {
            if *last_request_failed {
                lines.push("(refresh failed, showing the last loaded page)".to_string());
            }
            lines.extend(rows.iter().map(|row| {
                format!(
                    "{:>4}. {} <{}> [{}] id={}",
                    row.serial,
                    row.user.name,
                    row.user.display_email(),
                    row.user.role.label(),
                    row.user.id
                )
            }));
        }
    }
    lines.join("\n")
}

pub fn form_panel(phase: &FormPhase, created_latency: Option<String>) -> Option<String> {
    let lines = match phase {
        FormPhase::Closed => return None,
        FormPhase::Input(fields) => vec![
            "-- New user --".to_string(),
            format!("name:  {}", fields.name),
            format!("email: {}", fields.email),
        ],
        FormPhase::Submitting(fields) => vec![format!("Creating {}...", fields.name)],
        FormPhase::ResultShown(outcome) => {
            let mut lines = vec![format!(
                "{} has been successfully indexed.",
                outcome.entity.name
            )];
            lines.extend(created_latency.map(|latency| format!("Execution time: {latency}")));
            lines.push("view | another | close".to_string());
            lines
        }
    };
    Some(lines.join("\n"))
}

pub fn detail_screen(view: &DetailView, timing: &ServerTiming) -> String {
    let mut lines = Vec::new();
    match view {
        DetailView::Loading => lines.push("Loading profile...".to_string()),
        DetailView::NotFound(id) => {
            lines.push("SYSTEM FAILURE".to_string());
            lines.push(format!("ERROR 404: USER_ID NOT FOUND IN SECTOR {id}"));
            lines.push("back to return".to_string());
        }
        DetailView::Profile(profile) => {
            lines.extend(timing.render());
            lines.push(format!(
                "{} [{}]",
                profile.user.name,
                profile.user.role.label()
            ));
            let copied = if profile.copied { "  Copied!" } else { "" };
            lines.push(format!("id:    {}{copied}", profile.user.id));
            lines.push(format!("email: {}", profile.email));
            lines.push(format!("bio:   {}", profile.bio));
            if profile.deleting {
                lines.push("Deleting...".to_string());
            }
        }
    }
    lines.join("\n")
}
