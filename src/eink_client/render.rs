use super::api_types::PollResponse;

const HEADER: &str = "--- E-Ink Update ---";
const FOOTER: &str = "--------------------";

/// Lines for one screen update, or `None` when there is nothing to show.
///
/// Tasks keep the server's order.
pub fn render_lines(response: Option<&PollResponse>) -> Option<Vec<String>> {
    let data = response?.data.as_ref()?;

    let mut lines = Vec::with_capacity(data.tasks.len() + 4);
    lines.push(HEADER.to_string());
    lines.push(format!("Workspace: {}", data.workspace));
    lines.push("Tasks:".to_string());
    lines.extend(
        data.tasks
            .iter()
            .map(|task| format!("- [{}] {}", task.priority, task.title)),
    );
    lines.push(FOOTER.to_string());
    Some(lines)
}
