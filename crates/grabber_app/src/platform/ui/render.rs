use grabber_core::{AppViewModel, StatusTone};

/// Terminal lines for the current view.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!("[{}] {}", tone_label(view), view.status_text)];
    if let Some(path) = &view.archive_path {
        lines.push(format!("Archive: {path}"));
    }
    lines
}

fn tone_label(view: &AppViewModel) -> String {
    match view.tone {
        StatusTone::Idle => "idle".to_string(),
        StatusTone::Downloading => format!("{:>3}%", view.percent),
        StatusTone::Zipping => "zip".to_string(),
        StatusTone::Complete => "done".to_string(),
        StatusTone::Warning => "warn".to_string(),
        StatusTone::Error => "error".to_string(),
    }
}
