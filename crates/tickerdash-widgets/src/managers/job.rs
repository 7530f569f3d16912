//! Progress text for backend jobs reported on the push channel.

use tickerdash_push::PushEvent;

/// What a job event means for the widget that started the job.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JobUpdate {
    Progress(String),
    Finished { text: String, success: bool },
}

/// Interpret `event` if it belongs to `job`.
pub(crate) fn job_update(event: &PushEvent, job: &str) -> Option<JobUpdate> {
    if event.job() != Some(job) {
        return None;
    }
    match event {
        PushEvent::UpdateProgress {
            progress, message, ..
        } => {
            let pct = progress.clamp(0.0, 100.0);
            let text = match message.as_deref().filter(|m| !m.is_empty()) {
                Some(m) => format!("Running: {pct:.0}% - {m}"),
                None => format!("Running: {pct:.0}%"),
            };
            Some(JobUpdate::Progress(text))
        }
        PushEvent::UpdateComplete {
            success, message, ..
        } => {
            let detail = message.as_deref().filter(|m| !m.is_empty());
            let text = match (success, detail) {
                (true, Some(m)) => format!("Completed: {m}"),
                (true, None) => "Completed".to_string(),
                (false, Some(m)) => format!("Failed: {m}"),
                (false, None) => "Failed".to_string(),
            };
            Some(JobUpdate::Finished {
                text,
                success: *success,
            })
        }
        _ => None,
    }
}
