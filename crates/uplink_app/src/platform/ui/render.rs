use uplink_core::{AppViewModel, JobView, TaskCardView, UploadView};

const BAR_WIDTH: usize = 30;

/// Lines that are printed together whenever any of them changes.
pub type Block = Vec<String>;

/// Projects the view model into terminal blocks. Pure; safe to call on every update.
///
/// The whole job (header, every task card, monitor line) is one block, so a
/// new snapshot is always shown in full. Relative download links are shown
/// against `server` so they can be opened directly.
pub fn render(view: &AppViewModel, server: &str) -> Vec<Block> {
    let mut blocks = render_upload(&view.upload);
    if let Some(notice) = &view.notice {
        blocks.push(vec![format!("! {notice}")]);
    }
    if let Some(job) = &view.job {
        blocks.push(render_job(job, server));
    }
    blocks
}

fn render_upload(upload: &UploadView) -> Vec<Block> {
    let mut blocks = vec![vec![upload.status_text.clone()]];
    if !upload.visible {
        return blocks;
    }
    if let Some(percent) = upload.percent {
        blocks.push(vec![progress_bar(percent)]);
    }
    if let Some(detail) = &upload.detail {
        blocks.push(vec![format!("  server said: {detail}")]);
    }
    blocks
}

fn render_job(job: &JobView, server: &str) -> Block {
    let mut lines = vec![format!(
        "Job {id} ({file})",
        id = job.job_id,
        file = job.original_filename
    )];
    lines.extend(job.tasks.iter().map(|task| format_task_card(task, server)));
    lines.push(job.monitor_text.clone());
    lines
}

fn format_task_card(task: &TaskCardView, server: &str) -> String {
    let mut line = format!("  {} [{}]", task.label, task.badge);
    if let Some(url) = &task.download_url {
        line.push_str(&format!("  download: {}", absolute_link(server, url)));
    }
    if let Some(detail) = &task.detail {
        line.push_str(&format!("  ({detail})"));
    }
    line
}

fn progress_bar(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent
    )
}

fn absolute_link(server: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{}{}", server.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}
