use pricebatch_core::{AppViewModel, JobRowView, Notice, StatusKind};

/// `3 valid URLs detected`, plus the over-cap warning when input was truncated.
pub fn input_summary(view: &AppViewModel) -> String {
    let plural = if view.detected_urls == 1 { "" } else { "s" };
    let mut line = format!("{} valid URL{plural} detected", view.detected_urls);
    if view.over_cap {
        line.push_str(&format!(
            " (Max {} URLs, only the first {} will be processed)",
            view.max_urls, view.max_urls
        ));
    }
    line
}

pub fn notice_line(notice: &Notice) -> String {
    format!("{}: {}", notice.title(), notice.description())
}

pub fn job_rows(view: &AppViewModel) -> Vec<String> {
    view.jobs.iter().map(format_job_row).collect()
}

fn format_job_row(job: &JobRowView) -> String {
    let mut row = format!("[#{}] {:<10} {}", job.job_id, job.status.to_string(), job.url);
    if let Some(platform) = job.platform {
        row.push_str(&format!(" ({platform})"));
    }
    match job.status {
        StatusKind::Succeeded => {
            if let Some(price) = job.predicted_price {
                row.push_str(&format!(" ${}", format_price(price)));
            }
        }
        StatusKind::Failed => {
            if let Some(err) = &job.error {
                row.push_str(&format!(" - {err}"));
            }
        }
        StatusKind::Pending | StatusKind::Processing => {}
    }
    row
}

/// Rounds to whole currency units and groups thousands with commas.
pub fn format_price(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        out.push('-');
    }
    out.chars().rev().collect()
}
