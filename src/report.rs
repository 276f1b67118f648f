use chrono::NaiveDateTime;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize)]
pub struct CounselorLoad {
    pub counselor_id: String,
    pub name: String,
    pub upcoming: i64,
    pub completed: i64,
    pub available_slots: i64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct StatsSummary {
    pub clients: i64,
    pub counselors: i64,
    pub admins: i64,
    pub upcoming: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub available_slots: i64,
    pub booked_slots: i64,
    pub counselors_load: Vec<CounselorLoad>,
}

impl StatsSummary {
    pub fn total_appointments(&self) -> i64 {
        self.upcoming + self.completed + self.cancelled
    }
}

const REPORT_STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
h1{font-size:1.4rem}table{border-collapse:collapse;width:100%;margin-bottom:1.5rem}\
th,td{border:1px solid #999;padding:.35rem .6rem;text-align:left}\
th{background:#eee}.meta{color:#666;font-size:.85rem}\
@media print{body{margin:0}.no-print{display:none}}";

const AUTO_PRINT_SCRIPT: &str = "window.addEventListener('load',()=>window.print());";

fn count_table(heading: &str, rows: &[(&str, i64)]) -> Markup {
    html! {
        h2 { (heading) }
        table {
            @for (label, value) in rows {
                tr { th { (label) } td { (value) } }
            }
        }
    }
}

/// Standalone printable document. With `auto_print` the browser opens its
/// print dialog once the page loads.
pub fn render_stats_report(
    title: &str,
    stats: &StatsSummary,
    generated_at: NaiveDateTime,
    auto_print: bool,
) -> Markup {
    let generated = generated_at.format("%Y-%m-%d %H:%M").to_string();

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(REPORT_STYLE)) }
            }
            body {
                h1 { (title) }
                p.meta { "Generated " (generated) }
                (count_table("Users", &[
                    ("Clients", stats.clients),
                    ("Counselors", stats.counselors),
                    ("Administrators", stats.admins),
                ]))
                (count_table("Appointments", &[
                    ("Upcoming", stats.upcoming),
                    ("Completed", stats.completed),
                    ("Cancelled", stats.cancelled),
                    ("Total", stats.total_appointments()),
                ]))
                (count_table("Weekly slots", &[
                    ("Available", stats.available_slots),
                    ("Booked", stats.booked_slots),
                ]))
                h2 { "Counselor load" }
                table {
                    tr {
                        th { "Counselor" }
                        th { "Upcoming" }
                        th { "Completed" }
                        th { "Open slots" }
                    }
                    @if stats.counselors_load.is_empty() {
                        tr { td colspan="4" { "No counselors" } }
                    }
                    @for load in &stats.counselors_load {
                        tr {
                            td { (load.name) " (" (load.counselor_id) ")" }
                            td { (load.upcoming) }
                            td { (load.completed) }
                            td { (load.available_slots) }
                        }
                    }
                }
                @if auto_print {
                    script { (PreEscaped(AUTO_PRINT_SCRIPT)) }
                }
            }
        }
    }
}
