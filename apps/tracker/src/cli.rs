use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{ArgAction, Parser, Subcommand};

use crate::errors::ApiError;
use crate::models::{PipelineStatus, Profile, ProfilePatch, TrackedJob, TrackedJobId, TrackedJobPatch};
use crate::state::Dashboard;
use crate::tracking::{DashboardView, JobFilter, MutationOutcome, SortKey, SortOrder};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Track job applications against the Transparent Talent API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Submit a resume (.pdf, .txt or .md) to prefill your profile
    Resume { file: PathBuf },
    /// Work with tracked jobs
    Jobs {
        #[command(subcommand)]
        action: JobsCommand,
    },
    /// Show the profile of a company
    Company { company_id: i64 },
    /// List recommended jobs
    Recommendations,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Print the current profile
    Show,
    /// Update fields, e.g. `location=Lisbon desired_salary_min=90000`
    Set {
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum JobsCommand {
    /// List tracked jobs
    List {
        /// all, active_pipeline, closed_pipeline, active_posting, expired_posting
        #[arg(long, default_value = "all")]
        filter: JobFilter,
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
        /// created_at, applied_at, next_action_at or status
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long)]
        desc: bool,
    },
    /// Submit a job posting URL for analysis and start tracking it
    Submit { url: String },
    /// Move a job to another pipeline status
    Status {
        id: TrackedJobId,
        status: PipelineStatus,
    },
    /// Replace the notes of a job
    Notes { id: TrackedJobId, text: String },
    /// Mark or unmark a job as exciting
    Excite {
        id: TrackedJobId,
        #[arg(action = ArgAction::Set)]
        excited: bool,
    },
    /// Set or clear the next action of a job
    NextAction {
        id: TrackedJobId,
        /// RFC 3339 timestamp or YYYY-MM-DD
        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Stop tracking a job
    Remove { id: TrackedJobId },
}

pub async fn run(command: Command, dashboard: &Dashboard) -> Result<()> {
    match command {
        Command::Profile { action } => match action {
            ProfileCommand::Show => {
                let profile = dashboard.profile.load().await.map_err(surface)?;
                print_profile(&profile);
            }
            ProfileCommand::Set { fields } => {
                let mut patch = ProfilePatch::default();
                for field in &fields {
                    let (key, value) = field
                        .split_once('=')
                        .ok_or_else(|| anyhow!("expected key=value, got '{field}'"))?;
                    patch.set(key.trim(), value.trim()).map_err(|e| anyhow!(e))?;
                }
                let profile = dashboard.profile.save(&patch).await.map_err(surface)?;
                println!("Profile saved.");
                print_profile(&profile);
            }
        },

        Command::Resume { file } => {
            let profile = dashboard
                .profile
                .submit_resume_file(&file)
                .await
                .map_err(surface)?;
            println!("Resume submitted; profile updated.");
            print_profile(&profile);
        }

        Command::Jobs { action } => run_jobs(action, dashboard).await?,

        Command::Company { company_id } => {
            match dashboard.company_profile(company_id).await.map_err(surface)? {
                Some(company) => {
                    println!("{} (#{})", company.name, company.company_id);
                    print_field("Industry", company.industry.as_deref());
                    print_field("Size", company.size.as_deref());
                    print_field("Website", company.website.as_deref());
                    print_field("About", company.description.as_deref());
                    print_field("Culture", company.culture_summary.as_deref());
                }
                None => println!("No profile available for company {company_id}."),
            }
        }

        Command::Recommendations => {
            let jobs = dashboard.recommendations.refresh().await.map_err(surface)?;
            if jobs.is_empty() {
                println!("No recommendations yet.");
            }
            for job in jobs {
                let score = job
                    .match_score
                    .map(|s| format!("{:>3.0}%", s * 100.0))
                    .unwrap_or_else(|| "  - ".to_string());
                println!(
                    "{score}  {} at {} [{}]  {}",
                    job.title,
                    job.company_name,
                    job.location.as_deref().unwrap_or("?"),
                    job.job_url
                );
                if let Some(reason) = job.match_reason {
                    println!("      {reason}");
                }
            }
        }
    }
    Ok(())
}

async fn run_jobs(action: JobsCommand, dashboard: &Dashboard) -> Result<()> {
    let sync = &dashboard.tracked_jobs;

    let (id, patch) = match action {
        JobsCommand::Submit { url } => {
            let job = sync.create(&url).await.map_err(surface)?;
            println!("Now tracking:");
            print_job(&job);
            return Ok(());
        }
        JobsCommand::List {
            filter,
            page,
            page_size,
            sort,
            desc,
        } => {
            sync.list().await.map_err(surface)?;
            let mut view = DashboardView::new(page_size);
            view.set_filter(filter);
            view.set_page(page);
            view.set_sort(sort.map(|key| SortOrder {
                key,
                descending: desc,
            }));
            let jobs = sync.jobs().await;
            let rendered = view.render(&jobs);
            for job in &rendered.items {
                print_job(job);
            }
            println!(
                "-- page {}/{} ({} {} jobs)",
                rendered.page + 1,
                rendered.page_count.max(1),
                rendered.filtered_len,
                view.filter()
            );
            return Ok(());
        }
        JobsCommand::Remove { id } => {
            sync.list().await.map_err(surface)?;
            sync.remove(id).await.map_err(surface)?;
            println!("Stopped tracking job {id}.");
            return Ok(());
        }
        JobsCommand::Status { id, status } => (id, TrackedJobPatch::status(status)),
        JobsCommand::Notes { id, text } => (id, TrackedJobPatch::notes(text)),
        JobsCommand::Excite { id, excited } => (id, TrackedJobPatch::excited(excited)),
        JobsCommand::NextAction { id, at, notes } => (id, TrackedJobPatch::next_action(at, notes)),
    };

    // Updates merge into the loaded record, so the collection comes first.
    sync.list().await.map_err(surface)?;
    match sync.update(id, patch).await.map_err(surface)? {
        MutationOutcome::Superseded => {
            println!("Job {id} was changed again before this update landed.")
        }
        _ => {
            if let Some(job) = sync.get(id).await {
                print_job(&job);
            }
        }
    }
    Ok(())
}

fn surface(e: ApiError) -> anyhow::Error {
    anyhow!(e.user_message())
}

fn parse_when(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| format!("'{s}' is neither RFC 3339 nor YYYY-MM-DD"))
}

fn print_job(job: &TrackedJob) {
    let star = if job.is_excited { "*" } else { " " };
    let grade = job
        .ai_analysis
        .as_ref()
        .and_then(|a| a.grade.as_deref())
        .unwrap_or("-");
    println!(
        "{star}#{:<6} {:<18} {:<3} {} at {}",
        job.tracked_job_id,
        job.status.as_str(),
        grade,
        job.job.title,
        job.job.company_name
    );
    if let Some(at) = job.next_action_at {
        println!(
            "         next: {} {}",
            at.format("%Y-%m-%d"),
            job.next_action_notes.as_deref().unwrap_or("")
        );
    }
    if let Some(notes) = job.user_notes.as_deref().filter(|n| !n.is_empty()) {
        println!("         notes: {notes}");
    }
}

fn print_profile(profile: &Profile) {
    print_field("Name", profile.full_name.as_deref());
    print_field("Email", profile.email.as_deref());
    print_field("Location", profile.location.as_deref());
    print_field("Career goals", profile.career_goals.as_deref());
    print_field("Work style", profile.work_style_preferences.as_deref());
    print_field("Arrangement", profile.preferred_work_arrangement.as_deref());
    if profile.desired_salary_min.is_some() || profile.desired_salary_max.is_some() {
        let bound = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_else(|| "?".into());
        println!(
            "{:<14} {} - {} {}",
            "Salary",
            bound(profile.desired_salary_min),
            bound(profile.desired_salary_max),
            profile.salary_currency.as_deref().unwrap_or("")
        );
    }
    if let Some(relocate) = profile.willing_to_relocate {
        println!("{:<14} {}", "Relocate", if relocate { "yes" } else { "no" });
    }
}

fn print_field(label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        println!("{label:<14} {value}");
    }
}
