//! Display implementations for domain models.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{Playbook, PlaybookRun, Reminder, RunListResults, RunMetadata, TimelineEvent};

impl fmt::Display for PlaybookRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Status: {}", self.current_status)?;
        writeln!(f, "- Owner: {}", self.owner_user_id)?;
        writeln!(f, "- Team: {}", self.team_id)?;
        writeln!(f, "- Channel: {} ({})", self.channel_id, self.channel_type())?;
        if let Some(playbook_id) = &self.playbook_id {
            writeln!(f, "- Playbook: {playbook_id}")?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        if let Some(updated) = &self.last_status_update_at {
            writeln!(f, "- Last update: {}", LocalDateTime(updated))?;
        }
        if let Some(ended) = &self.ended_at {
            writeln!(f, "- Ended: {}", LocalDateTime(ended))?;
        }
        if !self.invited_user_ids.is_empty() {
            writeln!(f, "- Invited: {}", self.invited_user_ids.join(", "))?;
        }

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        for checklist in &self.checklists {
            writeln!(f, "\n## {}", checklist.title)?;
            writeln!(f)?;
            for item in &checklist.items {
                writeln!(f, "- {} {}", item.state.with_icon(), item.title)?;
            }
        }

        if let Some(latest) = self.status_posts.last() {
            writeln!(f, "\n## Latest update")?;
            writeln!(f)?;
            writeln!(
                f,
                "**{}** by {} at {}",
                latest.status,
                latest.author_user_id,
                LocalDateTime(&latest.created_at)
            )?;
            writeln!(f)?;
            writeln!(f, "{}", latest.message)?;
        }

        if !self.timeline_events.is_empty() {
            writeln!(f, "\n## Timeline")?;
            writeln!(f)?;
            for event in &self.timeline_events {
                write!(f, "{event}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- {} {}",
            LocalDateTime(&self.created_at),
            self.summary
        )
    }
}

impl fmt::Display for RunListResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disabled {
            return writeln!(f, "Playbook runs are disabled for this team.");
        }
        if self.items.is_empty() {
            return writeln!(f, "No playbook runs found.");
        }

        for run in &self.items {
            writeln!(
                f,
                "- **{}** `{}` {} (owner {}, created {})",
                run.name,
                run.id,
                run.current_status,
                run.owner_user_id,
                LocalDateTime(&run.created_at)
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "{} runs, {} pages",
            self.total_count, self.page_count
        )?;
        if self.has_more {
            write!(f, " (more available)")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for RunMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# ~{}", self.channel_name)?;
        writeln!(f)?;
        writeln!(f, "- Channel: {}", self.channel_display_name)?;
        writeln!(f, "- Team: {}", self.team_name)?;
        writeln!(f, "- Members: {}", self.num_members)?;
        writeln!(f, "- Posts: {}", self.total_posts)
    }
}

impl fmt::Display for Playbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;
        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Team: {}", self.team_id)?;
        writeln!(f, "- Channel: {}", self.channel_type())?;
        writeln!(f, "- Members: {}", self.member_ids.join(", "))?;
        if self.invite_users_enabled {
            writeln!(f, "- Invites: {}", self.invited_user_ids.join(", "))?;
        }
        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }
        for checklist in &self.checklists {
            writeln!(f, "\n## {}", checklist.title)?;
            writeln!(f)?;
            for item in &checklist.items {
                writeln!(f, "- {}", item.title)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reminder due at {}", LocalDateTime(&self.due_at))
    }
}
