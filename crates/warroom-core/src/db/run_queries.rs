//! Playbook run persistence and the authorization-aware list query.

use rusqlite::{params, OptionalExtension, Row, Transaction};

use super::{json_column, optional_timestamp_column, timestamp_column, timestamp_text};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{PlaybookRun, RequesterInfo, RunFilter, TimelineEvent},
};

const RUN_COLUMNS: &str = "id, name, description, owner_user_id, team_id, channel_id, \
     channel_public, post_id, playbook_id, current_status, checklists, invited_user_ids, \
     invited_group_ids, created_at, ended_at, last_status_update_at";

const INSERT_RUN_SQL: &str = "INSERT INTO playbook_runs (id, name, description, owner_user_id, \
     team_id, channel_id, channel_public, post_id, playbook_id, current_status, checklists, \
     invited_user_ids, invited_group_ids, created_at, ended_at, last_status_update_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";
const SELECT_RUN_ID_FOR_CHANNEL_SQL: &str = "SELECT id FROM playbook_runs WHERE channel_id = ?1";
pub(super) const INSERT_TIMELINE_EVENT_SQL: &str = "INSERT INTO timeline_events (id, run_id, \
     event_type, summary, details, subject_user_id, created_at, seq) VALUES (?1, ?2, ?3, ?4, ?5, \
     ?6, ?7, (SELECT COALESCE(MAX(seq), 0) + 1 FROM timeline_events WHERE run_id = ?2))";
const SELECT_TIMELINE_EVENTS_SQL: &str = "SELECT id, run_id, event_type, summary, details, \
     subject_user_id, created_at FROM timeline_events WHERE run_id = ?1 ORDER BY seq";

/// Visibility rule shared with [`crate::access::AccessResolver`]: admins see
/// everything, members of the channel see the run, and public channels are
/// visible to whoever can list the team's channels.
const VISIBLE_TO_REQUESTER_SQL: &str = "(?1 = 1 \
     OR channel_id IN (SELECT value FROM json_each(?2)) \
     OR (channel_public = 1 AND ?3 = 1))";

impl super::Database {
    /// Stores a new run together with its initial timeline events.
    pub fn create_run(&mut self, run: &PlaybookRun) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        tx.execute(
            INSERT_RUN_SQL,
            params![
                &run.id,
                &run.name,
                &run.description,
                &run.owner_user_id,
                &run.team_id,
                &run.channel_id,
                run.channel_public,
                run.post_id.as_deref(),
                run.playbook_id.as_deref(),
                &run.current_status,
                serde_json::to_string(&run.checklists)?,
                serde_json::to_string(&run.invited_user_ids)?,
                serde_json::to_string(&run.invited_group_ids)?,
                timestamp_text(run.created_at),
                run.ended_at.map(timestamp_text),
                run.last_status_update_at.map(timestamp_text),
            ],
        )
        .db_context("Failed to insert playbook run")?;

        for event in &run.timeline_events {
            insert_timeline_event(&tx, event)?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(())
    }

    /// Retrieves a run with its status posts and timeline.
    pub fn get_run(&self, id: &str) -> Result<Option<PlaybookRun>> {
        let query = format!("SELECT {RUN_COLUMNS} FROM playbook_runs WHERE id = ?1");
        let run = self
            .connection
            .query_row(&query, params![id], run_from_row)
            .optional()
            .db_context("Failed to query playbook run")?;

        run.map(|run| self.hydrate(run)).transpose()
    }

    /// Finds the run bound to a channel.
    pub fn get_run_id_for_channel(&self, channel_id: &str) -> Result<Option<String>> {
        self.connection
            .query_row(SELECT_RUN_ID_FOR_CHANNEL_SQL, params![channel_id], |row| {
                row.get(0)
            })
            .optional()
            .db_context("Failed to query playbook run by channel")
    }

    /// Lists one page of runs the requester can view, plus the total count of
    /// matching runs.
    pub fn list_runs(
        &self,
        filter: &RunFilter,
        requester: &RequesterInfo,
    ) -> Result<(Vec<PlaybookRun>, u64)> {
        let mut conditions = vec!["team_id = ?4".to_string(), VISIBLE_TO_REQUESTER_SQL.to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![
            Box::new(requester.is_admin),
            Box::new(serde_json::to_string(&requester.readable_channel_ids)?),
            Box::new(requester.can_list_team_channels),
            Box::new(filter.team_id.clone()),
        ];

        if let Some(ref owner) = filter.owner_user_id {
            params_vec.push(Box::new(owner.clone()));
            conditions.push(format!("owner_user_id = ?{}", params_vec.len()));
        }

        if let Some(ref status) = filter.status {
            params_vec.push(Box::new(status.clone()));
            conditions.push(format!("current_status = ?{}", params_vec.len()));
        }

        if let Some(ref term) = filter.search_term {
            params_vec.push(Box::new(contains_pattern(term)));
            conditions.push(format!("name LIKE ?{} ESCAPE '\\'", params_vec.len()));
        }

        let where_clause = conditions.join(" AND ");
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let total: i64 = self
            .connection
            .query_row(
                &format!("SELECT COUNT(*) FROM playbook_runs WHERE {where_clause}"),
                &params_refs[..],
                |row| row.get(0),
            )
            .db_context("Failed to count playbook runs")?;

        let direction = filter.direction.as_sql();
        let offset = i64::from(filter.page) * i64::from(filter.per_page);
        let query = format!(
            "SELECT {RUN_COLUMNS} FROM playbook_runs WHERE {where_clause} \
             ORDER BY created_at {direction}, id {direction} LIMIT {} OFFSET {offset}",
            filter.per_page
        );

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let runs = stmt
            .query_map(&params_refs[..], run_from_row)
            .db_context("Failed to query playbook runs")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch playbook runs")?;

        let runs = runs
            .into_iter()
            .map(|run| self.hydrate(run))
            .collect::<Result<Vec<_>>>()?;

        Ok((runs, u64::try_from(total).unwrap_or_default()))
    }

    pub fn get_timeline_events(&self, run_id: &str) -> Result<Vec<TimelineEvent>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_TIMELINE_EVENTS_SQL)
            .db_context("Failed to prepare query")?;

        let events = stmt
            .query_map(params![run_id], |row| {
                Ok(TimelineEvent {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    event_type: super::parsed_column(row, 2)?,
                    summary: row.get(3)?,
                    details: row.get(4)?,
                    subject_user_id: row.get(5)?,
                    created_at: timestamp_column(row, 6)?,
                })
            })
            .db_context("Failed to query timeline events")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch timeline events")?;

        Ok(events)
    }

    /// Eagerly loads the append-only children of a run.
    fn hydrate(&self, mut run: PlaybookRun) -> Result<PlaybookRun> {
        run.status_posts = self.get_status_posts(&run.id)?;
        run.timeline_events = self.get_timeline_events(&run.id)?;
        Ok(run)
    }
}

pub(super) fn insert_timeline_event(tx: &Transaction<'_>, event: &TimelineEvent) -> Result<()> {
    tx.execute(
        INSERT_TIMELINE_EVENT_SQL,
        params![
            &event.id,
            &event.run_id,
            event.event_type.as_str(),
            &event.summary,
            &event.details,
            &event.subject_user_id,
            timestamp_text(event.created_at),
        ],
    )
    .db_context("Failed to insert timeline event")?;
    Ok(())
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<PlaybookRun> {
    Ok(PlaybookRun {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        owner_user_id: row.get(3)?,
        team_id: row.get(4)?,
        channel_id: row.get(5)?,
        channel_public: row.get(6)?,
        post_id: row.get(7)?,
        playbook_id: row.get(8)?,
        current_status: row.get(9)?,
        checklists: json_column(row, 10)?,
        status_posts: Vec::new(),
        timeline_events: Vec::new(),
        invited_user_ids: json_column(row, 11)?,
        invited_group_ids: json_column(row, 12)?,
        created_at: timestamp_column(row, 13)?,
        ended_at: optional_timestamp_column(row, 14)?,
        last_status_update_at: optional_timestamp_column(row, 15)?,
    })
}

/// LIKE pattern matching names that contain `term` literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("stamp"), "%stamp%");
        assert_eq!(contains_pattern("100%"), r"%100\%%");
        assert_eq!(contains_pattern(r"db_01\a"), r"%db\_01\\a%");
    }
}
