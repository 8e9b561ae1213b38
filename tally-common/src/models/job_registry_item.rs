use diesel::Insertable;
use std::time::SystemTime;

use crate::schema::job_registry;

/// Upsert row for the job registry. The registry holds one row per
/// scheduled job so run windows survive a process restart; reads go through
/// a bare timestamp select, so no queryable counterpart exists.
#[derive(Debug, Insertable)]
#[diesel(table_name = job_registry, primary_key(job_name))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewJobRegistryItem<'a> {
    pub job_name: &'a str,
    pub last_run_timestamp: SystemTime,
}
