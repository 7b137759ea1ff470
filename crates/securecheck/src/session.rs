//! A working session: configuration, database and result cache.
//!
//! One session serves every view rendered by a single `securecheck`
//! invocation, or every command typed into the interactive shell. Query
//! results are memoized for the session's lifetime until refreshed.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::access::{CacheStats, CachedExecutor};
use crate::cli::ViewCommand;
use crate::config::Config;
use crate::error::Result;
use crate::storage::{import_csv, Database, ImportOptions, ImportSummary};
use crate::views::{self, Notice, NoticeLevel};

/// Configuration plus a cached connection to the stops database.
#[derive(Debug)]
pub struct Session {
    config: Config,
    executor: CachedExecutor<Database>,
}

impl Session {
    /// Open the configured database, or `database` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: Config, database: Option<PathBuf>) -> Result<Self> {
        let path = database.unwrap_or_else(|| config.database_path());
        let db = Database::open(&path, config.busy_timeout())?;
        info!("Opened stops database at {}", path.display());
        Ok(Self::with_database(config, db))
    }

    /// Build a session around an already open database.
    #[must_use]
    pub fn with_database(config: Config, db: Database) -> Self {
        let executor = CachedExecutor::with_enabled(db, config.cache.enabled);
        Self { config, executor }
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying database.
    #[must_use]
    pub fn database(&self) -> &Database {
        self.executor.inner()
    }

    /// Forget cached results so the next view reads fresh data.
    pub fn refresh(&self) -> usize {
        self.executor.clear()
    }

    /// Cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.executor.stats()
    }

    /// Import a CSV file and drop cached results.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the insert
    /// fails.
    pub fn import(&self, path: &Path, options: ImportOptions) -> Result<ImportSummary> {
        let summary = import_csv(self.database(), path, options)?;
        self.refresh();
        Ok(summary)
    }

    /// Render one view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view fails.
    pub fn run(&self, command: ViewCommand, out: &mut dyn Write) -> Result<()> {
        match command {
            ViewCommand::Dashboard => views::dashboard(&self.executor, &self.config, out),
            ViewCommand::Traffic {
                country,
                list_countries,
            } => views::traffic(
                &self.executor,
                &self.config,
                country.as_deref(),
                list_countries,
                out,
            ),
            ViewCommand::Query {
                selector,
                list,
                format,
            } => match selector {
                Some(selector) if !list => {
                    views::run_query(&self.executor, &self.config, &selector, format, out)
                }
                _ => views::list_queries(out),
            },
            ViewCommand::Predict(form) => views::predict(&self.executor, form.into(), out),
            ViewCommand::Import { file, replace } => {
                let summary = self.import(&file, ImportOptions { replace })?;
                let message = format!(
                    "Imported {} stops from {} ({} in database)",
                    summary.inserted,
                    file.display(),
                    summary.total
                );
                writeln!(out, "{}", Notice::new(NoticeLevel::Success, message))?;
                Ok(())
            }
            ViewCommand::About => views::about(self.database(), out),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use super::*;
    use crate::cli::OutputFormat;
    use crate::testing::fixture_database;

    fn session() -> Session {
        Session::with_database(Config::default(), fixture_database())
    }

    fn run(session: &Session, command: ViewCommand) -> String {
        let mut out = Vec::new();
        session.run(command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_open_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stops.db");

        let session = Session::open(Config::default(), Some(path.clone())).unwrap();

        assert!(path.exists());
        assert_eq!(session.database().path(), path);
    }

    #[test]
    fn test_views_reuse_cached_results() {
        let session = session();

        run(&session, ViewCommand::Dashboard);
        run(&session, ViewCommand::Dashboard);

        let stats = session.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_refresh_rereads() {
        let session = session();

        run(&session, ViewCommand::Dashboard);
        assert_eq!(session.refresh(), 1);
        run(&session, ViewCommand::Dashboard);

        assert_eq!(session.cache_stats().misses, 2);
    }

    #[test]
    fn test_cache_disabled() {
        let mut config = Config::default();
        config.cache.enabled = false;
        let session = Session::with_database(config, fixture_database());

        run(&session, ViewCommand::Dashboard);
        run(&session, ViewCommand::Dashboard);

        assert_eq!(session.cache_stats().hits, 0);
        assert_eq!(session.cache_stats().entries, 0);
    }

    #[test]
    fn test_query_list_when_requested() {
        let session = session();
        let text = run(
            &session,
            ViewCommand::Query {
                selector: Some("3".to_string()),
                list: true,
                format: OutputFormat::Table,
            },
        );
        assert!(text.contains("Stop pattern by year, month, hour"));
    }

    #[test]
    fn test_import_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("stops.csv");
        let mut csv = String::from(
            "stop_date,stop_time,country_name,driver_gender,driver_age,driver_race,\
             is_arrested,search_conducted,search_type,stop_duration,drugs_related_stop,\
             violation,stop_outcome,vehicle_number\n",
        );
        writeln!(
            csv,
            "2023-01-01,08:00:00,Canada,F,33,White,False,False,,0-5 min,False,Speeding,Warning,NEW001"
        )
        .unwrap();
        std::fs::write(&csv_path, csv).unwrap();

        let session = session();
        run(&session, ViewCommand::Dashboard);

        let text = run(
            &session,
            ViewCommand::Import {
                file: csv_path,
                replace: false,
            },
        );
        assert!(text.contains("Imported 1 stops"));
        assert!(text.contains("(9 in database)"));
        assert_eq!(session.cache_stats().entries, 0);

        let dashboard = run(&session, ViewCommand::Dashboard);
        assert!(dashboard.contains('9'));
    }

    #[test]
    fn test_about() {
        let text = run(&session(), ViewCommand::About);
        assert!(text.contains("About SecureCheck"));
    }
}
