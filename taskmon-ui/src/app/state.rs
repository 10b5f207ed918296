use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use taskmon_core::{
    ProcessActions, RefreshConfig, RefreshScheduler, SearchDebouncer, SortColumn, SortState,
    SysinfoSource, SystemHistory, SystemSampler, TableState,
};

use super::{Tab, TaskMonApp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UiPrefs {
    pub(crate) refresh_interval_ms: u64,
    pub(crate) quiet_period_ms: u64,
    pub(crate) sort_column: Option<SortColumn>,
    pub(crate) sort_descending: bool,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
            quiet_period_ms: 300,
            sort_column: None,
            sort_descending: false,
        }
    }
}

pub(crate) fn parse_ui_prefs(s: &str) -> UiPrefs {
    let mut prefs = UiPrefs::default();

    for raw_line in s.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim();
        let value = v.trim();

        match key {
            "refresh_interval_ms" => {
                if let Ok(ms) = value.parse::<u64>() {
                    if ms > 0 {
                        prefs.refresh_interval_ms = ms;
                    }
                }
            }
            "quiet_period_ms" => {
                if let Ok(ms) = value.parse::<u64>() {
                    prefs.quiet_period_ms = ms;
                }
            }
            "sort_column" => {
                prefs.sort_column = SortColumn::from_key(value);
            }
            "sort_descending" => {
                if let Ok(b) = value.parse::<bool>() {
                    prefs.sort_descending = b;
                }
            }
            _ => {}
        }
    }

    prefs
}

pub(crate) fn serialize_ui_prefs(prefs: &UiPrefs) -> String {
    let mut out = String::new();
    out.push_str("# TaskMon UI preferences\n# Auto-generated; safe to delete\n");
    out.push_str(&format!(
        "refresh_interval_ms={}\nquiet_period_ms={}\n",
        prefs.refresh_interval_ms, prefs.quiet_period_ms,
    ));
    if let Some(column) = prefs.sort_column {
        out.push_str(&format!(
            "sort_column={}\nsort_descending={}\n",
            column.key(),
            prefs.sort_descending,
        ));
    }
    out
}

fn prefs_path() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        let path = Path::new(&dir).join("taskmon").join("taskmon_ui.ini");
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_ok() {
                return path;
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let path = Path::new(&home)
            .join(".config")
            .join("taskmon")
            .join("taskmon_ui.ini");
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_ok() {
                return path;
            }
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("taskmon_ui.ini")
}

fn load_ui_prefs() -> UiPrefs {
    match std::fs::read_to_string(prefs_path()) {
        Ok(s) => parse_ui_prefs(&s),
        Err(_) => UiPrefs::default(),
    }
}

fn save_ui_prefs(prefs: &UiPrefs) {
    let _ = std::fs::write(prefs_path(), serialize_ui_prefs(prefs));
}

pub(super) fn try_build_app() -> anyhow::Result<TaskMonApp> {
    let prefs = load_ui_prefs();

    let mut scheduler = RefreshScheduler::new(
        SysinfoSource::new(),
        RefreshConfig {
            interval: Duration::from_millis(prefs.refresh_interval_ms),
        },
    );
    // First collection, unfiltered, before the first frame renders.
    scheduler.request_refresh(Some(""));

    let sort = SortState {
        active: prefs.sort_column.map(|c| (c, prefs.sort_descending)),
    };

    Ok(TaskMonApp {
        scheduler,
        debouncer: SearchDebouncer::new(Duration::from_millis(prefs.quiet_period_ms)),
        table: TableState::new(),
        sort,
        actions: ProcessActions::new(),
        sampler: SystemSampler::new(),
        history: SystemHistory::default(),
        last_sample: Instant::now(),
        tab: Tab::default(),
        filter_text: String::new(),
        terminate_dialog: None,
        status_line: None,
        prefs,
    })
}

impl Drop for TaskMonApp {
    fn drop(&mut self) {
        // Persist the sort preference alongside the timing knobs.
        let (sort_column, sort_descending) = match self.sort.active {
            Some((column, descending)) => (Some(column), descending),
            None => (None, false),
        };
        save_ui_prefs(&UiPrefs {
            sort_column,
            sort_descending,
            ..self.prefs.clone()
        });
    }
}
