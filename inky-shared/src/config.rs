use std::sync::RwLock;
use std::path::Path;
use std::fs;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use toml::Table;

static GLOBAL_CONFIG: OnceCell<RwLock<Table>> = OnceCell::new();

/// Loads the TOML file at `path` as the global config. A missing file yields
/// an empty table; a second call is an error.
pub fn init<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();

    let content = if path.exists() {
        log::info!("Loading config from {:?}", path);
        fs::read_to_string(path)?
    } else {
        log::warn!("Config file not found at {:?}, using defaults.", path);
        String::new()
    };

    let table = parse_table(&content);

    GLOBAL_CONFIG.set(RwLock::new(table))
        .map_err(|_| anyhow::anyhow!("Config already initialized"))?;

    Ok(())
}

fn parse_table(content: &str) -> Table {
    toml::from_str(content).unwrap_or_else(|e| {
        log::error!("Config syntax error: {}, using empty config.", e);
        Table::new()
    })
}

/// Typed view of one `[section]`. Falls back to `T::default()` when the
/// section is absent or malformed, or when [`init`] was never called.
pub fn get<T: DeserializeOwned + Default>(key: &str) -> T {
    let Some(store) = GLOBAL_CONFIG.get() else {
        log::debug!("Config not initialized, using defaults for '[{}]'", key);
        return T::default();
    };
    let read_guard = match store.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    section(&read_guard, key)
}

fn section<T: DeserializeOwned + Default>(table: &Table, key: &str) -> T {
    match table.get(key) {
        Some(value) => value.clone().try_into().unwrap_or_else(|e| {
            log::warn!("Config section '[{}]' mismatch: {}. Using default.", key, e);
            T::default()
        }),
        None => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct Limits {
        max_steps: usize,
        label: String,
    }

    #[test]
    fn reads_typed_section() {
        let table = parse_table("[core]\nmax_steps = 42\n");
        let limits: Limits = section(&table, "core");
        assert_eq!(limits, Limits { max_steps: 42, label: String::new() });
    }

    #[test]
    fn missing_or_mismatched_sections_default() {
        let table = parse_table("[core]\nmax_steps = \"many\"\n");
        assert_eq!(section::<Limits>(&table, "core"), Limits::default());
        assert_eq!(section::<Limits>(&table, "system"), Limits::default());
    }

    #[test]
    fn syntax_errors_give_an_empty_table() {
        assert!(parse_table("[core\nmax_steps = ").is_empty());
    }
}
