use std::path::PathBuf;
use std::str::FromStr;

/// Server settings read from `.env` and the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub port: u16,
    pub database: PathBuf,
    pub import_csv: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            database: PathBuf::from("storage/catalog.db"),
            import_csv: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| envmnt::get_or(key, ""))
    }

    fn from_lookup(get: impl Fn(&str) -> String) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            let v = get(key).trim().to_string();
            (!v.is_empty()).then_some(v)
        };
        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or(non_empty("PORT"), "PORT", defaults.port),
            database: non_empty("CATALOG_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database),
            import_csv: non_empty("IMPORT_PRODUCTS_CSV").map(PathBuf::from),
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match raw.map(|v| v.parse::<T>()) {
        Some(Ok(v)) => v,
        Some(Err(err)) => {
            log::warn!("Invalid {key} value: {err}, using default");
            default
        }
        None => default,
    }
}

/// Loads `.env` into the environment, creating an empty one when missing.
pub fn load_dotenv() -> Result<(), anyhow::Error> {
    match std::fs::File::open(".env") {
        Ok(_) => envmnt::load_file(".env")?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            std::fs::File::create(".env")?;
            envmnt::load_file(".env")?;
        }
        Err(err) => {
            return Err(anyhow::anyhow!("Unable to open .env file: {err}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        Settings::from_lookup(|key| vars.get(key).map(ToString::to_string).unwrap_or_default())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("BIND_ADDR", "127.0.0.1"),
            ("PORT", "9000"),
            ("CATALOG_DB", "/tmp/c.db"),
            ("IMPORT_PRODUCTS_CSV", " seed.csv "),
        ]);
        assert_eq!(s.bind_addr, "127.0.0.1");
        assert_eq!(s.port, 9000);
        assert_eq!(s.database, PathBuf::from("/tmp/c.db"));
        assert_eq!(s.import_csv, Some(PathBuf::from("seed.csv")));
    }

    #[test]
    fn invalid_port_falls_back() {
        assert_eq!(settings(&[("PORT", "http")]).port, 8080);
    }
}
