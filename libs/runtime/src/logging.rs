use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::{
    filter::{FilterFn, LevelFilter, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 5;

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || (target.starts_with(crate_name) && target[crate_name.len()..].starts_with("::"))
}

/// Everything at or below `max_level` that is not claimed by an explicit section.
fn unclaimed_targets_filter(
    claimed: &[String],
    max_level: Level,
) -> FilterFn<impl Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static> {
    let claimed = claimed.to_vec();
    FilterFn::new(move |meta: &tracing::Metadata<'_>| {
        let t = meta.target();
        !claimed.iter().any(|c| matches_crate_prefix(t, c)) && meta.level() <= &max_level
    })
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut f) => f.write(buf),
            Err(_) => Ok(buf.len()), // poisoned: drop the record
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut f) => f.flush(),
            Err(_) => Ok(()),
        }
    }
}

/// Writer that may be absent; absent writers swallow the output.
struct MaybeWriter(Option<RotWriter>);

impl Write for MaybeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to a file by target prefix, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_prefix: Vec<(String, RotWriter)>,
}

impl FileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_crate_prefix(target, prefix))
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = MaybeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MaybeWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        MaybeWriter(self.resolve_for(meta.target()))
    }
}

// -------- path / writer helpers --------

/// Resolve a log file path against `base_dir` (home_dir).
/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a rotating writer, ensuring the parent directory exists.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_files: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(max_files)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

/// Rotation threshold in bytes; oversized values clamp to `usize::MAX`.
fn max_file_bytes(section: &Section) -> usize {
    let bytes = section
        .max_size_mb
        .unwrap_or(DEFAULT_MAX_SIZE_MB)
        .saturating_mul(1024 * 1024);
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

/// Opens one writer per distinct path, so sections sharing a file share its rotation.
struct WriterPool<'a> {
    base_dir: &'a Path,
    open: HashMap<PathBuf, RotWriter>,
}

impl<'a> WriterPool<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            open: HashMap::new(),
        }
    }

    fn writer_for(&mut self, subsystem: &str, section: &Section) -> Option<RotWriter> {
        if section.file.trim().is_empty() {
            return None;
        }
        let path = resolve_log_path(&section.file, self.base_dir);
        if let Some(w) = self.open.get(&path) {
            return Some(w.clone());
        }

        let max_files = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
        match create_rotating_writer_at_path(&path, max_file_bytes(section), max_files) {
            Ok(w) => {
                self.open.insert(path, w.clone());
                Some(w)
            }
            Err(e) => {
                eprintln!(
                    "Failed to init log file for '{}': {} ({})",
                    subsystem,
                    path.to_string_lossy(),
                    e
                );
                None
            }
        }
    }
}

// -------- config split --------

struct ConfigData<'a> {
    default_section: Option<&'a Section>,
    crate_sections: Vec<(String, &'a Section)>,
    crate_names: Vec<String>,
}

fn extract_config_data(cfg: &LoggingConfig) -> ConfigData<'_> {
    let mut crate_sections = cfg
        .iter()
        .filter(|(k, _)| k.as_str() != "default")
        .map(|(k, v)| (k.clone(), v))
        .collect::<Vec<_>>();
    // Longest prefix first so "catalog::infra" wins over "catalog".
    crate_sections.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

    let crate_names = crate_sections.iter().map(|(n, _)| n.clone()).collect();

    ConfigData {
        default_section: cfg.get("default"),
        crate_sections,
        crate_names,
    }
}

fn console_targets(config: &ConfigData) -> Targets {
    config
        .crate_sections
        .iter()
        .filter_map(|(name, s)| {
            parse_tracing_level(&s.console_level).map(|l| (name.clone(), LevelFilter::from_level(l)))
        })
        .fold(Targets::new().with_default(LevelFilter::OFF), |t, (name, level)| {
            t.with_target(name, level)
        })
}

fn file_targets(config: &ConfigData) -> Targets {
    config
        .crate_sections
        .iter()
        .filter(|(_, s)| !s.file.trim().is_empty())
        .filter_map(|(name, s)| {
            parse_tracing_level(&s.file_level).map(|l| (name.clone(), LevelFilter::from_level(l)))
        })
        .fold(Targets::new().with_default(LevelFilter::OFF), |t, (name, level)| {
            t.with_target(name, level)
        })
}

fn build_file_router(config: &ConfigData, base_dir: &Path) -> FileRouter {
    let mut pool = WriterPool::new(base_dir);
    let default = config
        .default_section
        .and_then(|s| pool.writer_for("default", s));
    let by_prefix = config
        .crate_sections
        .iter()
        .filter_map(|(name, s)| pool.writer_for(name, s).map(|w| (name.clone(), w)))
        .collect();
    FileRouter { default, by_prefix }
}

fn console_layer<F>(ansi: bool, filter: F) -> BoxedLayer
where
    F: tracing_subscriber::layer::Filter<Registry> + Send + Sync + 'static,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(filter)
        .boxed()
}

fn json_file_layer<F>(router: FileRouter, filter: F) -> BoxedLayer
where
    F: tracing_subscriber::layer::Filter<Registry> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(filter)
        .boxed()
}

fn build_layers(config: &ConfigData, router: FileRouter) -> Vec<BoxedLayer> {
    let ansi = atty::is(atty::Stream::Stdout);
    let mut layers = vec![console_layer(ansi, console_targets(config))];
    let has_files = !router.is_empty();

    if !router.by_prefix.is_empty() {
        layers.push(json_file_layer(router.clone(), file_targets(config)));
    }

    if let Some(default_section) = config.default_section {
        if let Some(level) = parse_tracing_level(&default_section.console_level) {
            layers.push(console_layer(
                ansi,
                unclaimed_targets_filter(&config.crate_names, level),
            ));
        }
        if has_files && router.default.is_some() {
            if let Some(level) = parse_tracing_level(&default_section.file_level) {
                layers.push(json_file_layer(
                    router,
                    unclaimed_targets_filter(&config.crate_names, level),
                ));
            }
        }
    }

    layers
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: LoggingConfig containing the logging sections
/// - `base_dir`: base directory used to resolve relative log file paths (usually server.home_dir)
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let config_data = extract_config_data(cfg);
    let router = build_file_router(&config_data, base_dir);
    let layers = build_layers(&config_data, router);

    let _ = Registry::default().with(layers).try_init();
}

fn init_default_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

// =================== tests ===================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(file: &str) -> Section {
        Section {
            console_level: "info".into(),
            file: file.into(),
            file_level: "debug".into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_logging_level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("Info"), Some(Level::INFO));
        assert_eq!(parse_tracing_level("warn"), Some(Level::WARN));
        assert_eq!(parse_tracing_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("invalid"), Some(Level::INFO));
    }

    #[test]
    fn test_crate_prefix_matching() {
        assert!(matches_crate_prefix("catalog", "catalog"));
        assert!(matches_crate_prefix("catalog::domain::service", "catalog"));
        assert!(!matches_crate_prefix("catalogue", "catalog"));
        assert!(!matches_crate_prefix("api_ingress", "catalog"));
    }

    #[test]
    fn test_extract_config_data_orders_longest_prefix_first() {
        let mut cfg = default_logging_config();
        cfg.insert("catalog".into(), section("logs/catalog.log"));
        cfg.insert("catalog::infra".into(), section("logs/storage.log"));

        let data = extract_config_data(&cfg);
        assert!(data.default_section.is_some());
        assert_eq!(
            data.crate_names,
            vec!["catalog::infra".to_string(), "catalog".to_string()]
        );
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/x")), abs);
    }

    #[test]
    fn test_create_rotating_writer_at_path_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let res = create_rotating_writer_at_path(&p, 128 * 1024, 2);
        assert!(res.is_ok(), "writer should be created");
        assert!(p.parent().unwrap().exists(), "parent dir must be created");
    }

    #[test]
    fn test_max_file_bytes_defaults_and_saturates() {
        let mut s = section("logs/app.log");
        assert_eq!(max_file_bytes(&s), 1024 * 1024);

        s.max_size_mb = None;
        assert_eq!(max_file_bytes(&s), 100 * 1024 * 1024);

        s.max_size_mb = Some(u64::MAX);
        assert_eq!(max_file_bytes(&s), usize::MAX);
    }

    #[test]
    fn test_router_shares_writer_for_same_file_and_routes_by_prefix() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("logs/all.log"));
        cfg.insert("api_ingress".into(), section("logs/all.log"));
        cfg.insert("catalog".into(), section("logs/catalog.log"));

        let data = extract_config_data(&cfg);
        let router = build_file_router(&data, tmp.path());

        let default = router.default.clone().unwrap();
        let ingress = router.resolve_for("api_ingress::request_id").unwrap();
        assert!(Arc::ptr_eq(&default.0, &ingress.0));

        let catalog = router.resolve_for("catalog::domain").unwrap();
        assert!(!Arc::ptr_eq(&default.0, &catalog.0));

        let other = router.resolve_for("mongodb::cmap").unwrap();
        assert!(Arc::ptr_eq(&default.0, &other.0));
    }

    #[test]
    fn test_empty_file_sections_produce_no_writers() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section(""));
        cfg.insert("catalog".into(), section("  "));

        let data = extract_config_data(&cfg);
        let router = build_file_router(&data, tmp.path());
        assert!(router.is_empty());
        assert!(router.resolve_for("catalog").is_none());
    }

    #[test]
    fn test_maybe_writer_without_target_swallows() {
        let mut w = MaybeWriter(None);
        assert_eq!(w.write(b"dropped").unwrap(), 7);
        assert!(w.flush().is_ok());
    }
}
