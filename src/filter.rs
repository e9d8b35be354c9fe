use std::path::{Component, Path, PathBuf};

use crate::events::{raw_event_path, WatchEvent};
use crate::settings::Settings;

/// Files with this suffix never trigger a rebuild.
pub const TEST_FILE_SUFFIX: &str = "_test.go";

/// Decides which paths and watcher events should gate a rebuild.
///
/// All checks are pure given the settings, apart from reading the current
/// directory once to absolutize the tmp path.
pub struct PathClassifier<'a> {
    settings: &'a Settings,
    tmp_path: PathBuf,
}

impl<'a> PathClassifier<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            tmp_path: absolute(&settings.tmp_path()),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// True if `path` is the build output directory itself.
    pub fn is_tmp_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        absolute(path.as_ref()) == self.tmp_path
    }

    /// True if any `ignored` token occurs anywhere in the path.
    ///
    /// This is substring matching, so `tmp` also ignores `/src/tmpl/`.
    pub fn is_ignored_folder<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref().to_string_lossy();
        split_list(self.settings.ignored()).any(|token| path.contains(token))
    }

    /// True if changes to `path` should be watched.
    pub fn is_watched_file<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let name = path.to_string_lossy();

        if name.ends_with(TEST_FILE_SUFFIX) {
            return false;
        }

        // Plain string prefix, so `tmpfoo/` next to `tmp/` is excluded too.
        let tmp_path = self.tmp_path.to_string_lossy();
        if absolute(path).to_string_lossy().starts_with(tmp_path.as_ref()) {
            return false;
        }

        let ext = extension(&name);
        split_list(self.settings.valid_ext()).any(|e| e == ext)
    }

    /// Whether a raw `"<path>": <OP>` watcher event warrants a rebuild.
    ///
    /// Files ending in a `no_rebuild_ext` entry are reloaded live. Anything
    /// that cannot be parsed rebuilds.
    pub fn should_rebuild(&self, event: &str) -> bool {
        self.rebuilds_path(Path::new(&raw_event_path(event)))
    }

    /// Same decision as [`PathClassifier::should_rebuild`] for a parsed event.
    pub fn should_rebuild_event(&self, event: &WatchEvent) -> bool {
        self.rebuilds_path(&event.path)
    }

    fn rebuilds_path(&self, path: &Path) -> bool {
        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return true,
        };

        let skip = split_list(self.settings.no_rebuild_ext()).any(|e| file_name.ends_with(e));
        if skip {
            tracing::debug!("{} is reloaded without a rebuild", file_name);
        }
        !skip
    }
}

/// Entries of a comma-separated setting, trimmed, with empty entries dropped.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|entry| !entry.is_empty())
}

/// Extension including the leading dot, or `""`. Only the last path element
/// is considered.
fn extension(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.').map(|i| &name[i..]).unwrap_or("")
}

/// Absolute, lexically cleaned form of `path`. Symlinks are not resolved.
fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventOp;
    use crate::settings::SettingKey;

    fn project() -> Settings {
        let mut settings = Settings::with_source_root("/go/src");
        settings.set(SettingKey::RootPath, "/proj");
        settings
    }

    #[test]
    fn test_is_tmp_dir() {
        let settings = project();
        let classifier = PathClassifier::new(&settings);

        assert!(classifier.is_tmp_dir("/proj/tmp"));
        assert!(classifier.is_tmp_dir("/proj/./tmp/"));
        assert!(classifier.is_tmp_dir("/proj/src/../tmp"));
        assert!(!classifier.is_tmp_dir("/proj/tmp/app"));
        assert!(!classifier.is_tmp_dir("/proj"));
    }

    #[test]
    fn test_is_ignored_folder() {
        let settings = project();
        let classifier = PathClassifier::new(&settings);

        assert!(classifier.is_ignored_folder("/proj/assets/img.png"));
        assert!(classifier.is_ignored_folder("/proj/tmp"));
        assert!(!classifier.is_ignored_folder("/proj/handlers"));
    }

    #[test]
    fn test_ignored_tokens_match_substrings() {
        let settings = project();
        let classifier = PathClassifier::new(&settings);

        assert!(classifier.is_ignored_folder("/proj/views/tmpl"));
    }

    #[test]
    fn test_empty_ignore_list_ignores_nothing() {
        let mut settings = project();
        settings.set(SettingKey::Ignored, " , ");
        let classifier = PathClassifier::new(&settings);

        assert!(!classifier.is_ignored_folder("/proj/assets/img.png"));
        assert!(!classifier.is_ignored_folder(""));
    }

    #[test]
    fn test_is_watched_file() {
        let settings = project();
        let classifier = PathClassifier::new(&settings);

        assert!(classifier.is_watched_file("/proj/main.go"));
        assert!(classifier.is_watched_file("/proj/views/index.tpl"));
        assert!(!classifier.is_watched_file("/proj/foo_test.go"));
        assert!(!classifier.is_watched_file("/proj/tmp/main.go"));
        assert!(!classifier.is_watched_file("/proj/README.md"));
        assert!(!classifier.is_watched_file("/proj/Makefile"));
        assert!(!classifier.is_watched_file("/proj/v1.2/Makefile"));
    }

    #[test]
    fn test_empty_extension_list_watches_nothing() {
        let mut settings = project();
        settings.set(SettingKey::ValidExt, "");
        let classifier = PathClassifier::new(&settings);

        assert!(!classifier.is_watched_file("/proj/main.go"));
        assert!(!classifier.is_watched_file("/proj/Makefile"));
    }

    #[test]
    fn test_should_rebuild() {
        let settings = project();
        let classifier = PathClassifier::new(&settings);

        assert!(!classifier.should_rebuild(r#""views/index.tpl": WRITE"#));
        assert!(!classifier.should_rebuild(r#""/proj/views/layout.html": CREATE"#));
        assert!(classifier.should_rebuild(r#""/proj/main.go": WRITE"#));
        assert!(classifier.should_rebuild("garbage"));
        assert!(classifier.should_rebuild(""));
        assert!(classifier.should_rebuild(": WRITE"));
    }

    #[test]
    fn test_empty_no_rebuild_list_blocks_nothing() {
        let mut settings = project();
        settings.set(SettingKey::NoRebuildExt, "");
        let classifier = PathClassifier::new(&settings);

        assert!(classifier.should_rebuild(r#""views/index.tpl": WRITE"#));
    }

    #[test]
    fn test_should_rebuild_parsed_event() {
        let settings = project();
        let classifier = PathClassifier::new(&settings);

        let template = WatchEvent::new("/proj/views/index.tmpl", EventOp::Write);
        let source = WatchEvent::new("/proj/main.go", EventOp::Create);
        assert!(!classifier.should_rebuild_event(&template));
        assert!(classifier.should_rebuild_event(&source));
    }

    #[test]
    fn test_raw_and_parsed_events_agree() {
        let settings = project();
        let classifier = PathClassifier::new(&settings);

        for raw in [
            r#""/proj/a:b/index.tpl": WRITE"#,
            r#""/proj/views/index.tpl": WRITE"#,
            r#""/proj/c:d.go": CREATE"#,
        ] {
            let event = WatchEvent::parse(raw).unwrap();
            assert_eq!(classifier.should_rebuild(raw), classifier.should_rebuild_event(&event));
        }
        assert!(classifier.should_rebuild(r#""/proj/a:b/index.tpl": WRITE"#));
    }

    #[test]
    fn test_tmp_exclusion_is_string_prefix() {
        let settings = project();
        let classifier = PathClassifier::new(&settings);

        assert!(!classifier.is_watched_file("/proj/tmpfoo/x.go"));
        assert!(!classifier.is_watched_file("/proj/tmp/nested/x.go"));
        assert!(classifier.is_watched_file("/proj/tm/x.go"));
    }

    #[test]
    fn test_split_list() {
        let entries: Vec<_> = split_list(" .go, .tpl ,,.html ").collect();
        assert_eq!(entries, vec![".go", ".tpl", ".html"]);
        assert_eq!(split_list("").count(), 0);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("/a/b/main.go"), ".go");
        assert_eq!(extension("/a/b.d/Makefile"), "");
        assert_eq!(extension("archive.tar.gz"), ".gz");
    }
}
