//! Command handlers over one open session

use crate::config::AnnotConfig;
use crate::render;
use annot_dataset::MediaResolveConfig;
use annot_questionnaire::QuestionnaireDef;
use annot_session::{source_label, AnnotationSession, DefaultFetcher, ResourceFetcher};
use annot_state::{Debouncer, FileStorage, SystemClock};
use anyhow::{bail, Context};
use clap::ArgMatches;
use std::path::{Path, PathBuf};

pub(crate) type Session = AnnotationSession<FileStorage, SystemClock>;

/// Remembers which dataset the last `load` opened
const DATASET_MARKER: &str = "current_dataset";

pub(crate) struct App {
    config: AnnotConfig,
    fetcher: DefaultFetcher,
    session: Session,
}

impl App {
    /// Open the stored session, its questionnaires and its dataset
    ///
    /// Missing questionnaires or an unavailable dataset are reported but do
    /// not prevent the session from opening.
    pub(crate) async fn open(config: AnnotConfig) -> anyhow::Result<Self> {
        let session = AnnotationSession::init(
            FileStorage::new(&config.data_dir),
            SystemClock,
            Debouncer::new(config.debounce_ms),
        )
        .with_media_defaults(config.media_defaults());

        let mut app = Self {
            fetcher: DefaultFetcher::new(),
            config,
            session,
        };

        let base = app.config.questionnaire_base();
        if let Err(e) = app.session.fetch_questionnaires(&app.fetcher, &base).await {
            tracing::warn!(base = %base, error = %e, "questionnaires unavailable");
        }

        if let Some(location) = app.dataset_location() {
            match app.reopen_dataset(&location).await {
                Ok(total) => tracing::debug!(location = %location, total, "dataset reopened"),
                Err(e) => tracing::warn!(location = %location, error = %e, "dataset unavailable"),
            }
        }
        Ok(app)
    }

    async fn reopen_dataset(&mut self, location: &str) -> anyhow::Result<usize> {
        let text = self.fetcher.fetch_text(location).await?;
        Ok(self
            .session
            .restore_dataset(&text, &source_label(location))?)
    }

    /// Flush pending state
    pub(crate) fn close(self) -> anyhow::Result<()> {
        self.session.teardown().context("failed to save state")
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn marker_path(&self) -> PathBuf {
        self.config.data_dir.join(DATASET_MARKER)
    }

    /// Dataset to reopen: `--dataset`/config, else the last loaded one
    fn dataset_location(&self) -> Option<String> {
        self.config.dataset.clone().or_else(|| {
            std::fs::read_to_string(self.marker_path())
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
    }

    fn remember_dataset(&self, location: &str) -> anyhow::Result<()> {
        let location = absolute_location(location);
        std::fs::create_dir_all(&self.config.data_dir)
            .with_context(|| format!("cannot create {}", self.config.data_dir.display()))?;
        std::fs::write(self.marker_path(), location)
            .with_context(|| format!("cannot write {}", self.marker_path().display()))
    }

    /// Run one subcommand
    pub(crate) async fn dispatch(&mut self, name: &str, args: &ArgMatches) -> anyhow::Result<()> {
        match name {
            "status" => self.status(),
            "load" => self.load(required(args, "source")?).await,
            "identity" => self.identity(args),
            "questionnaires" => self.list_questionnaires(args.get_one::<String>("key")),
            "answer" => self.answer(
                required(args, "key")?,
                required(args, "item")?,
                required(args, "value")?,
            ),
            "show" => self.show(),
            "next" => {
                self.session.next();
                self.brief()
            }
            "prev" => {
                self.session.previous();
                self.brief()
            }
            "save" => self.save(args),
            "correct" => {
                self.session.set_correct_flag(!args.get_flag("no"))?;
                self.brief()
            }
            "media" => self.media(args),
            "export" => self.export(args.get_one::<PathBuf>("out").map_or(Path::new("."), PathBuf::as_path)),
            "import" => self.import(args.get_one::<PathBuf>("file").context("missing file")?),
            "clear" => self.clear(args.get_flag("yes")),
            other => bail!("unknown command: {other}"),
        }
    }

    fn status(&self) -> anyhow::Result<()> {
        print!("{}", render::status(&self.session));
        Ok(())
    }

    async fn load(&mut self, source: &str) -> anyhow::Result<()> {
        let total = self.session.fetch_dataset(&self.fetcher, source).await?;
        self.remember_dataset(source)?;
        println!("loaded {total} tasks from {source}");
        Ok(())
    }

    fn identity(&mut self, args: &ArgMatches) -> anyhow::Result<()> {
        if let Some(id) = args.get_one::<String>("id") {
            self.session.set_annotator_id(id);
        }
        if let Some(name) = args.get_one::<String>("name") {
            self.session.set_signed_name(name);
        }
        if args.get_flag("agree") {
            self.session.set_consent(true);
        } else if args.get_flag("revoke") {
            self.session.set_consent(false);
        }
        print!("{}", render::identity(self.session.state()));
        Ok(())
    }

    fn list_questionnaires(&self, key: Option<&String>) -> anyhow::Result<()> {
        let defs = self.session.questionnaires();
        if defs.is_empty() {
            bail!(
                "no questionnaires found under {}",
                self.config.questionnaire_base()
            );
        }
        let selected: Vec<&QuestionnaireDef> = match key {
            Some(key) => vec![find_questionnaire(defs, key)?],
            None => defs.iter().collect(),
        };
        for def in selected {
            print!("{}", render::questionnaire(def, &self.session.state().questionnaires));
        }
        Ok(())
    }

    fn answer(&mut self, key: &str, item: &str, value: &str) -> anyhow::Result<()> {
        let def = find_questionnaire(self.session.questionnaires(), key)?;
        let question = def
            .item(item)
            .with_context(|| format!("questionnaire {key} has no item {item}"))?;
        let options = def.options_for(question);
        if !options.iter().any(|option| option.value == value) {
            let valid: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
            bail!("{value} is not an option for {key}/{item} (expected one of {})", valid.join(", "));
        }

        self.session.set_answer(key, item, value);
        let answers = &self.session.state().questionnaires;
        let def = find_questionnaire(self.session.questionnaires(), key)?;
        println!(
            "{key}: {}/{} answered",
            annot_questionnaire::answered_count(answers, def),
            def.item_count()
        );
        Ok(())
    }

    fn show(&self) -> anyhow::Result<()> {
        print!("{}", render::task(&self.session));
        Ok(())
    }

    fn brief(&self) -> anyhow::Result<()> {
        println!("{}", render::position(&self.session));
        Ok(())
    }

    fn save(&mut self, args: &ArgMatches) -> anyhow::Result<()> {
        let text = if args.get_flag("reset") {
            self.session.reset_payload()
        } else if let Some(payload) = args.get_one::<String>("payload") {
            payload.clone()
        } else if let Some(path) = args.get_one::<PathBuf>("file") {
            std::fs::read_to_string(path)
                .with_context(|| format!("cannot read payload file {}", path.display()))?
        } else {
            self.session.payload_text()
        };

        self.session.save_current(&text, args.get_flag("next"))?;
        self.brief()
    }

    fn media(&mut self, args: &ArgMatches) -> anyhow::Result<()> {
        if args.get_flag("reset") {
            self.session.set_media_config(None);
        } else {
            let base = args.get_one::<String>("base-url");
            let prefix = args.get_one::<String>("local-prefix");
            if base.is_some() || prefix.is_some() {
                let current = self.session.state().media_config.clone().unwrap_or_default();
                let updated = MediaResolveConfig {
                    media_base_url: base.cloned().or(current.media_base_url),
                    local_weibo_prefix: prefix.cloned().or(current.local_weibo_prefix),
                };
                self.session.set_media_config(Some(updated));
            }
        }
        print!("{}", render::media(&self.session));
        Ok(())
    }

    fn export(&self, dir: &Path) -> anyhow::Result<()> {
        let artifact = self.session.export_snapshot()?;
        let path = dir.join(&artifact.file_name);
        std::fs::write(&path, artifact.contents)
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!("exported to {}", path.display());
        Ok(())
    }

    fn import(&mut self, path: &Path) -> anyhow::Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        self.session.import_snapshot(&text)?;
        println!(
            "imported state for {} ({} annotations)",
            render::annotator(self.session.state()),
            self.session.state().annotations.len()
        );
        Ok(())
    }

    fn clear(&mut self, confirmed: bool) -> anyhow::Result<()> {
        if !confirmed {
            bail!("refusing to delete saved state without --yes");
        }
        self.session.clear()?;
        let marker = self.marker_path();
        if marker.exists() {
            std::fs::remove_file(&marker)
                .with_context(|| format!("cannot remove {}", marker.display()))?;
        }
        println!("saved state cleared");
        Ok(())
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing {name}"))
}

fn find_questionnaire<'a>(defs: &'a [QuestionnaireDef], key: &str) -> anyhow::Result<&'a QuestionnaireDef> {
    defs.iter()
        .find(|def| def.key == key)
        .with_context(|| format!("unknown questionnaire {key}"))
}

/// Local paths are remembered absolute so later runs work from any directory
fn absolute_location(location: &str) -> String {
    if annot_dataset::is_http_url(location) {
        return location.to_string();
    }
    let path = Path::new(location);
    if path.is_absolute() {
        return location.to_string();
    }
    std::env::current_dir().map_or_else(
        |_| location.to_string(),
        |cwd| cwd.join(path).to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot_test_utils::{dataset_json, sample_records, write_questionnaire_dir};

    async fn open_app(dir: &Path) -> App {
        let questionnaires = dir.join("questionnaires");
        std::fs::create_dir_all(&questionnaires).unwrap();
        write_questionnaire_dir(&questionnaires);

        let mut config = AnnotConfig::default().with_data_dir(dir.join("data"));
        config.questionnaires.dir = questionnaires;
        App::open(config).await.unwrap()
    }

    fn matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["annot"];
        argv.extend_from_slice(args);
        crate::cli().try_get_matches_from(argv).unwrap()
    }

    async fn run(app: &mut App, args: &[&str]) -> anyhow::Result<()> {
        let matches = matches(args);
        let (name, sub) = matches.subcommand().unwrap();
        app.dispatch(name, sub).await
    }

    #[tokio::test]
    async fn one_shot_commands_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("tasks.json");
        std::fs::write(&dataset, dataset_json(&sample_records())).unwrap();

        let mut app = open_app(dir.path()).await;
        assert_eq!(app.session_mut().questionnaires().len(), 2);
        run(&mut app, &["load", dataset.to_str().unwrap()]).await.unwrap();
        run(&mut app, &["identity", "--id", "a1", "--name", "Ada", "--agree"])
            .await
            .unwrap();
        for (key, item) in [("BFI", "1"), ("BFI", "2"), ("LMS", "m1"), ("LMS", "m2")] {
            run(&mut app, &["answer", key, item, "1"]).await.unwrap();
        }
        run(&mut app, &["save", "--payload", r#"{"stance": "neutral"}"#, "--next"])
            .await
            .unwrap();
        app.close().unwrap();

        // A second invocation reopens the remembered dataset at the saved position
        let mut app = open_app(dir.path()).await;
        let session = app.session_mut();
        assert_eq!(session.tasks().len(), 3);
        assert_eq!(session.current_task().unwrap().post_id, "p2");
        assert!(session.readiness().is_ready());
    }

    #[tokio::test]
    async fn answer_rejects_values_outside_scale() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(dir.path()).await;

        assert!(run(&mut app, &["answer", "BFI", "1", "9"]).await.is_err());
        assert!(run(&mut app, &["answer", "BFI", "99", "1"]).await.is_err());
        assert!(run(&mut app, &["answer", "NOPE", "1", "1"]).await.is_err());
        assert!(app.session_mut().state().questionnaires.is_empty());
    }

    #[tokio::test]
    async fn save_before_ready_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(dir.path()).await;
        let err = run(&mut app, &["save"]).await.unwrap_err();
        assert!(err.to_string().contains("not ready to annotate"));
    }

    #[tokio::test]
    async fn clear_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = open_app(dir.path()).await;
        run(&mut app, &["identity", "--id", "a1"]).await.unwrap();

        assert!(run(&mut app, &["clear"]).await.is_err());
        assert_eq!(app.session_mut().state().annotator_id, "a1");

        run(&mut app, &["clear", "--yes"]).await.unwrap();
        assert_eq!(app.session_mut().state().annotator_id, "");
    }

    #[tokio::test]
    async fn export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();

        let mut app = open_app(dir.path()).await;
        run(&mut app, &["identity", "--id", "a1"]).await.unwrap();
        run(&mut app, &["export", "--out", out.to_str().unwrap()]).await.unwrap();

        let exported = std::fs::read_dir(&out).unwrap().next().unwrap().unwrap().path();
        assert!(exported
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("annotations_a1_"));

        run(&mut app, &["clear", "--yes"]).await.unwrap();
        run(&mut app, &["import", exported.to_str().unwrap()]).await.unwrap();
        assert_eq!(app.session_mut().state().annotator_id, "a1");
    }
}
