//! Plain-text views of the session

use crate::app::Session;
use annot_questionnaire::{completed_items, QuestionnaireAnswers, QuestionnaireDef};
use annot_session::MediaLink;
use annot_state::UserState;
use std::fmt::Write;

pub(crate) fn annotator(state: &UserState) -> &str {
    if state.has_annotator() {
        state.annotator_id.trim()
    } else {
        "(unset)"
    }
}

pub(crate) fn identity(state: &UserState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "annotator: {}", annotator(state));
    let _ = writeln!(out, "signed name: {}", state.consent.signed_name);
    let _ = writeln!(
        out,
        "consent: {}",
        if state.consent.agreed { "given" } else { "not given" }
    );
    out
}

pub(crate) fn status(session: &Session) -> String {
    let state = session.state();
    let mut out = identity(state);

    let defs = session.questionnaires();
    if defs.is_empty() {
        out.push_str("questionnaires: none loaded\n");
    } else {
        out.push_str("questionnaires:\n");
        for def in defs {
            let _ = writeln!(out, "{}", progress_line(def, &state.questionnaires));
        }
    }

    match &state.dataset_info {
        Some(info) => {
            let _ = writeln!(out, "dataset: {} ({} tasks)", info.source, session.tasks().len());
        }
        None => out.push_str("dataset: none\n"),
    }
    let _ = writeln!(out, "{}", position(session));
    let _ = writeln!(out, "annotations saved: {}", state.annotations.len());

    let readiness = session.readiness();
    if readiness.is_ready() {
        out.push_str("ready to annotate\n");
    } else {
        for missing in readiness.missing() {
            let _ = writeln!(out, "blocked: {missing}");
        }
    }
    out
}

/// Items of `def` answered, out of its item count
fn progress_line(def: &QuestionnaireDef, answers: &QuestionnaireAnswers) -> String {
    format!(
        "  {:<20} {}/{}",
        def.key,
        completed_items(answers, def),
        def.item_count()
    )
}

pub(crate) fn questionnaire(def: &QuestionnaireDef, answers: &QuestionnaireAnswers) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", def.key, def.title);
    if !def.instructions.is_empty() {
        let _ = writeln!(out, "{}", def.instructions);
    }
    let filled = answers.get(&def.key);
    for item in &def.items {
        let answer = filled.and_then(|f| f.get(&item.id)).map_or("-", String::as_str);
        let _ = writeln!(out, "  {} [{}] {}", item.id, answer, item.text);
        let options: Vec<String> = def
            .options_for(item)
            .into_iter()
            .map(|o| {
                if o.label == o.value {
                    o.value
                } else {
                    format!("{}={}", o.value, o.label)
                }
            })
            .collect();
        let _ = writeln!(out, "      {}", options.join("  "));
    }
    out
}

pub(crate) fn position(session: &Session) -> String {
    match session.current_task() {
        Some(task) => format!(
            "task {}/{}: {}",
            session.current_index() + 1,
            session.tasks().len(),
            task.post_id
        ),
        None => "no task loaded".to_string(),
    }
}

pub(crate) fn task(session: &Session) -> String {
    let Some(task) = session.current_task() else {
        return "no task loaded\n".to_string();
    };
    let mut out = String::new();
    let _ = writeln!(out, "{}", position(session));
    if let Some(url) = &task.source_url {
        let _ = writeln!(out, "source: {url}");
    }
    let correct = session
        .state()
        .annotation(&task.post_id)
        .map_or("unset", |e| if e.correct { "yes" } else { "no" });
    let _ = writeln!(out, "correct: {correct}");
    let _ = writeln!(out, "\n{}\n", task.content);
    out.push_str(&media_lines(session));
    let _ = writeln!(out, "payload:\n{}", session.payload_text());
    out
}

pub(crate) fn media(session: &Session) -> String {
    let cfg = session.media_config();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "media base url: {}",
        cfg.media_base_url.as_deref().unwrap_or("(unset)")
    );
    let _ = writeln!(
        out,
        "local prefix: {}",
        cfg.local_weibo_prefix.as_deref().unwrap_or("(unset)")
    );
    out.push_str(&media_lines(session));
    out
}

fn media_lines(session: &Session) -> String {
    let media = session.current_media();
    let mut out = String::new();
    for (kind, links) in [("image", &media.images), ("video", &media.videos)] {
        for link in links {
            let _ = writeln!(out, "{kind}: {}", link_text(link));
        }
    }
    out
}

fn link_text(link: &MediaLink) -> String {
    match &link.url {
        Some(url) if url != &link.path => format!("{url} ({})", link.path),
        Some(url) => url.clone(),
        None => format!("{} (unresolved)", link.path),
    }
}
