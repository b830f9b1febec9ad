//! Replay an input method session against an in-memory document
//!
//! A script describes the initial document and a list of controller calls.
//! Each call is run in order and reported with its result, the resulting
//! text input state and the events the document saw.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use preedit_engine::PlainTextRange;
use preedit_im::host::{HostEvent, MemoryDocument, MemoryHost};
use preedit_im::logging::init_logging;
use preedit_im::{
    Color, ControllerConfig, DecorationMarker, DispatchOutcome, HostDocument,
    InputMethodController, InputType, Settings, TextInputSnapshot,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Replay a composition session and print what the document saw.
#[derive(Parser, Debug)]
#[command(name = "preedit-replay")]
#[command(about = "Replay a composition session against an in-memory document")]
struct Cli {
    /// Session script (JSON)
    script: PathBuf,

    /// Settings file (defaults to the user config, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log filter, overrides the one in the settings
    #[arg(long)]
    log_filter: Option<String>,

    /// Write the effective settings to the user config file before replaying
    #[arg(long)]
    save_config: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Initial document and the calls to make against it.
#[derive(Debug, Deserialize)]
struct Script {
    /// Text nodes of the editable scope
    #[serde(default)]
    nodes: Vec<String>,
    /// Selection before the first step (caret at the end if omitted)
    #[serde(default)]
    selection: Option<PlainTextRange>,
    /// `beforeinput` types the document cancels when they are cancelable
    #[serde(default)]
    cancel: Vec<InputType>,
    steps: Vec<Step>,
}

/// A marker in a script. Omitted fields take the marker defaults.
#[derive(Debug, Deserialize)]
struct MarkerSpec {
    start: usize,
    end: usize,
    #[serde(default)]
    color: Option<Color>,
    #[serde(default)]
    thick: bool,
    #[serde(default)]
    background_color: Option<Color>,
}

impl MarkerSpec {
    fn to_marker(&self) -> Result<DecorationMarker> {
        let range = PlainTextRange::new(self.start, self.end)?;
        let mut marker = DecorationMarker::new(range).with_thick(self.thick);
        if let Some(color) = self.color {
            marker = marker.with_color(color);
        }
        if let Some(color) = self.background_color {
            marker = marker.with_background(color);
        }
        Ok(marker)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    SetComposition {
        text: String,
        /// Relative to the composition start; defaults to the end of `text`
        #[serde(default)]
        selection_start: Option<i32>,
        #[serde(default)]
        selection_end: Option<i32>,
        #[serde(default)]
        decorations: Vec<MarkerSpec>,
    },
    SetCompositionFromExistingText {
        start: usize,
        end: usize,
        #[serde(default)]
        decorations: Vec<MarkerSpec>,
    },
    CommitText {
        text: String,
        #[serde(default)]
        relative_caret: i32,
    },
    FinishComposingText {
        #[serde(default)]
        keep_selection: bool,
    },
    CancelComposition,
    ExtendSelectionAndDelete {
        before: usize,
        after: usize,
    },
    DeleteSurroundingText {
        before: usize,
        after: usize,
    },
    MoveCaret {
        offset: i32,
    },
    SetSelection {
        start: usize,
        end: usize,
    },
    WillChangeFocus,
    /// Edit made by the page, outside the controller
    Insert {
        offset: usize,
        text: String,
    },
    /// Removal made by the page, outside the controller
    Remove {
        start: usize,
        end: usize,
    },
    /// The page removes a whole text node
    RemoveNode {
        index: usize,
    },
    /// The document is torn down
    Detach,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::SetComposition { .. } => "set_composition",
            Step::SetCompositionFromExistingText { .. } => "set_composition_from_existing_text",
            Step::CommitText { .. } => "commit_text",
            Step::FinishComposingText { .. } => "finish_composing_text",
            Step::CancelComposition => "cancel_composition",
            Step::ExtendSelectionAndDelete { .. } => "extend_selection_and_delete",
            Step::DeleteSurroundingText { .. } => "delete_surrounding_text",
            Step::MoveCaret { .. } => "move_caret",
            Step::SetSelection { .. } => "set_selection",
            Step::WillChangeFocus => "will_change_focus",
            Step::Insert { .. } => "insert",
            Step::Remove { .. } => "remove",
            Step::RemoveNode { .. } => "remove_node",
            Step::Detach => "detach",
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Serialize)]
struct StepReport {
    op: &'static str,
    ok: bool,
    snapshot: Option<TextInputSnapshot>,
    events: Vec<HostEvent>,
}

fn markers(specs: &[MarkerSpec]) -> Result<Vec<DecorationMarker>> {
    specs.iter().map(MarkerSpec::to_marker).collect()
}

fn build_host(script: &Script) -> MemoryHost {
    let nodes: Vec<&str> = script.nodes.iter().map(String::as_str).collect();
    let mut host = MemoryHost::with_document(MemoryDocument::from_nodes(&nodes));
    if let Some(selection) = script.selection {
        host.doc.select(selection.start(), selection.end());
    }

    let cancel = script.cancel.clone();
    if !cancel.is_empty() {
        host.add_listener(move |_: &mut MemoryDocument, event: &HostEvent| match event {
            HostEvent::BeforeInput {
                input_type,
                cancelable: true,
                ..
            } if cancel.contains(input_type) => DispatchOutcome::Cancelled,
            _ => DispatchOutcome::NotCancelled,
        });
    }
    host
}

fn run_step(ctrl: &mut InputMethodController, host: &mut MemoryHost, step: &Step) -> Result<bool> {
    let ok = match step {
        Step::SetComposition {
            text,
            selection_start,
            selection_end,
            decorations,
        } => {
            let len = preedit_engine::utf16::utf16_len(text) as i32;
            ctrl.set_composition(
                host,
                text,
                &markers(decorations)?,
                selection_start.unwrap_or(len),
                selection_end.unwrap_or(len),
            )
        }
        Step::SetCompositionFromExistingText {
            start,
            end,
            decorations,
        } => ctrl.set_composition_from_existing_text(host, &markers(decorations)?, *start, *end),
        Step::CommitText {
            text,
            relative_caret,
        } => ctrl.commit_text(host, text, *relative_caret),
        Step::FinishComposingText { keep_selection } => {
            ctrl.finish_composing_text(host, *keep_selection)
        }
        Step::CancelComposition => ctrl.cancel_composition(host),
        Step::ExtendSelectionAndDelete { before, after } => {
            ctrl.extend_selection_and_delete(host, *before, *after)
        }
        Step::DeleteSurroundingText { before, after } => {
            ctrl.delete_surrounding_text(host, *before, *after)
        }
        Step::MoveCaret { offset } => ctrl.move_caret(host, *offset),
        Step::SetSelection { start, end } => {
            ctrl.set_selection_offsets(host, PlainTextRange::from_unordered(*start, *end))
        }
        Step::WillChangeFocus => ctrl.will_change_focus(host),
        Step::Insert { offset, text } => {
            host.doc.insert_at_offset(*offset, text);
            true
        }
        Step::Remove { start, end } => {
            host.doc.remove_range(*start, *end);
            true
        }
        Step::RemoveNode { index } => match host.doc.text_nodes().get(*index).copied() {
            Some(node) => {
                host.doc.remove_node(node);
                true
            }
            None => false,
        },
        Step::Detach => {
            host.doc.detach();
            ctrl.document_detached();
            true
        }
    };
    Ok(ok)
}

/// Run every step of `script` with a fresh controller.
fn replay(script: &Script, config: ControllerConfig) -> Result<Vec<StepReport>> {
    let mut host = build_host(script);
    let mut ctrl = InputMethodController::with_config(config);

    let mut reports = Vec::with_capacity(script.steps.len());
    for (i, step) in script.steps.iter().enumerate() {
        let ok = run_step(&mut ctrl, &mut host, step)
            .with_context(|| format!("step {} ({})", i, step.name()))?;
        tracing::debug!("step {} {} -> {}", i, step.name(), ok);
        reports.push(StepReport {
            op: step.name(),
            ok,
            snapshot: ctrl.text_input_snapshot(&host),
            events: host.take_log(),
        });
    }
    Ok(reports)
}

fn print_text(reports: &[StepReport]) -> Result<()> {
    for (i, report) in reports.iter().enumerate() {
        let status = if report.ok { "ok" } else { "stopped" };
        match &report.snapshot {
            Some(s) => {
                let composition = match (s.composition_start, s.composition_end) {
                    (Some(start), Some(end)) => format!("{}..{}", start, end),
                    _ => "-".to_string(),
                };
                println!(
                    "#{:<3} {:<36} {:<8} {:?} sel={}..{} comp={}",
                    i,
                    report.op,
                    status,
                    s.value,
                    s.selection_start,
                    s.selection_end,
                    composition
                );
            }
            None => println!("#{:<3} {:<36} {:<8} (detached)", i, report.op, status),
        }
        for event in &report.events {
            println!("       {}", serde_json::to_string(event)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Failed to load settings from {:?}", path))?,
        None => Settings::load()?,
    };
    let filter = cli
        .log_filter
        .clone()
        .unwrap_or_else(|| settings.logging.filter.clone());
    init_logging(&filter);

    if cli.save_config {
        settings.save()?;
        tracing::info!("settings written to {:?}", Settings::config_file());
    }

    let data = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("Failed to read {:?}", cli.script))?;
    let script: Script = serde_json::from_str(&data).context("Failed to parse session script")?;
    tracing::info!("replaying {} steps from {:?}", script.steps.len(), cli.script);

    let reports = replay(&script, ControllerConfig::from(&settings))?;
    match cli.format {
        Format::Text => print_text(&reports)?,
        Format::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Script {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_script() {
        let script = parse(
            r##"{
                "nodes": ["hello "],
                "selection": {"start": 6, "end": 6},
                "cancel": ["deleteContentBackward"],
                "steps": [
                    {"op": "set_composition", "text": "ni",
                     "decorations": [{"start": 0, "end": 2, "thick": true, "color": "#ff0000"}]},
                    {"op": "finish_composing_text", "keep_selection": true},
                    {"op": "cancel_composition"},
                    {"op": "detach"}
                ]
            }"##,
        );
        assert_eq!(script.nodes, vec!["hello "]);
        assert_eq!(script.cancel, vec![InputType::DeleteContentBackward]);
        assert_eq!(script.steps.len(), 4);
        let Step::SetComposition { decorations, .. } = &script.steps[0] else {
            panic!("expected set_composition");
        };
        let marker = decorations[0].to_marker().unwrap();
        assert!(marker.thick);
        assert_eq!(marker.color, Color::from_rgba(0xff, 0, 0, 0xff));
        assert_eq!(script.steps[1].name(), "finish_composing_text");
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let result: Result<Script, _> = serde_json::from_str(r#"{"steps": [{"op": "explode"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_replay_session() {
        let script = parse(
            r#"{
                "nodes": ["say !"],
                "selection": {"start": 4, "end": 4},
                "steps": [
                    {"op": "set_composition", "text": "ni"},
                    {"op": "set_composition", "text": "nihao"},
                    {"op": "commit_text", "text": "你好"}
                ]
            }"#,
        );
        let reports = replay(&script, ControllerConfig::default()).unwrap();
        assert!(reports.iter().all(|r| r.ok));

        let second = reports[1].snapshot.as_ref().unwrap();
        assert_eq!(second.value, "say nihao!");
        assert_eq!(second.composition_start, Some(4));
        assert_eq!(second.composition_end, Some(9));

        let last = reports[2].snapshot.as_ref().unwrap();
        assert_eq!(last.value, "say 你好!");
        assert_eq!((last.selection_start, last.selection_end), (6, 6));
        assert_eq!(last.composition_start, None);
    }

    #[test]
    fn test_replay_cancelled_delete() {
        let script = parse(
            r#"{
                "nodes": ["abcd"],
                "selection": {"start": 2, "end": 2},
                "cancel": ["deleteContentBackward"],
                "steps": [
                    {"op": "delete_surrounding_text", "before": 1, "after": 1},
                    {"op": "extend_selection_and_delete", "before": 1, "after": 0}
                ]
            }"#,
        );
        let reports = replay(&script, ControllerConfig::default()).unwrap();
        assert!(reports[0].ok);
        assert_eq!(reports[0].snapshot.as_ref().unwrap().value, "abd");
        assert!(!reports[1].ok);
    }

    #[test]
    fn test_replay_detach() {
        let script = parse(
            r#"{
                "steps": [
                    {"op": "set_composition", "text": "a"},
                    {"op": "detach"},
                    {"op": "set_composition", "text": "ab"}
                ]
            }"#,
        );
        let reports = replay(&script, ControllerConfig::default()).unwrap();
        assert!(reports[1].snapshot.is_none());
        assert!(!reports[2].ok);
        assert!(reports[2].events.is_empty());
    }

    #[test]
    fn test_replay_node_removal() {
        let script = parse(
            r#"{
                "nodes": ["ab", "cd"],
                "selection": {"start": 4, "end": 4},
                "steps": [
                    {"op": "set_composition", "text": "x"},
                    {"op": "remove_node", "index": 1},
                    {"op": "remove_node", "index": 5}
                ]
            }"#,
        );
        let reports = replay(&script, ControllerConfig::default()).unwrap();
        assert_eq!(reports[0].snapshot.as_ref().unwrap().value, "abcdx");
        assert!(reports[1].ok);
        let after = reports[1].snapshot.as_ref().unwrap();
        assert_eq!(after.value, "ab");
        assert_eq!(after.composition_start, None);
        assert!(!reports[2].ok);
    }

    #[test]
    fn test_inverted_marker_is_an_error() {
        let script = parse(
            r#"{"steps": [{"op": "set_composition", "text": "ab",
                            "decorations": [{"start": 2, "end": 1}]}]}"#,
        );
        assert!(replay(&script, ControllerConfig::default()).is_err());
    }
}
